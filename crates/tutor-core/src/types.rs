//! Domain types shared by the ingestion, indexing and retrieval crates.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type PassageId = String;

/// A page of already-extracted source text. PDF extraction is an external
/// collaborator; the pipeline only ever sees these records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub text: String,
    pub page: Option<u32>,
    pub source: String,
}

/// Page provenance for a passage. Absent page metadata is explicit,
/// never a silent missing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageNumber {
    Known(u32),
    Unknown,
}

impl PageNumber {
    pub fn from_raw(page: Option<u32>) -> Self {
        match page {
            Some(n) => Self::Known(n),
            None => Self::Unknown,
        }
    }

    /// Storage encoding: the page number, or -1 for unknown.
    pub fn as_i32(self) -> i32 {
        match self {
            Self::Known(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Self::Unknown => -1,
        }
    }

    pub fn from_i32(v: i32) -> Self {
        if v < 0 {
            Self::Unknown
        } else {
            Self::Known(v as u32)
        }
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(n) => write!(f, "{}", n),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A bounded unit of retrievable text with its positional and topical
/// metadata. Created once by the chunker and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: PassageId,
    pub text: String,
    /// Source document identifier (file name).
    pub source: String,
    pub page: PageNumber,
    /// Short heading-like label derived from the passage's first lines.
    pub topic: String,
    /// Approximate token count; best-effort, never load-bearing.
    pub token_count: usize,
    /// Character offset of the passage within its page text.
    pub start_offset: usize,
}

/// Indicates which index produced a hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Lexical,
    Semantic,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

/// A per-source hit before fusion. `raw_score` is on the producing index's
/// native scale: BM25 relevance (higher is better) for lexical, vector
/// distance (lower is better) for semantic. The two are never compared
/// directly; fusion works on within-source ranks.
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub id: PassageId,
    /// 1-based rank within the producing source's result list.
    pub rank: usize,
    pub raw_score: f32,
    pub source: SourceKind,
}

/// A deduplicated, rank-fused retrieval result.
///
/// `distance` and `confidence` are present only when the semantic source saw
/// the passage; a lexical-only hit has no distance to normalize.
#[derive(Debug, Clone)]
pub struct FusedResult {
    pub passage: Passage,
    pub fused_score: f32,
    pub distance: Option<f32>,
    /// Percentage in (0, 100], derived via [`crate::scoring::confidence`].
    pub confidence: Option<f32>,
}
