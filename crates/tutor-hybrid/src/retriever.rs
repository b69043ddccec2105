use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

use tutor_core::config::RetrievalSettings;
use tutor_core::scoring;
use tutor_core::types::{FusedResult, Passage, PassageId};
use tutor_text::LexicalIndex;
use tutor_vector::VectorStore;

use crate::fusion::{fuse, FusionWeights};

/// Fuses keyword and semantic search over one passage store.
///
/// The lexical side is rebuilt lazily from the store's export at
/// construction; it is a best-effort companion, and every lexical failure
/// degrades to semantic-only retrieval instead of failing the query.
pub struct HybridRetriever {
    store: VectorStore,
    lexical: Option<LexicalIndex>,
    passages: HashMap<PassageId, Passage>,
    weights: FusionWeights,
    fetch_factor: usize,
}

impl HybridRetriever {
    pub async fn new(store: VectorStore, settings: &RetrievalSettings) -> Result<Self> {
        let all = store.get_all().await?;
        let lexical = if all.is_empty() {
            warn!("embedding store is empty; lexical index skipped, semantic-only retrieval");
            None
        } else {
            match LexicalIndex::build(&all) {
                Ok(index) => Some(index),
                Err(e) => {
                    warn!(error = %e, "lexical index build failed; semantic-only retrieval");
                    None
                }
            }
        };
        let passages = all.into_iter().map(|p| (p.id.clone(), p)).collect();
        Ok(Self {
            store,
            lexical,
            passages,
            weights: FusionWeights {
                lexical: settings.lexical_weight,
                semantic: settings.semantic_weight,
            },
            fetch_factor: settings.fetch_factor.max(1),
        })
    }

    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Top-k fused results, best first. An empty store yields an empty
    /// list; a failing lexical side yields semantic-only results. Repeated
    /// calls against unchanged indexes return identical orderings.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<FusedResult>> {
        let fetch_k = k.max(1) * self.fetch_factor;

        let semantic = self.store.query_with_score(query, fetch_k).await?;
        let lexical_hits = match &self.lexical {
            Some(index) => match index.search(query, fetch_k) {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(error = %e, "lexical search failed; degrading to semantic-only");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let sem_ids: Vec<PassageId> = semantic.iter().map(|(p, _)| p.id.clone()).collect();
        let lex_ids: Vec<PassageId> = lexical_hits.into_iter().map(|h| h.id).collect();
        let ranking = fuse(&sem_ids, &lex_ids, self.weights, k);

        let mut results = Vec::with_capacity(ranking.len());
        for entry in ranking {
            let passage = match entry.semantic_rank {
                Some(r) => semantic[r - 1].0.clone(),
                None => match self.passages.get(&entry.id) {
                    Some(p) => p.clone(),
                    // A lexical hit with no stored passage would mean the
                    // two indexes disagree about the corpus; drop it.
                    None => continue,
                },
            };
            let distance = entry.semantic_rank.map(|r| semantic[r - 1].1);
            results.push(FusedResult {
                passage,
                fused_score: entry.score,
                distance,
                confidence: distance.map(scoring::confidence),
            });
        }
        Ok(results)
    }
}
