//! Retrieval evaluation harness: drives a fixed query set through the
//! store and reports latency/quality aggregates. Records live only for the
//! duration of a run; nothing is persisted.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Result;

use tutor_core::config::EvalThresholds;
use tutor_core::scoring;
use tutor_core::types::PageNumber;
use tutor_vector::VectorStore;

const EVAL_TOP_K: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    Poor,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excellent => write!(f, "EXCELLENT"),
            Self::Good => write!(f, "GOOD"),
            Self::Poor => write!(f, "POOR"),
        }
    }
}

impl Rating {
    pub fn classify(avg_confidence: f32, thresholds: &EvalThresholds) -> Self {
        if avg_confidence > thresholds.excellent {
            Self::Excellent
        } else if avg_confidence > thresholds.good {
            Self::Good
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone)]
pub struct EvalRecord {
    pub query: String,
    /// Confidence percent of the top hit, 0 when nothing was retrieved.
    pub confidence: f32,
    pub source: String,
    pub page: PageNumber,
    pub latency: Duration,
}

#[derive(Debug, Clone)]
pub struct EvalReport {
    pub records: Vec<EvalRecord>,
    pub avg_confidence: f32,
    pub avg_latency: Duration,
    pub rating: Rating,
}

/// Runs every query against the store, normalizing the top hit's raw
/// distance into a confidence percent. The store handle is the caller's:
/// a missing store surfaces as a setup error at load time, before any
/// query runs.
pub async fn evaluate(
    store: &VectorStore,
    queries: &[String],
    thresholds: &EvalThresholds,
) -> Result<EvalReport> {
    let mut records = Vec::with_capacity(queries.len());
    for query in queries {
        let started = Instant::now();
        let hits = store.query_with_score(query, EVAL_TOP_K).await?;
        let latency = started.elapsed();
        let record = match hits.first() {
            Some((passage, distance)) => EvalRecord {
                query: query.clone(),
                confidence: scoring::confidence(*distance),
                source: passage.source.clone(),
                page: passage.page,
                latency,
            },
            None => EvalRecord {
                query: query.clone(),
                confidence: 0.0,
                source: "no results".to_string(),
                page: PageNumber::Unknown,
                latency,
            },
        };
        records.push(record);
    }

    let n = records.len().max(1) as f32;
    let avg_confidence = records.iter().map(|r| r.confidence).sum::<f32>() / n;
    let total_latency: Duration = records.iter().map(|r| r.latency).sum();
    let avg_latency = total_latency / records.len().max(1) as u32;

    Ok(EvalReport {
        rating: Rating::classify(avg_confidence, thresholds),
        records,
        avg_confidence,
        avg_latency,
    })
}

#[cfg(test)]
mod tests {
    use super::Rating;
    use tutor_core::config::EvalThresholds;

    #[test]
    fn rating_thresholds_are_exclusive_bounds() {
        let t = EvalThresholds::default();
        assert_eq!(Rating::classify(80.0, &t), Rating::Excellent);
        assert_eq!(Rating::classify(75.0, &t), Rating::Good);
        assert_eq!(Rating::classify(60.0, &t), Rating::Good);
        assert_eq!(Rating::classify(50.0, &t), Rating::Poor);
        assert_eq!(Rating::classify(0.0, &t), Rating::Poor);
    }
}
