//! Weighted reciprocal-rank fusion of two independently ranked lists.
//!
//! Lexical relevance and vector distance live on incompatible scales, so
//! fusion never touches raw scores: each source's ranking is converted to
//! reciprocal-rank scores `1/rank` (1-based, within-source, in (0, 1])
//! first, and only those are weighted and combined.

use std::collections::HashMap;

use tutor_core::types::PassageId;

#[derive(Debug, Clone, Copy)]
pub struct FusionWeights {
    pub lexical: f32,
    pub semantic: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            lexical: 0.5,
            semantic: 0.5,
        }
    }
}

/// One passage's place in the fused ordering. The per-source ranks are
/// kept so the caller can map back to source-specific data (e.g. the raw
/// semantic distance behind a confidence value).
#[derive(Debug, Clone, PartialEq)]
pub struct FusedRanking {
    pub id: PassageId,
    pub score: f32,
    /// 1-based rank in the semantic list, if the semantic source saw it.
    pub semantic_rank: Option<usize>,
    /// 1-based rank in the lexical list, if the lexical source saw it.
    pub lexical_rank: Option<usize>,
}

/// Fuses the two rankings (each best-first) into one list of at most `k`
/// unique passages, fused score descending.
///
/// A passage present in both lists gets the sum of its weighted per-source
/// scores; one seen by a single source gets only that contribution, with no
/// penalty or imputed score for the other. Ties break by semantic order
/// first, then lexical, so repeated invocations over identical inputs
/// return identical output.
pub fn fuse(
    semantic: &[PassageId],
    lexical: &[PassageId],
    weights: FusionWeights,
    k: usize,
) -> Vec<FusedRanking> {
    let mut ranks: HashMap<&PassageId, (Option<usize>, Option<usize>)> = HashMap::new();
    for (i, id) in semantic.iter().enumerate() {
        let entry = ranks.entry(id).or_insert((None, None));
        if entry.0.is_none() {
            entry.0 = Some(i + 1);
        }
    }
    for (i, id) in lexical.iter().enumerate() {
        let entry = ranks.entry(id).or_insert((None, None));
        if entry.1.is_none() {
            entry.1 = Some(i + 1);
        }
    }

    let mut fused: Vec<FusedRanking> = ranks
        .into_iter()
        .map(|(id, (sem, lex))| {
            let sem_score = sem.map(|r| weights.semantic / r as f32).unwrap_or(0.0);
            let lex_score = lex.map(|r| weights.lexical / r as f32).unwrap_or(0.0);
            FusedRanking {
                id: id.clone(),
                score: sem_score + lex_score,
                semantic_rank: sem,
                lexical_rank: lex,
            }
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.semantic_rank
                    .unwrap_or(usize::MAX)
                    .cmp(&b.semantic_rank.unwrap_or(usize::MAX))
            })
            .then_with(|| {
                a.lexical_rank
                    .unwrap_or(usize::MAX)
                    .cmp(&b.lexical_rank.unwrap_or(usize::MAX))
            })
    });
    fused.truncate(k);
    fused
}

#[cfg(test)]
mod tests {
    use super::{fuse, FusionWeights};
    use tutor_core::types::PassageId;

    fn ids(list: &[&str]) -> Vec<PassageId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lexical_only_input_passes_through_unchanged() {
        let lexical = ids(&["c", "a", "b"]);
        let fused = fuse(&[], &lexical, FusionWeights::default(), 10);
        let order: Vec<_> = fused.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn semantic_only_input_passes_through_unchanged() {
        let semantic = ids(&["x", "y"]);
        let fused = fuse(&semantic, &[], FusionWeights::default(), 10);
        let order: Vec<_> = fused.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(order, vec!["x", "y"]);
    }

    #[test]
    fn passage_in_both_lists_appears_once_with_combined_score() {
        let semantic = ids(&["a", "b"]);
        let lexical = ids(&["b", "a"]);
        let fused = fuse(&semantic, &lexical, FusionWeights::default(), 10);
        assert_eq!(fused.len(), 2);
        // Both passages: 0.5/1 + 0.5/2 = 0.75.
        for f in &fused {
            assert!((f.score - 0.75).abs() < 1e-6);
        }
        // Tie broken by semantic order.
        assert_eq!(fused[0].id, "a");
        assert_eq!(fused[1].id, "b");
    }

    #[test]
    fn agreement_across_sources_outranks_a_single_source() {
        let semantic = ids(&["shared", "solo_sem"]);
        let lexical = ids(&["shared", "solo_lex"]);
        let fused = fuse(&semantic, &lexical, FusionWeights::default(), 10);
        assert_eq!(fused[0].id, "shared");
        assert!((fused[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn deterministic_over_repeated_invocations() {
        let semantic = ids(&["a", "b", "c", "d"]);
        let lexical = ids(&["d", "b", "e", "a"]);
        let first = fuse(&semantic, &lexical, FusionWeights::default(), 5);
        let second = fuse(&semantic, &lexical, FusionWeights::default(), 5);
        assert_eq!(first, second);
    }

    #[test]
    fn truncates_to_k() {
        let semantic = ids(&["a", "b", "c", "d", "e"]);
        let fused = fuse(&semantic, &[], FusionWeights::default(), 2);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn weights_shift_the_balance() {
        let semantic = ids(&["sem"]);
        let lexical = ids(&["lex"]);
        let weights = FusionWeights {
            lexical: 0.9,
            semantic: 0.1,
        };
        let fused = fuse(&semantic, &lexical, weights, 10);
        assert_eq!(fused[0].id, "lex");
    }

    #[test]
    fn single_source_passage_gets_no_penalty_term() {
        let semantic = ids(&["only"]);
        let fused = fuse(&semantic, &[], FusionWeights::default(), 10);
        assert!((fused[0].score - 0.5).abs() < 1e-6);
        assert_eq!(fused[0].lexical_rank, None);
    }
}
