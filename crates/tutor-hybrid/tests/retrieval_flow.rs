use tempfile::TempDir;

use tutor_core::chunker::Chunker;
use tutor_core::config::{ChunkingSettings, EvalThresholds, RetrievalSettings};
use tutor_core::types::{PageNumber, PageRecord};
use tutor_embed::{Embedder, HashingEmbedder};
use tutor_hybrid::eval::evaluate;
use tutor_hybrid::HybridRetriever;
use tutor_vector::VectorStore;

fn embedder() -> Box<dyn Embedder> {
    Box::new(HashingEmbedder::default())
}

fn two_page_book() -> Vec<PageRecord> {
    vec![
        PageRecord {
            text: "Photosynthesis converts light into chemical energy.".to_string(),
            page: Some(1),
            source: "science.txt".to_string(),
        },
        PageRecord {
            text: "Respiration releases energy from glucose.".to_string(),
            page: Some(2),
            source: "science.txt".to_string(),
        },
    ]
}

async fn build_store(dir: &std::path::Path, pages: &[PageRecord]) -> VectorStore {
    let chunker = Chunker::new(ChunkingSettings::default());
    let passages = chunker.chunk(pages);
    VectorStore::build(dir, "passages", &passages, embedder())
        .await
        .expect("build store")
}

#[tokio::test]
async fn ingested_book_answers_from_the_right_page() {
    let tmp = TempDir::new().unwrap();
    let store = build_store(&tmp.path().join("store"), &two_page_book()).await;
    let retriever = HybridRetriever::new(store, &RetrievalSettings::default())
        .await
        .expect("retriever");

    let results = retriever
        .retrieve("What converts light into energy?", 2)
        .await
        .expect("retrieve");

    assert!(!results.is_empty());
    let top = &results[0];
    assert_eq!(top.passage.page, PageNumber::Known(1));
    assert!(top.passage.text.contains("Photosynthesis"));
    let confidence = top.confidence.expect("semantic hit has confidence");
    assert!(confidence > 0.0 && confidence <= 100.0);
}

#[tokio::test]
async fn empty_store_retrieval_is_empty_not_an_error() {
    let tmp = TempDir::new().unwrap();
    let store = VectorStore::build(&tmp.path().join("store"), "passages", &[], embedder())
        .await
        .expect("build");
    let retriever = HybridRetriever::new(store, &RetrievalSettings::default())
        .await
        .expect("retriever");

    let results = retriever.retrieve("anything at all", 3).await.expect("retrieve");
    assert!(results.is_empty());
}

#[tokio::test]
async fn retrieval_is_deterministic_for_a_fixed_index() {
    let tmp = TempDir::new().unwrap();
    let store = build_store(&tmp.path().join("store"), &two_page_book()).await;
    let retriever = HybridRetriever::new(store, &RetrievalSettings::default())
        .await
        .expect("retriever");

    let first = retriever.retrieve("energy", 2).await.expect("retrieve");
    let second = retriever.retrieve("energy", 2).await.expect("retrieve");
    let first_ids: Vec<_> = first.iter().map(|r| r.passage.id.clone()).collect();
    let second_ids: Vec<_> = second.iter().map(|r| r.passage.id.clone()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn no_passage_is_listed_twice() {
    let tmp = TempDir::new().unwrap();
    let store = build_store(&tmp.path().join("store"), &two_page_book()).await;
    let retriever = HybridRetriever::new(store, &RetrievalSettings::default())
        .await
        .expect("retriever");

    // Both sub-indexes will return both passages for this query.
    let results = retriever.retrieve("energy", 4).await.expect("retrieve");
    let mut ids: Vec<_> = results.iter().map(|r| r.passage.id.clone()).collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[tokio::test]
async fn fused_results_are_ordered_by_score() {
    let tmp = TempDir::new().unwrap();
    let store = build_store(&tmp.path().join("store"), &two_page_book()).await;
    let retriever = HybridRetriever::new(store, &RetrievalSettings::default())
        .await
        .expect("retriever");

    let results = retriever.retrieve("energy from glucose", 2).await.expect("retrieve");
    for w in results.windows(2) {
        assert!(w[0].fused_score >= w[1].fused_score);
    }
}

#[tokio::test]
async fn evaluation_aggregates_stay_in_range() {
    let tmp = TempDir::new().unwrap();
    let pages = vec![
        PageRecord {
            text: "Photosynthesis converts light into chemical energy.".to_string(),
            page: Some(1),
            source: "science.txt".to_string(),
        },
        PageRecord {
            text: "Respiration releases energy from glucose.".to_string(),
            page: Some(2),
            source: "science.txt".to_string(),
        },
        PageRecord {
            text: "Iron articles rust when exposed to moist air.".to_string(),
            page: Some(3),
            source: "science.txt".to_string(),
        },
    ];
    let store = build_store(&tmp.path().join("store"), &pages).await;

    let queries = vec![
        "What converts light into energy?".to_string(),
        "How is energy released from glucose?".to_string(),
        "Why does iron rust?".to_string(),
    ];
    let report = evaluate(&store, &queries, &EvalThresholds::default())
        .await
        .expect("evaluate");

    assert_eq!(report.records.len(), 3);
    assert!(report.avg_confidence >= 0.0 && report.avg_confidence <= 100.0);
    assert!(report.avg_latency >= std::time::Duration::ZERO);
    for r in &report.records {
        assert!(r.confidence >= 0.0 && r.confidence <= 100.0);
        assert_eq!(r.source, "science.txt");
    }
}
