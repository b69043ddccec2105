use tempfile::TempDir;

use tutor_core::error::Error;
use tutor_core::types::{PageNumber, Passage};
use tutor_embed::{Embedder, HashingEmbedder};
use tutor_vector::{store_exists, VectorStore};

fn passage(id: &str, page: u32, text: &str) -> Passage {
    Passage {
        id: id.to_string(),
        text: text.to_string(),
        source: "science.txt".to_string(),
        page: PageNumber::Known(page),
        topic: "General Section".to_string(),
        token_count: text.split_whitespace().count(),
        start_offset: 0,
    }
}

fn embedder() -> Box<dyn Embedder> {
    Box::new(HashingEmbedder::default())
}

fn sample_passages() -> Vec<Passage> {
    vec![
        passage("science.txt:0", 1, "Photosynthesis converts light into chemical energy."),
        passage("science.txt:1", 2, "Respiration releases energy from glucose."),
        passage("science.txt:2", 3, "Iron articles rust when exposed to moist air."),
    ]
}

#[tokio::test]
async fn build_then_query_returns_nearest_first() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    let store = VectorStore::build(&dir, "passages", &sample_passages(), embedder())
        .await
        .expect("build");

    let hits = store
        .query_with_score("What converts light into energy?", 3)
        .await
        .expect("query");
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].0.page, PageNumber::Known(1));
    for w in hits.windows(2) {
        assert!(w[0].1 <= w[1].1, "distances not ascending");
    }
}

#[tokio::test]
async fn get_all_preserves_metadata() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    let store = VectorStore::build(&dir, "passages", &sample_passages(), embedder())
        .await
        .expect("build");

    let mut all = store.get_all().await.expect("get_all");
    all.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].source, "science.txt");
    assert_eq!(all[0].topic, "General Section");
    assert_eq!(all[1].page, PageNumber::Known(2));
    assert!(all[0].text.contains("Photosynthesis"));
}

#[tokio::test]
async fn store_exists_tracks_the_persisted_directory() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    assert!(!store_exists(&dir));
    VectorStore::build(&dir, "passages", &sample_passages(), embedder())
        .await
        .expect("build");
    assert!(store_exists(&dir));
}

#[tokio::test]
async fn load_without_prior_build_is_a_setup_error() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("never-built");
    match VectorStore::load(&dir, "passages", embedder()).await {
        Err(Error::Setup(msg)) => assert!(msg.contains("run ingest first")),
        Err(other) => panic!("wrong error: {other}"),
        Ok(_) => panic!("load should fail without a prior build"),
    }
}

#[tokio::test]
async fn load_reconnects_to_persisted_passages() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    VectorStore::build(&dir, "passages", &sample_passages(), embedder())
        .await
        .expect("build");

    let store = VectorStore::load(&dir, "passages", embedder())
        .await
        .expect("load");
    let hits = store.query("rust on iron", 1).await.expect("query");
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn rebuild_replaces_prior_contents() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    VectorStore::build(&dir, "passages", &sample_passages(), embedder())
        .await
        .expect("first build");

    let replacement = vec![passage("new.txt:0", 1, "Acids turn blue litmus red.")];
    let store = VectorStore::build(&dir, "passages", &replacement, embedder())
        .await
        .expect("rebuild");

    let all = store.get_all().await.expect("get_all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, "new.txt:0");
}

#[tokio::test]
async fn empty_store_queries_return_nothing() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("store");
    let store = VectorStore::build(&dir, "passages", &[], embedder())
        .await
        .expect("build");

    assert!(store.query_with_score("anything", 5).await.expect("query").is_empty());
    assert!(store.get_all().await.expect("get_all").is_empty());
}
