use tracing_subscriber::EnvFilter;

use tutor_core::config::{expand_path, Config};
use tutor_core::error::Error;
use tutor_embed::default_embedder;
use tutor_hybrid::eval::evaluate;
use tutor_vector::VectorStore;

const TABLE_NAME: &str = "passages";

fn sample_queries() -> Vec<String> {
    [
        "What happens when an acid reacts with a metal?",
        "Explain the process of photosynthesis",
        "What is a displacement reaction?",
        "Why does iron rust?",
        "What are the products of combustion?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let store_dir = expand_path(
        config
            .get::<String>("data.store_dir")
            .unwrap_or_else(|_| "data/vector_store".to_string()),
    );
    let store = match VectorStore::load(&store_dir, TABLE_NAME, default_embedder()?).await {
        Ok(store) => store,
        Err(Error::Setup(msg)) => {
            eprintln!("❌ {}", msg);
            eprintln!("Ingest your study material first: tutor ingest <dir>");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let queries = config
        .get::<Vec<String>>("evaluation.queries")
        .unwrap_or_else(|_| sample_queries());
    let thresholds = config.evaluation();
    let report = evaluate(&store, &queries, &thresholds).await?;

    println!("{:<50} | {:>10} | {:>8} | {}", "Query", "Confidence", "Latency", "Top source");
    println!("{}", "-".repeat(96));
    for record in &report.records {
        println!(
            "{:<50} | {:>9.1}% | {:>6}ms | {} (p.{})",
            record.query.chars().take(50).collect::<String>(),
            record.confidence,
            record.latency.as_millis(),
            record.source,
            record.page
        );
    }
    println!("{}", "-".repeat(96));
    println!(
        "Average confidence: {:.1}% | Average latency: {}ms | Rating: {}",
        report.avg_confidence,
        report.avg_latency.as_millis(),
        report.rating
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let config = Config::load()?;
    tokio::runtime::Runtime::new()?.block_on(run(&config))
}
