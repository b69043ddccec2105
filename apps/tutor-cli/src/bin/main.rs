use std::env;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use tutor_agents::prompts;
use tutor_agents::{classify_intent, parse_quiz, Intent, OfflineGenerator, TextGenerator};
use tutor_core::chunker::Chunker;
use tutor_core::config::{expand_path, Config};
use tutor_core::error::Error;
use tutor_core::loader::load_pages;
use tutor_embed::default_embedder;
use tutor_hybrid::HybridRetriever;
use tutor_vector::{store_exists, VectorStore};

const TABLE_NAME: &str = "passages";
// Each entry is one question/answer exchange.
const MAX_HISTORY_TURNS: usize = 2;

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <ingest|query|chat> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn data_dir(config: &Config, arg: Option<&String>) -> PathBuf {
    match arg {
        Some(dir) => expand_path(dir),
        None => expand_path(
            config
                .get::<String>("data.raw_dir")
                .unwrap_or_else(|_| "data/raw".to_string()),
        ),
    }
}

fn store_dir(config: &Config) -> PathBuf {
    expand_path(
        config
            .get::<String>("data.store_dir")
            .unwrap_or_else(|_| "data/vector_store".to_string()),
    )
}

async fn ingest(config: &Config, dir: &PathBuf) -> anyhow::Result<VectorStore> {
    println!("Ingesting from {}", dir.display());
    let pages = load_pages(dir)?;
    let chunker = Chunker::new(config.chunking());
    let passages = chunker.chunk(&pages);
    println!("Chunked {} pages into {} passages", pages.len(), passages.len());
    let store = VectorStore::build(&store_dir(config), TABLE_NAME, &passages, default_embedder()?).await?;
    println!("✅ Ingest complete ({} passages)", passages.len());
    Ok(store)
}

async fn load_or_ingest(config: &Config) -> anyhow::Result<VectorStore> {
    let dir = store_dir(config);
    if store_exists(&dir) {
        println!("Vector store found. Loading existing memory...");
        Ok(VectorStore::load(&dir, TABLE_NAME, default_embedder()?).await?)
    } else {
        println!("No vector store found. Running ingestion first...");
        ingest(config, &data_dir(config, None)).await
    }
}

async fn run_query(config: &Config, query: &str) -> anyhow::Result<()> {
    let store = VectorStore::load(&store_dir(config), TABLE_NAME, default_embedder()?).await?;
    let settings = config.retrieval();
    let retriever = HybridRetriever::new(store, &settings).await?;
    let results = retriever.retrieve(query, settings.k).await?;
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (i, r) in results.iter().enumerate() {
        let confidence = match r.confidence {
            Some(c) => format!("{:.1}%", c),
            None => "n/a (keyword match)".to_string(),
        };
        println!(
            "{}. {} (page {}) — {} | score {:.3} | confidence {}",
            i + 1,
            r.passage.source,
            r.passage.page,
            r.passage.topic,
            r.fused_score,
            confidence
        );
        let preview: String = r.passage.text.chars().take(200).collect();
        println!("   {}", preview.replace('\n', " "));
    }
    Ok(())
}

fn context_from_results(results: &[tutor_core::types::FusedResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "[{} p.{} — {}]\n{}",
                r.passage.source, r.passage.page, r.passage.topic, r.passage.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn answer_turn(
    generator: &dyn TextGenerator,
    query: &str,
    context: &str,
    history: &[(String, String)],
) -> std::result::Result<String, Error> {
    match classify_intent(generator, query)? {
        Intent::Quiz => {
            let raw = generator.complete(prompts::QUIZ_SYSTEM, context, query, history)?;
            let questions = parse_quiz(&raw);
            let mut out = String::new();
            for (i, q) in questions.iter().enumerate() {
                out.push_str(&format!("Q{}. {}\n", i + 1, q.question));
                for opt in &q.options {
                    out.push_str(&format!("   {}\n", opt));
                }
                out.push_str(&format!("   Answer: {} — {}\n", q.answer, q.explanation));
            }
            Ok(out)
        }
        Intent::Explain => generator.complete(prompts::CONCEPT_SYSTEM, context, query, history),
        Intent::Chat => Ok(
            "Happy to help! Ask me about your study material, or say 'quiz me' to practice."
                .to_string(),
        ),
    }
}

async fn run_chat(config: &Config) -> anyhow::Result<()> {
    let store = load_or_ingest(config).await?;
    let settings = config.retrieval();
    let retriever = HybridRetriever::new(store, &settings).await?;
    let generator = OfflineGenerator;
    let mut history: Vec<(String, String)> = Vec::new();

    println!("Tutor ready. Type a question, or 'exit' to quit.");
    let stdin = std::io::stdin();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }

        let results = match retriever.retrieve(query, settings.k).await {
            Ok(r) => r,
            Err(e) => {
                println!("Tutor: retrieval failed ({}); please try again.", e);
                continue;
            }
        };
        let context = context_from_results(&results);
        match answer_turn(&generator, query, &context, &history) {
            Ok(answer) => {
                println!("Tutor: {}", answer);
                history.push((query.to_string(), answer));
                if history.len() > MAX_HISTORY_TURNS {
                    let excess = history.len() - MAX_HISTORY_TURNS;
                    history.drain(..excess);
                }
            }
            Err(Error::Transient(msg)) => {
                println!("Tutor: the answer service is temporarily unavailable ({}). Try again in a moment.", msg);
            }
            Err(e) => {
                println!("Tutor: something went wrong ({}); the session continues.", e);
            }
        }
    }
    println!("Goodbye!");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    let rt = tokio::runtime::Runtime::new()?;
    match cmd.as_str() {
        "ingest" => {
            rt.block_on(ingest(&config, &data_dir(&config, args.first())))?;
        }
        "query" => {
            let query_text = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: tutor query \"<question>\"");
                std::process::exit(1)
            });
            rt.block_on(run_query(&config, &query_text))?;
        }
        "chat" => {
            rt.block_on(run_chat(&config))?;
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}
