use std::path::Path;

use anyhow::{anyhow, Result};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int32Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, Connection};
use std::sync::Arc;
use tracing::{info, warn};

use tutor_core::error::Error;
use tutor_core::types::{PageNumber, Passage};
use tutor_embed::Embedder;

use crate::schema::build_arrow_schema;

const BATCH_ROWS: usize = 512;
const EXPORT_LIMIT: usize = 1_000_000;

/// The explicit ingest-vs-load precondition: a store exists when its
/// directory is present and non-empty.
pub fn store_exists(dir: &Path) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.next().is_some(),
        Err(_) => false,
    }
}

/// Handle over a persisted LanceDB passages table. Queries are read-only;
/// a rebuild replaces the table wholesale.
pub struct VectorStore {
    db: Connection,
    table_name: String,
    embedder: Box<dyn Embedder>,
}

impl VectorStore {
    /// Destructive full rebuild: wipes whatever was previously persisted at
    /// `dir`, embeds every passage and persists vectors + text + metadata.
    /// Callers serialize this against query access; no query may run
    /// concurrently with a rebuild.
    pub async fn build(
        dir: &Path,
        table_name: &str,
        passages: &[Passage],
        embedder: Box<dyn Embedder>,
    ) -> Result<Self> {
        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::create_dir_all(dir)?;
        let db = connect(dir.to_string_lossy().as_ref()).execute().await?;
        let store = Self {
            db,
            table_name: table_name.to_string(),
            embedder,
        };
        if passages.is_empty() {
            warn!("no passages to index; store left empty");
            return Ok(store);
        }

        info!(passages = passages.len(), table = table_name, "building embedding store");
        let pb = ProgressBar::new(passages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages ({percent}%)")?
                .progress_chars("#>-"),
        );
        let mut created = false;
        for chunk in passages.chunks(BATCH_ROWS) {
            let mut vectors = Vec::with_capacity(chunk.len());
            for p in chunk {
                vectors.push(store.embedder.embed(&p.text)?);
                pb.inc(1);
            }
            let batch = passages_to_record_batch(chunk, &vectors, store.embedder.dim())?;
            let schema = batch.schema();
            let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
            if created {
                store
                    .db
                    .open_table(&store.table_name)
                    .execute()
                    .await?
                    .add(reader)
                    .execute()
                    .await?;
            } else {
                store
                    .db
                    .create_table(&store.table_name, reader)
                    .execute()
                    .await?;
                created = true;
            }
        }
        pb.finish_and_clear();
        info!("embedding store build complete");
        Ok(store)
    }

    /// Reconnects to a previously persisted store without recomputation.
    pub async fn load(
        dir: &Path,
        table_name: &str,
        embedder: Box<dyn Embedder>,
    ) -> std::result::Result<Self, Error> {
        if !store_exists(dir) {
            return Err(Error::Setup(format!(
                "no persisted store at {}; run ingest first",
                dir.display()
            )));
        }
        let db = connect(dir.to_string_lossy().as_ref())
            .execute()
            .await
            .map_err(|e| Error::Operation(format!("opening store at {}: {}", dir.display(), e)))?;
        Ok(Self {
            db,
            table_name: table_name.to_string(),
            embedder,
        })
    }

    async fn table_present(&self) -> Result<bool> {
        Ok(self
            .db
            .table_names()
            .execute()
            .await?
            .contains(&self.table_name))
    }

    /// K nearest passages by vector distance, nearest first.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<Passage>> {
        Ok(self
            .query_with_score(text, k)
            .await?
            .into_iter()
            .map(|(p, _)| p)
            .collect())
    }

    /// Like [`Self::query`] but exposes the raw distances (lower is closer)
    /// for confidence computation. A store that was never built returns an
    /// empty list rather than an error.
    pub async fn query_with_score(&self, text: &str, k: usize) -> Result<Vec<(Passage, f32)>> {
        if !self.table_present().await? {
            return Ok(Vec::new());
        }
        let qvec = self.embedder.embed(text)?;
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table.vector_search(qvec)?.limit(k).execute().await?;
        let mut out = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for row in 0..batch.num_rows() {
                let passage = passage_from_batch(&batch, row)?;
                let distance = column_f32(&batch, "_distance", row)?;
                out.push((passage, distance));
            }
        }
        out.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        out.truncate(k);
        Ok(out)
    }

    /// Bulk export of every stored passage, used to seed the lexical index
    /// without re-deriving embeddings.
    pub async fn get_all(&self) -> Result<Vec<Passage>> {
        if !self.table_present().await? {
            return Ok(Vec::new());
        }
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table.query().limit(EXPORT_LIMIT).execute().await?;
        let mut out = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            for row in 0..batch.num_rows() {
                out.push(passage_from_batch(&batch, row)?);
            }
        }
        Ok(out)
    }
}

fn passages_to_record_batch(
    passages: &[Passage],
    vectors: &[Vec<f32>],
    dim: usize,
) -> Result<RecordBatch> {
    let schema = build_arrow_schema(dim as i32);
    let mut ids = Vec::with_capacity(passages.len());
    let mut texts = Vec::with_capacity(passages.len());
    let mut sources = Vec::with_capacity(passages.len());
    let mut pages = Vec::with_capacity(passages.len());
    let mut topics = Vec::with_capacity(passages.len());
    let mut token_counts = Vec::with_capacity(passages.len());
    let mut offsets = Vec::with_capacity(passages.len());
    let mut vecs: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(passages.len());
    for (p, v) in passages.iter().zip(vectors.iter()) {
        ids.push(p.id.clone());
        texts.push(p.text.clone());
        sources.push(p.source.clone());
        pages.push(p.page.as_i32());
        topics.push(p.topic.clone());
        token_counts.push(p.token_count as i32);
        offsets.push(p.start_offset as i32);
        vecs.push(Some(v.iter().map(|&x| Some(x)).collect()));
    }
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(sources)),
            Arc::new(Int32Array::from(pages)),
            Arc::new(StringArray::from(topics)),
            Arc::new(Int32Array::from(token_counts)),
            Arc::new(Int32Array::from(offsets)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<
                arrow_array::types::Float32Type,
                _,
                _,
            >(vecs.into_iter(), dim as i32)),
        ],
    )?;
    Ok(batch)
}

fn passage_from_batch(batch: &RecordBatch, row: usize) -> Result<Passage> {
    Ok(Passage {
        id: column_str(batch, "id", row)?,
        text: column_str(batch, "text", row)?,
        source: column_str(batch, "source", row)?,
        page: PageNumber::from_i32(column_i32(batch, "page", row)?),
        topic: column_str(batch, "topic", row)?,
        token_count: column_i32(batch, "token_count", row)?.max(0) as usize,
        start_offset: column_i32(batch, "start_offset", row)?.max(0) as usize,
    })
}

fn column_str(batch: &RecordBatch, name: &str, row: usize) -> Result<String> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column '{}' missing", name))?;
    let arr = col
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow!("column '{}' is not utf8", name))?;
    Ok(arr.value(row).to_string())
}

fn column_i32(batch: &RecordBatch, name: &str, row: usize) -> Result<i32> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column '{}' missing", name))?;
    let arr = col
        .as_any()
        .downcast_ref::<Int32Array>()
        .ok_or_else(|| anyhow!("column '{}' is not int32", name))?;
    Ok(arr.value(row))
}

fn column_f32(batch: &RecordBatch, name: &str, row: usize) -> Result<f32> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column '{}' missing", name))?;
    let arr = col
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| anyhow!("column '{}' is not float32", name))?;
    Ok(arr.value(row))
}
