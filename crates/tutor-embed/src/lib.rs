//! Embedding capability for the tutoring pipeline.
//!
//! The retrieval core only requires `embed(text) -> fixed-length vector`,
//! deterministic for identical input. The default implementation is a
//! dependency-free hashed bag-of-words embedder; a candle-based local
//! transformer model is available behind the `local-model` feature.

use anyhow::Result;
use tracing::info;

#[cfg(feature = "local-model")]
pub mod model;

pub trait Embedder: Send + Sync {
    /// Fixed output dimension; every returned vector has exactly this length.
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

pub const HASHING_DIM: usize = 384;

/// Deterministic hashed bag-of-words embedder.
///
/// Tokens are lowercased alphanumeric runs; each token hashes to one slot
/// of the output vector, which is then L2-normalized. Identical input
/// always yields an identical vector, which is all the store requires.
pub struct HashingEmbedder {
    dim: usize,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(HASHING_DIM)
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;

        let mut v = vec![0f32; self.dim];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += 0.5 + val;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Returns the embedder the binaries should use: the local transformer
/// model when it is compiled in and a model directory resolves, otherwise
/// the hashing embedder.
pub fn default_embedder() -> Result<Box<dyn Embedder>> {
    #[cfg(feature = "local-model")]
    {
        if let Some(dir) = model::resolve_model_dir() {
            return Ok(Box::new(model::LocalEmbeddingModel::new(&dir)?));
        }
    }
    info!("using hashing embedder (dim {})", HASHING_DIM);
    Ok(Box::new(HashingEmbedder::default()))
}
