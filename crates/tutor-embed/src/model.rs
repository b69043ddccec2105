//! Local transformer embedding model (XLM-RoBERTa family, e.g. BGE-M3),
//! loaded from a directory containing `tokenizer.json`, `config.json` and
//! `pytorch_model.bin`. Mean-pooled, L2-normalized sentence vectors.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::info;

use crate::Embedder;

const MAX_SEQ_LEN: usize = 256;
const OUTPUT_DIM: usize = 1024;

pub struct LocalEmbeddingModel {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl LocalEmbeddingModel {
    pub fn new(model_dir: &Path) -> Result<Self> {
        let device = Device::Cpu;
        info!(dir = %model_dir.display(), "loading local embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("loading tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig =
            serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

        let weights_path = model_dir.join("pytorch_model.bin");
        let weights = candle_core::pickle::read_all(&weights_path)?;
        let weights_map: std::collections::HashMap<String, Tensor> =
            weights.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights_map, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!("local embedding model ready");
        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }
}

impl Embedder for LocalEmbeddingModel {
    fn dim(&self) -> usize {
        OUTPUT_DIM
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        ids.truncate(MAX_SEQ_LEN);
        mask.truncate(MAX_SEQ_LEN);
        if ids.len() < MAX_SEQ_LEN {
            let pad = MAX_SEQ_LEN - ids.len();
            ids.extend(std::iter::repeat(1).take(pad));
            mask.extend(std::iter::repeat(0).take(pad));
        }

        let input_ids = Tensor::from_iter(ids, &self.device)?.reshape((1, MAX_SEQ_LEN))?;
        let attention_mask = Tensor::from_iter(mask, &self.device)?.reshape((1, MAX_SEQ_LEN))?;
        let token_type_ids = Tensor::zeros((1, MAX_SEQ_LEN), DType::I64, &self.device)?;
        let hidden =
            self.model
                .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;

        // Mean pooling over unmasked positions, then L2 normalization.
        let hdim = hidden.dims()[2];
        let mask_f = attention_mask
            .to_device(hidden.device())?
            .to_dtype(hidden.dtype())?;
        let mask_3d = mask_f.unsqueeze(2)?;
        let mask_b = mask_3d
            .broadcast_as(hidden.shape())
            .unwrap_or(mask_3d.repeat((1, 1, hdim))?);
        let masked = (&hidden * &mask_b)?;
        let sum = masked.sum(1)?;
        let lens = mask_f.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
        let mut emb = sum.broadcast_div(&lens)?;
        let eps = Tensor::new(&[1e-12f32], hidden.device())?
            .to_dtype(hidden.dtype())?
            .unsqueeze(0)?;
        let norm = emb.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
        emb = emb.broadcast_div(&norm)?;

        let out: Vec<f32> = emb.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if out.len() != OUTPUT_DIM {
            return Err(anyhow!("unexpected embedding width {}", out.len()));
        }
        Ok(out)
    }
}

/// Looks for a model directory via `APP_MODEL_DIR`, then `models/embedding`
/// relative to the working directory. Returns None when nothing is present,
/// in which case callers fall back to the hashing embedder.
pub fn resolve_model_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() {
            return Some(p);
        }
    }
    let local = Path::new("models/embedding");
    if local.exists() {
        return Some(local.to_path_buf());
    }
    None
}
