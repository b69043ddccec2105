//! Configuration loader and typed settings.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` (selected by
//! `RUST_ENV`) + `APP_*` env vars. Typed settings structs carry defaults so
//! the binaries run without any config file present.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Chunk boundary policy knobs. Lengths are character budgets; the chunker
/// counts characters, not tokens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Hybrid retrieval knobs. Weights apply to within-source reciprocal-rank
/// scores, never to raw cross-scale values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    /// Number of fused results returned to the caller.
    pub k: usize,
    pub lexical_weight: f32,
    pub semantic_weight: f32,
    /// Each source is queried with `k * fetch_factor` to give fusion headroom.
    pub fetch_factor: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            k: 4,
            lexical_weight: 0.5,
            semantic_weight: 0.5,
            fetch_factor: 2,
        }
    }
}

/// Rating thresholds for the evaluation harness, in confidence percent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvalThresholds {
    pub excellent: f32,
    pub good: f32,
}

impl Default for EvalThresholds {
    fn default() -> Self {
        Self {
            excellent: 75.0,
            good: 50.0,
        }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn chunking(&self) -> ChunkingSettings {
        self.figment.extract_inner("chunking").unwrap_or_default()
    }

    pub fn retrieval(&self) -> RetrievalSettings {
        self.figment.extract_inner("retrieval").unwrap_or_default()
    }

    pub fn evaluation(&self) -> EvalThresholds {
        self.figment.extract_inner("evaluation").unwrap_or_default()
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after
/// expansion. If `p` is absolute, it's returned as-is.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() {
        p
    } else {
        base.join(p)
    }
}
