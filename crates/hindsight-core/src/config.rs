use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use hindsight_index::{
    EmbeddingProvider, HashEmbeddingProvider, OllamaEmbeddingProvider, OpenAiEmbeddingProvider,
};

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> usize {
    1536
}

fn default_search_limit() -> usize {
    10
}

fn default_min_score() -> f32 {
    0.3
}

fn default_index_path() -> PathBuf {
    PathBuf::from("hindsight-index.db")
}

fn default_archive_path() -> PathBuf {
    PathBuf::from("archive.json")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub enabled: bool,
    /// "openai", "ollama", or "hash" (the offline fallback)
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub dimensions: usize,
    /// Empty means the provider's own default endpoint
    #[serde(default)]
    pub base_url: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "hash".to_string(),
            api_key: String::new(),
            model: default_embedding_model(),
            dimensions: default_embedding_dimensions(),
            base_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
            min_score: default_min_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_index_path")]
    pub index_path: PathBuf,
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            archive_path: default_archive_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Pick the embedding backend once, at construction. Disabled or unknown
    /// providers fall back to the deterministic hash embedder rather than
    /// failing later at call time.
    pub fn build_provider(&self) -> Arc<dyn EmbeddingProvider> {
        if !self.embedding.enabled {
            return Arc::new(HashEmbeddingProvider::new(self.embedding.dimensions));
        }
        match self.embedding.provider.as_str() {
            "openai" => {
                let mut provider = OpenAiEmbeddingProvider::new(
                    self.embedding.api_key.clone(),
                    self.embedding.model.clone(),
                    self.embedding.dimensions,
                );
                if !self.embedding.base_url.is_empty() {
                    provider = provider.with_base_url(self.embedding.base_url.clone());
                }
                Arc::new(provider)
            }
            "ollama" => {
                let mut provider = OllamaEmbeddingProvider::new(
                    self.embedding.model.clone(),
                    self.embedding.dimensions,
                );
                if !self.embedding.base_url.is_empty() {
                    provider = provider.with_base_url(self.embedding.base_url.clone());
                }
                Arc::new(provider)
            }
            other => {
                if other != "hash" {
                    tracing::warn!(provider = other, "unknown embedding provider, using hash fallback");
                }
                Arc::new(HashEmbeddingProvider::new(self.embedding.dimensions))
            }
        }
    }
}
