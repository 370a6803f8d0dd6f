pub mod config;
pub mod engine;
pub mod ingest;

pub use config::{EmbeddingConfig, EngineConfig, SearchConfig, StorageConfig};
pub use engine::InsightEngine;
pub use ingest::parse_archive;
