use thiserror::Error;

/// Index failures. `Unavailable` is deliberately distinct from an empty
/// search result: callers degrade to empty-result behavior on it, but the
/// two outcomes are never conflated in a return value.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("embedding shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("index snapshot was built with model '{snapshot}' but provider is '{provider}'")]
    ModelMismatch { snapshot: String, provider: String },

    #[error("index storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
