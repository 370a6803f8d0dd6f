pub mod embedding;
pub mod error;
pub mod index;

pub use embedding::{
    EmbeddingProvider, EmbeddingResult, HashEmbeddingProvider, OllamaEmbeddingProvider,
    OpenAiEmbeddingProvider,
};
pub use error::IndexError;
pub use index::{embedding_text, VectorIndex};
