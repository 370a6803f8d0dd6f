use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::IndexError;

/// Bounded timeout for any external embedding call; a timeout degrades to
/// `IndexError::Unavailable`, never a hang or a crash.
const EMBED_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub embeddings: Vec<Vec<f32>>,
    pub model: String,
    pub dimensions: usize,
}

/// Injectable embedding capability. Selected at construction time from
/// configuration; absence of a real backend is expressed by wiring in
/// [`HashEmbeddingProvider`], not by probing at call time.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<EmbeddingResult, IndexError>;
    fn model_id(&self) -> &str;
    fn dimensions(&self) -> usize;
}

// ---------------------------------------------------------------------------
// OpenAI-compatible provider
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
    base_url: String,
}

impl OpenAiEmbeddingProvider {
    pub fn new(api_key: String, model: String, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(EMBED_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key,
            model,
            dimensions,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[derive(Debug, Serialize)]
struct OpenAiEmbedRequest {
    model: String,
    input: Vec<String>,
    encoding_format: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedRow>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedRow {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbeddingResult, IndexError> {
        if texts.is_empty() {
            return Ok(EmbeddingResult {
                embeddings: Vec::new(),
                model: self.model.clone(),
                dimensions: self.dimensions,
            });
        }

        let endpoint = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let request = OpenAiEmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
            encoding_format: "float".to_string(),
        };

        let response = self
            .client
            .post(endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        let mut parsed: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        parsed.data.sort_by_key(|row| row.index);
        for (expected, row) in parsed.data.iter().enumerate() {
            if row.index != expected {
                return Err(IndexError::ShapeMismatch(format!(
                    "missing or duplicated embedding index {expected}"
                )));
            }
        }

        let embeddings: Vec<Vec<f32>> = parsed.data.into_iter().map(|row| row.embedding).collect();
        check_shape(&embeddings, texts.len(), self.dimensions)?;

        Ok(EmbeddingResult {
            embeddings,
            model: parsed.model,
            dimensions: self.dimensions,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Ollama provider
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    model: String,
    dimensions: usize,
    base_url: String,
}

impl OllamaEmbeddingProvider {
    pub fn new(model: String, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(EMBED_TIMEOUT)
                .build()
                .unwrap_or_default(),
            model,
            dimensions,
            base_url: "http://localhost:11434".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[derive(Debug, Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbeddingResult, IndexError> {
        if texts.is_empty() {
            return Ok(EmbeddingResult {
                embeddings: Vec::new(),
                model: self.model.clone(),
                dimensions: self.dimensions,
            });
        }

        let endpoint = format!("{}/api/embed", self.base_url.trim_end_matches('/'));
        let request = OllamaEmbedRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        let parsed: OllamaEmbedResponse = response
            .json()
            .await
            .map_err(|e| IndexError::Unavailable(e.to_string()))?;

        check_shape(&parsed.embeddings, texts.len(), self.dimensions)?;

        Ok(EmbeddingResult {
            embeddings: parsed.embeddings,
            model: self.model.clone(),
            dimensions: self.dimensions,
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// Deterministic hash provider (offline / test fallback)
// ---------------------------------------------------------------------------

/// Token-bag hashing: each word is hashed into a bucket with a hash-derived
/// sign, and the buckets are summed. Texts sharing vocabulary land near each
/// other, which keeps retrieval meaningful without any model — unlike a
/// whole-text hash, which would make every pair of texts unrelated.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dims: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dims: usize) -> Self {
        Self { dims: dims.max(1) }
    }

    fn accumulate(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dims];
        for raw in text.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let digest = Sha256::digest(word.as_bytes());
            let bucket =
                u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize % self.dims;
            let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }
        vector
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, texts: &[String]) -> Result<EmbeddingResult, IndexError> {
        let embeddings = texts.iter().map(|t| self.accumulate(t)).collect();
        Ok(EmbeddingResult {
            embeddings,
            model: "token-hash".to_string(),
            dimensions: self.dims,
        })
    }

    fn model_id(&self) -> &str {
        "token-hash"
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

fn check_shape(
    embeddings: &[Vec<f32>],
    expected_count: usize,
    expected_dims: usize,
) -> Result<(), IndexError> {
    if embeddings.len() != expected_count {
        return Err(IndexError::ShapeMismatch(format!(
            "expected {expected_count} embeddings, got {}",
            embeddings.len()
        )));
    }
    if embeddings.iter().any(|e| e.len() != expected_dims) {
        return Err(IndexError::ShapeMismatch(format!(
            "embedding dimensions differ from configured {expected_dims}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::l2_normalize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let a = l2_normalize(a.to_vec());
        let b = l2_normalize(b.to_vec());
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn hash_provider_is_deterministic() {
        let provider = HashEmbeddingProvider::new(64);
        let texts = vec!["boundaries with my partner".to_string()];
        let first = provider.embed(&texts).await.unwrap();
        let second = provider.embed(&texts).await.unwrap();
        assert_eq!(first.embeddings, second.embeddings);
        assert_eq!(first.dimensions, 64);
        assert_eq!(first.model, "token-hash");
    }

    #[tokio::test]
    async fn hash_provider_reflects_vocabulary_overlap() {
        let provider = HashEmbeddingProvider::new(128);
        let texts = vec![
            "setting boundaries with my partner at home".to_string(),
            "boundaries with my partner".to_string(),
            "quarterly tax filing deadline spreadsheet".to_string(),
        ];
        let result = provider.embed(&texts).await.unwrap();
        let related = cosine(&result.embeddings[0], &result.embeddings[1]);
        let unrelated = cosine(&result.embeddings[0], &result.embeddings[2]);
        assert!(
            related > unrelated,
            "overlapping texts should score higher ({related} vs {unrelated})"
        );
    }

    #[tokio::test]
    async fn hash_provider_empty_batch() {
        let provider = HashEmbeddingProvider::new(16);
        let result = provider.embed(&[]).await.unwrap();
        assert!(result.embeddings.is_empty());
    }

    #[tokio::test]
    async fn openai_provider_parses_reordered_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"embedding": [0.0, 1.0], "index": 1},
                    {"embedding": [1.0, 0.0], "index": 0}
                ],
                "model": "text-embedding-3-small"
            })))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::new(
            "key".to_string(),
            "text-embedding-3-small".to_string(),
            2,
        )
        .with_base_url(server.uri());

        let result = provider
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(result.embeddings[0], vec![1.0, 0.0]);
        assert_eq!(result.embeddings[1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn openai_provider_rejects_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}],
                "model": "text-embedding-3-small"
            })))
            .mount(&server)
            .await;

        let provider = OpenAiEmbeddingProvider::new(
            "key".to_string(),
            "text-embedding-3-small".to_string(),
            2,
        )
        .with_base_url(server.uri());

        let err = provider.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, IndexError::ShapeMismatch(_)));
    }

    #[tokio::test]
    async fn openai_provider_http_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider =
            OpenAiEmbeddingProvider::new("key".to_string(), "m".to_string(), 2)
                .with_base_url(server.uri());

        let err = provider.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, IndexError::Unavailable(_)));
    }

    #[tokio::test]
    async fn ollama_provider_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[0.5, 0.5]]
            })))
            .mount(&server)
            .await;

        let provider = OllamaEmbeddingProvider::new("nomic-embed-text".to_string(), 2)
            .with_base_url(server.uri());

        let result = provider.embed(&["hello".to_string()]).await.unwrap();
        assert_eq!(result.embeddings.len(), 1);
        assert_eq!(result.model, "nomic-embed-text");
    }

    #[test]
    fn openai_request_serializes_expected_fields() {
        let request = OpenAiEmbedRequest {
            model: "text-embedding-3-small".to_string(),
            input: vec!["hello".to_string()],
            encoding_format: "float".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "text-embedding-3-small");
        assert_eq!(json["encoding_format"], "float");
        assert_eq!(json["input"][0], "hello");
    }
}
