use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;
use tracing::info;
use uuid::Uuid;

use hindsight_schema::{Conversation, MessageRole};

use crate::embedding::EmbeddingProvider;
use crate::error::IndexError;

const KEY_MESSAGE_LIMIT: usize = 5;
const LONG_REPLY_MIN_CHARS: usize = 80;
const REPLY_TRUNCATE_CHARS: usize = 200;

/// One indexed conversation: id plus its L2-normalized embedding.
#[derive(Debug, Clone)]
struct IndexEntry {
    conversation_id: Uuid,
    vector: Vec<f32>,
}

/// In-memory cosine index over conversation embeddings. `rebuild` replaces
/// the whole contents (reset-then-add); vectors are normalized on the way in
/// so the inner product of two entries is their cosine similarity.
pub struct VectorIndex {
    provider: Arc<dyn EmbeddingProvider>,
    entries: Vec<IndexEntry>,
    model: String,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("entries", &self.entries.len())
            .field("model", &self.model)
            .finish()
    }
}

impl VectorIndex {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let model = provider.model_id().to_string();
        Self {
            provider,
            entries: Vec::new(),
            model,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    /// Full rebuild from scratch. Prior contents are only discarded once the
    /// new embeddings are in hand, so a failed rebuild leaves the previous
    /// index intact.
    pub async fn rebuild(
        &mut self,
        conversations: &[Arc<Conversation>],
    ) -> Result<usize, IndexError> {
        let texts: Vec<String> = conversations.iter().map(|c| embedding_text(c)).collect();
        let result = self.provider.embed(&texts).await?;
        if result.embeddings.len() != conversations.len() {
            return Err(IndexError::ShapeMismatch(format!(
                "expected {} embeddings, got {}",
                conversations.len(),
                result.embeddings.len()
            )));
        }

        let entries: Vec<IndexEntry> = conversations
            .iter()
            .zip(result.embeddings)
            .map(|(convo, vector)| IndexEntry {
                conversation_id: convo.id,
                vector: l2_normalize(vector),
            })
            .collect();

        self.entries = entries;
        self.model = self.provider.model_id().to_string();
        info!(count = self.entries.len(), model = %self.model, "vector index rebuilt");
        Ok(self.entries.len())
    }

    /// Up to `limit` conversation ids with cosine similarity >= `min_score`,
    /// most similar first.
    pub async fn search(
        &self,
        query_text: &str,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<(Uuid, f32)>, IndexError> {
        let embedded = self.provider.embed(&[query_text.to_string()]).await?;
        let query = embedded
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| IndexError::ShapeMismatch("empty query embedding".to_string()))?;
        let query = l2_normalize(query);

        let mut scored: Vec<(Uuid, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry.conversation_id, dot(&query, &entry.vector)))
            .filter(|(_, score)| *score >= min_score)
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        Ok(scored)
    }

    /// Snapshot the index to a sqlite file: id list, embedding vectors as
    /// JSON arrays, and the embedding model id in a meta table.
    pub async fn save(&self, path: &Path) -> Result<(), IndexError> {
        let rows: Vec<(String, String)> = self
            .entries
            .iter()
            .map(|entry| {
                let json = serde_json::to_string(&entry.vector)
                    .context("serialize embedding")?;
                Ok((entry.conversation_id.to_string(), json))
            })
            .collect::<anyhow::Result<_>>()?;
        let model = self.model.clone();
        let path: PathBuf = path.to_owned();

        run_blocking(move || {
            let conn = Connection::open(&path)?;
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS vectors (
                    conversation_id TEXT PRIMARY KEY,
                    embedding TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS meta (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                "#,
            )?;
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM vectors", [])?;
            for (id, embedding) in rows {
                tx.execute(
                    "INSERT INTO vectors(conversation_id, embedding) VALUES (?1, ?2)",
                    params![id, embedding],
                )?;
            }
            tx.execute(
                r#"
                INSERT INTO meta(key, value) VALUES('embedding_model', ?1)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
                params![model],
            )?;
            tx.execute(
                r#"
                INSERT INTO meta(key, value) VALUES('saved_at', ?1)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
                params![chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        Ok(())
    }

    /// Restore a snapshot without re-embedding. A snapshot written by a
    /// different embedding model is rejected so scores stay comparable.
    pub async fn load(
        path: &Path,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, IndexError> {
        let path_owned: PathBuf = path.to_owned();
        let (model, rows) = run_blocking(move || {
            let conn = Connection::open(&path_owned)?;
            let model: Option<String> = conn
                .query_row(
                    "SELECT value FROM meta WHERE key = 'embedding_model'",
                    [],
                    |r| r.get(0),
                )
                .optional()?;
            let model = model.ok_or_else(|| anyhow!("snapshot has no embedding model recorded"))?;

            let mut stmt = conn.prepare("SELECT conversation_id, embedding FROM vectors")?;
            let mapped = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
            })?;
            let mut rows = Vec::new();
            for row in mapped {
                rows.push(row?);
            }
            Ok((model, rows))
        })
        .await?;

        if model != provider.model_id() {
            return Err(IndexError::ModelMismatch {
                snapshot: model,
                provider: provider.model_id().to_string(),
            });
        }

        let mut entries = Vec::with_capacity(rows.len());
        for (id, embedding_json) in rows {
            let conversation_id: Uuid = id
                .parse()
                .map_err(|e| IndexError::Storage(anyhow!("bad conversation id {id}: {e}")))?;
            let vector: Vec<f32> = serde_json::from_str(&embedding_json)
                .context("parse stored embedding")?;
            entries.push(IndexEntry {
                conversation_id,
                vector,
            });
        }

        info!(count = entries.len(), model = %model, "vector index loaded from snapshot");
        Ok(Self {
            provider,
            entries,
            model,
        })
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, IndexError>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    task::spawn_blocking(f)
        .await
        .map_err(|e| IndexError::Storage(anyhow!("blocking task failed: {e}")))?
        .map_err(IndexError::Storage)
}

/// The condensed text a conversation is embedded from: title, summary, and
/// up to five key messages. User messages come first; long assistant replies
/// (truncated to 200 characters) fill the remaining slots. This exact
/// composition drives retrieval behavior.
pub fn embedding_text(convo: &Conversation) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !convo.title.is_empty() {
        parts.push(convo.title.clone());
    }
    if !convo.metadata.summary.is_empty() {
        parts.push(convo.metadata.summary.clone());
    }

    let mut key_messages: Vec<String> = Vec::new();
    for msg in &convo.messages {
        if key_messages.len() == KEY_MESSAGE_LIMIT {
            break;
        }
        if msg.role == MessageRole::User && !msg.content.trim().is_empty() {
            key_messages.push(msg.content.clone());
        }
    }
    for msg in &convo.messages {
        if key_messages.len() == KEY_MESSAGE_LIMIT {
            break;
        }
        if msg.role == MessageRole::Assistant && msg.content.chars().count() > LONG_REPLY_MIN_CHARS
        {
            key_messages.push(msg.content.chars().take(REPLY_TRUNCATE_CHARS).collect());
        }
    }
    parts.extend(key_messages);

    parts.join("\n")
}

pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
    vector
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
