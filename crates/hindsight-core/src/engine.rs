use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use hindsight_enrich::Enricher;
use hindsight_index::{EmbeddingProvider, IndexError, VectorIndex};
use hindsight_insight::InsightSynthesizer;
use hindsight_query::{classify, SemanticSearch};
use hindsight_schema::{Conversation, GeneratedInsight};

use crate::config::EngineConfig;

/// Owns the whole pipeline: enriched archive, vector index, search, and
/// synthesis. Index rebuilds take the write lock, so they are serialized
/// against concurrent queries; a query never observes a half-built index.
pub struct InsightEngine {
    config: EngineConfig,
    provider: Arc<dyn EmbeddingProvider>,
    enricher: Enricher,
    synthesizer: InsightSynthesizer,
    search: SemanticSearch,
    index: RwLock<VectorIndex>,
    conversations: RwLock<HashMap<Uuid, Arc<Conversation>>>,
}

impl InsightEngine {
    pub fn new(config: EngineConfig) -> Self {
        let provider = config.build_provider();
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: EngineConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let search = SemanticSearch::new(config.search.limit, config.search.min_score);
        Self {
            search,
            enricher: Enricher::new(),
            synthesizer: InsightSynthesizer::new(),
            index: RwLock::new(VectorIndex::new(Arc::clone(&provider))),
            conversations: RwLock::new(HashMap::new()),
            provider,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Enrich and install an archive, replacing any previous one. Returns
    /// the number of conversations loaded.
    pub async fn load_archive(&self, mut conversations: Vec<Conversation>) -> usize {
        self.enricher.enrich_all(&mut conversations);
        let mut map = self.conversations.write().await;
        map.clear();
        for convo in conversations {
            map.insert(convo.id, Arc::new(convo));
        }
        info!(count = map.len(), "archive loaded and enriched");
        map.len()
    }

    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Re-embed every conversation and swap the result in. Held behind the
    /// index write lock for its whole duration.
    pub async fn rebuild_index(&self) -> Result<usize, IndexError> {
        let mut ordered: Vec<Arc<Conversation>> = {
            let map = self.conversations.read().await;
            map.values().cloned().collect()
        };
        // stable ordering keeps rebuilds reproducible across runs
        ordered.sort_by_key(|c| (c.created_at, c.id));

        let mut index = self.index.write().await;
        index.rebuild(&ordered).await
    }

    pub async fn save_index(&self, path: &Path) -> Result<(), IndexError> {
        self.index.read().await.save(path).await
    }

    /// Swap in a previously saved snapshot without re-embedding.
    pub async fn load_index(&self, path: &Path) -> Result<usize, IndexError> {
        let loaded = VectorIndex::load(path, Arc::clone(&self.provider)).await?;
        let count = loaded.len();
        *self.index.write().await = loaded;
        Ok(count)
    }

    /// Answer a growth question. Never fails: an unavailable embedding
    /// backend degrades to the empty insight, any other failure becomes the
    /// fixed error insight, and zero matches is its own non-error outcome.
    pub async fn ask(&self, query: &str) -> GeneratedInsight {
        let intent = classify(query);

        let outcome = {
            let index = self.index.read().await;
            let conversations = self.conversations.read().await;
            self.search
                .search(&index, &conversations, query, &intent)
                .await
        };

        match outcome {
            Ok(results) if results.is_empty() => {
                info!(query, "no matching conversations");
                self.synthesizer.empty_insight(&intent)
            }
            Ok(results) => {
                let analysis = self.synthesizer.analyze(&results, &intent);
                self.synthesizer.synthesize(query, &intent, &analysis, &results)
            }
            Err(IndexError::Unavailable(reason)) => {
                warn!(query, %reason, "embedding backend unavailable, degrading to empty insight");
                self.synthesizer.empty_insight(&intent)
            }
            Err(err) => {
                error!(query, error = %err, "query processing failed");
                self.synthesizer.error_insight()
            }
        }
    }
}
