use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use hindsight_core::{parse_archive, EngineConfig, InsightEngine};
use hindsight_index::{EmbeddingProvider, EmbeddingResult, HashEmbeddingProvider, IndexError};
use hindsight_insight::render_text;
use hindsight_schema::{Intent, QueryType};

const ARCHIVE_JSON: &str = r#"[
    {
        "id": "11111111-1111-4111-8111-111111111111",
        "title": "Setting boundaries",
        "created_at": "2026-05-01T09:00:00Z",
        "messages": [
            {"role": "user", "content": "I keep overcommitting and my relationship with my partner suffers because I have no boundaries."},
            {"role": "assistant", "content": "What makes saying no feel hard for you? It might help to look at where that pressure comes from and what you are afraid of losing."},
            {"role": "user", "content": "I finally understood that saying no protects my relationships. I am thrilled, it feels amazing and I am so grateful."},
            {"role": "user", "content": "I will practice saying no to one request this week."}
        ]
    },
    {
        "id": "22222222-2222-4222-8222-222222222222",
        "title": "Work stress",
        "created_at": "2026-05-20T18:30:00Z",
        "messages": [
            {"role": "user", "content": "Work has been stressful and exhausting, my manager keeps adding deadlines and I feel overwhelmed."},
            {"role": "assistant", "content": "That sounds like a heavy load. Have you been able to talk to your manager about priorities?"},
            {"role": "user", "content": "Not yet. I need to plan that conversation carefully."}
        ]
    },
    {
        "id": "33333333-3333-4333-8333-333333333333",
        "title": "Learning to say no",
        "created_at": "2026-06-10T10:00:00Z",
        "messages": [
            {"role": "user", "content": "Boundaries again. I said no to a weekend project and it went better than expected, I am proud of the progress."},
            {"role": "assistant", "content": "That is real progress. Protecting your time is a skill that compounds."}
        ]
    },
    {
        "id": "44444444-4444-4444-8444-444444444444",
        "title": "Pasta recipes",
        "created_at": "2026-06-15T19:00:00Z",
        "messages": [
            {"role": "user", "content": "Looking for a simple pasta recipe with basil and tomatoes for dinner tonight."},
            {"role": "assistant", "content": "A quick tomato basil pasta works well: garlic, olive oil, fresh tomatoes, torn basil at the end."}
        ]
    }
]"#;

fn test_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.embedding.dimensions = 256;
    config.search.limit = 10;
    // hash embeddings are weaker than a real model; accept any cosine so
    // ranking, not thresholding, decides what surfaces
    config.search.min_score = -1.0;
    config
}

async fn engine_with_archive() -> InsightEngine {
    let engine = InsightEngine::new(test_config());
    let conversations = parse_archive(ARCHIVE_JSON).unwrap();
    assert_eq!(engine.load_archive(conversations).await, 4);
    engine.rebuild_index().await.unwrap();
    engine
}

struct FailingProvider;

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed(&self, _texts: &[String]) -> Result<EmbeddingResult, IndexError> {
        Err(IndexError::Unavailable("backend down".to_string()))
    }

    fn model_id(&self) -> &str {
        "failing"
    }

    fn dimensions(&self) -> usize {
        8
    }
}

#[tokio::test]
async fn boundaries_question_surfaces_the_boundary_conversations() {
    let engine = engine_with_archive().await;
    let insight = engine
        .ask("What have I learned about relationships and boundaries?")
        .await;

    // "learn" is checked before "relationship", so learning wins
    assert_eq!(insight.intent.intent, Intent::Learning);
    assert!(insight.intent.entities.contains(&"relationships".to_string()));
    assert!(insight.intent.entities.contains(&"boundaries".to_string()));
    assert_eq!(insight.intent.query_type, QueryType::What);

    let supporting_ids: Vec<String> = insight
        .supporting_conversations
        .iter()
        .map(|s| s.id.to_string())
        .collect();
    assert!(
        supporting_ids.contains(&"11111111-1111-4111-8111-111111111111".to_string()),
        "boundary conversation missing from {supporting_ids:?}"
    );

    assert!(insight.confidence_score > 0.0);
    assert!(insight.confidence_score <= 1.0);
    assert!(!insight.key_learnings.is_empty());
    assert!(insight.key_learnings.len() <= 5);
    assert!(insight.next_steps.len() <= 4);
    assert!(insight.breakthrough_moments.len() <= 3);
}

#[tokio::test]
async fn breakthrough_message_is_reported() {
    let engine = engine_with_archive().await;
    let insight = engine
        .ask("What have I learned about boundaries?")
        .await;

    assert!(
        insight
            .breakthrough_moments
            .iter()
            .any(|m| m.content.contains("finally understood")),
        "expected the realization message among {:?}",
        insight.breakthrough_moments
    );
}

#[tokio::test]
async fn empty_archive_yields_the_fixed_empty_insight() {
    let engine = InsightEngine::new(test_config());
    let insight = engine.ask("What have I learned about anything?").await;

    assert!((insight.confidence_score - 0.1).abs() < f32::EPSILON);
    assert_eq!(
        insight.key_learnings,
        vec!["Consider starting conversations about this topic to build insights".to_string()]
    );
    assert!(insight.breakthrough_moments.is_empty());
    assert!(insight.supporting_conversations.is_empty());
}

#[tokio::test]
async fn how_question_classifies_query_type() {
    let engine = InsightEngine::new(test_config());
    let insight = engine.ask("How do I handle stress?").await;
    assert_eq!(insight.intent.query_type, QueryType::How);
}

#[tokio::test]
async fn unavailable_backend_degrades_to_empty_insight() {
    let engine = InsightEngine::with_provider(test_config(), Arc::new(FailingProvider));
    let conversations = parse_archive(ARCHIVE_JSON).unwrap();
    engine.load_archive(conversations).await;

    // rebuild fails loudly for the operator...
    assert!(matches!(
        engine.rebuild_index().await,
        Err(IndexError::Unavailable(_))
    ));

    // ...but asking still returns a well-formed low-confidence insight
    let insight = engine.ask("What have I learned about boundaries?").await;
    assert!((insight.confidence_score - 0.1).abs() < f32::EPSILON);
    assert!(insight.supporting_conversations.is_empty());
}

#[tokio::test]
async fn saved_index_answers_identically_after_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.db");
    let query = "What have I learned about boundaries?";

    let engine = engine_with_archive().await;
    let before = engine.ask(query).await;
    engine.save_index(&path).await.unwrap();

    // second engine: same archive, snapshot instead of re-embedding
    let restored = InsightEngine::new(test_config());
    restored
        .load_archive(parse_archive(ARCHIVE_JSON).unwrap())
        .await;
    let loaded = restored.load_index(&path).await.unwrap();
    assert_eq!(loaded, 4);
    let after = restored.ask(query).await;

    let ids = |insight: &hindsight_schema::GeneratedInsight| {
        insight
            .supporting_conversations
            .iter()
            .map(|s| (s.id, s.similarity_score))
            .collect::<Vec<_>>()
    };
    let before_ids = ids(&before);
    let after_ids = ids(&after);
    assert_eq!(before_ids.len(), after_ids.len());
    for (b, a) in before_ids.iter().zip(after_ids.iter()) {
        assert_eq!(b.0, a.0);
        assert!((b.1 - a.1).abs() < 1e-6);
    }
}

#[tokio::test]
async fn model_mismatch_rejects_stale_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("index.db");

    let engine = engine_with_archive().await;
    engine.save_index(&path).await.unwrap();

    let other = InsightEngine::with_provider(test_config(), Arc::new(FailingProvider));
    assert!(matches!(
        other.load_index(&path).await,
        Err(IndexError::ModelMismatch { .. })
    ));
}

#[tokio::test]
async fn rendered_text_has_the_contract_sections() {
    let engine = engine_with_archive().await;
    let insight = engine
        .ask("What have I learned about relationships and boundaries?")
        .await;
    let text = render_text(&insight);

    assert!(text.starts_with("Personal Growth Insights:"));
    assert!(text.contains("Summary:"));
    assert!(text.contains("Key Learnings:"));
    assert!(text.contains("Next Steps:"));
    let last_line = text.lines().last().unwrap();
    assert!(last_line.starts_with("Confidence: "));
    assert!(last_line.ends_with('%'));
}

#[tokio::test]
async fn hash_provider_matches_engine_default() {
    // the engine's offline default is the deterministic hash embedder
    let provider = HashEmbeddingProvider::new(256);
    let config = test_config();
    assert_eq!(config.build_provider().model_id(), provider.model_id());
}
