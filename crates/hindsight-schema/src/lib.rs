use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Positive above 0.1, negative below -0.1, neutral in between.
    pub fn from_score(score: f32) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl Default for SentimentLabel {
    fn default() -> Self {
        SentimentLabel::Neutral
    }
}

/// A topic tag detected in message text via the fixed topic dictionaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Dictionary label, e.g. "relationships"
    pub label: String,
    /// The term that matched, e.g. "partner"
    pub term: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub sentiment_score: f32,
    pub sentiment_label: SentimentLabel,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub key_phrases: Vec<String>,
    pub word_count: usize,
    pub complexity_score: f32,
    pub emotional_intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at,
            metadata: MessageMetadata::default(),
        }
    }
}

/// One chronological chunk of a conversation (roughly a third of it).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalSegment {
    /// Index of the first message in the segment
    pub start_index: usize,
    /// Index of the last message in the segment (inclusive)
    pub end_index: usize,
    pub message_count: usize,
    pub avg_sentiment: f32,
    pub total_words: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMetadata {
    pub summary: String,
    /// Up to 5 frequency-ranked terms
    #[serde(default)]
    pub key_themes: Vec<String>,
    /// Mean of message sentiment scores
    pub sentiment_trend: f32,
    pub importance_score: f32,
    /// Indices into `messages` flagged as breakthrough moments, ascending
    #[serde(default)]
    pub breakthrough_moments: Vec<usize>,
    #[serde(default)]
    pub temporal_segments: Vec<TemporalSegment>,
    #[serde(default)]
    pub topic_cluster: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
}

impl Conversation {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at,
            messages: Vec::new(),
            metadata: ConversationMetadata::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Learning,
    Relationships,
    Goals,
    Emotions,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Learning => "learning",
            Intent::Relationships => "relationships",
            Intent::Goals => "goals",
            Intent::Emotions => "emotions",
            Intent::General => "general",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeContext {
    Recent,
    PastMonth,
    AllTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    What,
    How,
    When,
    Why,
    General,
}

/// Classified shape of a free-text question. Built fresh per query, never
/// persisted across queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryIntent {
    pub intent: Intent,
    /// Labels of every topic dictionary that matched, in dictionary order
    pub entities: Vec<String>,
    pub time_context: TimeContext,
    pub query_type: QueryType,
    /// Intent (unless general) followed by entities; duplicates allowed
    pub focus_areas: Vec<String>,
}

impl QueryIntent {
    pub fn general() -> Self {
        Self {
            intent: Intent::General,
            entities: Vec::new(),
            time_context: TimeContext::AllTime,
            query_type: QueryType::General,
            focus_areas: Vec::new(),
        }
    }
}

/// A supporting snippet for a significant realization inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakthroughMoment {
    pub conversation_id: Uuid,
    pub conversation_title: String,
    pub date: DateTime<Utc>,
    pub message_index: usize,
    /// Message content truncated to 200 characters
    pub content: String,
    pub sentiment: f32,
    pub emotional_intensity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineStage {
    pub stage: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportingConversation {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub similarity_score: f32,
    pub key_themes: Vec<String>,
    pub sentiment_trend: f32,
}

/// The caller-facing answer to a growth question. Always well-formed: failed
/// or empty queries produce a low-confidence insight, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedInsight {
    pub topic: String,
    pub summary: String,
    pub key_learnings: Vec<String>,
    pub evolution_timeline: Vec<TimelineStage>,
    pub breakthrough_moments: Vec<BreakthroughMoment>,
    pub next_steps: Vec<String>,
    pub confidence_score: f32,
    pub supporting_conversations: Vec<SupportingConversation>,
    pub intent: QueryIntent,
    pub generated_at: DateTime<Utc>,
}
