use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use hindsight_schema::{Conversation, ConversationMetadata, Message, MessageRole};

/// One conversation as it appears in an exported archive. Everything except
/// the messages is optional; exports from different tools disagree on shape.
#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    role: String,
    content: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Parse a JSON archive (an array of conversations) into schema shapes.
/// A malformed conversation or message is skipped with a warning; the rest
/// of the batch always survives.
pub fn parse_archive(json: &str) -> Result<Vec<Conversation>> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(json).context("archive is not a JSON array")?;

    let mut conversations = Vec::new();
    for (index, value) in values.into_iter().enumerate() {
        match parse_conversation(value) {
            Ok(convo) => conversations.push(convo),
            Err(err) => warn!(index, error = %err, "skipping malformed conversation"),
        }
    }
    Ok(conversations)
}

fn parse_conversation(value: serde_json::Value) -> Result<Conversation> {
    let raw: RawConversation = serde_json::from_value(value).context("bad conversation shape")?;
    let created_at = raw.created_at.unwrap_or_else(Utc::now);
    let id = raw
        .id
        .as_deref()
        .and_then(|s| s.parse::<Uuid>().ok())
        .unwrap_or_else(Uuid::new_v4);

    let mut messages = Vec::new();
    for (index, msg_value) in raw.messages.into_iter().enumerate() {
        match parse_message(msg_value, created_at) {
            Ok(msg) => messages.push(msg),
            Err(err) => warn!(index, error = %err, "skipping malformed message"),
        }
    }

    Ok(Conversation {
        id,
        title: raw.title.unwrap_or_else(|| "Untitled conversation".to_string()),
        created_at,
        messages,
        metadata: ConversationMetadata::default(),
    })
}

fn parse_message(value: serde_json::Value, fallback_ts: DateTime<Utc>) -> Result<Message> {
    let raw: RawMessage = serde_json::from_value(value).context("bad message shape")?;
    let role = parse_role(&raw.role)
        .with_context(|| format!("unknown message role '{}'", raw.role))?;
    Ok(Message::new(
        role,
        raw.content,
        raw.created_at.unwrap_or(fallback_ts),
    ))
}

fn parse_role(role: &str) -> Option<MessageRole> {
    match role.to_lowercase().as_str() {
        "user" | "human" => Some(MessageRole::User),
        "assistant" | "ai" | "bot" | "model" => Some(MessageRole::Assistant),
        _ => None,
    }
}
