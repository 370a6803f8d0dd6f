use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use hindsight_enrich::lexicon::is_stopword;
use hindsight_enrich::text::tokenize;
use hindsight_index::{embedding_text, IndexError, VectorIndex};
use hindsight_schema::{Conversation, Intent, QueryIntent};

use crate::vocab::{entity_expansions, intent_expansions};

const MATCHED_TERM_LIMIT: usize = 5;
const HIGHLIGHT_LIMIT: usize = 3;
const HIGHLIGHT_MIN_OVERLAP: f32 = 0.3;

/// A single hit: the conversation is shared with the archive, not owned.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub conversation: Arc<Conversation>,
    pub similarity_score: f32,
    pub matched_terms: Vec<String>,
    pub relevance_explanation: String,
    pub message_highlights: Vec<MessageHighlight>,
}

#[derive(Debug, Clone)]
pub struct MessageHighlight {
    pub message_index: usize,
    pub content: String,
    pub overlap_ratio: f32,
}

/// Intent-aware semantic search over the vector index. Over-fetches twice
/// the requested limit so that stale index entries and borderline scores can
/// be filtered without starving the result list.
pub struct SemanticSearch {
    limit: usize,
    min_score: f32,
}

impl SemanticSearch {
    pub fn new(limit: usize, min_score: f32) -> Self {
        Self {
            limit: limit.max(1),
            min_score,
        }
    }

    pub async fn search(
        &self,
        index: &VectorIndex,
        conversations: &HashMap<Uuid, Arc<Conversation>>,
        query: &str,
        intent: &QueryIntent,
    ) -> Result<Vec<SearchResult>, IndexError> {
        let expanded = expand_query(query, intent);
        let candidates = index
            .search(&expanded, self.limit * 2, self.min_score)
            .await?;

        let mut results = Vec::new();
        for (id, score) in candidates {
            if results.len() == self.limit {
                break;
            }
            let Some(convo) = conversations.get(&id) else {
                // index entry outlived its conversation; skip, don't fail
                debug!(conversation = %id, "stale index entry skipped");
                continue;
            };
            results.push(build_result(Arc::clone(convo), score, query, intent));
        }
        Ok(results)
    }
}

/// Original query text plus up to the first 3 intent expansion terms plus up
/// to the first 2 expansion terms per detected entity, space-joined. Term
/// order follows the fixed dictionaries, never frequency.
pub fn expand_query(query: &str, intent: &QueryIntent) -> String {
    let mut parts: Vec<String> = vec![query.to_string()];
    parts.extend(
        intent_expansions(intent.intent)
            .iter()
            .take(3)
            .map(|t| t.to_string()),
    );
    for entity in &intent.entities {
        if let Some(terms) = entity_expansions(entity) {
            parts.extend(terms.iter().take(2).map(|t| t.to_string()));
        }
    }
    parts.join(" ")
}

fn build_result(
    conversation: Arc<Conversation>,
    similarity_score: f32,
    query: &str,
    intent: &QueryIntent,
) -> SearchResult {
    let matched_terms = matched_terms(&conversation, query);
    let relevance_explanation = relevance_explanation(&conversation, similarity_score, intent);
    let message_highlights = message_highlights(&conversation, query);
    SearchResult {
        conversation,
        similarity_score,
        matched_terms,
        relevance_explanation,
        message_highlights,
    }
}

/// Stopword-filtered intersection of query words and the conversation's
/// embedding text, in query order, capped at 5.
pub fn matched_terms(convo: &Conversation, query: &str) -> Vec<String> {
    let convo_words: HashSet<String> = tokenize(&embedding_text(convo)).into_iter().collect();
    let mut terms = Vec::new();
    for token in tokenize(query) {
        if terms.len() == MATCHED_TERM_LIMIT {
            break;
        }
        if is_stopword(&token) || terms.contains(&token) {
            continue;
        }
        if convo_words.contains(&token) {
            terms.push(token);
        }
    }
    terms
}

/// Semicolon-joined explanation: intent clause (unless general), entity
/// clause (if any), a score band, and the first two key themes (if any).
pub fn relevance_explanation(convo: &Conversation, score: f32, intent: &QueryIntent) -> String {
    let mut clauses = Vec::new();
    if intent.intent != Intent::General {
        clauses.push(format!("Aligned with your {} focus", intent.intent.as_str()));
    }
    if !intent.entities.is_empty() {
        clauses.push(format!("Touches on {}", intent.entities.join(", ")));
    }
    clauses.push(
        if score > 0.8 {
            "High semantic similarity"
        } else if score > 0.6 {
            "Good semantic match"
        } else {
            "Moderate relevance"
        }
        .to_string(),
    );
    if !convo.metadata.key_themes.is_empty() {
        let themes: Vec<&str> = convo
            .metadata
            .key_themes
            .iter()
            .take(2)
            .map(String::as_str)
            .collect();
        clauses.push(format!("Key themes: {}", themes.join(", ")));
    }
    clauses.join("; ")
}

/// Messages whose word overlap with the query exceeds 0.3 of the query's
/// words, highest overlap first, capped at 3.
pub fn message_highlights(convo: &Conversation, query: &str) -> Vec<MessageHighlight> {
    let query_words: HashSet<String> = tokenize(query).into_iter().collect();
    if query_words.is_empty() {
        return Vec::new();
    }

    let mut highlights: Vec<MessageHighlight> = convo
        .messages
        .iter()
        .enumerate()
        .filter_map(|(message_index, msg)| {
            let words: HashSet<String> = tokenize(&msg.content).into_iter().collect();
            let common = words.intersection(&query_words).count();
            let overlap_ratio = common as f32 / query_words.len() as f32;
            (overlap_ratio > HIGHLIGHT_MIN_OVERLAP).then(|| MessageHighlight {
                message_index,
                content: msg.content.clone(),
                overlap_ratio,
            })
        })
        .collect();

    highlights.sort_by(|a, b| b.overlap_ratio.total_cmp(&a.overlap_ratio));
    highlights.truncate(HIGHLIGHT_LIMIT);
    highlights
}
