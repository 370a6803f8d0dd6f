use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use hindsight_enrich::lexicon::ACTION_KEYWORDS;
use hindsight_enrich::text::truncate_chars;
use hindsight_query::SearchResult;
use hindsight_schema::{BreakthroughMoment, MessageRole, QueryIntent, SentimentLabel};

const BREAKTHROUGH_LIMIT: usize = 5;
const ACTIONABLE_LIMIT: usize = 5;
const SNIPPET_MAX_CHARS: usize = 200;

pub const PATTERN_EVOLUTIONARY: &str = "evolutionary";
pub const PATTERN_INSUFFICIENT: &str = "insufficient_data";

#[derive(Debug, Clone)]
pub struct SentimentSummary {
    pub average: f32,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone)]
pub struct EvolutionStage {
    pub description: String,
    pub avg_sentiment: f32,
    pub dominant_themes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EvolutionPattern {
    /// "evolutionary" with two or more results, "insufficient_data" otherwise
    pub pattern: String,
    pub stages: Vec<EvolutionStage>,
}

/// Aggregate view over one query's search results, consumed by synthesis.
#[derive(Debug, Clone)]
pub struct InsightAnalysis {
    pub date_range: (DateTime<Utc>, DateTime<Utc>),
    pub key_themes: Vec<String>,
    pub sentiment: SentimentSummary,
    pub breakthroughs: Vec<BreakthroughMoment>,
    pub evolution: EvolutionPattern,
    pub common_patterns: Vec<String>,
    pub actionable_insights: Vec<String>,
}

pub fn analyze(results: &[SearchResult], intent: &QueryIntent) -> InsightAnalysis {
    debug!(
        intent = intent.intent.as_str(),
        results = results.len(),
        "analyzing search results"
    );

    InsightAnalysis {
        date_range: date_range(results),
        key_themes: rank_by_frequency(
            results
                .iter()
                .flat_map(|r| r.conversation.metadata.key_themes.iter().cloned()),
            5,
        ),
        sentiment: sentiment_summary(results),
        breakthroughs: collect_breakthroughs(results),
        evolution: evolution_pattern(results),
        common_patterns: common_patterns(results),
        actionable_insights: actionable_insights(results),
    }
}

fn date_range(results: &[SearchResult]) -> (DateTime<Utc>, DateTime<Utc>) {
    let dates: Vec<DateTime<Utc>> = results.iter().map(|r| r.conversation.created_at).collect();
    match (dates.iter().min(), dates.iter().max()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => {
            let now = Utc::now();
            (now, now)
        }
    }
}

fn sentiment_summary(results: &[SearchResult]) -> SentimentSummary {
    let average = if results.is_empty() {
        0.0
    } else {
        results
            .iter()
            .map(|r| r.conversation.metadata.sentiment_trend)
            .sum::<f32>()
            / results.len() as f32
    };
    SentimentSummary {
        average,
        label: SentimentLabel::from_score(average),
    }
}

/// One record per flagged message across all results, sorted by emotional
/// intensity first and date second (both descending), top 5 kept.
fn collect_breakthroughs(results: &[SearchResult]) -> Vec<BreakthroughMoment> {
    let mut moments = Vec::new();
    for result in results {
        let convo = &result.conversation;
        for &index in &convo.metadata.breakthrough_moments {
            let Some(msg) = convo.messages.get(index) else {
                continue;
            };
            moments.push(BreakthroughMoment {
                conversation_id: convo.id,
                conversation_title: convo.title.clone(),
                date: convo.created_at,
                message_index: index,
                content: truncate_chars(&msg.content, SNIPPET_MAX_CHARS),
                sentiment: msg.metadata.sentiment_score,
                emotional_intensity: msg.metadata.emotional_intensity,
            });
        }
    }
    moments.sort_by(|a, b| {
        b.emotional_intensity
            .total_cmp(&a.emotional_intensity)
            .then_with(|| b.date.cmp(&a.date))
    });
    moments.truncate(BREAKTHROUGH_LIMIT);
    moments
}

/// Chronological stages over the results. Chunk size is `max(1, total / 3)`
/// with the last chunk absorbing the remainder, so two results make two
/// stages rather than three.
fn evolution_pattern(results: &[SearchResult]) -> EvolutionPattern {
    let total = results.len();
    if total < 2 {
        return EvolutionPattern {
            pattern: PATTERN_INSUFFICIENT.to_string(),
            stages: Vec::new(),
        };
    }

    let mut ordered: Vec<&SearchResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.conversation.created_at);

    let size = (total / 3).max(1);
    let chunk_count = total / size;
    let mut stages = Vec::with_capacity(chunk_count);
    for i in 0..chunk_count {
        let start = i * size;
        let end = if i == chunk_count - 1 {
            total
        } else {
            (i + 1) * size
        };
        let chunk = &ordered[start..end];

        let avg_sentiment = chunk
            .iter()
            .map(|r| r.conversation.metadata.sentiment_trend)
            .sum::<f32>()
            / chunk.len() as f32;

        let dominant_themes = rank_by_frequency(
            chunk.iter().flat_map(|r| {
                r.conversation
                    .metadata
                    .key_themes
                    .iter()
                    .take(2)
                    .cloned()
            }),
            2,
        );

        stages.push(EvolutionStage {
            description: stage_description(&dominant_themes, avg_sentiment),
            avg_sentiment,
            dominant_themes,
        });
    }

    EvolutionPattern {
        pattern: PATTERN_EVOLUTIONARY.to_string(),
        stages,
    }
}

fn stage_description(themes: &[String], avg_sentiment: f32) -> String {
    let focus = if themes.is_empty() {
        "general reflection".to_string()
    } else {
        themes.join(" and ")
    };
    let tone = if avg_sentiment > 0.2 {
        "positive growth"
    } else if avg_sentiment < -0.2 {
        "challenging period"
    } else {
        "balanced exploration"
    };
    format!("Focus on {focus} with {tone}")
}

/// Up to 3 observations: recurring key phrases, emotionally intense message
/// count, and a complexity note when the language is clearly complex or
/// clearly plain.
fn common_patterns(results: &[SearchResult]) -> Vec<String> {
    let mut patterns = Vec::new();

    let top_phrases = rank_by_frequency(
        results.iter().flat_map(|r| {
            r.conversation
                .messages
                .iter()
                .flat_map(|m| m.metadata.key_phrases.iter().cloned())
        }),
        3,
    );
    if !top_phrases.is_empty() {
        patterns.push(format!("Recurring focus areas: {}", top_phrases.join(", ")));
    }

    let intense_count = results
        .iter()
        .flat_map(|r| r.conversation.messages.iter())
        .filter(|m| m.metadata.emotional_intensity > 0.5)
        .count();
    if intense_count > 0 {
        patterns.push(format!(
            "{intense_count} emotionally intense moments across these conversations"
        ));
    }

    let complexities: Vec<f32> = results
        .iter()
        .flat_map(|r| r.conversation.messages.iter())
        .map(|m| m.metadata.complexity_score)
        .collect();
    if !complexities.is_empty() {
        let avg = complexities.iter().sum::<f32>() / complexities.len() as f32;
        if avg > 5.0 {
            patterns.push("Your language here is complex and reflective".to_string());
        } else if avg < 3.0 {
            patterns.push("Your communication style here is direct and simple".to_string());
        }
    }

    patterns.truncate(3);
    patterns
}

/// First action-keyword sentence from each user message, deduplicated,
/// capped at 5. Assistant messages never contribute.
fn actionable_insights(results: &[SearchResult]) -> Vec<String> {
    let mut insights: Vec<String> = Vec::new();
    for result in results {
        for msg in &result.conversation.messages {
            if msg.role != MessageRole::User {
                continue;
            }
            let lower = msg.content.to_lowercase();
            if !ACTION_KEYWORDS.iter().any(|k| lower.contains(k)) {
                continue;
            }
            let sentence = msg.content.split('.').map(str::trim).find(|sentence| {
                let sentence_lower = sentence.to_lowercase();
                ACTION_KEYWORDS.iter().any(|k| sentence_lower.contains(k))
            });
            if let Some(sentence) = sentence {
                if !sentence.is_empty() && !insights.iter().any(|s| s == sentence) {
                    insights.push(sentence.to_string());
                }
            }
        }
    }
    insights.truncate(ACTIONABLE_LIMIT);
    insights
}

/// Frequency-rank with stable first-seen ordering among equal counts.
fn rank_by_frequency(items: impl Iterator<Item = String>, top: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for item in items {
        if !counts.contains_key(&item) {
            order.push(item.clone());
        }
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut ranked: Vec<(usize, String)> = order.into_iter().enumerate().collect();
    ranked.sort_by(|a, b| counts[&b.1].cmp(&counts[&a.1]).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(top).map(|(_, item)| item).collect()
}
