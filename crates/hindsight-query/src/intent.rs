use hindsight_enrich::lexicon::detect_topics;
use hindsight_schema::{Intent, QueryIntent, QueryType, TimeContext};

use crate::vocab::{INTENT_GROUPS, PAST_MONTH_PHRASES, RECENT_PHRASES};

/// Classify a free-text question. Pure and stateless: same query, same
/// result, nothing carried between calls.
pub fn classify(query: &str) -> QueryIntent {
    let lower = query.to_lowercase();

    let intent = INTENT_GROUPS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General);

    let entities: Vec<String> = detect_topics(&lower)
        .into_iter()
        .map(|(label, _)| label.to_string())
        .collect();

    let time_context = if RECENT_PHRASES.iter().any(|p| lower.contains(p)) {
        TimeContext::Recent
    } else if PAST_MONTH_PHRASES.iter().any(|p| lower.contains(p)) {
        TimeContext::PastMonth
    } else {
        TimeContext::AllTime
    };

    let query_type = match first_word(&lower).as_str() {
        "what" => QueryType::What,
        "how" => QueryType::How,
        "when" => QueryType::When,
        "why" => QueryType::Why,
        _ => QueryType::General,
    };

    let mut focus_areas = Vec::new();
    if intent != Intent::General {
        focus_areas.push(intent.as_str().to_string());
    }
    focus_areas.extend(entities.iter().cloned());

    QueryIntent {
        intent,
        entities,
        time_context,
        query_type,
        focus_areas,
    }
}

fn first_word(lower: &str) -> String {
    lower
        .split_whitespace()
        .next()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .unwrap_or_default()
}
