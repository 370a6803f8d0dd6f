use hindsight_schema::{Intent, SentimentLabel};

/// Summary sentence patterns per intent. Placeholders: {topic},
/// {time_period}, {key_insight}.
pub fn summary_template(intent: Intent) -> &'static str {
    match intent {
        Intent::Learning => {
            "Over {time_period} of conversations, you've been actively learning about {topic}. {key_insight}"
        }
        Intent::Relationships => {
            "Your conversations about {topic} across {time_period} show meaningful reflection on how you relate to others. {key_insight}"
        }
        Intent::Goals => {
            "Across {time_period}, you've been working steadily on {topic}. {key_insight}"
        }
        Intent::Emotions => {
            "Your emotional journey with {topic} over {time_period} reveals growing self-awareness. {key_insight}"
        }
        Intent::General => {
            "Looking back over {time_period} of conversations about {topic}, clear patterns emerge. {key_insight}"
        }
    }
}

/// Closing sentence of the summary, keyed by the overall sentiment trend.
pub fn key_insight_for(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => {
            "Your overall outlook here has been positive, which suggests real progress."
        }
        SentimentLabel::Negative => {
            "These conversations surface real challenges worth acknowledging."
        }
        SentimentLabel::Neutral => "Your reflections show a balanced, steady perspective.",
    }
}

/// The single generic next step appended after the actionable ones.
pub fn generic_next_step(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "Continue the momentum you've built in this area",
        SentimentLabel::Negative => "Consider seeking support around the challenges you've identified",
        SentimentLabel::Neutral => "Maintain your balanced approach while exploring new angles",
    }
}

pub const EMPTY_SUMMARY: &str =
    "No conversations found matching your question. Try rephrasing it or asking about a different topic.";

pub const EMPTY_KEY_LEARNING: &str =
    "Consider starting conversations about this topic to build insights";

pub const EMPTY_NEXT_STEPS: &[&str] = &[
    "Start a conversation about this topic",
    "Revisit this question as your archive grows",
];

pub const ERROR_SUMMARY: &str =
    "Something went wrong while generating this insight. Please try asking again.";

pub const ERROR_NEXT_STEPS: &[&str] = &[
    "Try rephrasing your question",
    "Ask again in a moment",
];

pub fn fill(template: &str, topic: &str, time_period: &str, key_insight: &str) -> String {
    template
        .replace("{topic}", topic)
        .replace("{time_period}", time_period)
        .replace("{key_insight}", key_insight)
}
