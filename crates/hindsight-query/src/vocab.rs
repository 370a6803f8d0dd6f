//! Fixed query-side vocabularies. Intent groups are checked in slice order
//! and the first group with any hit wins, so the order here is behavior.

use hindsight_schema::Intent;

/// Intent keyword groups in priority order: learning beats relationships
/// beats goals beats emotions; no scoring, no ties.
pub const INTENT_GROUPS: &[(Intent, &[&str])] = &[
    (
        Intent::Learning,
        &[
            "learn", "learned", "learning", "understand", "understood", "insight", "insights",
            "knowledge", "lesson", "lessons", "grow", "grown", "growth", "skill",
        ],
    ),
    (
        Intent::Relationships,
        &[
            "relationship", "relationships", "friend", "friends", "partner", "family",
            "people", "social", "connection",
        ],
    ),
    (
        Intent::Goals,
        &[
            "goal", "goals", "achieve", "achieving", "accomplish", "plan", "progress",
            "habit", "habits", "productivity",
        ],
    ),
    (
        Intent::Emotions,
        &[
            "feel", "feeling", "feelings", "emotion", "emotions", "mood", "anxiety",
            "stress", "happy", "sad",
        ],
    ),
];

/// Up to the first 3 terms are appended when expanding a query.
pub fn intent_expansions(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Learning => &["learning", "understanding", "knowledge", "insight", "lessons"],
        Intent::Relationships => &["relationships", "connection", "communication", "trust"],
        Intent::Goals => &["goals", "progress", "achievement", "planning", "habits"],
        Intent::Emotions => &["emotions", "feelings", "mood", "awareness", "coping"],
        Intent::General => &[],
    }
}

/// Up to the first 2 terms per detected entity are appended when expanding.
pub const ENTITY_EXPANSIONS: &[(&str, &[&str])] = &[
    ("relationships", &["partner", "friendship", "family"]),
    ("boundaries", &["limits", "saying no"]),
    ("career", &["work", "job"]),
    ("health", &["wellbeing", "rest"]),
    ("learning", &["study", "practice"]),
    ("emotions", &["feelings", "mood"]),
    ("goals", &["habits", "planning"]),
    ("confidence", &["self-esteem", "assertiveness"]),
    ("communication", &["listening", "conflict"]),
    ("mindfulness", &["meditation", "gratitude"]),
];

pub fn entity_expansions(label: &str) -> Option<&'static [&'static str]> {
    ENTITY_EXPANSIONS
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, terms)| *terms)
}

/// Checked before the past-month phrases; first match wins.
pub const RECENT_PHRASES: &[&str] = &[
    "recently",
    "recent",
    "lately",
    "this week",
    "past week",
    "last few days",
    "these days",
];

pub const PAST_MONTH_PHRASES: &[&str] = &[
    "past month",
    "last month",
    "this month",
    "past few weeks",
    "last 30 days",
];
