//! Fixed keyword tables behind every enrichment heuristic. These are part of
//! the observable behavior: scores and flags derived from them must stay
//! stable across runs, so entries are ordered slices rather than hash sets.

/// Words counted as positive polarity hits.
pub const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "better", "best", "happy", "happier", "glad", "joy", "love", "loved",
    "excited", "exciting", "proud", "grateful", "thankful", "hopeful", "confident", "calm",
    "peaceful", "relieved", "progress", "improved", "improving", "success", "successful",
    "accomplished", "motivated", "inspired", "energized", "optimistic", "wonderful", "amazing",
    "fantastic", "helpful", "supportive", "strong", "stronger", "clear", "clearer", "growth",
    "win", "breakthrough", "thriving", "enjoy", "enjoyed", "satisfying", "fulfilled",
];

/// Words counted as negative polarity hits.
pub const NEGATIVE_WORDS: &[&str] = &[
    "bad", "worse", "worst", "sad", "unhappy", "angry", "anger", "mad", "upset", "hurt",
    "afraid", "fear", "scared", "anxious", "anxiety", "stressed", "stress", "worried", "worry",
    "frustrated", "frustrating", "tired", "exhausted", "overwhelmed", "stuck", "lost",
    "confused", "lonely", "alone", "guilty", "ashamed", "regret", "failed", "failure",
    "hopeless", "helpless", "drained", "miserable", "terrible", "awful", "hate", "hated",
    "difficult", "struggle", "struggling", "pain", "painful", "cry", "crying",
];

/// High-arousal words, weighted 3.0 in emotional intensity.
pub const INTENSE_WORDS: &[&str] = &[
    "devastated", "ecstatic", "furious", "terrified", "overwhelmed", "heartbroken",
    "thrilled", "desperate", "panicked", "euphoric", "enraged", "shattered", "overjoyed",
    "horrified", "elated", "crushed", "exhilarated", "traumatic", "unbearable", "breakthrough",
];

/// Mid-arousal words, weighted 2.0.
pub const MODERATE_WORDS: &[&str] = &[
    "happy", "sad", "angry", "worried", "excited", "frustrated", "anxious", "grateful",
    "upset", "proud", "scared", "hopeful", "ashamed", "lonely", "stressed", "relieved",
    "hurt", "guilty", "jealous", "embarrassed", "disappointed", "nervous",
];

/// Low-arousal words, weighted 1.0.
pub const MILD_WORDS: &[&str] = &[
    "fine", "okay", "good", "bad", "nice", "pleased", "concerned", "uneasy", "content",
    "tired", "calm", "bothered", "curious", "unsure", "comfortable", "uncomfortable",
];

/// Phrases whose presence alone flags a message as a breakthrough moment.
pub const BREAKTHROUGH_PHRASES: &[&str] = &[
    "realized",
    "realization",
    "epiphany",
    "it clicked",
    "finally understood",
    "finally understand",
    "now i see",
    "now i understand",
    "aha moment",
    "breakthrough",
    "dawned on me",
    "suddenly understood",
    "makes so much sense",
    "never thought of it that way",
];

/// Keywords that mark a user sentence as an expressed intention.
pub const ACTION_KEYWORDS: &[&str] = &[
    "should", "need to", "will", "going to", "plan to", "try to", "practice",
];

/// Topic dictionaries: (label, terms). Entity detection walks this slice in
/// order and accumulates every label with at least one matching term.
pub const TOPIC_DICTIONARY: &[(&str, &[&str])] = &[
    (
        "relationships",
        &[
            "relationship", "relationships", "partner", "friend", "friends", "friendship",
            "family", "marriage", "dating", "parent", "parents", "sibling", "coworker",
        ],
    ),
    (
        "boundaries",
        &[
            "boundary", "boundaries", "saying no", "say no", "overcommit", "people pleasing",
            "people-pleasing", "assert", "asserting",
        ],
    ),
    (
        "career",
        &[
            "career", "job", "work", "interview", "promotion", "manager", "workplace",
            "salary", "resume",
        ],
    ),
    (
        "health",
        &[
            "health", "sleep", "exercise", "diet", "therapy", "therapist", "fitness",
            "nutrition", "burnout",
        ],
    ),
    (
        "learning",
        &[
            "learn", "learning", "study", "studying", "skill", "skills", "course", "reading",
            "book", "books", "practice",
        ],
    ),
    (
        "emotions",
        &[
            "anxiety", "stress", "anger", "sadness", "happiness", "fear", "grief", "mood",
            "feelings", "emotion", "emotions",
        ],
    ),
    (
        "goals",
        &[
            "goal", "goals", "habit", "habits", "plan", "planning", "productivity",
            "discipline", "routine", "progress",
        ],
    ),
    (
        "confidence",
        &[
            "confidence", "self-esteem", "imposter", "self-doubt", "assertive", "self-worth",
        ],
    ),
    (
        "communication",
        &[
            "communication", "communicate", "conversation", "listening", "conflict",
            "feedback", "argument",
        ],
    ),
    (
        "mindfulness",
        &[
            "mindfulness", "meditation", "meditating", "presence", "gratitude", "journaling",
            "breathing",
        ],
    ),
];

/// Common English stopwords excluded from themes, key phrases, and matched
/// terms.
pub const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "did",
    "do", "does", "for", "from", "had", "has", "have", "he", "her", "hers", "him", "his",
    "how", "i", "if", "in", "into", "is", "it", "its", "just", "like", "me", "my", "no",
    "not", "of", "on", "or", "our", "out", "she", "so", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "too", "up",
    "us", "very", "was", "we", "were", "what", "when", "where", "which", "who", "why",
    "will", "with", "would", "you", "your", "about", "after", "all", "also", "am", "any",
    "because", "before", "being", "between", "both", "down", "during", "each", "few",
    "more", "most", "much", "now", "only", "other", "over", "own", "same", "should",
    "such", "through", "under", "until", "while",
];

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

/// Topic labels whose dictionaries contain a term appearing in `lower`.
/// `lower` must already be lowercased; matches are substring matches so that
/// inflections ("boundaries") catch their stems ("boundary" does not need to
/// be repeated per form).
pub fn detect_topics(lower: &str) -> Vec<(&'static str, &'static str)> {
    let mut found = Vec::new();
    for (label, terms) in TOPIC_DICTIONARY {
        for term in *terms {
            if lower.contains(term) {
                found.push((*label, *term));
                break;
            }
        }
    }
    found
}
