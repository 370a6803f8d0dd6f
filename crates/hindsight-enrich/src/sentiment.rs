use crate::lexicon::{NEGATIVE_WORDS, POSITIVE_WORDS};
use crate::text::tokenize;

/// Lexicon-based polarity scorer. Scores land in (-1, 1):
/// `(positive_hits - negative_hits) / (positive_hits + negative_hits + 1)`,
/// 0.0 when no lexicon word appears.
#[derive(Debug, Clone, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn score(&self, text: &str) -> f32 {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return 0.0;
        }

        let mut positive = 0usize;
        let mut negative = 0usize;
        for token in &tokens {
            if POSITIVE_WORDS.contains(&token.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&token.as_str()) {
                negative += 1;
            }
        }

        if positive == 0 && negative == 0 {
            return 0.0;
        }
        (positive as f32 - negative as f32) / (positive as f32 + negative as f32 + 1.0)
    }
}
