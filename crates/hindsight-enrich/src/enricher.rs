use std::collections::HashMap;

use anyhow::Result;
use tracing::warn;

use hindsight_schema::{
    Conversation, ConversationMetadata, Entity, Message, MessageRole, SentimentLabel,
    TemporalSegment,
};

use crate::lexicon::{
    detect_topics, is_stopword, BREAKTHROUGH_PHRASES, INTENSE_WORDS, MILD_WORDS, MODERATE_WORDS,
};
use crate::sentiment::SentimentScorer;
use crate::text::{sentence_lengths, tokenize, truncate_chars};
use crate::themes::{key_themes, CorpusStats};

const SUMMARY_MAX_CHARS: usize = 200;

/// Derives all message- and conversation-level metadata from fixed keyword
/// tables. Pure and deterministic: re-running on unchanged input produces
/// identical metadata.
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    sentiment: SentimentScorer,
}

impl Enricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enrich a whole archive. Theme IDF is computed over the full batch
    /// first. A conversation that fails enrichment keeps default metadata
    /// and the batch continues.
    pub fn enrich_all(&self, conversations: &mut [Conversation]) {
        let docs: Vec<Vec<String>> = conversations.iter().map(conversation_tokens).collect();
        let stats = CorpusStats::build(&docs);

        for (convo, tokens) in conversations.iter_mut().zip(docs.iter()) {
            if let Err(err) = self.enrich_conversation(convo, tokens, &stats) {
                warn!(conversation = %convo.id, error = %err, "enrichment failed, keeping defaults");
                convo.metadata = ConversationMetadata::default();
                convo.metadata.summary = convo.title.clone();
            }
        }
    }

    pub fn enrich_conversation(
        &self,
        convo: &mut Conversation,
        tokens: &[String],
        stats: &CorpusStats,
    ) -> Result<()> {
        for msg in convo.messages.iter_mut() {
            self.enrich_message(msg);
        }

        let msg_count = convo.messages.len();
        let sentiment_trend = mean(convo.messages.iter().map(|m| m.metadata.sentiment_score));

        let breakthrough_moments = detect_breakthroughs(&convo.messages);

        let total_words: usize = convo.messages.iter().map(|m| m.metadata.word_count).sum();
        let avg_complexity = mean(convo.messages.iter().map(|m| m.metadata.complexity_score));
        let avg_intensity = mean(convo.messages.iter().map(|m| m.metadata.emotional_intensity));

        let importance_score = (0.3 * (total_words as f32 / 1000.0).min(1.0)
            + 0.2 * (avg_complexity / 10.0).min(1.0)
            + 0.3 * (breakthrough_moments.len() as f32 / 3.0).min(1.0)
            + 0.2 * avg_intensity)
            .clamp(0.0, 1.0);

        convo.metadata = ConversationMetadata {
            summary: summarize(convo),
            key_themes: key_themes(tokens, stats),
            sentiment_trend,
            importance_score,
            breakthrough_moments,
            temporal_segments: temporal_segments(&convo.messages),
            topic_cluster: topic_cluster(&convo.messages),
        };

        debug_assert!(convo
            .metadata
            .breakthrough_moments
            .iter()
            .all(|&i| i < msg_count));
        Ok(())
    }

    fn enrich_message(&self, msg: &mut Message) {
        let tokens = tokenize(&msg.content);
        let lower = msg.content.to_lowercase();

        let sentiment_score = self.sentiment.score(&msg.content);
        msg.metadata.sentiment_score = sentiment_score;
        msg.metadata.sentiment_label = SentimentLabel::from_score(sentiment_score);
        msg.metadata.word_count = tokens.len();
        msg.metadata.complexity_score = complexity(&tokens, &msg.content);
        msg.metadata.emotional_intensity = emotional_intensity(&tokens);
        msg.metadata.entities = detect_topics(&lower)
            .into_iter()
            .map(|(label, term)| Entity {
                label: label.to_string(),
                term: term.to_string(),
            })
            .collect();
        msg.metadata.key_phrases = key_phrases(&tokens);
    }
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let collected: Vec<f32> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().sum::<f32>() / collected.len() as f32
}

/// 0.6 x mean word length + 0.4 x mean sentence token count. Empty text
/// scores 0.0.
fn complexity(tokens: &[String], content: &str) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let avg_word_len =
        tokens.iter().map(|t| t.chars().count()).sum::<usize>() as f32 / tokens.len() as f32;
    let sentences = sentence_lengths(content);
    let avg_sentence_len = if sentences.is_empty() {
        0.0
    } else {
        sentences.iter().sum::<usize>() as f32 / sentences.len() as f32
    };
    0.6 * avg_word_len + 0.4 * avg_sentence_len
}

/// Keyword-weighted arousal: 3.0 intense / 2.0 moderate / 1.0 mild hits,
/// normalized by word count, clamped to [0, 1].
fn emotional_intensity(tokens: &[String]) -> f32 {
    if tokens.is_empty() {
        return 0.0;
    }
    let mut score = 0.0f32;
    for token in tokens {
        let word = token.as_str();
        if INTENSE_WORDS.contains(&word) {
            score += 3.0;
        } else if MODERATE_WORDS.contains(&word) {
            score += 2.0;
        } else if MILD_WORDS.contains(&word) {
            score += 1.0;
        }
    }
    (score / tokens.len() as f32).clamp(0.0, 1.0)
}

/// A message is a breakthrough if it contains a breakthrough phrase, or if
/// it is both highly emotional and clearly positive. Either alone qualifies.
fn detect_breakthroughs(messages: &[Message]) -> Vec<usize> {
    let mut flagged = Vec::new();
    for (index, msg) in messages.iter().enumerate() {
        let lower = msg.content.to_lowercase();
        let phrase_hit = BREAKTHROUGH_PHRASES.iter().any(|p| lower.contains(p));
        let intensity_hit =
            msg.metadata.emotional_intensity > 0.7 && msg.metadata.sentiment_score > 0.3;
        if phrase_hit || intensity_hit {
            flagged.push(index);
        }
    }
    flagged
}

/// Up to 3 phrases: maximal runs of consecutive non-stopword tokens (capped
/// at 4 words), scored by word count and character mass.
fn key_phrases(tokens: &[String]) -> Vec<String> {
    let mut runs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for token in tokens {
        if is_stopword(token) {
            if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        } else {
            if current.len() == 4 {
                runs.push(std::mem::take(&mut current));
            }
            current.push(token);
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let mut scored: Vec<(String, usize)> = runs
        .into_iter()
        .map(|run| {
            let chars: usize = run.iter().map(|w| w.len()).sum();
            (run.join(" "), run.len() * 3 + chars)
        })
        .filter(|(phrase, _)| phrase.len() >= 4)
        .collect();

    // stable sort keeps first-occurrence order among equal scores
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let mut phrases = Vec::new();
    for (phrase, _) in scored {
        if !phrases.contains(&phrase) {
            phrases.push(phrase);
        }
        if phrases.len() == 3 {
            break;
        }
    }
    phrases
}

/// Three chronological chunks of size total/3 (last absorbs the remainder);
/// one chunk per message when fewer than three messages.
fn temporal_segments(messages: &[Message]) -> Vec<TemporalSegment> {
    let total = messages.len();
    if total == 0 {
        return Vec::new();
    }

    let bounds: Vec<(usize, usize)> = if total < 3 {
        (0..total).map(|i| (i, i + 1)).collect()
    } else {
        let size = total / 3;
        vec![(0, size), (size, 2 * size), (2 * size, total)]
    };

    bounds
        .into_iter()
        .map(|(start, end)| {
            let chunk = &messages[start..end];
            TemporalSegment {
                start_index: start,
                end_index: end - 1,
                message_count: chunk.len(),
                avg_sentiment: mean(chunk.iter().map(|m| m.metadata.sentiment_score)),
                total_words: chunk.iter().map(|m| m.metadata.word_count).sum(),
            }
        })
        .collect()
}

/// First user message, truncated; falls back to the first message of any
/// role, then to the title.
fn summarize(convo: &Conversation) -> String {
    let first_user = convo
        .messages
        .iter()
        .find(|m| m.role == MessageRole::User)
        .or_else(|| convo.messages.first());
    match first_user {
        Some(msg) => truncate_chars(msg.content.trim(), SUMMARY_MAX_CHARS),
        None => convo.title.clone(),
    }
}

/// Most frequent entity label across messages; "general" when none detected.
fn topic_cluster(messages: &[Message]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for msg in messages {
        for entity in &msg.metadata.entities {
            let label = entity.label.as_str();
            if !counts.contains_key(label) {
                order.push(label);
            }
            *counts.entry(label).or_insert(0) += 1;
        }
    }
    order
        .into_iter()
        .max_by_key(|label| counts[label])
        .unwrap_or("general")
        .to_string()
}

/// Token stream used for corpus statistics and themes: all message contents.
fn conversation_tokens(convo: &Conversation) -> Vec<String> {
    let mut tokens = Vec::new();
    for msg in &convo.messages {
        tokens.extend(tokenize(&msg.content));
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn convo(title: &str, contents: &[(&str, MessageRole)]) -> Conversation {
        let mut c = Conversation::new(title, Utc::now());
        for (content, role) in contents {
            c.messages.push(Message::new(*role, *content, Utc::now()));
        }
        c
    }

    fn enrich(mut conversations: Vec<Conversation>) -> Vec<Conversation> {
        Enricher::new().enrich_all(&mut conversations);
        conversations
    }

    #[test]
    fn empty_conversation_does_not_panic() {
        let enriched = enrich(vec![convo("Empty", &[])]);
        let meta = &enriched[0].metadata;
        assert_eq!(meta.sentiment_trend, 0.0);
        assert_eq!(meta.importance_score, 0.0);
        assert!(meta.breakthrough_moments.is_empty());
        assert!(meta.temporal_segments.is_empty());
        assert_eq!(meta.summary, "Empty");
    }

    #[test]
    fn empty_message_scores_zero_complexity() {
        let enriched = enrich(vec![convo("One", &[("", MessageRole::User)])]);
        let meta = &enriched[0].messages[0].metadata;
        assert_eq!(meta.complexity_score, 0.0);
        assert_eq!(meta.word_count, 0);
        assert_eq!(meta.emotional_intensity, 0.0);
    }

    #[test]
    fn complexity_blends_word_and_sentence_length() {
        // "aa bb. cc dd." -> words all 2 chars, sentences of 2 tokens
        let enriched = enrich(vec![convo("C", &[("aa bb. cc dd.", MessageRole::User)])]);
        let score = enriched[0].messages[0].metadata.complexity_score;
        assert!((score - (0.6 * 2.0 + 0.4 * 2.0)).abs() < 1e-5);
    }

    #[test]
    fn intensity_is_clamped_to_one() {
        let enriched = enrich(vec![convo(
            "I",
            &[("devastated heartbroken terrified", MessageRole::User)],
        )]);
        assert_eq!(enriched[0].messages[0].metadata.emotional_intensity, 1.0);
    }

    #[test]
    fn intensity_and_importance_stay_in_bounds() {
        let enriched = enrich(vec![convo(
            "B",
            &[
                ("I was thrilled, ecstatic, overjoyed, amazing progress", MessageRole::User),
                ("that is wonderful to hear", MessageRole::Assistant),
                ("just a normal tuesday otherwise", MessageRole::User),
            ],
        )]);
        let meta = &enriched[0].metadata;
        assert!((0.0..=1.0).contains(&meta.importance_score));
        for msg in &enriched[0].messages {
            assert!((0.0..=1.0).contains(&msg.metadata.emotional_intensity));
        }
    }

    #[test]
    fn breakthrough_by_phrase_alone() {
        let enriched = enrich(vec![convo(
            "P",
            &[
                ("the weather is dull today", MessageRole::User),
                ("I finally understood why I avoid conflict", MessageRole::User),
            ],
        )]);
        assert_eq!(enriched[0].metadata.breakthrough_moments, vec![1]);
    }

    #[test]
    fn breakthrough_by_intensity_and_sentiment_alone() {
        // no breakthrough phrase, but intense positive wording
        let enriched = enrich(vec![convo(
            "P2",
            &[("thrilled ecstatic amazing wonderful", MessageRole::User)],
        )]);
        let msg = &enriched[0].messages[0].metadata;
        assert!(msg.emotional_intensity > 0.7);
        assert!(msg.sentiment_score > 0.3);
        assert_eq!(enriched[0].metadata.breakthrough_moments, vec![0]);
    }

    #[test]
    fn breakthrough_indices_are_valid_and_idempotent() {
        let base = convo(
            "Idem",
            &[
                ("I realized I never rest", MessageRole::User),
                ("what changed?", MessageRole::Assistant),
            ],
        );
        let first = enrich(vec![base.clone()]);
        let second = enrich(first.clone());
        assert_eq!(
            first[0].metadata.breakthrough_moments,
            second[0].metadata.breakthrough_moments
        );
        for &i in &first[0].metadata.breakthrough_moments {
            assert!(i < first[0].messages.len());
        }
    }

    #[test]
    fn segments_split_into_three_with_remainder_in_last() {
        let msgs: Vec<(&str, MessageRole)> =
            (0..7).map(|_| ("some words here", MessageRole::User)).collect();
        let enriched = enrich(vec![convo("S", &msgs)]);
        let segments = &enriched[0].metadata.temporal_segments;
        assert_eq!(segments.len(), 3);
        assert_eq!((segments[0].start_index, segments[0].end_index), (0, 1));
        assert_eq!((segments[1].start_index, segments[1].end_index), (2, 3));
        assert_eq!((segments[2].start_index, segments[2].end_index), (4, 6));
        assert_eq!(segments[2].message_count, 3);
    }

    #[test]
    fn segments_for_tiny_conversations() {
        let enriched = enrich(vec![convo(
            "T",
            &[("one", MessageRole::User), ("two", MessageRole::Assistant)],
        )]);
        let segments = &enriched[0].metadata.temporal_segments;
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].message_count, 1);
    }

    #[test]
    fn summary_prefers_first_user_message() {
        let enriched = enrich(vec![convo(
            "Sum",
            &[
                ("welcome, how can I help?", MessageRole::Assistant),
                ("I keep overcommitting at work", MessageRole::User),
            ],
        )]);
        assert_eq!(enriched[0].metadata.summary, "I keep overcommitting at work");
    }

    #[test]
    fn summary_is_truncated_to_200_chars() {
        let long = "boundaries ".repeat(40);
        let enriched = enrich(vec![convo("Long", &[(long.as_str(), MessageRole::User)])]);
        let summary = &enriched[0].metadata.summary;
        assert!(summary.chars().count() <= SUMMARY_MAX_CHARS + 3);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn entities_and_topic_cluster_from_dictionaries() {
        let enriched = enrich(vec![convo(
            "E",
            &[
                ("my partner says I need boundaries", MessageRole::User),
                ("my partner agreed", MessageRole::User),
            ],
        )]);
        let labels: Vec<&str> = enriched[0].messages[0]
            .metadata
            .entities
            .iter()
            .map(|e| e.label.as_str())
            .collect();
        assert!(labels.contains(&"relationships"));
        assert!(labels.contains(&"boundaries"));
        assert_eq!(enriched[0].metadata.topic_cluster, "relationships");
    }

    #[test]
    fn key_phrases_capped_at_three() {
        let enriched = enrich(vec![convo(
            "K",
            &[(
                "morning meditation practice helps my evening journaling habit and my weekend hiking routine",
                MessageRole::User,
            )],
        )]);
        let phrases = &enriched[0].messages[0].metadata.key_phrases;
        assert!(!phrases.is_empty());
        assert!(phrases.len() <= 3);
    }

    #[test]
    fn themes_use_corpus_idf() {
        let enriched = enrich(vec![
            convo(
                "A",
                &[("boundaries boundaries discussion today", MessageRole::User)],
            ),
            convo("B", &[("dinner discussion today", MessageRole::User)]),
        ]);
        assert!(enriched[0]
            .metadata
            .key_themes
            .contains(&"boundaries".to_string()));
    }

    #[test]
    fn sentiment_trend_is_mean_of_messages() {
        let enriched = enrich(vec![convo(
            "M",
            &[
                ("this is wonderful and amazing", MessageRole::User),
                ("this is terrible and awful", MessageRole::User),
            ],
        )]);
        let c = &enriched[0];
        let expected = (c.messages[0].metadata.sentiment_score
            + c.messages[1].metadata.sentiment_score)
            / 2.0;
        assert!((c.metadata.sentiment_trend - expected).abs() < 1e-6);
    }
}
