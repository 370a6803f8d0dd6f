use chrono::Utc;
use tracing::debug;

use hindsight_query::SearchResult;
use hindsight_schema::{
    GeneratedInsight, Intent, QueryIntent, SupportingConversation, TimelineStage,
};

use crate::analysis::{analyze, InsightAnalysis, PATTERN_EVOLUTIONARY};
use crate::templates;

const KEY_LEARNING_LIMIT: usize = 5;
const NEXT_STEP_LIMIT: usize = 4;
const BREAKTHROUGH_LIMIT: usize = 3;
const SUPPORTING_LIMIT: usize = 5;

/// Turns search results into a templated, confidence-scored narrative.
/// Stateless: every call is independent.
#[derive(Debug, Clone, Default)]
pub struct InsightSynthesizer;

impl InsightSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, results: &[SearchResult], intent: &QueryIntent) -> InsightAnalysis {
        analyze(results, intent)
    }

    pub fn synthesize(
        &self,
        query: &str,
        intent: &QueryIntent,
        analysis: &InsightAnalysis,
        results: &[SearchResult],
    ) -> GeneratedInsight {
        debug!(query, results = results.len(), "synthesizing insight");

        let topic = topic_for(intent);
        let time_period = time_period(analysis);
        let key_insight = templates::key_insight_for(analysis.sentiment.label);
        let summary = templates::fill(
            templates::summary_template(intent.intent),
            &topic,
            &time_period,
            key_insight,
        );

        let mut key_learnings: Vec<String> = analysis
            .key_themes
            .iter()
            .take(3)
            .map(|theme| format!("developed deep insights about {theme}"))
            .collect();
        key_learnings.extend(analysis.common_patterns.iter().take(2).cloned());
        key_learnings.extend(analysis.actionable_insights.iter().take(2).cloned());
        key_learnings.truncate(KEY_LEARNING_LIMIT);

        let evolution_timeline: Vec<TimelineStage> = analysis
            .evolution
            .stages
            .iter()
            .enumerate()
            .map(|(i, stage)| TimelineStage {
                stage: format!("Stage {}", i + 1),
                description: stage.description.clone(),
            })
            .collect();

        let mut next_steps: Vec<String> = analysis
            .actionable_insights
            .iter()
            .take(3)
            .cloned()
            .collect();
        next_steps.push(templates::generic_next_step(analysis.sentiment.label).to_string());
        next_steps.truncate(NEXT_STEP_LIMIT);

        let supporting_conversations: Vec<SupportingConversation> = results
            .iter()
            .take(SUPPORTING_LIMIT)
            .map(|r| SupportingConversation {
                id: r.conversation.id,
                title: r.conversation.title.clone(),
                date: r.conversation.created_at,
                similarity_score: r.similarity_score,
                key_themes: r.conversation.metadata.key_themes.clone(),
                sentiment_trend: r.conversation.metadata.sentiment_trend,
            })
            .collect();

        GeneratedInsight {
            topic,
            summary,
            key_learnings,
            evolution_timeline,
            breakthrough_moments: analysis
                .breakthroughs
                .iter()
                .take(BREAKTHROUGH_LIMIT)
                .cloned()
                .collect(),
            next_steps,
            confidence_score: confidence_score(analysis, results),
            supporting_conversations,
            intent: intent.clone(),
            generated_at: Utc::now(),
        }
    }

    /// Fixed response for a query with no matches. Distinct from the error
    /// insight: this is a legitimate, non-error outcome.
    pub fn empty_insight(&self, intent: &QueryIntent) -> GeneratedInsight {
        GeneratedInsight {
            topic: topic_for(intent),
            summary: templates::EMPTY_SUMMARY.to_string(),
            key_learnings: vec![templates::EMPTY_KEY_LEARNING.to_string()],
            evolution_timeline: Vec::new(),
            breakthrough_moments: Vec::new(),
            next_steps: templates::EMPTY_NEXT_STEPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_score: 0.1,
            supporting_conversations: Vec::new(),
            intent: intent.clone(),
            generated_at: Utc::now(),
        }
    }

    /// Fixed response when query processing itself failed. Intent is forced
    /// back to general since the failure may have been in classification.
    pub fn error_insight(&self) -> GeneratedInsight {
        let intent = QueryIntent::general();
        GeneratedInsight {
            topic: topic_for(&intent),
            summary: templates::ERROR_SUMMARY.to_string(),
            key_learnings: Vec::new(),
            evolution_timeline: Vec::new(),
            breakthrough_moments: Vec::new(),
            next_steps: templates::ERROR_NEXT_STEPS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_score: 0.0,
            supporting_conversations: Vec::new(),
            intent,
            generated_at: Utc::now(),
        }
    }
}

/// Joined entities, else the intent name, else "personal growth".
fn topic_for(intent: &QueryIntent) -> String {
    if !intent.entities.is_empty() {
        intent.entities.join(", ")
    } else if intent.intent != Intent::General {
        intent.intent.as_str().to_string()
    } else {
        "personal growth".to_string()
    }
}

/// Human time span from the analysis date range, using integer floor
/// division: under 30 days reads in days, under 365 in months, else years.
fn time_period(analysis: &InsightAnalysis) -> String {
    let (start, end) = analysis.date_range;
    let days = (end - start).num_days().max(0);
    if days < 30 {
        format!("{days} days")
    } else if days < 365 {
        format!("{} months", days / 30)
    } else {
        format!("{} years", days / 365)
    }
}

/// Additive confidence: 0.5 base, up to 0.2 for result count, up to 0.2 for
/// mean similarity, up to 0.1 for breakthroughs, 0.1 for an evolutionary
/// pattern, clamped at 1.0. Monotonic in result count and mean similarity.
fn confidence_score(analysis: &InsightAnalysis, results: &[SearchResult]) -> f32 {
    let mut score = 0.5f32;

    if results.len() >= 10 {
        score += 0.2;
    } else if results.len() >= 5 {
        score += 0.1;
    }

    if !results.is_empty() {
        let mean_similarity =
            results.iter().map(|r| r.similarity_score).sum::<f32>() / results.len() as f32;
        score += mean_similarity * 0.2;
    }

    score += (analysis.breakthroughs.len() as f32 * 0.05).min(0.1);

    if analysis.evolution.pattern == PATTERN_EVOLUTIONARY {
        score += 0.1;
    }

    score.min(1.0)
}
