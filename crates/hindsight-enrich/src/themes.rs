use std::collections::{HashMap, HashSet};

use crate::lexicon::is_stopword;

/// Document frequencies over the whole ingested corpus. TF-IDF against a
/// single document degenerates to plain term frequency, so theme extraction
/// always scores against these corpus-wide counts.
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    doc_count: usize,
    doc_frequency: HashMap<String, usize>,
}

impl CorpusStats {
    /// Build from one token list per document.
    pub fn build(docs: &[Vec<String>]) -> Self {
        let mut doc_frequency: HashMap<String, usize> = HashMap::new();
        for tokens in docs {
            let distinct: HashSet<&String> =
                tokens.iter().filter(|t| is_theme_term(t.as_str())).collect();
            for term in distinct {
                *doc_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }
        Self {
            doc_count: docs.len(),
            doc_frequency,
        }
    }

    pub fn idf(&self, term: &str) -> f32 {
        let df = self.doc_frequency.get(term).copied().unwrap_or(0);
        ((self.doc_count as f32) / (1.0 + df as f32)).ln() + 1.0
    }
}

fn is_theme_term(token: &str) -> bool {
    token.len() >= 3 && !is_stopword(token) && token.chars().any(|c| c.is_alphabetic())
}

/// Top 5 terms of a document by L2-normalized TF-IDF score, keeping only
/// terms scoring above 0.1. Ties break alphabetically so output is stable.
pub fn key_themes(tokens: &[String], stats: &CorpusStats) -> Vec<String> {
    let candidates: Vec<&String> = tokens
        .iter()
        .filter(|t| is_theme_term(t.as_str()))
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let total = candidates.len() as f32;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &candidates {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut scored: Vec<(&str, f32)> = counts
        .into_iter()
        .map(|(term, count)| {
            let tf = count as f32 / total;
            (term, tf * stats.idf(term))
        })
        .collect();

    let norm = scored.iter().map(|(_, s)| s * s).sum::<f32>().sqrt();
    if norm > 0.0 {
        for (_, score) in scored.iter_mut() {
            *score /= norm;
        }
    }

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .filter(|(_, score)| *score > 0.1)
        .take(5)
        .map(|(term, _)| term.to_string())
        .collect()
}
