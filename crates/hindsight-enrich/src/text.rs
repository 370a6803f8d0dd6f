/// Lowercased word tokens: whitespace-split, trimmed of surrounding
/// punctuation. Empty tokens are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Sentence token counts: split on periods, count whitespace-separated
/// tokens per non-empty sentence.
pub fn sentence_lengths(text: &str) -> Vec<usize> {
    text.split('.')
        .map(|sentence| sentence.split_whitespace().count())
        .filter(|count| *count > 0)
        .collect()
}

/// Truncate to at most `max` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_strips_punctuation_and_lowercases() {
        let tokens = tokenize("What have I learned, really?");
        assert_eq!(tokens, vec!["what", "have", "i", "learned", "really"]);
    }

    #[test]
    fn tokenize_keeps_inner_apostrophes() {
        let tokens = tokenize("I've been \"better\" lately.");
        assert_eq!(tokens, vec!["i've", "been", "better", "lately"]);
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn sentence_lengths_splits_on_periods() {
        let lengths = sentence_lengths("I tried. It worked well. Done");
        assert_eq!(lengths, vec![2, 3, 1]);
    }

    #[test]
    fn sentence_lengths_ignores_empty_sentences() {
        assert!(sentence_lengths("...").is_empty());
        assert_eq!(sentence_lengths("one two."), vec![2]);
    }

    #[test]
    fn truncate_chars_appends_ellipsis_only_when_cut() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
        // exactly at the limit is untouched
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
