use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Tokens shorter than this many characters never count as keywords.
pub const MIN_KEYWORD_CHARS: usize = 4;

pub const DEFAULT_KEYWORD_LIMIT: usize = 8;

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is", "are",
        "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
        "could", "should", "may", "might", "can", "a", "an", "this", "that", "these", "those",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub word: String,
    pub count: usize,
    /// Bar-chart scale, capped at 100.
    pub score: u8,
}

impl KeywordCount {
    fn new(word: String, count: usize) -> Self {
        let score = count.saturating_mul(10).min(100) as u8;
        Self { word, count, score }
    }
}

/// Lowercases and drops every character that is not alphanumeric, `_` or
/// whitespace ("it's" becomes "its").
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}

/// Corpus-wide token frequencies, remembering first-seen order for ties.
#[derive(Debug, Default)]
pub struct KeywordCounter {
    index: HashMap<String, usize>,
    entries: Vec<(String, usize)>,
}

impl KeywordCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, text: &str) {
        let normalized = normalize(text);
        for token in normalized.split_whitespace() {
            if token.chars().count() < MIN_KEYWORD_CHARS || is_stop_word(token) {
                continue;
            }
            match self.index.get(token) {
                Some(&slot) => self.entries[slot].1 += 1,
                None => {
                    self.index.insert(token.to_string(), self.entries.len());
                    self.entries.push((token.to_string(), 1));
                }
            }
        }
    }

    pub fn top(self, limit: usize) -> Vec<KeywordCount> {
        let mut entries = self.entries;
        // stable: equal counts keep first-encountered order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
            .into_iter()
            .take(limit)
            .map(|(word, count)| KeywordCount::new(word, count))
            .collect()
    }
}

pub fn extract_keywords<'a, I>(texts: I, limit: usize) -> Vec<KeywordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter = KeywordCounter::new();
    for text in texts {
        counter.record(text);
    }
    counter.top(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize("It's GREAT, really!"), "its great really");
        assert_eq!(normalize("snake_case stays"), "snake_case stays");
    }

    #[test]
    fn test_short_and_stop_words_filtered() {
        let keywords = extract_keywords(["This is the app and that would help"], 10);
        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["help"]);
    }

    #[test]
    fn test_filtered_tokens_never_appear() {
        let corpus = [
            "these those would could should might been were have does",
            "a an to of by at in on is be do",
            "dark mode please, dark mode now",
        ];
        let keywords = extract_keywords(corpus, 20);
        for k in &keywords {
            assert!(k.word.chars().count() >= MIN_KEYWORD_CHARS, "{} too short", k.word);
            assert!(!is_stop_word(&k.word), "{} is a stop word", k.word);
        }
        assert_eq!(keywords[0].word, "dark");
        assert_eq!(keywords[0].count, 2);
    }

    #[test]
    fn test_global_frequency_and_order() {
        let corpus = [
            "pricing is confusing",
            "pricing pricing tiers",
            "better pricing page",
            "pricing again, pricing",
            "confusing tiers",
        ];
        let keywords = extract_keywords(corpus, 8);

        assert_eq!(keywords[0], KeywordCount::new("pricing".to_string(), 6));
        assert_eq!(keywords[0].score, 60);
        for pair in keywords.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let keywords = extract_keywords(["zebra apple mango", "mango apple zebra"], 3);
        let words: Vec<&str> = keywords.iter().map(|k| k.word.as_str()).collect();
        assert_eq!(words, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn test_limit_truncates() {
        let text = "alpha bravo charlie delta echoes foxtrot golfer hotel india juliet";
        assert_eq!(extract_keywords([text], 8).len(), 8);
        assert_eq!(extract_keywords([text], 5).len(), 5);
        assert!(extract_keywords(Vec::<&str>::new(), 8).is_empty());
    }

    #[test]
    fn test_score_is_capped() {
        let text = "feature ".repeat(15);
        let keywords = extract_keywords([text.as_str()], 1);
        assert_eq!(keywords[0].count, 15);
        assert_eq!(keywords[0].score, 100);
    }
}
