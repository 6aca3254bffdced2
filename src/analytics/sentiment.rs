//! Keyword-list sentiment classification.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

pub const POSITIVE_WORDS: [&str; 10] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "love",
    "like",
    "awesome",
    "fantastic",
    "perfect",
    "wonderful",
];

pub const NEGATIVE_WORDS: [&str; 10] = [
    "bad",
    "terrible",
    "awful",
    "hate",
    "dislike",
    "poor",
    "disappointing",
    "worst",
    "horrible",
    "useless",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Positive => "#22c55e",
            Self::Neutral => "#eab308",
            Self::Negative => "#ef4444",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Positive => "🟢",
            Self::Neutral => "🟡",
            Self::Negative => "🔴",
        }
    }
}

/// How list words are located inside a text.
///
/// `Substring` keeps the historical behaviour where "goodbye" counts as "good";
/// `WholeWord` only matches complete alphanumeric tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    Substring,
    WholeWord,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sentiment match mode '{0}' (expected substring or whole_word)")]
pub struct ParseMatchModeError(String);

impl FromStr for MatchMode {
    type Err = ParseMatchModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "whole_word" | "whole-word" | "word" => Ok(Self::WholeWord),
            other => Err(ParseMatchModeError(other.to_string())),
        }
    }
}

pub fn classify(text: &str, mode: MatchMode) -> Sentiment {
    let lowered = text.to_lowercase();
    let (positive, negative) = match mode {
        MatchMode::Substring => (
            POSITIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count(),
            NEGATIVE_WORDS.iter().filter(|w| lowered.contains(*w)).count(),
        ),
        MatchMode::WholeWord => {
            let tokens: HashSet<&str> = lowered
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .collect();
            (
                POSITIVE_WORDS.iter().filter(|w| tokens.contains(*w)).count(),
                NEGATIVE_WORDS.iter().filter(|w| tokens.contains(*w)).count(),
            )
        }
    };

    if positive > negative {
        Sentiment::Positive
    } else if negative > positive {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentHistogram {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentBucket {
    pub sentiment: Sentiment,
    pub name: &'static str,
    pub count: usize,
    pub percentage: u32,
    pub color: &'static str,
}

impl SentimentHistogram {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }

    /// Rounded share of the total; 0 for every bucket when nothing was counted.
    pub fn percentage(&self, sentiment: Sentiment) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.count(sentiment) as f64 / total as f64 * 100.0).round() as u32
    }

    /// Bucket with the strictly highest count; any tie is reported as neutral.
    pub fn dominant(&self) -> Sentiment {
        let counts = [
            (Sentiment::Positive, self.positive),
            (Sentiment::Neutral, self.neutral),
            (Sentiment::Negative, self.negative),
        ];
        let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
        let mut leaders = counts.iter().filter(|(_, c)| *c == max);
        match (leaders.next(), leaders.next()) {
            (Some((sentiment, _)), None) => *sentiment,
            _ => Sentiment::Neutral,
        }
    }

    pub fn buckets(&self) -> [SentimentBucket; 3] {
        [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative].map(|sentiment| {
            SentimentBucket {
                sentiment,
                name: sentiment.label(),
                count: self.count(sentiment),
                percentage: self.percentage(sentiment),
                color: sentiment.color(),
            }
        })
    }
}
