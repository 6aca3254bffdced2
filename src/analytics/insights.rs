use crate::analytics::aggregator::{SourceKind, TextItem};
use crate::analytics::keywords::{KeywordCount, KeywordCounter, DEFAULT_KEYWORD_LIMIT};
use crate::analytics::recommendations::{self, RuleInput};
use crate::analytics::sentiment::{self, MatchMode, SentimentBucket, SentimentHistogram};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const NO_DATA_MESSAGE: &str = "No submissions yet. Encourage users to share their thoughts!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub match_mode: MatchMode,
    pub keyword_limit: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::default(),
            keyword_limit: DEFAULT_KEYWORD_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSummary {
    pub total_items: usize,
    pub suggestion_count: usize,
    pub feedback_count: usize,
    pub sentiment: [SentimentBucket; 3],
    #[serde(skip)]
    pub histogram: SentimentHistogram,
    pub keywords: Vec<KeywordCount>,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Insights {
    NoData { message: String },
    Ready(InsightSummary),
}

impl Insights {
    pub fn summary(&self) -> Option<&InsightSummary> {
        match self {
            Self::Ready(summary) => Some(summary),
            Self::NoData { .. } => None,
        }
    }
}

/// Single pass over the aggregated items feeding the sentiment histogram and
/// the keyword counter, then the recommendation rules.
pub fn analyze<'a, I>(items: I, options: &AnalysisOptions) -> Insights
where
    I: IntoIterator<Item = TextItem<'a>>,
{
    let mut histogram = SentimentHistogram::default();
    let mut keywords = KeywordCounter::new();
    let mut suggestion_count = 0;
    let mut feedback_count = 0;

    for item in items {
        match item.source_kind {
            SourceKind::Suggestion => suggestion_count += 1,
            SourceKind::Feedback => feedback_count += 1,
        }
        histogram.record(sentiment::classify(&item.text, options.match_mode));
        keywords.record(&item.text);
    }

    let total_items = suggestion_count + feedback_count;
    if total_items == 0 {
        return Insights::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        };
    }

    let keywords = keywords.top(options.keyword_limit);
    let recommendations = recommendations::recommend(&RuleInput {
        suggestion_count,
        feedback_count,
        sentiment: &histogram,
        keywords: &keywords,
    });

    tracing::debug!(
        total_items,
        positive = histogram.positive,
        negative = histogram.negative,
        keywords = keywords.len(),
        "insights computed"
    );

    Insights::Ready(InsightSummary {
        total_items,
        suggestion_count,
        feedback_count,
        sentiment: histogram.buckets(),
        histogram,
        keywords,
        recommendations,
        generated_at: Utc::now(),
    })
}
