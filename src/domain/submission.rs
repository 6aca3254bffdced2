use crate::analytics::aggregator::SourceKind;
use crate::domain::models::{NewFeedback, NewSuggestion};
use serde::Serialize;
use std::ops::RangeInclusive;
use thiserror::Error;

pub const TITLE_CHARS: RangeInclusive<usize> = 3..=100;
pub const SUGGESTION_CHARS: RangeInclusive<usize> = 10..=500;
pub const FEEDBACK_CHARS: RangeInclusive<usize> = 10..=1000;
pub const MAX_CATEGORY_CHARS: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("title must be between {} and {} characters", TITLE_CHARS.start(), TITLE_CHARS.end())]
    Title,
    #[error("content must be between {min} and {max} characters")]
    Content { min: usize, max: usize },
    #[error("category must be at most {} characters", MAX_CATEGORY_CHARS)]
    Category,
    #[error("{} limit reached for this session", .0.label())]
    LimitReached(SourceKind),
}

fn check_len(value: &str, range: &RangeInclusive<usize>) -> bool {
    range.contains(&value.chars().count())
}

/// Trims fields and checks the form constraints.
pub fn validate_suggestion(payload: NewSuggestion) -> Result<NewSuggestion, SubmissionError> {
    let title = payload.title.trim().to_string();
    let content = payload.content.trim().to_string();
    if !check_len(&title, &TITLE_CHARS) {
        return Err(SubmissionError::Title);
    }
    if !check_len(&content, &SUGGESTION_CHARS) {
        return Err(SubmissionError::Content {
            min: *SUGGESTION_CHARS.start(),
            max: *SUGGESTION_CHARS.end(),
        });
    }
    Ok(NewSuggestion { title, content })
}

pub fn validate_feedback(payload: NewFeedback) -> Result<NewFeedback, SubmissionError> {
    let content = payload.content.trim().to_string();
    if !check_len(&content, &FEEDBACK_CHARS) {
        return Err(SubmissionError::Content {
            min: *FEEDBACK_CHARS.start(),
            max: *FEEDBACK_CHARS.end(),
        });
    }
    let category = payload
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());
    if category
        .as_deref()
        .is_some_and(|c| c.chars().count() > MAX_CATEGORY_CHARS)
    {
        return Err(SubmissionError::Category);
    }
    Ok(NewFeedback { content, category })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionCounts {
    pub suggestions: i64,
    pub feedback: i64,
}

/// Per-session caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmissionLimits {
    pub max_suggestions: i64,
    pub max_feedback: i64,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            max_suggestions: 2,
            max_feedback: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimitStatus {
    pub suggestion_count: i64,
    pub feedback_count: i64,
    pub max_suggestions: i64,
    pub max_feedback: i64,
    pub can_submit_suggestion: bool,
    pub can_submit_feedback: bool,
}

impl SubmissionLimits {
    pub fn allows(&self, kind: SourceKind, counts: &SubmissionCounts) -> bool {
        match kind {
            SourceKind::Suggestion => counts.suggestions < self.max_suggestions,
            SourceKind::Feedback => counts.feedback < self.max_feedback,
        }
    }

    pub fn check(&self, kind: SourceKind, counts: &SubmissionCounts) -> Result<(), SubmissionError> {
        if self.allows(kind, counts) {
            Ok(())
        } else {
            Err(SubmissionError::LimitReached(kind))
        }
    }

    pub fn status(&self, counts: &SubmissionCounts) -> LimitStatus {
        LimitStatus {
            suggestion_count: counts.suggestions,
            feedback_count: counts.feedback,
            max_suggestions: self.max_suggestions,
            max_feedback: self.max_feedback,
            can_submit_suggestion: self.allows(SourceKind::Suggestion, counts),
            can_submit_feedback: self.allows(SourceKind::Feedback, counts),
        }
    }
}
