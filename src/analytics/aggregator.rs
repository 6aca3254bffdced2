//! Flattens suggestions and feedback into one sequence of analyzable text.

use crate::domain::models::{Feedback, Suggestion};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Suggestion,
    Feedback,
}

impl SourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Suggestion => "suggestion",
            Self::Feedback => "feedback",
        }
    }
}

/// One unit of user text, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextItem<'a> {
    pub text: Cow<'a, str>,
    pub source_kind: SourceKind,
    pub category: Option<&'a str>,
}

/// Suggestions first (title and content joined by a space), then feedback, each
/// in source order. Nothing is filtered or deduplicated.
pub fn aggregate<'a>(
    suggestions: &'a [Suggestion],
    feedback: &'a [Feedback],
) -> impl Iterator<Item = TextItem<'a>> + 'a {
    let from_suggestions = suggestions.iter().map(|s| TextItem {
        text: Cow::Owned(format!("{} {}", s.title, s.content)),
        source_kind: SourceKind::Suggestion,
        category: None,
    });

    let from_feedback = feedback.iter().map(|f| TextItem {
        text: Cow::Borrowed(f.content.as_str()),
        source_kind: SourceKind::Feedback,
        category: f.category.as_deref(),
    });

    from_suggestions.chain(from_feedback)
}
