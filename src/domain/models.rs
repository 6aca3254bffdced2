use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Soft per-browser identity keyed by the client supplied session id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct VisitorUser {
    pub id: Uuid,
    pub session_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Suggestion {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub content: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSuggestion {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub content: String,
    pub category: Option<String>,
}

/// Either kind of submission, tagged explicitly for the dashboard feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Submission {
    Suggestion(Suggestion),
    Feedback(Feedback),
}

impl Submission {
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Suggestion(s) => s.created_at,
            Self::Feedback(f) => f.created_at,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Suggestion(s) => &s.content,
            Self::Feedback(f) => &f.content,
        }
    }
}

/// Append-only snapshot of a past insights run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Report {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub sentiment: String,
    pub topics: Vec<String>,
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReport {
    pub generated_at: DateTime<Utc>,
    pub summary: String,
    pub sentiment: String,
    pub topics: Vec<String>,
    pub raw_data: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct QuizSettings {
    pub id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct QuizResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub answers: Vec<i32>,
    pub score: Option<i32>,
    pub completed_at: DateTime<Utc>,
}
