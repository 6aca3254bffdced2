pub mod memory;
pub mod postgres;

use crate::domain::models::{
    Feedback, NewFeedback, NewReport, NewSuggestion, QuizResponse, QuizSettings, Report,
    Suggestion, VisitorUser,
};
use crate::domain::submission::SubmissionCounts;
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row store behind the service. Listing methods return newest first.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn find_or_create_user(&self, session_id: &str) -> Result<VisitorUser>;

    async fn count_users(&self) -> Result<i64>;

    async fn count_submissions(&self, user_id: Uuid) -> Result<SubmissionCounts>;

    async fn insert_suggestion(&self, user_id: Uuid, suggestion: &NewSuggestion) -> Result<Suggestion>;

    async fn insert_feedback(&self, user_id: Uuid, feedback: &NewFeedback) -> Result<Feedback>;

    async fn list_suggestions(&self) -> Result<Vec<Suggestion>>;

    async fn list_feedback(&self) -> Result<Vec<Feedback>>;

    async fn find_suggestion(&self, id: Uuid) -> Result<Option<Suggestion>>;

    async fn find_feedback(&self, id: Uuid) -> Result<Option<Feedback>>;

    /// Reports are only ever appended.
    async fn append_report(&self, report: NewReport) -> Result<Report>;

    async fn list_reports(&self, limit: i64) -> Result<Vec<Report>>;

    async fn quiz_settings(&self) -> Result<QuizSettings>;

    async fn set_quiz_active(&self, is_active: bool) -> Result<QuizSettings>;

    async fn insert_quiz_response(
        &self,
        user_id: Uuid,
        answers: &[i32],
        score: Option<i32>,
    ) -> Result<QuizResponse>;
}
