//! In-process store used when no database is configured, and by tests.

use crate::db::SubmissionStore;
use crate::domain::models::{
    Feedback, NewFeedback, NewReport, NewSuggestion, QuizResponse, QuizSettings, Report,
    Suggestion, VisitorUser,
};
use crate::domain::submission::SubmissionCounts;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<String, VisitorUser>,
    // insertion order; listings reverse it
    suggestions: Vec<Suggestion>,
    feedback: Vec<Feedback>,
    reports: Vec<Report>,
    quiz_settings: Option<QuizSettings>,
    quiz_responses: Vec<QuizResponse>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn default_quiz_settings() -> QuizSettings {
    let now = Utc::now();
    QuizSettings {
        id: Uuid::new_v4(),
        is_active: false,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn find_or_create_user(&self, session_id: &str) -> Result<VisitorUser> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .entry(session_id.to_string())
            .or_insert_with(|| VisitorUser {
                id: Uuid::new_v4(),
                session_id: session_id.to_string(),
                email: None,
                created_at: Utc::now(),
            });
        Ok(user.clone())
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn count_submissions(&self, user_id: Uuid) -> Result<SubmissionCounts> {
        let tables = self.tables.read().await;
        Ok(SubmissionCounts {
            suggestions: tables
                .suggestions
                .iter()
                .filter(|s| s.user_id == Some(user_id))
                .count() as i64,
            feedback: tables
                .feedback
                .iter()
                .filter(|f| f.user_id == Some(user_id))
                .count() as i64,
        })
    }

    async fn insert_suggestion(&self, user_id: Uuid, suggestion: &NewSuggestion) -> Result<Suggestion> {
        let row = Suggestion {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            title: suggestion.title.clone(),
            content: suggestion.content.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.suggestions.push(row.clone());
        Ok(row)
    }

    async fn insert_feedback(&self, user_id: Uuid, feedback: &NewFeedback) -> Result<Feedback> {
        let row = Feedback {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            content: feedback.content.clone(),
            category: feedback.category.clone(),
            created_at: Utc::now(),
        };
        self.tables.write().await.feedback.push(row.clone());
        Ok(row)
    }

    async fn list_suggestions(&self) -> Result<Vec<Suggestion>> {
        Ok(self.tables.read().await.suggestions.iter().rev().cloned().collect())
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        Ok(self.tables.read().await.feedback.iter().rev().cloned().collect())
    }

    async fn find_suggestion(&self, id: Uuid) -> Result<Option<Suggestion>> {
        let tables = self.tables.read().await;
        Ok(tables.suggestions.iter().find(|s| s.id == id).cloned())
    }

    async fn find_feedback(&self, id: Uuid) -> Result<Option<Feedback>> {
        let tables = self.tables.read().await;
        Ok(tables.feedback.iter().find(|f| f.id == id).cloned())
    }

    async fn append_report(&self, report: NewReport) -> Result<Report> {
        let row = Report {
            id: Uuid::new_v4(),
            generated_at: report.generated_at,
            summary: report.summary,
            sentiment: report.sentiment,
            topics: report.topics,
            raw_data: report.raw_data,
        };
        self.tables.write().await.reports.push(row.clone());
        Ok(row)
    }

    async fn list_reports(&self, limit: i64) -> Result<Vec<Report>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn quiz_settings(&self) -> Result<QuizSettings> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .quiz_settings
            .get_or_insert_with(default_quiz_settings)
            .clone())
    }

    async fn set_quiz_active(&self, is_active: bool) -> Result<QuizSettings> {
        let mut tables = self.tables.write().await;
        let settings = tables.quiz_settings.get_or_insert_with(default_quiz_settings);
        settings.is_active = is_active;
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }

    async fn insert_quiz_response(
        &self,
        user_id: Uuid,
        answers: &[i32],
        score: Option<i32>,
    ) -> Result<QuizResponse> {
        let row = QuizResponse {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            answers: answers.to_vec(),
            score,
            completed_at: Utc::now(),
        };
        self.tables.write().await.quiz_responses.push(row.clone());
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_or_create_user_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.find_or_create_user("abc123def456").await.unwrap();
        let second = store.find_or_create_user("abc123def456").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_counts_are_per_user() {
        let store = MemoryStore::new();
        let alice = store.find_or_create_user("session-alice").await.unwrap();
        let bob = store.find_or_create_user("session-bob").await.unwrap();

        let suggestion = NewSuggestion {
            title: "Title".to_string(),
            content: "Some content".to_string(),
        };
        store.insert_suggestion(alice.id, &suggestion).await.unwrap();
        store.insert_suggestion(alice.id, &suggestion).await.unwrap();
        store
            .insert_feedback(
                bob.id,
                &NewFeedback {
                    content: "Feedback content".to_string(),
                    category: None,
                },
            )
            .await
            .unwrap();

        let counts = store.count_submissions(alice.id).await.unwrap();
        assert_eq!(counts, SubmissionCounts { suggestions: 2, feedback: 0 });
        let counts = store.count_submissions(bob.id).await.unwrap();
        assert_eq!(counts, SubmissionCounts { suggestions: 0, feedback: 1 });
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        let user = store.find_or_create_user("session-order").await.unwrap();
        for title in ["first", "second", "third"] {
            store
                .insert_suggestion(
                    user.id,
                    &NewSuggestion {
                        title: title.to_string(),
                        content: "content".to_string(),
                    },
                )
                .await
                .unwrap();
        }
        let titles: Vec<String> = store
            .list_suggestions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_quiz_toggle() {
        let store = MemoryStore::new();
        assert!(!store.quiz_settings().await.unwrap().is_active);
        let updated = store.set_quiz_active(true).await.unwrap();
        assert!(updated.is_active);
        assert!(store.quiz_settings().await.unwrap().is_active);
        assert_eq!(updated.id, store.quiz_settings().await.unwrap().id);
    }

    #[tokio::test]
    async fn test_reports_append_and_limit() {
        let store = MemoryStore::new();
        for i in 0..3 {
            store
                .append_report(NewReport {
                    generated_at: Utc::now(),
                    summary: format!("report {i}"),
                    sentiment: "neutral".to_string(),
                    topics: vec![],
                    raw_data: serde_json::json!({ "n": i }),
                })
                .await
                .unwrap();
        }
        let reports = store.list_reports(2).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].summary, "report 2");
    }
}
