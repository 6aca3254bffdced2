use crate::db::SubmissionStore;
use crate::domain::models::{
    Feedback, NewFeedback, NewReport, NewSuggestion, QuizResponse, QuizSettings, Report,
    Suggestion, VisitorUser,
};
use crate::domain::submission::SubmissionCounts;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        tracing::info!("Connecting to database...");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to database: {}", e);
                e
            })?;
        tracing::info!("Database connection established");

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run database migrations: {}", e);
                e
            })?;
        tracing::info!("Database migrations completed");

        Ok(Self::new(pool))
    }
}

// NULL text is read back as an empty string so one bad row cannot fail a listing.
const SUGGESTION_COLUMNS: &str = r#"
    id,
    user_id,
    COALESCE(title, '') AS title,
    COALESCE(content, '') AS content,
    COALESCE(created_at, now()) AS created_at
"#;

const FEEDBACK_COLUMNS: &str = r#"
    id,
    user_id,
    COALESCE(content, '') AS content,
    category,
    COALESCE(created_at, now()) AS created_at
"#;

const REPORT_COLUMNS: &str = "id, generated_at, summary, sentiment, topics, raw_data";

const QUIZ_SETTINGS_COLUMNS: &str = "id, is_active, created_at, updated_at";

#[async_trait]
impl SubmissionStore for PgStore {
    async fn find_or_create_user(&self, session_id: &str) -> Result<VisitorUser> {
        let user = sqlx::query_as::<_, VisitorUser>(
            r#"
            INSERT INTO users (id, session_id)
            VALUES ($1, $2)
            ON CONFLICT (session_id) DO UPDATE SET session_id = EXCLUDED.session_id
            RETURNING id, session_id, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_submissions(&self, user_id: Uuid) -> Result<SubmissionCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM suggestions WHERE user_id = $1) AS suggestions,
                (SELECT COUNT(*) FROM feedback WHERE user_id = $1) AS feedback
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(SubmissionCounts {
            suggestions: row.try_get("suggestions")?,
            feedback: row.try_get("feedback")?,
        })
    }

    async fn insert_suggestion(&self, user_id: Uuid, suggestion: &NewSuggestion) -> Result<Suggestion> {
        let query = format!(
            "INSERT INTO suggestions (id, user_id, title, content) VALUES ($1, $2, $3, $4) RETURNING {SUGGESTION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Suggestion>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&suggestion.title)
            .bind(&suggestion.content)
            .fetch_one(&self.pool)
            .await
            .context("insert suggestion")?;
        Ok(row)
    }

    async fn insert_feedback(&self, user_id: Uuid, feedback: &NewFeedback) -> Result<Feedback> {
        let query = format!(
            "INSERT INTO feedback (id, user_id, content, category) VALUES ($1, $2, $3, $4) RETURNING {FEEDBACK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Feedback>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&feedback.content)
            .bind(&feedback.category)
            .fetch_one(&self.pool)
            .await
            .context("insert feedback")?;
        Ok(row)
    }

    async fn list_suggestions(&self) -> Result<Vec<Suggestion>> {
        let query = format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, Suggestion>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let query = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, Feedback>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_suggestion(&self, id: Uuid) -> Result<Option<Suggestion>> {
        let query = format!("SELECT {SUGGESTION_COLUMNS} FROM suggestions WHERE id = $1");
        let row = sqlx::query_as::<_, Suggestion>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_feedback(&self, id: Uuid) -> Result<Option<Feedback>> {
        let query = format!("SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = $1");
        let row = sqlx::query_as::<_, Feedback>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn append_report(&self, report: NewReport) -> Result<Report> {
        let query = format!(
            "INSERT INTO reports (id, generated_at, summary, sentiment, topics, raw_data) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {REPORT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Report>(&query)
            .bind(Uuid::new_v4())
            .bind(report.generated_at)
            .bind(report.summary)
            .bind(report.sentiment)
            .bind(report.topics)
            .bind(report.raw_data)
            .fetch_one(&self.pool)
            .await
            .context("append report")?;
        Ok(row)
    }

    async fn list_reports(&self, limit: i64) -> Result<Vec<Report>> {
        let query =
            format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY generated_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, Report>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn quiz_settings(&self) -> Result<QuizSettings> {
        let query = format!(
            "SELECT {QUIZ_SETTINGS_COLUMNS} FROM quiz_settings ORDER BY created_at ASC LIMIT 1"
        );
        let row = sqlx::query_as::<_, QuizSettings>(&query)
            .fetch_one(&self.pool)
            .await
            .context("quiz_settings row missing")?;
        Ok(row)
    }

    async fn set_quiz_active(&self, is_active: bool) -> Result<QuizSettings> {
        let query = format!(
            r#"
            UPDATE quiz_settings
            SET is_active = $1, updated_at = now()
            WHERE id = (SELECT id FROM quiz_settings ORDER BY created_at ASC LIMIT 1)
            RETURNING {QUIZ_SETTINGS_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, QuizSettings>(&query)
            .bind(is_active)
            .fetch_one(&self.pool)
            .await
            .context("update quiz_settings")?;
        Ok(row)
    }

    async fn insert_quiz_response(
        &self,
        user_id: Uuid,
        answers: &[i32],
        score: Option<i32>,
    ) -> Result<QuizResponse> {
        let row = sqlx::query_as::<_, QuizResponse>(
            r#"
            INSERT INTO quiz_responses (id, user_id, answers, score)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, answers, score, completed_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(answers)
        .bind(score)
        .fetch_one(&self.pool)
        .await
        .context("insert quiz response")?;
        Ok(row)
    }
}
