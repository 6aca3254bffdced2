use crate::domain::models::QuizResponse;
use crate::domain::quiz::{validate_answers, QuizError};
use crate::state::SharedState;
use crate::web::session::VisitorSession;
use crate::web::{api_error, internal_error, ApiError};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct QuizStatus {
    pub is_active: bool,
    pub scored: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    pub answers: Vec<i32>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/responses", post(submit))
        .with_state(state)
}

async fn status(State(state): State<SharedState>) -> Result<Json<QuizStatus>, StatusCode> {
    let settings = state.store.quiz_settings().await.map_err(|e| {
        tracing::error!("Failed to load quiz settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(QuizStatus {
        is_active: settings.is_active,
        scored: state.quiz_key.is_some(),
    }))
}

async fn submit(
    State(state): State<SharedState>,
    VisitorSession(user): VisitorSession,
    Json(payload): Json<QuizSubmission>,
) -> Result<(StatusCode, Json<QuizResponse>), ApiError> {
    let settings = state
        .store
        .quiz_settings()
        .await
        .map_err(|e| internal_error("Failed to load quiz settings", e))?;
    if !settings.is_active {
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "quiz_inactive",
            QuizError::Inactive.to_string(),
        ));
    }

    validate_answers(&payload.answers)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, "invalid", e.to_string()))?;

    // unscored until an answer key is configured
    let score = state.quiz_key.as_ref().map(|key| key.score(&payload.answers));
    let response = state
        .store
        .insert_quiz_response(user.id, &payload.answers, score)
        .await
        .map_err(|e| internal_error("Failed to store quiz response", e))?;

    tracing::info!("Quiz response {} recorded, score {:?}", response.id, score);
    Ok((StatusCode::CREATED, Json(response)))
}
