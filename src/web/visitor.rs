use crate::domain::submission::LimitStatus;
use crate::state::SharedState;
use crate::web::session::VisitorSession;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub limits: LimitStatus,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(register).get(register))
        .with_state(state)
}

/// Registers the browser session on first call and reports what it may still submit.
async fn register(
    State(state): State<SharedState>,
    VisitorSession(user): VisitorSession,
) -> Result<Json<SessionResponse>, StatusCode> {
    let counts = state.store.count_submissions(user.id).await.map_err(|e| {
        tracing::error!("Failed to count submissions for {}: {}", user.id, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(SessionResponse {
        user_id: user.id,
        limits: state.limits.status(&counts),
    }))
}
