use crate::analytics::aggregator::SourceKind;
use crate::domain::models::{NewFeedback, NewSuggestion, Submission};
use crate::domain::submission::{
    validate_feedback, validate_suggestion, LimitStatus, SubmissionCounts, SubmissionError,
};
use crate::middleware::rate_limit_middleware;
use crate::services::change_feed::ChangeEvent;
use crate::state::SharedState;
use crate::web::session::VisitorSession;
use crate::web::{api_error, internal_error, ApiError};
use axum::{extract::State, http::StatusCode, middleware, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SubmissionCreated {
    pub submission: Submission,
    pub limits: LimitStatus,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/suggestions", post(create_suggestion))
        .route("/feedback", post(create_feedback))
        .route_layer(middleware::from_fn_with_state(
            state.submit_limiter.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

fn reject(err: SubmissionError) -> ApiError {
    match err {
        SubmissionError::LimitReached(_) => {
            api_error(StatusCode::CONFLICT, "limit_reached", err.to_string())
        }
        _ => api_error(StatusCode::BAD_REQUEST, "invalid", err.to_string()),
    }
}

async fn counts_with_room(
    state: &SharedState,
    user_id: Uuid,
    kind: SourceKind,
) -> Result<SubmissionCounts, ApiError> {
    let counts = state
        .store
        .count_submissions(user_id)
        .await
        .map_err(|e| internal_error("Failed to count submissions", e))?;
    state.limits.check(kind, &counts).map_err(|e| {
        tracing::info!("Session {} hit the {} limit", user_id, kind.label());
        reject(e)
    })?;
    Ok(counts)
}

async fn create_suggestion(
    State(state): State<SharedState>,
    VisitorSession(user): VisitorSession,
    Json(payload): Json<NewSuggestion>,
) -> Result<(StatusCode, Json<SubmissionCreated>), ApiError> {
    let payload = validate_suggestion(payload).map_err(reject)?;
    let mut counts = counts_with_room(&state, user.id, SourceKind::Suggestion).await?;

    let suggestion = state
        .store
        .insert_suggestion(user.id, &payload)
        .await
        .map_err(|e| internal_error("Failed to store suggestion", e))?;
    counts.suggestions += 1;

    tracing::info!("Suggestion {} submitted by {}", suggestion.id, user.id);
    state
        .change_feed
        .publish(ChangeEvent::SuggestionCreated { id: suggestion.id });

    Ok((
        StatusCode::CREATED,
        Json(SubmissionCreated {
            submission: Submission::Suggestion(suggestion),
            limits: state.limits.status(&counts),
        }),
    ))
}

async fn create_feedback(
    State(state): State<SharedState>,
    VisitorSession(user): VisitorSession,
    Json(payload): Json<NewFeedback>,
) -> Result<(StatusCode, Json<SubmissionCreated>), ApiError> {
    let payload = validate_feedback(payload).map_err(reject)?;
    let mut counts = counts_with_room(&state, user.id, SourceKind::Feedback).await?;

    let feedback = state
        .store
        .insert_feedback(user.id, &payload)
        .await
        .map_err(|e| internal_error("Failed to store feedback", e))?;
    counts.feedback += 1;

    tracing::info!("Feedback {} submitted by {}", feedback.id, user.id);
    state
        .change_feed
        .publish(ChangeEvent::FeedbackCreated { id: feedback.id });

    Ok((
        StatusCode::CREATED,
        Json(SubmissionCreated {
            submission: Submission::Feedback(feedback),
            limits: state.limits.status(&counts),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use crate::db::SubmissionStore;
    use crate::services::change_feed::ChangeEvent;
    use crate::web::testing::{body_json, json_request, state, state_with};
    use crate::web::routes;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    fn suggestion(n: usize) -> serde_json::Value {
        json!({ "title": format!("Idea {n}"), "content": "Please add more bike racks outside." })
    }

    #[tokio::test]
    async fn test_suggestion_limit_enforced() {
        let state = state();
        let app = routes(state.clone());

        for n in 0..2 {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/submissions/suggestions", suggestion(n)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(json_request("POST", "/submissions/suggestions", suggestion(3)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], "limit_reached");
        assert_eq!(state.store.list_suggestions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feedback_created_and_reported() {
        let state = state();
        let mut events = state.change_feed.subscribe();
        let app = routes(state);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/submissions/feedback",
                json!({ "content": "The new layout is great", "category": "ui" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["submission"]["type"], "feedback");
        assert_eq!(body["submission"]["category"], "ui");
        assert_eq!(body["limits"]["feedback_count"], 1);
        assert_eq!(body["limits"]["can_submit_feedback"], false);

        let id = body["submission"]["id"].as_str().unwrap().parse().unwrap();
        assert_eq!(events.recv().await.unwrap(), ChangeEvent::FeedbackCreated { id });

        let second = app
            .oneshot(json_request(
                "POST",
                "/submissions/feedback",
                json!({ "content": "One more thought to share" }),
            ))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_validation_rejected() {
        let app = routes(state());
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/submissions/suggestions",
                json!({ "title": "Hi", "content": "Long enough content here" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(json_request(
                "POST",
                "/submissions/feedback",
                json!({ "content": "too short" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid");
    }

    #[tokio::test]
    async fn test_ip_rate_limit() {
        let app = routes(state_with(&[("SUBMIT_RATE_LIMIT", "1")]));
        let first = app
            .clone()
            .oneshot(json_request("POST", "/submissions/suggestions", suggestion(1)))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(json_request("POST", "/submissions/suggestions", suggestion(2)))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key("retry-after"));
    }

    #[tokio::test]
    async fn test_ip_rate_limit_ignores_spoofed_forwarded_for() {
        let app = routes(state_with(&[("SUBMIT_RATE_LIMIT", "1")]));
        let mut statuses = Vec::new();
        for n in 0..3 {
            let mut request = json_request("POST", "/submissions/feedback", json!({
                "content": "Quieter music in the lobby please"
            }));
            request
                .headers_mut()
                .insert("x-forwarded-for", format!("198.51.100.{n}").parse().unwrap());
            statuses.push(app.clone().oneshot(request).await.unwrap().status());
        }
        assert_eq!(
            statuses,
            vec![
                StatusCode::CREATED,
                StatusCode::TOO_MANY_REQUESTS,
                StatusCode::TOO_MANY_REQUESTS
            ]
        );
    }
}
