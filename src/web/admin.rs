use crate::analytics::sentiment::{self, Sentiment};
use crate::domain::dashboard::{merge_submissions, DashboardStats};
use crate::domain::models::{QuizSettings, Submission};
use crate::services::change_feed::ChangeEvent;
use crate::state::SharedState;
use crate::web::session::AdminSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub sentiment: Sentiment,
    pub sentiment_label: &'static str,
    pub sentiment_emoji: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ShareLink {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct QuizToggle {
    pub is_active: bool,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/submissions", get(list_submissions))
        .route("/submissions/:kind/:id", get(submission_detail))
        .route("/quiz", get(quiz_settings).put(set_quiz))
        .route("/share-link", get(share_link))
        .route("/events", get(events))
        .with_state(state)
}

async fn stats(
    _admin: AdminSession,
    State(state): State<SharedState>,
) -> Result<Json<DashboardStats>, StatusCode> {
    let (suggestions, feedback, total_users) = tokio::try_join!(
        state.store.list_suggestions(),
        state.store.list_feedback(),
        state.store.count_users()
    )
    .map_err(|e| {
        tracing::error!("Failed to load dashboard stats: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(DashboardStats::compute(
        &suggestions,
        &feedback,
        total_users,
        Utc::now().date_naive(),
    )))
}

async fn list_submissions(
    _admin: AdminSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Submission>>, StatusCode> {
    let (suggestions, feedback) =
        tokio::try_join!(state.store.list_suggestions(), state.store.list_feedback()).map_err(
            |e| {
                tracing::error!("Failed to list submissions: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            },
        )?;
    Ok(Json(merge_submissions(suggestions, feedback)))
}

async fn submission_detail(
    _admin: AdminSession,
    State(state): State<SharedState>,
    Path((kind, id)): Path<(String, Uuid)>,
) -> Result<Json<SubmissionDetail>, StatusCode> {
    let found = match kind.as_str() {
        "suggestion" => state
            .store
            .find_suggestion(id)
            .await
            .map(|s| s.map(Submission::Suggestion)),
        "feedback" => state
            .store
            .find_feedback(id)
            .await
            .map(|f| f.map(Submission::Feedback)),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    let submission = found
        .map_err(|e| {
            tracing::error!("Failed to load {} {}: {}", kind, id, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::NOT_FOUND)?;

    let label = sentiment::classify(submission.content(), state.analysis.match_mode);
    Ok(Json(SubmissionDetail {
        submission,
        sentiment: label,
        sentiment_label: label.label(),
        sentiment_emoji: label.emoji(),
    }))
}

async fn quiz_settings(
    _admin: AdminSession,
    State(state): State<SharedState>,
) -> Result<Json<QuizSettings>, StatusCode> {
    state.store.quiz_settings().await.map(Json).map_err(|e| {
        tracing::error!("Failed to load quiz settings: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn set_quiz(
    _admin: AdminSession,
    State(state): State<SharedState>,
    Json(payload): Json<QuizToggle>,
) -> Result<Json<QuizSettings>, StatusCode> {
    let settings = state
        .store
        .set_quiz_active(payload.is_active)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update quiz settings: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
    tracing::info!("Quiz switched {}", if settings.is_active { "on" } else { "off" });
    state.change_feed.publish(ChangeEvent::QuizSettingsChanged {
        is_active: settings.is_active,
    });
    Ok(Json(settings))
}

async fn share_link(_admin: AdminSession, State(state): State<SharedState>) -> Json<ShareLink> {
    Json(ShareLink {
        url: state.submit_url.clone(),
    })
}

fn to_sse(message: Result<ChangeEvent, BroadcastStreamRecvError>) -> Event {
    match message {
        Ok(change) => Event::default()
            .event(change.event_type())
            .json_data(&change)
            .unwrap_or_else(|e| {
                tracing::error!("Failed to encode change event: {}", e);
                Event::default().event("resync")
            }),
        // the client missed events; it re-reads everything
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Event stream lagged, {} events skipped", skipped);
            Event::default().event("resync").data(skipped.to_string())
        }
    }
}

/// Live change notifications for the dashboard.
async fn events(
    _admin: AdminSession,
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.change_feed.subscribe())
        .map(|message| Ok::<_, Infallible>(to_sse(message)));
    tracing::debug!(
        subscribers = state.change_feed.subscriber_count(),
        "dashboard subscribed to events"
    );
    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SubmissionStore;
    use crate::domain::models::{NewFeedback, NewSuggestion};
    use crate::web::testing::{admin_bearer, body_json, state};
    use crate::web::routes;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::json;
    use tower::ServiceExt;

    fn admin_get(uri: &str, bearer: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, bearer)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_requires_admin() {
        let app = routes(state());
        for uri in ["/admin/stats", "/admin/submissions", "/admin/quiz", "/admin/events"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_stats_and_merged_list() {
        let state = state();
        let user = state.store.find_or_create_user("dashboard-visitor").await.unwrap();
        state
            .store
            .insert_suggestion(
                user.id,
                &NewSuggestion {
                    title: "Coffee".to_string(),
                    content: "Better coffee in the lounge".to_string(),
                },
            )
            .await
            .unwrap();
        let feedback = state
            .store
            .insert_feedback(
                user.id,
                &NewFeedback {
                    content: "Terrible parking situation".to_string(),
                    category: None,
                },
            )
            .await
            .unwrap();
        let bearer = admin_bearer(&state);
        let app = routes(state);

        let stats = body_json(app.clone().oneshot(admin_get("/admin/stats", &bearer)).await.unwrap()).await;
        assert_eq!(stats["total_suggestions"], 1);
        assert_eq!(stats["total_feedback"], 1);
        assert_eq!(stats["total_users"], 1);
        assert_eq!(stats["today_count"], 2);

        let list = body_json(app.clone().oneshot(admin_get("/admin/submissions", &bearer)).await.unwrap()).await;
        let kinds: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["type"].as_str())
            .collect();
        assert_eq!(kinds.len(), 2);
        assert!(kinds.contains(&"suggestion") && kinds.contains(&"feedback"));

        let detail = app
            .clone()
            .oneshot(admin_get(&format!("/admin/submissions/feedback/{}", feedback.id), &bearer))
            .await
            .unwrap();
        assert_eq!(detail.status(), StatusCode::OK);
        let detail = body_json(detail).await;
        assert_eq!(detail["sentiment"], "negative");
        assert_eq!(detail["sentiment_label"], "Negative");

        let missing = app
            .oneshot(admin_get(&format!("/admin/submissions/suggestion/{}", feedback.id), &bearer))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quiz_toggle_publishes_change() {
        let state = state();
        let mut events = state.change_feed.subscribe();
        let bearer = admin_bearer(&state);
        let app = routes(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/admin/quiz")
                    .header(header::AUTHORIZATION, bearer.as_str())
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "is_active": true }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["is_active"], true);
        assert_eq!(
            events.recv().await.unwrap(),
            ChangeEvent::QuizSettingsChanged { is_active: true }
        );

        let public = app
            .oneshot(Request::builder().uri("/quiz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(public).await["is_active"], true);
    }

    #[tokio::test]
    async fn test_share_link() {
        let state = state();
        let bearer = admin_bearer(&state);
        let response = routes(state).oneshot(admin_get("/admin/share-link", &bearer)).await.unwrap();
        assert_eq!(body_json(response).await["url"], "https://box.test/submit");
    }

    #[tokio::test]
    async fn test_events_stream_opens() {
        let state = state();
        let bearer = admin_bearer(&state);
        let response = routes(state).oneshot(admin_get("/admin/events", &bearer)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/event-stream"
        );
    }
}
