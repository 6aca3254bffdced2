pub mod admin;
pub mod auth;
pub mod insights;
pub mod quiz;
pub mod session;
pub mod submissions;
pub mod visitor;

use crate::state::SharedState;
use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

/// Body for rejections that carry more than a status code.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, error: &'static str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error,
            message: message.into(),
        }),
    )
}

pub fn internal_error(context: &str, err: impl std::fmt::Display) -> ApiError {
    tracing::error!("{}: {}", context, err);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "Something went wrong. Please try again.",
    )
}

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/session", visitor::router(state.clone()))
        .nest("/submissions", submissions::router(state.clone()))
        .nest("/quiz", quiz::router(state.clone()))
        .nest("/auth", auth::router(state.clone()))
        .nest("/admin", admin::router(state.clone()))
        .nest("/insights", insights::router(state))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::Config;
    use crate::db::MemoryStore;
    use crate::state::{AppState, SharedState};
    use crate::web::session::sign_admin_session;
    use argon2::password_hash::{PasswordHasher, SaltString};
    use argon2::Argon2;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use base64::{engine::general_purpose, Engine as _};
    use once_cell::sync::Lazy;
    use rand_core::OsRng;
    use std::collections::HashMap;
    use std::sync::Arc;

    pub const ADMIN_PASSWORD: &str = "correct horse battery";
    pub const VISITOR: &str = "visitor-session-0001";

    // hashing is slow in debug builds; share one hash across tests
    static ADMIN_HASH: Lazy<String> = Lazy::new(|| {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(ADMIN_PASSWORD.as_bytes(), &salt)
            .unwrap()
            .to_string()
    });

    pub fn state_with(extra: &[(&'static str, &str)]) -> SharedState {
        let mut env: HashMap<&str, String> = HashMap::from([
            ("SESSION_KEY", general_purpose::STANDARD.encode([42u8; 32])),
            ("ADMIN_PASSWORD_HASH", ADMIN_HASH.clone()),
            ("PUBLIC_BASE_URL", "https://box.test".to_string()),
        ]);
        for (key, value) in extra {
            env.insert(*key, value.to_string());
        }
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
        Arc::new(AppState::new(&config, Arc::new(MemoryStore::new())))
    }

    pub fn state() -> SharedState {
        state_with(&[])
    }

    pub fn admin_bearer(state: &SharedState) -> String {
        format!("Bearer {}", sign_admin_session(&state.session_key).unwrap())
    }

    pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-session-id", VISITOR)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
