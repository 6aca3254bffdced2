use crate::state::SharedState;
use crate::web::session::{self, SESSION_COOKIE, SESSION_TTL_HOURS};
use argon2::{password_hash::PasswordHash, Argon2, PasswordVerifier};
use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .with_state(state)
}

fn session_cookie(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue, StatusCode> {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}{secure_flag}")
        .parse()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn login(
    peer: Option<ConnectInfo<SocketAddr>>,
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let ip = state
        .login_limiter
        .client_key(&headers, peer.map(|ConnectInfo(addr)| addr));
    state.login_limiter.admit(&ip).await.map_err(|limited| {
        tracing::warn!(
            "Login rate limit exceeded for {}, retry in {}s",
            ip,
            limited.seconds()
        );
        StatusCode::TOO_MANY_REQUESTS
    })?;

    let parsed_hash = PasswordHash::new(&state.admin_password_hash).map_err(|e| {
        tracing::error!("Stored admin hash is unreadable: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .map_err(|_| {
            tracing::warn!("Failed admin login from {}", ip);
            StatusCode::UNAUTHORIZED
        })?;

    let token = session::sign_admin_session(&state.session_key)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let max_age = SESSION_TTL_HOURS * 3600;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        session_cookie(&token, max_age, state.secure_cookies)?,
    );
    tracing::info!("Admin logged in from {}", ip);

    Ok((
        response_headers,
        Json(LoginResponse {
            token,
            expires_in: max_age,
        }),
    ))
}

async fn logout(State(state): State<SharedState>) -> Result<impl IntoResponse, StatusCode> {
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, session_cookie("", 0, state.secure_cookies)?);
    Ok((StatusCode::NO_CONTENT, headers))
}
