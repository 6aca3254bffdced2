use crate::domain::models::VisitorUser;
use crate::state::SharedState;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";
pub const VISITOR_HEADER: &str = "x-session-id";
pub const SESSION_TTL_HOURS: i64 = 24;

const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone)]
pub struct AdminClaims {
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
}

pub fn sign_admin_session(key: &[u8]) -> Result<String, SessionError> {
    let exp = Utc::now() + Duration::hours(SESSION_TTL_HOURS);
    sign_payload(&format!("{}|{}", ADMIN_SUBJECT, exp.timestamp()), key)
}

fn sign_payload(payload: &str, key: &[u8]) -> Result<String, SessionError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    ))
}

pub fn verify_admin_session(token: &str, key: &[u8]) -> Result<AdminClaims, SessionError> {
    let (payload_b64, sig_b64) = token.split_once('.').ok_or(SessionError::Invalid)?;
    let payload_bytes = general_purpose::STANDARD
        .decode(payload_b64)
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(sig_b64)
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let (subject, exp) = payload.split_once('|').ok_or(SessionError::Invalid)?;
    if subject != ADMIN_SUBJECT {
        return Err(SessionError::Invalid);
    }
    let exp: i64 = exp.parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(AdminClaims { exp })
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(val) = auth.to_str() {
            if let Some(bearer) = val.strip_prefix("Bearer ") {
                return Some(bearer.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(axum::http::header::COOKIE) {
        if let Ok(val) = cookie.to_str() {
            for pair in val.split(';') {
                if let Some(rest) = pair.trim().strip_prefix("session=") {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

/// Browser-generated id; a soft per-device heuristic, not an identity.
pub fn is_valid_visitor_id(id: &str) -> bool {
    (8..=128).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '_' | '-'))
}

// ============================================
// Axum extractors
// ============================================

/// Rejects requests without a valid admin token.
pub struct AdminSession(pub AdminClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = SharedState::from_ref(state);
        let token = extract_token(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)?;
        let claims = verify_admin_session(&token, &shared_state.session_key).map_err(|e| {
            tracing::warn!("Admin session verification failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;
        Ok(AdminSession(claims))
    }
}

/// Resolves the `X-Session-Id` header to a visitor row, creating it on first sight.
pub struct VisitorSession(pub VisitorUser);

#[async_trait]
impl<S> FromRequestParts<S> for VisitorSession
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared_state = SharedState::from_ref(state);

        let session_id = parts
            .headers
            .get(VISITOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .ok_or(StatusCode::UNAUTHORIZED)?;
        if !is_valid_visitor_id(session_id) {
            return Err(StatusCode::BAD_REQUEST);
        }

        let user = shared_state
            .store
            .find_or_create_user(session_id)
            .await
            .map_err(|e| {
                tracing::error!("Visitor lookup failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            })?;

        Ok(VisitorSession(user))
    }
}
