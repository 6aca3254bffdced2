//! Per-client attempt windows for the login and submission endpoints.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const FORWARDED_FOR: &str = "x-forwarded-for";
const UNKNOWN_CLIENT: &str = "unknown";

/// Where a request's client identity is read from.
///
/// `ForwardedFor` is only sound when a proxy in front of the service rewrites
/// the header; otherwise every client can pick its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKeySource {
    Peer,
    ForwardedFor,
}

impl ClientKeySource {
    pub fn from_trust(trust_proxy_headers: bool) -> Self {
        if trust_proxy_headers {
            Self::ForwardedFor
        } else {
            Self::Peer
        }
    }

    pub fn resolve(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        let forwarded = match self {
            Self::Peer => None,
            Self::ForwardedFor => headers
                .get(FORWARDED_FOR)
                .and_then(|v| v.to_str().ok())
                .and_then(|chain| chain.split(',').next())
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .map(str::to_owned),
        };
        forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_owned())
    }
}

/// Rejection carrying how long until the client's oldest attempt leaves the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryAfter(pub Duration);

impl RetryAfter {
    /// Whole seconds, never zero, for the `Retry-After` header.
    pub fn seconds(&self) -> u64 {
        self.0.as_secs().max(1)
    }
}

impl IntoResponse for RetryAfter {
    fn into_response(self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, self.seconds().to_string())],
            "Too many requests. Please try again later.",
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<RwLock<HashMap<String, VecDeque<Instant>>>>,
    max_attempts: usize,
    window: Duration,
    key_source: ClientKeySource,
}

fn expire(attempts: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while attempts
        .front()
        .is_some_and(|first| now.duration_since(*first) >= window)
    {
        attempts.pop_front();
    }
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window: Duration, key_source: ClientKeySource) -> Self {
        Self {
            windows: Arc::new(RwLock::new(HashMap::new())),
            max_attempts,
            window,
            key_source,
        }
    }

    pub fn client_key(&self, headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
        self.key_source.resolve(headers, peer)
    }

    /// Counts one attempt for `client` unless its window is already full.
    pub async fn admit(&self, client: &str) -> Result<(), RetryAfter> {
        self.admit_at(client, Instant::now()).await
    }

    async fn admit_at(&self, client: &str, now: Instant) -> Result<(), RetryAfter> {
        let mut windows = self.windows.write().await;
        let attempts = windows.entry(client.to_owned()).or_default();
        expire(attempts, now, self.window);

        if attempts.len() >= self.max_attempts {
            let oldest = attempts.front().copied().unwrap_or(now);
            return Err(RetryAfter(
                self.window.saturating_sub(now.duration_since(oldest)),
            ));
        }
        attempts.push_back(now);
        Ok(())
    }

    /// Forgets clients with nothing left in their window; returns how many remain.
    pub async fn purge_idle(&self) -> usize {
        self.purge_idle_at(Instant::now()).await
    }

    async fn purge_idle_at(&self, now: Instant) -> usize {
        let mut windows = self.windows.write().await;
        windows.retain(|_, attempts| {
            expire(attempts, now, self.window);
            !attempts.is_empty()
        });
        windows.len()
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    peer: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = limiter.client_key(request.headers(), peer.map(|ConnectInfo(addr)| addr));

    match limiter.admit(&client).await {
        Ok(()) => next.run(request).await,
        Err(limited) => {
            tracing::warn!(
                "Submission rate limit exceeded for {}, retry in {}s",
                client,
                limited.seconds()
            );
            limited.into_response()
        }
    }
}
