//! Request middleware: request IDs, bearer auth, per-caller rate limits.
//!
//! Auth and limiter settings come from [`AppConfig`] so every knob is
//! parsed and validated in one place; nothing here reads the environment
//! directly.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use revlens_core::{AppConfig, Environment};

/// Request ID carried through extensions and echoed as a response header.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Bearer-token auth settings.
#[derive(Debug, Clone)]
pub struct AuthState {
    api_keys: Arc<HashSet<String>>,
    pub enabled: bool,
}

impl AuthState {
    /// Auth derived from the configured key set: enabled whenever at
    /// least one key is present.
    ///
    /// Development tolerates an empty key set and runs with auth off for
    /// local iteration; every other environment refuses to start without
    /// keys.
    ///
    /// # Errors
    ///
    /// Fails when `api_keys` is empty outside development.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        if config.api_keys.is_empty() {
            if config.env == Environment::Development {
                tracing::warn!("no API keys configured; bearer auth disabled in development");
                return Ok(Self::disabled());
            }
            anyhow::bail!(
                "REVLENS_API_KEYS must list at least one bearer token outside development"
            );
        }

        Ok(Self {
            api_keys: Arc::new(config.api_keys.iter().cloned().collect()),
            enabled: true,
        })
    }

    /// Auth switched off entirely.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            api_keys: Arc::new(HashSet::new()),
            enabled: false,
        }
    }

    fn allows(&self, token: &str) -> bool {
        self.api_keys.contains(token)
    }
}

#[derive(Debug)]
struct ClientWindow {
    started_at: Instant,
    count: usize,
}

/// Fixed-window rate limiter tracked per caller.
///
/// Callers are keyed by bearer token, so one tenant's burst cannot starve
/// another; unauthenticated traffic shares a single bucket. Expired
/// windows are pruned on every admission, keeping the map bounded by the
/// number of callers active within one window.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    clients: Arc<Mutex<HashMap<String, ClientWindow>>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record one request for `key`, reporting whether it fits the
    /// window budget.
    async fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        clients.retain(|_, w| now.duration_since(w.started_at) < self.window);

        let entry = clients.entry(key.to_string()).or_insert(ClientWindow {
            started_at: now,
            count: 0,
        });
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[derive(Debug, Serialize)]
struct RejectBody {
    error: RejectError,
}

#[derive(Debug, Serialize)]
struct RejectError {
    code: &'static str,
    message: &'static str,
}

fn reject(status: StatusCode, code: &'static str, message: &'static str) -> Response {
    (
        status,
        Json(RejectBody {
            error: RejectError { code, message },
        }),
    )
        .into_response()
}

/// Attach a request ID: reuse the caller's `x-request-id` header when one
/// is present, otherwise mint a `UUIDv4`. The ID lands in request
/// extensions as [`RequestId`] and on the response header.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }
    res
}

/// Reject requests without a configured bearer token when auth is on.
pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if !auth.enabled {
        return next.run(req).await;
    }

    match bearer_token(&req) {
        Some(token) if auth.allows(token) => next.run(req).await,
        _ => reject(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid bearer token",
        ),
    }
}

/// Enforce the per-caller fixed-window budget.
pub async fn enforce_rate_limit(
    State(limiter): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let key = bearer_token(&req).unwrap_or("public").to_string();

    if limiter.admit(&key).await {
        next.run(req).await
    } else {
        reject(
            StatusCode::TOO_MANY_REQUESTS,
            "rate_limited",
            "rate limit exceeded",
        )
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
