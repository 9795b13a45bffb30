//! In-process rate limiting for mutating editable-content calls.
//!
//! Fixed window per identity: the first call after a window has elapsed
//! starts a new window with a fresh counter. State lives in a [`DashMap`]
//! owned by the application state; [`RateLimiter::sweep`] drops windows
//! that have expired so idle identities do not accumulate.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::debug;

use super::bearer_auth::BearerAuth;

/// Identity used when nothing better is known about the caller.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Rate limit configuration.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Calls allowed per identity per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

/// Per-identity window counter.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a new rate limiter.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    /// Check and count a call from `identity`.
    ///
    /// Returns Ok(()) if allowed, Err with retry-after seconds if limited.
    /// Rejected calls are not counted.
    pub fn check(&self, identity: &str) -> Result<(), u64> {
        self.check_at(identity, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading.
    pub fn check_at(&self, identity: &str, now: Instant) -> Result<(), u64> {
        // The entry guard holds the shard lock, so read-modify-write is atomic per identity.
        let mut window = self
            .windows
            .entry(identity.to_string())
            .or_insert(Window {
                count: 0,
                started: now,
            });

        if now.saturating_duration_since(window.started) >= self.config.window {
            window.count = 0;
            window.started = now;
        }

        if window.count >= self.config.max_requests {
            let elapsed = now.saturating_duration_since(window.started);
            let retry_after = ceil_secs(self.config.window.saturating_sub(elapsed)).max(1);
            debug!(
                identity = identity,
                count = window.count,
                limit = self.config.max_requests,
                "rate limit exceeded"
            );
            return Err(retry_after);
        }

        window.count += 1;
        Ok(())
    }

    /// Drop every window that has elapsed. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// [`sweep`](Self::sweep) against an explicit clock reading.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.config.window);
        before.saturating_sub(self.windows.len())
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    /// Run [`sweep`](Self::sweep) every `every` on the current Tokio runtime.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = self.sweep();
                if removed > 0 {
                    debug!(removed, remaining = self.tracked(), "swept expired rate-limit windows");
                }
            }
        })
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("tracked", &self.windows.len())
            .finish()
    }
}

/// Derive the rate-limit identity of a caller.
///
/// Authenticated callers are keyed by user id. Otherwise the first
/// `X-Forwarded-For` hop, then `X-Real-IP`, then the connection address.
pub fn client_identity(
    bearer: Option<&BearerAuth>,
    addr: Option<SocketAddr>,
    headers: &HeaderMap,
) -> String {
    if let Some(auth) = bearer {
        return format!("user:{}", auth.user_id);
    }

    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(ip) = value.split(',').next().map(str::trim)
        && !ip.is_empty()
    {
        return ip.to_string();
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return value.trim().to_string();
    }

    addr.map(|a| a.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_IDENTITY.to_string())
}

/// Rate-limit identity of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let bearer = parts.extensions.get::<BearerAuth>();
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(ClientId(client_identity(bearer, addr, &parts.headers)))
    }
}
