//! Request rate limiting middleware
//!
//! Fixed-window counters keyed by client IP, bucketed into three named
//! limiters: general traffic, authentication endpoints, and sensitive
//! operations such as password-reset requests. The counter store is
//! owned by [`AppState`](crate::server::state::AppState) rather than a
//! global, so every server (and test) gets its own windows.

use crate::config::{LimiterSettings, RateLimitConfig};
use crate::server::middleware::helpers::client_ip;
use crate::server::state::AppState;
use crate::utils::error::PortalError;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web;
use dashmap::DashMap;
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// Checks between opportunistic purges of stale windows
const PURGE_EVERY: u64 = 1024;

/// One client's counter within the current window
struct Window {
    count: u32,
    window_start: Instant,
    window_secs: u64,
}

/// Fixed-window request counters
///
/// Keys combine the limiter name and the client IP so the three
/// limiters never share a window. Client IPs come from forwarded
/// headers, so the key space is unbounded; stale entries are purged
/// opportunistically to keep the map from growing with every value an
/// attacker rotates through.
#[derive(Default)]
pub struct RateLimitStore {
    windows: DashMap<String, Window>,
    checks: AtomicU64,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request against a key
    ///
    /// Returns `Err(retry_seconds)` when the window's cap is exceeded.
    /// A window that has fully elapsed is reset before counting, so a
    /// burst in one window never bleeds into the next.
    pub fn check(&self, key: &str, settings: &LimiterSettings) -> Result<(), u64> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PURGE_EVERY == PURGE_EVERY - 1 {
            self.purge_expired();
        }

        let now = Instant::now();
        let window_duration = Duration::from_secs(settings.window_secs);

        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window {
                count: 0,
                window_start: now,
                window_secs: settings.window_secs,
            });
        let window = entry.value_mut();

        if now.duration_since(window.window_start) >= window_duration {
            window.count = 0;
            window.window_start = now;
            window.window_secs = settings.window_secs;
        }

        window.count += 1;
        if window.count > settings.max_requests {
            let elapsed = now.duration_since(window.window_start);
            let remaining = window_duration.saturating_sub(elapsed).as_secs().max(1);
            return Err(remaining);
        }
        Ok(())
    }

    /// Drop entries whose window has long elapsed
    ///
    /// An entry a full window past its reset point carries no state a
    /// fresh insert would not recreate, so removing it is observably
    /// equivalent to keeping it.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows.retain(|_, window| {
            now.duration_since(window.window_start) < Duration::from_secs(window.window_secs * 2)
        });
    }
}

/// Pick the limiter bucket for a request path
fn limiter_for<'a>(path: &str, config: &'a RateLimitConfig) -> (&'static str, &'a LimiterSettings) {
    const SENSITIVE_PATHS: &[&str] = &[
        "/api/auth/forgot-password",
        "/api/auth/reset-password",
    ];

    if SENSITIVE_PATHS.iter().any(|p| path.starts_with(p)) {
        ("sensitive", &config.sensitive)
    } else if path.starts_with("/api/auth") {
        ("auth", &config.auth)
    } else {
        ("general", &config.general)
    }
}

/// Rate limit middleware for Actix-web
pub struct RateLimitMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService { service }))
    }
}

/// Service implementation for rate limit middleware
pub struct RateLimitMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(state) = req.app_data::<web::Data<AppState>>() {
            let (name, settings) = limiter_for(req.path(), &state.config.rate_limit);
            let ip = client_ip(&req);
            let key = format!("{}:{}", name, ip);

            if let Err(retry_seconds) = state.rate_limits.check(&key, settings) {
                warn!(
                    "Rate limit '{}' exceeded by {} on {}",
                    name,
                    ip,
                    req.path()
                );
                return Box::pin(async move {
                    Err(PortalError::RateLimit { retry_seconds }.into())
                });
            }
        }

        Box::pin(self.service.call(req))
    }
}
