//! Helper functions for middleware

use actix_web::dev::ServiceRequest;
use actix_web::http::header::HeaderMap;

/// Cookie carrying the access token for browser sessions
pub const SESSION_COOKIE: &str = "govpass_token";

/// Extract the access token from a request
///
/// Checks the `Authorization: Bearer` header first, then the session
/// cookie set at login.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(stripped) = auth_str.strip_prefix("Bearer ") {
                return Some(stripped.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get("cookie") {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(stripped) = cookie.strip_prefix("govpass_token=") {
                    if !stripped.is_empty() {
                        return Some(stripped.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Resolve the client IP used as the rate-limit key
///
/// Proxy headers win over the socket address: the first entry of
/// `X-Forwarded-For`, then `X-Real-IP`, then the peer address. Falls
/// back to `"unknown"` so header-less requests still share a bucket
/// instead of bypassing the limiter.
pub fn client_ip(req: &ServiceRequest) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    req.connection_info()
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
