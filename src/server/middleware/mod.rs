//! HTTP middleware

pub mod auth;
pub mod helpers;
pub mod rate_limit;

pub use auth::{current_account, AuthMiddleware};
pub use rate_limit::{RateLimitMiddleware, RateLimitStore};
