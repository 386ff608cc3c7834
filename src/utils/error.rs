//! Error handling for the portal authentication service
//!
//! This module defines all error types used throughout the service.

use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Result type alias for the service
pub type Result<T> = std::result::Result<T, PortalError>;

/// Token verification failure reasons
///
/// Kept as distinct variants so callers can give precise feedback
/// ("session expired" vs. "invalid link") instead of one generic
/// rejection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token's expiry window has elapsed
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer, audience or structure is invalid
    #[error("Token is invalid")]
    Invalid,

    /// A structurally valid token of a different kind was presented
    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongKind {
        /// Kind the verifier was expecting
        expected: &'static str,
        /// Kind carried by the presented token
        actual: &'static str,
    },
}

/// Main error type for the service
#[derive(Error, Debug)]
pub enum PortalError {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input validation errors with field-level messages
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Authentication errors (bad credentials, unknown account)
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Account is temporarily locked after repeated failures
    #[error("Account locked. Try again in {retry_minutes} minutes")]
    AccountLocked {
        /// Approximate minutes until the lockout expires
        retry_minutes: i64,
    },

    /// Account status forbids the operation (suspended/deactivated)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Token verification errors
    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    /// Rate limiting errors
    #[error("Rate limit exceeded. Try again in {retry_seconds} seconds")]
    RateLimit {
        /// Seconds until the current window resets
        retry_seconds: u64,
    },

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (duplicate email on registration)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Account store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Password hashing errors
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Email dispatch errors (logged, never fatal to a flow)
    #[error("Email error: {0}")]
    Email(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ResponseError for PortalError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, message, errors) = match self {
            PortalError::Validation(errors) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors.clone()),
            ),
            PortalError::Auth(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                self.to_string(),
                None,
            ),
            PortalError::AccountLocked { .. } => (
                actix_web::http::StatusCode::FORBIDDEN,
                self.to_string(),
                None,
            ),
            PortalError::Forbidden(_) => (
                actix_web::http::StatusCode::FORBIDDEN,
                self.to_string(),
                None,
            ),
            PortalError::Token(TokenError::Expired) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "Session expired".to_string(),
                None,
            ),
            PortalError::Token(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "Invalid token".to_string(),
                None,
            ),
            PortalError::RateLimit { .. } => (
                actix_web::http::StatusCode::TOO_MANY_REQUESTS,
                self.to_string(),
                None,
            ),
            PortalError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                self.to_string(),
                None,
            ),
            PortalError::Conflict(_) => (
                actix_web::http::StatusCode::CONFLICT,
                self.to_string(),
                None,
            ),
            // Infrastructure failures never leak internals to the caller
            PortalError::Config(_)
            | PortalError::Store(_)
            | PortalError::Crypto(_)
            | PortalError::Email(_)
            | PortalError::Internal(_) => (
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            message,
            errors,
        };

        HttpResponse::build(status_code).json(body)
    }
}

/// JSON body emitted for error responses
#[derive(serde::Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

/// Helper constructors for common errors
impl PortalError {
    pub fn auth<S: Into<String>>(message: S) -> Self {
        Self::Auth(message.into())
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self::Validation(errors)
    }
}
