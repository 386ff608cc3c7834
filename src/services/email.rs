//! Email dispatch collaborator
//!
//! The real relay is an external service. Sends are fire-and-forget from
//! the auth flows: failures are logged, never fatal to the surrounding
//! request.

use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// Outbound mail operations the auth flows need
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Send an email-verification link
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<()>;

    /// Send a password-reset link
    async fn send_reset_email(&self, to: &str, token: &str) -> Result<()>;
}

/// Notifier that logs outbound mail instead of delivering it
///
/// Stands in for the relay in development and tests.
#[derive(Debug, Default)]
pub struct LogEmailNotifier;

#[async_trait]
impl EmailNotifier for LogEmailNotifier {
    async fn send_verification_email(&self, to: &str, token: &str) -> Result<()> {
        info!(
            "Verification email for {}: /verify-email?token={}",
            to, token
        );
        Ok(())
    }

    async fn send_reset_email(&self, to: &str, token: &str) -> Result<()> {
        info!("Reset email for {}: /reset-password?token={}", to, token);
        Ok(())
    }
}

/// Spawn a verification-email send without blocking the request
pub fn dispatch_verification_email(notifier: Arc<dyn EmailNotifier>, to: String, token: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_verification_email(&to, &token).await {
            error!("Failed to send verification email to {}: {}", to, e);
        }
    });
}

/// Spawn a reset-email send without blocking the request
pub fn dispatch_reset_email(notifier: Arc<dyn EmailNotifier>, to: String, token: String) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send_reset_email(&to, &token).await {
            error!("Failed to send reset email to {}: {}", to, e);
        }
    });
}
