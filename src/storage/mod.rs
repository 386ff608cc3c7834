//! Account persistence seam
//!
//! The portal's account documents live in an external document store;
//! this trait models the lookups and per-document atomic updates the
//! authentication flows rely on. Failed lookups propagate as errors and
//! are never retried here.

pub mod memory;

pub use memory::MemoryAccountStore;

use crate::core::models::{Account, AccountStatus};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Account lookup and update operations
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Persist a new account; fails on duplicate email
    async fn create(&self, account: &Account) -> Result<Account>;

    /// Find an account by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Find an account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Record a failed login attempt as one atomic document update
    ///
    /// Increments the counter and, once the role's threshold is crossed,
    /// sets the lockout expiry. Returns the updated account.
    async fn record_login_failure(&self, id: Uuid) -> Result<Account>;

    /// Record a successful login: reset the counter, clear any lockout,
    /// stamp `last_login_at`
    async fn record_login_success(&self, id: Uuid) -> Result<Account>;

    /// Reset the counter and clear any lockout without recording a login
    /// (applied when a password reset ends a lockout)
    async fn reset_login_attempts(&self, id: Uuid) -> Result<Account>;

    /// Update account status (applied by external admin actions)
    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<Account>;

    /// Replace the stored password hash
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Account>;

    /// Persist an outstanding password-reset token with its expiry
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<Account>;

    /// Clear the stored reset token, making it single-use
    async fn clear_reset_token(&self, id: Uuid) -> Result<Account>;

    /// Mark the email verified, activating a pending account
    async fn mark_email_verified(&self, id: Uuid) -> Result<Account>;

    /// Set the profile-complete flag
    async fn set_profile_complete(&self, id: Uuid, complete: bool) -> Result<Account>;
}
