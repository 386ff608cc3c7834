//! Authentication flows
//!
//! Ties together the password policy, the token service, the account
//! store and the email collaborator: registration, login with lockout
//! bookkeeping, token refresh with live-status re-checks, and the
//! password-reset and email-verification lifecycles.

pub mod password;
pub mod policy;
pub mod tokens;

pub use tokens::{Claims, TokenKind, TokenPair, TokenService};

use crate::config::AuthConfig;
use crate::core::models::{Account, AccountRole, AccountStatus};
use crate::services::email::{self, EmailNotifier};
use crate::storage::AccountStore;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// New-account registration data
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub identity_number: Option<String>,
    pub password: String,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    config: Arc<AuthConfig>,
    store: Arc<dyn AccountStore>,
    tokens: Arc<TokenService>,
    email: Arc<dyn EmailNotifier>,
}

impl AuthService {
    /// Create the service from validated configuration and collaborators
    pub fn new(
        config: &AuthConfig,
        store: Arc<dyn AccountStore>,
        email: Arc<dyn EmailNotifier>,
    ) -> Self {
        Self {
            config: Arc::new(config.clone()),
            tokens: Arc::new(TokenService::new(config)),
            store,
            email,
        }
    }

    /// Token service used for issuance and verification
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Register a new citizen account
    ///
    /// The account starts pending email verification; a verification
    /// link is dispatched fire-and-forget.
    pub async fn register(&self, registration: Registration) -> Result<Account> {
        let mut errors = Vec::new();
        if let Err(e) = validation::validate_full_name(&registration.full_name) {
            errors.push(e);
        }
        if let Err(e) = validation::validate_email(&registration.email) {
            errors.push(e);
        }
        if let Some(nic) = &registration.identity_number {
            if let Err(e) = validation::validate_nic(nic) {
                errors.push(e);
            }
        }
        if let Err(mut e) = password::validate_policy(&registration.password) {
            errors.append(&mut e);
        }
        if !errors.is_empty() {
            return Err(PortalError::validation(errors));
        }

        if self
            .store
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(PortalError::conflict("Email is already registered"));
        }

        let password_hash =
            password::hash_password(&registration.password, self.config.bcrypt_cost)?;

        let account = Account::new(
            registration.full_name,
            registration.email.to_lowercase(),
            registration.identity_number,
            password_hash,
            AccountRole::Citizen,
        );
        let account = self.store.create(&account).await?;

        let token = self.tokens.issue(TokenKind::EmailVerification, &account)?;
        email::dispatch_verification_email(self.email.clone(), account.email.clone(), token);

        info!("Registered account {} ({})", account.id, account.email);
        Ok(account)
    }

    /// Authenticate credentials and mint a token pair
    ///
    /// Failed attempts feed the per-account counter; once the role's
    /// threshold is crossed the account locks for its role's window and
    /// further attempts are rejected with the remaining minutes, correct
    /// password or not.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Account, TokenPair)> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| PortalError::auth("Invalid email or password"))?;

        let now = Utc::now();
        if account.is_locked(now) {
            warn!("Login attempt for locked account {}", account.id);
            return Err(PortalError::AccountLocked {
                retry_minutes: account.lockout_minutes_remaining(now),
            });
        }

        match account.status {
            AccountStatus::Suspended => {
                return Err(PortalError::forbidden("Your account has been suspended"));
            }
            AccountStatus::Deactivated => {
                return Err(PortalError::forbidden("Your account has been deactivated"));
            }
            AccountStatus::Active | AccountStatus::PendingVerification => {}
        }

        if !password::verify_password(password, &account.password_hash)? {
            let updated = self.store.record_login_failure(account.id).await?;
            warn!(
                "Failed login for account {} (attempt {})",
                account.id, updated.login_attempts
            );
            if updated.is_locked(now) {
                return Err(PortalError::AccountLocked {
                    retry_minutes: updated.lockout_minutes_remaining(now),
                });
            }
            return Err(PortalError::auth("Invalid email or password"));
        }

        let account = self.store.record_login_success(account.id).await?;
        let pair = self.tokens.issue_pair(&account)?;

        info!("Account {} logged in", account.id);
        Ok((account, pair))
    }

    /// Mint a new token pair from a refresh token
    ///
    /// The account's live status is re-checked: a refresh token that has
    /// outlived its account's standing is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        let account = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| PortalError::auth("Account no longer exists"))?;

        if matches!(
            account.status,
            AccountStatus::Suspended | AccountStatus::Deactivated
        ) {
            return Err(PortalError::forbidden("Account is not active"));
        }

        self.tokens.issue_pair(&account).map_err(Into::into)
    }

    /// Authenticate an access token for a request
    ///
    /// Verifies the token and re-fetches the account so a suspension or
    /// deactivation takes effect immediately, not at token expiry.
    pub async fn authenticate_access(&self, token: &str) -> Result<Account> {
        let claims = self.tokens.verify(token, TokenKind::Access)?;

        let account = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| PortalError::auth("Account no longer exists"))?;

        match account.status {
            AccountStatus::Suspended => {
                Err(PortalError::forbidden("Your account has been suspended"))
            }
            AccountStatus::Deactivated => {
                Err(PortalError::forbidden("Your account has been deactivated"))
            }
            AccountStatus::Active | AccountStatus::PendingVerification => Ok(account),
        }
    }

    /// Begin a password reset for an email address
    ///
    /// Returns `None` for unknown emails so callers can answer with the
    /// same success shape either way and avoid account enumeration. The
    /// token value is persisted on the account for single-use redemption.
    pub async fn request_password_reset(&self, email_address: &str) -> Result<Option<String>> {
        let account = match self.store.find_by_email(email_address).await? {
            Some(account) => account,
            None => {
                info!("Password reset requested for unknown email");
                return Ok(None);
            }
        };

        let token = self.tokens.issue(TokenKind::PasswordReset, &account)?;
        let expires = Utc::now() + Duration::minutes(self.config.reset_token_ttl_minutes as i64);
        self.store
            .set_reset_token(account.id, &token, expires)
            .await?;

        email::dispatch_reset_email(self.email.clone(), account.email.clone(), token.clone());

        info!("Password reset token issued for account {}", account.id);
        Ok(Some(token))
    }

    /// Redeem a password-reset token
    ///
    /// The presented token must match the one stored on the account and
    /// still be inside its window; redemption clears the stored value so
    /// the link is single-use.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        let claims = self.tokens.verify(token, TokenKind::PasswordReset)?;

        let account = self
            .store
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| PortalError::auth("Invalid or expired reset link"))?;

        let stored = account
            .reset_token
            .as_deref()
            .ok_or_else(|| PortalError::auth("Invalid or expired reset link"))?;
        if stored != token {
            return Err(PortalError::auth("Invalid or expired reset link"));
        }
        if account
            .reset_token_expires
            .map_or(true, |expires| expires <= Utc::now())
        {
            return Err(PortalError::auth("Invalid or expired reset link"));
        }

        password::validate_policy(new_password).map_err(PortalError::validation)?;
        let password_hash = password::hash_password(new_password, self.config.bcrypt_cost)?;

        self.store
            .update_password(account.id, &password_hash)
            .await?;
        self.store.clear_reset_token(account.id).await?;
        // A successful reset also ends any lockout
        self.store.reset_login_attempts(account.id).await?;

        info!("Password reset completed for account {}", account.id);
        Ok(())
    }

    /// Change the password of an authenticated account
    pub async fn change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let account = self
            .store
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| PortalError::not_found("Account not found"))?;

        if !password::verify_password(current_password, &account.password_hash)? {
            return Err(PortalError::auth("Current password is incorrect"));
        }

        password::validate_policy(new_password).map_err(PortalError::validation)?;
        let password_hash = password::hash_password(new_password, self.config.bcrypt_cost)?;
        self.store
            .update_password(account_id, &password_hash)
            .await?;

        info!("Password changed for account {}", account_id);
        Ok(())
    }

    /// Redeem an email-verification token
    pub async fn verify_email(&self, token: &str) -> Result<Account> {
        let claims = self.tokens.verify(token, TokenKind::EmailVerification)?;
        let account = self.store.mark_email_verified(claims.sub).await?;

        info!("Email verified for account {}", account.id);
        Ok(account)
    }
}
