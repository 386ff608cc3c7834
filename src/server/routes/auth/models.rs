//! Request and response models for authentication endpoints

use crate::auth::TokenPair;
use crate::core::models::{Account, AccountRole, AccountStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub identity_number: Option<String>,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Forgot-password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset-password request
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Change-password request (authenticated)
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Email-verification request
#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Public view of an account
///
/// Never carries the password hash or reset token.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: AccountRole,
    pub status: AccountStatus,
    pub email_verified: bool,
    pub profile_complete: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&Account> for AccountInfo {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            role: account.role,
            status: account.status,
            email_verified: account.email_verified,
            profile_complete: account.profile_complete,
            created_at: account.created_at,
            last_login_at: account.last_login_at,
        }
    }
}

/// Login response payload
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account: AccountInfo,
    pub tokens: TokenPair,
}
