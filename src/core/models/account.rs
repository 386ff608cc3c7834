//! Portal account types and status transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Portal account
///
/// One record per identity, whatever the role. Accounts are never
/// hard-deleted; deactivation is a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: Uuid,
    /// Full name
    pub full_name: String,
    /// Email address (unique)
    pub email: String,
    /// Role-specific identity number (NIC for citizens, officer ID for agents)
    pub identity_number: Option<String>,
    /// Password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: AccountRole,
    /// Account status
    pub status: AccountStatus,
    /// Email verification status
    pub email_verified: bool,
    /// Whether the citizen/agent profile has been completed
    pub profile_complete: bool,
    /// Consecutive failed login attempts
    pub login_attempts: u32,
    /// Lockout expiry, set once the failure threshold is crossed
    pub lock_until: Option<DateTime<Utc>>,
    /// Outstanding password-reset token, cleared on redemption
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    /// Expiry of the outstanding reset token
    pub reset_token_expires: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Citizen using public services
    Citizen,
    /// Service agent handling bookings and chat
    Agent,
    /// Department console operator
    Department,
    /// Back-office administrator
    Admin,
}

impl AccountRole {
    /// Failed-login threshold before lockout
    pub fn lockout_threshold(self) -> u32 {
        match self {
            AccountRole::Admin => 3,
            _ => 5,
        }
    }

    /// Lockout duration once the threshold is crossed
    pub fn lockout_duration(self) -> chrono::Duration {
        match self {
            AccountRole::Admin => chrono::Duration::minutes(60),
            _ => chrono::Duration::minutes(30),
        }
    }
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountRole::Citizen => write!(f, "citizen"),
            AccountRole::Agent => write!(f, "agent"),
            AccountRole::Department => write!(f, "department"),
            AccountRole::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(AccountRole::Citizen),
            "agent" => Ok(AccountRole::Agent),
            "department" => Ok(AccountRole::Department),
            "admin" => Ok(AccountRole::Admin),
            _ => Err(format!("Invalid account role: {}", s)),
        }
    }
}

/// Account status
///
/// Transitions: `PendingVerification → Active ⇄ Suspended` and
/// `Active → Deactivated` (terminal). Suspension and deactivation are
/// applied by admin actions outside this service; here the current
/// value is only read and enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Awaiting email verification
    PendingVerification,
    /// Active account
    Active,
    /// Suspended by an administrator
    Suspended,
    /// Deactivated (terminal, soft delete)
    Deactivated,
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountStatus::PendingVerification => write!(f, "pending_verification"),
            AccountStatus::Active => write!(f, "active"),
            AccountStatus::Suspended => write!(f, "suspended"),
            AccountStatus::Deactivated => write!(f, "deactivated"),
        }
    }
}

impl Account {
    /// Create a new account awaiting email verification
    pub fn new(
        full_name: String,
        email: String,
        identity_number: Option<String>,
        password_hash: String,
        role: AccountRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            identity_number,
            password_hash,
            role,
            status: AccountStatus::PendingVerification,
            email_verified: false,
            profile_complete: false,
            login_attempts: 0,
            lock_until: None,
            reset_token: None,
            reset_token_expires: None,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Check if the account may authenticate and act
    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active)
    }

    /// Check if a lockout is currently in force
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| until > now)
    }

    /// Approximate minutes until the lockout expires, rounded up
    pub fn lockout_minutes_remaining(&self, now: DateTime<Utc>) -> i64 {
        self.lock_until
            .map(|until| {
                let secs = (until - now).num_seconds().max(0);
                (secs + 59) / 60
            })
            .unwrap_or(0)
    }

    /// Mark the email verified, activating a pending account
    pub fn verify_email(&mut self) {
        self.email_verified = true;
        if matches!(self.status, AccountStatus::PendingVerification) {
            self.status = AccountStatus::Active;
        }
        self.touch();
    }

    /// Update the last-modified timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
