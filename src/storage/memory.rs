//! In-memory account store
//!
//! Backs tests and single-node deployments. Each mutation holds the
//! document's map entry for its duration, which gives the same
//! per-document atomicity the real document store provides.

use super::AccountStore;
use crate::core::models::{Account, AccountStatus};
use crate::utils::error::{PortalError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

/// DashMap-backed account store
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: DashMap<Uuid, Account>,
    email_index: DashMap<String, Uuid>,
}

impl MemoryAccountStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn with_account<F>(&self, id: Uuid, mutate: F) -> Result<Account>
    where
        F: FnOnce(&mut Account),
    {
        let mut entry = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| PortalError::not_found("Account not found"))?;
        mutate(entry.value_mut());
        entry.value_mut().touch();
        Ok(entry.value().clone())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: &Account) -> Result<Account> {
        // The vacant entry is held across both inserts, so two racing
        // registrations for one email cannot both pass the check.
        match self.email_index.entry(account.email.to_lowercase()) {
            Entry::Occupied(_) => Err(PortalError::conflict("Email is already registered")),
            Entry::Vacant(slot) => {
                self.accounts.insert(account.id, account.clone());
                slot.insert(account.id);
                Ok(account.clone())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        Ok(self.accounts.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let id = match self.email_index.get(&email.to_lowercase()) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        self.find_by_id(id).await
    }

    async fn record_login_failure(&self, id: Uuid) -> Result<Account> {
        self.with_account(id, |account| {
            account.login_attempts += 1;
            if account.login_attempts >= account.role.lockout_threshold() {
                account.lock_until = Some(Utc::now() + account.role.lockout_duration());
            }
        })
    }

    async fn record_login_success(&self, id: Uuid) -> Result<Account> {
        self.with_account(id, |account| {
            account.login_attempts = 0;
            account.lock_until = None;
            account.last_login_at = Some(Utc::now());
        })
    }

    async fn reset_login_attempts(&self, id: Uuid) -> Result<Account> {
        self.with_account(id, |account| {
            account.login_attempts = 0;
            account.lock_until = None;
        })
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<Account> {
        self.with_account(id, |account| {
            account.status = status;
        })
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<Account> {
        let hash = password_hash.to_string();
        self.with_account(id, move |account| {
            account.password_hash = hash;
        })
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires: DateTime<Utc>,
    ) -> Result<Account> {
        let token = token.to_string();
        self.with_account(id, move |account| {
            account.reset_token = Some(token);
            account.reset_token_expires = Some(expires);
        })
    }

    async fn clear_reset_token(&self, id: Uuid) -> Result<Account> {
        self.with_account(id, |account| {
            account.reset_token = None;
            account.reset_token_expires = None;
        })
    }

    async fn mark_email_verified(&self, id: Uuid) -> Result<Account> {
        self.with_account(id, |account| {
            account.verify_email();
        })
    }

    async fn set_profile_complete(&self, id: Uuid, complete: bool) -> Result<Account> {
        self.with_account(id, |account| {
            account.profile_complete = complete;
        })
    }
}
