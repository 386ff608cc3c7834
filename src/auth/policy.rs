//! Declarative route authorization policy
//!
//! One table maps route prefixes to the role set and stacked checks they
//! require; the middleware evaluates it through a single function instead
//! of per-route wrappers.

use crate::core::models::{Account, AccountRole};
use crate::utils::error::{PortalError, Result};

/// Authorization requirements for a group of routes
#[derive(Debug, Clone, Copy)]
pub struct RoutePolicy {
    /// Path prefix this policy governs
    pub prefix: &'static str,
    /// Roles allowed through; empty means any authenticated account
    pub roles: &'static [AccountRole],
    /// Require a verified email address
    pub require_verified_email: bool,
    /// Require a completed profile
    pub require_complete_profile: bool,
}

/// Routes reachable without authentication
const PUBLIC_ROUTES: &[&str] = &[
    "/health",
    "/api/auth/register",
    "/api/auth/login",
    "/api/auth/refresh",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
    "/api/auth/verify-email",
];

/// Policy table, first matching prefix wins
const PROTECTED_ROUTES: &[RoutePolicy] = &[
    RoutePolicy {
        prefix: "/api/admin",
        roles: &[AccountRole::Admin],
        require_verified_email: false,
        require_complete_profile: false,
    },
    RoutePolicy {
        prefix: "/api/departments",
        roles: &[AccountRole::Department, AccountRole::Admin],
        require_verified_email: false,
        require_complete_profile: false,
    },
    RoutePolicy {
        prefix: "/api/agents",
        roles: &[AccountRole::Agent, AccountRole::Department, AccountRole::Admin],
        require_verified_email: false,
        require_complete_profile: false,
    },
    RoutePolicy {
        prefix: "/api/bookings",
        roles: &[AccountRole::Citizen, AccountRole::Agent, AccountRole::Admin],
        require_verified_email: true,
        require_complete_profile: true,
    },
    RoutePolicy {
        prefix: "/api/chat",
        roles: &[AccountRole::Citizen, AccountRole::Agent],
        require_verified_email: true,
        require_complete_profile: false,
    },
    // Any authenticated account
    RoutePolicy {
        prefix: "/api",
        roles: &[],
        require_verified_email: false,
        require_complete_profile: false,
    },
];

/// Check whether a path requires no authentication
pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|&route| path.starts_with(route))
}

/// Find the policy governing a path
pub fn policy_for(path: &str) -> Option<&'static RoutePolicy> {
    PROTECTED_ROUTES
        .iter()
        .find(|policy| path.starts_with(policy.prefix))
}

/// Evaluate a policy against an authenticated account
pub fn authorize(policy: &RoutePolicy, account: &Account) -> Result<()> {
    if !policy.roles.is_empty() && !policy.roles.contains(&account.role) {
        return Err(PortalError::forbidden(
            "You do not have permission to access this resource",
        ));
    }

    if policy.require_verified_email && !account.email_verified {
        return Err(PortalError::forbidden(
            "Please verify your email address to access this resource",
        ));
    }

    if policy.require_complete_profile && !account.profile_complete {
        return Err(PortalError::forbidden(
            "Please complete your profile to access this resource",
        ));
    }

    Ok(())
}
