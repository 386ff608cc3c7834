//! # GovPass
//!
//! Authentication and session service for a citizen-facing government
//! services portal. Citizens, agents, department officers and
//! administrators share one account system; this crate provides the
//! flows around it:
//!
//! - password hashing and a strength policy with a blacklist
//! - a four-kind JWT scheme (access, refresh, email verification,
//!   password reset) signed with two separate secrets
//! - per-account login lockout with role-scoped thresholds
//! - request authentication middleware that re-checks live account
//!   status and applies a declarative route policy table
//! - fixed-window IP rate limiting with three named limiters
//!
//! The HTTP surface lives under `/api/auth` and answers with a uniform
//! `{success, message, data?, errors?}` envelope.

pub mod auth;
pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

pub use auth::{AuthService, TokenKind, TokenService};
pub use config::Config;
pub use server::{run_server, AppState};
pub use utils::error::{PortalError, Result};
