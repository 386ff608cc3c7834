//! Domain model types

pub mod account;

pub use account::{Account, AccountRole, AccountStatus};
