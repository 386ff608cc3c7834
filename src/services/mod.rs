//! External collaborator services

pub mod email;
