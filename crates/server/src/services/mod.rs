//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account registration and login (password hashing, token issuance)

pub mod auth;
