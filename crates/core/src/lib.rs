//! user-apis core - Shared account types.
//!
//! This crate provides the types shared by every user-apis component:
//! - `server` - The registration/authentication HTTP API
//! - `cli` - Migrations, admin seeding and API smoke checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Parsing into these types is where input normalization
//! happens, so anything holding an [`Email`] or [`Username`] is already
//! in canonical form.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
