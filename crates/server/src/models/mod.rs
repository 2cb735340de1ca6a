//! Domain models for accounts.
//!
//! These types are what the service layer and the API hand around. They never
//! carry a password hash; stores return the hash alongside the account only
//! on the login lookup path.

pub mod admin;
pub mod user;

pub use admin::{Admin, NewAdmin};
pub use user::{NewUser, User};
