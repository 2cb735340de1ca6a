//! User APIs server library.
//!
//! User and admin registration and login over a JSON HTTP API, backed by
//! an [`db::AccountStore`]. Exposed as a library so the CLI can seed admins
//! through the same service and integration tests can run the router
//! in-process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
