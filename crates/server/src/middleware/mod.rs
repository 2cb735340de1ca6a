//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (record in span and Sentry scope, echo `x-request-id`)
//! 4. Error detail (development-only internal error text)

pub mod error_detail;
pub mod request_id;

pub use error_detail::expose_error_detail;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
