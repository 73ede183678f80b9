//! AWS-oriented adapters and handlers for the database bootstrap functions.
//!
//! This crate owns runtime integration details (Lambda handlers, Secrets
//! Manager, RDS Data API, and the direct MySQL connection). Shared types live
//! in `db_bootstrap_core`.

pub mod adapters;
pub mod handlers;
pub mod telemetry;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
