//! Shared primitives for the database bootstrap functions.
//!
//! This crate owns the credential bundle, the fixed statements, environment
//! configuration, and the proxy response contract. It intentionally excludes
//! AWS SDK, Lambda runtime, and database driver concerns.

pub mod config;
pub mod contract;
pub mod credentials;
pub mod error;
pub mod statements;
