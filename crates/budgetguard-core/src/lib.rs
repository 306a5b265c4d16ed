//! budgetguard core: event decoding, threshold evaluation, access-policy
//! filtering, and the shared error surface.
//!
//! This crate carries no transport or runtime dependencies. Everything here is
//! pure data manipulation so it can be exercised without a remote API, an
//! HTTP server, or an async runtime.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed events must surface as `GuardError::MalformedPayload` instead of
//! crashing the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod alert;
pub mod error;
pub mod iam;
pub mod operation;
pub mod threshold;

/// Shared result type.
pub use error::{ErrorCode, GuardError, Result};
