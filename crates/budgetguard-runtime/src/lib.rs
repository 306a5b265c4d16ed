//! budgetguard runtime library entry.
//!
//! This crate wires configuration, credentials, the Admin API client, and the
//! remediation engine behind an HTTP intake endpoint. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod app_state;
pub mod auth;
pub mod clock;
pub mod config;
pub mod guard;
pub mod intake;
pub mod ops;
pub mod router;
