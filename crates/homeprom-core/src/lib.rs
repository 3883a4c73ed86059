//! homeprom core: source-agnostic readings, label mapping, error types, and
//! the Prometheus text exposition model.
//!
//! This crate defines the contracts shared by the exporter's upstream clients,
//! collectors, and HTTP layer. It carries no runtime or transport dependencies
//! so collectors can be unit tested without a network.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `HomepromError`/`Result` so a bad upstream
//! payload can never take the exporter down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod labels;
pub mod reading;

/// Error surface and domain types used throughout the exporter.
pub use error::{ErrorKind, HomepromError, Result};
pub use labels::{LabelMapping, UNKNOWN_LABEL};
pub use reading::{Reading, Unit};
