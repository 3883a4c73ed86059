//! homeprom exporter library entry.
//!
//! This crate wires upstream clients, refresh loops, caches, and collectors
//! into an axum `/metrics` endpoint. It is consumed by the binary (`main.rs`)
//! and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod collect;
pub mod config;
pub mod obs;
pub mod ops;
pub mod refresh;
pub mod router;
pub mod upstream;
