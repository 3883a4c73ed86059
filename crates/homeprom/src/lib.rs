//! Top-level facade crate for homeprom.
//!
//! Re-exports core types and the exporter library so users can depend on a single crate.

pub mod core {
    pub use homeprom_core::*;
}

pub mod exporter {
    pub use homeprom_exporter::*;
}
