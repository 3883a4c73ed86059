//! Static identifier -> label mapping (e.g. sensor name -> room).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{HomepromError, Result};

/// Label used for identifiers the mapping does not know.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Loaded once at startup, read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping {
    entries: BTreeMap<String, String>,
}

impl LabelMapping {
    /// Parse a JSON object of string values, e.g. `{"Kitchen":"Living Room"}`.
    /// An empty or whitespace-only input yields an empty mapping.
    pub fn from_json(s: &str) -> Result<Self> {
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries: BTreeMap<String, String> = serde_json::from_str(s)
            .map_err(|e| HomepromError::Config(format!("label mapping must be a JSON object of strings: {e}")))?;
        Ok(Self { entries })
    }

    /// Resolve an identifier, falling back to [`UNKNOWN_LABEL`].
    pub fn resolve(&self, id: &str) -> &str {
        match self.entries.get(id) {
            Some(label) => label.as_str(),
            None => {
                tracing::debug!(id = %id, "no label mapping entry, using fallback");
                UNKNOWN_LABEL
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
