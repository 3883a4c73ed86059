//! Normalized readings produced by upstream clients.

/// Scale of a raw reading as delivered by its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Already in the exported unit.
    Native,
    /// Hundredths of the exported unit (e.g. Hue reports 2150 for 21.50 °C).
    Centi,
}

impl Unit {
    pub fn normalize(self, raw: f64) -> f64 {
        match self {
            Unit::Native => raw,
            Unit::Centi => raw / 100.0,
        }
    }
}

/// A single named measurement. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Source-side identifier (bridge sensor id, coordinates, page url).
    pub id: String,
    /// Human name as reported by the source.
    pub name: String,
    pub raw: f64,
    pub unit: Unit,
    /// Source type tag, when the source has one (`ZLLTemperature`).
    pub kind: Option<String>,
    /// Source timestamp, passed through verbatim.
    pub observed_at: Option<String>,
}

impl Reading {
    pub fn new(id: impl Into<String>, name: impl Into<String>, raw: f64, unit: Unit) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            raw,
            unit,
            kind: None,
            observed_at: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_observed_at(mut self, ts: Option<String>) -> Self {
        self.observed_at = ts;
        self
    }

    /// Value in the exported unit.
    pub fn value(&self) -> f64 {
        self.unit.normalize(self.raw)
    }
}
