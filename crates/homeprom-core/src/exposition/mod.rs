//! Prometheus exposition model.
//!
//! Collectors describe their metric families up front with [`Desc`] and, on
//! each scrape, return [`MetricFamily`] values carrying the current samples.
//! [`text`] turns families into the plain-text exposition format.

pub mod text;

use crate::error::{HomepromError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
        }
    }
}

/// Metric descriptor: name, help text, type, and label names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Desc {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    pub label_names: Vec<&'static str>,
}

impl Desc {
    pub fn gauge(name: impl Into<String>, help: impl Into<String>, label_names: &[&'static str]) -> Result<Self> {
        let name = name.into();
        if !is_valid_metric_name(&name) {
            return Err(HomepromError::Config(format!("invalid metric name: {name:?}")));
        }
        for l in label_names {
            if !is_valid_label_name(l) {
                return Err(HomepromError::Config(format!("invalid label name {l:?} on {name}")));
            }
        }
        Ok(Self {
            name,
            help: help.into(),
            metric_type: MetricType::Gauge,
            label_names: label_names.to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Label pairs in descriptor order.
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

/// One descriptor plus the samples observed for it during a single collect.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub desc: Desc,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    pub fn new(desc: Desc) -> Self {
        Self {
            desc,
            samples: Vec::new(),
        }
    }

    /// Append a sample. `label_values` must line up with the descriptor's label names.
    pub fn push(&mut self, label_values: &[&str], value: f64) -> Result<()> {
        if label_values.len() != self.desc.label_names.len() {
            return Err(HomepromError::Internal(format!(
                "{} expects {} label values, got {}",
                self.desc.name,
                self.desc.label_names.len(),
                label_values.len()
            )));
        }
        let labels = self
            .desc
            .label_names
            .iter()
            .zip(label_values)
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        self.samples.push(Sample { labels, value });
        Ok(())
    }

    /// Convenience for label-less families.
    pub fn single(desc: Desc, value: f64) -> Result<Self> {
        let mut fam = Self::new(desc);
        fam.push(&[], value)?;
        Ok(fam)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, with the `__` prefix reserved.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn metric_names() {
        assert!(is_valid_metric_name("hue_temperature"));
        assert!(is_valid_metric_name("ns:sub_total"));
        assert!(!is_valid_metric_name("9lives"));
        assert!(!is_valid_metric_name("with-dash"));
        assert!(!is_valid_metric_name(""));
        assert!(!is_valid_label_name("__name__"));
        assert!(Desc::gauge("bad name", "", &[]).is_err());
    }

    #[test]
    fn push_checks_label_arity() {
        let desc = Desc::gauge("hue_temperature", "t", &["room"]).unwrap();
        let mut fam = MetricFamily::new(desc);
        assert!(fam.push(&[], 1.0).is_err());
        fam.push(&["Kitchen"], 21.5).unwrap();
        assert_eq!(fam.samples[0].labels, vec![("room", "Kitchen".to_string())]);
    }
}
