//! Text exposition format (version 0.0.4).

use std::fmt::Write;

use super::MetricFamily;

/// Content type served alongside [`encode`] output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus parsers expect (`+Inf`, `-Inf`, `NaN`).
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}

/// Render `{k="v",...}`, or nothing for an empty label set.
pub fn render_labels<K: AsRef<str>, V: AsRef<str>>(labels: &[(K, V)]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let inner = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k.as_ref(), escape_label(v.as_ref())))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inner}}}")
}

/// Append one family. Families without samples still emit their HELP/TYPE header.
pub fn encode_family(fam: &MetricFamily, out: &mut String) {
    let name = &fam.desc.name;
    if !fam.desc.help.is_empty() {
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(&fam.desc.help));
    }
    let _ = writeln!(out, "# TYPE {} {}", name, fam.desc.metric_type.as_str());
    for s in &fam.samples {
        let _ = writeln!(out, "{}{} {}", name, render_labels(&s.labels), format_value(s.value));
    }
}

/// Render all families in the given order.
pub fn encode(families: &[MetricFamily]) -> String {
    let mut out = String::new();
    for fam in families {
        encode_family(fam, &mut out);
    }
    out
}
