//! Output sample types.
//!
//! A [`Sample`] is the unit handed to the exposition layer: a fully
//! qualified name, positionally ordered label values, a numeric value and a
//! kind. Samples are scrape-scoped and have no identity beyond one cycle.

use std::fmt;

/// Name of the reserved label carrying the target identifier.
///
/// It always occupies the last slot of a sample's label tuple and is never
/// drawn from a result row.
pub const TARGET_LABEL: &str = "target";

/// Kind assumed for value columns with no declared type.
pub const DEFAULT_SAMPLE_KIND: SampleKind = SampleKind::Gauge;

/// Declared kind of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    /// Point-in-time value that can go up or down.
    Gauge,
    /// Monotonically increasing value.
    Counter,
}

impl SampleKind {
    /// Parse a declared kind from configuration, case-insensitively.
    ///
    /// Returns `None` for anything other than `gauge` or `counter`; callers
    /// decide whether that is a fatal configuration error (a *declared*
    /// unknown kind) or a default (no declaration at all).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gauge" => Some(Self::Gauge),
            "counter" => Some(Self::Counter),
            _ => None,
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Counter => write!(f, "counter"),
        }
    }
}

/// One emitted metric sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Fully qualified metric name.
    pub name: String,
    /// Help text from the metric definition.
    pub help: String,
    /// Label names, last one always [`TARGET_LABEL`].
    pub label_names: Vec<String>,
    /// Label values, positionally aligned with `label_names`.
    pub label_values: Vec<String>,
    /// Gauge or counter.
    pub kind: SampleKind,
    /// Numeric value.
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_kind_parse() {
        assert_eq!(SampleKind::parse("gauge"), Some(SampleKind::Gauge));
        assert_eq!(SampleKind::parse("counter"), Some(SampleKind::Counter));
        assert_eq!(SampleKind::parse("Counter"), Some(SampleKind::Counter));
        assert_eq!(SampleKind::parse("GAUGE"), Some(SampleKind::Gauge));
        assert_eq!(SampleKind::parse("histogram"), None);
        assert_eq!(SampleKind::parse(""), None);
    }

    #[test]
    fn test_default_kind_is_gauge() {
        assert_eq!(DEFAULT_SAMPLE_KIND, SampleKind::Gauge);
    }

    #[test]
    fn test_target_label_constant() {
        assert_eq!(TARGET_LABEL, "target");
    }

    #[test]
    fn test_sample_kind_display() {
        assert_eq!(SampleKind::Gauge.to_string(), "gauge");
        assert_eq!(SampleKind::Counter.to_string(), "counter");
    }
}
