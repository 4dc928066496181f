//! Declarative metric definitions.
//!
//! A metric definition describes one named family of samples produced from
//! one SQL query: which columns become labels, which become numeric values,
//! and how the sample name is derived. Definitions are loaded once at
//! startup from TOML documents and never mutated afterwards; there is no
//! hot reload.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::sample::{DEFAULT_SAMPLE_KIND, SampleKind, TARGET_LABEL};

use super::validation::ConfigError;

/// One `[[metric]]` table from a definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricDefinition {
    /// Namespacing prefix for every sample name this definition produces.
    pub context: String,

    /// Columns used as label dimensions, in order. The target identifier
    /// label is appended automatically and is not listed here.
    #[serde(default)]
    pub labels: Vec<String>,

    /// Column name → help text. The keys are exactly the columns treated
    /// as numeric sample values.
    #[serde(default, rename = "metricsdesc", alias = "metrics_desc")]
    pub metrics_desc: BTreeMap<String, String>,

    /// Column name → declared kind (`gauge` or `counter`). Columns without
    /// an entry default to gauge.
    #[serde(default, rename = "metricstype", alias = "metrics_type")]
    pub metrics_type: BTreeMap<String, String>,

    /// When set, the sample name is derived from this column's value per
    /// row instead of the value column's name.
    #[serde(default, rename = "fieldtoappend", alias = "field_to_append")]
    pub field_to_append: String,

    /// SQL text to execute against each target.
    pub request: String,

    /// When false, a scrape of this definition that yields zero samples is
    /// reported as an error.
    #[serde(default, rename = "ignorezeroresult", alias = "ignore_zero_result")]
    pub ignore_zero_result: bool,
}

impl MetricDefinition {
    /// Full label schema for samples of this definition: the configured
    /// labels followed by the reserved target-identifier label.
    pub fn label_names(&self) -> Vec<String> {
        let mut names = self.labels.clone();
        names.push(TARGET_LABEL.to_string());
        names
    }

    /// Declared kind for a value column, defaulting to gauge when absent.
    ///
    /// Unrecognized declared kinds are rejected by [`Self::validate`] at
    /// load time, so the fallback here only covers absent declarations.
    pub fn sample_kind(&self, column: &str) -> SampleKind {
        self.metrics_type
            .get(&column.to_ascii_lowercase())
            .and_then(|s| SampleKind::parse(s))
            .unwrap_or(DEFAULT_SAMPLE_KIND)
    }

    /// Validate one definition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.context.is_empty() {
            return Err(ConfigError::Validation(
                "metric definition context cannot be empty".to_string(),
            ));
        }
        if self.request.is_empty() {
            return Err(ConfigError::Validation(format!(
                "metric definition '{}': request cannot be empty",
                self.context
            )));
        }
        if self.metrics_desc.is_empty() {
            return Err(ConfigError::Validation(format!(
                "metric definition '{}': metricsdesc names no value columns",
                self.context
            )));
        }
        for (column, declared) in &self.metrics_type {
            if SampleKind::parse(declared).is_none() {
                return Err(ConfigError::Validation(format!(
                    "metric definition '{}': unrecognized metric type '{}' for column '{}'",
                    self.context, declared, column
                )));
            }
        }
        Ok(())
    }
}

/// Top-level shape of a metric definition document.
#[derive(Debug, Default, Deserialize)]
struct MetricDocument {
    #[serde(default, rename = "metric", alias = "Metric")]
    metric: Vec<MetricDefinition>,
}

/// Load the default document plus an optional custom document.
///
/// The custom document's definitions are appended after the default set,
/// preserving each document's order. Any parse or validation failure is
/// fatal.
pub fn load_definitions(
    default_path: &Path,
    custom_path: Option<&Path>,
) -> Result<Vec<MetricDefinition>, ConfigError> {
    let mut definitions = load_document(default_path)?;
    if let Some(path) = custom_path {
        definitions.extend(load_document(path)?);
    }
    Ok(definitions)
}

fn load_document(path: &Path) -> Result<Vec<MetricDefinition>, ConfigError> {
    tracing::debug!(path = %path.display(), "loading metric definitions");
    let content = std::fs::read_to_string(path)?;
    let document: MetricDocument = toml::from_str(&content)?;
    for definition in &document.metric {
        definition.validate()?;
    }
    tracing::info!(
        path = %path.display(),
        count = document.metric.len(),
        "loaded metric definitions"
    );
    Ok(document.metric)
}
