//! Row → sample transformation.
//!
//! Pure functions converting one decoded row plus one metric definition
//! into zero or more typed samples. Value interpretation happens exactly
//! once per value, into [`FieldValue`]: a trimmed float parse, then a
//! fixed-format local-time timestamp, else unparseable and silently
//! skipped.

use chrono::{Local, NaiveDateTime, TimeZone};

use crate::config::MetricDefinition;
use crate::sample::Sample;

use super::decoder::QueryRow;

/// Fallback timestamp format for value columns, interpreted in local time.
const TIMESTAMP_FORMAT: &str = "%Y/%m/%d:%H:%M:%S";

/// A configured value column, resolved once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    /// Parsed as a floating-point number.
    Numeric(f64),
    /// Parsed via [`TIMESTAMP_FORMAT`]; carries epoch seconds.
    Timestamp(f64),
    /// Neither; the column is skipped without error.
    Unparseable,
}

impl FieldValue {
    /// Resolve raw column text.
    pub fn resolve(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<f64>() {
            return Self::Numeric(value);
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
            if let Some(local) = Local.from_local_datetime(&naive).earliest() {
                return Self::Timestamp(local.timestamp() as f64);
            }
        }
        Self::Unparseable
    }

    /// Numeric sample value, if the column resolved to one.
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Numeric(v) | Self::Timestamp(v) => Some(v),
            Self::Unparseable => None,
        }
    }
}

/// Reduce arbitrary database text to a metric-name-safe token: lower-case,
/// spaces to underscores, parentheses and slashes dropped.
pub fn sanitize_name(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            '(' | ')' | '/' => None,
            c => Some(c.to_ascii_lowercase()),
        })
        .collect()
}

/// Map one row to samples under a definition.
///
/// The label tuple is the row's values for the configured label columns
/// (missing columns yield empty values, not errors) with the target
/// identifier appended in the reserved last slot. Each `metrics_desc`
/// column that resolves to a value emits one sample; the rest are skipped
/// silently.
pub fn map_row(definition: &MetricDefinition, row: &QueryRow, target: &str) -> Vec<Sample> {
    let label_names = definition.label_names();
    let mut label_values: Vec<String> = definition
        .labels
        .iter()
        .map(|label| row.get(label).unwrap_or_default().to_string())
        .collect();
    label_values.push(target.to_string());

    let mut samples = Vec::new();
    for (column, help) in &definition.metrics_desc {
        let raw = row.get(column).unwrap_or_default();
        let Some(value) = FieldValue::resolve(raw).value() else {
            tracing::debug!(
                context = %definition.context,
                column = %column,
                "skipping column with unparseable value"
            );
            continue;
        };

        let name = if definition.field_to_append.is_empty() {
            format!("{}_{}", definition.context, column)
        } else {
            let fragment = row.get(&definition.field_to_append).unwrap_or_default();
            format!("{}_{}", definition.context, sanitize_name(fragment))
        };

        samples.push(Sample {
            name,
            help: help.clone(),
            label_names: label_names.clone(),
            label_values: label_values.clone(),
            kind: definition.sample_kind(column),
            value,
        });
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::{SampleKind, TARGET_LABEL};

    fn definition(toml: &str) -> MetricDefinition {
        #[derive(serde::Deserialize)]
        struct Doc {
            metric: Vec<MetricDefinition>,
        }
        let doc: Doc = ::toml::from_str(toml).unwrap();
        doc.metric.into_iter().next().unwrap()
    }

    fn sessions_definition() -> MetricDefinition {
        definition(
            r#"
[[metric]]
context = "sessions"
labels = ["status", "machine"]
metricsdesc = { value = "Session count." }
request = "SELECT status, machine, COUNT(*) AS value FROM sessions GROUP BY status, machine"
"#,
        )
    }

    #[test]
    fn test_field_value_numeric() {
        assert_eq!(FieldValue::resolve("42"), FieldValue::Numeric(42.0));
        assert_eq!(FieldValue::resolve("  3.25  "), FieldValue::Numeric(3.25));
        assert_eq!(FieldValue::resolve("-7"), FieldValue::Numeric(-7.0));
    }

    #[test]
    fn test_field_value_timestamp_epoch_seconds() {
        let resolved = FieldValue::resolve("2024/06/01:12:30:00");
        let expected = Local
            .from_local_datetime(
                &NaiveDateTime::parse_from_str("2024/06/01:12:30:00", TIMESTAMP_FORMAT).unwrap(),
            )
            .earliest()
            .unwrap()
            .timestamp() as f64;
        assert_eq!(resolved, FieldValue::Timestamp(expected));
    }

    #[test]
    fn test_field_value_unparseable() {
        assert_eq!(FieldValue::resolve("ACTIVE"), FieldValue::Unparseable);
        assert_eq!(FieldValue::resolve(""), FieldValue::Unparseable);
        assert_eq!(FieldValue::resolve("2024-06-01 12:30:00"), FieldValue::Unparseable);
        assert_eq!(FieldValue::resolve("ACTIVE").value(), None);
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Foo Bar(1)/2"), "foo_bar12");
        assert_eq!(sanitize_name("physical reads"), "physical_reads");
        assert_eq!(sanitize_name("DB CPU(s)"), "db_cpus");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn test_map_row_label_tuple_shape() {
        let definition = sessions_definition();
        let row = QueryRow::from_pairs([("status", "ACTIVE"), ("value", "12")]);

        let samples = map_row(&definition, &row, "orders");
        assert_eq!(samples.len(), 1);

        let sample = &samples[0];
        // N label values for N label names; the last is the target
        // identifier, missing columns map to empty values.
        assert_eq!(sample.label_names.len(), 3);
        assert_eq!(sample.label_names[2], TARGET_LABEL);
        assert_eq!(
            sample.label_values,
            vec!["ACTIVE".to_string(), String::new(), "orders".to_string()]
        );
        assert_eq!(sample.name, "sessions_value");
        assert_eq!(sample.value, 12.0);
        assert_eq!(sample.kind, SampleKind::Gauge);
    }

    #[test]
    fn test_map_row_skips_unparseable_columns() {
        let definition = definition(
            r#"
[[metric]]
context = "stats"
metricsdesc = { good = "Parseable.", bad = "Unparseable." }
request = "SELECT 1"
"#,
        );
        let row = QueryRow::from_pairs([("good", "5"), ("bad", "not a number")]);

        let samples = map_row(&definition, &row, "orders");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, "stats_good");
    }

    #[test]
    fn test_map_row_timestamp_fallback_value() {
        let definition = definition(
            r#"
[[metric]]
context = "backup"
metricsdesc = { completed = "Last completion time." }
request = "SELECT 1"
"#,
        );
        let row = QueryRow::from_pairs([("completed", "2024/06/01:00:00:00")]);

        let samples = map_row(&definition, &row, "orders");
        assert_eq!(samples.len(), 1);
        assert!(samples[0].value > 1_600_000_000.0);
    }

    #[test]
    fn test_map_row_field_to_append_derives_name() {
        let definition = definition(
            r#"
[[metric]]
context = "activity"
metricsdesc = { value = "Statistic value." }
fieldtoappend = "name"
request = "SELECT name, value FROM stats"
"#,
        );
        let row = QueryRow::from_pairs([("name", "Foo Bar(1)/2"), ("value", "9")]);

        let samples = map_row(&definition, &row, "orders");
        assert_eq!(samples[0].name, "activity_foo_bar12");
        assert_eq!(samples[0].value, 9.0);
    }

    #[test]
    fn test_map_row_counter_declaration_changes_kind_only() {
        let gauge_def = definition(
            r#"
[[metric]]
context = "activity"
labels = ["class"]
metricsdesc = { total = "Total." }
request = "SELECT 1"
"#,
        );
        let counter_def = definition(
            r#"
[[metric]]
context = "activity"
labels = ["class"]
metricsdesc = { total = "Total." }
metricstype = { total = "counter" }
request = "SELECT 1"
"#,
        );
        let row = QueryRow::from_pairs([("class", "user"), ("total", "88")]);

        let gauge = &map_row(&gauge_def, &row, "orders")[0];
        let counter = &map_row(&counter_def, &row, "orders")[0];

        assert_eq!(gauge.kind, SampleKind::Gauge);
        assert_eq!(counter.kind, SampleKind::Counter);
        assert_eq!(gauge.name, counter.name);
        assert_eq!(gauge.label_values, counter.label_values);
        assert_eq!(gauge.value, counter.value);
    }

    #[test]
    fn test_map_row_no_parseable_columns_yields_nothing() {
        let definition = sessions_definition();
        let row = QueryRow::from_pairs([("status", "ACTIVE"), ("value", "N/A")]);
        assert!(map_row(&definition, &row, "orders").is_empty());
    }
}
