//! Configuration module.
//!
//! Everything here is resolved once at startup and immutable afterwards:
//! - Application settings (server, targets, query timeout) from YAML
//! - Metric definitions from TOML documents
//! - Validation for both, where every failure is fatal

mod app;
mod definitions;
mod validation;

pub use app::{AppConfig, ServerConfig, TargetsConfig};
pub use definitions::{MetricDefinition, load_definitions};
pub use validation::{ConfigError, expand_env_vars, parse_duration};

// Re-export constants
pub use app::{DEFAULT_METRICS_FILE, DEFAULT_QUERY_TIMEOUT, DEFAULT_TELEMETRY_PATH};
