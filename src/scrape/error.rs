//! Scrape-layer error types.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while scraping one metric definition against one
/// target. These are definition-scoped and recoverable: they are recorded
/// and the remaining definitions proceed.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The query exceeded the configured deadline. Reported distinctly
    /// from other execution errors.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// The driver reported a failure executing the query or decoding a
    /// row.
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// The definition produced zero samples and is configured to treat
    /// that as an error.
    #[error("no metrics found while parsing")]
    NoMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_error_is_distinct_from_query_error() {
        let timeout = ScrapeError::Timeout(Duration::from_secs(5));
        let query = ScrapeError::Query(sqlx::Error::RowNotFound);

        assert!(timeout.to_string().contains("timed out"));
        assert!(!query.to_string().contains("timed out"));
        assert!(matches!(timeout, ScrapeError::Timeout(_)));
    }
}
