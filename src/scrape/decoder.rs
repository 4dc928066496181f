//! Deadline-bounded query execution into generic rows.
//!
//! The decoder executes one query and yields each result row to a visitor
//! as a mapping from lower-cased column name to a textual rendering of the
//! value, regardless of the source column type. All interpretation —
//! numeric parsing, the timestamp fallback — is deferred to the mapper,
//! keeping the decoder agnostic to metric semantics.

use std::collections::HashMap;
use std::time::Duration;

use futures::TryStreamExt;
use sqlx::AnyPool;
use sqlx::any::AnyRow;
use sqlx::{Column, Row, ValueRef};
use tokio::time::{Instant, timeout_at};

use super::error::ScrapeError;

/// One decoded result row. Transient: produced fresh per result row and
/// discarded after mapping.
#[derive(Debug, Clone, Default)]
pub struct QueryRow {
    columns: HashMap<String, String>,
}

impl QueryRow {
    /// Build a row from column/value pairs. Column names are lower-cased
    /// on insertion.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Look up a column value, case-insensitively. Missing columns are
    /// `None`; the mapper treats them as empty.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .get(&column.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Execute a query and feed each decoded row to `visit`.
///
/// A single hard deadline covers execution and row iteration. Rows are
/// decoded lazily as the driver yields them; a decode failure or visitor
/// error aborts the remaining rows and propagates, but rows already
/// visited are not retracted.
///
/// # Errors
/// `ScrapeError::Timeout` when the deadline elapses, `ScrapeError::Query`
/// for driver-reported failures, or whatever the visitor returns.
pub async fn execute<F>(
    pool: &AnyPool,
    query: &str,
    deadline: Duration,
    mut visit: F,
) -> Result<(), ScrapeError>
where
    F: FnMut(QueryRow) -> Result<(), ScrapeError>,
{
    let hard_stop = Instant::now() + deadline;
    let mut rows = sqlx::query(query).fetch(pool);

    loop {
        let next = match timeout_at(hard_stop, rows.try_next()).await {
            Ok(next) => next?,
            Err(_) => return Err(ScrapeError::Timeout(deadline)),
        };
        let Some(row) = next else {
            break;
        };
        visit(decode_row(&row)?)?;
    }
    Ok(())
}

fn decode_row(row: &AnyRow) -> Result<QueryRow, ScrapeError> {
    let mut columns = HashMap::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        columns.insert(column.name().to_ascii_lowercase(), render_value(row, idx)?);
    }
    Ok(QueryRow { columns })
}

/// Render one column as text. NULL becomes the empty string; values the
/// generic driver cannot surface as text or a number (blobs) do too.
fn render_value(row: &AnyRow, idx: usize) -> Result<String, ScrapeError> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(String::new());
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<bool, _>(idx) {
        return Ok(v.to_string());
    }
    Ok(String::new())
}
