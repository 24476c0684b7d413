//! Query execution against the graph store

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::graph::{GraphStore, Row};

/// Column every generated query projects its answer as
pub const RESULT_COLUMN: &str = "result";

/// Result of running one generated query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Answer column of every row, in store order
    Rows(Vec<Value>),
    /// The query ran and matched nothing
    NoResults,
    /// The query could not run
    Failed(String),
}

impl QueryOutcome {
    /// Result values; empty unless rows came back
    pub fn values(&self) -> &[Value] {
        match self {
            QueryOutcome::Rows(values) => values,
            QueryOutcome::NoResults | QueryOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

/// Runs queries and projects the answer column.
///
/// Never returns an error: store failures, including a missing store, become
/// [`QueryOutcome::Failed`].
#[derive(Clone)]
pub struct QueryExecutor {
    store: Option<Arc<dyn GraphStore>>,
}

impl QueryExecutor {
    pub fn new(store: Option<Arc<dyn GraphStore>>) -> Self {
        Self { store }
    }

    pub async fn execute(&self, query: &str) -> QueryOutcome {
        let Some(store) = &self.store else {
            tracing::error!("Graph store is not connected");
            return QueryOutcome::Failed("graph store is not connected".to_string());
        };

        let rows = match store.query(query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(query, error = %e, "Query execution failed");
                return QueryOutcome::Failed(e.to_string());
            }
        };

        if rows.is_empty() {
            tracing::info!(query, "Query returned no results");
            return QueryOutcome::NoResults;
        }

        let values = match rows.iter().map(answer_value).collect::<Result<Vec<_>, _>>() {
            Ok(values) => values,
            Err(reason) => {
                tracing::error!(query, reason = %reason, "Query result has no answer column");
                return QueryOutcome::Failed(reason);
            }
        };
        tracing::info!(rows = values.len(), "Query returned results");
        QueryOutcome::Rows(values)
    }
}

/// The `result` column, or the only column. Drivers do not keep projection
/// order, so a row with several columns and no `result` has no answer.
fn answer_value(row: &Row) -> Result<Value, String> {
    if let Some(value) = row.get(RESULT_COLUMN) {
        return Ok(value.clone());
    }
    match row.len() {
        0 => Ok(Value::Null),
        1 => Ok(row.first().cloned().unwrap_or(Value::Null)),
        n => Err(format!(
            "query returned {n} columns and none is named `{RESULT_COLUMN}`"
        )),
    }
}
