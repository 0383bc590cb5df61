//! Ad-hoc queries against the filtered view.
//!
//! The dashboard treats the query engine as an external collaborator behind a
//! narrow seam: a query string goes in, a result table or a `QueryError` comes
//! out. The filtered view is addressable as `df_filtered`.
//!
//! `SqliteEvaluator` is the built-in evaluator: the view is copied into an
//! in-memory SQLite table and the query runs there.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::filter::FilteredView;

mod sqlite;

pub use sqlite::SqliteEvaluator;

/// Columns of the filtered view, in export order.
pub const VIEW_COLUMNS: [&str; 11] = [
    "id", "date", "time", "location", "category", "product", "sales", "quantity", "weekday",
    "month", "hour",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unknown table `{0}` (the filtered view is `df_filtered`)")]
    UnknownTable(String),
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
    #[error("unsupported query: {0}")]
    Unsupported(String),
    /// Any other failure reported by the query engine.
    #[error("{0}")]
    Engine(String),
}

/// A query engine that can run a text query over the filtered view.
pub trait QueryEvaluator {
    fn evaluate(&self, query: &str, view: &FilteredView) -> Result<QueryResult, QueryError>;
}

/// A single result cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Number(n) => write!(f, "{n:.2}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Tabular query output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_display_like_a_table_cell() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(12).to_string(), "12");
        assert_eq!(Value::Number(2.5).to_string(), "2.50");
        assert_eq!(Value::Text("Latte".into()).to_string(), "Latte");
    }
}
