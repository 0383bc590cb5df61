//! Crate-wide error type.
//!
//! Every variant maps to a stable process exit code so `main` can stay a thin
//! wrapper around `app::run`.

use thiserror::Error;

use crate::query::QueryError;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// The source table is missing, unreadable, or lacks required columns.
    #[error("{0}")]
    DataLoad(String),
    /// Bad user input (flags, dates, unknown names).
    #[error("{0}")]
    Usage(String),
    /// Writing a CSV/JSON file failed.
    #[error("{0}")]
    Export(String),
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
    /// Terminal setup, draw, or input failures in the TUI.
    #[error("{0}")]
    Terminal(String),
}

impl AppError {
    pub fn data_load(message: impl Into<String>) -> Self {
        Self::DataLoad(message.into())
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export(message.into())
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::DataLoad(_) | AppError::Usage(_) | AppError::Export(_) => 2,
            AppError::Query(_) => 3,
            AppError::Terminal(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_stable() {
        assert_eq!(AppError::data_load("x").exit_code(), 2);
        assert_eq!(AppError::usage("x").exit_code(), 2);
        assert_eq!(AppError::export("x").exit_code(), 2);
        assert_eq!(AppError::from(QueryError::Syntax("x".into())).exit_code(), 3);
        assert_eq!(AppError::terminal("x").exit_code(), 4);
    }

    #[test]
    fn query_errors_keep_their_message() {
        let err = AppError::from(QueryError::UnknownColumn("price".into()));
        assert_eq!(err.to_string(), "Query error: unknown column `price`");
    }
}
