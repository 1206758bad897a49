//! Error types for wf-sql

use thiserror::Error;

/// Rendering and SQL validation errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Unsupported SQL statement (S003)
    #[error("[S003] Unsupported SQL statement type: {0}")]
    UnsupportedStatement(String),

    /// Validation error (S004)
    #[error("[S004] SQL validation failed: {0}")]
    ValidationError(String),

    /// Node with no SQL form (S005)
    #[error("[S005] Cannot render {node}: {reason}")]
    Unrenderable { node: String, reason: String },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
