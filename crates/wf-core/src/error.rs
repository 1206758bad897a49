//! Error types for wf-core

use thiserror::Error;

/// Core error type for Weft
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: IO error with file path context
    #[error("[C003] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C004: YAML parse error
    #[error("[C004] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// C005: JSON parse error
    #[error("[C005] JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// C006: A name that must be non-empty was empty
    #[error("[C006] Empty name for {context}")]
    EmptyName { context: String },

    /// C007: A unit string could not be parsed
    #[error("[C007] Invalid unit '{unit}': {reason}")]
    InvalidUnit { unit: String, reason: String },

    /// C008: Two operands carry physical units that cannot be combined
    #[error("[C008] Incompatible units for {operation}: '{left}' vs '{right}'")]
    IncompatibleUnits {
        operation: String,
        left: String,
        right: String,
    },

    /// C009: A metadata row carries an unusable field value
    #[error("[C009] Invalid metadata for column '{column}': {field} = '{value}'")]
    InvalidMetadata {
        column: String,
        field: String,
        value: String,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
