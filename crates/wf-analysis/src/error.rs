//! Error types for wf-analysis

use thiserror::Error;

/// Analysis error type
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// AE001: Schema dependencies still form a cycle after redundant edges are pruned
    #[error("[AE001] Schema dependency cycle: {cycle}")]
    SchemaCycle { cycle: String },

    /// AE002: Core error propagation
    #[error("[AE002] Core error: {0}")]
    Core(#[from] wf_core::CoreError),
}

/// Result type alias for AnalysisError
pub type AnalysisResult<T> = Result<T, AnalysisError>;
