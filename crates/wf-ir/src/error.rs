//! Error types for wf-ir

use thiserror::Error;

/// Structural validation error raised while building IR nodes
///
/// Every variant is raised at construction or mutation time; a node that
/// exists is always well-formed.
#[derive(Error, Debug)]
pub enum IrError {
    /// IR001: Name already present in a name-unique container
    #[error("[IR001] Duplicate {container} entry '{name}' (use override to replace it)")]
    DuplicateName { container: String, name: String },

    /// IR002: Node variant not allowed in this position
    #[error("[IR002] {container} does not accept {variant} entries")]
    WrongVariant { container: String, variant: String },

    /// IR003: Parallel lists of unequal length
    #[error("[IR003] {what}: expected {expected} entries, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// IR004: Table variant that cannot be emitted as a CTE
    #[error("[IR004] Table '{table}' of kind {variant} cannot be used as a CTE")]
    InvalidCte { table: String, variant: String },

    /// IR005: Column lookup failed
    #[error("[IR005] Table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// IR006: Wrong number of function arguments
    #[error("[IR006] {function} expects {expected} argument(s), found {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },

    /// IR007: Operator not valid in this position
    #[error("[IR007] Operator '{operator}' is not valid {context}")]
    InvalidOperator { operator: String, context: String },

    /// IR008: Union member incompatible with the first member
    #[error("[IR008] Union member '{member}' does not match: {detail}")]
    UnionMismatch { member: String, detail: String },

    /// IR009: Literal value rejected
    #[error("[IR009] Invalid {kind} literal '{value}': {reason}")]
    InvalidLiteral {
        kind: String,
        value: String,
        reason: String,
    },

    /// IR010: Operand of the wrong data type
    #[error("[IR010] {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// IR011: Function argument rejected
    #[error("[IR011] Invalid argument to {function}: {reason}")]
    InvalidArgument { function: String, reason: String },

    /// IR012: Required list is empty
    #[error("[IR012] {what} must not be empty")]
    Empty { what: String },

    /// IR013: Compound join step does not attach to an already joined table
    #[error("[IR013] Join on '{table}' does not continue the join chain")]
    JoinChain { table: String },

    /// IR014: Name filter pattern failed to compile
    #[error("[IR014] Invalid name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// IR015: Data type name not recognised
    #[error("[IR015] Unknown data type '{name}'")]
    UnknownType { name: String },

    /// IR016: Core error propagation (names, units, metadata)
    #[error("[IR016] {0}")]
    Core(#[from] wf_core::CoreError),
}

/// Result type alias for IrError
pub type IrResult<T> = Result<T, IrError>;
