//! wf-sql - SQL layer for Weft
//!
//! This crate renders the IR into DuckDB SQL, wraps the sqlparser dialect
//! used to validate rendered statements, and writes rendered SQL back onto
//! provenance graph records.

pub mod annotate;
pub mod dialect;
pub mod error;
pub mod renderer;
pub mod validator;

pub use annotate::annotate;
pub use dialect::{DuckDbDialect, SqlDialect};
pub use error::{SqlError, SqlResult};
pub use renderer::Renderer;
pub use validator::{declared_ctes, referenced_relations, validate};
