//! wf-db - Execution boundary for Weft
//!
//! This crate provides the `Database` trait that accepts rendered SQL text
//! and a DuckDB implementation of it.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::{Database, QueryResult};
