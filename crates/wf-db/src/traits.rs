//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Rows of a query, every value coerced to a string
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names from the result set
    pub columns: Vec<String>,
    /// One entry per row, in column order; NULL reads as `"null"`
    pub rows: Vec<Vec<String>>,
}

/// Anything that runs rendered SQL
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute several `;`-separated statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and collect its rows
    async fn query(&self, sql: &str) -> DbResult<QueryResult>;

    /// Number of rows a query returns
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists; `schema.name` is accepted
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Create a schema if it does not exist
    async fn create_schema_if_not_exists(&self, schema: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
