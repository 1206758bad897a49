//! Parse-back validation of rendered SQL

use crate::dialect::SqlDialect;
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::{visit_relations, Statement};
use std::collections::BTreeSet;
use std::ops::ControlFlow;

/// Parse rendered SQL and check it is exactly one supported statement
pub fn validate(dialect: &dyn SqlDialect, sql: &str) -> SqlResult<Statement> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(SqlError::EmptySql);
    }
    let mut statements = dialect.parse(sql)?;
    if statements.len() != 1 {
        return Err(SqlError::ValidationError(format!(
            "expected one statement, found {}",
            statements.len()
        )));
    }
    let statement = statements.remove(0);
    validate_statement(&statement)?;
    Ok(statement)
}

/// Only queries and `CREATE TABLE` are ever rendered
fn validate_statement(statement: &Statement) -> SqlResult<()> {
    match statement {
        Statement::Query(_) | Statement::CreateTable(_) => Ok(()),
        Statement::Insert(_) => Err(SqlError::UnsupportedStatement(
            "INSERT statements are never rendered".to_string(),
        )),
        Statement::Update { .. } => Err(SqlError::UnsupportedStatement(
            "UPDATE statements are never rendered".to_string(),
        )),
        Statement::Delete(_) => Err(SqlError::UnsupportedStatement(
            "DELETE statements are never rendered".to_string(),
        )),
        Statement::Drop { .. } => Err(SqlError::UnsupportedStatement(
            "DROP statements are never rendered".to_string(),
        )),
        other => Err(SqlError::UnsupportedStatement(
            other.to_string().split_whitespace().next().unwrap_or("").to_string(),
        )),
    }
}

/// Every relation name a statement reads, CTE references included
pub fn referenced_relations(statement: &Statement) -> BTreeSet<String> {
    let mut relations = BTreeSet::new();
    let _ = visit_relations(statement, |relation| {
        let name = relation
            .0
            .iter()
            .filter_map(|part| part.as_ident())
            .map(|ident| ident.value.clone())
            .collect::<Vec<_>>()
            .join(".");
        relations.insert(name);
        ControlFlow::<()>::Continue(())
    });
    relations
}

/// Names declared by the statement's outermost `WITH`, in order
pub fn declared_ctes(statement: &Statement) -> Vec<String> {
    match statement {
        Statement::Query(query) => query
            .with
            .as_ref()
            .map(|with| {
                with.cte_tables
                    .iter()
                    .map(|cte| cte.alias.name.value.clone())
                    .collect()
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
