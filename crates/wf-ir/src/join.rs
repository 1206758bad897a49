//! Joins between tables

use crate::column::Column;
use crate::condition::Condition;
use crate::container::{ColumnList, TableList};
use crate::error::{IrError, IrResult};
use crate::expression::Expression;
use crate::operator::Operator;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::table::Table;
use wf_core::StableHasher;

/// A join expression (`left <kind> right`) with its ON condition.
///
/// Exposes the left table's columns followed by the right table's, minus any
/// right column whose name is already taken on the left. CTEs are the left
/// side's followed by the right side's, without repeats.
#[derive(Debug, Clone)]
pub struct Join {
    expression: Expression,
    left: Box<Table>,
    right: Box<Table>,
    condition: Option<Condition>,
    columns: ColumnList,
    ctes: TableList,
    lineage: Lineage,
}

impl Join {
    /// `CROSS JOIN` takes no condition; every other kind requires one
    pub fn new(expression: Expression, condition: Option<Condition>) -> IrResult<Self> {
        let operator = expression.operator();
        if !operator.is_join() {
            return Err(IrError::InvalidOperator {
                operator: operator.symbol().to_string(),
                context: "as a join kind".to_string(),
            });
        }
        match (operator, &condition) {
            (Operator::CrossJoin, Some(_)) => {
                return Err(IrError::InvalidOperator {
                    operator: operator.symbol().to_string(),
                    context: "with an ON condition".to_string(),
                });
            }
            (Operator::CrossJoin, None) | (_, Some(_)) => {}
            (_, None) => {
                return Err(IrError::InvalidOperator {
                    operator: operator.symbol().to_string(),
                    context: "without an ON condition".to_string(),
                });
            }
        }

        let (left, right) = sides(&expression)?;
        let (left, right) = (Box::new(left.clone()), Box::new(right.clone()));
        let mut columns = ColumnList::new();
        for column in left.columns().iter().chain(right.columns().iter()) {
            if columns.contains(column.name().as_str()) {
                log::debug!(
                    "Dropping column '{}' of '{}' from join: name taken by left side",
                    column.name(),
                    right.name()
                );
                continue;
            }
            columns.add(column.clone(), false)?;
        }
        let mut ctes = TableList::new();
        ctes.merge_missing(left.ctes())?;
        ctes.merge_missing(right.ctes())?;

        let key = NodeKey::from_hasher(
            StableHasher::new("join")
                .field("expression", expression.key())
                .optional("condition", condition.as_ref().map(|c| c.key())),
        );
        let record = NodeRecord::new(key, NodeTag::Join, "join", operator.symbol())
            .with_attribute("left", left.name())
            .with_attribute("right", right.name());
        let lineage = {
            let mut deps = Dependencies::new();
            deps.push(EdgeKind::JoinExpression, expression.lineage());
            if let Some(c) = &condition {
                deps.push(EdgeKind::JoinCondition, c.lineage());
            }
            Lineage::build(record, &deps)
        };

        Ok(Self {
            expression,
            left,
            right,
            condition,
            columns,
            ctes,
            lineage,
        })
    }

    /// Shorthand for `Join::new(Expression::new(kind, left, right)?, condition)`
    pub fn between(
        kind: Operator,
        left: &Table,
        right: &Table,
        condition: Option<Condition>,
    ) -> IrResult<Self> {
        Self::new(Expression::new(kind, left, right)?, condition)
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn operator(&self) -> Operator {
        self.expression.operator()
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn left(&self) -> &Table {
        &self.left
    }

    pub fn right(&self) -> &Table {
        &self.right
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    pub fn ctes(&self) -> &TableList {
        &self.ctes
    }
}

impl Provenance for Join {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn sides(expression: &Expression) -> IrResult<(&Table, &Table)> {
    let left = expression.left().as_table();
    let right = expression.right().and_then(|r| r.as_table());
    match (left, right) {
        (Some(l), Some(r)) => Ok((l, r)),
        _ => Err(IrError::WrongVariant {
            container: "join expression".to_string(),
            variant: "non-table operand".to_string(),
        }),
    }
}

/// Several joins threaded into one FROM clause.
///
/// The first join contributes its full `left <kind> right`; each later join
/// must start from a table that is already part of the chain and contributes
/// its right table.
#[derive(Debug, Clone)]
pub struct CompoundJoin {
    joins: Vec<Join>,
    columns: ColumnList,
    ctes: TableList,
    lineage: Lineage,
}

impl CompoundJoin {
    pub fn new(joins: Vec<Join>) -> IrResult<Self> {
        let Some(first) = joins.first() else {
            return Err(IrError::Empty {
                what: "compound join".to_string(),
            });
        };
        let mut joined = vec![first.left().name().clone(), first.right().name().clone()];
        let mut columns = first.columns.clone();
        let mut ctes = first.ctes.clone();

        for join in &joins[1..] {
            if !joined.contains(join.left().name()) {
                return Err(IrError::JoinChain {
                    table: join.left().name().to_string(),
                });
            }
            joined.push(join.right().name().clone());
            for column in join.right().columns() {
                if !columns.contains(column.name().as_str()) {
                    columns.add(column.clone(), false)?;
                }
            }
            ctes.merge_missing(&join.ctes)?;
        }

        let key = NodeKey::from_hasher(
            StableHasher::new("compound_join").sequence("joins", joins.iter().map(|j| j.key())),
        );
        let record = NodeRecord::new(key, NodeTag::CompoundJoin, "compound_join", "joins")
            .with_attribute("tables", joined.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(","));
        let lineage = {
            let mut deps = Dependencies::new();
            deps.extend(EdgeKind::Join, joins.iter().map(|j| j.lineage()));
            Lineage::build(record, &deps)
        };

        Ok(Self {
            joins,
            columns,
            ctes,
            lineage,
        })
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    pub fn ctes(&self) -> &TableList {
        &self.ctes
    }

    /// Column by name across every joined table
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }
}

impl Provenance for CompoundJoin {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

#[cfg(test)]
#[path = "join_test.rs"]
mod tests;
