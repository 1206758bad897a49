//! Boolean conditions: checks joined by AND/OR

use crate::error::{IrError, IrResult};
use crate::operand::Operand;
use crate::operator::Operator;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::types::DataType;
use wf_core::StableHasher;

/// Ordered boolean checks joined left to right by `link_operators`.
///
/// `link_operators[i]` sits between `checks[i]` and `checks[i + 1]`, so there
/// is always exactly one link fewer than there are checks. Links are emitted
/// as written; nest a `Condition` to force grouping.
#[derive(Debug, Clone)]
pub struct Condition {
    checks: Vec<Operand>,
    link_operators: Vec<Operator>,
    lineage: Lineage,
}

impl Condition {
    pub fn new<I, T>(checks: I, link_operators: Vec<Operator>) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let checks: Vec<Operand> = checks.into_iter().map(Into::into).collect();
        if checks.is_empty() {
            return Err(IrError::Empty {
                what: "condition checks".to_string(),
            });
        }
        if link_operators.len() + 1 != checks.len() {
            return Err(IrError::LengthMismatch {
                what: "condition link operators".to_string(),
                expected: checks.len() - 1,
                found: link_operators.len(),
            });
        }
        if let Some(op) = link_operators.iter().find(|op| !op.is_link()) {
            return Err(IrError::InvalidOperator {
                operator: op.symbol().to_string(),
                context: "as a condition link".to_string(),
            });
        }
        for check in &checks {
            validate_check(check)?;
        }

        let key = NodeKey::from_hasher(
            StableHasher::new("condition")
                .sequence("checks", checks.iter().map(|c| c.key()))
                .sequence("links", link_operators.iter().map(|op| op.symbol())),
        );
        let record = NodeRecord::new(key, NodeTag::Condition, "condition", "condition")
            .with_attribute("checks", checks.len());
        let lineage = {
            let mut deps = Dependencies::new();
            deps.extend(EdgeKind::Check, checks.iter().map(|c| c.lineage()));
            Lineage::build(record, &deps)
        };

        Ok(Self {
            checks,
            link_operators,
            lineage,
        })
    }

    /// Condition with one check
    pub fn single(check: impl Into<Operand>) -> IrResult<Self> {
        let check: Operand = check.into();
        Self::new([check], Vec::new())
    }

    /// Every check must hold
    pub fn all<I, T>(checks: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        Self::linked(checks, Operator::And)
    }

    /// At least one check must hold
    pub fn any<I, T>(checks: I) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        Self::linked(checks, Operator::Or)
    }

    fn linked<I, T>(checks: I, link: Operator) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let checks: Vec<Operand> = checks.into_iter().map(Into::into).collect();
        let links = vec![link; checks.len().saturating_sub(1)];
        Self::new(checks, links)
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.lineage.set_macro_group(group);
        self
    }

    pub fn checks(&self) -> &[Operand] {
        &self.checks
    }

    pub fn link_operators(&self) -> &[Operator] {
        &self.link_operators
    }

    /// True when any check aggregates; such a condition belongs in HAVING
    pub fn is_aggregate(&self) -> bool {
        self.checks.iter().any(Operand::is_aggregate)
    }
}

impl Provenance for Condition {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn validate_check(check: &Operand) -> IrResult<()> {
    if check.as_table().is_some() {
        return Err(IrError::WrongVariant {
            container: "condition".to_string(),
            variant: "table".to_string(),
        });
    }
    let data_type = check.data_type();
    if data_type != DataType::Boolean && !data_type.is_open() {
        return Err(IrError::TypeMismatch {
            context: "condition check".to_string(),
            expected: DataType::Boolean.to_string(),
            found: data_type.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "condition_test.rs"]
mod tests;
