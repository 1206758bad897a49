//! `CASE WHEN ... THEN ... ELSE ... END`

use crate::condition::Condition;
use crate::error::{IrError, IrResult};
use crate::operand::Operand;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::types::{DataType, OnNull, VarType};
use wf_core::{StableHasher, Unit};

/// Branches evaluated in order; the first condition that holds picks its value
#[derive(Debug, Clone)]
pub struct CaseWhen {
    conditions: Vec<Condition>,
    values: Vec<Operand>,
    else_value: Option<Operand>,
    data_type: DataType,
    var_type: VarType,
    unit: Unit,
    lineage: Lineage,
}

impl CaseWhen {
    pub fn new<I, T>(
        conditions: Vec<Condition>,
        values: I,
        else_value: Option<Operand>,
    ) -> IrResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let values: Vec<Operand> = values.into_iter().map(Into::into).collect();
        if conditions.is_empty() {
            return Err(IrError::Empty {
                what: "case conditions".to_string(),
            });
        }
        if conditions.len() != values.len() {
            return Err(IrError::LengthMismatch {
                what: "case values".to_string(),
                expected: conditions.len(),
                found: values.len(),
            });
        }

        let (data_type, var_type, unit) = derive(&values, else_value.as_ref())?;

        let key = NodeKey::from_hasher(
            StableHasher::new("case_when")
                .sequence("conditions", conditions.iter().map(|c| c.key()))
                .sequence("values", values.iter().map(|v| v.key()))
                .optional("else", else_value.as_ref().map(|e| e.key())),
        );
        let record = NodeRecord::new(key, NodeTag::CaseWhen, "case_when", "CASE")
            .with_attribute("data_type", &data_type)
            .with_attribute("unit", &unit);
        let lineage = {
            let mut deps = Dependencies::new();
            deps.extend(EdgeKind::When, conditions.iter().map(|c| c.lineage()))
                .extend(EdgeKind::Then, values.iter().map(|v| v.lineage()));
            if let Some(e) = &else_value {
                deps.push(EdgeKind::Else, e.lineage());
            }
            Lineage::build(record, &deps)
        };

        Ok(Self {
            conditions,
            values,
            else_value,
            data_type,
            var_type,
            unit,
            lineage,
        })
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.lineage.set_macro_group(group);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn values(&self) -> &[Operand] {
        &self.values
    }

    pub fn else_value(&self) -> Option<&Operand> {
        self.else_value.as_ref()
    }

    /// Pairs of (condition, value) in branch order
    pub fn branches(&self) -> impl Iterator<Item = (&Condition, &Operand)> {
        self.conditions.iter().zip(self.values.iter())
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// `WARN` when an else branch exists, `PASS` otherwise
    pub fn on_null(&self) -> OnNull {
        if self.else_value.is_some() {
            OnNull::Warn
        } else {
            OnNull::Pass
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.conditions.iter().any(Condition::is_aggregate)
            || self.values.iter().any(Operand::is_aggregate)
            || self.else_value.as_ref().is_some_and(Operand::is_aggregate)
    }
}

impl Provenance for CaseWhen {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

/// Result type and unit over every non-NULL branch value
fn derive(values: &[Operand], else_value: Option<&Operand>) -> IrResult<(DataType, VarType, Unit)> {
    let mut data_type = DataType::Null;
    let mut var_type = None;
    let mut unit: Option<Unit> = None;

    for value in values.iter().chain(else_value) {
        if value.is_null_literal() {
            continue;
        }
        let candidate = value.data_type();
        if !data_type.accepts(&candidate) {
            return Err(IrError::TypeMismatch {
                context: "case branch".to_string(),
                expected: data_type.to_string(),
                found: candidate.to_string(),
            });
        }
        data_type = data_type.widen(&candidate);
        var_type.get_or_insert(value.var_type());
        match &unit {
            Some(u) => u.ensure_compatible(&value.unit(), "CASE")?,
            None => unit = Some(value.unit()),
        }
    }

    Ok((
        data_type,
        var_type.unwrap_or_default(),
        unit.unwrap_or_default(),
    ))
}

#[cfg(test)]
#[path = "case_when_test.rs"]
mod tests;
