//! Operator expressions: `left <op> right`, prefix and postfix forms

use crate::error::{IrError, IrResult};
use crate::operand::Operand;
use crate::operator::{Fixity, Operator};
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::types::{DataType, OnNull, VarType};
use crate::value::ValueKind;
use wf_core::{StableHasher, Unit};

/// An operator applied to one or two operands
#[derive(Debug, Clone)]
pub struct Expression {
    operator: Operator,
    left: Operand,
    right: Option<Operand>,
    on_null: OnNull,
    is_primary_key: bool,
    is_event_time: bool,
    data_type: DataType,
    var_type: VarType,
    unit: Unit,
    macro_group: Option<String>,
    lineage: Lineage,
}

impl Expression {
    /// Binary expression `left <op> right`
    pub fn new(
        operator: Operator,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> IrResult<Self> {
        Self::build(operator, left.into(), Some(right.into()))
    }

    /// Prefix (`NOT x`) or postfix (`x DESC`, `x IS NULL`) expression
    pub fn unary(operator: Operator, operand: impl Into<Operand>) -> IrResult<Self> {
        Self::build(operator, operand.into(), None)
    }

    pub fn asc(operand: impl Into<Operand>) -> IrResult<Self> {
        Self::unary(Operator::Asc, operand)
    }

    pub fn desc(operand: impl Into<Operand>) -> IrResult<Self> {
        Self::unary(Operator::Desc, operand)
    }

    fn build(operator: Operator, left: Operand, right: Option<Operand>) -> IrResult<Self> {
        validate_shape(operator, &left, right.as_ref())?;
        let (data_type, var_type, unit) = derive(operator, &left, right.as_ref())?;

        let mut expr = Self {
            operator,
            left,
            right,
            on_null: OnNull::Pass,
            is_primary_key: false,
            is_event_time: false,
            data_type,
            var_type,
            unit,
            macro_group: None,
            lineage: Lineage::pending(),
        };
        expr.relink();
        Ok(expr)
    }

    fn key_for(&self) -> NodeKey {
        NodeKey::from_hasher(
            StableHasher::new("expression")
                .field("operator", self.operator.symbol())
                .field("left", self.left.key())
                .optional("right", self.right.as_ref().map(|r| r.key()))
                .field("on_null", self.on_null)
                .field("primary_key", self.is_primary_key)
                .field("event_time", self.is_event_time),
        )
    }

    fn relink(&mut self) {
        let record = NodeRecord::new(
            self.key_for(),
            NodeTag::Expression,
            format!("{:?}", self.operator).to_lowercase(),
            self.operator.symbol(),
        )
        .with_attribute("data_type", &self.data_type)
        .with_attribute("unit", &self.unit)
        .with_macro_group(self.macro_group.as_deref());

        let operator = self.operator.lineage();
        let lineage = {
            let mut deps = Dependencies::new();
            deps.push(EdgeKind::Operator, &operator)
                .push(EdgeKind::LeftOperand, self.left.lineage());
            if let Some(right) = &self.right {
                deps.push(EdgeKind::RightOperand, right.lineage());
            }
            Lineage::build(record, &deps)
        };
        self.lineage = lineage;
    }

    pub fn with_on_null(mut self, on_null: OnNull) -> Self {
        self.on_null = on_null;
        self.relink();
        self
    }

    /// Mark the expression as defining (part of) a primary key
    pub fn with_primary_key(mut self, flag: bool) -> Self {
        self.is_primary_key = flag;
        self.relink();
        self
    }

    pub fn with_event_time(mut self, flag: bool) -> Self {
        self.is_event_time = flag;
        self.relink();
        self
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.macro_group = Some(group.to_string());
        self.lineage.set_macro_group(group);
        self
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn left(&self) -> &Operand {
        &self.left
    }

    pub fn right(&self) -> Option<&Operand> {
        self.right.as_ref()
    }

    pub fn on_null(&self) -> OnNull {
        self.on_null
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn is_event_time(&self) -> bool {
        self.is_event_time
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

    pub fn is_aggregate(&self) -> bool {
        self.left.is_aggregate() || self.right.as_ref().is_some_and(|r| r.is_aggregate())
    }

    /// True for `BETWEEN <bound> AND <bound>` used as a window frame
    pub fn is_frame(&self) -> bool {
        self.operator == Operator::Between
            && self
                .left
                .as_value()
                .is_some_and(|v| v.as_frame_bound().is_some())
    }
}

impl Provenance for Expression {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn invalid_operator(operator: Operator, context: &str) -> IrError {
    IrError::InvalidOperator {
        operator: operator.symbol().to_string(),
        context: context.to_string(),
    }
}

fn validate_shape(operator: Operator, left: &Operand, right: Option<&Operand>) -> IrResult<()> {
    if operator.is_set_operation() {
        return Err(invalid_operator(operator, "in an expression; build a union table"));
    }

    match (operator.fixity(), right) {
        (Fixity::Binary, None) => {
            return Err(invalid_operator(operator, "without a right operand"));
        }
        (Fixity::Prefix | Fixity::Postfix, Some(_)) => {
            return Err(invalid_operator(operator, "with a right operand"));
        }
        _ => {}
    }

    let operands = std::iter::once(left).chain(right);
    if operator.is_join() {
        for operand in operands {
            if operand.as_table().is_none() {
                return Err(IrError::WrongVariant {
                    container: "join expression".to_string(),
                    variant: operand.tag().to_string(),
                });
            }
        }
        return Ok(());
    }
    for operand in operands {
        if operand.as_table().is_some() {
            return Err(IrError::WrongVariant {
                container: format!("'{}' expression", operator.symbol()),
                variant: "table".to_string(),
            });
        }
    }

    match operator {
        Operator::In | Operator::NotIn => {
            let ok = right.and_then(|r| r.as_value()).is_some_and(|v| {
                matches!(
                    v.kind(),
                    ValueKind::Tuple(_) | ValueKind::List(_) | ValueKind::Subquery(_)
                )
            });
            if !ok {
                return Err(IrError::TypeMismatch {
                    context: format!("right side of {}", operator.symbol()),
                    expected: "tuple, list or subquery".to_string(),
                    found: right.map(|r| r.tag().to_string()).unwrap_or_default(),
                });
            }
        }
        Operator::Between => {
            let left_bound = left.as_value().and_then(|v| v.as_frame_bound());
            let right_value = right.and_then(|r| r.as_value());
            let ok = match left_bound {
                Some(_) => right_value.is_some_and(|v| v.as_frame_bound().is_some()),
                None => right_value
                    .is_some_and(|v| matches!(v.kind(), ValueKind::Tuple(items) if items.len() == 2)),
            };
            if !ok {
                return Err(IrError::TypeMismatch {
                    context: "BETWEEN".to_string(),
                    expected: "two frame bounds, or a subject and a 2-tuple".to_string(),
                    found: right.map(|r| r.tag().to_string()).unwrap_or_default(),
                });
            }
        }
        _ => {}
    }
    Ok(())
}

/// Compare units unless either side is unitless data or a NULL literal
fn check_comparable(operator: Operator, left: &Operand, right: &Operand) -> IrResult<()> {
    if left.is_null_literal() || right.is_null_literal() {
        return Ok(());
    }
    let (lu, ru) = (left.unit(), right.unit());
    if lu.is_dimensionless() || ru.is_dimensionless() {
        return Ok(());
    }
    lu.ensure_compatible(&ru, operator.symbol())?;
    Ok(())
}

fn derive(
    operator: Operator,
    left: &Operand,
    right: Option<&Operand>,
) -> IrResult<(DataType, VarType, Unit)> {
    let boolean = (DataType::Boolean, VarType::Boolean, Unit::dimensionless());

    if operator.is_join() {
        return Ok((DataType::Unknown, VarType::Unknown, Unit::dimensionless()));
    }
    if operator.is_ordering() {
        return Ok((left.data_type(), left.var_type(), left.unit()));
    }
    if operator.is_predicate() {
        if let Some(right) = right {
            if operator.is_comparison() || operator == Operator::Between {
                check_comparable(operator, left, right)?;
            }
        }
        return Ok(boolean);
    }
    if operator == Operator::Concat {
        return Ok((DataType::Varchar, VarType::Categorical, Unit::dimensionless()));
    }

    // Remaining binary operators are arithmetic.
    let Some(right) = right else {
        return Err(invalid_operator(operator, "without a right operand"));
    };
    let (lt, rt) = (left.data_type(), right.data_type());
    let (lu, ru) = (left.unit(), right.unit());
    let null_side = left.is_null_literal() || right.is_null_literal();

    // An interval's unit describes the shift, not the shifted value.
    if matches!(operator, Operator::Plus | Operator::Minus) {
        if let Some(data_type) = lt.shifted_by(&rt, operator == Operator::Minus) {
            return Ok((data_type, VarType::Temporal, Unit::dimensionless()));
        }
    }

    let (data_type, unit) = match operator {
        Operator::Plus | Operator::Minus => {
            if !null_side {
                lu.ensure_compatible(&ru, operator.symbol())?;
            }
            let data_type = if operator == Operator::Minus && lt.is_temporal() && rt.is_temporal() {
                DataType::Interval
            } else {
                lt.widen(&rt)
            };
            (data_type, lu)
        }
        Operator::Multiply => (lt.widen(&rt), lu.multiply(&ru)?),
        Operator::Divide => {
            let data_type = match lt.widen(&rt) {
                d @ DataType::Decimal { .. } => d,
                DataType::Unknown => DataType::Unknown,
                _ => DataType::Double,
            };
            (data_type, lu.divide(&ru)?)
        }
        Operator::Modulo => (lt.widen(&rt), lu),
        other => return Err(invalid_operator(other, "as an arithmetic operator")),
    };

    let var_type = if data_type.is_temporal() {
        VarType::Temporal
    } else {
        VarType::Numeric
    };
    Ok((data_type, var_type, unit))
}

#[cfg(test)]
#[path = "expression_test.rs"]
mod tests;
