//! Operands: the node kinds that may appear inside expressions and functions

use crate::case_when::CaseWhen;
use crate::column::Column;
use crate::condition::Condition;
use crate::expression::Expression;
use crate::function::Function;
use crate::provenance::{Lineage, NodeTag, Provenance};
use crate::table::Table;
use crate::types::{DataType, OnNull, VarType};
use crate::value::Value;
use wf_core::Unit;

/// Any node usable as an expression operand or function argument
#[derive(Debug, Clone)]
pub enum Operand {
    Column(Box<Column>),
    Value(Box<Value>),
    Expression(Box<Expression>),
    Function(Box<Function>),
    CaseWhen(Box<CaseWhen>),
    Condition(Box<Condition>),
    /// Only valid as a side of a join expression
    Table(Box<Table>),
}

impl Operand {
    pub fn tag(&self) -> NodeTag {
        match self {
            Operand::Column(_) => NodeTag::Column,
            Operand::Value(_) => NodeTag::Value,
            Operand::Expression(_) => NodeTag::Expression,
            Operand::Function(_) => NodeTag::Function,
            Operand::CaseWhen(_) => NodeTag::CaseWhen,
            Operand::Condition(_) => NodeTag::Condition,
            Operand::Table(_) => NodeTag::Table,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Operand::Column(c) => c.data_type().clone(),
            Operand::Value(v) => v.data_type().clone(),
            Operand::Expression(e) => e.data_type().clone(),
            Operand::Function(f) => f.data_type().clone(),
            Operand::CaseWhen(c) => c.data_type().clone(),
            Operand::Condition(_) => DataType::Boolean,
            Operand::Table(_) => DataType::Unknown,
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Operand::Column(c) => c.unit().clone(),
            Operand::Value(v) => v.unit().clone(),
            Operand::Expression(e) => e.unit().clone(),
            Operand::Function(f) => f.unit().clone(),
            Operand::CaseWhen(c) => c.unit().clone(),
            Operand::Condition(_) | Operand::Table(_) => Unit::dimensionless(),
        }
    }

    pub fn var_type(&self) -> VarType {
        match self {
            Operand::Column(c) => c.var_type(),
            Operand::Value(v) => VarType::for_data_type(v.data_type()),
            Operand::Expression(e) => e.var_type(),
            Operand::Function(f) => f.var_type(),
            Operand::CaseWhen(c) => c.var_type(),
            Operand::Condition(_) => VarType::Boolean,
            Operand::Table(_) => VarType::Unknown,
        }
    }

    pub fn on_null(&self) -> OnNull {
        match self {
            Operand::Column(c) => c.on_null(),
            Operand::Expression(e) => e.on_null(),
            Operand::CaseWhen(c) => c.on_null(),
            _ => OnNull::Pass,
        }
    }

    /// True when evaluating this operand aggregates rows (outside a window)
    pub fn is_aggregate(&self) -> bool {
        match self {
            Operand::Column(c) => c.is_aggregate(),
            Operand::Expression(e) => e.is_aggregate(),
            Operand::Function(f) => f.is_aggregate(),
            Operand::CaseWhen(c) => c.is_aggregate(),
            Operand::Condition(c) => c.is_aggregate(),
            Operand::Value(_) | Operand::Table(_) => false,
        }
    }

    /// Literal NULL (typed or not)
    pub fn is_null_literal(&self) -> bool {
        matches!(self, Operand::Value(v) if v.is_null())
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Operand::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl Provenance for Operand {
    fn lineage(&self) -> &Lineage {
        match self {
            Operand::Column(c) => c.lineage(),
            Operand::Value(v) => v.lineage(),
            Operand::Expression(e) => e.lineage(),
            Operand::Function(f) => f.lineage(),
            Operand::CaseWhen(c) => c.lineage(),
            Operand::Condition(c) => c.lineage(),
            Operand::Table(t) => t.lineage(),
        }
    }
}

macro_rules! operand_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(node: $ty) -> Self {
                    Operand::$variant(Box::new(node))
                }
            }

            impl From<&$ty> for Operand {
                fn from(node: &$ty) -> Self {
                    Operand::$variant(Box::new(node.clone()))
                }
            }
        )*
    };
}

operand_from! {
    Column => Column,
    Value => Value,
    Expression => Expression,
    Function => Function,
    CaseWhen => CaseWhen,
    Condition => Condition,
    Table => Table,
}
