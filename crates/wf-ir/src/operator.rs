//! SQL operators: comparison, logical, arithmetic, ordering, join and set

use crate::provenance::{Lineage, NodeKey, NodeRecord, NodeTag};
use serde::{Deserialize, Serialize};
use wf_core::StableHasher;

/// How an operator is written relative to its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    /// `NOT x`
    Prefix,
    /// `x DESC`, `x IS NULL`
    Postfix,
    /// `x = y`
    Binary,
}

/// A single SQL operator symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Not,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    /// String concatenation (`||`)
    Concat,
    Like,
    ILike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    IsDistinctFrom,
    /// `BETWEEN a AND b`, for range predicates and window frames
    Between,
    Asc,
    Desc,
    InnerJoin,
    LeftJoin,
    RightJoin,
    FullJoin,
    CrossJoin,
    Union,
    UnionAll,
    UnionByName,
}

impl Operator {
    /// SQL text of the operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Concat => "||",
            Operator::Like => "LIKE",
            Operator::ILike => "ILIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::IsDistinctFrom => "IS DISTINCT FROM",
            Operator::Between => "BETWEEN",
            Operator::Asc => "ASC",
            Operator::Desc => "DESC",
            Operator::InnerJoin => "INNER JOIN",
            Operator::LeftJoin => "LEFT JOIN",
            Operator::RightJoin => "RIGHT JOIN",
            Operator::FullJoin => "FULL OUTER JOIN",
            Operator::CrossJoin => "CROSS JOIN",
            Operator::Union => "UNION",
            Operator::UnionAll => "UNION ALL",
            Operator::UnionByName => "UNION ALL BY NAME",
        }
    }

    pub fn fixity(&self) -> Fixity {
        match self {
            Operator::Not => Fixity::Prefix,
            Operator::Asc | Operator::Desc | Operator::IsNull | Operator::IsNotNull => {
                Fixity::Postfix
            }
            _ => Fixity::Binary,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::Lt
                | Operator::LtEq
                | Operator::Gt
                | Operator::GtEq
                | Operator::IsDistinctFrom
        )
    }

    /// Operators that join two checks inside a condition
    pub fn is_link(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Plus
                | Operator::Minus
                | Operator::Multiply
                | Operator::Divide
                | Operator::Modulo
        )
    }

    /// Operators whose result is a boolean
    pub fn is_predicate(&self) -> bool {
        self.is_comparison()
            || self.is_link()
            || matches!(
                self,
                Operator::Not
                    | Operator::Like
                    | Operator::ILike
                    | Operator::In
                    | Operator::NotIn
                    | Operator::IsNull
                    | Operator::IsNotNull
                    | Operator::Between
            )
    }

    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Asc | Operator::Desc)
    }

    pub fn is_join(&self) -> bool {
        matches!(
            self,
            Operator::InnerJoin
                | Operator::LeftJoin
                | Operator::RightJoin
                | Operator::FullJoin
                | Operator::CrossJoin
        )
    }

    pub fn is_set_operation(&self) -> bool {
        matches!(
            self,
            Operator::Union | Operator::UnionAll | Operator::UnionByName
        )
    }

    /// Stable provenance key of the operator leaf
    pub fn key(&self) -> NodeKey {
        NodeKey::from_hasher(StableHasher::new("operator").field("symbol", self.symbol()))
    }

    /// Single-node lineage for the operator leaf
    pub fn lineage(&self) -> Lineage {
        Lineage::leaf(NodeRecord::new(
            self.key(),
            NodeTag::Operator,
            format!("{self:?}").to_lowercase(),
            self.symbol(),
        ))
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
