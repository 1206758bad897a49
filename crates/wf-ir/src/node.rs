//! Borrowed view over every IR node kind
//!
//! `Node` is the closed set the renderer and graph annotation dispatch on.
//! Matching on it is exhaustive, so adding a node kind forces every consumer
//! to handle it.

use crate::case_when::CaseWhen;
use crate::column::{Column, ColumnSource};
use crate::condition::Condition;
use crate::expression::Expression;
use crate::function::Function;
use crate::join::{CompoundJoin, Join};
use crate::operand::Operand;
use crate::operator::Operator;
use crate::provenance::{NodeKey, NodeTag, Provenance};
use crate::records::Records;
use crate::schema::Schema;
use crate::table::{Table, TableSource};
use crate::value::{Value, ValueKind};

#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Operator(Operator),
    Value(&'a Value),
    Expression(&'a Expression),
    Function(&'a Function),
    Column(&'a Column),
    CaseWhen(&'a CaseWhen),
    Condition(&'a Condition),
    Table(&'a Table),
    Join(&'a Join),
    CompoundJoin(&'a CompoundJoin),
    Records(&'a Records),
    Schema(&'a Schema),
}

impl<'a> Node<'a> {
    pub fn tag(&self) -> NodeTag {
        match self {
            Node::Operator(_) => NodeTag::Operator,
            Node::Value(_) => NodeTag::Value,
            Node::Expression(_) => NodeTag::Expression,
            Node::Function(_) => NodeTag::Function,
            Node::Column(_) => NodeTag::Column,
            Node::CaseWhen(_) => NodeTag::CaseWhen,
            Node::Condition(_) => NodeTag::Condition,
            Node::Table(_) => NodeTag::Table,
            Node::Join(_) => NodeTag::Join,
            Node::CompoundJoin(_) => NodeTag::CompoundJoin,
            Node::Records(_) => NodeTag::Records,
            Node::Schema(_) => NodeTag::Schema,
        }
    }

    pub fn key(&self) -> NodeKey {
        match self {
            Node::Operator(op) => op.key(),
            Node::Value(n) => n.key().clone(),
            Node::Expression(n) => n.key().clone(),
            Node::Function(n) => n.key().clone(),
            Node::Column(n) => n.key().clone(),
            Node::CaseWhen(n) => n.key().clone(),
            Node::Condition(n) => n.key().clone(),
            Node::Table(n) => n.key().clone(),
            Node::Join(n) => n.key().clone(),
            Node::CompoundJoin(n) => n.key().clone(),
            Node::Records(n) => n.key().clone(),
            Node::Schema(n) => n.key().clone(),
        }
    }

    /// Direct structural children, in declaration order
    pub fn children(&self) -> Vec<Node<'a>> {
        match *self {
            Node::Operator(_) => Vec::new(),
            Node::Value(v) => match v.kind() {
                ValueKind::List(items) | ValueKind::Tuple(items) => {
                    items.iter().map(Node::Value).collect()
                }
                ValueKind::Struct(fields) => fields.iter().map(|(_, v)| Node::Value(v)).collect(),
                ValueKind::Subquery(table) => vec![Node::Table(table)],
                _ => Vec::new(),
            },
            Node::Expression(e) => {
                let mut children = vec![Node::Operator(e.operator()), Node::from(e.left())];
                children.extend(e.right().map(Node::from));
                children
            }
            Node::Function(f) => {
                let window = f.window();
                f.args()
                    .iter()
                    .chain(&window.partition_by)
                    .chain(&window.order_by)
                    .map(Node::from)
                    .chain(window.framing.as_ref().map(Node::Expression))
                    .collect()
            }
            Node::Column(c) => c.source().map(Node::from).into_iter().collect(),
            Node::CaseWhen(c) => c
                .conditions()
                .iter()
                .map(Node::Condition)
                .chain(c.values().iter().map(Node::from))
                .chain(c.else_value().map(Node::from))
                .collect(),
            Node::Condition(c) => c.checks().iter().map(Node::from).collect(),
            Node::Table(t) => {
                let mut children: Vec<Node<'a>> = t.columns().iter().map(Node::Column).collect();
                match t.source() {
                    Some(TableSource::Table(s)) => children.push(Node::Table(s)),
                    Some(TableSource::Join(j)) => children.push(Node::Join(j)),
                    Some(TableSource::CompoundJoin(j)) => children.push(Node::CompoundJoin(j)),
                    Some(TableSource::Union { members, .. }) => {
                        children.extend(members.iter().map(Node::Table));
                    }
                    Some(TableSource::Records(r)) => children.push(Node::Records(r)),
                    Some(TableSource::File(_)) | None => {}
                }
                children.extend(t.ctes().iter().map(Node::Table));
                children.extend(t.where_condition().map(Node::Condition));
                children.extend(t.having_condition().map(Node::Condition));
                children
            }
            Node::Join(j) => {
                let mut children = vec![Node::Expression(j.expression())];
                children.extend(j.condition().map(Node::Condition));
                children
            }
            Node::CompoundJoin(j) => j.joins().iter().map(Node::Join).collect(),
            Node::Records(r) => r
                .columns()
                .iter()
                .map(Node::Column)
                .chain(r.rows().iter().flatten().map(Node::Value))
                .collect(),
            Node::Schema(s) => s.tables().iter().map(Node::Table).collect(),
        }
    }
}

impl<'a> From<&'a Operand> for Node<'a> {
    fn from(operand: &'a Operand) -> Self {
        match operand {
            Operand::Column(c) => Node::Column(c),
            Operand::Value(v) => Node::Value(v),
            Operand::Expression(e) => Node::Expression(e),
            Operand::Function(f) => Node::Function(f),
            Operand::CaseWhen(c) => Node::CaseWhen(c),
            Operand::Condition(c) => Node::Condition(c),
            Operand::Table(t) => Node::Table(t),
        }
    }
}

impl<'a> From<&'a ColumnSource> for Node<'a> {
    fn from(source: &'a ColumnSource) -> Self {
        match source {
            ColumnSource::Column(c) => Node::Column(c),
            ColumnSource::Function(f) => Node::Function(f),
            ColumnSource::Expression(e) => Node::Expression(e),
            ColumnSource::CaseWhen(c) => Node::CaseWhen(c),
            ColumnSource::Value(v) => Node::Value(v),
        }
    }
}

macro_rules! node_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Node<'a> {
                fn from(node: &'a $ty) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

node_from! {
    Value => Value,
    Expression => Expression,
    Function => Function,
    Column => Column,
    CaseWhen => CaseWhen,
    Condition => Condition,
    Table => Table,
    Join => Join,
    CompoundJoin => CompoundJoin,
    Records => Records,
    Schema => Schema,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{FunctionKind, Window};
    use crate::types::DataType;

    #[test]
    fn test_function_children_follow_edge_order() {
        let col = |n: &str| Column::blank(n, DataType::Double).unwrap();
        let f = Function::with_window(
            FunctionKind::Add,
            [col("a"), col("b")],
            Window::new().partition_by([col("p")]).order_by([col("o")]),
        )
        .unwrap();
        let node = Node::from(&f);
        assert_eq!(node.tag(), NodeTag::Function);
        assert_eq!(&node.key(), f.key());
        let names: Vec<String> = node
            .children()
            .iter()
            .map(|c| match c {
                Node::Column(c) => c.name().to_string(),
                other => other.tag().to_string(),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "p", "o"]);
    }

    #[test]
    fn test_expression_children_include_operator() {
        let x = Column::blank("x", DataType::Integer).unwrap();
        let e = Expression::new(Operator::Gt, x, Value::integer(1)).unwrap();
        let tags: Vec<NodeTag> = Node::from(&e).children().iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec![NodeTag::Operator, NodeTag::Column, NodeTag::Value]);
    }
}
