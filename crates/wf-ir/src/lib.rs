//! wf-ir - Intermediate representation for Weft
//!
//! This crate provides the typed node vocabulary used to assemble SQL
//! fragments (values, operators, expressions, functions, columns, tables,
//! conditions, joins, unions and records), the ordered name-unique
//! containers that hold them, and the provenance graph every node builds
//! as it is constructed.

pub mod case_when;
pub mod column;
pub mod condition;
pub mod container;
pub mod error;
pub mod expression;
pub mod function;
pub mod join;
pub mod node;
pub mod operand;
pub mod operator;
pub mod provenance;
pub mod records;
pub mod schema;
pub mod table;
pub mod types;
pub mod value;

pub use case_when::CaseWhen;
pub use column::{Column, ColumnKind, ColumnSource};
pub use condition::Condition;
pub use container::{ColumnList, Member, NamedList, TableList};
pub use error::{IrError, IrResult};
pub use expression::Expression;
pub use function::{Function, FunctionKind, Window};
pub use join::{CompoundJoin, Join};
pub use node::Node;
pub use operand::Operand;
pub use operator::{Fixity, Operator};
pub use provenance::{
    EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance, ProvenanceEdge, ProvenanceGraph,
};
pub use records::Records;
pub use schema::{Pipeline, Schema};
pub use table::{Table, TableBuilder, TableKind, TableSource};
pub use types::{DataType, OnNull, VarType};
pub use value::{FrameBound, Value, ValueKind};
