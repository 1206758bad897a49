//! Tables: the relational nodes of the IR
//!
//! A table owns its columns. Every column added to a table is rebound to it
//! (its `current_table` names this table), at construction and again on
//! `add_column`. The primary key and event time are kept as column names so
//! they always resolve to the columns the table currently holds.
//!
//! Table keys are `(kind, name)`: mutating a table replaces its record in
//! place and adds new edges, while everything it was built from stays in the
//! graph.

use crate::column::{Column, ColumnKind};
use crate::condition::Condition;
use crate::container::{ColumnList, TableList};
use crate::error::{IrError, IrResult};
use crate::expression::Expression;
use crate::function::{Function, FunctionKind};
use crate::join::{CompoundJoin, Join};
use crate::operand::Operand;
use crate::operator::Operator;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::records::Records;
use crate::types::DataType;
use crate::value::Value;
use wf_core::{
    group_by_dataset, ColumnMetadata, ColumnName, FileMetadata, FilterAction, StableHasher,
    TableName,
};

/// Table variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// A fresh SELECT over a source
    Core,
    /// Re-exposes another table under an alias
    Select,
    /// Another table inlined in a FROM clause
    Subquery,
    /// Set operation over member tables
    Union,
    /// Inline `VALUES` rows
    FromRecords,
    /// Temporary table declared by its columns
    Temp,
    /// Columns read from an external file
    SourceFile,
}

impl TableKind {
    /// Variants that may be declared in a `WITH` clause
    pub fn is_cte_capable(self) -> bool {
        matches!(
            self,
            TableKind::Core
                | TableKind::Union
                | TableKind::FromRecords
                | TableKind::SourceFile
                | TableKind::Subquery
        )
    }

    fn column_kinds(self) -> &'static [ColumnKind] {
        match self {
            TableKind::Core => &[
                ColumnKind::Select,
                ColumnKind::Core,
                ColumnKind::Blank,
                ColumnKind::WildCard,
            ],
            TableKind::Select | TableKind::Subquery => &[ColumnKind::Select],
            TableKind::Union | TableKind::FromRecords | TableKind::Temp => &[ColumnKind::Blank],
            TableKind::SourceFile => &[ColumnKind::Source],
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TableKind::Core => "core",
            TableKind::Select => "select",
            TableKind::Subquery => "subquery",
            TableKind::Union => "union",
            TableKind::FromRecords => "from_records",
            TableKind::Temp => "temp",
            TableKind::SourceFile => "source_file",
        };
        write!(f, "{s}")
    }
}

/// What a table reads from
#[derive(Debug, Clone)]
pub enum TableSource {
    Table(Box<Table>),
    Join(Box<Join>),
    CompoundJoin(Box<CompoundJoin>),
    Union {
        members: TableList,
        operator: Operator,
    },
    Records(Box<Records>),
    File(Box<FileMetadata>),
}

impl From<Table> for TableSource {
    fn from(table: Table) -> Self {
        TableSource::Table(Box::new(table))
    }
}

impl From<&Table> for TableSource {
    fn from(table: &Table) -> Self {
        TableSource::Table(Box::new(table.clone()))
    }
}

impl From<Join> for TableSource {
    fn from(join: Join) -> Self {
        TableSource::Join(Box::new(join))
    }
}

impl From<CompoundJoin> for TableSource {
    fn from(join: CompoundJoin) -> Self {
        TableSource::CompoundJoin(Box::new(join))
    }
}

/// A relational node with ordered columns, keys, filters and CTEs
#[derive(Debug, Clone)]
pub struct Table {
    kind: TableKind,
    name: TableName,
    columns: ColumnList,
    source: Option<TableSource>,
    primary_key: Vec<ColumnName>,
    static_primary_key: Vec<ColumnName>,
    event_time: Option<ColumnName>,
    distinct: bool,
    group_by: bool,
    where_condition: Option<Condition>,
    having_condition: Option<Condition>,
    ctes: TableList,
    macro_group: Option<String>,
    lineage: Lineage,
}

/// Collects the parts of a table before validating them in [`TableBuilder::build`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    kind: TableKind,
    name: String,
    columns: Vec<Column>,
    source: Option<TableSource>,
    primary_key: Option<Vec<String>>,
    event_time: Option<String>,
    distinct: bool,
    group_by: bool,
    where_condition: Option<Condition>,
    having_condition: Option<Condition>,
    ctes: Vec<Table>,
    macro_group: Option<String>,
}

impl TableBuilder {
    fn new(kind: TableKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            columns: Vec::new(),
            source: None,
            primary_key: None,
            event_time: None,
            distinct: false,
            group_by: false,
            where_condition: None,
            having_condition: None,
            ctes: Vec::new(),
            macro_group: None,
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        self.columns.extend(columns);
        self
    }

    /// Table, join or compound join to read from
    pub fn source(mut self, source: impl Into<TableSource>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Explicit primary key; defaults to the columns flagged as key columns
    pub fn primary_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Explicit event time; defaults to the first column flagged as one
    pub fn event_time(mut self, name: &str) -> Self {
        self.event_time = Some(name.to_string());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn group_by(mut self, group_by: bool) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn where_condition(mut self, condition: Condition) -> Self {
        self.where_condition = Some(condition);
        self
    }

    pub fn having_condition(mut self, condition: Condition) -> Self {
        self.having_condition = Some(condition);
        self
    }

    /// Append a CTE; CTEs are emitted in the order they are added
    pub fn cte(mut self, table: Table) -> Self {
        self.ctes.push(table);
        self
    }

    pub fn ctes<I>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = Table>,
    {
        self.ctes.extend(tables);
        self
    }

    pub fn macro_group(mut self, group: &str) -> Self {
        self.macro_group = Some(group.to_string());
        self
    }

    pub fn build(self) -> IrResult<Table> {
        let name = TableName::try_new(self.name)?;

        let mut columns = ColumnList::restricted(self.kind.column_kinds());
        for mut column in self.columns {
            column.bind_to(&name);
            columns.add(column, false)?;
        }

        let primary_key = match self.primary_key {
            Some(names) => names
                .into_iter()
                .map(|n| resolve(&name, &columns, &n))
                .collect::<IrResult<Vec<_>>>()?,
            None => columns
                .iter()
                .filter(|c| c.is_primary_key())
                .map(|c| c.name().clone())
                .collect(),
        };
        let event_time = match self.event_time {
            Some(n) => Some(resolve(&name, &columns, &n)?),
            None => columns
                .iter()
                .find(|c| c.is_event_time())
                .map(|c| c.name().clone()),
        };

        let mut ctes = TableList::new();
        for cte in self.ctes {
            push_cte(&mut ctes, cte)?;
        }

        let mut table = Table {
            kind: self.kind,
            name,
            columns,
            source: self.source,
            primary_key,
            static_primary_key: Vec::new(),
            event_time,
            distinct: self.distinct,
            group_by: self.group_by,
            where_condition: self.where_condition,
            having_condition: self.having_condition,
            ctes,
            macro_group: self.macro_group,
            lineage: Lineage::pending(),
        };
        table.refresh_static_key();
        table.relink();
        log::debug!(
            "Built {} table '{}' with {} column(s)",
            table.kind,
            table.name,
            table.columns.len()
        );
        Ok(table)
    }
}

fn resolve(table: &TableName, columns: &ColumnList, name: &str) -> IrResult<ColumnName> {
    columns
        .get(name)
        .map(|c| c.name().clone())
        .ok_or_else(|| IrError::UnknownColumn {
            table: table.to_string(),
            column: name.to_string(),
        })
}

/// Add a CTE unless the same definition is already listed
fn push_cte(ctes: &mut TableList, table: Table) -> IrResult<()> {
    if !table.kind.is_cte_capable() {
        return Err(IrError::InvalidCte {
            table: table.name.to_string(),
            variant: table.kind.to_string(),
        });
    }
    ctes.add_unless_same(table)
}

impl Table {
    /// Start a fresh SELECT
    pub fn core(name: &str) -> TableBuilder {
        TableBuilder::new(TableKind::Core, name)
    }

    /// Set operation over `members`.
    ///
    /// Members must expose identical column names in identical order, with
    /// matching data type, unit and null policy. The union's columns are
    /// blank copies of the first member's; member CTEs are hoisted to the
    /// union so members can be emitted as bare SELECTs.
    pub fn union(name: &str, members: Vec<Table>, operator: Operator) -> IrResult<TableBuilder> {
        if !operator.is_set_operation() {
            return Err(IrError::InvalidOperator {
                operator: operator.symbol().to_string(),
                context: "as a union operator".to_string(),
            });
        }
        let Some(first) = members.first() else {
            return Err(IrError::Empty {
                what: "union members".to_string(),
            });
        };
        for member in &members[1..] {
            check_union_member(first, member)?;
        }

        let columns = first
            .columns
            .iter()
            .map(|c| {
                Ok(Column::blank(c.name().as_str(), c.data_type().clone())?
                    .with_unit(c.unit().clone())
                    .with_var_type(c.var_type())
                    .with_on_null(c.on_null()))
            })
            .collect::<IrResult<Vec<_>>>()?;
        let primary_key: Vec<String> = first.primary_key.iter().map(|n| n.to_string()).collect();
        let event_time = first.event_time.clone();
        let hoisted: Vec<Table> = members
            .iter()
            .flat_map(|m| m.ctes.iter().cloned())
            .collect();

        let mut builder = TableBuilder::new(TableKind::Union, name)
            .columns(columns)
            .primary_key(primary_key)
            .ctes(hoisted);
        if let Some(event_time) = event_time {
            builder = builder.event_time(event_time.as_str());
        }
        builder.source = Some(TableSource::Union {
            members: TableList::from_items(members)?,
            operator,
        });
        Ok(builder)
    }

    /// Re-expose `source` under `alias`, keeping its keys
    pub fn select(source: &Table, alias: &str) -> IrResult<Table> {
        Self::reexpose(TableKind::Select, source, alias)
    }

    /// Inline `inner` in a FROM clause under `alias`
    pub fn subquery(inner: &Table, alias: &str) -> IrResult<Table> {
        Self::reexpose(TableKind::Subquery, inner, alias)
    }

    fn reexpose(kind: TableKind, source: &Table, alias: &str) -> IrResult<Table> {
        let mut builder = TableBuilder::new(kind, alias)
            .columns(source.columns.iter().map(Column::select))
            .primary_key(source.primary_key.iter().map(|n| n.to_string()));
        if let Some(event_time) = &source.event_time {
            builder = builder.event_time(event_time.as_str());
        }
        builder.source = Some(TableSource::Table(Box::new(source.clone())));
        builder.build()
    }

    /// Table whose rows are given inline
    pub fn from_records(name: &str, records: Records) -> IrResult<Table> {
        let mut builder =
            TableBuilder::new(TableKind::FromRecords, name).columns(records.columns().iter().cloned());
        builder.source = Some(TableSource::Records(Box::new(records)));
        builder.build()
    }

    /// Temporary table declared by blank columns
    pub fn temp(name: &str, columns: Vec<Column>) -> IrResult<Table> {
        TableBuilder::new(TableKind::Temp, name).columns(columns).build()
    }

    /// Table reading `file`, with one source column per matching metadata row.
    ///
    /// Rows for other datasets are ignored; the rest are ordered by ordinal
    /// position. Filter values and regex patterns become the WHERE condition,
    /// evaluated against the raw file columns.
    pub fn source_file(file: &FileMetadata, rows: &[ColumnMetadata]) -> IrResult<Table> {
        let groups = group_by_dataset(rows);
        let rows = groups
            .get(&(file.schema.clone(), file.dataset.clone()))
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| IrError::Empty {
                what: format!("column metadata for '{}.{}'", file.schema, file.dataset),
            })?;

        let columns = rows
            .iter()
            .map(Column::from_metadata)
            .collect::<IrResult<Vec<_>>>()?;
        let mut checks = Vec::new();
        for row in rows {
            checks.extend(source_filters(row)?);
        }

        let mut builder = TableBuilder::new(TableKind::SourceFile, &file.dataset)
            .columns(columns)
            .distinct(file.distinct);
        if !checks.is_empty() {
            builder = builder.where_condition(Condition::all(checks)?);
        }
        builder.source = Some(TableSource::File(Box::new(file.clone())));
        builder.build()
    }

    fn record(&self) -> NodeRecord {
        let key = NodeKey::from_hasher(
            StableHasher::new("table")
                .field("kind", self.kind)
                .field("name", &self.name),
        );
        let mut record = NodeRecord::new(key, NodeTag::Table, self.kind.to_string(), self.name.as_str())
            .with_attribute("columns", self.columns.list_names().join(","))
            .with_attribute("primary_key", join_names(&self.primary_key))
            .with_macro_group(self.macro_group.as_deref());
        if let Some(event_time) = &self.event_time {
            record = record.with_attribute("event_time", event_time);
        }
        if let Some(TableSource::File(file)) = &self.source {
            record = record.with_attribute("path", &file.path);
        }
        record
    }

    fn dependencies(&self) -> Dependencies<'_> {
        let mut deps = Dependencies::new();
        deps.extend(EdgeKind::Column, self.columns.iter().map(|c| c.lineage()));
        match &self.source {
            Some(TableSource::Table(t)) => {
                deps.push(EdgeKind::Source, t.lineage());
            }
            Some(TableSource::Join(j)) => {
                deps.push(EdgeKind::Source, j.lineage());
            }
            Some(TableSource::CompoundJoin(j)) => {
                deps.push(EdgeKind::Source, j.lineage());
            }
            Some(TableSource::Union { members, .. }) => {
                deps.extend(EdgeKind::Member, members.iter().map(|m| m.lineage()));
            }
            Some(TableSource::Records(r)) => {
                deps.push(EdgeKind::Records, r.lineage());
            }
            Some(TableSource::File(_)) | None => {}
        }
        deps.extend(EdgeKind::Cte, self.ctes.iter().map(|t| t.lineage()));
        if let Some(condition) = &self.where_condition {
            deps.push(EdgeKind::Where, condition.lineage());
        }
        if let Some(condition) = &self.having_condition {
            deps.push(EdgeKind::Having, condition.lineage());
        }
        deps
    }

    fn relink(&mut self) {
        let lineage = {
            let deps = self.dependencies();
            Lineage::build(self.record(), &deps)
        };
        self.lineage = lineage;
    }

    /// Refresh this table's record and edges after a mutation
    fn reattach(&mut self) {
        let mut lineage = std::mem::replace(&mut self.lineage, Lineage::pending());
        {
            let deps = self.dependencies();
            lineage.reattach(self.record(), &deps);
        }
        self.lineage = lineage;
    }

    fn refresh_static_key(&mut self) {
        self.static_primary_key = self
            .primary_key
            .iter()
            .filter(|n| Some(*n) != self.event_time.as_ref())
            .cloned()
            .collect();
    }

    /// Add a column, rebinding it to this table
    pub fn add_column(&mut self, mut column: Column, override_existing: bool) -> IrResult<()> {
        column.bind_to(&self.name);
        self.columns.add(column, override_existing)?;
        self.refresh_static_key();
        self.reattach();
        Ok(())
    }

    /// Replace the primary key; every name must be a column of this table
    pub fn set_primary_key<I, S>(&mut self, names: I) -> IrResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let primary_key = names
            .into_iter()
            .map(|n| resolve(&self.name, &self.columns, n.as_ref()))
            .collect::<IrResult<Vec<_>>>()?;
        self.primary_key = primary_key;
        self.refresh_static_key();
        self.reattach();
        Ok(())
    }

    /// Set or clear the event-time column
    pub fn set_event_time(&mut self, name: Option<&str>) -> IrResult<()> {
        self.event_time = name
            .map(|n| resolve(&self.name, &self.columns, n))
            .transpose()?;
        self.refresh_static_key();
        self.reattach();
        Ok(())
    }

    pub fn with_macro_group(mut self, group: &str) -> Self {
        self.macro_group = Some(group.to_string());
        self.lineage.set_macro_group(group);
        self
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn name(&self) -> &TableName {
        &self.name
    }

    pub fn columns(&self) -> &ColumnList {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn source(&self) -> Option<&TableSource> {
        self.source.as_ref()
    }

    pub fn primary_key(&self) -> &[ColumnName] {
        &self.primary_key
    }

    /// Primary key without the event-time column
    pub fn static_primary_key(&self) -> &[ColumnName] {
        &self.static_primary_key
    }

    pub fn event_time(&self) -> Option<&ColumnName> {
        self.event_time.as_ref()
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }

    pub fn is_grouped(&self) -> bool {
        self.group_by
    }

    pub fn where_condition(&self) -> Option<&Condition> {
        self.where_condition.as_ref()
    }

    pub fn having_condition(&self) -> Option<&Condition> {
        self.having_condition.as_ref()
    }

    pub fn ctes(&self) -> &TableList {
        &self.ctes
    }

    /// Identity of the whole definition.
    ///
    /// [`Provenance::key`] only covers kind and name; this also covers
    /// columns, source, CTEs and conditions.
    pub fn definition_key(&self) -> NodeKey {
        self.dependencies().fingerprint(self.lineage.key())
    }

    /// CTEs already declared by the immediate source.
    ///
    /// A source table, join or compound join declares its own CTEs where it
    /// is emitted, so they are left out of this table's `WITH` clause. Union
    /// members are emitted as bare SELECTs and declare nothing.
    pub fn source_ctes(&self) -> Vec<&Table> {
        match &self.source {
            Some(TableSource::Table(t)) => t.ctes.iter().collect(),
            Some(TableSource::Join(j)) => j.ctes().iter().collect(),
            Some(TableSource::CompoundJoin(j)) => j.ctes().iter().collect(),
            _ => Vec::new(),
        }
    }
}

impl Provenance for Table {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

fn join_names(names: &[ColumnName]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn check_union_member(first: &Table, member: &Table) -> IrResult<()> {
    let mismatch = |detail: String| IrError::UnionMismatch {
        member: member.name.to_string(),
        detail,
    };
    let (expected, found) = (first.columns.list_names(), member.columns.list_names());
    if expected != found {
        return Err(mismatch(format!(
            "columns [{}] vs [{}]",
            expected.join(", "),
            found.join(", ")
        )));
    }
    for (a, b) in first.columns.iter().zip(member.columns.iter()) {
        if a.data_type() != b.data_type() {
            return Err(mismatch(format!(
                "column '{}' is {} vs {}",
                a.name(),
                a.data_type(),
                b.data_type()
            )));
        }
        if a.unit() != b.unit() {
            return Err(mismatch(format!(
                "column '{}' has unit '{}' vs '{}'",
                a.name(),
                a.unit(),
                b.unit()
            )));
        }
        if a.on_null() != b.on_null() {
            return Err(mismatch(format!(
                "column '{}' has on_null {} vs {}",
                a.name(),
                a.on_null(),
                b.on_null()
            )));
        }
    }
    Ok(())
}

/// WHERE checks for one metadata row, against the raw file column
fn source_filters(row: &ColumnMetadata) -> IrResult<Vec<Operand>> {
    let mut checks = Vec::new();
    if row.filter_values.is_empty() && row.regex.is_none() {
        return Ok(checks);
    }
    let raw = Column::blank(&row.column_name, DataType::parse(&row.data_type)?)?;
    let text = Function::new(FunctionKind::Cast(DataType::Varchar), [raw])?;

    if !row.filter_values.is_empty() {
        let values = Value::tuple(row.filter_values.iter().map(Value::varchar).collect())?;
        let operator = match row.on_filter {
            FilterAction::Keep => Operator::In,
            FilterAction::Drop => Operator::NotIn,
        };
        checks.push(Expression::new(operator, &text, values)?.into());
    }
    if let Some(pattern) = &row.regex {
        let matches = Function::new(
            FunctionKind::RegexpMatches,
            [Operand::from(&text), Operand::from(Value::varchar(pattern.as_str()))],
        )?;
        checks.push(matches.into());
    }
    Ok(checks)
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
