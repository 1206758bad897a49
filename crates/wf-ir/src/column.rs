//! Columns and what they are computed from

use crate::case_when::CaseWhen;
use crate::error::IrResult;
use crate::expression::Expression;
use crate::function::Function;
use crate::provenance::{Dependencies, EdgeKind, Lineage, NodeKey, NodeRecord, NodeTag, Provenance};
use crate::types::{DataType, OnNull, VarType};
use crate::value::Value;
use wf_core::{ColumnMetadata, ColumnName, StableHasher, TableName, Unit};

/// How a column obtains its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Pass-through of another column, optionally renamed
    Select,
    /// Computed from a function, expression, case or literal
    Core,
    /// Typed NULL placeholder
    Blank,
    /// Read from an external file described by a metadata row
    Source,
    /// `*`
    WildCard,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnKind::Select => "select",
            ColumnKind::Core => "core",
            ColumnKind::Blank => "blank",
            ColumnKind::Source => "source",
            ColumnKind::WildCard => "wildcard",
        };
        write!(f, "{s}")
    }
}

/// Node a column is derived from
#[derive(Debug, Clone)]
pub enum ColumnSource {
    Column(Box<Column>),
    Function(Box<Function>),
    Expression(Box<Expression>),
    CaseWhen(Box<CaseWhen>),
    Value(Box<Value>),
}

impl ColumnSource {
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnSource::Column(c) => c.data_type().clone(),
            ColumnSource::Function(f) => f.data_type().clone(),
            ColumnSource::Expression(e) => e.data_type().clone(),
            ColumnSource::CaseWhen(c) => c.data_type().clone(),
            ColumnSource::Value(v) => v.data_type().clone(),
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            ColumnSource::Column(c) => c.unit().clone(),
            ColumnSource::Function(f) => f.unit().clone(),
            ColumnSource::Expression(e) => e.unit().clone(),
            ColumnSource::CaseWhen(c) => c.unit().clone(),
            ColumnSource::Value(v) => v.unit().clone(),
        }
    }

    pub fn var_type(&self) -> VarType {
        match self {
            ColumnSource::Column(c) => c.var_type(),
            ColumnSource::Function(f) => f.var_type(),
            ColumnSource::Expression(e) => e.var_type(),
            ColumnSource::CaseWhen(c) => c.var_type(),
            ColumnSource::Value(v) => VarType::for_data_type(v.data_type()),
        }
    }

    pub fn on_null(&self) -> OnNull {
        match self {
            ColumnSource::Column(c) => c.on_null(),
            ColumnSource::Expression(e) => e.on_null(),
            ColumnSource::CaseWhen(c) => c.on_null(),
            ColumnSource::Function(_) | ColumnSource::Value(_) => OnNull::Pass,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        match self {
            ColumnSource::Column(c) => c.is_aggregate(),
            ColumnSource::Function(f) => f.is_aggregate(),
            ColumnSource::Expression(e) => e.is_aggregate(),
            ColumnSource::CaseWhen(c) => c.is_aggregate(),
            ColumnSource::Value(_) => false,
        }
    }
}

impl Provenance for ColumnSource {
    fn lineage(&self) -> &Lineage {
        match self {
            ColumnSource::Column(c) => c.lineage(),
            ColumnSource::Function(f) => f.lineage(),
            ColumnSource::Expression(e) => e.lineage(),
            ColumnSource::CaseWhen(c) => c.lineage(),
            ColumnSource::Value(v) => v.lineage(),
        }
    }
}

macro_rules! column_source_from {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ColumnSource {
                fn from(node: $ty) -> Self {
                    ColumnSource::$variant(Box::new(node))
                }
            }
        )*
    };
}

column_source_from! {
    Column => Column,
    Function => Function,
    Expression => Expression,
    CaseWhen => CaseWhen,
    Value => Value,
}

/// A named, typed column.
///
/// `current_table` names the table that currently owns the column. Only a
/// table changes it, when the column is added to that table; qualified
/// references (`"t"."c"`) are rendered from it.
#[derive(Debug, Clone)]
pub struct Column {
    kind: ColumnKind,
    name: ColumnName,
    source: Option<ColumnSource>,
    data_type: DataType,
    var_type: VarType,
    unit: Unit,
    on_null: OnNull,
    is_primary_key: bool,
    is_event_time: bool,
    current_table: Option<TableName>,
    metadata: Option<Box<ColumnMetadata>>,
    macro_group: Option<String>,
    lineage: Lineage,
}

impl Column {
    fn assemble(
        kind: ColumnKind,
        name: ColumnName,
        source: Option<ColumnSource>,
        data_type: DataType,
    ) -> Self {
        let var_type = VarType::for_data_type(&data_type);
        let mut column = Self {
            kind,
            name,
            source,
            data_type,
            var_type,
            unit: Unit::dimensionless(),
            on_null: OnNull::Pass,
            is_primary_key: false,
            is_event_time: false,
            current_table: None,
            metadata: None,
            macro_group: None,
            lineage: Lineage::pending(),
        };
        if let Some(source) = &column.source {
            column.unit = source.unit();
            column.var_type = source.var_type();
            column.on_null = source.on_null();
            if let ColumnSource::Expression(e) = source {
                column.is_primary_key = e.is_primary_key();
                column.is_event_time = e.is_event_time();
            }
        }
        column.relink();
        column
    }

    /// Pass `source` through under its own name
    pub fn select(source: &Column) -> Self {
        Self::select_named(source, source.name.clone())
    }

    /// Pass `source` through under a new name
    pub fn select_as(source: &Column, alias: &str) -> IrResult<Self> {
        Ok(Self::select_named(source, ColumnName::try_new(alias)?))
    }

    fn select_named(source: &Column, name: ColumnName) -> Self {
        let mut column = Self::assemble(
            ColumnKind::Select,
            name,
            Some(ColumnSource::Column(Box::new(source.clone()))),
            source.data_type.clone(),
        );
        column.is_primary_key = source.is_primary_key;
        column.is_event_time = source.is_event_time;
        column.relink();
        column
    }

    /// Column computed from a function, expression, case or literal
    pub fn core(name: &str, source: impl Into<ColumnSource>) -> IrResult<Self> {
        let source = source.into();
        let data_type = source.data_type();
        Ok(Self::assemble(
            ColumnKind::Core,
            ColumnName::try_new(name)?,
            Some(source),
            data_type,
        ))
    }

    /// Typed NULL column
    pub fn blank(name: &str, data_type: DataType) -> IrResult<Self> {
        Ok(Self::assemble(
            ColumnKind::Blank,
            ColumnName::try_new(name)?,
            None,
            data_type,
        ))
    }

    /// Column read from a file, described by one metadata row
    pub fn from_metadata(row: &ColumnMetadata) -> IrResult<Self> {
        let data_type = DataType::parse(&row.data_type)?;
        let mut column = Self::assemble(
            ColumnKind::Source,
            ColumnName::try_new(row.output_name())?,
            None,
            data_type,
        );
        if let Some(var_type) = row.var_type.as_deref() {
            column.var_type = VarType::parse(var_type);
        }
        if let Some(on_null) = row.on_null.as_deref() {
            column.on_null = OnNull::parse(on_null);
        }
        column.unit = row.unit()?;
        column.is_primary_key = row.is_primary_key;
        column.is_event_time = row.is_event_time;
        column.metadata = Some(Box::new(row.clone()));
        column.relink();
        Ok(column)
    }

    /// `*`
    pub fn wildcard() -> Self {
        Self::assemble(
            ColumnKind::WildCard,
            ColumnName::wildcard(),
            None,
            DataType::Unknown,
        )
    }

    fn key_for(&self) -> NodeKey {
        let raw = self
            .metadata
            .as_ref()
            .map(|m| format!("{}.{}.{}", m.schema, m.dataset, m.column_name));
        NodeKey::from_hasher(
            StableHasher::new("column")
                .field("kind", self.kind)
                .field("name", &self.name)
                .field("data_type", &self.data_type)
                .field("var_type", self.var_type)
                .field("unit", &self.unit)
                .field("on_null", self.on_null)
                .field("primary_key", self.is_primary_key)
                .field("event_time", self.is_event_time)
                .optional("table", self.current_table.as_ref())
                .optional("source", self.source.as_ref().map(|s| s.key()))
                .optional("raw", raw),
        )
    }

    fn relink(&mut self) {
        let mut record = NodeRecord::new(
            self.key_for(),
            NodeTag::Column,
            self.kind.to_string(),
            self.name.as_str(),
        )
        .with_attribute("data_type", &self.data_type)
        .with_attribute("unit", &self.unit)
        .with_attribute("var_type", self.var_type)
        .with_macro_group(self.macro_group.as_deref());
        if let Some(table) = &self.current_table {
            record = record.with_attribute("table", table);
        }

        let lineage = {
            let mut deps = Dependencies::new();
            if let Some(source) = &self.source {
                deps.push(EdgeKind::Source, source.lineage());
            }
            Lineage::build(record, &deps)
        };
        self.lineage = lineage;
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self.relink();
        self
    }

    pub fn with_var_type(mut self, var_type: VarType) -> Self {
        self.var_type = var_type;
        self.relink();
        self
    }

    pub fn with_on_null(mut self, on_null: OnNull) -> Self {
        self.on_null = on_null;
        self.relink();
        self
    }

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
        self.relink();
        self
    }

    /// Rebind to the owning table; the key changes with the table name
    pub(crate) fn bind_to(&mut self, table: &TableName) {
        if self.current_table.as_ref() == Some(table) {
            return;
        }
        log::debug!("Binding column '{}' to table '{}'", self.name, table);
        self.current_table = Some(table.clone());
        self.relink();
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn name(&self) -> &ColumnName {
        &self.name
    }

    pub fn source(&self) -> Option<&ColumnSource> {
        self.source.as_ref()
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

    pub fn on_null(&self) -> OnNull {
        self.on_null
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn is_event_time(&self) -> bool {
        self.is_event_time
    }

    pub fn current_table(&self) -> Option<&TableName> {
        self.current_table.as_ref()
    }

    /// Metadata row of a `Source` column
    pub fn metadata(&self) -> Option<&ColumnMetadata> {
        self.metadata.as_deref()
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == ColumnKind::Core && self.source.as_ref().is_some_and(|s| s.is_aggregate())
    }
}

impl Provenance for Column {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

#[cfg(test)]
#[path = "column_test.rs"]
mod tests;
