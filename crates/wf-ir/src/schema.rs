//! Schemas and pipelines
//!
//! A schema is a named set of tables sharing settings. Its provenance graph
//! holds an outbound `contains` edge to each of its tables, which is what the
//! schema dependency analysis walks from. A [`Pipeline`] merges several
//! schemas into one graph.

use crate::container::TableList;
use crate::error::{IrError, IrResult};
use crate::provenance::{
    Dependencies, Lineage, NodeKey, NodeRecord, NodeTag, Provenance, ProvenanceGraph,
};
use crate::table::Table;
use wf_core::{SchemaConfig, SchemaName, StableHasher};

/// Named collection of tables
#[derive(Debug, Clone)]
pub struct Schema {
    name: SchemaName,
    settings: Option<SchemaConfig>,
    tables: TableList,
    lineage: Lineage,
}

impl Schema {
    pub fn new(name: &str) -> IrResult<Self> {
        Ok(Self::assemble(SchemaName::try_new(name)?, None))
    }

    /// Schema carrying the settings declared in the project config
    pub fn from_config(config: &SchemaConfig) -> Self {
        Self::assemble(config.name.clone(), Some(config.clone()))
    }

    fn assemble(name: SchemaName, settings: Option<SchemaConfig>) -> Self {
        let mut schema = Self {
            name,
            settings,
            tables: TableList::new(),
            lineage: Lineage::pending(),
        };
        schema.lineage = Lineage::leaf(schema.record());
        schema
    }

    fn record(&self) -> NodeRecord {
        let key = NodeKey::from_hasher(StableHasher::new("schema").field("name", &self.name));
        let mut record = NodeRecord::new(key, NodeTag::Schema, "schema", self.name.as_str())
            .with_attribute("tables", self.tables.list_names().join(","));
        if let Some(settings) = &self.settings {
            if !settings.extensions.is_empty() {
                record = record.with_attribute("extensions", settings.extensions.join(","));
            }
        }
        record
    }

    /// Add a table, linking the schema to it
    pub fn add_table(&mut self, table: Table) -> IrResult<()> {
        self.tables.add(table, false)?;
        let mut lineage = std::mem::replace(&mut self.lineage, Lineage::pending());
        {
            let mut deps = Dependencies::new();
            for table in self.tables.iter() {
                deps.push_contained(table.lineage());
            }
            lineage.reattach(self.record(), &deps);
        }
        self.lineage = lineage;
        Ok(())
    }

    pub fn name(&self) -> &SchemaName {
        &self.name
    }

    pub fn settings(&self) -> Option<&SchemaConfig> {
        self.settings.as_ref()
    }

    pub fn tables(&self) -> &TableList {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

impl Provenance for Schema {
    fn lineage(&self) -> &Lineage {
        &self.lineage
    }
}

/// Several schemas and their merged provenance graph.
///
/// Tables referenced from more than one schema collapse into a single node,
/// so the merged graph connects the schemas through their shared tables.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    schemas: Vec<Schema>,
    graph: ProvenanceGraph,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_schema(&mut self, schema: Schema) -> IrResult<()> {
        if self.schema(schema.name.as_str()).is_some() {
            return Err(IrError::DuplicateName {
                container: "pipeline".to_string(),
                name: schema.name.to_string(),
            });
        }
        log::debug!(
            "Merging schema '{}' ({} nodes) into pipeline graph",
            schema.name,
            schema.graph().node_count()
        );
        self.graph.merge(schema.graph());
        self.schemas.push(schema);
        Ok(())
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name.as_str() == name)
    }

    pub fn graph(&self) -> &ProvenanceGraph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::provenance::EdgeKind;
    use crate::types::DataType;

    fn raw() -> Table {
        Table::temp("raw", vec![Column::blank("id", DataType::Integer).unwrap()]).unwrap()
    }

    fn derived(source: &Table) -> Table {
        Table::core("derived")
            .source(source)
            .columns(source.columns().iter().map(Column::select))
            .build()
            .unwrap()
    }

    #[test]
    fn test_schema_contains_tables() {
        let mut schema = Schema::new("staging").unwrap();
        let key = schema.key().clone();
        schema.add_table(raw()).unwrap();
        assert_eq!(schema.key(), &key);

        let outputs = schema.graph().outputs(schema.key());
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0.label, "raw");
        assert_eq!(outputs[0].1.kind, EdgeKind::Contains);
        assert!(schema.add_table(raw()).is_err());
    }

    #[test]
    fn test_from_config_keeps_settings() {
        let config = SchemaConfig {
            name: SchemaName::try_new("geo").unwrap(),
            connection: Default::default(),
            substitutions: Default::default(),
            extensions: vec!["spatial".to_string()],
        };
        let schema = Schema::from_config(&config);
        assert_eq!(schema.name(), "geo");
        assert_eq!(schema.settings().unwrap().extensions, vec!["spatial"]);
        assert_eq!(
            schema.lineage().record().unwrap().attributes.get("extensions").map(String::as_str),
            Some("spatial")
        );
    }

    #[test]
    fn test_pipeline_shares_table_nodes() {
        let base = raw();
        let mut a = Schema::new("a").unwrap();
        a.add_table(base.clone()).unwrap();
        let mut b = Schema::new("b").unwrap();
        b.add_table(derived(&base)).unwrap();

        let mut pipeline = Pipeline::new();
        pipeline.add_schema(a).unwrap();
        pipeline.add_schema(b).unwrap();
        let graph = pipeline.graph();
        assert_eq!(graph.records_with_tag(NodeTag::Schema).len(), 2);
        assert_eq!(
            graph
                .records_with_tag(NodeTag::Table)
                .iter()
                .filter(|r| r.label == "raw")
                .count(),
            1
        );
        assert!(pipeline.add_schema(Schema::new("a").unwrap()).is_err());
    }
}
