use super::*;
use wf_ir::{Column, DataType, NodeTag, Provenance, Schema, Table};

fn staged() -> (Table, Table) {
    let raw = Table::temp("raw", vec![Column::blank("id", DataType::Integer).unwrap()]).unwrap();
    let staged = Table::core("stg")
        .source(&raw)
        .columns(raw.columns().iter().map(Column::select))
        .build()
        .unwrap();
    (raw, staged)
}

#[test]
fn test_table_records_get_sql_and_reads() {
    let (_, staged) = staged();
    let renderer = Renderer::default();
    let mut graph = staged.graph().clone();

    let written = annotate(&renderer, &staged, &mut graph).unwrap();
    assert!(written >= 3);

    let record = graph.get(staged.key()).unwrap();
    assert_eq!(
        record.attributes.get("sql").map(String::as_str),
        Some(r#"SELECT "raw"."id" FROM "raw""#)
    );
    assert_eq!(record.attributes.get("reads").map(String::as_str), Some("raw"));
}

#[test]
fn test_every_column_is_annotated() {
    let (_, staged) = staged();
    let mut graph = staged.graph().clone();
    annotate(&Renderer::default(), &staged, &mut graph).unwrap();

    let columns = graph.records_with_tag(NodeTag::Column);
    assert!(!columns.is_empty());
    assert!(columns.iter().all(|r| r.attributes.contains_key("sql")));
}

#[test]
fn test_schema_record_is_skipped() {
    let (raw, staged) = staged();
    let mut schema = Schema::new("staging").unwrap();
    schema.add_table(staged.clone()).unwrap();
    schema.add_table(raw).unwrap();
    let mut graph = schema.graph().clone();

    annotate(&Renderer::default(), &schema, &mut graph).unwrap();

    assert!(!graph
        .get(schema.key())
        .unwrap()
        .attributes
        .contains_key("sql"));
    assert!(graph
        .get(staged.key())
        .unwrap()
        .attributes
        .contains_key("sql"));
}
