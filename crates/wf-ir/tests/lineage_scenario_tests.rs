//! End-to-end IR construction scenarios: metadata rows to tables, windows,
//! unions and the merged provenance graph

use wf_core::{ColumnMetadata, FileMetadata, Unit};
use wf_ir::{
    Column, Condition, DataType, EdgeKind, Expression, FrameBound, Function, FunctionKind,
    NodeTag, Operator, Pipeline, Provenance, Schema, Table, TableKind, Value, Window,
};

const TRIPS_COLUMNS: &str = r#"
- schema: raw
  dataset: trips
  column_name: trip_id
  data_type: BIGINT
  is_primary_key: true
  ordinal_position: 1
- schema: raw
  dataset: trips
  column_name: started_at
  data_type: TIMESTAMP
  is_primary_key: true
  is_event_time: true
  ordinal_position: 2
- schema: raw
  dataset: trips
  column_name: distance_m
  column_alias: distance
  data_type: DOUBLE
  source_unit: m
  target_unit: km
  precision: 3
  ordinal_position: 3
- schema: raw
  dataset: trips
  column_name: city
  data_type: VARCHAR
  filter_values: [test, demo]
  on_filter: drop
  ordinal_position: 4
"#;

const TRIPS_FILE: &str = r#"
schema: raw
dataset: trips
path: data/trips_*.csv
distinct: true
"#;

fn trips() -> Table {
    let rows = ColumnMetadata::rows_from_yaml(TRIPS_COLUMNS).unwrap();
    let file: FileMetadata = serde_yaml::from_str(TRIPS_FILE).unwrap();
    Table::source_file(&file, &rows).unwrap()
}

// ── Source files ────────────────────────────────────────────────────────

#[test]
fn test_source_file_from_metadata() {
    let t = trips();
    assert_eq!(t.kind(), TableKind::SourceFile);
    assert_eq!(
        t.columns().list_names(),
        vec!["trip_id", "started_at", "distance", "city"]
    );
    let pk: Vec<&str> = t.static_primary_key().iter().map(|n| n.as_str()).collect();
    assert_eq!(pk, vec!["trip_id"]);
    assert_eq!(t.column("distance").unwrap().unit().to_string(), "km");
    assert_eq!(t.where_condition().unwrap().checks().len(), 1);
}

// ── Windowed staging table ──────────────────────────────────────────────

#[test]
fn test_rolling_distance_lineage() {
    let src = trips();
    let distance = src.column("distance").unwrap();
    let city = src.column("city").unwrap();
    let started = src.column("started_at").unwrap();

    let frame = Expression::new(
        Operator::Between,
        Value::frame_range(FrameBound::Preceding(1), Unit::parse("h").unwrap()).unwrap(),
        Value::frame_bound(FrameBound::CurrentRow),
    )
    .unwrap();
    let rolling = Function::with_window(
        FunctionKind::Sum,
        [distance],
        Window::new()
            .partition_by([city])
            .order_by([started])
            .framing(frame),
    )
    .unwrap();
    assert_eq!(rolling.unit().to_string(), "km");
    assert!(!rolling.is_aggregate());

    let staged = Table::core("stg_trips")
        .source(&src)
        .column(Column::select(src.column("trip_id").unwrap()))
        .column(Column::select(started))
        .column(Column::core("distance_1h", rolling.clone()).unwrap())
        .cte(src.clone())
        .build()
        .unwrap();

    let graph = staged.graph();
    assert!(graph.contains(rolling.key()));
    assert!(graph.contains(src.key()));
    assert_eq!(graph.in_degree(rolling.key()), 4);

    let upstream: Vec<&str> = graph
        .ancestors(staged.key())
        .iter()
        .filter(|r| r.tag == NodeTag::Table)
        .map(|r| r.label.as_str())
        .collect();
    assert_eq!(upstream, vec!["trips"]);

    let ctes: Vec<_> = graph
        .inputs(staged.key())
        .into_iter()
        .filter(|(_, e)| e.kind == EdgeKind::Cte)
        .collect();
    assert_eq!(ctes.len(), 1);
}

// ── Aggregation with HAVING ─────────────────────────────────────────────

#[test]
fn test_grouped_table_with_having() {
    let src = trips();
    let city = Column::select(src.column("city").unwrap());
    let total = Function::new(FunctionKind::Sum, [src.column("distance").unwrap()]).unwrap();
    let long = Expression::new(
        Operator::Gt,
        &total,
        Value::double(100.0).unwrap().with_unit(Unit::parse("km").unwrap()).unwrap(),
    )
    .unwrap();
    let having = Condition::single(long).unwrap();
    assert!(having.is_aggregate());

    let t = Table::core("city_totals")
        .source(&src)
        .column(city)
        .column(Column::core("total_distance", total).unwrap())
        .group_by(true)
        .having_condition(having)
        .primary_key(["city"])
        .build()
        .unwrap();
    assert!(t.is_grouped());
    assert!(t.column("total_distance").unwrap().is_aggregate());
    assert!(!t.column("city").unwrap().is_aggregate());
}

#[test]
fn test_unit_mismatch_in_having_is_rejected() {
    let src = trips();
    let total = Function::new(FunctionKind::Sum, [src.column("distance").unwrap()]).unwrap();
    let seconds = Value::integer(5).with_unit(Unit::parse("s").unwrap()).unwrap();
    assert!(Expression::new(Operator::Gt, total, seconds).is_err());
}

// ── Schemas and pipeline ────────────────────────────────────────────────

#[test]
fn test_pipeline_links_schemas_through_shared_tables() {
    let src = trips();
    let staged = Table::core("stg_trips")
        .source(&src)
        .columns(src.columns().iter().map(Column::select))
        .build()
        .unwrap();
    let by_year = Table::union(
        "all_trips",
        vec![
            staged.clone(),
            Table::select(&staged, "stg_trips_copy").unwrap(),
        ],
        Operator::UnionAll,
    )
    .unwrap()
    .build()
    .unwrap();

    let mut raw = Schema::new("raw").unwrap();
    raw.add_table(src).unwrap();
    let mut staging = Schema::new("staging").unwrap();
    staging.add_table(staged).unwrap();
    staging.add_table(by_year).unwrap();

    let mut pipeline = Pipeline::new();
    pipeline.add_schema(raw).unwrap();
    pipeline.add_schema(staging).unwrap();

    let graph = pipeline.graph();
    let raw_key = pipeline.schema("raw").unwrap().key().clone();
    let reachable: Vec<&str> = graph
        .descendants(&raw_key)
        .iter()
        .filter(|r| r.tag == NodeTag::Table)
        .map(|r| r.label.as_str())
        .collect();
    assert!(reachable.contains(&"stg_trips"));
    assert!(reachable.contains(&"all_trips"));
    assert!(graph.to_dot().starts_with("digraph provenance {"));
}
