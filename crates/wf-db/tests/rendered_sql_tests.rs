//! Rendered IR statements executed against an in-memory DuckDB

use std::io::Write;
use wf_core::{ColumnMetadata, FileMetadata, Unit};
use wf_db::{Database, DuckDbBackend};
use wf_ir::{
    Column, Condition, DataType, Expression, FrameBound, Function, FunctionKind, Operator,
    Records, Table, Value, Window,
};
use wf_sql::Renderer;

const TRIPS_CSV: &str = "\
trip_id,started_at,distance_m,city
1,2024-03-01 08:00:00,1200.5,berlin
2,2024-03-01 08:30:00,800,berlin
3,2024-03-01 10:00:00,500,berlin
4,2024-03-01 08:10:00,50,test
";

const TRIPS_COLUMNS: &str = r#"
- {schema: raw, dataset: trips, column_name: trip_id, data_type: BIGINT, is_primary_key: true, ordinal_position: 1}
- {schema: raw, dataset: trips, column_name: started_at, data_type: TIMESTAMP, is_event_time: true, ordinal_position: 2}
- {schema: raw, dataset: trips, column_name: distance_m, column_alias: distance, data_type: DOUBLE, precision: 1, ordinal_position: 3}
- {schema: raw, dataset: trips, column_name: city, data_type: VARCHAR, filter_values: [test], on_filter: drop, ordinal_position: 4}
"#;

fn people() -> Table {
    let records = Records::new(
        vec![
            Column::blank("id", DataType::Integer).unwrap(),
            Column::blank("name", DataType::Varchar).unwrap(),
        ],
        vec![
            vec![Value::integer(1), Value::varchar("ada")],
            vec![Value::integer(2), Value::varchar("grace")],
            vec![Value::integer(3), Value::null()],
        ],
    )
    .unwrap();
    Table::from_records("people", records).unwrap()
}

// ── Materialization ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_records_table_materializes() {
    let db = DuckDbBackend::in_memory().unwrap();
    let renderer = Renderer::default();
    let people = people();

    db.execute(&renderer.render_create(&people).unwrap())
        .await
        .unwrap();
    assert!(db.relation_exists("people").await.unwrap());
    assert_eq!(db.query_count(r#"SELECT * FROM "people""#).await.unwrap(), 3);

    let named = Table::core("named")
        .source(&people)
        .columns(people.columns().iter().map(Column::select))
        .where_condition(
            Condition::single(
                Expression::unary(Operator::IsNotNull, people.column("name").unwrap()).unwrap(),
            )
            .unwrap(),
        )
        .build()
        .unwrap();
    db.execute(&renderer.render_create(&named).unwrap())
        .await
        .unwrap();

    let result = db
        .query(r#"SELECT "name" FROM "named" ORDER BY "id""#)
        .await
        .unwrap();
    assert_eq!(
        result.rows,
        vec![vec!["ada".to_string()], vec!["grace".to_string()]]
    );
}

#[tokio::test]
async fn test_temp_table_declaration() {
    let db = DuckDbBackend::in_memory().unwrap();
    let scratch = Table::temp(
        "scratch",
        vec![
            Column::blank("id", DataType::Integer).unwrap(),
            Column::blank("amount", DataType::Double).unwrap(),
        ],
    )
    .unwrap();
    let renderer = Renderer::default();
    db.execute(&renderer.render_create(&scratch).unwrap())
        .await
        .unwrap();
    db.execute(r#"INSERT INTO "scratch" VALUES (1, 2.5)"#)
        .await
        .unwrap();
    assert_eq!(
        db.query_count(&renderer.render(&scratch).unwrap())
            .await
            .unwrap(),
        1
    );
}

// ── Aggregation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_grouped_count_runs() {
    let db = DuckDbBackend::in_memory().unwrap();
    let renderer = Renderer::default();
    let people = people();
    db.execute(&renderer.render_create(&people).unwrap())
        .await
        .unwrap();

    let with_name = Expression::unary(Operator::IsNotNull, people.column("name").unwrap()).unwrap();
    let total = Function::new(FunctionKind::Count, Vec::<wf_ir::Operand>::new()).unwrap();
    let grouped = Table::core("by_presence")
        .source(&people)
        .column(Column::core("has_name", with_name).unwrap())
        .column(Column::core("total", total).unwrap())
        .group_by(true)
        .build()
        .unwrap();

    let result = db
        .query(&format!(
            r#"SELECT CAST("has_name" AS VARCHAR), "total" FROM ({}) AS g ORDER BY 1"#,
            renderer.render(&grouped).unwrap()
        ))
        .await
        .unwrap();
    assert_eq!(
        result.rows,
        vec![
            vec!["false".to_string(), "1".to_string()],
            vec!["true".to_string(), "2".to_string()],
        ]
    );
}

// ── Source files and windows ────────────────────────────────────────────

#[tokio::test]
async fn test_source_file_and_rolling_window() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("trips.csv");
    std::fs::File::create(&csv)
        .unwrap()
        .write_all(TRIPS_CSV.as_bytes())
        .unwrap();

    let rows = ColumnMetadata::rows_from_yaml(TRIPS_COLUMNS).unwrap();
    let file: FileMetadata = serde_yaml::from_str(&format!(
        "{{schema: raw, dataset: trips, path: '{}'}}",
        csv.display()
    ))
    .unwrap();
    let trips = Table::source_file(&file, &rows).unwrap();

    let db = DuckDbBackend::in_memory().unwrap();
    let renderer = Renderer::default();
    db.execute(&renderer.render_create(&trips).unwrap())
        .await
        .unwrap();
    assert_eq!(db.query_count(r#"SELECT * FROM "trips""#).await.unwrap(), 3);

    let frame = Expression::new(
        Operator::Between,
        Value::frame_range(FrameBound::Preceding(1), Unit::parse("h").unwrap()).unwrap(),
        Value::frame_bound(FrameBound::CurrentRow),
    )
    .unwrap();
    let rolling = Function::with_window(
        FunctionKind::Sum,
        [trips.column("distance").unwrap()],
        Window::new()
            .partition_by([trips.column("city").unwrap()])
            .order_by([trips.column("started_at").unwrap()])
            .framing(frame),
    )
    .unwrap();
    let staged = Table::core("stg_trips")
        .source(&trips)
        .column(Column::select(trips.column("trip_id").unwrap()))
        .column(Column::core("distance_1h", rolling).unwrap())
        .build()
        .unwrap();
    db.execute(&renderer.render_create(&staged).unwrap())
        .await
        .unwrap();

    let over_two_km = db
        .query_count(r#"SELECT * FROM "stg_trips" WHERE "distance_1h" > 2000"#)
        .await
        .unwrap();
    assert_eq!(over_two_km, 1);
}
