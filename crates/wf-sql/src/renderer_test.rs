use super::*;
use chrono::NaiveDate;
use wf_core::ColumnMetadata;
use wf_ir::{Schema, Value};

fn renderer() -> Renderer {
    Renderer::default()
}

fn table(name: &str, columns: &[(&str, DataType)]) -> Table {
    Table::temp(
        name,
        columns
            .iter()
            .map(|(n, t)| Column::blank(n, t.clone()).unwrap())
            .collect(),
    )
    .unwrap()
}

fn abc() -> Table {
    table(
        "t",
        &[
            ("a", DataType::Integer),
            ("b", DataType::Integer),
            ("c", DataType::Integer),
        ],
    )
}

fn compare(t: &Table, column: &str, op: Operator, n: i64) -> Expression {
    Expression::new(op, t.column(column).unwrap(), Value::integer(n)).unwrap()
}

fn on(left: &Table, right: &Table, column: &str) -> Condition {
    Condition::single(
        Expression::new(
            Operator::Eq,
            left.column(column).unwrap(),
            right.column(column).unwrap(),
        )
        .unwrap(),
    )
    .unwrap()
}

fn reselect(name: &str, source: &Table) -> Table {
    Table::core(name)
        .source(source)
        .columns(source.columns().iter().map(Column::select))
        .build()
        .unwrap()
}

// ── Literals ────────────────────────────────────────────────────────────

#[test]
fn test_literals_are_cast() {
    let r = renderer();
    assert_eq!(r.render(&Value::integer(5)).unwrap(), "CAST(5 AS INTEGER)");
    assert_eq!(
        r.render(&Value::integer(5_000_000_000)).unwrap(),
        "CAST(5000000000 AS BIGINT)"
    );
    assert_eq!(
        r.render(&Value::varchar("O'Brien")).unwrap(),
        "CAST('O''Brien' AS VARCHAR)"
    );
    assert_eq!(r.render(&Value::double(2.5).unwrap()).unwrap(), "CAST(2.5 AS DOUBLE)");
    assert_eq!(
        r.render(&Value::decimal("-12.50").unwrap()).unwrap(),
        "CAST(-12.50 AS DECIMAL(4,2))"
    );
    assert_eq!(r.render(&Value::boolean(true)).unwrap(), "CAST(TRUE AS BOOLEAN)");
    assert_eq!(
        r.render(&Value::date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
            .unwrap(),
        "CAST('2024-03-01' AS DATE)"
    );
    assert_eq!(
        r.render(&Value::parse_timestamp("2024-03-01 08:30:00").unwrap())
            .unwrap(),
        "CAST('2024-03-01 08:30:00' AS TIMESTAMP)"
    );
}

#[test]
fn test_nulls_and_intervals() {
    let r = renderer();
    assert_eq!(r.render(&Value::null()).unwrap(), "NULL");
    assert_eq!(
        r.render(&Value::typed_null(DataType::Double)).unwrap(),
        "CAST(NULL AS DOUBLE)"
    );
    let five_minutes = Value::interval(5, Unit::parse("min").unwrap()).unwrap();
    assert_eq!(
        r.render(&five_minutes).unwrap(),
        "CAST('5 MINUTE' AS INTERVAL)"
    );
}

#[test]
fn test_composite_literals() {
    let r = renderer();
    let tuple = Value::tuple(vec![Value::integer(1), Value::integer(2)]).unwrap();
    assert_eq!(
        r.render(&tuple).unwrap(),
        "(CAST(1 AS INTEGER), CAST(2 AS INTEGER))"
    );
    let list = Value::list(vec![Value::varchar("x")]).unwrap();
    assert_eq!(r.render(&list).unwrap(), "[CAST('x' AS VARCHAR)]");
    let point = Value::geo_coordinate(52.5, 13.4).unwrap();
    assert_eq!(
        r.render(&point).unwrap(),
        "{'latitude': CAST(52.5 AS DOUBLE), 'longitude': CAST(13.4 AS DOUBLE)}"
    );
}

// ── Expressions and functions ───────────────────────────────────────────

#[test]
fn test_nested_expressions_are_parenthesised() {
    let t = abc();
    let sum = Expression::new(
        Operator::Plus,
        t.column("a").unwrap(),
        t.column("b").unwrap(),
    )
    .unwrap();
    let product = Expression::new(Operator::Multiply, sum, t.column("c").unwrap()).unwrap();
    assert_eq!(
        renderer().render(&product).unwrap(),
        r#"("t"."a" + "t"."b") * "t"."c""#
    );

    let missing = Expression::unary(Operator::IsNull, t.column("a").unwrap()).unwrap();
    assert_eq!(renderer().render(&missing).unwrap(), r#""t"."a" IS NULL"#);
}

#[test]
fn test_in_and_between() {
    let t = abc();
    let listed = Expression::new(
        Operator::In,
        t.column("a").unwrap(),
        Value::tuple(vec![Value::integer(1), Value::integer(2)]).unwrap(),
    )
    .unwrap();
    assert_eq!(
        renderer().render(&listed).unwrap(),
        r#""t"."a" IN (CAST(1 AS INTEGER), CAST(2 AS INTEGER))"#
    );

    let ranged = Expression::new(
        Operator::Between,
        t.column("b").unwrap(),
        Value::tuple(vec![Value::integer(0), Value::integer(9)]).unwrap(),
    )
    .unwrap();
    assert_eq!(
        renderer().render(&ranged).unwrap(),
        r#""t"."b" BETWEEN CAST(0 AS INTEGER) AND CAST(9 AS INTEGER)"#
    );
}

#[test]
fn test_function_forms() {
    let r = renderer();
    let t = abc();
    let ts = table("e", &[("at", DataType::Timestamp)]);

    let count = Function::new(FunctionKind::Count, Vec::<Operand>::new()).unwrap();
    assert_eq!(r.render(&count).unwrap(), "COUNT(*)");

    let distinct = Function::new(FunctionKind::CountDistinct, [t.column("a").unwrap()]).unwrap();
    assert_eq!(r.render(&distinct).unwrap(), r#"COUNT(DISTINCT "t"."a")"#);

    let truncated = Function::new(
        FunctionKind::DateTrunc(Unit::parse("min").unwrap()),
        [ts.column("at").unwrap()],
    )
    .unwrap();
    assert_eq!(r.render(&truncated).unwrap(), r#"date_trunc('minute', "e"."at")"#);

    let cast = Function::new(FunctionKind::Cast(DataType::Varchar), [t.column("a").unwrap()]).unwrap();
    assert_eq!(r.render(&cast).unwrap(), r#"CAST("t"."a" AS VARCHAR)"#);

    let add = Function::new(
        FunctionKind::Add,
        [t.column("a").unwrap(), t.column("b").unwrap()],
    )
    .unwrap();
    assert_eq!(r.render(&add).unwrap(), r#"("t"."a" + "t"."b")"#);
}

#[test]
fn test_window_clauses() {
    let r = renderer();
    let t = abc();
    let (a, b, c) = (
        t.column("a").unwrap(),
        t.column("b").unwrap(),
        t.column("c").unwrap(),
    );

    let partitioned = Function::with_window(
        FunctionKind::Sum,
        [a],
        Window::new().partition_by([b]).order_by([c]),
    )
    .unwrap();
    assert_eq!(
        r.render(&partitioned).unwrap(),
        r#"SUM("t"."a") OVER (PARTITION BY "t"."b" ORDER BY "t"."c")"#
    );

    let ordered = Function::with_window(FunctionKind::Sum, [a], Window::new().order_by([c])).unwrap();
    assert_eq!(
        r.render(&ordered).unwrap(),
        r#"SUM("t"."a") OVER (ORDER BY "t"."c")"#
    );

    let numbered = Function::new(FunctionKind::RowNumber, Vec::<Operand>::new()).unwrap();
    assert_eq!(r.render(&numbered).unwrap(), "ROW_NUMBER() OVER ()");
}

#[test]
fn test_frames_pick_rows_or_range() {
    let r = renderer();
    let t = abc();
    let rows = Expression::new(
        Operator::Between,
        Value::frame_bound(FrameBound::Preceding(2)),
        Value::frame_bound(FrameBound::CurrentRow),
    )
    .unwrap();
    let avg = Function::with_window(
        FunctionKind::Avg,
        [t.column("a").unwrap()],
        Window::new().order_by([t.column("c").unwrap()]).framing(rows),
    )
    .unwrap();
    assert_eq!(
        r.render(&avg).unwrap(),
        r#"AVG("t"."a") OVER (ORDER BY "t"."c" ROWS BETWEEN 2 PRECEDING AND CURRENT ROW)"#
    );

    let range = Expression::new(
        Operator::Between,
        Value::frame_range(FrameBound::Preceding(1), Unit::parse("h").unwrap()).unwrap(),
        Value::frame_bound(FrameBound::CurrentRow),
    )
    .unwrap();
    assert_eq!(
        r.render(&range).unwrap(),
        "RANGE BETWEEN CAST('1 HOUR' AS INTERVAL) PRECEDING AND CURRENT ROW"
    );
}

// ── Conditions and CASE ─────────────────────────────────────────────────

#[test]
fn test_condition_links_in_order() {
    let t = abc();
    let condition = Condition::new(
        [
            compare(&t, "a", Operator::Gt, 1),
            compare(&t, "b", Operator::Lt, 2),
            compare(&t, "c", Operator::Eq, 3),
        ],
        vec![Operator::And, Operator::Or],
    )
    .unwrap();
    assert_eq!(
        renderer().render(&condition).unwrap(),
        r#""t"."a" > CAST(1 AS INTEGER) AND "t"."b" < CAST(2 AS INTEGER) OR "t"."c" = CAST(3 AS INTEGER)"#
    );
}

#[test]
fn test_nested_condition_is_grouped() {
    let t = abc();
    let either = Condition::any([
        compare(&t, "a", Operator::Eq, 1),
        compare(&t, "b", Operator::Eq, 2),
    ])
    .unwrap();
    let both = Condition::new(
        [Operand::from(either), Operand::from(compare(&t, "c", Operator::Gt, 0))],
        vec![Operator::And],
    )
    .unwrap();
    assert_eq!(
        renderer().render(&both).unwrap(),
        r#"("t"."a" = CAST(1 AS INTEGER) OR "t"."b" = CAST(2 AS INTEGER)) AND "t"."c" > CAST(0 AS INTEGER)"#
    );
}

#[test]
fn test_link_expression_check_is_grouped() {
    let t = abc();
    let either = Expression::new(
        Operator::Or,
        compare(&t, "a", Operator::Eq, 1),
        compare(&t, "b", Operator::Eq, 2),
    )
    .unwrap();
    let both = Condition::new(
        [Operand::from(either), Operand::from(compare(&t, "c", Operator::Eq, 3))],
        vec![Operator::And],
    )
    .unwrap();
    assert_eq!(
        renderer().render(&both).unwrap(),
        r#"(("t"."a" = CAST(1 AS INTEGER)) OR ("t"."b" = CAST(2 AS INTEGER))) AND "t"."c" = CAST(3 AS INTEGER)"#
    );
}

#[test]
fn test_case_when() {
    let t = abc();
    let case = CaseWhen::new(
        vec![
            Condition::single(compare(&t, "a", Operator::Gt, 10)).unwrap(),
            Condition::single(compare(&t, "a", Operator::Gt, 0)).unwrap(),
        ],
        [Value::varchar("high"), Value::varchar("low")],
        Some(Value::varchar("none").into()),
    )
    .unwrap();
    assert_eq!(
        renderer().render(&case).unwrap(),
        concat!(
            r#"CASE WHEN "t"."a" > CAST(10 AS INTEGER) THEN CAST('high' AS VARCHAR) "#,
            r#"WHEN "t"."a" > CAST(0 AS INTEGER) THEN CAST('low' AS VARCHAR) "#,
            r#"ELSE CAST('none' AS VARCHAR) END"#
        )
    );
}

// ── Tables ──────────────────────────────────────────────────────────────

#[test]
fn test_core_table_select() {
    let t = abc();
    let picked = Table::core("picked")
        .source(&t)
        .column(Column::select(t.column("a").unwrap()))
        .column(Column::select_as(t.column("b").unwrap(), "bee").unwrap())
        .column(Column::blank("pad", DataType::Double).unwrap())
        .where_condition(Condition::single(compare(&t, "c", Operator::GtEq, 0)).unwrap())
        .distinct(true)
        .build()
        .unwrap();
    assert_eq!(
        renderer().render(&picked).unwrap(),
        concat!(
            r#"SELECT DISTINCT "t"."a", "t"."b" AS "bee", CAST(NULL AS DOUBLE) AS "pad" "#,
            r#"FROM "t" WHERE "t"."c" >= CAST(0 AS INTEGER)"#
        )
    );
}

#[test]
fn test_grouped_table_with_having() {
    let t = abc();
    let total = Function::new(FunctionKind::Sum, [t.column("a").unwrap()]).unwrap();
    let having = Condition::single(
        Expression::new(Operator::Gt, &total, Value::integer(10)).unwrap(),
    )
    .unwrap();
    let grouped = Table::core("totals")
        .source(&t)
        .column(Column::select(t.column("b").unwrap()))
        .column(Column::core("total", total).unwrap())
        .group_by(true)
        .having_condition(having)
        .build()
        .unwrap();
    assert_eq!(
        renderer().render(&grouped).unwrap(),
        concat!(
            r#"SELECT "t"."b", SUM("t"."a") AS "total" FROM "t" "#,
            r#"GROUP BY "t"."b" HAVING SUM("t"."a") > CAST(10 AS INTEGER)"#
        )
    );
}

#[test]
fn test_with_clause_skips_ctes_declared_by_source() {
    let raw = table("raw", &[("id", DataType::Integer)]);
    let t1 = reselect("t1", &raw);
    let t2 = Table::core("t2")
        .source(&t1)
        .columns(t1.columns().iter().map(Column::select))
        .cte(t1.clone())
        .build()
        .unwrap();
    let top = Table::core("top")
        .source(&t2)
        .columns(t2.columns().iter().map(Column::select))
        .ctes([t1.clone(), t2.clone()])
        .build()
        .unwrap();

    let sql = renderer().render(&top).unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"WITH "t2" AS (WITH "t1" AS (SELECT "raw"."id" FROM "raw") "#,
            r#"SELECT "t1"."id" FROM "t1") SELECT "t2"."id" FROM "t2""#
        )
    );
    let statement = validator::validate(&DuckDbDialect::new(), &sql).unwrap();
    assert_eq!(validator::declared_ctes(&statement), vec!["t2"]);
}

#[test]
fn test_select_and_subquery_tables() {
    let r = renderer();
    let a = table("a", &[("id", DataType::Integer)]);
    let alias = Table::select(&a, "a2").unwrap();
    assert_eq!(r.render(&alias).unwrap(), r#"SELECT "a2"."id" FROM "a" AS "a2""#);

    let inner = reselect("inner", &a);
    let sq = Table::subquery(&inner, "sq").unwrap();
    assert_eq!(
        r.render(&sq).unwrap(),
        r#"SELECT "sq"."id" FROM (SELECT "a"."id" FROM "a") AS "sq""#
    );
}

#[test]
fn test_temp_and_records_tables() {
    let r = renderer();
    let temp = table("scratch", &[("id", DataType::Integer), ("name", DataType::Varchar)]);
    assert_eq!(r.render(&temp).unwrap(), r#"SELECT * FROM "scratch""#);
    assert_eq!(
        r.render_create(&temp).unwrap(),
        r#"CREATE OR REPLACE TEMP TABLE "scratch" ("id" INTEGER, "name" VARCHAR)"#
    );

    let records = Records::new(
        vec![
            Column::blank("id", DataType::Integer).unwrap(),
            Column::blank("name", DataType::Varchar).unwrap(),
        ],
        vec![
            vec![Value::integer(1), Value::varchar("a")],
            vec![Value::integer(2), Value::null()],
        ],
    )
    .unwrap();
    let inline = Table::from_records("r", records).unwrap();
    assert_eq!(
        r.render(&inline).unwrap(),
        concat!(
            r#"SELECT "r"."id", "r"."name" FROM (VALUES (CAST(1 AS INTEGER), CAST('a' AS VARCHAR)), "#,
            r#"(CAST(2 AS INTEGER), NULL)) AS "r"("id", "name")"#
        )
    );
}

#[test]
fn test_source_file_table() {
    let rows = ColumnMetadata::rows_from_yaml(
        r#"
- {schema: raw, dataset: trips, column_name: trip_id, data_type: BIGINT, is_primary_key: true, ordinal_position: 1}
- {schema: raw, dataset: trips, column_name: distance_m, column_alias: distance, data_type: DOUBLE, precision: 3, ordinal_position: 2}
- {schema: raw, dataset: trips, column_name: city, data_type: VARCHAR, filter_values: [test], on_filter: drop, ordinal_position: 3}
"#,
    )
    .unwrap();
    let file: FileMetadata =
        serde_yaml::from_str("{schema: raw, dataset: trips, path: data/trips.csv}").unwrap();
    let trips = Table::source_file(&file, &rows).unwrap();

    assert_eq!(
        renderer().render(&trips).unwrap(),
        concat!(
            r#"SELECT CAST("trip_id" AS BIGINT) AS "trip_id", "#,
            r#"ROUND(CAST("distance_m" AS DOUBLE), 3) AS "distance", "#,
            r#"CAST("city" AS VARCHAR) AS "city" "#,
            r#"FROM read_csv('data/trips.csv', delim = ',', header = true) AS "trips" "#,
            r#"WHERE CAST("city" AS VARCHAR) NOT IN (CAST('test' AS VARCHAR))"#
        )
    );
}

// ── Joins and unions ────────────────────────────────────────────────────

#[test]
fn test_join_and_joined_table() {
    let r = renderer();
    let a = table("a", &[("id", DataType::Integer), ("x", DataType::Integer)]);
    let b = table("b", &[("id", DataType::Integer), ("y", DataType::Integer)]);
    let join = Join::between(Operator::LeftJoin, &a, &b, Some(on(&a, &b, "id"))).unwrap();
    assert_eq!(
        r.render(&join).unwrap(),
        r#""a" LEFT JOIN "b" ON "a"."id" = "b"."id""#
    );

    let joined = Table::core("ab")
        .columns(join.columns().iter().map(Column::select))
        .source(join)
        .build()
        .unwrap();
    assert_eq!(
        r.render(&joined).unwrap(),
        r#"SELECT "a"."id", "a"."x", "b"."y" FROM "a" LEFT JOIN "b" ON "a"."id" = "b"."id""#
    );
    assert_eq!(
        r.render_create(&joined).unwrap(),
        concat!(
            r#"CREATE OR REPLACE TABLE "ab" AS SELECT "a"."id", "a"."x", "b"."y" "#,
            r#"FROM "a" LEFT JOIN "b" ON "a"."id" = "b"."id""#
        )
    );

    let cross = Join::between(Operator::CrossJoin, &a, &b, None).unwrap();
    assert_eq!(r.render(&cross).unwrap(), r#""a" CROSS JOIN "b""#);
}

#[test]
fn test_compound_join_appends_right_sides() {
    let a = table("a", &[("id", DataType::Integer)]);
    let b = table("b", &[("id", DataType::Integer)]);
    let c = table("c", &[("id", DataType::Integer)]);
    let ab = Join::between(Operator::InnerJoin, &a, &b, Some(on(&a, &b, "id"))).unwrap();
    let bc = Join::between(Operator::LeftJoin, &b, &c, Some(on(&b, &c, "id"))).unwrap();
    let chain = CompoundJoin::new(vec![ab, bc]).unwrap();
    assert_eq!(
        renderer().render(&chain).unwrap(),
        concat!(
            r#""a" INNER JOIN "b" ON "a"."id" = "b"."id" "#,
            r#"LEFT JOIN "c" ON "b"."id" = "c"."id""#
        )
    );
}

#[test]
fn test_union_plain_and_wrapped() {
    let r = renderer();
    let a = table("a", &[("id", DataType::Integer)]);
    let b = table("b", &[("id", DataType::Integer)]);
    let members = vec![reselect("m1", &a), reselect("m2", &b)];

    let plain = Table::union("u", members.clone(), Operator::UnionAll)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(
        r.render(&plain).unwrap(),
        r#"SELECT "a"."id" FROM "a" UNION ALL SELECT "b"."id" FROM "b""#
    );

    let grouped = Table::union("u", members, Operator::Union)
        .unwrap()
        .group_by(true)
        .build()
        .unwrap();
    assert_eq!(
        r.render(&grouped).unwrap(),
        concat!(
            r#"SELECT "u"."id" FROM (SELECT "a"."id" FROM "a" UNION SELECT "b"."id" FROM "b") AS "u" "#,
            r#"GROUP BY "u"."id""#
        )
    );
}

// ── Settings and errors ─────────────────────────────────────────────────

#[test]
fn test_pretty_puts_clauses_on_lines() {
    let t = abc();
    let r = Renderer::new(RenderConfig {
        validate_sql: true,
        pretty: true,
    });
    let picked = Table::core("p")
        .source(&t)
        .column(Column::select(t.column("a").unwrap()))
        .where_condition(Condition::single(compare(&t, "a", Operator::Gt, 1)).unwrap())
        .build()
        .unwrap();
    assert_eq!(
        r.render(&picked).unwrap(),
        "SELECT \"t\".\"a\"\nFROM \"t\"\nWHERE \"t\".\"a\" > CAST(1 AS INTEGER)"
    );
}

#[test]
fn test_schema_has_no_sql() {
    let schema = Schema::new("raw").unwrap();
    assert!(matches!(
        renderer().render(&schema),
        Err(SqlError::Unrenderable { .. })
    ));
}

#[test]
fn test_operator_renders_symbol() {
    assert_eq!(renderer().render(Node::Operator(Operator::NotIn)).unwrap(), "NOT IN");
}
