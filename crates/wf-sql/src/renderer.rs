//! DuckDB SQL rendering for IR nodes
//!
//! [`Renderer`] dispatches on [`Node`], one method per node kind. Rendering is
//! explicit: nodes never hold their own SQL text, so the same tree can be
//! rendered with different settings. Full statements (tables and `CREATE`
//! forms) are parsed back with the dialect's parser when `validate_sql` is on.
//!
//! Every literal carries an explicit `CAST`, and every identifier is quoted.

use crate::dialect::{self, DuckDbDialect, SqlDialect};
use crate::error::{SqlError, SqlResult};
use crate::validator;
use std::collections::HashSet;
use wf_core::sql_utils::string_literal;
use wf_core::{Config, FileMetadata, RenderConfig, Unit};
use wf_ir::{
    CaseWhen, Column, ColumnKind, ColumnSource, CompoundJoin, Condition, DataType, Expression,
    Fixity, FrameBound, Function, FunctionKind, Join, Node, Operand, Operator, Records, Table,
    TableKind, TableSource, Value, ValueKind, Window,
};

/// Renders IR nodes as SQL text for one dialect
pub struct Renderer {
    dialect: Box<dyn SqlDialect>,
    config: RenderConfig,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer {
    /// DuckDB renderer with the given options
    pub fn new(config: RenderConfig) -> Self {
        Self {
            dialect: Box::new(DuckDbDialect::new()),
            config,
        }
    }

    /// Renderer for the dialect and options of a project config
    pub fn from_config(config: &Config) -> Self {
        Self {
            dialect: dialect::for_name(config.dialect),
            config: config.render.clone(),
        }
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render any node. Tables render as complete `SELECT` statements.
    pub fn render<'a>(&self, node: impl Into<Node<'a>>) -> SqlResult<String> {
        let node = node.into();
        let sql = self.render_node(node)?;
        if let Node::Table(_) = node {
            self.check(&sql)?;
        }
        Ok(sql)
    }

    /// `CREATE OR REPLACE` statement materializing a table.
    ///
    /// Temp tables are declared from their column types; every other kind is
    /// created from its query.
    pub fn render_create(&self, table: &Table) -> SqlResult<String> {
        let name = self.ident(table.name().as_str());
        let sql = match table.kind() {
            TableKind::Temp => {
                let columns: Vec<String> = table
                    .columns()
                    .iter()
                    .map(|c| format!("{} {}", self.ident(c.name().as_str()), c.data_type()))
                    .collect();
                format!("CREATE OR REPLACE TEMP TABLE {name} ({})", columns.join(", "))
            }
            _ => format!(
                "CREATE OR REPLACE TABLE {name} AS{}{}",
                self.sep(),
                self.render_table(table)?
            ),
        };
        self.check(&sql)?;
        Ok(sql)
    }

    fn check(&self, sql: &str) -> SqlResult<()> {
        if self.config.validate_sql {
            validator::validate(self.dialect(), sql)?;
        }
        Ok(())
    }

    fn render_node(&self, node: Node<'_>) -> SqlResult<String> {
        match node {
            Node::Operator(op) => Ok(op.symbol().to_string()),
            Node::Value(v) => self.render_value(v),
            Node::Expression(e) => self.render_expression(e),
            Node::Function(f) => self.render_function(f),
            Node::Column(c) => self.column_definition(c),
            Node::CaseWhen(c) => self.render_case_when(c),
            Node::Condition(c) => self.render_condition(c),
            Node::Table(t) => self.render_table(t),
            Node::Join(j) => self.render_join(j),
            Node::CompoundJoin(j) => self.render_compound_join(j),
            Node::Records(r) => self.render_records(r),
            Node::Schema(s) => Err(SqlError::Unrenderable {
                node: format!("schema '{}'", s.name()),
                reason: "a schema groups tables and has no SQL form".to_string(),
            }),
        }
    }

    fn ident(&self, name: &str) -> String {
        self.dialect.quote_ident(name)
    }

    /// Separator placed before each clause keyword
    fn sep(&self) -> &'static str {
        if self.config.pretty {
            "\n"
        } else {
            " "
        }
    }

    // ── Literals ────────────────────────────────────────────────────────

    fn render_value(&self, value: &Value) -> SqlResult<String> {
        let ty = value.data_type();
        let sql = match value.kind() {
            ValueKind::Varchar(s) => format!("CAST({} AS {ty})", string_literal(s)),
            ValueKind::Integer(n) => format!("CAST({n} AS {ty})"),
            ValueKind::Float(x) | ValueKind::Double(x) => format!("CAST({x} AS {ty})"),
            ValueKind::Decimal(text) => format!("CAST({text} AS {ty})"),
            ValueKind::Timestamp(ts) => {
                format!("CAST('{}' AS {ty})", ts.format("%Y-%m-%d %H:%M:%S%.f"))
            }
            ValueKind::Date(d) => format!("CAST('{}' AS {ty})", d.format("%Y-%m-%d")),
            ValueKind::Boolean(b) => {
                format!("CAST({} AS {ty})", if *b { "TRUE" } else { "FALSE" })
            }
            ValueKind::Null if *ty == DataType::Null => "NULL".to_string(),
            ValueKind::Null => format!("CAST(NULL AS {ty})"),
            ValueKind::Interval(amount) => self.interval(*amount, value.unit())?,
            ValueKind::List(items) => format!("[{}]", self.value_list(items)?),
            ValueKind::Tuple(items) => format!("({})", self.value_list(items)?),
            ValueKind::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, v)| Ok(format!("{}: {}", string_literal(name), self.render_value(v)?)))
                    .collect::<SqlResult<Vec<_>>>()?;
                format!("{{{}}}", fields.join(", "))
            }
            ValueKind::GeoCoordinate {
                latitude,
                longitude,
            } => format!(
                "{{'latitude': CAST({latitude} AS DOUBLE), 'longitude': CAST({longitude} AS DOUBLE)}}"
            ),
            ValueKind::WildCard => "*".to_string(),
            ValueKind::Subquery(table) => format!("({})", self.render_table(table)?),
            ValueKind::FrameBound(bound) => frame_bound(*bound, value.unit()),
        };
        Ok(sql)
    }

    fn value_list(&self, items: &[Value]) -> SqlResult<String> {
        let items = items
            .iter()
            .map(|v| self.render_value(v))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(items.join(", "))
    }

    fn interval(&self, amount: i64, unit: &Unit) -> SqlResult<String> {
        let keyword = time_keyword(unit, "interval")?;
        Ok(format!("CAST('{amount} {keyword}' AS INTERVAL)"))
    }

    // ── Operands and expressions ────────────────────────────────────────

    fn operand(&self, operand: &Operand) -> SqlResult<String> {
        match operand {
            Operand::Column(c) => Ok(self.column_reference(c)),
            Operand::Value(v) => self.render_value(v),
            Operand::Expression(e) => self.render_expression(e),
            Operand::Function(f) => self.render_function(f),
            Operand::CaseWhen(c) => self.render_case_when(c),
            Operand::Condition(c) => self.render_condition(c),
            Operand::Table(t) => self.from_item(t),
        }
    }

    /// An operand nested inside an expression; compound operands are parenthesised
    fn term(&self, operand: &Operand) -> SqlResult<String> {
        match operand {
            Operand::Expression(e) if !e.operator().is_ordering() && !e.is_frame() => {
                Ok(format!("({})", self.render_expression(e)?))
            }
            Operand::Condition(c) if c.checks().len() > 1 => {
                Ok(format!("({})", self.render_condition(c)?))
            }
            other => self.operand(other),
        }
    }

    fn operand_list(&self, operands: &[Operand]) -> SqlResult<String> {
        let items = operands
            .iter()
            .map(|o| self.operand(o))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(items.join(", "))
    }

    fn render_expression(&self, expr: &Expression) -> SqlResult<String> {
        if expr.is_frame() {
            return self.frame(expr);
        }
        let op = expr.operator();
        let left = expr.left();
        match (op.fixity(), expr.right()) {
            (Fixity::Prefix, _) => Ok(format!("{} {}", op.symbol(), self.term(left)?)),
            (Fixity::Postfix, _) => Ok(format!("{} {}", self.term(left)?, op.symbol())),
            (Fixity::Binary, Some(right)) if op.is_join() => Ok(format!(
                "{} {} {}",
                self.operand(left)?,
                op.symbol(),
                self.operand(right)?
            )),
            (Fixity::Binary, Some(right)) => {
                let left = self.term(left)?;
                match (op, right.as_value().map(|v| v.kind())) {
                    (Operator::Between, Some(ValueKind::Tuple(bounds))) if bounds.len() == 2 => {
                        Ok(format!(
                            "{left} BETWEEN {} AND {}",
                            self.render_value(&bounds[0])?,
                            self.render_value(&bounds[1])?
                        ))
                    }
                    (Operator::In | Operator::NotIn, Some(ValueKind::List(items))) => {
                        Ok(format!("{left} {} ({})", op.symbol(), self.value_list(items)?))
                    }
                    _ => Ok(format!("{left} {} {}", op.symbol(), self.term(right)?)),
                }
            }
            (Fixity::Binary, None) => Err(SqlError::Unrenderable {
                node: format!("expression '{}'", op.symbol()),
                reason: "binary operator without a right operand".to_string(),
            }),
        }
    }

    /// `ROWS|RANGE BETWEEN <start> AND <end>`; RANGE when a bound is a time offset
    fn frame(&self, frame: &Expression) -> SqlResult<String> {
        let bounds: Vec<&Value> = std::iter::once(frame.left())
            .chain(frame.right())
            .filter_map(|o| o.as_value())
            .collect();
        let [start, end] = bounds.as_slice() else {
            return Err(SqlError::Unrenderable {
                node: "window frame".to_string(),
                reason: "expected two frame bounds".to_string(),
            });
        };
        let mode = if bounds.iter().any(|v| v.unit().time_keyword().is_some()) {
            "RANGE"
        } else {
            "ROWS"
        };
        Ok(format!(
            "{mode} BETWEEN {} AND {}",
            self.render_value(start)?,
            self.render_value(end)?
        ))
    }

    // ── Functions ───────────────────────────────────────────────────────

    fn render_function(&self, function: &Function) -> SqlResult<String> {
        let kind = function.kind();
        let args = function.args();
        let call = match kind {
            FunctionKind::Count if args.is_empty() => "COUNT(*)".to_string(),
            FunctionKind::CountDistinct => format!("COUNT(DISTINCT {})", self.operand_list(args)?),
            FunctionKind::Add
            | FunctionKind::Subtract
            | FunctionKind::Multiply
            | FunctionKind::Divide
            | FunctionKind::Modulo => {
                let terms = args
                    .iter()
                    .map(|a| self.term(a))
                    .collect::<SqlResult<Vec<_>>>()?;
                format!("({})", terms.join(&format!(" {} ", arithmetic_symbol(kind))))
            }
            FunctionKind::Negate => format!("(-{})", self.operand_list(args)?),
            FunctionKind::Cast(target) | FunctionKind::TryCast(target) => {
                format!("{}({} AS {target})", kind.name(), self.operand_list(args)?)
            }
            FunctionKind::DateTrunc(unit) | FunctionKind::DatePart(unit) | FunctionKind::DateDiff(unit) => {
                let part = time_keyword(unit, kind.name())?.to_lowercase();
                format!(
                    "{}({}, {})",
                    kind.name().to_lowercase(),
                    string_literal(&part),
                    self.operand_list(args)?
                )
            }
            _ => format!("{}({})", kind.name(), self.operand_list(args)?),
        };
        if function.is_windowed() {
            Ok(format!("{call} OVER ({})", self.window(function.window())?))
        } else {
            Ok(call)
        }
    }

    fn window(&self, window: &Window) -> SqlResult<String> {
        let mut parts = Vec::new();
        if !window.partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", self.operand_list(&window.partition_by)?));
        }
        if !window.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.operand_list(&window.order_by)?));
        }
        if let Some(frame) = &window.framing {
            parts.push(self.frame(frame)?);
        }
        Ok(parts.join(" "))
    }

    // ── Conditions and CASE ─────────────────────────────────────────────

    fn render_condition(&self, condition: &Condition) -> SqlResult<String> {
        let mut checks = condition.checks().iter();
        let Some(first) = checks.next() else {
            return Err(SqlError::Unrenderable {
                node: "condition".to_string(),
                reason: "no checks".to_string(),
            });
        };
        let mut sql = self.check_operand(first)?;
        for (link, check) in condition.link_operators().iter().zip(checks) {
            sql.push_str(&format!(" {} {}", link.symbol(), self.check_operand(check)?));
        }
        Ok(sql)
    }

    fn check_operand(&self, check: &Operand) -> SqlResult<String> {
        match check {
            Operand::Condition(c) if c.checks().len() > 1 => {
                Ok(format!("({})", self.render_condition(c)?))
            }
            Operand::Expression(e) if e.operator().is_link() => {
                Ok(format!("({})", self.operand(check)?))
            }
            other => self.operand(other),
        }
    }

    fn render_case_when(&self, case: &CaseWhen) -> SqlResult<String> {
        let mut sql = String::from("CASE");
        for (condition, value) in case.branches() {
            sql.push_str(&format!(
                " WHEN {} THEN {}",
                self.render_condition(condition)?,
                self.operand(value)?
            ));
        }
        if let Some(otherwise) = case.else_value() {
            sql.push_str(&format!(" ELSE {}", self.operand(otherwise)?));
        }
        sql.push_str(" END");
        Ok(sql)
    }

    // ── Columns ─────────────────────────────────────────────────────────

    /// `"table"."column"` when the column belongs to a table, else `"column"`
    fn column_reference(&self, column: &Column) -> String {
        let name = match column.kind() {
            ColumnKind::WildCard => "*".to_string(),
            _ => self.ident(column.name().as_str()),
        };
        match column.current_table() {
            Some(table) => format!("{}.{}", self.ident(table.as_str()), name),
            None => name,
        }
    }

    /// Select-list entry: the column's expression and its alias
    fn column_definition(&self, column: &Column) -> SqlResult<String> {
        let expression = self.column_expression(column)?;
        let same_name = match (column.kind(), column.source()) {
            (ColumnKind::WildCard, _) => true,
            (ColumnKind::Select, Some(ColumnSource::Column(src))) => src.name() == column.name(),
            _ => false,
        };
        if same_name {
            Ok(expression)
        } else {
            Ok(format!("{expression} AS {}", self.ident(column.name().as_str())))
        }
    }

    /// The value a column computes, without an alias
    fn column_expression(&self, column: &Column) -> SqlResult<String> {
        match (column.kind(), column.source()) {
            (ColumnKind::WildCard, _) => Ok(self.column_reference(column)),
            (ColumnKind::Source, _) => Ok(self.source_expression(column)),
            (_, Some(source)) => self.column_source(source),
            (_, None) => Ok(format!("CAST(NULL AS {})", column.data_type())),
        }
    }

    fn column_source(&self, source: &ColumnSource) -> SqlResult<String> {
        match source {
            ColumnSource::Column(c) => Ok(self.column_reference(c)),
            ColumnSource::Function(f) => self.render_function(f),
            ColumnSource::Expression(e) => self.render_expression(e),
            ColumnSource::CaseWhen(c) => self.render_case_when(c),
            ColumnSource::Value(v) => self.render_value(v),
        }
    }

    /// Raw file column cast to its declared type, rounded when a precision is set
    fn source_expression(&self, column: &Column) -> String {
        let metadata = column.metadata();
        let raw = metadata
            .map(|m| m.column_name.as_str())
            .unwrap_or(column.name().as_str());
        let cast = format!("CAST({} AS {})", self.ident(raw), column.data_type());
        match metadata.and_then(|m| m.precision) {
            Some(precision) if column.data_type().is_numeric() => {
                format!("ROUND({cast}, {precision})")
            }
            _ => cast,
        }
    }

    // ── Tables ──────────────────────────────────────────────────────────

    fn render_table(&self, table: &Table) -> SqlResult<String> {
        let body = self.table_body(table)?;
        match self.with_clause(table)? {
            Some(with) => Ok(format!("{with}{}{body}", self.sep())),
            None => Ok(body),
        }
    }

    /// `WITH` entries not already declared by the immediate source
    fn with_clause(&self, table: &Table) -> SqlResult<Option<String>> {
        let inherited: HashSet<&str> = table
            .source_ctes()
            .iter()
            .map(|t| t.name().as_str())
            .collect();
        let mut entries = Vec::new();
        for cte in table.ctes() {
            if inherited.contains(cte.name().as_str()) {
                log::debug!(
                    "CTE '{}' of '{}' is declared by its source",
                    cte.name(),
                    table.name()
                );
                continue;
            }
            entries.push(format!(
                "{} AS ({})",
                self.ident(cte.name().as_str()),
                self.render_table(cte)?
            ));
        }
        if entries.is_empty() {
            Ok(None)
        } else {
            Ok(Some(format!("WITH {}", entries.join(", "))))
        }
    }

    fn table_body(&self, table: &Table) -> SqlResult<String> {
        match table.kind() {
            TableKind::Temp => Ok(format!("SELECT * FROM {}", self.ident(table.name().as_str()))),
            TableKind::Union => self.union_body(table),
            _ => {
                let from = self.from_clause(table)?;
                self.select_statement(table, from)
            }
        }
    }

    fn select_statement(&self, table: &Table, from: Option<String>) -> SqlResult<String> {
        if table.columns().is_empty() {
            return Err(SqlError::Unrenderable {
                node: format!("table '{}'", table.name()),
                reason: "no columns".to_string(),
            });
        }
        // Only core and source-file tables compute their columns; every
        // other kind re-selects columns already named by its FROM item.
        let defining = matches!(table.kind(), TableKind::Core | TableKind::SourceFile);
        let columns = table
            .columns()
            .iter()
            .map(|c| {
                if defining {
                    self.column_definition(c)
                } else {
                    Ok(self.column_reference(c))
                }
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let distinct = if table.is_distinct() { "DISTINCT " } else { "" };
        let mut clauses = vec![format!("SELECT {distinct}{}", columns.join(", "))];
        if let Some(from) = from {
            clauses.push(format!("FROM {from}"));
        }
        if let Some(condition) = table.where_condition() {
            clauses.push(format!("WHERE {}", self.render_condition(condition)?));
        }
        if table.is_grouped() {
            let mut keys = Vec::new();
            for column in table.columns() {
                let constant =
                    defining && matches!(column.kind(), ColumnKind::Blank | ColumnKind::WildCard);
                if column.is_aggregate() || constant {
                    continue;
                }
                keys.push(if defining {
                    self.column_expression(column)?
                } else {
                    self.column_reference(column)
                });
            }
            if !keys.is_empty() {
                clauses.push(format!("GROUP BY {}", keys.join(", ")));
            }
        }
        if let Some(condition) = table.having_condition() {
            clauses.push(format!("HAVING {}", self.render_condition(condition)?));
        }
        Ok(clauses.join(self.sep()))
    }

    fn from_clause(&self, table: &Table) -> SqlResult<Option<String>> {
        let from = match table.source() {
            None => return Ok(None),
            Some(TableSource::Table(_))
                if matches!(table.kind(), TableKind::Select | TableKind::Subquery) =>
            {
                self.from_item(table)?
            }
            Some(TableSource::Table(source)) => self.from_item(source)?,
            Some(TableSource::Join(join)) => self.render_join(join)?,
            Some(TableSource::CompoundJoin(chain)) => self.render_compound_join(chain)?,
            Some(TableSource::Records(records)) => self.values_item(table, records)?,
            Some(TableSource::File(file)) => format!(
                "{} AS {}",
                self.read_file(file),
                self.ident(table.name().as_str())
            ),
            Some(TableSource::Union { .. }) => {
                return Err(SqlError::Unrenderable {
                    node: format!("table '{}'", table.name()),
                    reason: format!("{} table with a union source", table.kind()),
                })
            }
        };
        Ok(Some(from))
    }

    /// A table as it appears after `FROM` or `JOIN`
    fn from_item(&self, table: &Table) -> SqlResult<String> {
        let name = self.ident(table.name().as_str());
        match (table.kind(), table.source()) {
            (TableKind::Select, Some(TableSource::Table(source)))
                if !matches!(source.kind(), TableKind::Select | TableKind::Subquery) =>
            {
                Ok(format!("{} AS {name}", self.ident(source.name().as_str())))
            }
            (TableKind::Select | TableKind::Subquery, Some(TableSource::Table(source))) => {
                Ok(format!("({}) AS {name}", self.render_table(source)?))
            }
            _ => Ok(name),
        }
    }

    fn read_file(&self, file: &FileMetadata) -> String {
        format!(
            "read_csv({}, delim = {}, header = {})",
            string_literal(&file.path),
            string_literal(&file.delimiter),
            file.header
        )
    }

    fn values_item(&self, table: &Table, records: &Records) -> SqlResult<String> {
        let columns: Vec<String> = records
            .columns()
            .iter()
            .map(|c| self.ident(c.name().as_str()))
            .collect();
        Ok(format!(
            "({}) AS {}({})",
            self.render_records(records)?,
            self.ident(table.name().as_str()),
            columns.join(", ")
        ))
    }

    fn render_records(&self, records: &Records) -> SqlResult<String> {
        let rows = records
            .rows()
            .iter()
            .map(|row| Ok(format!("({})", self.value_list(row)?)))
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(format!("VALUES {}", rows.join(", ")))
    }

    /// Members joined by the set operator. Filtering, grouping or DISTINCT on
    /// the union itself wraps the set operation in an outer SELECT.
    fn union_body(&self, table: &Table) -> SqlResult<String> {
        let Some(TableSource::Union { members, operator }) = table.source() else {
            return Err(SqlError::Unrenderable {
                node: format!("table '{}'", table.name()),
                reason: "union table without members".to_string(),
            });
        };
        let parts = members
            .iter()
            .map(|member| {
                let body = self.table_body(member)?;
                Ok(if member.kind() == TableKind::Union {
                    format!("({body})")
                } else {
                    body
                })
            })
            .collect::<SqlResult<Vec<_>>>()?;
        let set = parts.join(&format!("{}{}{}", self.sep(), operator.symbol(), self.sep()));

        let wrapped = table.is_grouped()
            || table.is_distinct()
            || table.where_condition().is_some()
            || table.having_condition().is_some();
        if !wrapped {
            return Ok(set);
        }
        let from = format!("({set}) AS {}", self.ident(table.name().as_str()));
        self.select_statement(table, Some(from))
    }

    // ── Joins ───────────────────────────────────────────────────────────

    fn render_join(&self, join: &Join) -> SqlResult<String> {
        let expression = self.render_expression(join.expression())?;
        match join.condition() {
            Some(condition) => Ok(format!("{expression} ON {}", self.render_condition(condition)?)),
            None => Ok(expression),
        }
    }

    fn render_compound_join(&self, chain: &CompoundJoin) -> SqlResult<String> {
        let mut joins = chain.joins().iter();
        let Some(first) = joins.next() else {
            return Err(SqlError::Unrenderable {
                node: "compound join".to_string(),
                reason: "no joins".to_string(),
            });
        };
        let mut sql = self.render_join(first)?;
        for join in joins {
            sql.push_str(&format!(
                "{}{} {}",
                self.sep(),
                join.operator().symbol(),
                self.from_item(join.right())?
            ));
            if let Some(condition) = join.condition() {
                sql.push_str(&format!(" ON {}", self.render_condition(condition)?));
            }
        }
        Ok(sql)
    }
}

fn arithmetic_symbol(kind: &FunctionKind) -> &'static str {
    match kind {
        FunctionKind::Subtract => Operator::Minus.symbol(),
        FunctionKind::Multiply => Operator::Multiply.symbol(),
        FunctionKind::Divide => Operator::Divide.symbol(),
        FunctionKind::Modulo => Operator::Modulo.symbol(),
        _ => Operator::Plus.symbol(),
    }
}

fn time_keyword(unit: &Unit, context: &str) -> SqlResult<&'static str> {
    unit.time_keyword().ok_or_else(|| SqlError::Unrenderable {
        node: context.to_string(),
        reason: format!("unit '{unit}' is not a single time unit"),
    })
}

fn frame_bound(bound: FrameBound, unit: &Unit) -> String {
    let Some(keyword) = unit.time_keyword() else {
        return bound.to_string();
    };
    match bound {
        FrameBound::Preceding(n) => format!("CAST('{n} {keyword}' AS INTERVAL) PRECEDING"),
        FrameBound::Following(n) => format!("CAST('{n} {keyword}' AS INTERVAL) FOLLOWING"),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "renderer_test.rs"]
mod tests;
