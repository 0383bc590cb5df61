use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, Connection, params};

use crate::filter::{FILTERED_VIEW_NAME, FilteredView};
use crate::query::{QueryError, QueryEvaluator, QueryResult, VIEW_COLUMNS, Value};

/// SQLite column types for `VIEW_COLUMNS`, in the same order.
const COLUMN_TYPES: [&str; 11] = [
    "TEXT", "TEXT", "TEXT", "TEXT", "TEXT", "TEXT", "REAL", "INTEGER", "TEXT", "TEXT", "INTEGER",
];

/// Runs SQL against the filtered view loaded into an in-memory SQLite table.
///
/// Each call builds a fresh connection, so queries never see stale selections
/// and nothing persists between them. Only read-only statements are executed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteEvaluator;

impl QueryEvaluator for SqliteEvaluator {
    fn evaluate(&self, query: &str, view: &FilteredView) -> Result<QueryResult, QueryError> {
        let mut conn = Connection::open_in_memory().map_err(engine)?;
        load_view(&mut conn, view).map_err(engine)?;

        let mut batch = Batch::new(&conn, query);
        let Some(mut stmt) = batch.next().map_err(classify)? else {
            return Err(QueryError::Syntax("empty query".to_string()));
        };
        if batch.next().map_err(classify)?.is_some() {
            return Err(QueryError::Unsupported("only a single statement is allowed".to_string()));
        }
        if !stmt.readonly() {
            return Err(QueryError::Unsupported(
                "only read-only queries (SELECT) are allowed".to_string(),
            ));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut out = Vec::new();
        let mut rows = stmt.query([]).map_err(classify)?;
        while let Some(row) = rows.next().map_err(classify)? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(to_value(row.get_ref(i).map_err(engine)?));
            }
            out.push(cells);
        }

        tracing::debug!(
            rows_in = view.len(),
            rows_out = out.len(),
            columns = width,
            "query evaluated"
        );
        Ok(QueryResult { columns, rows: out })
    }
}

fn create_table_sql() -> String {
    let cols = VIEW_COLUMNS
        .iter()
        .zip(COLUMN_TYPES)
        .map(|(name, ty)| format!("{name} {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {FILTERED_VIEW_NAME} ({cols})")
}

fn load_view(conn: &mut Connection, view: &FilteredView) -> rusqlite::Result<()> {
    conn.execute(&create_table_sql(), [])?;

    let placeholders = vec!["?"; VIEW_COLUMNS.len()].join(", ");
    let tx = conn.transaction()?;
    {
        let mut insert =
            tx.prepare(&format!("INSERT INTO {FILTERED_VIEW_NAME} VALUES ({placeholders})"))?;
        for (r, hour) in view.rows() {
            insert.execute(params![
                r.id,
                r.date.map(|d| d.format("%Y-%m-%d").to_string()),
                r.time.map(|t| t.format("%H:%M:%S").to_string()),
                r.location,
                r.category,
                r.product,
                r.sales,
                r.quantity,
                r.weekday,
                r.month,
                hour,
            ])?;
        }
    }
    tx.commit()
}

fn to_value(v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Number(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn engine(err: rusqlite::Error) -> QueryError {
    QueryError::Engine(err.to_string())
}

/// Map SQLite's messages for the common user mistakes onto typed errors.
fn classify(err: rusqlite::Error) -> QueryError {
    let msg = err.to_string();
    if let Some(name) = name_after(&msg, "no such table: ") {
        return QueryError::UnknownTable(name);
    }
    if let Some(name) = name_after(&msg, "no such column: ") {
        return QueryError::UnknownColumn(name);
    }
    if msg.contains("syntax error") || msg.contains("incomplete input") {
        return QueryError::Syntax(msg);
    }
    QueryError::Engine(msg)
}

fn name_after(msg: &str, prefix: &str) -> Option<String> {
    let rest = &msg[msg.find(prefix)? + prefix.len()..];
    let name = rest.split_whitespace().next()?;
    Some(name.trim_end_matches([',', ';']).to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::FilterParams;
    use crate::filter::{apply, test_support::sale};
    use crate::io::ingest::Dataset;

    fn view() -> FilteredView {
        let mut with_hour = sale("3", (2023, 1, 2), "Astoria", "Tea", "Chai", 2.5);
        with_hour.hour = Some(14);
        with_hour.quantity = 2;
        let ds = Arc::new(Dataset::from_records(
            "t",
            vec![
                sale("1", (2023, 1, 1), "Astoria", "Coffee", "Latte", 3.0),
                sale("2", (2023, 1, 1), "Lower Manhattan", "Coffee", "Latte", 4.0),
                with_hour,
                sale("4", (2023, 1, 3), "Lower Manhattan", "Coffee", "Espresso", 2.0),
            ],
        ));
        apply(&ds, &FilterParams::select_all(&ds))
    }

    fn run(q: &str) -> Result<QueryResult, QueryError> {
        SqliteEvaluator.evaluate(q, &view())
    }

    #[test]
    fn group_by_location_sums_sales() {
        let r = run(
            "SELECT location, SUM(sales) AS total_sales FROM df_filtered \
             GROUP BY location ORDER BY location",
        )
        .unwrap();
        assert_eq!(r.columns, vec!["location", "total_sales"]);
        assert_eq!(
            r.rows,
            vec![
                vec![Value::Text("Astoria".into()), Value::Number(5.5)],
                vec![Value::Text("Lower Manhattan".into()), Value::Number(6.0)],
            ]
        );
    }

    #[test]
    fn comparisons_distinct_having_and_aggregate_ordering() {
        let r = run("SELECT id FROM df_filtered WHERE sales > 2.9 ORDER BY id").unwrap();
        assert_eq!(
            r.rows,
            vec![vec![Value::Text("1".into())], vec![Value::Text("2".into())]]
        );

        let r = run("SELECT DISTINCT product FROM df_filtered ORDER BY product").unwrap();
        assert_eq!(r.rows.len(), 3);

        let r = run(
            "SELECT product, COUNT(*) AS n FROM df_filtered GROUP BY product \
             HAVING n > 1 ORDER BY SUM(sales) DESC",
        )
        .unwrap();
        assert_eq!(r.rows, vec![vec![Value::Text("Latte".into()), Value::Integer(2)]]);
    }

    #[test]
    fn hour_column_uses_resolved_hour() {
        let r = run("SELECT id, hour FROM df_filtered WHERE hour = 14").unwrap();
        assert_eq!(r.rows, vec![vec![Value::Text("3".into()), Value::Integer(14)]]);
        let r = run("SELECT COUNT(*) FROM df_filtered WHERE hour = 8").unwrap();
        assert_eq!(r.columns, vec!["COUNT(*)"]);
        assert_eq!(r.rows, vec![vec![Value::Integer(3)]]);
    }

    #[test]
    fn ungrouped_aggregates_over_empty_input() {
        let r = run(
            "SELECT COUNT(*), SUM(sales), AVG(quantity) FROM df_filtered WHERE location = 'Nowhere'",
        )
        .unwrap();
        assert_eq!(r.columns, vec!["COUNT(*)", "SUM(sales)", "AVG(quantity)"]);
        assert_eq!(r.rows, vec![vec![Value::Integer(0), Value::Null, Value::Null]]);
    }

    #[test]
    fn star_projects_every_view_column() {
        let r = run("select * from DF_FILTERED order by id limit 2").unwrap();
        assert_eq!(r.columns, VIEW_COLUMNS.to_vec());
        assert_eq!(r.rows.len(), 2);
        assert_eq!(r.rows[0][1], Value::Text("2023-01-01".into()));
        assert_eq!(r.rows[0][2], Value::Text("08:30:00".into()));
    }

    #[test]
    fn integral_columns_stay_integral() {
        let r = run("SELECT SUM(quantity), MAX(sales) FROM df_filtered").unwrap();
        assert_eq!(r.rows, vec![vec![Value::Integer(5), Value::Number(4.0)]]);
    }

    #[test]
    fn errors_are_typed() {
        assert_eq!(
            run("SELECT price FROM df_filtered"),
            Err(QueryError::UnknownColumn("price".into()))
        );
        assert_eq!(
            run("SELECT id FROM sales"),
            Err(QueryError::UnknownTable("sales".into()))
        );
        assert!(matches!(run("SELEC id FROM df_filtered"), Err(QueryError::Syntax(_))));
        assert!(matches!(
            run("DELETE FROM df_filtered"),
            Err(QueryError::Unsupported(_))
        ));
        assert!(matches!(
            run("SELECT 1; SELECT 2"),
            Err(QueryError::Unsupported(_))
        ));
        assert!(matches!(run("  ;  "), Err(QueryError::Syntax(_))));
    }

    #[test]
    fn name_after_strips_trailing_context() {
        assert_eq!(name_after("no such column: price", "no such column: "), Some("price".into()));
        assert_eq!(
            name_after("no such table: sales in SELECT id FROM sales", "no such table: "),
            Some("sales".into())
        );
        assert_eq!(name_after("other", "no such table: "), None);
    }
}
