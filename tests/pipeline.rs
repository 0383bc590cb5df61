//! End-to-end: CSV on disk -> dataset -> filters -> dashboard.

use std::fs;
use std::sync::Arc;

use sales_dash::app::pipeline::recompute;
use sales_dash::app::session::Session;
use sales_dash::domain::{FilterParams, ViewKind};
use sales_dash::filter::selection;
use sales_dash::io::ingest::load_dataset;
use sales_dash::query::{QueryError, SqliteEvaluator, Value};

const CSV: &str = "\
id,date,time,location,category,product,sales,quantity
1,2023-01-02,07:15:00,Astoria,Coffee,Latte,4.25,1
1,2023-01-02,07:15:00,Astoria,Bakery,Scone,3.25,1
2,2023-01-09,08:05:00,Hell's Kitchen,Coffee,Espresso,3.00,1
3,2023-02-06,09:40:00,Lower Manhattan,Tea,Earl Grey,2.75,1
4,2023-03-01,10:00:00,Astoria,Coffee,Latte,8.50,2.0
5,2023-03-02,bad,Astoria,Coffee,Latte,abc,1
";

fn load() -> (tempfile::TempDir, Arc<sales_dash::io::ingest::Dataset>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    fs::write(&path, CSV).unwrap();
    let ds = load_dataset(&path).unwrap();
    (dir, Arc::new(ds))
}

#[test]
fn loads_and_summarizes_everything() {
    let (_dir, ds) = load();
    assert_eq!(ds.rows_read, 6);
    assert_eq!(ds.len(), 5);
    assert_eq!(ds.row_errors.len(), 1);
    assert_eq!(ds.row_errors[0].line, 7);

    let dash = recompute(&ds, &FilterParams::select_all(&ds));
    assert_eq!(dash.rows, 5);
    assert!((dash.kpis.total_revenue - 21.75).abs() < 1e-9);
    assert_eq!(dash.kpis.total_orders, 4);
    assert!((dash.kpis.aov - 5.4375).abs() < 1e-9);
    let peak = dash.kpis.peak_location.as_ref().unwrap();
    assert_eq!(peak.label, "Astoria");
    assert!((peak.value - 16.0).abs() < 1e-9);

    let months: Vec<&str> = dash.monthly.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(months, ["January", "February", "March"]);
    assert!(dash.insight(ViewKind::Monthly).text().starts_with("January"));

    // Hours come from the time column when there is no hour column.
    let busiest: Vec<u8> = dash.hours.iter().map(|h| h.hour).collect();
    assert_eq!(busiest, [7, 8, 9, 10]);
}

#[test]
fn filters_narrow_every_output() {
    let (_dir, ds) = load();
    let mut params = FilterParams::select_all(&ds);
    params.locations = selection(["Astoria"]);
    params.categories = selection(["Coffee"]);

    let dash = recompute(&ds, &params);
    assert_eq!(dash.rows, 2);
    assert!((dash.kpis.total_revenue - 12.75).abs() < 1e-9);
    assert_eq!(dash.locations.len(), 1);
    assert_eq!(dash.coffee.len(), 1);
    assert_eq!(dash.coffee[0].label, "Latte");
    assert_eq!(dash.coffee[0].value, 2);

    params.locations.clear();
    let empty = recompute(&ds, &params);
    assert_eq!(empty.rows, 0);
    assert!(empty.kpis.peak_location.is_none());
    assert!(!empty.insight(ViewKind::Locations).has_data());
}

#[test]
fn queries_run_on_the_filtered_view() {
    let (_dir, ds) = load();
    let params = FilterParams::select_all(&ds);
    let mut session = Session::new(ds, params);

    let r = session
        .query(
            &SqliteEvaluator,
            "SELECT location, SUM(sales) AS total FROM df_filtered GROUP BY location ORDER BY total DESC",
        )
        .unwrap();
    assert_eq!(r.columns, ["location", "total"]);
    assert_eq!(r.rows[0][0], Value::Text("Astoria".to_string()));
    assert_eq!(r.rows[0][1], Value::Number(16.0));

    session.toggle_location("Astoria");
    let r = session
        .query(&SqliteEvaluator, "select count(*) as n from df_filtered")
        .unwrap();
    assert_eq!(r.rows, vec![vec![Value::Integer(2)]]);

    let err = session.query(&SqliteEvaluator, "SELECT * FROM sales").unwrap_err();
    assert!(matches!(err, QueryError::UnknownTable(_)));
}

#[test]
fn drilldown_follows_the_selection() {
    let (_dir, ds) = load();
    let params = FilterParams::select_all(&ds);
    let mut session = Session::new(ds, params);

    assert_eq!(session.products(), ["Latte", "Scone", "Espresso", "Earl Grey"]);
    let latte = session.drilldown("Latte");
    assert_eq!(latte.len(), 2);
    assert!(latte[0].date < latte[1].date);

    session.select_all_categories(false);
    assert!(session.drilldown("Latte").is_empty());
    assert!(session.products().is_empty());
}
