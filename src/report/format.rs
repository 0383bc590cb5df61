//! Formatted terminal output for the CLI front-end.
//!
//! We keep formatting code in one place so:
//! - the metric code stays clean and testable
//! - output changes are localized (easy to pin with string tests)

use crate::app::pipeline::Dashboard;
use crate::domain::ViewKind;
use crate::drilldown::TrendPoint;
use crate::io::ingest::Dataset;
use crate::metrics::{Entry, Kpis, OutlierReport, chart_labels};
use crate::query::QueryResult;

/// How many row errors the load summary lists before eliding the rest.
const MAX_LISTED_ROW_ERRORS: usize = 5;

/// `$1,234.50`. Negative amounts render as `-$1.00`.
pub fn fmt_money(v: f64) -> String {
    let sign = if v < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", v.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    format!("{sign}${}.{frac}", group_thousands(whole))
}

/// `12,345`.
pub fn fmt_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dataset load summary: source, row counts, and the first few rejected rows.
pub fn format_load_summary(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str("=== sales-dash - Coffee Shop Sales ===\n");
    out.push_str(&format!("Source: {}\n", dataset.source));
    out.push_str(&format!(
        "Rows: read={} | used={} | rejected={} | null dates={}\n",
        dataset.rows_read,
        dataset.len(),
        dataset.row_errors.len(),
        dataset.null_dates()
    ));
    if let Some((start, end)) = dataset.date_bounds() {
        out.push_str(&format!("Dates: {start} .. {end}\n"));
    }
    out.push_str(if dataset.has_hour_column {
        "Hours: from `hour` column\n"
    } else {
        "Hours: derived from `time`\n"
    });
    for e in dataset.row_errors.iter().take(MAX_LISTED_ROW_ERRORS) {
        let id = e.id.as_deref().unwrap_or("?");
        out.push_str(&format!("  (line {} id={id}) {}\n", e.line, e.message));
    }
    if dataset.row_errors.len() > MAX_LISTED_ROW_ERRORS {
        out.push_str(&format!(
            "  ... {} more rejected rows\n",
            dataset.row_errors.len() - MAX_LISTED_ROW_ERRORS
        ));
    }
    out
}

pub fn format_kpis(kpis: &Kpis) -> String {
    let peak = match &kpis.peak_location {
        Some(e) => format!("{} ({})", e.label, fmt_money(e.value)),
        None => format!("N/A ({})", fmt_money(0.0)),
    };
    format!(
        "Total Revenue: {}\nTotal Orders: {}\nAvg Order Value: {}\nPeak Location: {peak}\n",
        fmt_money(kpis.total_revenue),
        fmt_count(kpis.total_orders),
        fmt_money(kpis.aov),
    )
}

/// Active filters and the resulting row count, then the KPI block.
pub fn format_kpis_and_filters(dash: &Dashboard) -> String {
    let mut out = format!(
        "Filters: {} .. {} | {} location(s) | {} category(ies) | {} row(s)\n\n",
        dash.filters.date_range.start,
        dash.filters.date_range.end,
        dash.filters.locations.len(),
        dash.filters.categories.len(),
        dash.rows
    );
    out.push_str(&format_kpis(&dash.kpis));
    out
}

/// Full CLI summary: KPIs followed by every view.
pub fn format_summary(dash: &Dashboard) -> String {
    let mut out = format_kpis_and_filters(dash);
    for kind in ViewKind::ALL {
        out.push('\n');
        out.push_str(&format_view(dash, kind));
    }
    out
}

/// One view as a titled table followed by its insight line.
pub fn format_view(dash: &Dashboard, kind: ViewKind) -> String {
    let labels = chart_labels(kind);
    let mut out = format!("{}:\n", labels.title);

    let body = match kind {
        ViewKind::Monthly => money_table(labels.key, labels.value, &dash.monthly),
        ViewKind::Locations => money_table(labels.key, labels.value, &dash.locations),
        ViewKind::Products => money_table(labels.key, labels.value, &dash.top_products),
        ViewKind::CategoryAov => money_table(labels.key, labels.value, &dash.category_aov),
        ViewKind::Popularity => count_table(labels.key, labels.value, &dash.popularity),
        ViewKind::Hours => {
            let rows: Vec<Entry<usize>> = dash
                .hours
                .iter()
                .map(|h| Entry::new(h.hour.to_string(), h.count))
                .collect();
            count_table(labels.key, labels.value, &rows)
        }
        ViewKind::Weekdays => {
            let mut t = table_header(labels.key, labels.value);
            for e in &dash.weekdays {
                let v = e.value.map(fmt_count).unwrap_or_else(|| "-".to_string());
                t.push_str(&table_row(&e.label, &v));
            }
            t
        }
        ViewKind::Coffee => count_table(labels.key, labels.value, &dash.coffee),
        ViewKind::Outliers => format_outliers(&dash.outliers),
    };
    out.push_str(&body);
    out.push_str(&format!("Insight: {}\n", dash.insight(kind)));
    out
}

fn table_header(key: &str, value: &str) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<28} {:>14}", key, value).trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<28} {:-<14}\n", "", ""));
    out
}

fn table_row(key: &str, value: &str) -> String {
    let mut line = format!("{:<28} {:>14}", truncate(key, 28), value);
    line.truncate(line.trim_end().len());
    line.push('\n');
    line
}

fn money_table(key: &str, value: &str, rows: &[Entry<f64>]) -> String {
    let mut out = table_header(key, value);
    for e in rows {
        out.push_str(&table_row(&e.label, &fmt_money(e.value)));
    }
    out
}

fn count_table(key: &str, value: &str, rows: &[Entry<usize>]) -> String {
    let mut out = table_header(key, value);
    for e in rows {
        out.push_str(&table_row(&e.label, &fmt_count(e.value)));
    }
    out
}

pub fn format_outliers(report: &OutlierReport) -> String {
    let mut out = String::new();
    let std = report.std.map(|s| format!("{s:.2}")).unwrap_or_else(|| "n/a".to_string());
    out.push_str(&format!(
        "mean={} std={std} threshold=|z|>{:.1} flagged={}\n",
        fmt_money(report.mean),
        report.threshold,
        report.count()
    ));
    if report.outliers.is_empty() {
        return out;
    }

    out.push_str(
        format!(
            "{:<12} {:<10} {:<20} {:>12} {:>8}",
            "id", "date", "location", "sales", "z"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!("{:-<12} {:-<10} {:-<20} {:-<12} {:-<8}\n", "", "", "", "", ""));
    for o in &report.outliers {
        let date = o.date.map(|d| d.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "{:<12} {:<10} {:<20} {:>12} {:>8.2}\n",
            truncate(&o.id, 12),
            date,
            truncate(&o.location, 20),
            fmt_money(o.sales),
            o.z
        ));
    }
    out
}

pub fn format_drilldown(product: &str, points: &[TrendPoint]) -> String {
    let mut out = format!("Sales Trend for {product}:\n");
    if points.is_empty() {
        out.push_str("No sales for this product in the current selection.\n");
        return out;
    }
    out.push_str(format!("{:<10} {:<20} {:>12} {:>8}", "date", "location", "sales", "qty").trim_end());
    out.push('\n');
    out.push_str(&format!("{:-<10} {:-<20} {:-<12} {:-<8}\n", "", "", "", ""));
    for p in points {
        out.push_str(&format!(
            "{:<10} {:<20} {:>12} {:>8}\n",
            p.date,
            truncate(&p.location, 20),
            fmt_money(p.sales),
            p.quantity
        ));
    }
    let total: f64 = points.iter().map(|p| p.sales).sum();
    out.push_str(&format!("Total: {} over {} line item(s)\n", fmt_money(total), points.len()));
    out
}

/// Query results as a left-aligned text grid sized to the widest cell.
pub fn format_query_result(result: &QueryResult) -> String {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|v| truncate(&v.to_string(), 32)).collect())
        .collect();
    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .filter_map(|r| r.get(i))
                .map(|s| s.chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<String>| -> String {
        let parts: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{v:<w$}"))
            .collect();
        let mut s = parts.join("  ").trim_end().to_string();
        s.push('\n');
        s
    };

    let mut out = line(result.columns.clone());
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    for row in cells {
        out.push_str(&line(row));
    }
    out.push_str(&format!("({} row(s))\n", result.rows.len()));
    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Value;

    #[test]
    fn money_has_separators_and_cents() {
        assert_eq!(fmt_money(1250.5), "$1,250.50");
        assert_eq!(fmt_money(300.0), "$300.00");
        assert_eq!(fmt_money(0.0), "$0.00");
        assert_eq!(fmt_money(1234567.891), "$1,234,567.89");
        assert_eq!(fmt_money(-5.0), "-$5.00");
        assert_eq!(fmt_count(1000), "1,000");
        assert_eq!(fmt_count(999), "999");
    }

    #[test]
    fn truncate_marks_cut_strings() {
        assert_eq!(truncate("Lower Manhattan", 8), "Lower M.");
        assert_eq!(truncate("Astoria", 8), "Astoria");
    }

    #[test]
    fn load_summary_names_the_hour_source() {
        use crate::filter::test_support::sale;

        let derived = Dataset::from_records("a.csv", vec![sale("1", (2023, 1, 2), "Astoria", "Coffee", "Latte", 3.0)]);
        assert_eq!(
            format_load_summary(&derived),
            "=== sales-dash - Coffee Shop Sales ===\n\
             Source: a.csv\n\
             Rows: read=1 | used=1 | rejected=0 | null dates=0\n\
             Dates: 2023-01-02 .. 2023-01-02\n\
             Hours: derived from `time`\n"
        );

        let mut row = sale("1", (2023, 1, 2), "Astoria", "Coffee", "Latte", 3.0);
        row.hour = Some(9);
        let stored = Dataset::from_records("b.csv", vec![row]);
        assert!(format_load_summary(&stored).contains("Hours: from `hour` column\n"));
    }

    #[test]
    fn kpi_block_handles_empty_view() {
        let kpis = Kpis {
            total_revenue: 0.0,
            total_orders: 0,
            aov: 0.0,
            peak_location: None,
        };
        assert_eq!(
            format_kpis(&kpis),
            "Total Revenue: $0.00\nTotal Orders: 0\nAvg Order Value: $0.00\nPeak Location: N/A ($0.00)\n"
        );
    }

    #[test]
    fn query_grid_pads_columns() {
        let result = QueryResult {
            columns: vec!["location".into(), "n".into()],
            rows: vec![
                vec![Value::Text("Astoria".into()), Value::Integer(12)],
                vec![Value::Text("Hell's Kitchen".into()), Value::Null],
            ],
        };
        assert_eq!(
            format_query_result(&result),
            "location        n\n\
             --------------  ----\n\
             Astoria         12\n\
             Hell's Kitchen  NULL\n\
             (2 row(s))\n"
        );
    }
}
