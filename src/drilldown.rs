//! Per-product drilldown over the current filtered view.

use chrono::NaiveDate;
use serde::Serialize;

use crate::filter::FilteredView;

/// One line item of a product's sales trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub location: String,
    pub sales: f64,
    pub quantity: i64,
}

/// Rows of `view` whose product equals `product` exactly, oldest first.
///
/// Same-day rows keep view order. A product with no rows in the view (e.g.
/// filtered out by date or category) yields an empty series.
pub fn drilldown(view: &FilteredView, product: &str) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = view
        .records()
        .filter(|r| r.product == product)
        .filter_map(|r| {
            Some(TrendPoint {
                date: r.date?,
                location: r.location.clone(),
                sales: r.sales,
                quantity: r.quantity,
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Total sales per date for a drilldown series, for charting.
pub fn daily_totals(points: &[TrendPoint]) -> Vec<(NaiveDate, f64)> {
    let mut out: Vec<(NaiveDate, f64)> = Vec::new();
    for p in points {
        match out.last_mut() {
            Some((d, total)) if *d == p.date => *total += p.sales,
            _ => out.push((p.date, p.sales)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::FilterParams;
    use crate::filter::{apply, selection, test_support::sale};
    use crate::io::ingest::Dataset;

    fn dataset() -> Arc<Dataset> {
        Arc::new(Dataset::from_records(
            "t",
            vec![
                sale("1", (2023, 2, 3), "A", "Coffee", "Latte", 3.0),
                sale("2", (2023, 1, 9), "B", "Coffee", "Latte", 4.0),
                sale("3", (2023, 1, 9), "A", "Tea", "Chai", 2.0),
                sale("4", (2023, 1, 9), "A", "Coffee", "Latte", 1.5),
                sale("5", (2023, 1, 9), "A", "Coffee", "Latte ", 9.0),
            ],
        ))
    }

    #[test]
    fn sorted_by_date_and_exact_match_only() {
        let ds = dataset();
        let view = apply(&ds, &FilterParams::select_all(&ds));
        let series = drilldown(&view, "Latte");
        let sales: Vec<f64> = series.iter().map(|p| p.sales).collect();
        assert_eq!(sales, vec![4.0, 1.5, 3.0]);
        assert!(series.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn filtered_out_product_is_empty_not_an_error() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.categories = selection(["Tea"]);
        let view = apply(&ds, &params);
        assert!(drilldown(&view, "Latte").is_empty());
        assert!(drilldown(&view, "Nonexistent").is_empty());
    }

    #[test]
    fn daily_totals_merge_same_day_rows() {
        let ds = dataset();
        let view = apply(&ds, &FilterParams::select_all(&ds));
        let totals = daily_totals(&drilldown(&view, "Latte"));
        assert_eq!(totals.len(), 2);
        assert!((totals[0].1 - 5.5).abs() < 1e-12);
    }
}
