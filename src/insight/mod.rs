//! One-line natural-language summaries of each view's top result.
//!
//! Every generator takes the aggregator's output table (not the view), so the
//! sentence always describes exactly what the chart shows. An empty table
//! produces a `NoData` insight instead of formatting an absent value.

use std::fmt;

use serde::Serialize;

use crate::math::ratio_or_zero;
use crate::metrics::{Entry, HourCount, OutlierReport, first_max};
use crate::report::fmt_money;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Insight {
    Finding(String),
    NoData(String),
}

impl Insight {
    pub fn text(&self) -> &str {
        match self {
            Insight::Finding(s) | Insight::NoData(s) => s,
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, Insight::Finding(_))
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

fn no_data(context: &str) -> Insight {
    Insight::NoData(format!("No data available {context}."))
}

fn share_pct(part: f64, total: f64) -> f64 {
    ratio_or_zero(part, total) * 100.0
}

pub fn monthly(monthly: &[Entry<f64>]) -> Insight {
    match first_max(monthly) {
        Some(top) => Insight::Finding(format!(
            "{} had the highest sales ({}).",
            top.label,
            fmt_money(top.value)
        )),
        None => no_data("for the selected period"),
    }
}

pub fn locations(locations: &[Entry<f64>]) -> Insight {
    let Some(top) = first_max(locations) else {
        return no_data("for the selected locations");
    };
    let total: f64 = locations.iter().map(|e| e.value).sum();
    Insight::Finding(format!(
        "{} generated the most revenue ({}), accounting for {:.1}% of total sales.",
        top.label,
        fmt_money(top.value),
        share_pct(top.value, total)
    ))
}

/// `total_revenue` is the view's revenue across all products, not just the top ten.
pub fn top_products(top: &[Entry<f64>], total_revenue: f64) -> Insight {
    let Some(best) = top.first() else {
        return no_data("for product sales");
    };
    Insight::Finding(format!(
        "'{}' is the best-selling product ({}), {:.1}% of total sales.",
        best.label,
        fmt_money(best.value),
        share_pct(best.value, total_revenue)
    ))
}

pub fn category_aov(by_category: &[Entry<f64>]) -> Insight {
    match by_category.first() {
        Some(top) => Insight::Finding(format!(
            "'{}' has the highest average order value ({}).",
            top.label,
            fmt_money(top.value)
        )),
        None => no_data("for categories"),
    }
}

pub fn popularity(counts: &[Entry<usize>]) -> Insight {
    match counts.first() {
        Some(top) => Insight::Finding(format!(
            "'{}' is the most frequently purchased category ({} orders).",
            top.label, top.value
        )),
        None => no_data("for category counts"),
    }
}

pub fn peak_hour(peak: Option<HourCount>) -> Insight {
    match peak {
        Some(p) => Insight::Finding(format!(
            "Most orders are placed at {}:00 ({} orders). Consider staffing accordingly.",
            p.hour, p.count
        )),
        None => no_data("for hourly orders"),
    }
}

pub fn peak_day(peak: Option<&Entry<usize>>) -> Insight {
    match peak {
        Some(p) => Insight::Finding(format!(
            "{} is the busiest day with {} orders.",
            p.label, p.value
        )),
        None => no_data("for weekday orders"),
    }
}

pub fn coffee(mix: &[Entry<usize>]) -> Insight {
    match mix.first() {
        Some(top) => Insight::Finding(format!(
            "'{}' is the most popular coffee type with {} orders.",
            top.label, top.value
        )),
        None => no_data("for coffee types"),
    }
}

/// Outlier summary. `rows` is the size of the view the report was computed on.
pub fn outliers(report: &OutlierReport, rows: usize) -> Insight {
    if rows == 0 {
        return no_data("to analyze for outliers");
    }
    match report.count() {
        0 => Insight::Finding("No significant outliers detected.".to_string()),
        n => Insight::Finding(format!("Number of outlier transactions: {n}.")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_say_no_data() {
        for insight in [
            monthly(&[]),
            locations(&[]),
            top_products(&[], 0.0),
            category_aov(&[]),
            popularity(&[]),
            peak_hour(None),
            peak_day(None),
            coffee(&[]),
        ] {
            assert!(!insight.has_data());
            assert!(insight.text().starts_with("No data available"), "{insight}");
        }
    }

    #[test]
    fn location_insight_reports_share() {
        let table = vec![Entry::new("Astoria", 300.0), Entry::new("Lower Manhattan", 100.0)];
        assert_eq!(
            locations(&table).text(),
            "Astoria generated the most revenue ($300.00), accounting for 75.0% of total sales."
        );
    }

    #[test]
    fn top_product_share_uses_view_revenue() {
        let top = vec![Entry::new("Latte", 1250.5)];
        assert_eq!(
            top_products(&top, 5002.0).text(),
            "'Latte' is the best-selling product ($1,250.50), 25.0% of total sales."
        );
    }

    #[test]
    fn monthly_picks_first_maximum() {
        let table = vec![
            Entry::new("January", 10.0),
            Entry::new("February", 20.0),
            Entry::new("March", 20.0),
        ];
        assert_eq!(monthly(&table).text(), "February had the highest sales ($20.00).");
    }

    #[test]
    fn hour_and_day_templates() {
        assert_eq!(
            peak_hour(Some(HourCount { hour: 9, count: 3 })).text(),
            "Most orders are placed at 9:00 (3 orders). Consider staffing accordingly."
        );
        assert_eq!(
            peak_day(Some(&Entry::new("Friday", 12))).text(),
            "Friday is the busiest day with 12 orders."
        );
    }

    #[test]
    fn outlier_summary() {
        let report = OutlierReport {
            mean: 1.0,
            std: Some(1.0),
            threshold: 3.0,
            outliers: vec![],
        };
        assert_eq!(outliers(&report, 10).text(), "No significant outliers detected.");
        assert!(!outliers(&report, 0).has_data());
    }
}
