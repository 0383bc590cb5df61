//! Metric aggregators: one pure function per dashboard view.
//!
//! Every aggregator reads a `FilteredView` and returns a small, already-ordered
//! table that a chart collaborator can draw as-is. Empty views produce empty
//! tables or zeros, never errors.
//!
//! Grouping conventions (kept deterministic on purpose):
//! - sums/means grouped by a text key come out in key order, like a sorted group-by
//! - descending sorts are stable, so ties keep that key order
//! - counts sorted by frequency break ties by first appearance in the view

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::ViewKind;

pub mod breakdown;
pub mod kpi;
pub mod outliers;
pub mod timing;

pub use breakdown::*;
pub use kpi::*;
pub use outliers::*;
pub use timing::*;

/// One row of an aggregate table: an entity and its metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<V> {
    pub label: String,
    pub value: V,
}

impl<V> Entry<V> {
    pub fn new(label: impl Into<String>, value: V) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Title and axis labels handed to the chart collaborator with each table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartLabels {
    pub title: &'static str,
    pub key: &'static str,
    pub value: &'static str,
}

/// Chart labels for a view.
pub fn chart_labels(kind: ViewKind) -> ChartLabels {
    let (title, key, value) = match kind {
        ViewKind::Monthly => ("Sales by Month", "Month", "Sales"),
        ViewKind::Locations => ("Sales by Location", "Location", "Sales"),
        ViewKind::Products => ("Top 10 Products by Revenue", "Product", "Sales"),
        ViewKind::CategoryAov => ("Average Order Value by Category", "Category", "Average Order Value"),
        ViewKind::Popularity => ("Popular Category", "Category", "Count"),
        ViewKind::Hours => ("Peak Hour", "Hour of Day", "Number of Orders"),
        ViewKind::Weekdays => ("Peak Day", "Weekday", "Count of Orders"),
        ViewKind::Coffee => ("Order Distribution by Coffee Type", "Product", "Order Count"),
        ViewKind::Outliers => ("Sales Outliers (|z| > 3)", "Order", "Sales"),
    };
    ChartLabels { title, key, value }
}

/// Sum `value` per key; keys come out sorted.
pub(crate) fn sum_by_key<'a, I>(rows: I) -> Vec<Entry<f64>>
where
    I: Iterator<Item = (&'a str, f64)>,
{
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (key, value) in rows {
        *sums.entry(key).or_insert(0.0) += value;
    }
    sums.into_iter().map(|(k, v)| Entry::new(k, v)).collect()
}

/// Count rows per key, most frequent first; ties keep first-seen order.
pub(crate) fn count_by_frequency<'a, I>(keys: I) -> Vec<Entry<usize>>
where
    I: Iterator<Item = &'a str>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<Entry<usize>> = Vec::new();
    for key in keys {
        match slots.get(key) {
            Some(&idx) => out[idx].value += 1,
            None => {
                slots.insert(key, out.len());
                out.push(Entry::new(key, 1));
            }
        }
    }
    out.sort_by(|a, b| b.value.cmp(&a.value));
    out
}

/// Stable descending sort by value.
pub(crate) fn sort_desc(entries: &mut [Entry<f64>]) {
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

/// First entry holding the maximum value.
pub(crate) fn first_max<V: PartialOrd + Clone>(entries: &[Entry<V>]) -> Option<Entry<V>> {
    let mut best: Option<&Entry<V>> = None;
    for e in entries {
        match best {
            Some(b) if e.value <= b.value => {}
            _ => best = Some(e),
        }
    }
    best.cloned()
}
