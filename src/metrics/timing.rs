//! When orders happen: line items per hour of day and per weekday.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::WEEKDAY_ORDER;
use crate::filter::FilteredView;
use crate::metrics::{Entry, first_max};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u8,
    pub count: usize,
}

/// Line items per hour, ascending by hour. Hours without orders are absent,
/// as are rows whose hour could not be resolved.
pub fn orders_per_hour(view: &FilteredView) -> Vec<HourCount> {
    let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
    for hour in view.hours().iter().flatten() {
        *counts.entry(*hour).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Busiest hour; the earliest hour wins a tie.
pub fn peak_hour(view: &FilteredView) -> Option<HourCount> {
    let mut best: Option<HourCount> = None;
    for hc in orders_per_hour(view) {
        match best {
            Some(b) if hc.count <= b.count => {}
            _ => best = Some(hc),
        }
    }
    best
}

/// Line items per weekday in Sunday..Saturday order. Days with no rows carry `None`.
pub fn orders_per_weekday(view: &FilteredView) -> Vec<Entry<Option<usize>>> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in view.records() {
        *counts.entry(r.weekday.as_str()).or_insert(0) += 1;
    }
    WEEKDAY_ORDER
        .iter()
        .map(|day| Entry::new(*day, counts.get(day).copied()))
        .collect()
}

/// Busiest weekday, or `None` when no weekday has any orders.
pub fn peak_day(view: &FilteredView) -> Option<Entry<usize>> {
    let present: Vec<Entry<usize>> = orders_per_weekday(view)
        .into_iter()
        .filter_map(|e| e.value.map(|v| Entry::new(e.label, v)))
        .collect();
    first_max(&present).filter(|e| e.value > 0)
}
