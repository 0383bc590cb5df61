//! Headline KPIs: revenue, distinct orders, AOV, and the top-grossing location.

use std::collections::HashSet;

use serde::Serialize;

use crate::filter::FilteredView;
use crate::math::ratio_or_zero;
use crate::metrics::{Entry, first_max, location_sales};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_orders: usize,
    /// Average order value; `0.0` when there are no orders.
    pub aov: f64,
    /// `None` on an empty view.
    pub peak_location: Option<Entry<f64>>,
}

pub fn total_revenue(view: &FilteredView) -> f64 {
    view.records().map(|r| r.sales).sum()
}

/// Count of distinct order ids (line items of one order count once).
pub fn total_orders(view: &FilteredView) -> usize {
    view.records().map(|r| r.id.as_str()).collect::<HashSet<_>>().len()
}

/// Average order value; an empty selection yields `0.0` rather than NaN.
pub fn aov(total_revenue: f64, total_orders: usize) -> f64 {
    ratio_or_zero(total_revenue, total_orders as f64)
}

/// Location with the highest revenue; the first in key order wins a tie.
pub fn peak_location(view: &FilteredView) -> Option<Entry<f64>> {
    first_max(&location_sales(view))
}

pub fn kpis(view: &FilteredView) -> Kpis {
    let total_revenue = total_revenue(view);
    let total_orders = total_orders(view);
    Kpis {
        total_revenue,
        total_orders,
        aov: aov(total_revenue, total_orders),
        peak_location: peak_location(view),
    }
}
