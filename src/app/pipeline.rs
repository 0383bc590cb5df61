//! Shared "recompute" logic used by both CLI and TUI front-ends.
//!
//! Every filter change runs the same workflow:
//! filter -> KPIs -> per-view tables -> insights
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::sync::Arc;

use serde::Serialize;

use crate::domain::FilterParams;
use crate::filter::{self, FilteredView};
use crate::insight::{self, Insight};
use crate::io::ingest::Dataset;
use crate::metrics::{self, Entry, HourCount, Kpis, OutlierReport};

/// One insight per view, in tab order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub monthly: Insight,
    pub locations: Insight,
    pub products: Insight,
    pub category_aov: Insight,
    pub popularity: Insight,
    pub hours: Insight,
    pub weekdays: Insight,
    pub coffee: Insight,
    pub outliers: Insight,
}

/// Everything the dashboard shows for one set of filter selections.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub source: String,
    pub filters: FilterParams,
    /// Rows in the filtered view.
    pub rows: usize,
    pub kpis: Kpis,
    pub monthly: Vec<Entry<f64>>,
    pub locations: Vec<Entry<f64>>,
    pub top_products: Vec<Entry<f64>>,
    pub category_aov: Vec<Entry<f64>>,
    pub popularity: Vec<Entry<usize>>,
    pub hours: Vec<HourCount>,
    pub peak_hour: Option<HourCount>,
    pub weekdays: Vec<Entry<Option<usize>>>,
    pub peak_day: Option<Entry<usize>>,
    pub coffee: Vec<Entry<usize>>,
    pub outliers: OutlierReport,
    pub insights: Insights,
    #[serde(skip)]
    pub view: FilteredView,
}

/// Filter `dataset` with `params` and compute every derived output.
///
/// Pure with respect to its inputs: the same dataset and params always give
/// the same dashboard.
pub fn recompute(dataset: &Arc<Dataset>, params: &FilterParams) -> Dashboard {
    let view = filter::apply(dataset, params);
    summarize(view, params.clone())
}

/// Compute the dashboard for an already-filtered view.
pub fn summarize(view: FilteredView, filters: FilterParams) -> Dashboard {
    let kpis = metrics::kpis(&view);
    let monthly = metrics::monthly_sales(&view);
    let locations = metrics::location_sales(&view);
    let top_products = metrics::top_products(&view);
    let category_aov = metrics::category_aov(&view);
    let popularity = metrics::category_popularity(&view);
    let hours = metrics::orders_per_hour(&view);
    let peak_hour = metrics::peak_hour(&view);
    let weekdays = metrics::orders_per_weekday(&view);
    let peak_day = metrics::peak_day(&view);
    let coffee = metrics::coffee_mix(&view);
    let outliers = metrics::detect_outliers(&view);

    let insights = Insights {
        monthly: insight::monthly(&monthly),
        locations: insight::locations(&locations),
        products: insight::top_products(&top_products, kpis.total_revenue),
        category_aov: insight::category_aov(&category_aov),
        popularity: insight::popularity(&popularity),
        hours: insight::peak_hour(peak_hour),
        weekdays: insight::peak_day(peak_day.as_ref()),
        coffee: insight::coffee(&coffee),
        outliers: insight::outliers(&outliers, view.len()),
    };

    tracing::debug!(
        rows = view.len(),
        revenue = kpis.total_revenue,
        orders = kpis.total_orders,
        outliers = outliers.count(),
        "dashboard recomputed"
    );

    Dashboard {
        source: view.dataset().source.clone(),
        filters,
        rows: view.len(),
        kpis,
        monthly,
        locations,
        top_products,
        category_aov,
        popularity,
        hours,
        peak_hour,
        weekdays,
        peak_day,
        coffee,
        outliers,
        insights,
        view,
    }
}

impl Dashboard {
    /// Insight for a view.
    pub fn insight(&self, kind: crate::domain::ViewKind) -> &Insight {
        use crate::domain::ViewKind;
        match kind {
            ViewKind::Monthly => &self.insights.monthly,
            ViewKind::Locations => &self.insights.locations,
            ViewKind::Products => &self.insights.products,
            ViewKind::CategoryAov => &self.insights.category_aov,
            ViewKind::Popularity => &self.insights.popularity,
            ViewKind::Hours => &self.insights.hours,
            ViewKind::Weekdays => &self.insights.weekdays,
            ViewKind::Coffee => &self.insights.coffee,
            ViewKind::Outliers => &self.insights.outliers,
        }
    }
}
