//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the filter/aggregate pipeline
//! - exported to JSON/CSV
//! - reloaded later for comparisons

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Calendar months shown by the monthly sales view, in display order.
///
/// The dataset covers the first half of the year; any other month is dropped.
pub const MONTH_ORDER: [&str; 6] = ["January", "February", "March", "April", "May", "June"];

/// Weekdays in the order used by the peak-day view (Sunday first).
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Category whose products make up the coffee-type mix.
pub const COFFEE_CATEGORY: &str = "Coffee";

/// Number of products shown by the top-products view.
pub const TOP_PRODUCTS: usize = 10;

/// Absolute z-score above which a sale counts as an outlier.
pub const OUTLIER_Z_THRESHOLD: f64 = 3.0;

/// One line item of the sales table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    /// Order identifier; several line items may share one order.
    pub id: String,
    /// `None` when the source value did not parse as a calendar date.
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub location: String,
    pub category: String,
    pub product: String,
    pub sales: f64,
    pub quantity: i64,
    pub weekday: String,
    pub month: String,
    /// Hour of day as stored in the source. Views that need an hour for rows
    /// without one use the value cached on the filtered view.
    pub hour: Option<u8>,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls inside the range. `None` never matches.
    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        match date {
            Some(d) => d >= self.start && d <= self.end,
            None => false,
        }
    }
}

/// The user's current filter selections.
///
/// An empty `locations` or `categories` set selects nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    pub date_range: DateRange,
    pub locations: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

/// The aggregate views the dashboard can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    /// Sales by month (January..June).
    Monthly,
    /// Sales by store location.
    Locations,
    /// Top 10 products by revenue.
    Products,
    /// Mean line-item value by category.
    CategoryAov,
    /// Line items per category.
    Popularity,
    /// Line items per hour of day.
    Hours,
    /// Line items per weekday.
    Weekdays,
    /// Line items per coffee product.
    Coffee,
    /// Z-score sales outliers.
    Outliers,
}

impl ViewKind {
    pub const ALL: [ViewKind; 9] = [
        ViewKind::Monthly,
        ViewKind::Locations,
        ViewKind::Products,
        ViewKind::CategoryAov,
        ViewKind::Popularity,
        ViewKind::Hours,
        ViewKind::Weekdays,
        ViewKind::Coffee,
        ViewKind::Outliers,
    ];

    /// Tab/section title.
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::Monthly => "Monthly Sales",
            ViewKind::Locations => "Location Sales",
            ViewKind::Products => "Top Products",
            ViewKind::CategoryAov => "AOV by Category",
            ViewKind::Popularity => "Popular Category",
            ViewKind::Hours => "Peak Hour",
            ViewKind::Weekdays => "Peak Day",
            ViewKind::Coffee => "Coffee Types",
            ViewKind::Outliers => "Outliers",
        }
    }
}
