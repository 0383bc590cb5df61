//! Filter engine: turns the immutable dataset plus the user's selections into
//! the filtered view every aggregator reads.
//!
//! The view is rebuilt from scratch for every filter change. It never mutates
//! the dataset; it holds row indices into it plus the per-row hour, resolved
//! once here so all views agree on it.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Timelike;

use crate::domain::{DateRange, FilterParams, SaleRecord};
use crate::io::ingest::{Dataset, distinct};

/// Stable name under which the filtered view is exposed to ad-hoc queries.
pub const FILTERED_VIEW_NAME: &str = "df_filtered";

/// The rows of a dataset that match one `FilterParams`.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
    hours: Vec<Option<u8>>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Matching records, in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &SaleRecord> + '_ {
        self.indices.iter().map(|&i| &self.dataset.records[i])
    }

    /// Matching records paired with their resolved hour of day.
    pub fn rows(&self) -> impl Iterator<Item = (&SaleRecord, Option<u8>)> + '_ {
        self.records().zip(self.hours.iter().copied())
    }

    /// Resolved hour of day per row (stored hour, else derived from `time`).
    pub fn hours(&self) -> &[Option<u8>] {
        &self.hours
    }

    /// Distinct products in first-seen order.
    pub fn products(&self) -> Vec<String> {
        distinct(self.records().map(|r| r.product.as_str()))
    }
}

impl FilterParams {
    /// Everything selected: the dataset's full date span and every location and
    /// category. This is the dashboard's initial state.
    ///
    /// An empty or all-null-date dataset gets a degenerate range that matches nothing.
    pub fn select_all(dataset: &Dataset) -> Self {
        let date_range = match dataset.date_bounds() {
            Some((start, end)) => DateRange::new(start, end),
            None => DateRange::new(chrono::NaiveDate::MAX, chrono::NaiveDate::MIN),
        };
        Self {
            date_range,
            locations: dataset.locations().into_iter().collect(),
            categories: dataset.categories().into_iter().collect(),
        }
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.date_range.contains(record.date)
            && self.locations.contains(&record.location)
            && self.categories.contains(&record.category)
    }
}

/// Apply `params` to `dataset`.
///
/// Never fails: an empty selection set, an inverted date range, or a dataset
/// without parsed dates simply produce an empty view.
pub fn apply(dataset: &Arc<Dataset>, params: &FilterParams) -> FilteredView {
    let indices: Vec<usize> = dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| params.matches(r))
        .map(|(i, _)| i)
        .collect();

    let hours = indices
        .iter()
        .map(|&i| resolve_hour(&dataset.records[i]))
        .collect();

    tracing::debug!(
        rows = dataset.len(),
        matched = indices.len(),
        start = %params.date_range.start,
        end = %params.date_range.end,
        locations = params.locations.len(),
        categories = params.categories.len(),
        "filter applied"
    );

    FilteredView {
        dataset: Arc::clone(dataset),
        indices,
        hours,
    }
}

fn resolve_hour(record: &SaleRecord) -> Option<u8> {
    record
        .hour
        .or_else(|| record.time.map(|t| t.hour() as u8))
}

/// Convenience for building selection sets from string slices.
pub fn selection<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::SaleRecord;

    /// Build a record with sensible defaults; tests override what they care about.
    pub fn sale(id: &str, date: (i32, u32, u32), location: &str, category: &str, product: &str, sales: f64) -> SaleRecord {
        let date = NaiveDate::from_ymd_opt(date.0, date.1, date.2);
        SaleRecord {
            id: id.to_string(),
            date,
            time: NaiveTime::from_hms_opt(8, 30, 0),
            location: location.to_string(),
            category: category.to_string(),
            product: product.to_string(),
            sales,
            quantity: 1,
            weekday: date.map(|d| d.format("%A").to_string()).unwrap_or_default(),
            month: date.map(|d| d.format("%B").to_string()).unwrap_or_default(),
            hour: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sale;
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn dataset() -> Arc<Dataset> {
        let mut null_date = sale("5", (2023, 1, 1), "Astoria", "Tea", "Chai", 2.0);
        null_date.date = None;
        Arc::new(Dataset::from_records(
            "test",
            vec![
                sale("1", (2023, 1, 1), "Astoria", "Coffee", "Latte", 3.0),
                sale("2", (2023, 1, 15), "Hell's Kitchen", "Tea", "Chai", 2.5),
                sale("3", (2023, 1, 31), "Astoria", "Bakery", "Scone", 3.25),
                sale("4", (2023, 2, 1), "Lower Manhattan", "Coffee", "Latte", 4.0),
                null_date,
            ],
        ))
    }

    fn ids(view: &FilteredView) -> Vec<&str> {
        view.records().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.date_range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
        );
        let view = apply(&ds, &params);
        assert_eq!(ids(&view), vec!["1", "2", "3"]);
        for r in view.records() {
            assert!(params.date_range.contains(r.date));
        }
    }

    #[test]
    fn null_dates_never_match() {
        let ds = dataset();
        let view = apply(&ds, &FilterParams::select_all(&ds));
        assert!(!ids(&view).contains(&"5"));
        assert_eq!(view.len(), 4);
    }

    #[test]
    fn empty_location_selection_matches_nothing() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.locations.clear();
        assert!(apply(&ds, &params).is_empty());
    }

    #[test]
    fn empty_category_selection_matches_nothing() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.categories.clear();
        assert!(apply(&ds, &params).is_empty());
    }

    #[test]
    fn inverted_range_matches_nothing() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.date_range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        );
        assert!(apply(&ds, &params).is_empty());
    }

    #[test]
    fn location_and_category_sets_intersect() {
        let ds = dataset();
        let mut params = FilterParams::select_all(&ds);
        params.locations = selection(["Astoria"]);
        params.categories = selection(["Coffee", "Bakery"]);
        assert_eq!(ids(&apply(&ds, &params)), vec!["1", "3"]);
    }

    #[test]
    fn hour_prefers_stored_value_and_falls_back_to_time() {
        let mut stored = sale("1", (2023, 1, 1), "A", "Coffee", "Latte", 1.0);
        stored.hour = Some(14);
        let mut derived = sale("2", (2023, 1, 1), "A", "Coffee", "Latte", 1.0);
        derived.time = NaiveTime::from_hms_opt(9, 59, 59);
        let mut neither = sale("3", (2023, 1, 1), "A", "Coffee", "Latte", 1.0);
        neither.time = None;
        let ds = Arc::new(Dataset::from_records("t", vec![stored, derived, neither]));
        let view = apply(&ds, &FilterParams::select_all(&ds));
        assert_eq!(view.hours(), &[Some(14), Some(9), None]);
        // The dataset itself is untouched.
        assert_eq!(ds.records[1].hour, None);
    }

    #[test]
    fn empty_dataset_yields_empty_view() {
        let ds = Arc::new(Dataset::default());
        let view = apply(&ds, &FilterParams::select_all(&ds));
        assert!(view.is_empty());
        assert!(view.products().is_empty());
    }
}
