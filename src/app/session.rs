//! Interactive session state: the loaded dataset, the user's current
//! selections, and the dashboard computed from them.
//!
//! Every mutation goes through `recompute`, so the dashboard never lags the
//! selections. Front-ends only read `dashboard()`.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::pipeline::{self, Dashboard};
use crate::domain::FilterParams;
use crate::drilldown::{self, TrendPoint};
use crate::io::ingest::Dataset;
use crate::query::{QueryError, QueryEvaluator, QueryResult};

pub struct Session {
    dataset: Arc<Dataset>,
    params: FilterParams,
    dashboard: Dashboard,
}

impl Session {
    pub fn new(dataset: Arc<Dataset>, params: FilterParams) -> Self {
        let dashboard = pipeline::recompute(&dataset, &params);
        Self {
            dataset,
            params,
            dashboard,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn set_start(&mut self, start: NaiveDate) {
        self.params.date_range.start = start;
        self.recompute();
    }

    pub fn set_end(&mut self, end: NaiveDate) {
        self.params.date_range.end = end;
        self.recompute();
    }

    /// Flip one location in or out of the selection. Returns whether it is now selected.
    pub fn toggle_location(&mut self, name: &str) -> bool {
        let on = toggle(&mut self.params.locations, name);
        self.recompute();
        on
    }

    /// Flip one category in or out of the selection. Returns whether it is now selected.
    pub fn toggle_category(&mut self, name: &str) -> bool {
        let on = toggle(&mut self.params.categories, name);
        self.recompute();
        on
    }

    /// Select every known location, or none.
    pub fn select_all_locations(&mut self, selected: bool) {
        self.params.locations = if selected {
            self.dataset.locations().into_iter().collect()
        } else {
            Default::default()
        };
        self.recompute();
    }

    /// Select every known category, or none.
    pub fn select_all_categories(&mut self, selected: bool) {
        self.params.categories = if selected {
            self.dataset.categories().into_iter().collect()
        } else {
            Default::default()
        };
        self.recompute();
    }

    /// Products available for drilldown under the current selections.
    pub fn products(&self) -> Vec<String> {
        self.dashboard.view.products()
    }

    pub fn drilldown(&self, product: &str) -> Vec<TrendPoint> {
        drilldown::drilldown(&self.dashboard.view, product)
    }

    pub fn query(&self, evaluator: &dyn QueryEvaluator, sql: &str) -> Result<QueryResult, QueryError> {
        let result = evaluator.evaluate(sql, &self.dashboard.view);
        if let Err(err) = &result {
            tracing::warn!(%err, "query failed");
        }
        result
    }

    fn recompute(&mut self) {
        self.dashboard = pipeline::recompute(&self.dataset, &self.params);
    }
}

fn toggle(set: &mut std::collections::BTreeSet<String>, name: &str) -> bool {
    if set.remove(name) {
        false
    } else {
        set.insert(name.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::test_support::sale;
    use crate::query::SqliteEvaluator;

    fn session() -> Session {
        let ds = Arc::new(Dataset::from_records(
            "t",
            vec![
                sale("1", (2023, 1, 2), "Astoria", "Coffee", "Latte", 3.0),
                sale("2", (2023, 2, 2), "Lower Manhattan", "Tea", "Chai", 2.0),
                sale("3", (2023, 3, 2), "Astoria", "Coffee", "Mocha", 4.0),
            ],
        ));
        let params = FilterParams::select_all(&ds);
        Session::new(ds, params)
    }

    #[test]
    fn toggling_recomputes_the_dashboard() {
        let mut s = session();
        assert_eq!(s.dashboard().rows, 3);
        assert!(!s.toggle_location("Astoria"));
        assert_eq!(s.dashboard().rows, 1);
        assert!(s.toggle_location("Astoria"));
        assert_eq!(s.dashboard().rows, 3);

        s.select_all_categories(false);
        assert_eq!(s.dashboard().rows, 0);
        assert!(s.products().is_empty());
        s.select_all_categories(true);
        assert_eq!(s.dashboard().rows, 3);
    }

    #[test]
    fn date_edits_narrow_the_view() {
        let mut s = session();
        s.set_start(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert_eq!(s.products(), vec!["Chai".to_string(), "Mocha".to_string()]);
        s.set_end(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(s.dashboard().rows, 0);
    }

    #[test]
    fn drilldown_and_query_read_the_current_view() {
        let mut s = session();
        assert_eq!(s.drilldown("Latte").len(), 1);
        s.toggle_category("Coffee");
        assert!(s.drilldown("Latte").is_empty());

        let r = s.query(&SqliteEvaluator, "SELECT COUNT(*) AS n FROM df_filtered").unwrap();
        assert_eq!(r.rows[0][0], crate::query::Value::Integer(1));
        assert!(s.query(&SqliteEvaluator, "SELECT nope FROM df_filtered").is_err());
    }
}
