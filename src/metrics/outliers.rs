//! Z-score outlier detection over line-item sales.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::OUTLIER_Z_THRESHOLD;
use crate::filter::FilteredView;
use crate::math::{mean, sample_std, z_scores};

/// A flagged line item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub location: String,
    pub sales: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two rows.
    pub std: Option<f64>,
    pub threshold: f64,
    pub outliers: Vec<Outlier>,
}

impl OutlierReport {
    pub fn count(&self) -> usize {
        self.outliers.len()
    }
}

/// Flag rows whose |z| exceeds the threshold, in view order.
///
/// Nothing is flagged when the standard deviation is undefined or zero.
pub fn detect_outliers(view: &FilteredView) -> OutlierReport {
    let sales: Vec<f64> = view.records().map(|r| r.sales).collect();
    let outliers = match z_scores(&sales) {
        Some(z) => view
            .records()
            .zip(z)
            .filter(|(_, z)| z.abs() > OUTLIER_Z_THRESHOLD)
            .map(|(r, z)| Outlier {
                id: r.id.clone(),
                date: r.date,
                location: r.location.clone(),
                sales: r.sales,
                z,
            })
            .collect(),
        None => Vec::new(),
    };

    OutlierReport {
        mean: mean(&sales),
        std: sample_std(&sales),
        threshold: OUTLIER_Z_THRESHOLD,
        outliers,
    }
}
