//! Write dashboard snapshots as JSON.
//!
//! A snapshot is the portable form of one recompute: the filter selections,
//! the KPIs, every view table, and the insight lines. It is write-only; the
//! CSV is the source of truth.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::app::pipeline::Dashboard;
use crate::error::AppError;

/// Default file name used by the TUI snapshot key.
pub const DEFAULT_SNAPSHOT_NAME: &str = "dashboard.json";

/// Write a dashboard snapshot JSON file.
pub fn write_snapshot_json(path: &Path, dashboard: &Dashboard) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::export(format!("Failed to create snapshot JSON '{}': {e}", path.display()))
    })?;
    write_snapshot(file, dashboard)?;
    tracing::info!(path = %path.display(), rows = dashboard.rows, "snapshot written");
    Ok(())
}

/// Serialize a dashboard snapshot to any writer.
pub fn write_snapshot<W: Write>(writer: W, dashboard: &Dashboard) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, dashboard)
        .map_err(|e| AppError::export(format!("Failed to write snapshot JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::app::pipeline::recompute;
    use crate::domain::FilterParams;
    use crate::filter::test_support::sale;
    use crate::io::ingest::Dataset;

    #[test]
    fn snapshot_carries_kpis_and_tagged_insights() {
        let ds = Arc::new(Dataset::from_records(
            "mem",
            vec![sale("1", (2023, 1, 2), "Astoria", "Coffee", "Latte", 3.0)],
        ));
        let dash = recompute(&ds, &FilterParams::select_all(&ds));

        let mut buf = Vec::new();
        write_snapshot(&mut buf, &dash).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json["rows"], 1);
        assert_eq!(json["kpis"]["total_orders"], 1);
        assert_eq!(json["filters"]["date_range"]["start"], "2023-01-02");
        assert_eq!(json["insights"]["monthly"]["kind"], "finding");
        assert_eq!(json["insights"]["outliers"]["kind"], "finding");
        assert!(json.get("view").is_none());
    }
}
