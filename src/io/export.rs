//! Export sales rows to CSV.
//!
//! The export uses the same column layout ingest expects, so an exported file
//! can be loaded back with `--data`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::SaleRecord;
use crate::error::AppError;
use crate::filter::FilteredView;
use crate::query::VIEW_COLUMNS;

/// Default file name used by the TUI export key.
pub const DEFAULT_EXPORT_NAME: &str = "filtered_sales.csv";

/// Write the filtered view to a CSV file.
pub fn write_view_csv(path: &Path, view: &FilteredView) -> Result<usize, AppError> {
    let file = create(path)?;
    let n = write_rows(file, view.rows())?;
    tracing::info!(path = %path.display(), rows = n, "filtered view exported");
    Ok(n)
}

/// Write records to a CSV file, using each record's stored hour.
pub fn write_records_csv(path: &Path, records: &[SaleRecord]) -> Result<usize, AppError> {
    let file = create(path)?;
    let n = write_rows(file, records.iter().map(|r| (r, r.hour)))?;
    tracing::info!(path = %path.display(), rows = n, "records exported");
    Ok(n)
}

/// Write `(record, hour)` rows as CSV to any writer.
pub fn write_rows<'a, W, I>(writer: W, rows: I) -> Result<usize, AppError>
where
    W: Write,
    I: IntoIterator<Item = (&'a SaleRecord, Option<u8>)>,
{
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(VIEW_COLUMNS)
        .map_err(|e| AppError::export(format!("Failed to write export CSV header: {e}")))?;

    let mut n = 0;
    for (r, hour) in rows {
        let date = r.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let time = r.time.map(|t| t.format("%H:%M:%S").to_string()).unwrap_or_default();
        let sales = r.sales.to_string();
        let quantity = r.quantity.to_string();
        let hour = hour.map(|h| h.to_string()).unwrap_or_default();
        out.write_record([
            r.id.as_str(),
            &date,
            &time,
            &r.location,
            &r.category,
            &r.product,
            &sales,
            &quantity,
            &r.weekday,
            &r.month,
            &hour,
        ])
        .map_err(|e| AppError::export(format!("Failed to write export CSV row: {e}")))?;
        n += 1;
    }

    out.flush()
        .map_err(|e| AppError::export(format!("Failed to flush export CSV: {e}")))?;
    Ok(n)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path)
        .map_err(|e| AppError::export(format!("Failed to create export CSV '{}': {e}", path.display())))
}
