//! CSV ingest and normalization.
//!
//! This module is responsible for turning the sales CSV into an immutable,
//! typed `Dataset` that the filter/aggregate pipeline can work on.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear `DataLoad` errors, no partial load)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Lenient dates** (an unparseable date is kept as `None`, not rejected)
//! - **Separation of concerns**: no filtering or aggregation here

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveTime};
use csv::StringRecord;

use crate::domain::SaleRecord;
use crate::error::AppError;

/// Columns every input file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "id", "date", "time", "location", "category", "product", "sales", "quantity",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// The loaded sales table plus a summary of how the load went.
///
/// Immutable after `load_dataset` returns; sessions share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub source: String,
    pub records: Vec<SaleRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Whether the source carried its own `hour` column.
    pub has_hour_column: bool,
}

impl Dataset {
    pub fn from_records(source: impl Into<String>, records: Vec<SaleRecord>) -> Self {
        let has_hour_column = records.iter().any(|r| r.hour.is_some());
        Self {
            source: source.into(),
            rows_read: records.len(),
            records,
            row_errors: Vec::new(),
            has_hour_column,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of retained rows whose date did not parse.
    pub fn null_dates(&self) -> usize {
        self.records.iter().filter(|r| r.date.is_none()).count()
    }

    /// Earliest and latest parsed dates, if any row has one.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Distinct locations in first-seen order.
    pub fn locations(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.location.as_str()))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }
}

pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Load and normalize the sales CSV at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::data_load(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    load_from_reader(file, path.display().to_string())
}

/// Load and normalize a sales table from any reader (used by tests and `load_dataset`).
pub fn load_from_reader<R: Read>(input: R, source: String) -> Result<Dataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data_load(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;
    let has_hour_column = header_map.contains_key("hour");

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(sale) => records.push(sale),
            Err(message) => {
                let id = get_optional(&record, &header_map, "id").map(str::to_string);
                tracing::debug!(line, ?id, %message, "skipping row");
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    let dataset = Dataset {
        source,
        records,
        row_errors,
        rows_read,
        has_hour_column,
    };

    tracing::info!(
        source = %dataset.source,
        rows_read = dataset.rows_read,
        rows_used = dataset.len(),
        row_errors = dataset.row_errors.len(),
        null_dates = dataset.null_dates(),
        "dataset loaded"
    );

    Ok(dataset)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM
    // (e.g. "\u{feff}id"); without stripping it `id` looks missing.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    let names = missing
        .iter()
        .map(|c| format!("`{c}`"))
        .collect::<Vec<_>>()
        .join(", ");
    Err(AppError::data_load(format!("Missing required column(s): {names}")))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SaleRecord, String> {
    let id = get_required(record, header_map, "id")?.to_string();
    let date = get_optional(record, header_map, "date").and_then(parse_date);
    let time = get_optional(record, header_map, "time").and_then(parse_time);
    let location = get_required(record, header_map, "location")?.to_string();
    let category = get_required(record, header_map, "category")?.to_string();
    let product = get_required(record, header_map, "product")?.to_string();
    let sales = parse_sales(get_required(record, header_map, "sales")?)?;
    let quantity = parse_quantity(get_required(record, header_map, "quantity")?)?;
    let hour = match get_optional(record, header_map, "hour") {
        Some(s) => Some(parse_hour(s)?),
        None => None,
    };

    // Derived when the source leaves them out.
    let weekday = get_optional(record, header_map, "weekday")
        .map(str::to_string)
        .or_else(|| date.map(|d| d.format("%A").to_string()))
        .unwrap_or_default();
    let month = get_optional(record, header_map, "month")
        .map(str::to_string)
        .or_else(|| date.map(|d| month_name(d.month())))
        .unwrap_or_default();

    Ok(SaleRecord {
        id,
        date,
        time,
        location,
        category,
        product,
        sales,
        quantity,
        weekday,
        month,
        hour,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a calendar date, accepting ISO dates plus a few common export formats.
///
/// Timestamps like `2023-01-01 00:00:00` are accepted and truncated to the date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    const FMTS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d", "%m/%d/%Y"];
    let s = s.trim();
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    FMTS.iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Parse an `HH:MM:SS` time of day (`HH:MM` is tolerated).
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_sales(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("Invalid `sales` value '{s}' (not a number)."))?;
    if !v.is_finite() {
        return Err(format!("Invalid `sales` value '{s}' (not finite)."));
    }
    if v < 0.0 {
        return Err(format!("Invalid `sales` value '{s}' (negative)."));
    }
    Ok(v)
}

fn parse_quantity(s: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Accept integral floats such as `2.0`, which spreadsheet round trips produce.
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("Invalid `quantity` value '{s}' (expected an integer).")),
    }
}

fn parse_hour(s: &str) -> Result<u8, String> {
    let v = parse_quantity(s).map_err(|_| format!("Invalid `hour` value '{s}'."))?;
    if (0..=23).contains(&v) {
        Ok(v as u8)
    } else {
        Err(format!("Invalid `hour` value '{s}' (expected 0-23)."))
    }
}

fn month_name(month: u32) -> String {
    NaiveDate::from_ymd_opt(2000, month, 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default()
}
