//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the filtering/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{DateRange, FilterParams, ViewKind};
use crate::error::AppError;
use crate::io::ingest::{Dataset, parse_date};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dash", version, about = "Coffee shop sales dashboard")]
pub struct Cli {
    /// Sales CSV to load. Falls back to an interactive picker when unset.
    #[arg(short = 'd', long, global = true, env = "SALES_DASH_DATA", value_name = "CSV")]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    ///
    /// Filter flags set the initial selections; everything can be changed live.
    Tui(FilterArgs),
    /// Print KPIs and every view with its insight.
    Summary(SummaryArgs),
    /// Print a single view with its insight.
    View(ViewArgs),
    /// Print one product's sales over time.
    Drilldown(DrilldownArgs),
    /// Run an ad-hoc query against the filtered view (`df_filtered`).
    Query(QueryArgs),
    /// Write the filtered view to CSV.
    Export(ExportArgs),
    /// Generate a synthetic sales CSV.
    Sample(SampleArgs),
}

/// Filter selections shared by every data-reading subcommand.
///
/// Unset flags select everything, the same initial state as the dashboard.
#[derive(Debug, Args, Clone, Default)]
pub struct FilterArgs {
    /// First date to include (inclusive). Defaults to the earliest date in the data.
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,

    /// Last date to include (inclusive). Defaults to the latest date in the data.
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,

    /// Store location to include (repeatable). Defaults to all locations.
    #[arg(long = "location", value_name = "NAME", conflicts_with = "none_location")]
    pub locations: Vec<String>,

    /// Product category to include (repeatable). Defaults to all categories.
    #[arg(long = "category", value_name = "NAME", conflicts_with = "none_category")]
    pub categories: Vec<String>,

    /// Select no locations (every view comes out empty).
    #[arg(long)]
    pub none_location: bool,

    /// Select no categories (every view comes out empty).
    #[arg(long)]
    pub none_category: bool,
}

#[derive(Debug, Args, Clone)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Render ASCII bar charts under each table.
    #[arg(long)]
    pub plot: bool,

    /// Also write the dashboard snapshot as JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Which view to print.
    #[arg(value_enum)]
    pub view: ViewKind,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Render an ASCII bar chart under the table.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

#[derive(Debug, Args, Clone)]
pub struct DrilldownArgs {
    /// Product name (exact match).
    pub product: String,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Skip the ASCII trend chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct QueryArgs {
    /// e.g. "SELECT location, SUM(sales) AS total FROM df_filtered GROUP BY location"
    pub sql: String,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of line items.
    #[arg(short = 'n', long, default_value_t = 5_000)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Calendar year of the generated January..June sales.
    #[arg(long, default_value_t = 2023)]
    pub year: i32,

    /// Chance that a line item is a bulk order.
    #[arg(long, default_value_t = 0.004)]
    pub bulk_prob: f64,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

impl FilterArgs {
    /// Resolve the flags against a loaded dataset.
    ///
    /// Names that do not occur in the data are rejected so a typo doesn't
    /// silently produce an empty dashboard. An inverted date range is allowed
    /// and selects nothing.
    pub fn to_params(&self, dataset: &Dataset) -> Result<FilterParams, AppError> {
        let mut params = FilterParams::select_all(dataset);

        if self.from.is_some() || self.to.is_some() {
            let bounds = dataset.date_bounds();
            let start = self.from.or(bounds.map(|b| b.0)).unwrap_or(NaiveDate::MIN);
            let end = self.to.or(bounds.map(|b| b.1)).unwrap_or(NaiveDate::MAX);
            params.date_range = DateRange::new(start, end);
        }

        if self.none_location {
            params.locations.clear();
        } else if !self.locations.is_empty() {
            params.locations = pick("location", &self.locations, &dataset.locations())?;
        }

        if self.none_category {
            params.categories.clear();
        } else if !self.categories.is_empty() {
            params.categories = pick("category", &self.categories, &dataset.categories())?;
        }

        Ok(params)
    }
}

fn pick(
    what: &str,
    requested: &[String],
    known: &[String],
) -> Result<std::collections::BTreeSet<String>, AppError> {
    for name in requested {
        if !known.contains(name) {
            return Err(AppError::usage(format!(
                "Unknown {what} '{name}'. Known values: {}",
                known.join(", ")
            )));
        }
    }
    Ok(requested.iter().cloned().collect())
}
