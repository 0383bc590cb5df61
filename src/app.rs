//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the sales CSV
//! - runs the filter/aggregate pipeline
//! - prints reports/plots or launches the dashboard
//! - writes optional exports

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::cli::{
    Command, DrilldownArgs, ExportArgs, FilterArgs, QueryArgs, SampleArgs, SummaryArgs, ViewArgs,
};
use crate::domain::{FilterParams, ViewKind};
use crate::error::AppError;
use crate::io::ingest::Dataset;
use crate::metrics::Entry;
use crate::report::{fmt_count, fmt_money};

pub mod pipeline;
pub mod session;

/// Entry point for the `dash` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // We want `dash` and `dash --data x.csv` to behave like `dash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // stderr output would corrupt the TUI's alternate screen.
    let default_log = match cli.command {
        Command::Tui(_) => "off",
        _ => "sales_dash=info",
    };
    crate::logging::init(default_log);

    let data = cli.data;
    match cli.command {
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => handle_tui(data, args),
        Command::Summary(args) => handle_summary(data, args),
        Command::View(args) => handle_view(data, args),
        Command::Drilldown(args) => handle_drilldown(data, args),
        Command::Query(args) => handle_query(data, args),
        Command::Export(args) => handle_export(data, args),
    }
}

/// Resolve the data path (flag/env, else the picker) and load it.
fn load(data: Option<PathBuf>) -> Result<Arc<Dataset>, AppError> {
    let path = match data {
        Some(path) => path,
        None => crate::cli::picker::prompt_for_csv_path()?,
    };
    let dataset = crate::io::ingest::load_dataset(&path)?;
    Ok(Arc::new(dataset))
}

fn load_with_filters(
    data: Option<PathBuf>,
    filters: &FilterArgs,
) -> Result<(Arc<Dataset>, FilterParams), AppError> {
    let dataset = load(data)?;
    let params = filters.to_params(&dataset)?;
    Ok((dataset, params))
}

fn handle_tui(data: Option<PathBuf>, args: FilterArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args)?;
    crate::tui::run(session::Session::new(dataset, params))
}

fn handle_summary(data: Option<PathBuf>, args: SummaryArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args.filters)?;
    let dash = pipeline::recompute(&dataset, &params);

    println!("{}", crate::report::format_load_summary(&dataset));
    print!("{}", crate::report::format_kpis_and_filters(&dash));
    for kind in ViewKind::ALL {
        println!();
        print!("{}", crate::report::format_view(&dash, kind));
        if args.plot {
            if let Some(plot) = view_plot(&dash, kind, args.width) {
                print!("{plot}");
            }
        }
    }

    if let Some(path) = &args.json {
        crate::io::snapshot::write_snapshot_json(path, &dash)?;
        println!("\nSnapshot written to {}", path.display());
    }
    Ok(())
}

fn handle_view(data: Option<PathBuf>, args: ViewArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args.filters)?;
    let dash = pipeline::recompute(&dataset, &params);

    print!("{}", crate::report::format_view(&dash, args.view));
    if args.plot {
        if let Some(plot) = view_plot(&dash, args.view, args.width) {
            println!();
            print!("{plot}");
        }
    }
    Ok(())
}

fn handle_drilldown(data: Option<PathBuf>, args: DrilldownArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args.filters)?;
    let session = session::Session::new(dataset, params);

    let points = session.drilldown(&args.product);
    if points.is_empty() {
        let products = session.products();
        if !products.contains(&args.product) && !products.is_empty() {
            eprintln!("Products in the current selection: {}", products.join(", "));
        }
    }

    print!("{}", crate::report::format_drilldown(&args.product, &points));
    if !args.no_plot && !points.is_empty() {
        let series = crate::drilldown::daily_totals(&points);
        println!();
        print!("{}", crate::plot::render_trend(&series, args.width, args.height));
    }
    Ok(())
}

fn handle_query(data: Option<PathBuf>, args: QueryArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args.filters)?;
    let session = session::Session::new(dataset, params);

    let result = session.query(&crate::query::SqliteEvaluator, &args.sql)?;
    print!("{}", crate::report::format_query_result(&result));
    Ok(())
}

fn handle_export(data: Option<PathBuf>, args: ExportArgs) -> Result<(), AppError> {
    let (dataset, params) = load_with_filters(data, &args.filters)?;
    let view = crate::filter::apply(&dataset, &params);

    let n = crate::io::export::write_view_csv(&args.output, &view)?;
    println!("Exported {} row(s) to {}", fmt_count(n), args.output.display());
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = sample_config_from_args(&args);
    let records = crate::data::generate_sample(&config)?;

    let n = crate::io::export::write_records_csv(&args.output, &records)?;
    println!(
        "Wrote {} synthetic line item(s) to {}",
        fmt_count(n),
        args.output.display()
    );
    Ok(())
}

pub fn sample_config_from_args(args: &SampleArgs) -> crate::data::SampleConfig {
    crate::data::SampleConfig {
        rows: args.rows,
        seed: args.seed,
        year: args.year,
        bulk_order_prob: args.bulk_prob,
    }
}

/// ASCII bar chart for a keyed view; `None` for the outlier view.
fn view_plot(dash: &pipeline::Dashboard, kind: ViewKind, width: usize) -> Option<String> {
    let money = |rows: &[Entry<f64>]| -> Vec<(String, f64)> {
        rows.iter().map(|e| (e.label.clone(), e.value)).collect()
    };
    let counts = |rows: &[Entry<usize>]| -> Vec<(String, f64)> {
        rows.iter().map(|e| (e.label.clone(), e.value as f64)).collect()
    };
    let count_fmt = |v: f64| fmt_count(v as usize);

    let plot = match kind {
        ViewKind::Monthly => crate::plot::render_bar_chart(&money(&dash.monthly), width, fmt_money),
        ViewKind::Locations => crate::plot::render_bar_chart(&money(&dash.locations), width, fmt_money),
        ViewKind::Products => crate::plot::render_bar_chart(&money(&dash.top_products), width, fmt_money),
        ViewKind::CategoryAov => crate::plot::render_bar_chart(&money(&dash.category_aov), width, fmt_money),
        ViewKind::Popularity => crate::plot::render_bar_chart(&counts(&dash.popularity), width, count_fmt),
        ViewKind::Coffee => crate::plot::render_bar_chart(&counts(&dash.coffee), width, count_fmt),
        ViewKind::Hours => {
            let rows: Vec<(String, f64)> = dash
                .hours
                .iter()
                .map(|h| (format!("{:02}:00", h.hour), h.count as f64))
                .collect();
            crate::plot::render_bar_chart(&rows, width, count_fmt)
        }
        ViewKind::Weekdays => {
            let rows: Vec<(String, f64)> = dash
                .weekdays
                .iter()
                .filter_map(|e| Some((e.label.clone(), e.value? as f64)))
                .collect();
            crate::plot::render_bar_chart(&rows, width, count_fmt)
        }
        ViewKind::Outliers => return None,
    };
    Some(plot)
}

const SUBCOMMANDS: [&str; 7] = ["tui", "summary", "view", "drilldown", "query", "export", "sample"];

/// Rewrite argv so `dash` defaults to `dash tui`.
///
/// Rules:
/// - `dash`                       -> `dash tui`
/// - `dash --data x.csv`          -> `dash tui --data x.csv`
/// - `dash --data x.csv summary`  -> unchanged (`--data` is global)
/// - `dash --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    // Skip a leading global `-d/--data <CSV>` (or `--data=<CSV>`) so the token
    // after it decides whether a subcommand was given.
    let mut i = 1;
    match argv.get(i).map(String::as_str) {
        Some("-d" | "--data") => i += 2,
        Some(a) if a.starts_with("--data=") || (a.starts_with("-d") && a.len() > 2) => i += 1,
        _ => {}
    }

    let Some(next) = argv.get(i).cloned() else {
        argv.insert(1, "tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        next.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version || SUBCOMMANDS.contains(&next.as_str()) {
        return argv;
    }

    // If the first remaining token is a flag, treat it as "tui flags".
    if next.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_and_flag_first_invocations_become_tui() {
        assert_eq!(rewrite_args(args(&["dash"])), args(&["dash", "tui"]));
        assert_eq!(
            rewrite_args(args(&["dash", "--data", "x.csv"])),
            args(&["dash", "tui", "--data", "x.csv"])
        );
    }

    #[test]
    fn subcommands_and_help_are_left_alone() {
        assert_eq!(rewrite_args(args(&["dash", "--help"])), args(&["dash", "--help"]));
        assert_eq!(
            rewrite_args(args(&["dash", "view", "hours"])),
            args(&["dash", "view", "hours"])
        );
        assert_eq!(
            rewrite_args(args(&["dash", "sample", "-o", "s.csv"])),
            args(&["dash", "sample", "-o", "s.csv"])
        );
    }

    #[test]
    fn leading_data_flag_does_not_hide_the_subcommand() {
        for argv in [
            args(&["dash", "--data", "x.csv", "summary"]),
            args(&["dash", "-d", "x.csv", "query", "SELECT 1"]),
            args(&["dash", "--data=x.csv", "view", "hours"]),
        ] {
            assert_eq!(rewrite_args(argv.clone()), argv);
        }
        assert_eq!(
            rewrite_args(args(&["dash", "-d", "x.csv", "--location", "Astoria"])),
            args(&["dash", "tui", "-d", "x.csv", "--location", "Astoria"])
        );

        let cli = crate::cli::Cli::try_parse_from(rewrite_args(args(&["dash", "--data", "x.csv", "summary"])))
            .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("x.csv")));
        assert!(matches!(cli.command, Command::Summary(_)));
    }

    #[test]
    fn rewritten_argv_parses() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(args(&["dash", "--location", "Astoria"])));
        match cli.command {
            Command::Tui(f) => assert_eq!(f.locations, vec!["Astoria".to_string()]),
            other => panic!("expected tui, got {other:?}"),
        }
    }

    #[test]
    fn view_plots_skip_the_outlier_view() {
        let ds = Arc::new(Dataset::from_records(
            "t",
            vec![crate::filter::test_support::sale("1", (2023, 1, 2), "Astoria", "Coffee", "Latte", 3.0)],
        ));
        let dash = pipeline::recompute(&ds, &FilterParams::select_all(&ds));
        assert!(view_plot(&dash, ViewKind::Outliers, 20).is_none());
        let plot = view_plot(&dash, ViewKind::Locations, 10).unwrap();
        assert_eq!(plot, "Astoria |########## $3.00\n");
    }
}
