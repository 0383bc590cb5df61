//! `sales-dash` library crate.
//!
//! The binary (`dash`) is a thin wrapper around this library so that:
//!
//! - the filter/aggregate pipeline is testable without spawning processes
//! - the CLI and the TUI share one recompute path
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod insight;
pub mod io;
pub mod logging;
pub mod math;
pub mod metrics;
pub mod plot;
pub mod query;
pub mod report;
pub mod tui;
