//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the typed sale record (`SaleRecord`)
//! - filter selections (`FilterParams`, `DateRange`)
//! - the set of dashboard views (`ViewKind`) and their fixed orderings

pub mod types;

pub use types::*;
