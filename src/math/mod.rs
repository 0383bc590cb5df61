//! Mathematical utilities: descriptive statistics for the aggregators.

pub mod stats;

pub use stats::*;
