//! Reporting utilities: plain-text tables for the CLI front-end.

pub mod format;

pub use format::*;
