//! Data layer for the cohort report.
//!
//! Reads the tab-separated event log, reduces it to the best first-day
//! confirmation total of each interior month and writes the report.

pub mod aggregator;
pub mod analysis;
pub mod reader;
pub mod writer;

pub use cohort_core as core;
