//! Shared domain types for the cohort report: event models, the error
//! taxonomy, date helpers and command-line settings.

pub mod error;
pub mod models;
pub mod settings;
pub mod time_utils;
