use clap::Parser;

use crate::error::Result;
use crate::models::LabelMode;

/// Input file processed when no variant is given on the command line.
pub const DEFAULT_VARIANT: &str = "variant55.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Best first-day confirmation totals per interior month of a cohort dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cohort-report",
    about = "Best first-day confirmation totals per interior month of a cohort dataset",
    version
)]
pub struct Settings {
    /// Input file name inside `data_for_testing/`
    #[arg(default_value = DEFAULT_VARIANT)]
    pub variant: String,

    /// Date reported for each month
    #[arg(long, default_value = "month-end", value_parser = ["month-end", "peak"])]
    pub label: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Print a JSON run summary on stdout after writing the report
    #[arg(long)]
    pub summary: bool,
}

impl Settings {
    /// Parse settings from the process arguments.
    pub fn load() -> Self {
        Self::parse()
    }

    /// Parsed [`LabelMode`] for the `--label` argument.
    pub fn label_mode(&self) -> Result<LabelMode> {
        self.label.parse()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
