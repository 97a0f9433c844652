//! Main pipeline for the cohort report.
//!
//! Loads the event log, runs the aggregation stages and writes the result,
//! returning [`RunMetadata`] describing the run.

use std::path::PathBuf;

use chrono::Utc;
use cohort_core::error::Result;
use cohort_core::models::{DateSpan, EventRecord, LabelMode, MonthKey, ResultRow};
use tracing::{debug, info, warn};

use crate::aggregator::CohortAggregator;
use crate::reader::load_events;
use crate::writer::write_report;

/// Directory, relative to the working directory, holding input variants.
pub const INPUT_DIR: &str = "data_for_testing";

/// Report file name, relative to the working directory.
pub const OUTPUT_FILE: &str = "output.csv";

// ── Public types ──────────────────────────────────────────────────────────────

/// Counters produced alongside the report.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Label mode used for the month rows.
    pub label_mode: LabelMode,
    /// Rows read from the input file.
    pub events_loaded: usize,
    /// Distinct users in the first-seen index.
    pub distinct_users: usize,
    /// Rows that fall on their user's first-seen date.
    pub first_day_events: usize,
    /// Dates with at least one first-day confirmation.
    pub confirmation_days: usize,
    /// Months with data before boundary exclusion.
    pub months_before_exclusion: usize,
    /// Boundary months of the dataset span, `None` for an empty dataset.
    pub boundary_months: Option<(MonthKey, MonthKey)>,
    /// Rows in the written report.
    pub months_reported: usize,
    /// Wall-clock seconds spent on the whole run.
    pub elapsed_seconds: f64,
}

/// The in-memory outcome of [`analyze_events`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Report rows, ascending by date.
    pub rows: Vec<ResultRow>,
    pub metadata: RunMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run every aggregation stage over an already-loaded event table.
///
/// 1. Compute the dataset span.
/// 2. Build the first-seen index and join it back onto the events.
/// 3. Sum first-day confirmation values per date.
/// 4. Reduce to the best day per month.
/// 5. Drop boundary months, cast to integers and sort.
pub fn analyze_events(events: &[EventRecord], label_mode: LabelMode) -> Result<AnalysisResult> {
    let start = std::time::Instant::now();

    // ── Step 1: Span ──────────────────────────────────────────────────────────
    let span = DateSpan::from_dates(events.iter().map(|e| e.timestamp));

    // ── Step 2: First-day join ────────────────────────────────────────────────
    let index = CohortAggregator::first_seen_index(events);
    let first_day = CohortAggregator::first_day_events(events, &index)?;

    // ── Step 3: Daily totals ──────────────────────────────────────────────────
    let daily = CohortAggregator::daily_confirmation_totals(&first_day);

    // ── Step 4: Monthly best ──────────────────────────────────────────────────
    let monthly = CohortAggregator::monthly_best(&daily, label_mode);
    let months_before_exclusion = monthly.len();

    // ── Step 5: Boundary exclusion and output shaping ─────────────────────────
    let interior = match &span {
        Some(span) => CohortAggregator::exclude_boundary_months(monthly, span),
        None => monthly,
    };
    let rows = CohortAggregator::to_result_rows(interior);

    debug!(
        "{} users, {} first-day rows, {} confirmation days, {} of {} months kept",
        index.len(),
        first_day.len(),
        daily.len(),
        rows.len(),
        months_before_exclusion
    );

    let metadata = RunMetadata {
        generated_at: Utc::now().to_rfc3339(),
        label_mode,
        events_loaded: events.len(),
        distinct_users: index.len(),
        first_day_events: first_day.len(),
        confirmation_days: daily.len(),
        months_before_exclusion,
        boundary_months: span.map(|s| (MonthKey::of(s.min), MonthKey::of(s.max))),
        months_reported: rows.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    };

    Ok(AnalysisResult { rows, metadata })
}

// ── CohortDailyAggregator ─────────────────────────────────────────────────────

/// Runs the report for one input variant rooted at a working directory.
///
/// Input is read from `<root>/data_for_testing/<variant>` and the report is
/// written to `<root>/output.csv`.
#[derive(Debug, Clone)]
pub struct CohortDailyAggregator {
    root: PathBuf,
    label_mode: LabelMode,
}

impl CohortDailyAggregator {
    /// Aggregator rooted at `root` with month-end labels.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            label_mode: LabelMode::default(),
        }
    }

    /// Aggregator rooted at the process working directory.
    pub fn in_current_dir() -> Self {
        Self::new(".")
    }

    pub fn with_label_mode(mut self, label_mode: LabelMode) -> Self {
        self.label_mode = label_mode;
        self
    }

    pub fn input_path(&self, variant_name: &str) -> PathBuf {
        self.root.join(INPUT_DIR).join(variant_name)
    }

    pub fn output_path(&self) -> PathBuf {
        self.root.join(OUTPUT_FILE)
    }

    /// Load `variant_name`, aggregate it and write the report.
    ///
    /// Nothing is written when loading or aggregation fails.
    pub fn run(&self, variant_name: &str) -> Result<RunMetadata> {
        let start = std::time::Instant::now();
        let input = self.input_path(variant_name);
        info!("Loading events from {}", input.display());

        let events = load_events(&input)?;
        if events.is_empty() {
            warn!("{} contains no events", input.display());
        }

        let AnalysisResult { rows, mut metadata } = analyze_events(&events, self.label_mode)?;
        if rows.is_empty() {
            warn!("No interior month has first-day confirmations; writing header only");
        }

        let output = self.output_path();
        write_report(&output, &rows)?;
        info!("Wrote {} month rows to {}", rows.len(), output.display());

        metadata.elapsed_seconds = start.elapsed().as_secs_f64();
        Ok(metadata)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
