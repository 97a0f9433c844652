//! Tab-separated event log loading.
//!
//! Reads the cohort input file and converts each row into an
//! [`EventRecord`] with its timestamp normalised to a calendar date.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use cohort_core::error::{CohortError, Result};
use cohort_core::models::EventRecord;
use cohort_core::time_utils::parse_event_date;
use csv::StringRecord;
use tracing::debug;

/// Field delimiter of the input event log.
pub const INPUT_DELIMITER: u8 = b'\t';

const REQUIRED_COLUMNS: [&str; 4] = ["userid", "timestamp", "action", "value"];

/// Cell contents read as a missing value, besides the empty cell.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every event from the tab-separated file at `path`.
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>> {
    let file = File::open(path).map_err(|source| CohortError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_events(file, path)
}

/// Parse events from any reader. `source` is only used in error messages.
pub fn read_events<R: Read>(reader: R, source: &Path) -> Result<Vec<EventRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(INPUT_DELIMITER)
        .has_headers(true)
        .from_reader(reader);

    let columns = ColumnIndex::resolve(rdr.headers()?, source)?;

    let mut events = Vec::new();
    for result in rdr.records() {
        let record = result?;
        events.push(columns.to_event(&record)?);
    }
    normalize_numeric_ids(&mut events);

    debug!("Loaded {} events from {}", events.len(), source.display());
    Ok(events)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the required columns within the header row.
struct ColumnIndex {
    userid: usize,
    timestamp: usize,
    action: usize,
    value: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, source: &Path) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| CohortError::MissingColumn {
                    path: source.to_path_buf(),
                    column: name.to_string(),
                })
        };
        let [userid, timestamp, action, value] = REQUIRED_COLUMNS;
        Ok(Self {
            userid: find(userid)?,
            timestamp: find(timestamp)?,
            action: find(action)?,
            value: find(value)?,
        })
    }

    fn to_event(&self, record: &StringRecord) -> Result<EventRecord> {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let raw_ts = cell(self.timestamp);
        let timestamp = parse_event_date(raw_ts).ok_or_else(|| CohortError::TimestampParse {
            line,
            value: raw_ts.to_string(),
        })?;

        Ok(EventRecord {
            userid: cell(self.userid).trim().to_string(),
            timestamp,
            action: cell(self.action).to_string(),
            value: parse_value(cell(self.value), line)?,
        })
    }
}

/// When every non-empty `userid` is an integer, rewrite ids in canonical
/// integer form so that `01` and `1` name the same user. A column holding
/// any non-integer id is left as text.
fn normalize_numeric_ids(events: &mut [EventRecord]) {
    let parsed: Option<Vec<Option<i64>>> = events
        .iter()
        .map(|e| {
            if e.userid.is_empty() {
                Some(None)
            } else {
                e.userid.parse::<i64>().ok().map(Some)
            }
        })
        .collect();

    let Some(ids) = parsed else { return };
    for (event, id) in events.iter_mut().zip(ids) {
        if let Some(id) = id {
            event.userid = id.to_string();
        }
    }
}

/// Empty cells and [`NA_TOKENS`] are missing values.
fn parse_value(raw: &str, line: u64) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_TOKENS.contains(&trimmed) {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(CohortError::ValueParse {
            line,
            value: raw.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
