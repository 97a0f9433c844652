//! First-day cohort aggregation over daily and monthly windows.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use cohort_core::error::{CohortError, Result};
use cohort_core::models::{DateSpan, EventRecord, LabelMode, MonthKey, MonthlyBest, ResultRow};
use cohort_core::time_utils::month_end;

/// Earliest event date of every user.
pub type FirstSeenIndex<'a> = HashMap<&'a str, NaiveDate>;

/// Summed first-day confirmation value per calendar date. Sparse.
pub type DailyTotals = BTreeMap<NaiveDate, f64>;

// ── CohortAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that runs each reduction stage of the report.
pub struct CohortAggregator;

impl CohortAggregator {
    /// Map every user to the earliest date on which they appear.
    ///
    /// Rows with an empty `userid` cannot be attributed to anyone and are
    /// skipped.
    pub fn first_seen_index(events: &[EventRecord]) -> FirstSeenIndex<'_> {
        let mut index: FirstSeenIndex<'_> = HashMap::new();
        for event in events.iter().filter(|e| !e.userid.is_empty()) {
            index
                .entry(event.userid.as_str())
                .and_modify(|first| *first = (*first).min(event.timestamp))
                .or_insert(event.timestamp);
        }
        index
    }

    /// Join `index` back onto `events`, keeping every row that falls on its
    /// user's first-seen date.
    ///
    /// Each index entry must match at least one event row; an entry that
    /// matches nothing means the index was not built from `events`.
    pub fn first_day_events<'a>(
        events: &'a [EventRecord],
        index: &FirstSeenIndex<'_>,
    ) -> Result<Vec<&'a EventRecord>> {
        let mut matched: HashSet<&str> = HashSet::with_capacity(index.len());
        let mut rows = Vec::new();

        for event in events {
            if index.get(event.userid.as_str()) == Some(&event.timestamp) {
                matched.insert(event.userid.as_str());
                rows.push(event);
            }
        }

        if matched.len() != index.len() {
            let mut orphans: Vec<&str> = index
                .keys()
                .copied()
                .filter(|user| !matched.contains(*user))
                .collect();
            orphans.sort_unstable();
            return Err(CohortError::MergeCardinality(format!(
                "{} first-seen entries match no event rows (first: {})",
                orphans.len(),
                orphans[0]
            )));
        }

        Ok(rows)
    }

    /// Sum `value` over confirmation rows, per calendar date.
    ///
    /// Dates without a confirmation row are absent. Missing values add
    /// nothing, so a date whose confirmations all lack a value totals 0.
    pub fn daily_confirmation_totals(first_day: &[&EventRecord]) -> DailyTotals {
        let mut totals = DailyTotals::new();
        for event in first_day.iter().filter(|e| e.is_confirmation()) {
            *totals.entry(event.timestamp).or_insert(0.0) += event.value.unwrap_or(0.0);
        }
        totals
    }

    /// Reduce daily totals to the maximum of each month.
    ///
    /// NaN totals are ignored; a month holding only NaN totals keeps a NaN
    /// value and is dropped later by [`Self::to_result_rows`].
    pub fn monthly_best(daily: &DailyTotals, mode: LabelMode) -> Vec<MonthlyBest> {
        let mut months: BTreeMap<MonthKey, MonthlyBest> = BTreeMap::new();

        for (&date, &total) in daily {
            let best = months.entry(MonthKey::of(date)).or_insert_with(|| MonthlyBest {
                month: MonthKey::of(date),
                label: month_end(date),
                value: f64::NAN,
            });
            if total.is_nan() {
                continue;
            }
            // Strict comparison keeps the earliest peak date on ties.
            if best.value.is_nan() || total > best.value {
                best.value = total;
                if mode == LabelMode::Peak {
                    best.label = date;
                }
            }
        }

        months.into_values().collect()
    }

    /// Drop the first and last month of `span`.
    pub fn exclude_boundary_months(monthly: Vec<MonthlyBest>, span: &DateSpan) -> Vec<MonthlyBest> {
        monthly
            .into_iter()
            .filter(|best| !span.is_boundary(best.month))
            .collect()
    }

    /// Drop undefined values, truncate the rest to integers and sort by date.
    pub fn to_result_rows(monthly: Vec<MonthlyBest>) -> Vec<ResultRow> {
        let mut rows: Vec<ResultRow> = monthly
            .into_iter()
            .filter(|best| best.value.is_finite())
            .map(|best| ResultRow {
                timestamp: best.label,
                value: best.value.trunc() as i64,
            })
            .collect();
        rows.sort_by_key(|row| row.timestamp);
        rows
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
