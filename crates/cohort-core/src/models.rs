use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CohortError;

/// The only action type that contributes to the summed metric.
pub const CONFIRMATION_ACTION: &str = "confirmation";

/// One row of the input event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// User identifier. Integer ids are stored in canonical form.
    pub userid: String,
    /// Calendar date of the event; time-of-day is discarded on load.
    pub timestamp: NaiveDate,
    /// Action type, e.g. `"confirmation"`.
    pub action: String,
    /// Summable metric. `None` when the cell was empty.
    #[serde(default)]
    pub value: Option<f64>,
}

impl EventRecord {
    /// Whether this row is a confirmation action.
    pub fn is_confirmation(&self) -> bool {
        self.action == CONFIRMATION_ACTION
    }
}

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Earliest and latest event dates of a whole dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DateSpan {
    /// Span of `dates`, or `None` when the iterator is empty.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |span, date| match span {
            None => Some(Self {
                min: date,
                max: date,
            }),
            Some(s) => Some(Self {
                min: s.min.min(date),
                max: s.max.max(date),
            }),
        })
    }

    /// Whether `month` is the first or last month of the span.
    pub fn is_boundary(&self, month: MonthKey) -> bool {
        month == MonthKey::of(self.min) || month == MonthKey::of(self.max)
    }
}

/// How each month's row is labeled in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelMode {
    /// Last calendar day of the month, whatever day held the maximum.
    #[default]
    MonthEnd,
    /// The earliest day in the month on which the maximum occurred.
    Peak,
}

impl FromStr for LabelMode {
    type Err = CohortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month-end" => Ok(Self::MonthEnd),
            "peak" => Ok(Self::Peak),
            other => Err(CohortError::Config(format!(
                "unknown label mode \"{}\"",
                other
            ))),
        }
    }
}

impl fmt::Display for LabelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthEnd => f.write_str("month-end"),
            Self::Peak => f.write_str("peak"),
        }
    }
}

/// The best daily total found within one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBest {
    pub month: MonthKey,
    /// Date reported for the month, chosen by [`LabelMode`].
    pub label: NaiveDate,
    /// Maximum daily confirmation total within the month.
    pub value: f64,
}

/// One row of the written report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub timestamp: NaiveDate,
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_is_confirmation_exact_match() {
        let mut event = EventRecord {
            userid: "1".to_string(),
            timestamp: date(2021, 1, 5),
            action: "confirmation".to_string(),
            value: Some(1.0),
        };
        assert!(event.is_confirmation());
        event.action = "Confirmation".to_string();
        assert!(!event.is_confirmation());
    }

    #[test]
    fn test_month_key_ordering_and_display() {
        let dec = MonthKey::of(date(2020, 12, 31));
        let jan = MonthKey::of(date(2021, 1, 1));
        assert!(dec < jan);
        assert_eq!(dec.to_string(), "2020-12");
    }

    #[test]
    fn test_date_span_from_dates() {
        let span = DateSpan::from_dates(vec![date(2021, 2, 1), date(2021, 1, 5), date(2021, 3, 1)])
            .unwrap();
        assert_eq!(span.min, date(2021, 1, 5));
        assert_eq!(span.max, date(2021, 3, 1));
        assert!(DateSpan::from_dates(Vec::new()).is_none());
    }

    #[test]
    fn test_date_span_boundary_months() {
        let span = DateSpan {
            min: date(2021, 1, 5),
            max: date(2021, 3, 1),
        };
        assert!(span.is_boundary(MonthKey { year: 2021, month: 1 }));
        assert!(!span.is_boundary(MonthKey { year: 2021, month: 2 }));
        assert!(span.is_boundary(MonthKey { year: 2021, month: 3 }));
        // Same month number in another year is not a boundary.
        assert!(!span.is_boundary(MonthKey { year: 2022, month: 1 }));
    }

    #[test]
    fn test_label_mode_parse() {
        assert_eq!("month-end".parse::<LabelMode>().unwrap(), LabelMode::MonthEnd);
        assert_eq!("peak".parse::<LabelMode>().unwrap(), LabelMode::Peak);
        assert!("weekly".parse::<LabelMode>().is_err());
        assert_eq!(LabelMode::default(), LabelMode::MonthEnd);
    }

    #[test]
    fn test_label_mode_serde_round_names() {
        let json = serde_json::to_string(&LabelMode::MonthEnd).unwrap();
        assert_eq!(json, "\"month-end\"");
        assert_eq!(LabelMode::Peak.to_string(), "peak");
    }
}
