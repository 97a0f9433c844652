use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::warn;

// ── Event date parsing ────────────────────────────────────────────────────────

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Ambiguous numeric layouts are always month-first.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m.%d.%Y"];

/// Parse an event timestamp cell into its calendar date.
///
/// Time-of-day is dropped. When the string carries a UTC offset the
/// wall-clock date as written is kept; nothing is converted between zones.
/// Returns `None` for empty or unrecognised strings.
pub fn parse_event_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // Replace trailing 'Z' with '+00:00' for RFC 3339 compatibility.
    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalised, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    warn!("could not parse timestamp string \"{}\"", s);
    None
}

// ── Month arithmetic ──────────────────────────────────────────────────────────

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_event_date("2021-01-05"), Some(date(2021, 1, 5)));
    }

    #[test]
    fn test_parse_drops_time_of_day() {
        assert_eq!(
            parse_event_date("2021-01-05 23:59:59"),
            Some(date(2021, 1, 5))
        );
        assert_eq!(
            parse_event_date("2021-01-05T00:00:01.250"),
            Some(date(2021, 1, 5))
        );
        assert_eq!(parse_event_date("2021-01-05 08:30"), Some(date(2021, 1, 5)));
    }

    #[test]
    fn test_parse_keeps_wall_clock_date_with_offset() {
        assert_eq!(
            parse_event_date("2021-01-05T23:30:00+05:00"),
            Some(date(2021, 1, 5))
        );
        assert_eq!(
            parse_event_date("2021-01-05T23:30:00Z"),
            Some(date(2021, 1, 5))
        );
    }

    #[test]
    fn test_parse_alternative_layouts() {
        assert_eq!(parse_event_date("2021/02/10"), Some(date(2021, 2, 10)));
        assert_eq!(
            parse_event_date("2021/02/10 12:00:00"),
            Some(date(2021, 2, 10))
        );
        assert_eq!(parse_event_date("02.10.2021"), Some(date(2021, 2, 10)));
    }

    #[test]
    fn test_parse_slash_dates_are_month_first_with_or_without_time() {
        let date_only = parse_event_date("03/04/2021");
        assert_eq!(date_only, Some(date(2021, 3, 4)));
        assert_eq!(parse_event_date("03/04/2021 10:00:00"), date_only);
        assert_eq!(parse_event_date("03/04/2021 10:00"), date_only);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_event_date("  2021-03-01 "), Some(date(2021, 3, 1)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_event_date(""), None);
        assert_eq!(parse_event_date("not a date"), None);
        assert_eq!(parse_event_date("2021-02-30"), None);
    }

    #[test]
    fn test_month_end_regular_months() {
        assert_eq!(month_end(date(2021, 2, 10)), date(2021, 2, 28));
        assert_eq!(month_end(date(2021, 4, 1)), date(2021, 4, 30));
        assert_eq!(month_end(date(2021, 1, 31)), date(2021, 1, 31));
    }

    #[test]
    fn test_month_end_leap_year_and_december() {
        assert_eq!(month_end(date(2020, 2, 1)), date(2020, 2, 29));
        assert_eq!(month_end(date(2021, 12, 15)), date(2021, 12, 31));
    }
}
