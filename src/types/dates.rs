//! Calendar dates at the tool boundary, epoch milliseconds on the wire.

use crate::errors::{LinkedInError, LinkedInResult};
use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Boundary date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a strict `YYYY-MM-DD` date, reporting `field` on failure.
pub fn parse_date(field: &str, value: &str) -> LinkedInResult<NaiveDate> {
    let invalid = || LinkedInError::validation(field, format!("'{}' is not a YYYY-MM-DD date", value));

    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| invalid())
}

/// Midnight UTC of `date` in epoch milliseconds.
pub fn date_to_epoch_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// Formats epoch milliseconds as a UTC `YYYY-MM-DD` date.
pub fn epoch_millis_to_date(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format(DATE_FORMAT).to_string())
}

/// Date split into parts, as used by `dateRange` in analytics finders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    /// Year.
    pub year: i32,
    /// Month, 1-based.
    pub month: u32,
    /// Day of month.
    pub day: u32,
}

impl DateParts {
    /// Formats as `YYYY-MM-DD`; `None` for impossible dates.
    pub fn to_date_string(self) -> Option<String> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .map(|d| d.format(DATE_FORMAT).to_string())
    }
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}

/// A validated start/end pair. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// First day.
    pub start: NaiveDate,
    /// Last day, if bounded.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Parses and checks a date range from tool input fields.
    pub fn parse(start: &str, end: Option<&str>) -> LinkedInResult<Self> {
        let start = parse_date("start_date", start)?;
        let end = end.map(|e| parse_date("end_date", e)).transpose()?;

        if let Some(end) = end {
            if end < start {
                return Err(LinkedInError::validation(
                    "end_date",
                    "end_date must not be before start_date",
                ));
            }
        }

        Ok(Self { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn converts_to_midnight_utc() {
        let date = parse_date("start_date", "2024-01-15").unwrap();
        assert_eq!(date_to_epoch_millis(date), 1_705_276_800_000);
        assert_eq!(epoch_millis_to_date(1_705_276_800_000).as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn intraday_millis_keep_the_day() {
        assert_eq!(epoch_millis_to_date(1_705_320_000_000).as_deref(), Some("2024-01-15"));
    }

    #[test_case("2024-1-15" ; "unpadded month")]
    #[test_case("15/01/2024" ; "wrong separator")]
    #[test_case("2024-02-30" ; "impossible day")]
    #[test_case("" ; "empty")]
    fn rejects_bad_dates(raw: &str) {
        let err = parse_date("start_date", raw).unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "start_date"));
    }

    #[test]
    fn range_rejects_inverted_dates() {
        let err = DateRange::parse("2024-02-01", Some("2024-01-01")).unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "end_date"));
    }

    #[test]
    fn date_parts_round_trip() {
        let parts = DateParts::from(parse_date("d", "2023-12-31").unwrap());
        assert_eq!(parts, DateParts { year: 2023, month: 12, day: 31 });
        assert_eq!(parts.to_date_string().as_deref(), Some("2023-12-31"));
    }
}
