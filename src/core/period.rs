use crate::utils::error::{Result, TrackerError};
use chrono::{Datelike, NaiveDate};

pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

const ISO_DATE: &str = "%Y-%m-%d";

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        let end = next_month.pred_opt()?;
        Some(Self { start, end })
    }

    pub fn for_year(year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `YYYY-MM-DD` bounds for string range queries.
    pub fn iso_bounds(&self) -> (String, String) {
        (
            self.start.format(ISO_DATE).to_string(),
            self.end.format(ISO_DATE).to_string(),
        )
    }
}

/// Month to report on: `month` when it is 1-12, otherwise the month of `today`.
pub fn resolve_month(month: Option<i64>, today: NaiveDate) -> u32 {
    month
        .filter(|m| (1..=12).contains(m))
        .and_then(|m| u32::try_from(m).ok())
        .unwrap_or_else(|| today.month())
}

/// Year to report on: `year` when it is a four-digit ISO year, otherwise the year of `today`.
pub fn resolve_year(year: Option<i64>, today: NaiveDate) -> i32 {
    year.filter(|y| (i64::from(MIN_YEAR)..=i64::from(MAX_YEAR)).contains(y))
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or_else(|| today.year())
}

pub fn monthly_range(month: Option<i64>, year: Option<i64>, today: NaiveDate) -> Result<DateRange> {
    let month = resolve_month(month, today);
    let year = resolve_year(year, today);
    DateRange::for_month(year, month).ok_or_else(|| TrackerError::ValidationError {
        message: format!("no calendar month {}-{:02}", year, month),
    })
}

pub fn yearly_range(year: Option<i64>, today: NaiveDate) -> Result<DateRange> {
    let year = resolve_year(year, today);
    DateRange::for_year(year).ok_or_else(|| TrackerError::ValidationError {
        message: format!("no calendar year {}", year),
    })
}

/// Reads a leading integer the way query strings are interpreted:
/// `"3"`, `" 3"`, `"3.7"` and `"3rd"` all give 3; `""` and `"abc"` give `None`.
pub fn parse_loose_int(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let len = digits.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let value: i64 = digits[..len].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!(DateRange::for_month(2024, 2).unwrap().end, date(2024, 2, 29));
        assert_eq!(DateRange::for_month(2023, 2).unwrap().end, date(2023, 2, 28));
        assert_eq!(DateRange::for_month(1900, 2).unwrap().end, date(1900, 2, 28));
        assert_eq!(DateRange::for_month(2000, 2).unwrap().end, date(2000, 2, 29));
        assert_eq!(DateRange::for_month(2024, 4).unwrap().end, date(2024, 4, 30));
        assert_eq!(DateRange::for_month(2024, 12).unwrap().end, date(2024, 12, 31));
        assert!(DateRange::for_month(2024, 13).is_none());
    }

    #[test]
    fn test_iso_bounds() {
        let range = DateRange::for_month(2024, 3).unwrap();
        assert_eq!(
            range.iso_bounds(),
            ("2024-03-01".to_string(), "2024-03-31".to_string())
        );

        let early = DateRange::for_year(987).unwrap();
        assert_eq!(
            early.iso_bounds(),
            ("0987-01-01".to_string(), "0987-12-31".to_string())
        );
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = DateRange::for_year(2024).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
    }

    #[test]
    fn test_resolve_defaults_to_today() {
        let today = date(2026, 10, 19);
        assert_eq!(resolve_month(None, today), 10);
        assert_eq!(resolve_month(Some(0), today), 10);
        assert_eq!(resolve_month(Some(13), today), 10);
        assert_eq!(resolve_month(Some(3), today), 3);
        assert_eq!(resolve_year(None, today), 2026);
        assert_eq!(resolve_year(Some(0), today), 2026);
        assert_eq!(resolve_year(Some(10_000), today), 2026);
        assert_eq!(resolve_year(Some(2024), today), 2024);
    }

    #[test]
    fn test_monthly_range_with_partial_input() {
        let today = date(2026, 10, 19);
        let range = monthly_range(Some(2), None, today).unwrap();
        assert_eq!(range.start, date(2026, 2, 1));
        assert_eq!(range.end, date(2026, 2, 28));

        let range = yearly_range(None, today).unwrap();
        assert_eq!(range.start, date(2026, 1, 1));
        assert_eq!(range.end, date(2026, 12, 31));
    }

    #[test]
    fn test_parse_loose_int() {
        assert_eq!(parse_loose_int(Some("3")), Some(3));
        assert_eq!(parse_loose_int(Some(" 12")), Some(12));
        assert_eq!(parse_loose_int(Some("3.7")), Some(3));
        assert_eq!(parse_loose_int(Some("2024abc")), Some(2024));
        assert_eq!(parse_loose_int(Some("-4")), Some(-4));
        assert_eq!(parse_loose_int(Some("")), None);
        assert_eq!(parse_loose_int(Some("march")), None);
        assert_eq!(parse_loose_int(None), None);
        assert_eq!(parse_loose_int(Some("99999999999999999999")), None);
    }
}
