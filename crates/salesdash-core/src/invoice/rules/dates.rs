//! Date parsing for sheet cells.

use chrono::{Datelike, NaiveDate};

use super::patterns::TRAILING_TIME;

// Day-first only; month-first layouts are not recognized.
const FOUR_DIGIT_YEAR_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
];

const TWO_DIGIT_YEAR_FORMATS: &[&str] = &["%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%b-%y"];

/// Parse a date cell. Returns `None` for anything unrecognized.
pub fn parse_sheet_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    let date_part = TRAILING_TIME.replace(trimmed, "");
    let date_part = date_part.trim();

    if date_part.is_empty() {
        return None;
    }

    for format in FOUR_DIGIT_YEAR_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            // %Y also accepts short years; leave those to the two-digit formats
            if date.year() >= 1000 {
                return Some(date);
            }
        }
    }

    TWO_DIGIT_YEAR_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_parse_sheet_date() {
        assert_eq!(parse_sheet_date("01-01-2024"), ymd(2024, 1, 1));
        assert_eq!(parse_sheet_date("2024-03-15"), ymd(2024, 3, 15));
        assert_eq!(parse_sheet_date("15/03/2024"), ymd(2024, 3, 15));
        assert_eq!(parse_sheet_date("1-Apr-2024"), ymd(2024, 4, 1));
        assert_eq!(parse_sheet_date("1-Apr-24"), ymd(2024, 4, 1));
        assert_eq!(parse_sheet_date("05/04/24"), ymd(2024, 4, 5));
    }

    #[test]
    fn test_parse_datetime_cell() {
        assert_eq!(parse_sheet_date("2024-01-01 00:00:00"), ymd(2024, 1, 1));
        assert_eq!(parse_sheet_date("2024-01-01T10:30"), ymd(2024, 1, 1));
    }

    #[test]
    fn test_parse_invalid_date() {
        assert_eq!(parse_sheet_date("N/A"), None);
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("31-02-2024"), None);
    }
}
