//! Common regex patterns for sheet cell cleanup.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // First run of ASCII digits ("12 pcs" -> "12")
    pub static ref FIRST_DIGITS: Regex = Regex::new(r"[0-9]+").unwrap();

    // Anything that is not a letter, digit or space, for header matching
    pub static ref HEADER_PUNCTUATION: Regex = Regex::new(r"[^\p{L}\p{N}\s]").unwrap();

    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Trailing time component of a datetime cell ("2024-01-01 00:00:00")
    pub static ref TRAILING_TIME: Regex = Regex::new(
        r"[ T]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?$"
    ).unwrap();
}
