/// Calendar indexing of ISO dates.
///
/// Turns `YYYY-MM-DD` strings into a (year, month, day, weekday) tuple with a
/// Monday-first weekday, the column convention used by the whole grid.
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{HeatmapError, Result};

/// Canonical calendar position of one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DateIndex {
    pub date: NaiveDate,
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// Day of month, 1-31
    pub day: u32,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
}

impl DateIndex {
    /// Index an already-parsed date.
    pub fn of(date: NaiveDate) -> Self {
        let native = date.weekday().num_days_from_sunday();
        DateIndex {
            date,
            year: date.year(),
            month: date.month(),
            day: date.day(),
            weekday: monday_first(native),
        }
    }

    /// `(year, month)` pair used to group days into month spans.
    pub fn month_key(&self) -> (i32, u32) {
        (self.year, self.month)
    }
}

/// Convert a Sunday-first weekday (0 = Sunday) into the Monday-first one.
pub fn monday_first(native_weekday: u32) -> u32 {
    (native_weekday + 6) % 7
}

/// Parse and index an ISO `YYYY-MM-DD` date.
///
/// Only the exact ten-character form is accepted; anything else, including
/// impossible calendar dates such as `2024-02-30`, is `InvalidDate`.
pub fn index(date: &str) -> Result<DateIndex> {
    parse_date(date).map(DateIndex::of)
}

/// Parse an ISO `YYYY-MM-DD` date without indexing it.
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    let bytes = date.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(HeatmapError::InvalidDate(date.to_string()));
    }

    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| HeatmapError::InvalidDate(date.to_string()))
}
