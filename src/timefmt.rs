use chrono::NaiveDate;

/// Column headers of the grid, Monday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Format a date for humans, e.g. "10 March 2024".
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Short label of a Monday-first weekday index, or '?' when out of range.
pub fn weekday_label(weekday: u32) -> &'static str {
    WEEKDAY_LABELS.get(weekday as usize).copied().unwrap_or("?")
}
