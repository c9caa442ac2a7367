/// Reporting period handling
///
/// Maps the period names the UI requests ('year', 'halfyear', 'quarter',
/// 'month') onto a concrete date window ending on the caller's reference day,
/// and derives month labels and zero-filled datasets for that window.
use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};

use crate::activity::{DayRecord, MonthLabel};
use crate::error::HeatmapError;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Length of a requested activity report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Year,
    HalfYear,
    Quarter,
    Month,
}

impl Period {
    /// Parse a period name as sent by the UI
    pub fn parse(period: &str) -> Result<Self> {
        match period.trim() {
            "year" => Ok(Period::Year),
            "halfyear" => Ok(Period::HalfYear),
            "quarter" => Ok(Period::Quarter),
            "month" => Ok(Period::Month),
            other => Err(anyhow!(
                "Invalid period: '{}'. Expected: 'year', 'halfyear', 'quarter' or 'month'",
                other
            )),
        }
    }

    pub fn months(&self) -> u32 {
        match self {
            Period::Year => 12,
            Period::HalfYear => 6,
            Period::Quarter => 3,
            Period::Month => 1,
        }
    }

    /// Window ending on `today` and starting the day after `today` minus the period.
    pub fn window(&self, today: NaiveDate) -> Result<ReportWindow> {
        let from = today
            .checked_sub_months(Months::new(self.months()))
            .and_then(|d| d.succ_opt())
            .ok_or_else(|| anyhow!("Period {:?} before {} is out of range", self, today))?;

        Ok(ReportWindow { from, to: today })
    }
}

/// Inclusive date range of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReportWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of calendar days covered
    pub fn days(&self) -> usize {
        ((self.to - self.from).num_days() + 1).max(0) as usize
    }

    /// One label per month touched by the window, oldest first
    pub fn month_labels(&self) -> Vec<MonthLabel> {
        let mut labels = Vec::new();
        let (mut year, mut month) = (self.from.year(), self.from.month());
        let end = (self.to.year(), self.to.month());

        while (year, month) <= end {
            labels.push(MonthLabel {
                year,
                month,
                name: MONTH_NAMES[(month - 1) as usize].to_string(),
            });
            if month == 12 {
                year += 1;
                month = 1;
            } else {
                month += 1;
            }
        }

        labels
    }

    /// Fill every absent day of the window with a zero-activity record.
    ///
    /// Records outside the window are dropped. Input must be strictly
    /// ascending, as for the week grid.
    pub fn densify(&self, records: Vec<DayRecord>) -> crate::error::Result<Vec<DayRecord>> {
        let mut previous: Option<NaiveDate> = None;
        let mut inside = Vec::with_capacity(records.len());
        for record in records {
            let date = record.date();
            if let Some(prev) = previous {
                if date == prev {
                    return Err(HeatmapError::DuplicateDate(date.to_string()));
                }
                if date < prev {
                    return Err(HeatmapError::UnsortedInput {
                        previous: prev.to_string(),
                        current: date.to_string(),
                    });
                }
            }
            previous = Some(date);
            if self.contains(date) {
                inside.push(record);
            }
        }

        let mut pending = inside.into_iter().peekable();
        let dense: Vec<DayRecord> = self
            .from
            .iter_days()
            .take_while(|date| *date <= self.to)
            .map(|date| {
                pending
                    .next_if(|r| r.date() == date)
                    .unwrap_or_else(|| DayRecord::empty(date))
            })
            .collect();

        tracing::debug!(days = dense.len(), from = %self.from, to = %self.to, "densified window");

        Ok(dense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Category;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn active(s: &str) -> DayRecord {
        DayRecord::new(date(s), [(Category::Goal, 1)].into_iter().collect()).unwrap()
    }

    #[test]
    fn test_parse_periods() {
        assert_eq!(Period::parse("year").unwrap(), Period::Year);
        assert_eq!(Period::parse("halfyear").unwrap(), Period::HalfYear);
        assert_eq!(Period::parse(" quarter ").unwrap(), Period::Quarter);
        assert_eq!(Period::parse("month").unwrap(), Period::Month);
        assert!(Period::parse("week").is_err());
        assert!(Period::parse("").is_err());
    }

    #[test]
    fn test_year_window() {
        let w = Period::Year.window(date("2024-03-10")).unwrap();
        assert_eq!(w.from, date("2023-03-11"));
        assert_eq!(w.to, date("2024-03-10"));
        assert_eq!(w.days(), 366);
    }

    #[test]
    fn test_month_window_clamps_short_months() {
        // 2024-03-31 minus one month is 2024-02-29
        let w = Period::Month.window(date("2024-03-31")).unwrap();
        assert_eq!(w.from, date("2024-03-01"));
    }

    #[test]
    fn test_quarter_window() {
        let w = Period::Quarter.window(date("2024-01-15")).unwrap();
        assert_eq!(w.from, date("2023-10-16"));
        assert!(w.contains(date("2023-12-31")));
        assert!(!w.contains(date("2023-10-15")));
        assert!(!w.contains(date("2024-01-16")));
    }

    #[test]
    fn test_month_labels_cross_year() {
        let w = Period::Quarter.window(date("2024-01-15")).unwrap();
        let labels: Vec<(i32, u32, String)> = w
            .month_labels()
            .into_iter()
            .map(|m| (m.year, m.month, m.name))
            .collect();
        assert_eq!(
            labels,
            vec![
                (2023, 10, "October".to_string()),
                (2023, 11, "November".to_string()),
                (2023, 12, "December".to_string()),
                (2024, 1, "January".to_string()),
            ]
        );
    }

    #[test]
    fn test_densify_fills_gaps_and_drops_outside() {
        let w = ReportWindow {
            from: date("2024-03-01"),
            to: date("2024-03-05"),
        };
        let dense = w
            .densify(vec![active("2024-02-28"), active("2024-03-02"), active("2024-03-05")])
            .unwrap();

        let shape: Vec<(String, u32)> = dense
            .iter()
            .map(|r| (r.date().to_string(), r.total))
            .collect();
        assert_eq!(
            shape,
            vec![
                ("2024-03-01".to_string(), 0),
                ("2024-03-02".to_string(), 1),
                ("2024-03-03".to_string(), 0),
                ("2024-03-04".to_string(), 0),
                ("2024-03-05".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_densify_rejects_unsorted() {
        let w = ReportWindow {
            from: date("2024-03-01"),
            to: date("2024-03-05"),
        };
        assert!(matches!(
            w.densify(vec![active("2024-03-03"), active("2024-03-02")]),
            Err(HeatmapError::UnsortedInput { .. })
        ));
        assert!(matches!(
            w.densify(vec![active("2024-03-03"), active("2024-03-03")]),
            Err(HeatmapError::DuplicateDate(_))
        ));
    }
}
