/// Week bucketing: lays sorted days out on a Monday-first 7-column grid.
///
/// A single forward pass keeps a `(week, slot)` cursor. The first day lands in
/// its own weekday column of week 0 and every later day moves the cursor by its
/// calendar distance from the previous one, so weekday columns stay aligned and
/// weeks with no data at all still get an empty bucket.
use chrono::NaiveDate;
use serde::Serialize;

use crate::classify::ClassifiedDay;
use crate::error::{HeatmapError, Result};

pub const DAYS_PER_WEEK: usize = 7;
/// A year-long window touches at most 54 weeks
pub const DEFAULT_MAX_WEEKS: usize = 60;

/// One row of the grid, Monday (slot 0) to Sunday (slot 6).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekBucket {
    pub index: usize,
    pub slots: [Option<ClassifiedDay>; DAYS_PER_WEEK],
}

impl WeekBucket {
    fn empty(index: usize) -> Self {
        WeekBucket {
            index,
            slots: Default::default(),
        }
    }

    /// Occupied slots in weekday order
    pub fn days(&self) -> impl Iterator<Item = &ClassifiedDay> {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Grid position of the next day to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    week: usize,
    slot: usize,
}

impl Cursor {
    fn advance(&mut self, days: u64) {
        let position = self.slot as u64 + days;
        self.week += (position / DAYS_PER_WEEK as u64) as usize;
        self.slot = (position % DAYS_PER_WEEK as u64) as usize;
    }
}

/// Bucketize strictly ascending days into contiguous weeks.
///
/// Out-of-order input is `UnsortedInput` and a repeated date is
/// `DuplicateDate`; neither is corrected here. A grid that would need more
/// than `max_weeks` rows is `SpanTooLarge`, raised before those rows exist.
pub fn bucketize(days: Vec<ClassifiedDay>, max_weeks: usize) -> Result<Vec<WeekBucket>> {
    let mut weeks: Vec<WeekBucket> = Vec::new();
    let mut cursor = Cursor { week: 0, slot: 0 };
    let mut first: Option<NaiveDate> = None;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        let date = day.record.date();

        match previous {
            None => {
                cursor.slot = day.record.index.weekday as usize;
                first = Some(date);
            }
            Some(prev) => {
                let gap = (date - prev).num_days();
                if gap == 0 {
                    return Err(HeatmapError::DuplicateDate(date.to_string()));
                }
                if gap < 0 {
                    return Err(HeatmapError::UnsortedInput {
                        previous: prev.to_string(),
                        current: date.to_string(),
                    });
                }
                cursor.advance(gap as u64);
            }
        }

        if cursor.week >= max_weeks {
            return Err(HeatmapError::SpanTooLarge {
                first: first.unwrap_or(date).to_string(),
                last: date.to_string(),
                weeks: cursor.week as u64 + 1,
                max_weeks,
            });
        }

        while weeks.len() <= cursor.week {
            weeks.push(WeekBucket::empty(weeks.len()));
        }
        weeks[cursor.week].slots[cursor.slot] = Some(day);
        previous = Some(date);
    }

    tracing::debug!(weeks = weeks.len(), "bucketized days into weeks");

    Ok(weeks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Category, DayRecord};
    use crate::classify::LevelThresholds;
    use indexmap::IndexMap;

    fn day(date: &str) -> ClassifiedDay {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let counts: IndexMap<Category, u32> = [(Category::Goal, 1)].into_iter().collect();
        ClassifiedDay::new(DayRecord::new(date, counts).unwrap(), &LevelThresholds::default())
    }

    fn occupied(weeks: &[WeekBucket]) -> Vec<(usize, usize, String)> {
        weeks
            .iter()
            .flat_map(|w| {
                w.slots.iter().enumerate().filter_map(move |(slot, d)| {
                    d.as_ref()
                        .map(|d| (w.index, slot, d.record.date().to_string()))
                })
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(bucketize(Vec::new(), DEFAULT_MAX_WEEKS).unwrap().is_empty());
    }

    #[test]
    fn test_single_record() {
        // 2024-01-03 is a Wednesday
        let weeks = bucketize(vec![day("2024-01-03")], DEFAULT_MAX_WEEKS).unwrap();
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].days().count(), 1);
        assert!(weeks[0].slots[2].is_some());
        assert_eq!(weeks[0].slots.iter().filter(|s| s.is_none()).count(), 6);
    }

    #[test]
    fn test_wraps_after_sunday() {
        // Sat, Sun, Mon
        let days = vec![day("2024-01-06"), day("2024-01-07"), day("2024-01-08")];
        let weeks = bucketize(days, DEFAULT_MAX_WEEKS).unwrap();
        assert_eq!(
            occupied(&weeks),
            vec![
                (0, 5, "2024-01-06".to_string()),
                (0, 6, "2024-01-07".to_string()),
                (1, 0, "2024-01-08".to_string()),
            ]
        );
    }

    #[test]
    fn test_gap_within_week_keeps_columns() {
        // Mon then Fri of the same week
        let weeks = bucketize(vec![day("2024-01-01"), day("2024-01-05")], DEFAULT_MAX_WEEKS).unwrap();
        assert_eq!(weeks.len(), 1);
        assert!(weeks[0].slots[0].is_some());
        assert!(weeks[0].slots[4].is_some());
    }

    #[test]
    fn test_multi_week_gap_inserts_empty_weeks() {
        // Sunday, then Monday five weeks later
        let weeks = bucketize(vec![day("2024-01-07"), day("2024-02-12")], DEFAULT_MAX_WEEKS).unwrap();
        assert_eq!(weeks.len(), 7);
        assert!(weeks[1..6].iter().all(WeekBucket::is_empty));
        assert!(weeks[6].slots[0].is_some());
        let indices: Vec<usize> = weeks.iter().map(|w| w.index).collect();
        assert_eq!(indices, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_slot_always_matches_weekday() {
        let dates = [
            "2023-12-29", "2024-01-02", "2024-01-03", "2024-01-21", "2024-02-29", "2024-03-01",
            "2024-03-31", "2024-04-01",
        ];
        let weeks = bucketize(dates.iter().map(|d| day(d)).collect(), DEFAULT_MAX_WEEKS).unwrap();
        for week in &weeks {
            for (slot, d) in week.slots.iter().enumerate() {
                if let Some(d) = d {
                    assert_eq!(d.record.index.weekday as usize, slot);
                }
            }
        }
        let flattened: Vec<String> = occupied(&weeks).into_iter().map(|(_, _, d)| d).collect();
        assert_eq!(flattened, dates.iter().map(|d| d.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let result = bucketize(vec![day("2024-02-01"), day("2024-02-01")], DEFAULT_MAX_WEEKS);
        assert_eq!(result, Err(HeatmapError::DuplicateDate("2024-02-01".to_string())));
    }

    #[test]
    fn test_unsorted_input_rejected() {
        let result = bucketize(vec![day("2024-02-02"), day("2024-02-01")], DEFAULT_MAX_WEEKS);
        assert_eq!(
            result,
            Err(HeatmapError::UnsortedInput {
                previous: "2024-02-02".to_string(),
                current: "2024-02-01".to_string(),
            })
        );
    }

    #[test]
    fn test_span_limit_is_inclusive() {
        let weeks = bucketize(vec![day("2024-01-01"), day("2024-01-14")], 2).unwrap();
        assert_eq!(weeks.len(), 2);

        let result = bucketize(vec![day("2024-01-01"), day("2024-01-15")], 2);
        assert_eq!(
            result,
            Err(HeatmapError::SpanTooLarge {
                first: "2024-01-01".to_string(),
                last: "2024-01-15".to_string(),
                weeks: 3,
                max_weeks: 2,
            })
        );
    }

    #[test]
    fn test_huge_span_rejected_without_building_grid() {
        let result = bucketize(vec![day("0001-01-01"), day("9999-12-31")], DEFAULT_MAX_WEEKS);
        match result {
            Err(HeatmapError::SpanTooLarge { weeks, max_weeks, .. }) => {
                assert!(weeks > 500_000);
                assert_eq!(max_weeks, DEFAULT_MAX_WEEKS);
            }
            other => panic!("expected SpanTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_cursor_advance() {
        let mut cursor = Cursor { week: 0, slot: 5 };
        cursor.advance(1);
        assert_eq!(cursor, Cursor { week: 0, slot: 6 });
        cursor.advance(1);
        assert_eq!(cursor, Cursor { week: 1, slot: 0 });
        cursor.advance(15);
        assert_eq!(cursor, Cursor { week: 3, slot: 1 });
    }
}
