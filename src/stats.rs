/// Whole-dataset activity statistics.
///
/// Totals, active-day counts and streaks. Streaks are measured over calendar
/// days, so a date missing from the input breaks a streak exactly like a
/// zero-activity record does.
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::activity::{Category, DayRecord};

/// Aggregated statistics for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Every category, in `Category::ALL` order, zero when unused
    pub totals: IndexMap<Category, u64>,
    pub total_completed: u64,
    pub active_days: usize,
    pub total_days: usize,
    pub current_streak: usize,
    pub max_streak: usize,
    pub activity_percentage: u32,
    pub is_active_today: bool,
}

impl Stats {
    pub fn total(&self, category: Category) -> u64 {
        self.totals.get(&category).copied().unwrap_or(0)
    }
}

/// Pre-aggregated stats as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStats {
    pub total_goals_completed: u64,
    pub total_lists_completed: u64,
    pub total_completed: u64,
    pub active_days: usize,
    pub total_days: usize,
    pub current_streak: usize,
    pub max_streak: usize,
    pub activity_percentage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active_today: Option<bool>,
}

/// Where the stats in a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    Computed,
    Server,
}

impl ServerStats {
    /// True when every dataset-wide figure the server sent agrees with a
    /// recomputation over the same records.
    ///
    /// `currentStreak` and `isActiveToday` are not compared: they depend on
    /// the caller's `today`, which the server never saw.
    pub fn is_consistent_with(&self, computed: &Stats) -> bool {
        self.total_goals_completed == computed.total(Category::Goal)
            && self.total_lists_completed == computed.total(Category::List)
            && self.total_completed == computed.total_completed
            && self.active_days == computed.active_days
            && self.total_days == computed.total_days
            && self.max_streak == computed.max_streak
            && self.activity_percentage == computed.activity_percentage
    }

    /// Convert into `Stats`. Category breakdown and the `today`-relative
    /// fields always come from `computed`.
    pub fn into_stats(self, computed: &Stats) -> Stats {
        Stats {
            totals: computed.totals.clone(),
            total_completed: self.total_completed,
            active_days: self.active_days,
            total_days: self.total_days,
            current_streak: computed.current_streak,
            max_streak: self.max_streak,
            activity_percentage: self.activity_percentage,
            is_active_today: computed.is_active_today,
        }
    }
}

/// Aggregate stats over `records`, relative to the caller's `today`.
///
/// Record order does not matter. Repeated dates count once for streaks.
pub fn aggregate(records: &[DayRecord], today: NaiveDate) -> Stats {
    let mut totals: IndexMap<Category, u64> =
        Category::ALL.iter().map(|&category| (category, 0)).collect();
    for record in records {
        for (category, &count) in &record.counts {
            *totals.entry(*category).or_insert(0) += u64::from(count);
        }
    }
    let total_completed = totals.values().sum();

    let mut active_dates: Vec<NaiveDate> = records
        .iter()
        .filter(|r| r.is_active())
        .map(DayRecord::date)
        .collect();
    active_dates.sort_unstable();
    active_dates.dedup();

    let active_days = records.iter().filter(|r| r.is_active()).count();
    let total_days = records.len();
    let last_recorded = records.iter().map(DayRecord::date).max();

    Stats {
        totals,
        total_completed,
        active_days,
        total_days,
        current_streak: current_streak(&active_dates, last_recorded, today),
        max_streak: max_streak(&active_dates),
        activity_percentage: percentage(active_days, total_days),
        is_active_today: active_dates.binary_search(&today).is_ok(),
    }
}

/// Longest run of consecutive calendar days in sorted, deduplicated dates.
pub fn max_streak(active_dates: &[NaiveDate]) -> usize {
    if active_dates.is_empty() {
        return 0;
    }

    let mut best = 1;
    let mut run = 1;
    for pair in active_dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best
}

/// Run of consecutive active days ending at the streak anchor.
///
/// The anchor is `today` when today is active. Otherwise, if the dataset
/// stops before today, it is the most recent active day; if the dataset
/// reaches today and today is inactive the streak is over.
pub fn current_streak(
    active_dates: &[NaiveDate],
    last_recorded: Option<NaiveDate>,
    today: NaiveDate,
) -> usize {
    let past: &[NaiveDate] = match active_dates.binary_search(&today) {
        Ok(pos) => &active_dates[..=pos],
        Err(pos) => {
            let reaches_today = last_recorded.is_some_and(|last| last >= today);
            if reaches_today {
                return 0;
            }
            &active_dates[..pos]
        }
    };

    let Some((&anchor, earlier)) = past.split_last() else {
        return 0;
    };

    let mut streak = 1;
    let mut expected = anchor;
    for &date in earlier.iter().rev() {
        match expected.pred_opt() {
            Some(prev) if prev == date => {
                streak += 1;
                expected = date;
            }
            _ => break,
        }
    }
    streak
}

/// `part / whole` as a whole percentage, rounded half up; 0 for an empty whole.
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u64;
    let whole = whole as u64;
    ((part * 200 + whole) / (whole * 2)) as u32
}
