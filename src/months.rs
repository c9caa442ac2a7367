/// Month label layout against the week grid.
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::activity::MonthLabel;
use crate::weeks::WeekBucket;

pub const DEFAULT_MINIMUM_FRACTION: f64 = 0.05;

/// Horizontal extent of one month across the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSpan {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// First week holding a day of this month
    pub start_week_index: usize,
    /// Number of distinct weeks holding a day of this month
    pub week_span: usize,
    /// `exact_fraction` raised to the minimum fraction. This is a legibility
    /// concession for narrow months, not a layout truth.
    pub width_fraction: f64,
    /// `week_span / total_weeks`, never clamped
    pub exact_fraction: f64,
}

impl MonthSpan {
    /// Last week index holding a day of this month, assuming no interior gap
    pub fn end_week_index(&self) -> usize {
        self.start_week_index + self.week_span.saturating_sub(1)
    }
}

/// Compute one span per labelled month present in `weeks`, in chronological order.
///
/// A day belongs to its own calendar month whatever week it landed in, so a
/// week straddling a month boundary is claimed by both months. The week set is
/// collected explicitly; a filtered dataset with holes still gets the right
/// `week_span`. Months in the data without a label are skipped.
pub fn compute_spans(
    weeks: &[WeekBucket],
    months_present: &[MonthLabel],
    minimum_fraction: f64,
) -> Vec<MonthSpan> {
    let total_weeks = weeks.len();
    if total_weeks == 0 {
        return Vec::new();
    }

    let mut weeks_by_month: BTreeMap<(i32, u32), BTreeSet<usize>> = BTreeMap::new();
    for week in weeks {
        for day in week.days() {
            weeks_by_month
                .entry(day.record.index.month_key())
                .or_default()
                .insert(week.index);
        }
    }

    let mut spans = Vec::with_capacity(weeks_by_month.len());
    for ((year, month), week_indices) in weeks_by_month {
        let Some(label) = months_present
            .iter()
            .find(|m| m.year == year && m.month == month)
        else {
            tracing::warn!(year, month, "month present in data has no label, skipping");
            continue;
        };

        let Some(&start_week_index) = week_indices.first() else {
            continue;
        };
        let week_span = week_indices.len();
        let exact_fraction = week_span as f64 / total_weeks as f64;

        spans.push(MonthSpan {
            year,
            month,
            label: label.name.clone(),
            start_week_index,
            week_span,
            width_fraction: exact_fraction.max(minimum_fraction),
            exact_fraction,
        });
    }

    tracing::debug!(spans = spans.len(), total_weeks, "computed month spans");

    spans
}
