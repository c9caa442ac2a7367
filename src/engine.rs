/// Heatmap engine: composition root of the aggregation pipeline.
///
/// raw payload → validated records → classified days → week grid → month
/// spans, plus whole-dataset stats. Every call is a pure function of the
/// payload, the config and the caller-supplied `today`; either the whole
/// view is produced or the first error is returned.
use chrono::NaiveDate;
use serde::Serialize;

use crate::activity::{ActivityPayload, DayRecord, MonthLabel};
use crate::classify::ClassifiedDay;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::months::{compute_spans, MonthSpan};
use crate::stats::{aggregate, ServerStats, Stats, StatsSource};
use crate::weeks::{bucketize, WeekBucket};

/// Everything the renderer needs for one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapView {
    pub weeks: Vec<WeekBucket>,
    pub month_spans: Vec<MonthSpan>,
    pub stats: Stats,
    pub stats_source: StatsSource,
    /// Always `weeks.len()`; serialized so JSON consumers can size the grid
    /// without counting rows
    pub total_weeks: usize,
}

impl HeatmapView {
    /// Look up a single day, e.g. for a details panel
    pub fn day(&self, date: NaiveDate) -> Option<&ClassifiedDay> {
        self.days().find(|d| d.record.date() == date)
    }

    /// All placed days in chronological order
    pub fn days(&self) -> impl Iterator<Item = &ClassifiedDay> {
        self.weeks.iter().flat_map(WeekBucket::days)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeatmapEngine {
    config: EngineConfig,
}

impl HeatmapEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(HeatmapEngine { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the view for a payload as received from the server.
    pub fn build(&self, payload: &ActivityPayload, today: NaiveDate) -> Result<HeatmapView> {
        let records = payload.records()?;
        self.build_from_records(records, &payload.months, payload.stats.as_ref(), today)
    }

    /// Build the view from already-validated records.
    ///
    /// `records` must be strictly ascending by date.
    pub fn build_from_records(
        &self,
        records: Vec<DayRecord>,
        months: &[MonthLabel],
        server_stats: Option<&ServerStats>,
        today: NaiveDate,
    ) -> Result<HeatmapView> {
        let computed = aggregate(&records, today);
        let (stats, stats_source) = self.reconcile_stats(computed, server_stats);

        let days: Vec<ClassifiedDay> = records
            .into_iter()
            .map(|record| ClassifiedDay::new(record, &self.config.level_thresholds))
            .collect();

        let weeks = bucketize(days, self.config.max_weeks)?;
        let month_spans = compute_spans(&weeks, months, self.config.minimum_fraction);
        let total_weeks = weeks.len();

        tracing::debug!(
            total_weeks,
            spans = month_spans.len(),
            active_days = stats.active_days,
            source = ?stats_source,
            "built heatmap view"
        );

        Ok(HeatmapView {
            weeks,
            month_spans,
            stats,
            stats_source,
            total_weeks,
        })
    }

    fn reconcile_stats(
        &self,
        computed: Stats,
        server_stats: Option<&ServerStats>,
    ) -> (Stats, StatsSource) {
        let Some(server) = server_stats else {
            return (computed, StatsSource::Computed);
        };

        if !self.config.trust_server_stats {
            return (computed, StatsSource::Computed);
        }

        if server.is_consistent_with(&computed) {
            (server.clone().into_stats(&computed), StatsSource::Server)
        } else {
            tracing::warn!(
                server_active_days = server.active_days,
                computed_active_days = computed.active_days,
                server_total = server.total_completed,
                computed_total = computed.total_completed,
                server_max_streak = server.max_streak,
                computed_max_streak = computed.max_streak,
                "server stats disagree with records, recomputing"
            );
            (computed, StatsSource::Computed)
        }
    }
}
