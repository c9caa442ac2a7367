/// Per-day classification: dominant activity type and intensity level.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::activity::{Category, DayRecord};
use crate::error::{HeatmapError, Result};

/// Which kind of activity a day shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityType {
    None,
    Single(Category),
    Mixed,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single(category) => category.as_str(),
            Self::Mixed => "mixed",
        }
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ascending lower bounds of intensity levels 1..=N.
///
/// `[1, 2, 4, 7]` reads as: 0 → 0, 1 → 1, 2-3 → 2, 4-6 → 3, 7+ → 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelThresholds(Vec<u32>);

impl Default for LevelThresholds {
    fn default() -> Self {
        LevelThresholds(vec![1, 2, 4, 7])
    }
}

impl LevelThresholds {
    pub fn new(bounds: Vec<u32>) -> Result<Self> {
        let thresholds = LevelThresholds(bounds);
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Level 0 must stay exclusive to a zero total, and bands must not overlap.
    pub fn validate(&self) -> Result<()> {
        let Some(&first) = self.0.first() else {
            return Err(HeatmapError::InvalidConfig(
                "level thresholds must not be empty".to_string(),
            ));
        };
        if first == 0 {
            return Err(HeatmapError::InvalidConfig(
                "first level threshold must be at least 1".to_string(),
            ));
        }
        if self.0.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HeatmapError::InvalidConfig(format!(
                "level thresholds must be strictly ascending: {:?}",
                self.0
            )));
        }
        Ok(())
    }

    /// Highest level a day can reach
    pub fn max_level(&self) -> u8 {
        self.0.len().min(u8::MAX as usize) as u8
    }

    pub fn level(&self, total: u64) -> u8 {
        let reached = self
            .0
            .iter()
            .take_while(|&&bound| total >= u64::from(bound))
            .count();
        reached.min(u8::MAX as usize) as u8
    }
}

/// Result of classifying one day's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub activity_type: ActivityType,
    pub level: u8,
}

/// Classify a day's counters.
///
/// The type depends only on how many categories are non-zero, never on their
/// magnitudes or on map order.
pub fn classify(counts: &IndexMap<Category, u32>, thresholds: &LevelThresholds) -> Classification {
    let mut active = counts.iter().filter(|(_, &count)| count > 0);
    let activity_type = match (active.next(), active.next()) {
        (None, _) => ActivityType::None,
        (Some((&category, _)), None) => ActivityType::Single(category),
        (Some(_), Some(_)) => ActivityType::Mixed,
    };

    let total: u64 = counts.values().map(|&count| u64::from(count)).sum();

    Classification {
        activity_type,
        level: thresholds.level(total),
    }
}

/// A validated day together with its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedDay {
    #[serde(flatten)]
    pub record: DayRecord,
    pub activity_type: ActivityType,
    pub level: u8,
}

impl ClassifiedDay {
    pub fn new(record: DayRecord, thresholds: &LevelThresholds) -> Self {
        let Classification {
            activity_type,
            level,
        } = classify(&record.counts, thresholds);
        ClassifiedDay {
            record,
            activity_type,
            level,
        }
    }
}
