use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use indexmap::IndexMap;
use jsonschema::{Draft, JSONSchema};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::date_index::{self, DateIndex};
use crate::error::{HeatmapError, Result};
use crate::stats::ServerStats;

/// JSON schema for activity payloads, bundled so validation works from any directory.
pub const ACTIVITY_SCHEMA: &str = include_str!("../activity_schema.json");

/// Kinds of tracked user actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Goal,
    List,
    Progress,
    DailyGoal,
    RegularGoal,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Goal,
        Category::List,
        Category::Progress,
        Category::DailyGoal,
        Category::RegularGoal,
    ];

    /// Wire tag, also used as the activity-type tag of single-category days
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "goal",
            Self::List => "list",
            Self::Progress => "progress",
            Self::DailyGoal => "dailyGoal",
            Self::RegularGoal => "regularGoal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Goal => "Goals",
            Self::List => "Lists",
            Self::Progress => "Progress updates",
            Self::DailyGoal => "Daily goals",
            Self::RegularGoal => "Regular goals",
        }
    }
}

/// Something completed on a given day, shown in the day-details panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedItem {
    pub id: u64,
    pub title: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// One day as received from the server, before any validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDay {
    pub date: String,
    #[serde(default)]
    pub counts: IndexMap<Category, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<CompletedItem>,
}

/// Month the UI wants labelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthLabel {
    pub year: i32,
    pub month: u32,
    pub name: String,
}

/// Full activity payload for one reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPayload {
    pub dates: Vec<RawDay>,
    #[serde(default)]
    pub months: Vec<MonthLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<ServerStats>,
}

/// A validated day: parsed date, counters and a total that agrees with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    #[serde(flatten)]
    pub index: DateIndex,
    pub counts: IndexMap<Category, u32>,
    pub total: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<CompletedItem>,
}

impl DayRecord {
    /// Fails with `CountOverflow` when the counters do not sum within `u32`.
    pub fn new(date: NaiveDate, counts: IndexMap<Category, u32>) -> Result<Self> {
        let index = DateIndex::of(date);
        let total = sum_counts(&counts)
            .ok_or_else(|| HeatmapError::CountOverflow(date.to_string()))?;
        Ok(DayRecord {
            index,
            counts,
            total,
            completed: Vec::new(),
        })
    }

    /// A day with no activity at all.
    pub fn empty(date: NaiveDate) -> Self {
        DayRecord {
            index: DateIndex::of(date),
            counts: IndexMap::new(),
            total: 0,
            completed: Vec::new(),
        }
    }

    /// Validate a raw day. Fails on an unparseable date, counters whose sum
    /// overflows, or a carried `total` that disagrees with the counters.
    pub fn from_raw(raw: &RawDay) -> Result<Self> {
        let index = date_index::index(&raw.date)?;
        let sum = sum_counts(&raw.counts)
            .ok_or_else(|| HeatmapError::CountOverflow(raw.date.clone()))?;

        if let Some(total) = raw.total {
            if total != sum {
                return Err(HeatmapError::TotalMismatch {
                    date: raw.date.clone(),
                    total,
                    sum,
                });
            }
        }

        Ok(DayRecord {
            index,
            counts: raw.counts.clone(),
            total: sum,
            completed: raw.completed.clone(),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.index.date
    }

    pub fn count(&self, category: Category) -> u32 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        self.total > 0
    }
}

fn sum_counts(counts: &IndexMap<Category, u32>) -> Option<u32> {
    counts.values().try_fold(0u32, |acc, &c| acc.checked_add(c))
}

impl ActivityPayload {
    /// Validate every raw day, keeping payload order.
    pub fn records(&self) -> Result<Vec<DayRecord>> {
        self.dates.iter().map(DayRecord::from_raw).collect()
    }

    /// Compile the bundled payload schema
    pub fn schema() -> anyhow::Result<JSONSchema> {
        let schema_json: serde_json::Value =
            serde_json::from_str(ACTIVITY_SCHEMA).context("Failed to parse bundled schema")?;

        JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&schema_json)
            .map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
    }

    /// Validate a payload JSON value against the schema, listing every violation
    pub fn validate_with_schema(
        payload_json: &serde_json::Value,
        schema: &JSONSchema,
    ) -> anyhow::Result<()> {
        match schema.validate(payload_json) {
            Ok(_) => Ok(()),
            Err(errors) => {
                let error_messages: Vec<String> = errors
                    .map(|e| format!("  - {}: {}", e.instance_path, e))
                    .collect();
                bail!("Payload validation failed:\n{}", error_messages.join("\n"))
            }
        }
    }

    /// Load a payload file, validate it against the schema, then deserialize it
    pub fn load_and_validate(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read activity file: {}", path.display()))?;

        let payload_json: serde_json::Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        let schema = Self::schema()?;
        Self::validate_with_schema(&payload_json, &schema)?;

        let payload: ActivityPayload = serde_json::from_value(payload_json).with_context(|| {
            format!("Failed to deserialize activity from: {}", path.display())
        })?;

        Ok(payload)
    }
}
