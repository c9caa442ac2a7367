/// Caller-owned memoization of heatmap views.
///
/// Views are keyed by a SHA-256 content hash of `(payload, today, config)`, so
/// identical requests reuse one result and any change to the dataset, the
/// reference day or the engine tunables misses. Oldest entries are evicted
/// first once capacity is reached. Failed builds are never cached.
use chrono::NaiveDate;
use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::activity::ActivityPayload;
use crate::config::EngineConfig;
use crate::engine::{HeatmapEngine, HeatmapView};
use crate::error::Result;

pub const DEFAULT_CAPACITY: usize = 16;

/// Hex-encoded SHA-256 of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn compute(
        payload: &ActivityPayload,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> serde_json::Result<Self> {
        let mut hasher = Sha256::new();
        serde_json::to_writer(&mut hasher, &(payload, today, config))?;
        Ok(CacheKey(hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
pub struct HeatmapCache {
    capacity: usize,
    entries: IndexMap<CacheKey, Arc<HeatmapView>>,
    hits: u64,
    misses: u64,
}

impl Default for HeatmapCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HeatmapCache {
    pub fn with_capacity(capacity: usize) -> Self {
        HeatmapCache {
            capacity,
            entries: IndexMap::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached view for this request, building and storing it on a miss.
    pub fn get_or_build(
        &mut self,
        engine: &HeatmapEngine,
        payload: &ActivityPayload,
        today: NaiveDate,
    ) -> Result<Arc<HeatmapView>> {
        let key = match CacheKey::compute(payload, today, engine.config()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Failed to hash heatmap request, bypassing cache: {}", e);
                return engine.build(payload, today).map(Arc::new);
            }
        };

        if let Some(view) = self.entries.get(&key) {
            self.hits += 1;
            tracing::debug!(key = key.as_str(), "heatmap cache hit");
            return Ok(Arc::clone(view));
        }

        self.misses += 1;
        let view = Arc::new(engine.build(payload, today)?);

        if self.capacity > 0 {
            while self.entries.len() >= self.capacity {
                self.entries.shift_remove_index(0);
            }
            self.entries.insert(key, Arc::clone(&view));
        }

        Ok(view)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
