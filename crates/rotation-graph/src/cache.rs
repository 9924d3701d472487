use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rrg_core::{BatchResult, Interval, Result, RrgConfig, SmoothingMethod};
use std::sync::Arc;

/// Default time-to-live for cached batches (one hour)
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Everything that changes the computed values of a batch.
///
/// `tail_length` is deliberately absent: it only selects points for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub interval: Interval,
    pub rs_period: usize,
    pub mom_period: usize,
    pub smoothing: SmoothingMethod,
    pub min_overlap_margin: usize,
    pub min_output_points: usize,
}

impl CacheKey {
    pub fn new(interval: Interval, config: &RrgConfig) -> Self {
        Self {
            interval,
            rs_period: config.rs_period,
            mom_period: config.mom_period,
            smoothing: config.smoothing,
            min_overlap_margin: config.min_overlap_margin,
            min_output_points: config.min_output_points,
        }
    }
}

struct CacheEntry {
    data: Arc<BatchResult>,
    cached_at: DateTime<Utc>,
}

/// Computed batches keyed by interval and parameters, each valid for a fixed TTL
pub struct RrgCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl Default for RrgCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RrgCache {
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<BatchResult>> {
        self.get_at(key, Utc::now())
    }

    /// Fresh entry for `key` as of `now`
    pub fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<Arc<BatchResult>> {
        let entry = self.entries.get(key)?;
        if now - entry.cached_at < self.ttl {
            Some(Arc::clone(&entry.data))
        } else {
            None
        }
    }

    pub fn insert(&self, key: CacheKey, result: BatchResult) -> Arc<BatchResult> {
        self.insert_at(key, result, Utc::now())
    }

    pub fn insert_at(&self, key: CacheKey, result: BatchResult, now: DateTime<Utc>) -> Arc<BatchResult> {
        let data = Arc::new(result);
        self.entries.insert(
            key,
            CacheEntry {
                data: Arc::clone(&data),
                cached_at: now,
            },
        );
        data
    }

    /// Cached batch for `key`, computing and storing it when missing or expired.
    ///
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<Arc<BatchResult>>
    where
        F: FnOnce() -> Result<BatchResult>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(?key, "RRG cache hit");
            return Ok(hit);
        }

        let result = compute()?;
        Ok(self.insert(key, result))
    }

    /// Drop expired entries, returning how many were removed
    pub fn invalidate_expired(&self) -> usize {
        self.invalidate_expired_at(Utc::now())
    }

    pub fn invalidate_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now - entry.cached_at < self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
