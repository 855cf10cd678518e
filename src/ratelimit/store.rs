//! Rate-limit storage: per-key lists of admission timestamps.
//!
//! The store owns every `RateLimitEntry`. Callers never mutate entries
//! directly; they go through `record_attempt` or, for an admission
//! decision, the atomic `check_and_record`. That single operation is what
//! closes the read-then-write race: two concurrent requests for the same
//! brand-new or boundary-count key cannot both observe "under limit" and
//! both append.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// Default pruning horizon. Custom horizons are clamped to at least
/// this, and pruning never reaches inside the window a call counts over.
const DEFAULT_COMPACTION_HORIZON_MS: i64 = 48 * 60 * 60 * 1000;

/// One key's recorded admission events, newest last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Normalized IP, wallet address, or external account id.
    pub key: String,
    /// Unix-millisecond instants, insertion order chronological.
    pub timestamps: Vec<i64>,
}

/// Errors from the rate-limit store. An unreachable store is an
/// infrastructure fault, never a silent allow.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of an atomic sliding-window admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Under limit; the attempt was recorded.
    Admitted,
    /// At or over limit; nothing was recorded.
    OverLimit,
}

/// Persistence abstraction for rate-limit entries.
///
/// Implementations must make `check_and_record` atomic per key: the
/// count-then-append sequence may not interleave with another call for the
/// same key.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch the entry for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, StoreError>;

    /// Unconditionally append `now_ms` to `key`, creating the entry if
    /// absent. Returns the updated entry.
    async fn record_attempt(&self, key: &str, now_ms: i64)
        -> Result<RateLimitEntry, StoreError>;

    /// Sliding-window admission: count timestamps strictly greater than
    /// `threshold_ms`; if the count is already at or above `allowed`,
    /// return `OverLimit` without mutating, otherwise append `now_ms` and
    /// return `Admitted`.
    async fn check_and_record(
        &self,
        key: &str,
        now_ms: i64,
        threshold_ms: i64,
        allowed: u32,
    ) -> Result<RateLimitDecision, StoreError>;
}

/// In-memory store backed by a sharded concurrent map.
///
/// The map's entry guard holds a shard lock for the duration of the
/// count-then-append sequence, giving the per-key mutual exclusion the
/// trait requires.
#[derive(Debug)]
pub struct MemoryRateLimitStore {
    entries: DashMap<String, Vec<i64>>,
    horizon_ms: i64,
}

impl Default for MemoryRateLimitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::with_horizon_ms(DEFAULT_COMPACTION_HORIZON_MS)
    }

    /// Store whose pruning horizon covers at least `horizon_ms`. Use the
    /// widest configured policy window so compaction can never drop a
    /// timestamp another policy still counts.
    pub fn with_horizon_ms(horizon_ms: i64) -> Self {
        Self {
            entries: DashMap::new(),
            horizon_ms: horizon_ms.max(DEFAULT_COMPACTION_HORIZON_MS),
        }
    }

    /// Number of tracked keys. Test and diagnostics helper.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        Ok(self.entries.get(key).map(|e| RateLimitEntry {
            key: key.to_string(),
            timestamps: e.value().clone(),
        }))
    }

    async fn record_attempt(
        &self,
        key: &str,
        now_ms: i64,
    ) -> Result<RateLimitEntry, StoreError> {
        let mut entry = self.entries.entry(key.to_string()).or_default();
        entry.push(now_ms);
        Ok(RateLimitEntry {
            key: key.to_string(),
            timestamps: entry.clone(),
        })
    }

    async fn check_and_record(
        &self,
        key: &str,
        now_ms: i64,
        threshold_ms: i64,
        allowed: u32,
    ) -> Result<RateLimitDecision, StoreError> {
        let mut entry = self.entries.entry(key.to_string()).or_default();

        // Compaction under the same guard, clamped so it never reaches
        // inside the window this call is counting over.
        let horizon = (now_ms - self.horizon_ms).min(threshold_ms);
        entry.retain(|&ts| ts > horizon);

        let recent = entry.iter().filter(|&&ts| ts > threshold_ms).count();
        if recent >= allowed as usize {
            return Ok(RateLimitDecision::OverLimit);
        }

        entry.push(now_ms);
        Ok(RateLimitDecision::Admitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MINUTE_MS: i64 = 60 * 1000;
    const HOUR_MS: i64 = 60 * MINUTE_MS;

    fn now_ms() -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as i64
    }

    #[tokio::test]
    async fn test_unseen_key_is_under_limit() {
        let store = MemoryRateLimitStore::new();
        assert_eq!(store.get("fresh").await.unwrap(), None);

        let now = now_ms();
        let decision = store
            .check_and_record("fresh", now, now - HOUR_MS, 2)
            .await
            .unwrap();
        assert_eq!(decision, RateLimitDecision::Admitted);
    }

    #[tokio::test]
    async fn test_scenario_two_per_hour() {
        // Policy {coveredHours: 1, allowedRequests: 2}; key K holds
        // [now - 10min]. Second attempt is admitted and recorded, third
        // within the hour is rejected.
        let store = MemoryRateLimitStore::new();
        let now = now_ms();
        store.record_attempt("K", now - 10 * MINUTE_MS).await.unwrap();

        let threshold = now - HOUR_MS;
        assert_eq!(
            store.check_and_record("K", now, threshold, 2).await.unwrap(),
            RateLimitDecision::Admitted
        );

        let entry = store.get("K").await.unwrap().unwrap();
        assert_eq!(entry.timestamps, vec![now - 10 * MINUTE_MS, now]);

        assert_eq!(
            store.check_and_record("K", now + 1, threshold, 2).await.unwrap(),
            RateLimitDecision::OverLimit
        );
    }

    #[tokio::test]
    async fn test_expired_window_admits_again() {
        let store = MemoryRateLimitStore::new();
        let now = now_ms();
        store.record_attempt("K", now - 2 * HOUR_MS).await.unwrap();
        store.record_attempt("K", now - 2 * HOUR_MS + 1).await.unwrap();

        let decision = store
            .check_and_record("K", now, now - HOUR_MS, 2)
            .await
            .unwrap();
        assert_eq!(decision, RateLimitDecision::Admitted);
    }

    #[tokio::test]
    async fn test_timestamp_at_threshold_does_not_count() {
        // The window is strictly greater than the threshold.
        let store = MemoryRateLimitStore::new();
        let now = now_ms();
        let threshold = now - HOUR_MS;
        store.record_attempt("K", threshold).await.unwrap();
        store.record_attempt("K", threshold + 1).await.unwrap();

        // Only one timestamp is inside the window, so one slot remains.
        assert_eq!(
            store.check_and_record("K", now, threshold, 2).await.unwrap(),
            RateLimitDecision::Admitted
        );
        assert_eq!(
            store.check_and_record("K", now, threshold, 2).await.unwrap(),
            RateLimitDecision::OverLimit
        );
    }

    #[tokio::test]
    async fn test_compaction_drops_ancient_timestamps() {
        let store = MemoryRateLimitStore::new();
        let now = now_ms();
        store.record_attempt("K", now - 3 * 24 * HOUR_MS).await.unwrap();

        store
            .check_and_record("K", now, now - HOUR_MS, 2)
            .await
            .unwrap();

        let entry = store.get("K").await.unwrap().unwrap();
        assert_eq!(entry.timestamps, vec![now]);
    }

    #[tokio::test]
    async fn test_wide_window_counts_survive_compaction() {
        // A policy window wider than the default horizon must still see
        // its in-window timestamps.
        let store = MemoryRateLimitStore::new();
        let now = now_ms();
        store.record_attempt("K", now - 50 * HOUR_MS).await.unwrap();
        store.record_attempt("K", now - 49 * HOUR_MS).await.unwrap();

        assert_eq!(
            store
                .check_and_record("K", now, now - 60 * HOUR_MS, 2)
                .await
                .unwrap(),
            RateLimitDecision::OverLimit
        );
    }

    #[tokio::test]
    async fn test_horizon_covers_other_policies_on_same_key() {
        // A narrow-window check must not erase timestamps a later
        // wide-window check on the same key counts.
        let store = MemoryRateLimitStore::with_horizon_ms(60 * HOUR_MS);
        let now = now_ms();
        store.record_attempt("K", now - 50 * HOUR_MS).await.unwrap();
        store.record_attempt("K", now - 49 * HOUR_MS).await.unwrap();

        assert_eq!(
            store.check_and_record("K", now, now - HOUR_MS, 5).await.unwrap(),
            RateLimitDecision::Admitted
        );
        assert_eq!(
            store
                .check_and_record("K", now, now - 60 * HOUR_MS, 3)
                .await
                .unwrap(),
            RateLimitDecision::OverLimit
        );
    }

    #[tokio::test]
    async fn test_concurrent_brand_new_key_admits_exactly_allowed() {
        // allowed + N simultaneous attempts on a fresh key must admit
        // exactly `allowed`, never more.
        let store = Arc::new(MemoryRateLimitStore::new());
        let allowed = 2u32;
        let extra = 30;
        let now = now_ms();
        let threshold = now - HOUR_MS;

        let mut handles = Vec::new();
        for _ in 0..(allowed + extra) {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .check_and_record("brand-new", now, threshold, allowed)
                    .await
                    .unwrap()
            }));
        }

        let mut admitted = 0u32;
        for handle in handles {
            if handle.await.unwrap() == RateLimitDecision::Admitted {
                admitted += 1;
            }
        }
        assert_eq!(admitted, allowed);
    }
}
