//! Short-TTL memoization of the feed fetch.
//!
//! The interactive variant of the map refreshes on a timer, and hammering
//! the open-data endpoint on every refresh is pointless — the dataset
//! updates on a minutes scale. `FeedCache` memoizes one fetch result for a
//! fixed window and exposes `invalidate` for the manual-refresh action,
//! which must bypass the window entirely.
//!
//! # Clock injection
//! `get_or_fetch_at` takes `now` as a parameter rather than reading the
//! system clock, so TTL behavior is deterministic in tests without mocking
//! or sleeping. `get_or_fetch` is the real-clock convenience wrapper.

use chrono::{DateTime, Utc};

use crate::model::{FeedError, UnitRecord};

struct CachedFeed {
    fetched_at: DateTime<Utc>,
    records: Vec<UnitRecord>,
}

/// One-slot TTL cache over the record fetch.
pub struct FeedCache {
    ttl_secs: i64,
    slot: Option<CachedFeed>,
}

impl FeedCache {
    /// TTL used by the map refresh loop.
    pub const DEFAULT_TTL_SECS: u64 = 60;

    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs: ttl_secs as i64,
            slot: None,
        }
    }

    /// Returns cached records while the slot is within TTL, otherwise runs
    /// `fetch` and fills the slot. The boolean is `true` when the memoized
    /// slot was served.
    ///
    /// Freshness is age <= TTL: a slot exactly at the window edge is still
    /// served; one second past it refetches. A failed refetch does not
    /// resurrect an expired slot — the error propagates and the stale slot
    /// is kept only for its timestamp.
    pub fn get_or_fetch_at<F>(
        &mut self,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<(Vec<UnitRecord>, bool), FeedError>
    where
        F: FnOnce() -> Result<Vec<UnitRecord>, FeedError>,
    {
        if let Some(slot) = &self.slot {
            let age_secs = (now - slot.fetched_at).num_seconds();
            if (0..=self.ttl_secs).contains(&age_secs) {
                return Ok((slot.records.clone(), true));
            }
        }

        let records = fetch()?;
        self.slot = Some(CachedFeed {
            fetched_at: now,
            records: records.clone(),
        });
        Ok((records, false))
    }

    /// Real-clock wrapper around `get_or_fetch_at`. Use the `_at` form in
    /// tests to keep them deterministic.
    pub fn get_or_fetch<F>(&mut self, fetch: F) -> Result<(Vec<UnitRecord>, bool), FeedError>
    where
        F: FnOnce() -> Result<Vec<UnitRecord>, FeedError>,
    {
        self.get_or_fetch_at(Utc::now(), fetch)
    }

    /// Drops the memoized slot so the next call fetches unconditionally.
    /// Backs the manual-refresh action.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
