//! Derived-result cache port and an in-memory store
//!
//! One record per person. A record is only ever replaced whole; when the
//! estate fingerprint changes the new calculation supersedes the old record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::fingerprint::EstateFingerprint;
use crate::calculator::IhtCalculation;

/// A stored calculation and the fingerprint it was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedCalculation {
    #[serde(flatten)]
    pub result: IhtCalculation,

    #[serde(flatten)]
    pub hashes: EstateFingerprint,

    pub calculation_date: NaiveDate,
    pub is_married: bool,
    pub data_sharing_enabled: bool,
}

impl CachedCalculation {
    pub fn matches(&self, fingerprint: &EstateFingerprint) -> bool {
        self.hashes.fingerprint == fingerprint.fingerprint
    }
}

/// Storage for derived results, keyed by person
pub trait CalculationCache: Send + Sync {
    fn get(&self, person_id: &str) -> Option<CachedCalculation>;

    /// Replace the whole record for `person_id`
    fn put(&self, person_id: &str, record: CachedCalculation);

    /// Told whether a lookup was served; a stale record counts as a miss
    fn record_lookup(&self, _hit: bool) {}
}

/// Process-local cache; last writer wins
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CachedCalculation>>,

    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl CalculationCache for InMemoryCache {
    fn get(&self, person_id: &str) -> Option<CachedCalculation> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(person_id)
            .cloned()
    }

    fn put(&self, person_id: &str, record: CachedCalculation) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(person_id.to_string(), record);
    }

    fn record_lookup(&self, hit: bool) {
        if hit {
            self.record_hit();
        } else {
            self.record_miss();
        }
    }
}
