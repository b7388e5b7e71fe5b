//! Engine counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Live engine counters
#[derive(Debug, Default)]
pub struct EngineStats {
    served: AtomicU64,
    unmatched: AtomicU64,
    malformed: AtomicU64,
    transitions: AtomicU64,
    minted: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests answered by a stub
    pub served: u64,
    /// Requests no stub matched
    pub unmatched: u64,
    /// Mappings skipped because their predicate could not be evaluated
    pub malformed: u64,
    /// Scenario state transitions applied
    pub transitions: u64,
    /// Sessions minted for requests that presented no id
    pub minted: u64,
}

impl EngineStats {
    pub(crate) fn record_served(&self) {
        self.served.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unmatched(&self) {
        self.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transition(&self) {
        self.transitions.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the count including this one
    pub(crate) fn record_minted(&self) -> u64 {
        self.minted.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Copy current values
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            served: self.served.load(Ordering::Relaxed),
            unmatched: self.unmatched.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            minted: self.minted.load(Ordering::Relaxed),
        }
    }
}
