//! Scenario cells and the locks held over them
//!
//! Locks are always taken in ascending scenario-name order, so two
//! requests in the same session can never deadlock on each other.

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Shared state cell for one `(session, scenario)` pair
#[derive(Debug, Clone)]
pub struct ScenarioCell {
    scenario: String,
    state: Arc<Mutex<String>>,
}

impl ScenarioCell {
    pub(crate) fn new(scenario: String, state: Arc<Mutex<String>>) -> Self {
        Self { scenario, state }
    }

    /// Scenario name
    #[inline]
    #[must_use]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Read the current state (locks briefly)
    #[must_use]
    pub fn current(&self) -> String {
        self.state.lock().clone()
    }
}

/// Cells for one session, sorted by scenario name, no duplicates
#[derive(Debug, Clone, Default)]
pub struct ScenarioCells {
    cells: Vec<ScenarioCell>,
}

impl ScenarioCells {
    pub(crate) fn from_sorted(cells: Vec<ScenarioCell>) -> Self {
        debug_assert!(cells.windows(2).all(|w| w[0].scenario < w[1].scenario));
        Self { cells }
    }

    /// Number of cells
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no scenario is involved
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over cells in lock order
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioCell> {
        self.cells.iter()
    }

    /// Lock every cell, in name order
    ///
    /// The returned guard excludes every other reader and writer of these
    /// pairs until dropped.
    #[must_use]
    pub fn lock(&self) -> ScenarioLocks<'_> {
        ScenarioLocks {
            guards: self
                .cells
                .iter()
                .map(|cell| (cell.scenario.as_str(), cell.state.lock()))
                .collect(),
        }
    }
}

/// Exclusive hold over a request's scenario cells
#[derive(Debug)]
pub struct ScenarioLocks<'a> {
    guards: Vec<(&'a str, MutexGuard<'a, String>)>,
}

impl ScenarioLocks<'_> {
    /// Current state of a held scenario
    #[must_use]
    pub fn state(&self, scenario: &str) -> Option<&str> {
        self.position(scenario).map(|i| self.guards[i].1.as_str())
    }

    /// Overwrite the state of a held scenario
    ///
    /// Returns the previous state, or `None` if the scenario is not held.
    pub fn set(&mut self, scenario: &str, new_state: impl Into<String>) -> Option<String> {
        let i = self.position(scenario)?;
        Some(std::mem::replace(&mut *self.guards[i].1, new_state.into()))
    }

    /// Scenario names held, in lock order
    pub fn scenarios(&self) -> impl Iterator<Item = &str> {
        self.guards.iter().map(|(name, _)| *name)
    }

    fn position(&self, scenario: &str) -> Option<usize> {
        self.guards
            .binary_search_by(|(name, _)| (*name).cmp(scenario))
            .ok()
    }
}
