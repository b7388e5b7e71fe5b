//! Scenario state store
//!
//! Provides [`ScenarioStateStore`]: a concurrent map from session to that
//! session's scenario cells, its last activity and whether it was minted.
//! One map entry holds all three, so touching a session and evicting it
//! are serialised by the same shard lock.
//!
//! Sessions minted for a request that presented no id are tagged until a
//! later request presents them (the client adopted the cookie). Tagged
//! sessions expire on their own schedule through
//! [`ScenarioStateStore::evict_minted_at`].
//!
//! Map references are never held while a cell is locked; cells are cloned
//! out of the map first, then locked.

use crate::cells::{ScenarioCell, ScenarioCells};
use crate::STARTED;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use stubwire_session::SessionId;

/// Everything the store holds for one session
#[derive(Debug)]
struct SessionEntry {
    scenarios: BTreeMap<String, Arc<Mutex<String>>>,
    last_seen: Instant,
    minted: bool,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            scenarios: BTreeMap::new(),
            last_seen: Instant::now(),
            minted: false,
        }
    }

    fn cell(&mut self, scenario: &str) -> ScenarioCell {
        let state = self
            .scenarios
            .entry(scenario.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(STARTED.to_string())));
        ScenarioCell::new(scenario.to_string(), Arc::clone(state))
    }

    fn idle_past(&self, now: Instant, max_idle: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > max_idle
    }
}

/// Concurrent `(session, scenario) -> state` store
#[derive(Debug, Default)]
pub struct ScenarioStateStore {
    sessions: DashMap<SessionId, SessionEntry>,
}

impl ScenarioStateStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state, creating the pair at [`STARTED`] if unseen
    #[must_use]
    pub fn get_state(&self, session: &SessionId, scenario: &str) -> String {
        self.cells(session, [scenario])
            .iter()
            .next()
            .map_or_else(|| STARTED.to_string(), ScenarioCell::current)
    }

    /// Overwrite the state, creating the pair if unseen
    pub fn set_state(&self, session: &SessionId, scenario: &str, new_state: impl Into<String>) {
        let cells = self.cells(session, [scenario]);
        cells.lock().set(scenario, new_state);
    }

    /// Current state without creating the pair
    #[must_use]
    pub fn peek(&self, session: &SessionId, scenario: &str) -> Option<String> {
        let state = self
            .sessions
            .get(session)
            .and_then(|entry| entry.scenarios.get(scenario).map(Arc::clone))?;
        let current = state.lock().clone();
        Some(current)
    }

    /// Put one pair back to [`STARTED`]
    pub fn reset_scenario(&self, session: &SessionId, scenario: &str) {
        self.set_state(session, scenario, STARTED);
    }

    /// Resolve the cells for every named scenario of one session
    ///
    /// Missing pairs are created at [`STARTED`] and the session's activity
    /// time is refreshed. The result is sorted and de-duplicated so that
    /// [`ScenarioCells::lock`] takes locks in a fixed order.
    #[must_use]
    pub fn cells<'a, I>(&self, session: &SessionId, scenarios: I) -> ScenarioCells
    where
        I: IntoIterator<Item = &'a str>,
    {
        let names: BTreeSet<&str> = scenarios.into_iter().collect();
        if names.is_empty() {
            return ScenarioCells::default();
        }
        let mut entry = self
            .sessions
            .entry(session.clone())
            .or_insert_with(SessionEntry::new);
        entry.last_seen = Instant::now();
        let cells = names.into_iter().map(|name| entry.cell(name)).collect();
        drop(entry);
        ScenarioCells::from_sorted(cells)
    }

    /// Every scenario state held by one session, sorted by name
    #[must_use]
    pub fn states_for(&self, session: &SessionId) -> Vec<(String, String)> {
        let cells: Vec<(String, Arc<Mutex<String>>)> = self
            .sessions
            .get(session)
            .map(|entry| {
                entry
                    .scenarios
                    .iter()
                    .map(|(name, state)| (name.clone(), Arc::clone(state)))
                    .collect()
            })
            .unwrap_or_default();

        cells
            .into_iter()
            .map(|(name, state)| {
                let current = state.lock().clone();
                (name, current)
            })
            .collect()
    }

    /// Clear every pair of every session
    pub fn reset_all(&self) {
        self.sessions.clear();
        tracing::info!("All scenario state cleared");
    }

    /// Clear every pair of one session
    pub fn reset_session(&self, session: &SessionId) {
        self.sessions.remove(session);
        tracing::debug!("Scenario state cleared for session {}", session);
    }

    /// Non-global sessions currently holding state, sorted
    #[must_use]
    pub fn active_sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<SessionId> = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|session| !session.is_global())
            .collect();
        sessions.sort();
        sessions
    }

    /// Number of `(session, scenario)` pairs held
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .iter()
            .map(|entry| entry.scenarios.len())
            .sum()
    }

    /// Check if store holds no state
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Clear sessions idle for longer than `max_idle`
    ///
    /// Returns the number of sessions evicted. The global session is kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        self.evict_idle_at(Instant::now(), max_idle)
    }

    /// [`Self::evict_idle`] against an explicit clock reading
    pub fn evict_idle_at(&self, now: Instant, max_idle: Duration) -> usize {
        let evicted = self.evict_where(|session, entry| {
            !session.is_global() && entry.idle_past(now, max_idle)
        });
        if evicted > 0 {
            tracing::info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Tag a session minted for an anonymous request
    ///
    /// Only sessions that hold state are tagged.
    pub fn mark_minted(&self, session: &SessionId) {
        if session.is_global() {
            return;
        }
        if let Some(mut entry) = self.sessions.get_mut(session) {
            entry.minted = true;
        }
    }

    /// Untag a session a client has presented again
    pub fn adopt(&self, session: &SessionId) {
        if let Some(mut entry) = self.sessions.get_mut(session) {
            if entry.minted {
                entry.minted = false;
                tracing::debug!("Minted session {} adopted", session);
            }
        }
    }

    /// Whether a session is minted and not yet adopted
    #[must_use]
    pub fn is_minted(&self, session: &SessionId) -> bool {
        self.sessions
            .get(session)
            .is_some_and(|entry| entry.minted)
    }

    /// Clear minted, never adopted sessions idle for longer than `max_idle`
    ///
    /// Returns the number of sessions evicted.
    pub fn evict_minted_at(&self, now: Instant, max_idle: Duration) -> usize {
        let evicted = self.evict_where(|_, entry| entry.minted && entry.idle_past(now, max_idle));
        if evicted > 0 {
            tracing::debug!("Evicted {} unadopted minted sessions", evicted);
        }
        evicted
    }

    fn evict_where(&self, mut expired: impl FnMut(&SessionId, &SessionEntry) -> bool) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|session, entry| {
            let keep = !expired(session, entry);
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(value: &str) -> SessionId {
        SessionId::new(value).unwrap()
    }

    #[test]
    fn unseen_pair_starts_at_started() {
        let store = ScenarioStateStore::new();
        assert_eq!(store.get_state(&sid("fresh"), "StateScenario"), STARTED);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_state_creates_and_overwrites() {
        let store = ScenarioStateStore::new();
        let a = sid("a");

        store.set_state(&a, "S", "State1");
        assert_eq!(store.get_state(&a, "S"), "State1");

        store.set_state(&a, "S", "State2");
        assert_eq!(store.get_state(&a, "S"), "State2");
    }

    #[test]
    fn peek_does_not_create() {
        let store = ScenarioStateStore::new();
        assert_eq!(store.peek(&sid("a"), "S"), None);
        assert!(store.is_empty());

        store.set_state(&sid("a"), "S", "X");
        assert_eq!(store.peek(&sid("a"), "S").as_deref(), Some("X"));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");

        assert_eq!(store.get_state(&sid("b"), "S"), STARTED);
        assert_eq!(store.get_state(&sid("a"), "S"), "State1");
    }

    #[test]
    fn reset_session_only_touches_that_session() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");
        store.set_state(&sid("b"), "S", "State1");

        store.reset_session(&sid("a"));

        assert_eq!(store.peek(&sid("a"), "S"), None);
        assert_eq!(store.get_state(&sid("b"), "S"), "State1");
        assert_eq!(store.active_sessions(), vec![sid("b")]);
    }

    #[test]
    fn reset_all_clears_everything() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");
        store.set_state(&SessionId::global(), "S", "State1");

        store.reset_all();

        assert!(store.is_empty());
        assert_eq!(store.get_state(&sid("a"), "S"), STARTED);
    }

    #[test]
    fn reset_scenario_returns_to_started() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");
        store.set_state(&sid("a"), "T", "Other");

        store.reset_scenario(&sid("a"), "S");

        assert_eq!(store.get_state(&sid("a"), "S"), STARTED);
        assert_eq!(store.get_state(&sid("a"), "T"), "Other");
    }

    #[test]
    fn cells_are_sorted_and_deduplicated() {
        let store = ScenarioStateStore::new();
        let cells = store.cells(&sid("a"), ["b", "a", "b"]);

        let names: Vec<_> = cells.iter().map(ScenarioCell::scenario).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn states_for_lists_one_session() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "Second", "Y");
        store.set_state(&sid("a"), "First", "X");
        store.set_state(&sid("b"), "First", "Z");

        assert_eq!(
            store.states_for(&sid("a")),
            vec![
                ("First".to_string(), "X".to_string()),
                ("Second".to_string(), "Y".to_string()),
            ]
        );
    }

    #[test]
    fn active_sessions_exclude_global() {
        let store = ScenarioStateStore::new();
        store.set_state(&SessionId::global(), "S", "X");
        store.set_state(&sid("b"), "S", "X");
        store.set_state(&sid("a"), "S", "X");

        assert_eq!(store.active_sessions(), vec![sid("a"), sid("b")]);
    }

    #[test]
    fn evict_idle_clears_stale_sessions() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");
        store.set_state(&SessionId::global(), "S", "State1");

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(store.evict_idle_at(later, Duration::from_secs(60)), 1);

        assert_eq!(store.peek(&sid("a"), "S"), None);
        assert_eq!(store.peek(&SessionId::global(), "S").as_deref(), Some("State1"));
    }

    #[test]
    fn evict_idle_keeps_recent_sessions() {
        let store = ScenarioStateStore::new();
        store.set_state(&sid("a"), "S", "State1");

        assert_eq!(store.evict_idle(Duration::from_secs(60)), 0);
        assert_eq!(store.get_state(&sid("a"), "S"), "State1");
    }

    #[test]
    fn minted_sessions_expire_until_adopted() {
        let store = ScenarioStateStore::new();
        let anonymous = sid("minted-a");
        let adopted = sid("minted-b");
        for session in [&anonymous, &adopted] {
            store.set_state(session, "S", "State1");
            store.mark_minted(session);
        }
        store.adopt(&adopted);

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(store.evict_minted_at(later, Duration::from_secs(60)), 1);

        assert_eq!(store.peek(&anonymous, "S"), None);
        assert!(!store.is_minted(&anonymous));
        assert_eq!(store.peek(&adopted, "S").as_deref(), Some("State1"));
        assert_eq!(store.active_sessions(), vec![adopted]);
    }

    #[test]
    fn stateless_sessions_are_never_tagged() {
        let store = ScenarioStateStore::new();
        store.mark_minted(&sid("nothing"));
        store.mark_minted(&SessionId::global());

        assert!(!store.is_minted(&sid("nothing")));
        assert!(!store.is_minted(&SessionId::global()));
    }

    #[test]
    fn evicted_session_restarts_when_touched_again() {
        let store = ScenarioStateStore::new();
        let a = sid("a");
        store.set_state(&a, "S", "State1");

        let later = Instant::now() + Duration::from_secs(120);
        assert_eq!(store.evict_idle_at(later, Duration::from_secs(60)), 1);
        assert!(store.active_sessions().is_empty());

        assert_eq!(store.get_state(&a, "S"), STARTED);
        assert_eq!(store.active_sessions(), vec![a]);
    }

    #[test]
    fn no_scenarios_creates_no_session() {
        let store = ScenarioStateStore::new();
        let cells = store.cells(&sid("a"), std::iter::empty());

        assert!(cells.is_empty());
        assert!(store.is_empty());
        assert!(store.active_sessions().is_empty());
    }
}
