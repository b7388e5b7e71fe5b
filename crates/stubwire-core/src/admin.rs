//! Admin operations on an [`Engine`]
//!
//! Registration, removal and reset of stubs, plus per-session scenario
//! inspection and control.

use crate::engine::Engine;
use crate::error::{StubError, StubResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stubwire_scenario::STARTED;
use stubwire_session::SessionId;
use stubwire_stubs::{MappingDefinition, StubId, StubMapping, StubSnapshot};

/// One scenario as seen by one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    /// Scenario name
    pub name: String,
    /// Current state for the session
    pub state: String,
    /// Every state a registered mapping mentions, sorted
    pub possible_states: Vec<String>,
}

impl Engine {
    /// Register a mapping
    pub fn register_stub(&self, mapping: StubMapping) -> StubId {
        self.registry().add(mapping)
    }

    /// Validate and register a mapping definition
    ///
    /// # Errors
    /// Returns [`StubError::InvalidMapping`] if the definition is rejected
    pub fn register_definition(&self, definition: MappingDefinition) -> StubResult<StubId> {
        let mapping = StubMapping::try_from(definition)?;
        Ok(self.register_stub(mapping))
    }

    /// Replace the mapping under `id`, keeping its position
    ///
    /// # Errors
    /// Returns [`StubError::InvalidMapping`] if `id` is unknown
    pub fn replace_stub(&self, id: StubId, mapping: StubMapping) -> StubResult<()> {
        Ok(self.registry().replace(id, mapping)?)
    }

    /// Remove a mapping
    ///
    /// # Errors
    /// Returns [`StubError::InvalidMapping`] if `id` is unknown
    pub fn remove_stub(&self, id: StubId) -> StubResult<Arc<StubMapping>> {
        self.registry()
            .remove(id)
            .ok_or_else(|| StubError::stub_not_found(id))
    }

    /// Current mappings, in insertion order
    #[must_use]
    pub fn stubs(&self) -> StubSnapshot {
        self.registry().snapshot()
    }

    /// Remove every mapping
    pub fn clear_stubs(&self) {
        self.registry().clear();
    }

    /// Put every scenario of every session back to the start state
    pub fn reset_scenarios(&self) {
        self.store().reset_all();
    }

    /// Remove every mapping and all scenario state
    pub fn reset(&self) {
        self.clear_stubs();
        self.reset_scenarios();
        tracing::info!("Engine reset");
    }

    /// Drop all scenario state of one session
    pub fn reset_session(&self, session: &SessionId) {
        self.store().reset_session(session);
    }

    /// Force a scenario into a state for one session
    ///
    /// # Errors
    /// Returns [`StubError::UnknownScenario`] if no mapping references `name`
    pub fn set_scenario_state(
        &self,
        session: &SessionId,
        name: &str,
        state: impl Into<String>,
    ) -> StubResult<()> {
        self.ensure_scenario(name)?;
        let state = state.into();
        tracing::info!("Scenario {} in session {} set to {}", name, session, state);
        self.store().set_state(session, name, state);
        Ok(())
    }

    /// Put one scenario back to the start state for one session
    ///
    /// # Errors
    /// Returns [`StubError::UnknownScenario`] if no mapping references `name`
    pub fn reset_scenario(&self, session: &SessionId, name: &str) -> StubResult<()> {
        self.ensure_scenario(name)?;
        tracing::info!("Scenario {} in session {} reset", name, session);
        self.store().reset_scenario(session, name);
        Ok(())
    }

    /// Every registered scenario with its state for `session`
    ///
    /// Scenarios the session has not touched report the start state and
    /// are not created.
    #[must_use]
    pub fn scenarios(&self, session: &SessionId) -> Vec<ScenarioSummary> {
        self.stubs()
            .scenarios()
            .into_iter()
            .map(|(name, possible)| ScenarioSummary {
                state: self
                    .store()
                    .peek(session, &name)
                    .unwrap_or_else(|| STARTED.to_string()),
                name,
                possible_states: possible.into_iter().collect(),
            })
            .collect()
    }

    /// Sessions other than the global one that hold scenario state
    #[must_use]
    pub fn active_sessions(&self) -> Vec<SessionId> {
        self.store().active_sessions()
    }

    /// Drop sessions idle longer than `max_idle`
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        self.store().evict_idle(max_idle)
    }

    /// Drop expired sessions
    ///
    /// Unadopted minted sessions go after the minted TTL; every other
    /// session goes after the idle TTL, if one is set.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    /// [`Self::evict_expired`] against an explicit clock reading
    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let sessions = &self.config().sessions;
        let minted = self.store().evict_minted_at(now, sessions.minted_ttl());
        let idle = sessions
            .idle_ttl()
            .map_or(0, |ttl| self.store().evict_idle_at(now, ttl));
        minted + idle
    }

    fn ensure_scenario(&self, name: &str) -> StubResult<()> {
        let known = self
            .stubs()
            .iter()
            .any(|m| m.scenario_name() == Some(name));
        if known {
            Ok(())
        } else {
            Err(StubError::UnknownScenario(name.to_string()))
        }
    }
}
