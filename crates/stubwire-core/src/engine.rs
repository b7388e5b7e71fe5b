//! Matching and transition engine
//!
//! One call to [`Engine::serve`] resolves the request's session, picks at
//! most one stub mapping and applies its scenario transition.
//!
//! # Algorithm
//! 1. Take a registry snapshot and evaluate every predicate, lock-free.
//!    A predicate that errors is skipped, logged and counted.
//! 2. Lock the session's cells for every scenario the surviving candidates
//!    reference, in name order.
//! 3. Drop candidates whose required state differs from the current state.
//! 4. Select one candidate by [`SelectionPolicy`].
//! 5. Apply its new state while the cells are still locked.
//!
//! Steps 3 to 5 run under the same locks, so the read and the write for a
//! `(session, scenario)` pair form one atomic unit. Requests whose candidates
//! have no scenario lock nothing.
//!
//! A session minted by [`Engine::serve`] is tagged in the store until a
//! request presents it again. Every [`MINTED_SWEEP_EVERY`] mints the engine
//! runs [`Engine::evict_expired`] itself, so anonymous traffic is reclaimed
//! even with no background sweeper.

use crate::config::{EngineConfig, InsertionOrder, SelectionPolicy};
use crate::stats::{EngineStats, StatsSnapshot};
use std::sync::Arc;
use stubwire_scenario::{ScenarioLocks, ScenarioStateStore};
use stubwire_session::{ResolvedSession, SessionId, SessionResolver};
use stubwire_stubs::{Request, ResponseTemplate, StubId, StubMapping, StubRegistry};

/// Outcome of matching one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// A stub was selected; its response, unmodified
    Matched(ResponseTemplate),
    /// No eligible stub
    NoMatch,
}

impl MatchResult {
    /// Whether a stub was selected
    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Selected response, if any
    #[inline]
    #[must_use]
    pub fn response(&self) -> Option<&ResponseTemplate> {
        match self {
            Self::Matched(response) => Some(response),
            Self::NoMatch => None,
        }
    }
}

/// Everything the front-end needs to answer a request
#[derive(Debug, Clone)]
pub struct ServeEvent {
    /// Session the request was matched under
    pub session: ResolvedSession,
    /// Selected mapping, if any
    pub stub: Option<StubId>,
    /// Match outcome
    pub result: MatchResult,
}

/// Minted sessions between two inline expiry sweeps
pub const MINTED_SWEEP_EVERY: u64 = 1024;

/// An eligible mapping with its insertion rank
struct Candidate<'a> {
    rank: usize,
    mapping: &'a StubMapping,
}

/// Stub matching engine
///
/// Owns nothing global: the registry and state store are injected, so any
/// number of engines (one per test, say) can run side by side.
#[derive(Debug)]
pub struct Engine {
    registry: Arc<StubRegistry>,
    store: Arc<ScenarioStateStore>,
    resolver: SessionResolver,
    config: EngineConfig,
    stats: EngineStats,
}

impl Engine {
    /// Create engine over shared registry and state store
    #[must_use]
    pub fn new(
        registry: Arc<StubRegistry>,
        store: Arc<ScenarioStateStore>,
        config: EngineConfig,
    ) -> Self {
        let resolver = config.sessions.resolver();
        tracing::info!(
            "Engine created (session_aware={}, insertion_order={:?})",
            resolver.is_session_aware(),
            config.selection.insertion_order
        );
        Self {
            registry,
            store,
            resolver,
            config,
            stats: EngineStats::default(),
        }
    }

    /// Engine with a fresh registry and store
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::new(
            Arc::new(StubRegistry::new()),
            Arc::new(ScenarioStateStore::new()),
            config,
        )
    }

    /// Stub registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<StubRegistry> {
        &self.registry
    }

    /// Scenario state store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<ScenarioStateStore> {
        &self.store
    }

    /// Session resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Counter values
    #[inline]
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolve the session a request belongs to
    #[must_use]
    pub fn resolve_session(&self, request: &Request) -> ResolvedSession {
        self.resolver.resolve(request.headers(), request.cookies())
    }

    /// Match a request and report the session used
    pub fn serve(&self, request: &Request) -> ServeEvent {
        let session = self.resolve_session(request);
        let (stub, result) = self.match_in(session.id(), request);
        if session.is_ephemeral() {
            self.store.mark_minted(session.id());
            if self.stats.record_minted() % MINTED_SWEEP_EVERY == 0 {
                self.evict_expired();
            }
        } else {
            self.store.adopt(session.id());
        }
        ServeEvent {
            session,
            stub,
            result,
        }
    }

    /// Match a request
    pub fn handle(&self, request: &Request) -> MatchResult {
        self.serve(request).result
    }

    /// Match a request under an already resolved session
    pub fn handle_in(&self, session: &SessionId, request: &Request) -> MatchResult {
        self.match_in(session, request).1
    }

    fn match_in(&self, session: &SessionId, request: &Request) -> (Option<StubId>, MatchResult) {
        let snapshot = self.registry.snapshot();
        let candidates: Vec<Candidate<'_>> = snapshot
            .iter()
            .enumerate()
            .filter(|(_, mapping)| self.predicate_matches(mapping, request))
            .map(|(rank, mapping)| Candidate {
                rank,
                mapping: mapping.as_ref(),
            })
            .collect();
        tracing::debug!(
            "{} of {} mappings match {} {}",
            candidates.len(),
            snapshot.len(),
            request.method(),
            request.url()
        );

        if candidates.is_empty() {
            return self.no_match(request);
        }

        let cells = self.store.cells(
            session,
            candidates.iter().filter_map(|c| c.mapping.scenario_name()),
        );
        let mut locks = cells.lock();

        let selection = self.config.selection;
        let Some(chosen) = candidates
            .iter()
            .filter(|c| gate_open(c.mapping, &locks))
            .min_by_key(|c| selection_key(selection, snapshot.len(), c))
        else {
            drop(locks);
            return self.no_match(request);
        };

        if let Some(rule) = chosen.mapping.scenario() {
            if let Some(next) = rule.new_state() {
                if let Some(previous) = locks.set(rule.name(), next) {
                    self.stats.record_transition();
                    tracing::debug!(
                        "Scenario {} in session {}: {} -> {}",
                        rule.name(),
                        session,
                        previous,
                        next
                    );
                }
            }
        }
        drop(locks);

        self.stats.record_served();
        (
            Some(chosen.mapping.id()),
            MatchResult::Matched(chosen.mapping.response().clone()),
        )
    }

    fn predicate_matches(&self, mapping: &StubMapping, request: &Request) -> bool {
        match mapping.predicate().matches(request) {
            Ok(matched) => matched,
            Err(e) => {
                self.stats.record_malformed();
                tracing::warn!("Skipping stub mapping {}: {}", mapping.id(), e);
                false
            }
        }
    }

    fn no_match(&self, request: &Request) -> (Option<StubId>, MatchResult) {
        self.stats.record_unmatched();
        tracing::debug!("No stub matched {} {}", request.method(), request.url());
        (None, MatchResult::NoMatch)
    }
}

/// Whether the mapping's scenario gate is satisfied under the held locks
fn gate_open(mapping: &StubMapping, locks: &ScenarioLocks<'_>) -> bool {
    match mapping.scenario() {
        None => true,
        Some(rule) => match rule.required_state() {
            None => true,
            Some(required) => locks.state(rule.name()) == Some(required),
        },
    }
}

/// Smallest key wins
fn selection_key(
    policy: SelectionPolicy,
    total: usize,
    candidate: &Candidate<'_>,
) -> (bool, u32, usize) {
    let ungated = !(policy.scenario_state_first && candidate.mapping.is_state_gated());
    let order = match policy.insertion_order {
        InsertionOrder::NewestFirst => total - candidate.rank,
        InsertionOrder::OldestFirst => candidate.rank,
    };
    (ungated, candidate.mapping.priority(), order)
}
