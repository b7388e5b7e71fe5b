//! Engine configuration
//!
//! All fields have serde defaults, so a partial TOML/JSON document (or none
//! at all) yields a working configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use stubwire_session::{SessionResolver, DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME};

/// Which of two equal-priority candidates wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionOrder {
    /// Most recently registered wins
    #[default]
    NewestFirst,
    /// First registered wins
    OldestFirst,
}

/// Candidate ordering
///
/// Candidates are ranked by, in turn: satisfied explicit required state
/// (when `scenario_state_first`), priority (lower number first), then
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// State-gated candidates outrank ungated ones regardless of priority
    pub scenario_state_first: bool,
    /// Tie-break among equal priority
    pub insertion_order: InsertionOrder,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            scenario_state_first: true,
            insertion_order: InsertionOrder::NewestFirst,
        }
    }
}

impl SelectionPolicy {
    /// With insertion order tie-break
    #[inline]
    #[must_use]
    pub fn with_insertion_order(mut self, order: InsertionOrder) -> Self {
        self.insertion_order = order;
        self
    }

    /// With state-gated preference on or off
    #[inline]
    #[must_use]
    pub fn with_scenario_state_first(mut self, enabled: bool) -> Self {
        self.scenario_state_first = enabled;
        self
    }
}

/// Session handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Scope scenario state per session; when off every request shares
    /// the global session
    pub session_aware: bool,
    /// Header carrying the session id
    pub header_name: String,
    /// Cookie carrying the session id
    pub cookie_name: String,
    /// Drop sessions idle for this long (`None` keeps them forever)
    pub idle_ttl_secs: Option<u64>,
    /// Drop sessions minted for anonymous requests once idle this long,
    /// unless a client has presented them again
    pub minted_ttl_secs: u64,
}

/// Default lifetime of an unadopted minted session
pub const DEFAULT_MINTED_TTL_SECS: u64 = 300;

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_aware: true,
            header_name: DEFAULT_HEADER_NAME.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            idle_ttl_secs: None,
            minted_ttl_secs: DEFAULT_MINTED_TTL_SECS,
        }
    }
}

impl SessionSettings {
    /// Resolver for these settings
    #[must_use]
    pub fn resolver(&self) -> SessionResolver {
        SessionResolver::new(&self.header_name, &self.cookie_name)
            .with_session_aware(self.session_aware)
    }

    /// Idle TTL as a duration
    #[inline]
    #[must_use]
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }

    /// Minted session TTL as a duration
    #[inline]
    #[must_use]
    pub fn minted_ttl(&self) -> Duration {
        Duration::from_secs(self.minted_ttl_secs)
    }
}

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session handling
    pub sessions: SessionSettings,
    /// Candidate ordering
    pub selection: SelectionPolicy,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With session awareness on or off
    #[inline]
    #[must_use]
    pub fn with_session_aware(mut self, enabled: bool) -> Self {
        self.sessions.session_aware = enabled;
        self
    }

    /// With session header and cookie names
    #[must_use]
    pub fn with_signal_names(
        mut self,
        header_name: impl Into<String>,
        cookie_name: impl Into<String>,
    ) -> Self {
        self.sessions.header_name = header_name.into();
        self.sessions.cookie_name = cookie_name.into();
        self
    }

    /// With idle session TTL
    #[inline]
    #[must_use]
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.sessions.idle_ttl_secs = Some(ttl.as_secs());
        self
    }

    /// With minted session TTL
    #[inline]
    #[must_use]
    pub fn with_minted_ttl(mut self, ttl: Duration) -> Self {
        self.sessions.minted_ttl_secs = ttl.as_secs();
        self
    }

    /// With selection policy
    #[inline]
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }
}
