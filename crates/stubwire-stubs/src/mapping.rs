//! Stub mappings
//!
//! Provides [`StubMapping`] and its validating [`StubMappingBuilder`].
//!
//! # Invariants
//! - A required or new scenario state implies a scenario name
//! - A mapping without a scenario name never reads or writes scenario state
//!
//! Violations are rejected by [`StubMappingBuilder::build`], so an invalid
//! mapping can never reach the registry.

use crate::predicate::RequestPredicate;
use crate::response::ResponseTemplate;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Priority given to mappings that do not set one (lower wins)
pub const DEFAULT_PRIORITY: u32 = 5;

/// Mapping validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    /// Scenario state given without a scenario name
    #[error("mapping declares {field} without scenarioName")]
    InconsistentScenarioReference {
        /// Which state field was set
        field: &'static str,
    },

    /// No request predicate supplied
    #[error("mapping has no request predicate")]
    MissingPredicate,

    /// Response status outside `100..=599`
    #[error("invalid response status: {0}")]
    InvalidStatus(u16),

    /// Empty scenario name or state
    #[error("empty scenario {0}")]
    EmptyScenarioField(&'static str),

    /// No mapping registered under this id
    #[error("stub mapping not found: {0}")]
    NotFound(StubId),
}

/// Unique stub mapping identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StubId(pub Uuid);

impl StubId {
    /// Generate new stub ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StubId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for StubId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StubId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Scenario binding of a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRule {
    name: String,
    required_state: Option<String>,
    new_state: Option<String>,
}

impl ScenarioRule {
    /// Scenario name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// State the scenario must be in for the mapping to apply
    #[inline]
    #[must_use]
    pub fn required_state(&self) -> Option<&str> {
        self.required_state.as_deref()
    }

    /// State the scenario moves to once the mapping is served
    #[inline]
    #[must_use]
    pub fn new_state(&self) -> Option<&str> {
        self.new_state.as_deref()
    }

    /// Whether an explicit required state gates this mapping
    #[inline]
    #[must_use]
    pub fn is_state_gated(&self) -> bool {
        self.required_state.is_some()
    }
}

/// A stub rule: predicate, response and optional scenario transition
#[derive(Debug, Clone)]
pub struct StubMapping {
    id: StubId,
    priority: u32,
    predicate: Arc<dyn RequestPredicate>,
    scenario: Option<ScenarioRule>,
    response: ResponseTemplate,
}

impl StubMapping {
    /// Start building a mapping
    #[inline]
    #[must_use]
    pub fn builder() -> StubMappingBuilder {
        StubMappingBuilder::default()
    }

    /// Mapping ID
    #[inline]
    #[must_use]
    pub fn id(&self) -> StubId {
        self.id
    }

    /// Priority (lower number wins)
    #[inline]
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Request predicate
    #[inline]
    #[must_use]
    pub fn predicate(&self) -> &dyn RequestPredicate {
        self.predicate.as_ref()
    }

    /// Scenario binding, if any
    #[inline]
    #[must_use]
    pub fn scenario(&self) -> Option<&ScenarioRule> {
        self.scenario.as_ref()
    }

    /// Scenario name, if any
    #[inline]
    #[must_use]
    pub fn scenario_name(&self) -> Option<&str> {
        self.scenario.as_ref().map(ScenarioRule::name)
    }

    /// Whether an explicit required state gates this mapping
    #[inline]
    #[must_use]
    pub fn is_state_gated(&self) -> bool {
        self.scenario.as_ref().is_some_and(ScenarioRule::is_state_gated)
    }

    /// Response template
    #[inline]
    #[must_use]
    pub fn response(&self) -> &ResponseTemplate {
        &self.response
    }

    /// Same mapping under another id
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: StubId) -> Self {
        self.id = id;
        self
    }

    /// JSON form for admin listings
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut value = serde_json::json!({
            "id": self.id,
            "priority": self.priority,
            "request": self.predicate.describe(),
            "response": self.response,
        });
        if let (Some(rule), Some(object)) = (&self.scenario, value.as_object_mut()) {
            object.insert("scenarioName".into(), rule.name.clone().into());
            if let Some(state) = &rule.required_state {
                object.insert("requiredScenarioState".into(), state.clone().into());
            }
            if let Some(state) = &rule.new_state {
                object.insert("newScenarioState".into(), state.clone().into());
            }
        }
        value
    }
}

/// Builder for [`StubMapping`]
#[derive(Debug, Default)]
pub struct StubMappingBuilder {
    id: Option<StubId>,
    priority: Option<u32>,
    predicate: Option<Arc<dyn RequestPredicate>>,
    scenario_name: Option<String>,
    required_state: Option<String>,
    new_state: Option<String>,
    response: ResponseTemplate,
}

impl StubMappingBuilder {
    /// With explicit id
    #[inline]
    #[must_use]
    pub fn id(mut self, id: StubId) -> Self {
        self.id = Some(id);
        self
    }

    /// With priority (lower wins)
    #[inline]
    #[must_use]
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// With request predicate
    #[inline]
    #[must_use]
    pub fn request(mut self, predicate: impl RequestPredicate + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// With shared request predicate
    #[inline]
    #[must_use]
    pub fn shared_request(mut self, predicate: Arc<dyn RequestPredicate>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Bind to a scenario
    #[inline]
    #[must_use]
    pub fn in_scenario(mut self, name: impl Into<String>) -> Self {
        self.scenario_name = Some(name.into());
        self
    }

    /// Require a scenario state
    #[inline]
    #[must_use]
    pub fn when_scenario_state_is(mut self, state: impl Into<String>) -> Self {
        self.required_state = Some(state.into());
        self
    }

    /// Move the scenario to a new state when served
    #[inline]
    #[must_use]
    pub fn will_set_state_to(mut self, state: impl Into<String>) -> Self {
        self.new_state = Some(state.into());
        self
    }

    /// Set optional scenario fields in one go
    #[must_use]
    pub fn scenario_fields(
        mut self,
        name: Option<String>,
        required_state: Option<String>,
        new_state: Option<String>,
    ) -> Self {
        self.scenario_name = name;
        self.required_state = required_state;
        self.new_state = new_state;
        self
    }

    /// With response
    #[inline]
    #[must_use]
    pub fn respond(mut self, response: ResponseTemplate) -> Self {
        self.response = response;
        self
    }

    /// Validate and build
    ///
    /// # Errors
    /// - [`MappingError::InconsistentScenarioReference`] for state without name
    /// - [`MappingError::EmptyScenarioField`] for empty name or state
    /// - [`MappingError::MissingPredicate`] without a request predicate
    /// - [`MappingError::InvalidStatus`] for a status outside `100..=599`
    pub fn build(self) -> Result<StubMapping, MappingError> {
        let scenario = match self.scenario_name {
            Some(name) => {
                if name.is_empty() {
                    return Err(MappingError::EmptyScenarioField("name"));
                }
                if self.required_state.as_deref() == Some("") {
                    return Err(MappingError::EmptyScenarioField("required state"));
                }
                if self.new_state.as_deref() == Some("") {
                    return Err(MappingError::EmptyScenarioField("new state"));
                }
                Some(ScenarioRule {
                    name,
                    required_state: self.required_state,
                    new_state: self.new_state,
                })
            }
            None if self.required_state.is_some() => {
                return Err(MappingError::InconsistentScenarioReference {
                    field: "requiredScenarioState",
                });
            }
            None if self.new_state.is_some() => {
                return Err(MappingError::InconsistentScenarioReference {
                    field: "newScenarioState",
                });
            }
            None => None,
        };

        let predicate = self.predicate.ok_or(MappingError::MissingPredicate)?;

        if !self.response.has_valid_status() {
            return Err(MappingError::InvalidStatus(self.response.status));
        }

        Ok(StubMapping {
            id: self.id.unwrap_or_default(),
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            predicate,
            scenario,
            response: self.response,
        })
    }
}
