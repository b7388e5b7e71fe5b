//! JSON mapping definitions
//!
//! The admin surface accepts mappings in this shape:
//!
//! ```json
//! {
//!   "scenarioName": "StateScenario",
//!   "requiredScenarioState": "Started",
//!   "newScenarioState": "State1",
//!   "request": { "method": "GET", "url": "/state" },
//!   "response": { "status": 200, "body": "Transitioned to State1" }
//! }
//! ```

use crate::mapping::{MappingError, StubId, StubMapping};
use crate::pattern::RequestPattern;
use crate::response::ResponseTemplate;
use serde::{Deserialize, Serialize};

/// Deserializable stub mapping
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingDefinition {
    /// Optional explicit id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<StubId>,
    /// Optional priority (lower wins)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Scenario name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    /// Required scenario state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_scenario_state: Option<String>,
    /// New scenario state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_scenario_state: Option<String>,
    /// Request pattern
    #[serde(default)]
    pub request: RequestPattern,
    /// Response template
    #[serde(default)]
    pub response: ResponseTemplate,
}

impl TryFrom<MappingDefinition> for StubMapping {
    type Error = MappingError;

    fn try_from(def: MappingDefinition) -> Result<Self, Self::Error> {
        let mut builder = StubMapping::builder()
            .request(def.request)
            .scenario_fields(
                def.scenario_name,
                def.required_scenario_state,
                def.new_scenario_state,
            )
            .respond(def.response);
        if let Some(id) = def.id {
            builder = builder.id(id);
        }
        if let Some(priority) = def.priority {
            builder = builder.priority(priority);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::RequestPredicate;
    use crate::request::Request;

    #[test]
    fn parse_scenario_mapping() {
        let def: MappingDefinition = serde_json::from_str(
            r#"{
                "scenarioName": "StateScenario",
                "requiredScenarioState": "Started",
                "newScenarioState": "State1",
                "request": { "method": "GET", "url": "/state" },
                "response": { "status": 200, "body": "Transitioned to State1" }
            }"#,
        )
        .unwrap();

        let mapping = StubMapping::try_from(def).unwrap();
        let rule = mapping.scenario().unwrap();
        assert_eq!(rule.name(), "StateScenario");
        assert_eq!(rule.new_state(), Some("State1"));
        assert_eq!(mapping.response().body_str(), "Transitioned to State1");
        assert_eq!(
            mapping.predicate().matches(&Request::new("GET", "/state")),
            Ok(true)
        );
    }

    #[test]
    fn state_without_scenario_name_is_rejected() {
        let def: MappingDefinition = serde_json::from_str(
            r#"{ "requiredScenarioState": "Started", "request": { "url": "/x" } }"#,
        )
        .unwrap();

        assert!(matches!(
            StubMapping::try_from(def),
            Err(MappingError::InconsistentScenarioReference { .. })
        ));
    }

    #[test]
    fn explicit_id_and_priority_are_kept() {
        let id = StubId::new();
        let def = MappingDefinition {
            id: Some(id),
            priority: Some(1),
            ..MappingDefinition::default()
        };

        let mapping = StubMapping::try_from(def).unwrap();
        assert_eq!(mapping.id(), id);
        assert_eq!(mapping.priority(), 1);
    }
}
