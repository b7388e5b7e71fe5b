//! Stub registry
//!
//! Provides [`StubRegistry`]: the ordered set of registered mappings.
//!
//! Writers build a new mapping list and swap it in; readers take a
//! [`StubSnapshot`] (one `Arc` clone) and evaluate predicates without
//! holding any lock. In-flight matches keep the snapshot they started with.

use crate::mapping::{MappingError, StubId, StubMapping};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use stubwire_scenario::STARTED;

/// Point-in-time view of the registry, in insertion order
#[derive(Debug, Clone, Default)]
pub struct StubSnapshot {
    mappings: Arc<Vec<Arc<StubMapping>>>,
}

impl StubSnapshot {
    /// Mappings in insertion order (index = insertion rank)
    pub fn iter(&self) -> impl Iterator<Item = &Arc<StubMapping>> {
        self.mappings.iter()
    }

    /// Number of mappings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check if snapshot is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mapping by id
    #[must_use]
    pub fn get(&self, id: StubId) -> Option<&Arc<StubMapping>> {
        self.mappings.iter().find(|m| m.id() == id)
    }

    /// Distinct scenario names referenced by any mapping, sorted
    #[must_use]
    pub fn scenario_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.mappings.iter().filter_map(|m| m.scenario_name()).collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Scenario names with every state their mappings mention
    ///
    /// Each set includes the start state.
    #[must_use]
    pub fn scenarios(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut scenarios: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for rule in self.mappings.iter().filter_map(|m| m.scenario()) {
            let states = scenarios.entry(rule.name().to_string()).or_insert_with(|| {
                BTreeSet::from([STARTED.to_string()])
            });
            states.extend(rule.required_state().map(str::to_string));
            states.extend(rule.new_state().map(str::to_string));
        }
        scenarios
    }
}

/// Ordered, copy-on-write collection of stub mappings
#[derive(Debug, Default)]
pub struct StubRegistry {
    current: RwLock<StubSnapshot>,
}

impl StubRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent view for one match
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> StubSnapshot {
        self.current.read().clone()
    }

    /// Append a mapping
    ///
    /// A mapping whose id is already registered replaces that entry in place.
    pub fn add(&self, mapping: StubMapping) -> StubId {
        let id = mapping.id();
        let mapping = Arc::new(mapping);
        self.write(|mappings| {
            match mappings.iter().position(|m| m.id() == id) {
                Some(i) => mappings[i] = mapping,
                None => mappings.push(mapping),
            }
        });
        tracing::info!("Registered stub mapping {}", id);
        id
    }

    /// Replace the mapping registered under `id`, keeping its position
    ///
    /// # Errors
    /// Returns [`MappingError::NotFound`] if `id` is not registered
    pub fn replace(&self, id: StubId, mapping: StubMapping) -> Result<(), MappingError> {
        let mapping = Arc::new(mapping.with_id(id));
        let mut found = false;
        self.write(|mappings| {
            if let Some(i) = mappings.iter().position(|m| m.id() == id) {
                mappings[i] = mapping;
                found = true;
            }
        });
        if found {
            tracing::info!("Replaced stub mapping {}", id);
            Ok(())
        } else {
            Err(MappingError::NotFound(id))
        }
    }

    /// Remove a mapping
    pub fn remove(&self, id: StubId) -> Option<Arc<StubMapping>> {
        let mut removed = None;
        self.write(|mappings| {
            if let Some(i) = mappings.iter().position(|m| m.id() == id) {
                removed = Some(mappings.remove(i));
            }
        });
        if removed.is_some() {
            tracing::info!("Removed stub mapping {}", id);
        }
        removed
    }

    /// Mapping by id
    #[must_use]
    pub fn get(&self, id: StubId) -> Option<Arc<StubMapping>> {
        self.snapshot().get(id).cloned()
    }

    /// Distinct scenario names referenced by any mapping, sorted
    #[must_use]
    pub fn scenario_names(&self) -> Vec<String> {
        self.snapshot().scenario_names()
    }

    /// Remove every mapping
    pub fn clear(&self) {
        *self.current.write() = StubSnapshot::default();
        tracing::info!("All stub mappings cleared");
    }

    /// Number of mappings
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }

    fn write(&self, f: impl FnOnce(&mut Vec<Arc<StubMapping>>)) {
        let mut current = self.current.write();
        f(Arc::make_mut(&mut current.mappings));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::RequestPattern;
    use crate::predicate::AnyRequest;
    use crate::response::ResponseTemplate;

    fn mapping(body: &str) -> StubMapping {
        StubMapping::builder()
            .request(AnyRequest)
            .respond(ResponseTemplate::ok().with_body(body))
            .build()
            .unwrap()
    }

    fn bodies(snapshot: &StubSnapshot) -> Vec<String> {
        snapshot
            .iter()
            .map(|m| m.response().body_str().to_string())
            .collect()
    }

    #[test]
    fn add_preserves_insertion_order() {
        let registry = StubRegistry::new();
        registry.add(mapping("first"));
        registry.add(mapping("second"));

        assert_eq!(bodies(&registry.snapshot()), vec!["first", "second"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_writes() {
        let registry = StubRegistry::new();
        registry.add(mapping("first"));
        let before = registry.snapshot();

        registry.add(mapping("second"));
        registry.clear();

        assert_eq!(bodies(&before), vec!["first"]);
        assert!(registry.snapshot().is_empty());
    }

    #[test]
    fn add_with_existing_id_replaces_in_place() {
        let registry = StubRegistry::new();
        let id = registry.add(mapping("old"));
        registry.add(mapping("other"));
        registry.add(mapping("new").with_id(id));

        assert_eq!(bodies(&registry.snapshot()), vec!["new", "other"]);
    }

    #[test]
    fn replace_keeps_position() {
        let registry = StubRegistry::new();
        registry.add(mapping("a"));
        let id = registry.add(mapping("b"));
        registry.add(mapping("c"));

        registry.replace(id, mapping("B")).unwrap();

        assert_eq!(bodies(&registry.snapshot()), vec!["a", "B", "c"]);
        assert_eq!(registry.get(id).unwrap().response().body_str(), "B");
    }

    #[test]
    fn replace_unknown_id_fails() {
        let registry = StubRegistry::new();
        let id = StubId::new();
        assert_eq!(
            registry.replace(id, mapping("x")),
            Err(MappingError::NotFound(id))
        );
    }

    #[test]
    fn remove_by_id() {
        let registry = StubRegistry::new();
        let id = registry.add(mapping("gone"));
        registry.add(mapping("kept"));

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
        assert_eq!(bodies(&registry.snapshot()), vec!["kept"]);
    }

    #[test]
    fn scenarios_collect_possible_states() {
        let registry = StubRegistry::new();
        registry.add(
            StubMapping::builder()
                .request(RequestPattern::get("/state"))
                .in_scenario("StateScenario")
                .when_scenario_state_is("Started")
                .will_set_state_to("State1")
                .build()
                .unwrap(),
        );
        registry.add(
            StubMapping::builder()
                .request(RequestPattern::get("/state"))
                .in_scenario("StateScenario")
                .when_scenario_state_is("State1")
                .build()
                .unwrap(),
        );
        registry.add(mapping("no scenario"));

        assert_eq!(registry.scenario_names(), vec!["StateScenario"]);
        let scenarios = registry.snapshot().scenarios();
        assert_eq!(scenarios.len(), 1);
        let states: Vec<_> = scenarios["StateScenario"].iter().cloned().collect();
        assert_eq!(states, vec!["Started", "State1"]);
    }
}
