//! Stubwire Stubs
//!
//! Stub mappings and the registry that holds them.
//!
//! # Core Concepts
//!
//! - [`Request`]: Inbound request as the matcher sees it
//! - [`RequestPredicate`]: Opaque `matches(request)` seam
//! - [`RequestPattern`]: Basic method/url/header predicate
//! - [`StubMapping`]: Predicate + response + optional scenario rule
//! - [`StubRegistry`]: Ordered, copy-on-write mapping collection
//!
//! # Example
//!
//! ```rust
//! use stubwire_stubs::{Request, RequestPattern, ResponseTemplate, StubMapping, StubRegistry};
//!
//! let registry = StubRegistry::new();
//! let mapping = StubMapping::builder()
//!     .request(RequestPattern::get("/state"))
//!     .in_scenario("StateScenario")
//!     .when_scenario_state_is("Started")
//!     .will_set_state_to("State1")
//!     .respond(ResponseTemplate::ok().with_body("Transitioned to State1"))
//!     .build()
//!     .unwrap();
//! registry.add(mapping);
//!
//! let snapshot = registry.snapshot();
//! let request = Request::new("GET", "/state");
//! assert!(snapshot.iter().all(|m| m.predicate().matches(&request).unwrap()));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod definition;
pub mod mapping;
pub mod pattern;
pub mod predicate;
pub mod registry;
pub mod request;
pub mod response;

// Re-exports
pub use definition::MappingDefinition;
pub use mapping::{MappingError, ScenarioRule, StubId, StubMapping, StubMappingBuilder, DEFAULT_PRIORITY};
pub use pattern::{HeaderMatcher, RequestPattern};
pub use predicate::{AnyRequest, FnPredicate, PredicateError, RequestPredicate};
pub use registry::{StubRegistry, StubSnapshot};
pub use request::Request;
pub use response::ResponseTemplate;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
