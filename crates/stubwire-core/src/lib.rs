//! Stubwire Core
//!
//! The matching and transition engine: session-scoped scenario state
//! machines gating which stub answers a request.
//!
//! # Core Concepts
//!
//! - [`Engine`]: Resolves the session, selects one mapping, applies its transition
//! - [`MatchResult`]: `Matched(response)` or `NoMatch`, never an error
//! - [`SelectionPolicy`]: How ties between eligible mappings are broken
//! - [`EngineConfig`]: Session and selection settings
//!
//! # Example
//!
//! ```rust
//! use stubwire_core::{Engine, EngineConfig};
//! use stubwire_stubs::{Request, RequestPattern, ResponseTemplate, StubMapping};
//!
//! let engine = Engine::with_config(EngineConfig::default());
//! engine.register_stub(
//!     StubMapping::builder()
//!         .request(RequestPattern::get("/state"))
//!         .in_scenario("StateScenario")
//!         .when_scenario_state_is("Started")
//!         .will_set_state_to("State1")
//!         .respond(ResponseTemplate::ok().with_body("Transitioned to State1"))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let request = Request::new("GET", "/state").with_header("X-WireMock-Session-Id", "a");
//! let result = engine.handle(&request);
//! assert_eq!(result.response().unwrap().body_str(), "Transitioned to State1");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod admin;
pub mod config;
pub mod engine;
pub mod error;
pub mod stats;

// Re-exports
pub use admin::ScenarioSummary;
pub use config::{
    EngineConfig, InsertionOrder, SelectionPolicy, SessionSettings, DEFAULT_MINTED_TTL_SECS,
};
pub use engine::{Engine, MatchResult, ServeEvent, MINTED_SWEEP_EVERY};
pub use error::{StubError, StubResult};
pub use stats::{EngineStats, StatsSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
