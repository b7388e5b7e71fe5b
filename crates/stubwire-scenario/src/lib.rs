//! Stubwire Scenario State
//!
//! Thread-safe store of `(session, scenario) -> state`.
//!
//! # Core Concepts
//!
//! - [`ScenarioStateStore`]: Lazily initialised state per session/scenario pair
//! - [`ScenarioCells`]: The cells one request needs, resolved up front
//! - [`ScenarioLocks`]: Exclusive hold over those cells for read-decide-write
//!
//! Every pair starts at [`STARTED`]. Pairs are locked independently, so
//! two sessions never block each other.
//!
//! # Example
//!
//! ```rust
//! use stubwire_scenario::{ScenarioStateStore, STARTED};
//! use stubwire_session::SessionId;
//!
//! let store = ScenarioStateStore::new();
//! let a = SessionId::new("a").unwrap();
//!
//! assert_eq!(store.get_state(&a, "StateScenario"), STARTED);
//!
//! let cells = store.cells(&a, ["StateScenario"]);
//! let mut locks = cells.lock();
//! if locks.state("StateScenario") == Some(STARTED) {
//!     locks.set("StateScenario", "State1");
//! }
//! drop(locks);
//!
//! assert_eq!(store.get_state(&a, "StateScenario"), "State1");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cells;
mod store;

pub use cells::{ScenarioCell, ScenarioCells, ScenarioLocks};
pub use store::ScenarioStateStore;

/// State every scenario starts in
pub const STARTED: &str = "Started";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
