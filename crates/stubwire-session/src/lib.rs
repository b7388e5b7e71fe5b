//! Stubwire Session Identity
//!
//! Derives the logical client session a request belongs to.
//!
//! # Overview
//!
//! - **SessionId**: Opaque, non-empty session token
//! - **Headers** / **Cookies**: The request signals a session can arrive on
//! - **SessionResolver**: Header first, then cookie, then a fresh ephemeral id
//!
//! # Example
//!
//! ```rust
//! use stubwire_session::{Cookies, Headers, SessionResolver};
//!
//! let resolver = SessionResolver::default();
//!
//! let mut headers = Headers::new();
//! headers.insert("X-WireMock-Session-Id", "client-b-id");
//! let cookies = Cookies::parse("WireMockSessionId=other");
//!
//! let resolved = resolver.resolve(&headers, &cookies);
//! assert_eq!(resolved.id().as_str(), "client-b-id");
//! assert!(!resolved.is_ephemeral());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod id;
pub mod resolver;
pub mod signals;

// Re-exports
pub use id::{SessionError, SessionId, GLOBAL_SESSION_ID};
pub use resolver::{
    ResolvedSession, SessionResolver, SessionSource, DEFAULT_COOKIE_NAME, DEFAULT_HEADER_NAME,
};
pub use signals::{Cookies, Headers};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
