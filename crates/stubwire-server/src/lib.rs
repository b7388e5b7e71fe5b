//! Stubwire Server
//!
//! HTTP front-end for the Stubwire engine.
//!
//! # Core Concepts
//!
//! - [`routes`]: warp filter tree, admin surface plus stub matching
//! - [`ServerConfig`]: TOML-loadable listen and engine settings
//! - [`run`]: bind, serve and sweep expired sessions until shutdown
//!
//! A request without a session header or cookie is matched under a minted
//! session and answered with a `Set-Cookie` carrying it.
//!
//! # Example
//!
//! ```rust,no_run
//! use stubwire_server::{run, ServerConfig};
//!
//! # async fn example() -> Result<(), stubwire_server::ServerError> {
//! run(ServerConfig::default().with_port(9000), async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod http;
pub mod logging;
pub mod routes;
pub mod server;
pub mod sweeper;

// Re-exports
pub use config::{ConfigError, ServerConfig};
pub use routes::routes;
pub use server::{run, ServerError};
pub use sweeper::spawn_sweeper;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
