//! Server assembly

use crate::config::{ConfigError, ServerConfig};
use crate::routes::routes;
use crate::sweeper::spawn_sweeper;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use stubwire_core::Engine;

/// Server startup errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listen address unavailable
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying error
        source: warp::Error,
    },
}

/// Serve until `shutdown` resolves
///
/// # Errors
/// Returns [`ServerError`] if the configuration is invalid or the address
/// cannot be bound
pub async fn run(
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    config.validate()?;
    let engine = Arc::new(Engine::with_config(config.engine.clone()));
    let sweeper = spawn_sweeper(Arc::clone(&engine), config.sweep_interval());

    let (addr, server) = warp::serve(routes(engine))
        .try_bind_with_graceful_shutdown(config.bind, shutdown)
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    tracing::info!("Stubwire listening on http://{}", addr);

    server.await;

    sweeper.abort();
    tracing::info!("Stubwire stopped");
    Ok(())
}
