//! Background eviction of expired sessions

use std::sync::Arc;
use std::time::Duration;
use stubwire_core::Engine;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically evict expired sessions
///
/// Unadopted minted sessions always expire; other sessions only when the
/// engine has an idle TTL.
pub fn spawn_sweeper(engine: Arc<Engine>, every: Duration) -> JoinHandle<()> {
    let every = every.max(Duration::from_millis(1));
    let sessions = &engine.config().sessions;
    tracing::info!(
        "Sweeping every {}s (minted ttl {}s, idle ttl {:?})",
        every.as_secs(),
        sessions.minted_ttl_secs,
        sessions.idle_ttl_secs
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let evicted = engine.evict_expired();
            if evicted > 0 {
                tracing::debug!("Sweep evicted {} sessions", evicted);
            }
        }
    })
}
