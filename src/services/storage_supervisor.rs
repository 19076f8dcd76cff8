//! Background task keeping a remote roster store connected and the degraded flag accurate.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{roster_store::RosterStore, storage::StorageError},
    state::SharedState,
};

/// Timing knobs of the supervisor loop.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Ceiling of the doubling delay.
    pub max_delay: Duration,
    /// Pause between health checks of an installed store.
    pub health_poll_interval: Duration,
    /// In-place reconnects tried before the store is dropped.
    pub max_reconnect_attempts: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_secs(10),
            health_poll_interval: Duration::from_secs(5),
            max_reconnect_attempts: 3,
        }
    }
}

impl Backoff {
    fn next(&self, delay: Duration) -> Duration {
        (delay * 2).min(self.max_delay)
    }
}

/// Connect to the storage backend, install it, and keep it healthy.
///
/// Connection attempts back off exponentially. Once installed, the store is polled; a failed
/// poll flips the service to degraded mode and triggers a bounded series of in-place reconnects.
/// When those are exhausted the store is dropped and a fresh connection is attempted.
pub async fn run<F, Fut>(state: SharedState, backoff: Backoff, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn RosterStore>, StorageError>> + Send,
{
    let mut delay = backoff.initial_delay;

    loop {
        match connect().await {
            Ok(store) => {
                info!(
                    backend = store.backend(),
                    "storage connection established; leaving degraded mode"
                );
                state.set_roster_store(store.clone()).await;
                delay = backoff.initial_delay;

                watch_health(&state, &backoff, store.as_ref()).await;

                warn!("exhausted storage reconnect attempts; staying in degraded mode");
                state.clear_roster_store().await;
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }
        sleep(delay).await;
        delay = backoff.next(delay);
    }
}

/// Poll the installed store until it fails and cannot be reconnected in place.
async fn watch_health(state: &SharedState, backoff: &Backoff, store: &dyn RosterStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(backoff.health_poll_interval).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed; entering degraded mode");
                state.update_degraded(true);
                if !reconnect(backoff, store).await {
                    return;
                }
                info!("storage reconnection succeeded after health check failure");
                state.update_degraded(false);
            }
        }
    }
}

async fn reconnect(backoff: &Backoff, store: &dyn RosterStore) -> bool {
    let mut delay = backoff.initial_delay;
    for attempt in 0..backoff.max_reconnect_attempts {
        match store.try_reconnect().await {
            Ok(()) => return true,
            Err(err) => {
                warn!(attempt, error = %err, "storage reconnect attempt failed");
                sleep(delay).await;
                delay = backoff.next(delay);
            }
        }
    }
    false
}
