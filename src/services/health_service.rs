use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether a usable store is installed, pinging it while logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.roster_store().await;
    match &store {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, backend = store.backend(), "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    HealthResponse::new(
        state.is_degraded(),
        store.as_ref().map(|store| store.backend()),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::roster_store::memory::MemoryRosterStore,
        dto::health::HealthStatus,
        state::{AppState, scheduler::ThreadRngShuffler},
    };

    #[tokio::test]
    async fn reports_degraded_until_a_store_is_installed() {
        let state = AppState::new(Arc::new(ThreadRngShuffler));
        let report = health_status(&state).await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.storage, None);

        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        let report = health_status(&state).await;
        assert_eq!(report.status, HealthStatus::Ok);
        assert_eq!(report.storage.as_deref(), Some("memory"));
    }
}
