pub mod competition;
pub mod roster;
pub mod scheduler;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, watch};
use uuid::Uuid;

use crate::{
    dao::roster_store::RosterStore, error::ServiceError, state::scheduler::TeamShuffler,
};

pub type SharedState = Arc<AppState>;

/// Central application state holding the storage handle and per-competition locks.
pub struct AppState {
    roster_store: RwLock<Option<Arc<dyn RosterStore>>>,
    degraded: watch::Sender<bool>,
    competition_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    shuffler: Arc<dyn TeamShuffler>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(shuffler: Arc<dyn TeamShuffler>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            roster_store: RwLock::new(None),
            degraded: degraded_tx,
            competition_locks: DashMap::new(),
            shuffler,
        })
    }

    /// Obtain a handle to the current roster store, if one is installed.
    pub async fn roster_store(&self) -> Option<Arc<dyn RosterStore>> {
        let guard = self.roster_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the roster store or fail while the service is degraded.
    pub async fn require_roster_store(&self) -> Result<Arc<dyn RosterStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.roster_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new roster store implementation and leave degraded mode.
    pub async fn set_roster_store(&self, store: Arc<dyn RosterStore>) {
        {
            let mut guard = self.roster_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current roster store and enter degraded mode.
    pub async fn clear_roster_store(&self) {
        {
            let mut guard = self.roster_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Serialise read-modify-write sequences on one competition.
    ///
    /// The guard must be held for the whole sequence; different competitions never contend.
    /// Lock entries live only while a caller holds or awaits them, so ids that name no
    /// competition leave nothing behind.
    pub async fn lock_competition(&self, competition_id: Uuid) -> CompetitionGuard<'_> {
        let lock = self
            .competition_locks
            .entry(competition_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        CompetitionGuard {
            locks: &self.competition_locks,
            competition_id,
            _guard: lock.lock_owned().await,
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_competition_locks(&self) -> usize {
        self.competition_locks.len()
    }

    /// Permutation source used when pairing teams.
    pub fn shuffler(&self) -> &dyn TeamShuffler {
        self.shuffler.as_ref()
    }
}

/// Exclusive access to one competition, released on drop.
pub struct CompetitionGuard<'a> {
    locks: &'a DashMap<Uuid, Arc<Mutex<()>>>,
    competition_id: Uuid,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for CompetitionGuard<'_> {
    fn drop(&mut self) {
        // One reference in the map and one in this guard: nobody else is waiting.
        self.locks
            .remove_if(&self.competition_id, |_, lock| Arc::strong_count(lock) == 2);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{dao::roster_store::memory::MemoryRosterStore, state::scheduler::ThreadRngShuffler};

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(Arc::new(ThreadRngShuffler));
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_roster_store().await,
            Err(ServiceError::Degraded)
        ));

        let mut watcher = state.degraded_watcher();
        state.set_roster_store(Arc::new(MemoryRosterStore::new())).await;
        assert!(!state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_roster_store().await.is_ok());

        state.clear_roster_store().await;
        assert!(state.is_degraded());
    }

    #[tokio::test]
    async fn competition_lock_is_exclusive_per_competition() {
        let state = AppState::new(Arc::new(ThreadRngShuffler));
        let id = Uuid::new_v4();
        let guard = state.lock_competition(id).await;

        let contended =
            tokio::time::timeout(Duration::from_millis(50), state.lock_competition(id)).await;
        assert!(contended.is_err());

        let other =
            tokio::time::timeout(Duration::from_millis(50), state.lock_competition(Uuid::new_v4()))
                .await;
        assert!(other.is_ok());

        drop(guard);
        assert!(
            tokio::time::timeout(Duration::from_millis(50), state.lock_competition(id))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn released_locks_leave_no_entries() {
        let state = AppState::new(Arc::new(ThreadRngShuffler));
        let id = Uuid::new_v4();

        let first = state.lock_competition(id).await;
        let waiter = {
            let state = state.clone();
            tokio::spawn(async move {
                let _second = state.lock_competition(id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(first);
        assert!(
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .is_ok()
        );

        for _ in 0..100 {
            drop(state.lock_competition(Uuid::new_v4()).await);
        }
        assert_eq!(state.tracked_competition_locks(), 0);
    }
}
