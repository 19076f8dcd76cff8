//! In-process [`RosterStore`] backed by id-keyed maps and an explicit membership index.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::{IndexMap, IndexSet};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{InsertOutcome, RosterStore};
use crate::dao::{
    models::{CompetitionEntity, MatchEntity, TeamEntity},
    storage::StorageResult,
};

/// Volatile store used for local runs and tests. Every operation takes a single lock, so each
/// call is atomic with respect to the others.
#[derive(Clone, Default)]
pub struct MemoryRosterStore {
    inner: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    competitions: IndexMap<Uuid, CompetitionEntity>,
    teams: IndexMap<Uuid, TeamEntity>,
    /// competition id -> registered team ids
    memberships: IndexMap<Uuid, IndexSet<Uuid>>,
    /// competition id -> matches in insertion order
    matches: IndexMap<Uuid, Vec<MatchEntity>>,
}

impl MemoryRosterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for MemoryRosterStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn insert_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            if guard
                .competitions
                .values()
                .any(|existing| existing.name == competition.name)
            {
                return Ok(InsertOutcome::Duplicate);
            }
            guard.competitions.insert(competition.id, competition);
            Ok(InsertOutcome::Inserted)
        })
    }

    fn find_competition(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.competitions.get(&id).cloned()) })
    }

    fn list_competitions(&self) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.competitions.values().cloned().collect()) })
    }

    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            let removed = guard.competitions.shift_remove(&id).is_some();
            guard.memberships.shift_remove(&id);
            guard.matches.shift_remove(&id);
            Ok(removed)
        })
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner.write().await.teams.insert(team.id, team);
            Ok(())
        })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.teams.get(&id).cloned()) })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.teams.values().cloned().collect()) })
    }

    fn add_membership(
        &self,
        competition_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            let inserted = guard
                .memberships
                .entry(competition_id)
                .or_default()
                .insert(team_id);
            Ok(if inserted {
                InsertOutcome::Inserted
            } else {
                InsertOutcome::Duplicate
            })
        })
    }

    fn list_competition_teams(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            let Some(members) = guard.memberships.get(&competition_id) else {
                return Ok(Vec::new());
            };
            Ok(members
                .iter()
                .filter_map(|team_id| guard.teams.get(team_id).cloned())
                .collect())
        })
    }

    fn list_team_competitions(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            Ok(guard
                .memberships
                .iter()
                .filter(|(_, members)| members.contains(&team_id))
                .filter_map(|(competition_id, _)| guard.competitions.get(competition_id).cloned())
                .collect())
        })
    }

    fn append_matches(
        &self,
        competition_id: Uuid,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            inner
                .write()
                .await
                .matches
                .entry(competition_id)
                .or_default()
                .extend(matches);
            Ok(())
        })
    }

    fn list_matches(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            Ok(inner
                .read()
                .await
                .matches
                .get(&competition_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
