//! Team registry: creation, lookup and the competitions a team joined.

use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::TeamEntity,
    dto::{competition::CompetitionSummary, team::TeamSummary},
    error::ServiceError,
    state::{
        SharedState,
        competition::{Competition, Team},
    },
};

/// Create a team. Names are not required to be unique.
pub async fn create_team(state: &SharedState, name: String) -> Result<TeamSummary, ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput(
            "team name must not be blank".into(),
        ));
    }
    let store = state.require_roster_store().await?;

    let team = Team {
        id: Uuid::new_v4(),
        name,
    };
    store.insert_team(TeamEntity::from(team.clone())).await?;
    info!(team_id = %team.id, name = %team.name, "team created");
    Ok(team.into())
}

pub async fn list_teams(state: &SharedState) -> Result<Vec<TeamSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    Ok(store
        .list_teams()
        .await?
        .into_iter()
        .map(|entity| Team::from(entity).into())
        .collect())
}

pub async fn get_team(state: &SharedState, id: Uuid) -> Result<TeamSummary, ServiceError> {
    Ok(load_team(state, id).await?.into())
}

/// Competitions the team is registered to, in registration order.
pub async fn list_team_competitions(
    state: &SharedState,
    id: Uuid,
) -> Result<Vec<CompetitionSummary>, ServiceError> {
    load_team(state, id).await?;
    let store = state.require_roster_store().await?;
    Ok(store
        .list_team_competitions(id)
        .await?
        .into_iter()
        .map(|entity| Competition::from(entity).into())
        .collect())
}

pub(crate) async fn load_team(state: &SharedState, id: Uuid) -> Result<Team, ServiceError> {
    let store = state.require_roster_store().await?;
    store
        .find_team(id)
        .await?
        .map(Team::from)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{id}` not found")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::roster_store::memory::MemoryRosterStore,
        state::{AppState, scheduler::ThreadRngShuffler},
    };

    async fn memory_state() -> SharedState {
        let state = AppState::new(Arc::new(ThreadRngShuffler));
        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        state
    }

    #[tokio::test]
    async fn team_names_may_repeat() {
        let state = memory_state().await;
        let first = create_team(&state, "Falcons".into()).await.unwrap();
        let second = create_team(&state, "Falcons".into()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(list_teams(&state).await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn blank_names_are_invalid() {
        let state = memory_state().await;
        let err = create_team(&state, "\t".into()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(list_teams(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let state = memory_state().await;
        let id = Uuid::new_v4();
        let err = list_team_competitions(&state, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(message) if message.starts_with("team")));
    }
}
