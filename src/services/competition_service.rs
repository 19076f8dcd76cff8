//! Competition admission and the read-only competition views.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::{models::CompetitionEntity, roster_store::InsertOutcome},
    dto::{
        competition::{CompetitionSummary, CreateCompetitionRequest},
        team::TeamSummary,
    },
    error::ServiceError,
    state::{
        SharedState,
        competition::{Competition, NewCompetition, Team},
    },
};

/// Admit a new competition, rejecting invalid input and duplicate names.
pub async fn create_competition(
    state: &SharedState,
    request: CreateCompetitionRequest,
) -> Result<CompetitionSummary, ServiceError> {
    let competition = NewCompetition::from(request).admit()?;
    let store = state.require_roster_store().await?;

    let entity = CompetitionEntity::from(competition.clone());
    match store.insert_competition(entity).await? {
        InsertOutcome::Inserted => {
            info!(
                competition_id = %competition.id,
                name = %competition.name,
                courts = competition.number_of_courts,
                "competition created"
            );
            Ok(competition.into())
        }
        InsertOutcome::Duplicate => Err(ServiceError::Conflict(format!(
            "competition `{}` already exists",
            competition.name
        ))),
    }
}

pub async fn list_competitions(
    state: &SharedState,
) -> Result<Vec<CompetitionSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    let competitions = store.list_competitions().await?;
    Ok(competitions
        .into_iter()
        .map(|entity| Competition::from(entity).into())
        .collect())
}

pub async fn get_competition(
    state: &SharedState,
    id: Uuid,
) -> Result<CompetitionSummary, ServiceError> {
    Ok(load_competition(state, id).await?.into())
}

/// Delete a competition along with its registrations and matches.
pub async fn delete_competition(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_roster_store().await?;
    let _guard = state.lock_competition(id).await;

    if !store.delete_competition(id).await? {
        return Err(competition_not_found(id));
    }
    info!(competition_id = %id, "competition deleted");
    Ok(())
}

/// Teams registered to the competition, in registration order.
pub async fn list_competition_teams(
    state: &SharedState,
    id: Uuid,
) -> Result<Vec<TeamSummary>, ServiceError> {
    Ok(load_roster(state, id)
        .await?
        .into_iter()
        .map(TeamSummary::from)
        .collect())
}

/// Resolve a competition or fail with a not-found error naming it.
pub(crate) async fn load_competition(
    state: &SharedState,
    id: Uuid,
) -> Result<Competition, ServiceError> {
    let store = state.require_roster_store().await?;
    store
        .find_competition(id)
        .await?
        .map(Competition::from)
        .ok_or_else(|| competition_not_found(id))
}

/// Resolve the competition's registered teams, failing when the competition is unknown.
pub(crate) async fn load_roster(state: &SharedState, id: Uuid) -> Result<Vec<Team>, ServiceError> {
    let store = state.require_roster_store().await?;
    if store.find_competition(id).await?.is_none() {
        return Err(competition_not_found(id));
    }
    let roster: Vec<Team> = store
        .list_competition_teams(id)
        .await?
        .into_iter()
        .map(Team::from)
        .collect();
    debug!(competition_id = %id, teams = roster.len(), "loaded competition roster");
    Ok(roster)
}

pub(crate) fn competition_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("competition `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::date;

    use super::*;
    use crate::{
        dao::roster_store::memory::MemoryRosterStore,
        services::{roster_service, team_service},
        state::{AppState, scheduler::SeededShuffler},
    };

    async fn memory_state() -> SharedState {
        let state = AppState::new(Arc::new(SeededShuffler::new(1)));
        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        state
    }

    fn request(name: &str) -> CreateCompetitionRequest {
        CreateCompetitionRequest {
            name: name.into(),
            sport: "Tennis".into(),
            start_date: date!(2025 - 06 - 01),
            end_date: date!(2025 - 06 - 03),
            number_of_courts: 2,
        }
    }

    #[tokio::test]
    async fn duplicate_names_conflict_and_only_one_exists() {
        let state = memory_state().await;
        create_competition(&state, request("Summer Open"))
            .await
            .unwrap();

        let err = create_competition(&state, request("Summer Open"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(message) if message.contains("Summer Open")));
        assert_eq!(list_competitions(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_storage() {
        let state = AppState::new(Arc::new(SeededShuffler::new(1)));
        let mut input = request("Broken");
        input.number_of_courts = 0;

        // No store installed: admission must fail first.
        let err = create_competition(&state, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn degraded_state_refuses_reads() {
        let state = AppState::new(Arc::new(SeededShuffler::new(1)));
        let err = list_competitions(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn unknown_competition_is_not_found() {
        let state = memory_state().await;
        let id = Uuid::new_v4();

        for err in [
            get_competition(&state, id).await.unwrap_err(),
            list_competition_teams(&state, id).await.unwrap_err(),
            delete_competition(&state, id).await.unwrap_err(),
        ] {
            assert!(matches!(err, ServiceError::NotFound(message) if message.contains(&id.to_string())));
        }
    }

    #[tokio::test]
    async fn delete_keeps_teams_but_drops_registrations() {
        let state = memory_state().await;
        let cup = create_competition(&state, request("Winter Cup"))
            .await
            .unwrap();
        let team = team_service::create_team(&state, "Aces".into())
            .await
            .unwrap();
        roster_service::register_team(&state, cup.id, team.id)
            .await
            .unwrap();

        delete_competition(&state, cup.id).await.unwrap();

        assert!(matches!(
            get_competition(&state, cup.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(team_service::get_team(&state, team.id).await.unwrap(), team);
        assert!(
            team_service::list_team_competitions(&state, team.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
