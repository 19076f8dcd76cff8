//! Registration of teams into competitions and the unassigned-teams view.

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dao::roster_store::InsertOutcome,
    dto::team::TeamSummary,
    error::ServiceError,
    services::{
        competition_service::{competition_not_found, load_roster},
        team_service::load_team,
    },
    state::{
        SharedState,
        competition::{Competition, Match},
        roster,
    },
};

/// Register an existing team to an existing competition.
///
/// The team is resolved before the competition so an unknown team is reported even when the
/// competition is unknown as well.
pub async fn register_team(
    state: &SharedState,
    competition_id: Uuid,
    team_id: Uuid,
) -> Result<TeamSummary, ServiceError> {
    let store = state.require_roster_store().await?;
    let team = load_team(state, team_id).await?;

    let _guard = state.lock_competition(competition_id).await;
    let competition: Competition = store
        .find_competition(competition_id)
        .await?
        .ok_or_else(|| competition_not_found(competition_id))?
        .into();

    match store.add_membership(competition.id, team.id).await? {
        InsertOutcome::Inserted => {
            info!(
                competition_id = %competition.id,
                team_id = %team.id,
                "team registered"
            );
            Ok(team.into())
        }
        InsertOutcome::Duplicate => Err(ServiceError::Conflict(format!(
            "team `{}` is already registered in competition `{}`",
            team.name, competition.name
        ))),
    }
}

/// Registered teams that do not appear in any recorded match of the competition.
pub async fn unassigned_teams(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<TeamSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    let _guard = state.lock_competition(competition_id).await;

    let roster = load_roster(state, competition_id).await?;
    let matches: Vec<Match> = store
        .list_matches(competition_id)
        .await?
        .into_iter()
        .map(Match::from)
        .collect();

    let unassigned = roster::unassigned_teams(roster, &matches);
    debug!(
        competition_id = %competition_id,
        unassigned = unassigned.len(),
        "computed unassigned teams"
    );
    Ok(unassigned.into_iter().map(TeamSummary::from).collect())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, sync::Arc};

    use time::macros::date;

    use super::*;
    use crate::{
        dao::roster_store::memory::MemoryRosterStore,
        dto::competition::{CompetitionSummary, CreateCompetitionRequest},
        services::{competition_service, match_service, team_service},
        state::{AppState, scheduler::SeededShuffler},
    };

    async fn memory_state() -> SharedState {
        let state = AppState::new(Arc::new(SeededShuffler::new(11)));
        state
            .set_roster_store(Arc::new(MemoryRosterStore::new()))
            .await;
        state
    }

    async fn competition(state: &SharedState, courts: u32) -> CompetitionSummary {
        competition_service::create_competition(
            state,
            CreateCompetitionRequest {
                name: format!("Cup on {courts} courts"),
                sport: "Padel".into(),
                start_date: date!(2025 - 09 - 10),
                end_date: date!(2025 - 09 - 12),
                number_of_courts: courts,
            },
        )
        .await
        .unwrap()
    }

    async fn registered_teams(
        state: &SharedState,
        competition_id: Uuid,
        count: usize,
    ) -> Vec<TeamSummary> {
        let mut teams = Vec::with_capacity(count);
        for index in 0..count {
            let team = team_service::create_team(state, format!("Team {index}"))
                .await
                .unwrap();
            register_team(state, competition_id, team.id).await.unwrap();
            teams.push(team);
        }
        teams
    }

    #[tokio::test]
    async fn registration_is_visible_from_both_sides() {
        let state = memory_state().await;
        let cup = competition(&state, 1).await;
        let teams = registered_teams(&state, cup.id, 1).await;

        assert_eq!(
            competition_service::list_competition_teams(&state, cup.id)
                .await
                .unwrap(),
            teams
        );
        assert_eq!(
            team_service::list_team_competitions(&state, teams[0].id)
                .await
                .unwrap(),
            vec![cup]
        );
    }

    #[tokio::test]
    async fn registering_twice_conflicts_and_membership_grows_by_one() {
        let state = memory_state().await;
        let cup = competition(&state, 1).await;
        let teams = registered_teams(&state, cup.id, 1).await;

        let err = register_team(&state, cup.id, teams[0].id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::Conflict(message) if message.contains("Team 0") && message.contains(&cup.name))
        );
        assert_eq!(
            competition_service::list_competition_teams(&state, cup.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn unknown_team_is_reported_before_unknown_competition() {
        let state = memory_state().await;
        let team_id = Uuid::new_v4();
        let err = register_team(&state, Uuid::new_v4(), team_id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::NotFound(message) if message == format!("team `{team_id}` not found"))
        );

        let team = team_service::create_team(&state, "Lone".into())
            .await
            .unwrap();
        let competition_id = Uuid::new_v4();
        let err = register_team(&state, competition_id, team.id)
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::NotFound(message) if message == format!("competition `{competition_id}` not found"))
        );
    }

    #[tokio::test]
    async fn concurrent_duplicate_registrations_admit_exactly_one() {
        let state = memory_state().await;
        let cup = competition(&state, 1).await;
        let team = team_service::create_team(&state, "Racers".into())
            .await
            .unwrap();

        let attempts = (0..8).map(|_| {
            let state = state.clone();
            tokio::spawn(async move { register_team(&state, cup.id, team.id).await })
        });
        let mut successes = 0;
        for handle in attempts {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(err) => assert!(matches!(err, ServiceError::Conflict(_))),
            }
        }

        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn every_team_is_unassigned_before_scheduling() {
        let state = memory_state().await;
        let cup = competition(&state, 2).await;
        let teams = registered_teams(&state, cup.id, 5).await;

        assert_eq!(unassigned_teams(&state, cup.id).await.unwrap(), teams);
    }

    #[tokio::test]
    async fn unassigned_and_assigned_partition_the_roster() {
        let state = memory_state().await;
        let cup = competition(&state, 2).await;
        let teams = registered_teams(&state, cup.id, 10).await;

        let matches = match_service::generate_first_round(&state, cup.id)
            .await
            .unwrap();
        let unassigned = unassigned_teams(&state, cup.id).await.unwrap();
        assert_eq!(matches.len(), 4);
        assert_eq!(unassigned.len(), 2);

        let assigned: HashSet<Uuid> = matches
            .iter()
            .flat_map(|m| [m.team1_id, m.team2_id])
            .collect();
        let left: HashSet<Uuid> = unassigned.iter().map(|team| team.id).collect();
        let all: HashSet<Uuid> = teams.iter().map(|team| team.id).collect();
        assert!(assigned.is_disjoint(&left));
        assert_eq!(&assigned | &left, all);
    }

    #[tokio::test]
    async fn unassigned_teams_of_unknown_competition_is_not_found() {
        let state = memory_state().await;
        let err = unassigned_teams(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn requests_for_unknown_competitions_leave_no_lock_entries() {
        let state = memory_state().await;
        let team = team_service::create_team(&state, "Drifters".into())
            .await
            .unwrap();

        for _ in 0..50 {
            let unknown = Uuid::new_v4();
            assert!(unassigned_teams(&state, unknown).await.is_err());
            assert!(register_team(&state, unknown, team.id).await.is_err());
            assert!(match_service::generate_first_round(&state, unknown).await.is_err());
            assert!(competition_service::delete_competition(&state, unknown).await.is_err());
        }
        assert_eq!(state.tracked_competition_locks(), 0);

        let cup = competition(&state, 1).await;
        registered_teams(&state, cup.id, 2).await;
        match_service::generate_first_round(&state, cup.id).await.unwrap();
        assert_eq!(state.tracked_competition_locks(), 0);
    }
}
