//! First-round generation and the recorded match list of a competition.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::MatchEntity,
    dto::matches::MatchSummary,
    error::ServiceError,
    services::competition_service::{load_competition, load_roster},
    state::{
        SharedState,
        competition::{Match, Team},
        scheduler,
    },
};

/// Pair the competition's registered teams into its first round and record the batch.
///
/// Only the batch produced by this call is returned. Calling again appends another batch.
pub async fn generate_first_round(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    let _guard = state.lock_competition(competition_id).await;

    let competition = load_competition(state, competition_id).await?;
    let roster: Vec<Team> = store
        .list_competition_teams(competition_id)
        .await?
        .into_iter()
        .map(Team::from)
        .collect();
    let teams = teams_by_id(&roster);

    let matches = scheduler::first_round(&competition, roster, state.shuffler()).map_err(|err| {
        warn!(competition_id = %competition_id, error = %err, "first round not generated");
        err
    })?;

    store
        .append_matches(
            competition_id,
            matches.iter().cloned().map(MatchEntity::from).collect(),
        )
        .await?;
    info!(
        competition_id = %competition_id,
        matches = matches.len(),
        capacity = scheduler::daily_capacity(&competition),
        "generated first round"
    );

    summarize(matches, &teams)
}

/// Every match recorded for the competition, in insertion order.
pub async fn list_matches(
    state: &SharedState,
    competition_id: Uuid,
) -> Result<Vec<MatchSummary>, ServiceError> {
    let store = state.require_roster_store().await?;
    let roster = load_roster(state, competition_id).await?;
    let teams = teams_by_id(&roster);

    let matches = store
        .list_matches(competition_id)
        .await?
        .into_iter()
        .map(Match::from)
        .collect();
    summarize(matches, &teams)
}

fn teams_by_id(roster: &[Team]) -> HashMap<Uuid, Team> {
    roster.iter().map(|team| (team.id, team.clone())).collect()
}

fn summarize(
    matches: Vec<Match>,
    teams: &HashMap<Uuid, Team>,
) -> Result<Vec<MatchSummary>, ServiceError> {
    matches
        .into_iter()
        .map(|fixture| {
            let team1 = lookup(teams, fixture.team1_id)?;
            let team2 = lookup(teams, fixture.team2_id)?;
            Ok(MatchSummary::from((fixture, team1, team2)))
        })
        .collect()
}

fn lookup(teams: &HashMap<Uuid, Team>, id: Uuid) -> Result<&Team, ServiceError> {
    teams
        .get(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("team `{id}` not found")))
}
