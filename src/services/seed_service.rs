//! Startup loader inserting the configured demo competitions, teams and registrations.

use std::collections::HashMap;

use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::SeedData,
    dto::competition::CreateCompetitionRequest,
    error::ServiceError,
    services::{competition_service, roster_service, team_service},
    state::SharedState,
};

/// Outcome counters of a seeding pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Competitions created.
    pub competitions: usize,
    /// Teams created.
    pub teams: usize,
    /// Registrations recorded.
    pub registrations: usize,
}

/// Wait until a store is installed, then seed it once.
pub async fn run(state: SharedState, seed: SeedData) {
    let mut degraded = state.degraded_watcher();
    if degraded.wait_for(|value| !*value).await.is_err() {
        return;
    }
    let today = OffsetDateTime::now_utc().date();
    match load(&state, &seed, today).await {
        Ok(Some(report)) => info!(
            competitions = report.competitions,
            teams = report.teams,
            registrations = report.registrations,
            "seed data loaded"
        ),
        Ok(None) => info!("store already holds competitions; skipping seed data"),
        Err(err) => warn!(error = %err, "seed data not loaded"),
    }
}

/// Insert the seed data unless the store already holds competitions.
///
/// Entries that fail are logged and skipped; registrations referring to a name that was not
/// created are skipped too.
pub async fn load(
    state: &SharedState,
    seed: &SeedData,
    today: time::Date,
) -> Result<Option<SeedReport>, ServiceError> {
    if !competition_service::list_competitions(state).await?.is_empty() {
        return Ok(None);
    }

    let mut report = SeedReport::default();
    let mut competitions: HashMap<&str, Uuid> = HashMap::new();
    for entry in &seed.competitions {
        let (Some(start_date), Some(end_date)) =
            (entry.start.resolve(today), entry.end.resolve(today))
        else {
            warn!(name = %entry.name, "seed competition date out of range; skipping");
            continue;
        };
        let request = CreateCompetitionRequest {
            name: entry.name.clone(),
            sport: entry.sport.clone(),
            start_date,
            end_date,
            number_of_courts: entry.number_of_courts,
        };
        match competition_service::create_competition(state, request).await {
            Ok(summary) => {
                competitions.insert(entry.name.as_str(), summary.id);
                report.competitions += 1;
            }
            Err(err) => warn!(name = %entry.name, error = %err, "seed competition skipped"),
        }
    }

    // Team names may repeat; registrations resolve to the first team with the name.
    let mut teams: HashMap<&str, Uuid> = HashMap::new();
    for name in &seed.teams {
        match team_service::create_team(state, name.clone()).await {
            Ok(summary) => {
                teams.entry(name.as_str()).or_insert(summary.id);
                report.teams += 1;
            }
            Err(err) => warn!(name = %name, error = %err, "seed team skipped"),
        }
    }

    for registration in &seed.registrations {
        let (Some(&competition_id), Some(&team_id)) = (
            competitions.get(registration.competition.as_str()),
            teams.get(registration.team.as_str()),
        ) else {
            warn!(
                competition = %registration.competition,
                team = %registration.team,
                "seed registration refers to an unknown name; skipping"
            );
            continue;
        };
        match roster_service::register_team(state, competition_id, team_id).await {
            Ok(_) => report.registrations += 1,
            Err(err) => warn!(
                competition = %registration.competition,
                team = %registration.team,
                error = %err,
                "seed registration skipped"
            ),
        }
    }

    Ok(Some(report))
}
