//! DTO definitions for generated matches.

use serde::Serialize;
use time::Date;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::iso_date,
    state::competition::{Match, Team},
};

/// Public projection of a match, carrying the team names for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchSummary {
    /// Match identifier.
    pub id: Uuid,
    /// Owning competition.
    pub competition_id: Uuid,
    /// First team of the pairing.
    pub team1_id: Uuid,
    /// Name of the first team.
    pub team1_name: String,
    /// Second team of the pairing.
    pub team2_id: Uuid,
    /// Name of the second team.
    pub team2_name: String,
    /// Day the match is played.
    #[serde(with = "iso_date")]
    #[schema(value_type = String, format = Date)]
    pub match_date: Date,
    /// 1-indexed court.
    pub court_number: u32,
}

impl From<(Match, &Team, &Team)> for MatchSummary {
    fn from((fixture, team1, team2): (Match, &Team, &Team)) -> Self {
        Self {
            id: fixture.id,
            competition_id: fixture.competition_id,
            team1_id: fixture.team1_id,
            team1_name: team1.name.clone(),
            team2_id: fixture.team2_id,
            team2_name: team2.name.clone(),
            match_date: fixture.match_date,
            court_number: fixture.court_number,
        }
    }
}
