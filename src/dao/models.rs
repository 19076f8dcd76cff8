use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

/// Competition row as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompetitionEntity {
    /// Stable identifier for the competition.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Sport played in the competition.
    pub sport: String,
    /// First day of the competition.
    pub start_date: Date,
    /// Last day of the competition.
    pub end_date: Date,
    /// Courts available per day.
    pub number_of_courts: u32,
}

/// Team row as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
}

/// Match row as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchEntity {
    /// Stable identifier for the match.
    pub id: Uuid,
    /// Owning competition.
    pub competition_id: Uuid,
    /// First team of the pairing.
    pub team1_id: Uuid,
    /// Second team of the pairing.
    pub team2_id: Uuid,
    /// Day the match is played.
    pub match_date: Date,
    /// 1-indexed court the match is played on.
    pub court_number: u32,
}
