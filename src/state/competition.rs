use thiserror::Error;
use time::Date;
use uuid::Uuid;

use crate::dao::models::{CompetitionEntity, MatchEntity, TeamEntity};

/// Tournament instance with a sport, a date range and a court capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Competition {
    /// Stable identifier for the competition.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Sport played in the competition.
    pub sport: String,
    /// First day of the competition; first-round matches are played on it.
    pub start_date: Date,
    /// Last day of the competition.
    pub end_date: Date,
    /// Courts available per day.
    pub number_of_courts: u32,
}

/// Participant that can join several competitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Team {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team (not unique).
    pub name: String,
}

/// Scheduled pairing of two member teams on a given day and court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
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
    /// 1-indexed court, never above the competition's court count.
    pub court_number: u32,
}

/// Competition-level invariants checked when a competition is admitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// Name is empty or whitespace.
    #[error("competition name must not be blank")]
    BlankName,
    /// Sport is empty or whitespace.
    #[error("sport must not be blank")]
    BlankSport,
    /// Zero courts.
    #[error("there must be at least one court")]
    NoCourts,
    /// The competition would end before it starts.
    #[error("start date {start} is after end date {end}")]
    InvertedDates {
        /// Requested first day.
        start: Date,
        /// Requested last day.
        end: Date,
    },
}

/// Validated input for a competition that does not exist yet.
#[derive(Debug, Clone)]
pub struct NewCompetition {
    /// Unique, non-blank display name.
    pub name: String,
    /// Non-blank sport label.
    pub sport: String,
    /// First day of play.
    pub start_date: Date,
    /// Last day of play, never before `start_date`.
    pub end_date: Date,
    /// Courts available each day, at least one.
    pub number_of_courts: u32,
}

impl NewCompetition {
    /// Check every admission invariant, reporting the first violation.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        if self.name.trim().is_empty() {
            return Err(AdmissionError::BlankName);
        }
        if self.sport.trim().is_empty() {
            return Err(AdmissionError::BlankSport);
        }
        if self.number_of_courts == 0 {
            return Err(AdmissionError::NoCourts);
        }
        if self.start_date > self.end_date {
            return Err(AdmissionError::InvertedDates {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Validate and assign a fresh identifier.
    pub fn admit(self) -> Result<Competition, AdmissionError> {
        self.validate()?;
        Ok(Competition {
            id: Uuid::new_v4(),
            name: self.name,
            sport: self.sport,
            start_date: self.start_date,
            end_date: self.end_date,
            number_of_courts: self.number_of_courts,
        })
    }
}

impl From<CompetitionEntity> for Competition {
    fn from(value: CompetitionEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport: value.sport,
            start_date: value.start_date,
            end_date: value.end_date,
            number_of_courts: value.number_of_courts,
        }
    }
}

impl From<Competition> for CompetitionEntity {
    fn from(value: Competition) -> Self {
        Self {
            id: value.id,
            name: value.name,
            sport: value.sport,
            start_date: value.start_date,
            end_date: value.end_date,
            number_of_courts: value.number_of_courts,
        }
    }
}

impl From<TeamEntity> for Team {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<Team> for TeamEntity {
    fn from(value: Team) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

impl From<MatchEntity> for Match {
    fn from(value: MatchEntity) -> Self {
        Self {
            id: value.id,
            competition_id: value.competition_id,
            team1_id: value.team1_id,
            team2_id: value.team2_id,
            match_date: value.match_date,
            court_number: value.court_number,
        }
    }
}

impl From<Match> for MatchEntity {
    fn from(value: Match) -> Self {
        Self {
            id: value.id,
            competition_id: value.competition_id,
            team1_id: value.team1_id,
            team2_id: value.team2_id,
            match_date: value.match_date,
            court_number: value.court_number,
        }
    }
}
