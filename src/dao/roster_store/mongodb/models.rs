use serde::{Deserialize, Serialize};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{CompetitionEntity, MatchEntity, TeamEntity};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCompetitionDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub sport: String,
    pub start_date: String,
    pub end_date: String,
    pub number_of_courts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTeamDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Join row linking a team to a competition. `sequence` keeps registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMembershipDocument {
    pub competition_id: String,
    pub team_id: String,
    pub sequence: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub competition_id: String,
    pub team1_id: String,
    pub team2_id: String,
    pub match_date: String,
    pub court_number: i64,
    /// Insertion position used to read matches back in order.
    pub sequence: i64,
}

pub fn id_key(id: Uuid) -> String {
    id.hyphenated().to_string()
}

fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

fn parse_date(owner: &str, value: &str) -> MongoResult<Date> {
    Date::parse(value, DATE_FORMAT).map_err(|err| MongoDaoError::Decode {
        id: owner.to_owned(),
        reason: format!("invalid date `{value}`: {err}"),
    })
}

fn parse_id(owner: &str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|err| MongoDaoError::Decode {
        id: owner.to_owned(),
        reason: format!("invalid id `{value}`: {err}"),
    })
}

fn parse_count(owner: &str, value: i64) -> MongoResult<u32> {
    u32::try_from(value).map_err(|_| MongoDaoError::Decode {
        id: owner.to_owned(),
        reason: format!("count `{value}` out of range"),
    })
}

impl From<CompetitionEntity> for MongoCompetitionDocument {
    fn from(value: CompetitionEntity) -> Self {
        Self {
            id: id_key(value.id),
            name: value.name,
            sport: value.sport,
            start_date: format_date(value.start_date),
            end_date: format_date(value.end_date),
            number_of_courts: i64::from(value.number_of_courts),
        }
    }
}

impl TryFrom<MongoCompetitionDocument> for CompetitionEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoCompetitionDocument) -> MongoResult<Self> {
        let owner = value.id.as_str();
        Ok(Self {
            id: parse_id(owner, &value.id)?,
            start_date: parse_date(owner, &value.start_date)?,
            end_date: parse_date(owner, &value.end_date)?,
            number_of_courts: parse_count(owner, value.number_of_courts)?,
            name: value.name,
            sport: value.sport,
        })
    }
}

impl From<TeamEntity> for MongoTeamDocument {
    fn from(value: TeamEntity) -> Self {
        Self {
            id: id_key(value.id),
            name: value.name,
        }
    }
}

impl TryFrom<MongoTeamDocument> for TeamEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTeamDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(&value.id, &value.id)?,
            name: value.name,
        })
    }
}

impl From<(MatchEntity, i64)> for MongoMatchDocument {
    fn from((value, sequence): (MatchEntity, i64)) -> Self {
        Self {
            id: id_key(value.id),
            competition_id: id_key(value.competition_id),
            team1_id: id_key(value.team1_id),
            team2_id: id_key(value.team2_id),
            match_date: format_date(value.match_date),
            court_number: i64::from(value.court_number),
            sequence,
        }
    }
}

impl TryFrom<MongoMatchDocument> for MatchEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchDocument) -> MongoResult<Self> {
        let owner = value.id.as_str();
        Ok(Self {
            id: parse_id(owner, &value.id)?,
            competition_id: parse_id(owner, &value.competition_id)?,
            team1_id: parse_id(owner, &value.team1_id)?,
            team2_id: parse_id(owner, &value.team2_id)?,
            match_date: parse_date(owner, &value.match_date)?,
            court_number: parse_count(owner, value.court_number)?,
        })
    }
}
