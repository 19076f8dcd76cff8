use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Server error code reported when a unique index rejects a write.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to save competition `{id}`")]
    SaveCompetition {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load competition `{id}`")]
    LoadCompetition {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete competition `{id}`")]
    DeleteCompetition {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list competitions")]
    ListCompetitions {
        #[source]
        source: MongoError,
    },
    #[error("failed to save team `{id}`")]
    SaveTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load team `{id}`")]
    LoadTeam {
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to list teams")]
    ListTeams {
        #[source]
        source: MongoError,
    },
    #[error("failed to register team `{team_id}` in competition `{competition_id}`")]
    SaveMembership {
        competition_id: Uuid,
        team_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load memberships")]
    LoadMemberships {
        #[source]
        source: MongoError,
    },
    #[error("failed to save matches for competition `{competition_id}`")]
    SaveMatches {
        competition_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to load matches for competition `{competition_id}`")]
    LoadMatches {
        competition_id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to decode document `{id}`: {reason}")]
    Decode { id: String, reason: String },
}

/// Whether the failure comes from a unique index rejecting the write.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}
