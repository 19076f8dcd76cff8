pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{CompetitionEntity, MatchEntity, TeamEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Outcome of an atomic "insert if absent" operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was written.
    Inserted,
    /// A record with the same unique key already exists; nothing was written.
    Duplicate,
}

/// Abstraction over the persistence layer for competitions, teams, memberships and matches.
///
/// Uniqueness checks (competition name, competition/team membership) are performed by the
/// backend as part of the write so concurrent callers cannot both succeed.
pub trait RosterStore: Send + Sync {
    /// Short backend name reported by the health route.
    fn backend(&self) -> &'static str;

    /// Insert a competition unless one with the same name already exists.
    fn insert_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>>;
    /// Fetch a competition by id.
    fn find_competition(&self, id: Uuid)
    -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>>;
    /// Every competition, in creation order.
    fn list_competitions(&self) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>>;
    /// Delete a competition together with its memberships and matches.
    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Store a new team. Names are not unique.
    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a team by id.
    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>>;
    /// Every team, in creation order.
    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;

    /// Register a team to a competition unless it is already registered there.
    fn add_membership(
        &self,
        competition_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>>;
    /// Teams registered to a competition, in registration order.
    fn list_competition_teams(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>>;
    /// Competitions a team is registered to, in registration order.
    fn list_team_competitions(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>>;

    /// Append a batch of matches to the competition, preserving the batch order.
    fn append_matches(
        &self,
        competition_id: Uuid,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Every match recorded for the competition, in insertion order.
    fn list_matches(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;

    /// Cheap round trip proving the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
