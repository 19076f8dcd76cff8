use std::{collections::HashMap, sync::Arc};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::{MongoConfig, ping},
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        MongoCompetitionDocument, MongoMatchDocument, MongoMembershipDocument, MongoTeamDocument,
        id_key,
    },
};
use crate::dao::{
    models::{CompetitionEntity, MatchEntity, TeamEntity},
    roster_store::{InsertOutcome, RosterStore},
    storage::StorageResult,
};

const COMPETITION_COLLECTION_NAME: &str = "competitions";
const TEAM_COLLECTION_NAME: &str = "teams";
const MEMBERSHIP_COLLECTION_NAME: &str = "memberships";
const MATCH_COLLECTION_NAME: &str = "matches";
/// Collections keyed by `competition_id`, emptied before the competition itself is deleted.
const CASCADE_COLLECTION_NAMES: [&str; 2] = [MATCH_COLLECTION_NAME, MEMBERSHIP_COLLECTION_NAME];

#[derive(Clone)]
pub struct MongoRosterStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // Kept alive alongside the database handle it produced.
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn check_health(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        ping(&database)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = self.config.open().await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoRosterStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = config.open().await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .name(Some(name.to_owned()))
                .unique(Some(true))
                .build()
        };

        let competition_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(unique("competition_name_idx"))
            .build();
        self.competitions()
            .await
            .create_index(competition_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: COMPETITION_COLLECTION_NAME,
                index: "name",
                source,
            })?;

        let membership_index = IndexModel::builder()
            .keys(doc! { "competition_id": 1, "team_id": 1 })
            .options(unique("membership_pair_idx"))
            .build();
        self.memberships()
            .await
            .create_index(membership_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MEMBERSHIP_COLLECTION_NAME,
                index: "competition_id,team_id",
                source,
            })?;

        let match_index = IndexModel::builder()
            .keys(doc! { "competition_id": 1, "sequence": 1 })
            .options(
                IndexOptions::builder()
                    .name(Some("match_competition_idx".to_owned()))
                    .build(),
            )
            .build();
        self.matches()
            .await
            .create_index(match_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: MATCH_COLLECTION_NAME,
                index: "competition_id,sequence",
                source,
            })?;

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn competitions(&self) -> Collection<MongoCompetitionDocument> {
        self.database().await.collection(COMPETITION_COLLECTION_NAME)
    }

    async fn teams(&self) -> Collection<MongoTeamDocument> {
        self.database().await.collection(TEAM_COLLECTION_NAME)
    }

    async fn memberships(&self) -> Collection<MongoMembershipDocument> {
        self.database().await.collection(MEMBERSHIP_COLLECTION_NAME)
    }

    async fn matches(&self) -> Collection<MongoMatchDocument> {
        self.database().await.collection(MATCH_COLLECTION_NAME)
    }

    async fn insert_competition(&self, competition: CompetitionEntity) -> MongoResult<InsertOutcome> {
        let id = competition.id;
        let document: MongoCompetitionDocument = competition.into();
        match self.competitions().await.insert_one(&document).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if is_duplicate_key(&err) => Ok(InsertOutcome::Duplicate),
            Err(source) => Err(MongoDaoError::SaveCompetition { id, source }),
        }
    }

    async fn find_competition(&self, id: Uuid) -> MongoResult<Option<CompetitionEntity>> {
        self.competitions()
            .await
            .find_one(doc! { "_id": id_key(id) })
            .await
            .map_err(|source| MongoDaoError::LoadCompetition { id, source })?
            .map(CompetitionEntity::try_from)
            .transpose()
    }

    async fn list_competitions(&self) -> MongoResult<Vec<CompetitionEntity>> {
        let documents: Vec<MongoCompetitionDocument> = self
            .competitions()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListCompetitions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCompetitions { source })?;

        documents.into_iter().map(CompetitionEntity::try_from).collect()
    }

    async fn delete_competition(&self, id: Uuid) -> MongoResult<bool> {
        let key = id_key(id);
        let database = self.database().await;

        // Children go first so a failed cascade leaves the competition in place for a retry.
        for name in CASCADE_COLLECTION_NAMES {
            database
                .collection::<Document>(name)
                .delete_many(doc! { "competition_id": key.as_str() })
                .await
                .map_err(|source| MongoDaoError::DeleteCompetition { id, source })?;
        }
        let result = database
            .collection::<MongoCompetitionDocument>(COMPETITION_COLLECTION_NAME)
            .delete_one(doc! { "_id": key.as_str() })
            .await
            .map_err(|source| MongoDaoError::DeleteCompetition { id, source })?;

        Ok(result.deleted_count > 0)
    }

    async fn insert_team(&self, team: TeamEntity) -> MongoResult<()> {
        let id = team.id;
        let document: MongoTeamDocument = team.into();
        self.teams()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveTeam { id, source })?;
        Ok(())
    }

    async fn find_team(&self, id: Uuid) -> MongoResult<Option<TeamEntity>> {
        self.teams()
            .await
            .find_one(doc! { "_id": id_key(id) })
            .await
            .map_err(|source| MongoDaoError::LoadTeam { id, source })?
            .map(TeamEntity::try_from)
            .transpose()
    }

    async fn list_teams(&self) -> MongoResult<Vec<TeamEntity>> {
        let documents: Vec<MongoTeamDocument> = self
            .teams()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?;

        documents.into_iter().map(TeamEntity::try_from).collect()
    }

    async fn add_membership(&self, competition_id: Uuid, team_id: Uuid) -> MongoResult<InsertOutcome> {
        let memberships = self.memberships().await;
        let sequence = memberships
            .count_documents(doc! { "competition_id": id_key(competition_id) })
            .await
            .map_err(|source| MongoDaoError::SaveMembership {
                competition_id,
                team_id,
                source,
            })?;

        let document = MongoMembershipDocument {
            competition_id: id_key(competition_id),
            team_id: id_key(team_id),
            sequence: i64::try_from(sequence).unwrap_or(i64::MAX),
        };
        match memberships.insert_one(&document).await {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(err) if is_duplicate_key(&err) => Ok(InsertOutcome::Duplicate),
            Err(source) => Err(MongoDaoError::SaveMembership {
                competition_id,
                team_id,
                source,
            }),
        }
    }

    async fn find_memberships(
        &self,
        filter: mongodb::bson::Document,
    ) -> MongoResult<Vec<MongoMembershipDocument>> {
        self.memberships()
            .await
            .find(filter)
            .sort(doc! { "sequence": 1 })
            .await
            .map_err(|source| MongoDaoError::LoadMemberships { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadMemberships { source })
    }

    async fn list_competition_teams(&self, competition_id: Uuid) -> MongoResult<Vec<TeamEntity>> {
        let team_ids: Vec<String> = self
            .find_memberships(doc! { "competition_id": id_key(competition_id) })
            .await?
            .into_iter()
            .map(|membership| membership.team_id)
            .collect();
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<MongoTeamDocument> = self
            .teams()
            .await
            .find(doc! { "_id": { "$in": team_ids.clone() } })
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListTeams { source })?;

        let mut by_id: HashMap<String, MongoTeamDocument> = documents
            .into_iter()
            .map(|document| (document.id.clone(), document))
            .collect();

        // Registration order comes from the membership sequence, not the team collection.
        team_ids
            .iter()
            .filter_map(|team_id| by_id.remove(team_id))
            .map(TeamEntity::try_from)
            .collect()
    }

    async fn list_team_competitions(&self, team_id: Uuid) -> MongoResult<Vec<CompetitionEntity>> {
        let competition_ids: Vec<String> = self
            .find_memberships(doc! { "team_id": id_key(team_id) })
            .await?
            .into_iter()
            .map(|membership| membership.competition_id)
            .collect();
        if competition_ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<MongoCompetitionDocument> = self
            .competitions()
            .await
            .find(doc! { "_id": { "$in": competition_ids.clone() } })
            .await
            .map_err(|source| MongoDaoError::ListCompetitions { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListCompetitions { source })?;

        let mut by_id: HashMap<String, MongoCompetitionDocument> = documents
            .into_iter()
            .map(|document| (document.id.clone(), document))
            .collect();

        competition_ids
            .iter()
            .filter_map(|competition_id| by_id.remove(competition_id))
            .map(CompetitionEntity::try_from)
            .collect()
    }

    async fn append_matches(
        &self,
        competition_id: Uuid,
        matches: Vec<MatchEntity>,
    ) -> MongoResult<()> {
        if matches.is_empty() {
            return Ok(());
        }

        let collection = self.matches().await;
        let offset = collection
            .count_documents(doc! { "competition_id": id_key(competition_id) })
            .await
            .map_err(|source| MongoDaoError::SaveMatches {
                competition_id,
                source,
            })?;
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        let documents: Vec<MongoMatchDocument> = matches
            .into_iter()
            .zip(offset..)
            .map(Into::into)
            .collect();

        collection
            .insert_many(documents)
            .await
            .map_err(|source| MongoDaoError::SaveMatches {
                competition_id,
                source,
            })?;
        Ok(())
    }

    async fn list_matches(&self, competition_id: Uuid) -> MongoResult<Vec<MatchEntity>> {
        let documents: Vec<MongoMatchDocument> = self
            .matches()
            .await
            .find(doc! { "competition_id": id_key(competition_id) })
            .sort(doc! { "sequence": 1 })
            .await
            .map_err(|source| MongoDaoError::LoadMatches {
                competition_id,
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadMatches {
                competition_id,
                source,
            })?;

        documents.into_iter().map(MatchEntity::try_from).collect()
    }
}

impl RosterStore for MongoRosterStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    fn insert_competition(
        &self,
        competition: CompetitionEntity,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>> {
        let store = self.clone();
        Box::pin(async move { store.insert_competition(competition).await.map_err(Into::into) })
    }

    fn find_competition(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_competition(id).await.map_err(Into::into) })
    }

    fn list_competitions(&self) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_competitions().await.map_err(Into::into) })
    }

    fn delete_competition(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_competition(id).await.map_err(Into::into) })
    }

    fn insert_team(&self, team: TeamEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_team(team).await.map_err(Into::into) })
    }

    fn find_team(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_team(id).await.map_err(Into::into) })
    }

    fn list_teams(&self) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_teams().await.map_err(Into::into) })
    }

    fn add_membership(
        &self,
        competition_id: Uuid,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<InsertOutcome>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .add_membership(competition_id, team_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_competition_teams(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<TeamEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_competition_teams(competition_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_team_competitions(
        &self,
        team_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<CompetitionEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_team_competitions(team_id).await.map_err(Into::into) })
    }

    fn append_matches(
        &self,
        competition_id: Uuid,
        matches: Vec<MatchEntity>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .append_matches(competition_id, matches)
                .await
                .map_err(Into::into)
        })
    }

    fn list_matches(
        &self,
        competition_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_matches(competition_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.check_health().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_covers_every_competition_child_but_not_the_competition() {
        assert!(CASCADE_COLLECTION_NAMES.contains(&MATCH_COLLECTION_NAME));
        assert!(CASCADE_COLLECTION_NAMES.contains(&MEMBERSHIP_COLLECTION_NAME));
        assert!(!CASCADE_COLLECTION_NAMES.contains(&COMPETITION_COLLECTION_NAME));
        assert!(!CASCADE_COLLECTION_NAMES.contains(&TEAM_COLLECTION_NAME));
    }
}
