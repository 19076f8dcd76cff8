use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE_NAME: &str = "competitions";
const PING_ATTEMPTS: u32 = 10;
const FIRST_PING_RETRY: Duration = Duration::from_millis(250);
const MAX_PING_RETRY: Duration = Duration::from_secs(5);

/// Connection settings for the MongoDB backend.
#[derive(Clone)]
pub struct MongoConfig {
    pub options: ClientOptions,
    pub database_name: String,
}

impl MongoConfig {
    /// Parse the connection URI; the database defaults to `competitions`.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;

        Ok(Self {
            options,
            database_name: db_name.unwrap_or(DEFAULT_DATABASE_NAME).to_owned(),
        })
    }

    /// Build a client and wait, with a short bounded backoff, until the server answers a ping.
    pub(super) async fn open(&self) -> MongoResult<(Client, Database)> {
        let client = Client::with_options(self.options.clone())
            .map_err(|source| MongoDaoError::ClientConstruction { source })?;
        let database = client.database(&self.database_name);

        let mut retry_in = FIRST_PING_RETRY;
        let mut attempts = 0;
        loop {
            attempts += 1;
            match ping(&database).await {
                Ok(()) => return Ok((client, database)),
                Err(source) if attempts >= PING_ATTEMPTS => {
                    return Err(MongoDaoError::InitialPing { attempts, source });
                }
                Err(_) => {
                    sleep(retry_in).await;
                    retry_in = (retry_in * 2).min(MAX_PING_RETRY);
                }
            }
        }
    }
}

pub(super) async fn ping(database: &Database) -> Result<(), mongodb::error::Error> {
    database.run_command(doc! { "ping": 1 }).await.map(drop)
}
