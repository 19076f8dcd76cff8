//! Application-level configuration loading: storage backend, shuffle seed and startup seed data.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::{Date, Duration};
use tracing::{info, warn};

use crate::dto::iso_date;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "COMPETITION_SCHEDULER_CONFIG_PATH";
/// Environment variable that overrides the configured storage backend.
const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";

/// Which [`crate::dao::roster_store::RosterStore`] implementation the server installs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps, lost on restart.
    #[default]
    Memory,
    /// MongoDB through the `mongo-store` feature.
    #[serde(alias = "mongodb")]
    Mongo,
}

impl StorageBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "mongo" | "mongodb" => Some(Self::Mongo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    storage_backend: StorageBackend,
    shuffle_seed: Option<u64>,
    seed: Option<SeedData>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults, then
    /// apply environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        backend = ?app_config.storage_backend,
                        seeded = app_config.seed.is_some(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        if let Ok(value) = env::var(STORAGE_BACKEND_ENV) {
            match StorageBackend::parse(&value) {
                Some(backend) => config.storage_backend = backend,
                None => warn!(value = %value, "unknown STORAGE_BACKEND value; keeping configured backend"),
            }
        }
        config
    }

    /// Parse a configuration document.
    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Backend selected by the file and the `STORAGE_BACKEND` override.
    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    /// Seed for reproducible team shuffling; `None` draws from the thread RNG.
    pub fn shuffle_seed(&self) -> Option<u64> {
        self.shuffle_seed
    }

    /// Demo data inserted into an empty store at startup.
    pub fn seed(&self) -> Option<&SeedData> {
        self.seed.as_ref()
    }
}

/// Competitions, teams and registrations created on first start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    /// Competitions, created in order.
    #[serde(default)]
    pub competitions: Vec<SeedCompetition>,
    /// Team names.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Registrations applied after every team exists.
    #[serde(default)]
    pub registrations: Vec<SeedRegistration>,
}

/// Competition created on first start.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCompetition {
    /// Unique competition name, also used by registrations.
    pub name: String,
    /// Sport label.
    pub sport: String,
    /// First day of play.
    pub start: SeedDate,
    /// Last day of play.
    pub end: SeedDate,
    /// Courts available each day.
    pub number_of_courts: u32,
}

/// A calendar date given either literally or relative to the day the server starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedDate {
    /// Days after (or before, when negative) the start day.
    OffsetDays(i64),
    /// A fixed `YYYY-MM-DD` date.
    Date(#[serde(with = "iso_date")] Date),
}

impl SeedDate {
    /// Resolve against `today`; `None` when the offset leaves the supported calendar range.
    pub fn resolve(self, today: Date) -> Option<Date> {
        match self {
            SeedDate::OffsetDays(days) => days
                .checked_mul(86_400)
                .map(Duration::seconds)
                .and_then(|offset| today.checked_add(offset)),
            SeedDate::Date(date) => Some(date),
        }
    }
}

/// Registration of a seeded team, both sides referenced by name.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedRegistration {
    /// Name of a seeded competition.
    pub competition: String,
    /// Name of a seeded team.
    pub team: String,
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    storage: RawStorage,
    #[serde(default)]
    scheduler: RawScheduler,
    seed: Option<SeedData>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStorage {
    #[serde(default)]
    backend: StorageBackend,
}

#[derive(Debug, Default, Deserialize)]
struct RawScheduler {
    shuffle_seed: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            storage_backend: value.storage.backend,
            shuffle_seed: value.scheduler.shuffle_seed,
            seed: value.seed,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.storage_backend(), StorageBackend::Memory);
        assert_eq!(config.shuffle_seed(), None);
        assert!(config.seed().is_none());
    }

    #[test]
    fn parses_every_section() {
        let config = AppConfig::from_json(
            r#"{
                "storage": { "backend": "mongo" },
                "scheduler": { "shuffle_seed": 42 },
                "seed": {
                    "competitions": [{
                        "name": "Spring Open",
                        "sport": "Tennis",
                        "start": { "offset_days": 1 },
                        "end": { "date": "2025-06-01" },
                        "number_of_courts": 2
                    }],
                    "teams": ["Aces", "Volleys"],
                    "registrations": [{ "competition": "Spring Open", "team": "Aces" }]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.storage_backend(), StorageBackend::Mongo);
        assert_eq!(config.shuffle_seed(), Some(42));
        let seed = config.seed().unwrap();
        assert_eq!(seed.competitions[0].start, SeedDate::OffsetDays(1));
        assert_eq!(seed.competitions[0].end, SeedDate::Date(date!(2025 - 06 - 01)));
        assert_eq!(seed.teams, vec!["Aces", "Volleys"]);
        assert_eq!(seed.registrations[0].team, "Aces");
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!(AppConfig::from_json(r#"{ "storage": { "backend": "sqlite" } }"#).is_err());
    }

    #[test]
    fn backend_names_parse_case_insensitively() {
        assert_eq!(StorageBackend::parse(" MongoDB "), Some(StorageBackend::Mongo));
        assert_eq!(StorageBackend::parse("memory"), Some(StorageBackend::Memory));
        assert_eq!(StorageBackend::parse("redis"), None);
    }

    #[test]
    fn seed_dates_resolve_relative_to_today() {
        let today = date!(2025 - 02 - 27);
        assert_eq!(
            SeedDate::OffsetDays(3).resolve(today),
            Some(date!(2025 - 03 - 02))
        );
        assert_eq!(
            SeedDate::OffsetDays(-27).resolve(today),
            Some(date!(2025 - 01 - 31))
        );
        assert_eq!(SeedDate::OffsetDays(i64::MAX / 86_400).resolve(today), None);
        assert_eq!(SeedDate::OffsetDays(i64::MAX).resolve(today), None);
        assert_eq!(SeedDate::OffsetDays(i64::MIN).resolve(today), None);
    }
}
