/// Database model definitions.
pub mod models;
/// Competition, team, membership and match persistence.
pub mod roster_store;
/// Storage abstraction layer for database operations.
pub mod storage;
