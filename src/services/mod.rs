/// Competition admission, lookup and deletion.
pub mod competition_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// First-round generation and match listing.
pub mod match_service;
/// Team registration and unassigned-team computation.
pub mod roster_service;
/// Startup seed data loader.
pub mod seed_service;
/// Background storage connection supervisor with exponential backoff.
pub mod storage_supervisor;
/// Team registry operations.
pub mod team_service;
