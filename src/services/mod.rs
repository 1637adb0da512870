// Service exports
pub mod match_service;
pub mod taste_api;
pub mod taste_source;

pub use match_service::{MatchService, MatchServiceError, RankParams, DEFAULT_MAX_CONCURRENT_LOADS, MATCH_TERM};
pub use taste_api::TasteApiClient;
pub use taste_source::{InMemoryTasteSource, SeedDocument, SeedUser, TasteSource, TasteSourceError, TermSnapshots};
