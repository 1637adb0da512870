//! Taste Match - listener compatibility matching service
//!
//! This library provides the matching engine that compares users' music taste:
//! set-overlap and audio-distance similarity, a filtering pipeline with privacy
//! and block semantics, ranked pagination, and a per-pair explanation report.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{explain_match, jaccard, audio_affinity, calculate_match_score, Matcher, MatchFilters, PageRequest};
pub use models::{Candidate, ExplainReport, MatchScore, ProfilePack, ScoredMatch, TasteSnapshot};
pub use services::{InMemoryTasteSource, MatchService, RankParams, TasteSource};
