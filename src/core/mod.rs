// Core algorithm exports
pub mod explain;
pub mod filters;
pub mod matcher;
pub mod projector;
pub mod scoring;
pub mod similarity;

pub use explain::explain_match;
pub use filters::{evaluate_candidate, parse_genre_filter, MatchFilters};
pub use matcher::{MatchResult, Matcher, PageRequest};
pub use projector::project;
pub use scoring::{calculate_match_score, round4, shared_artist_count};
pub use similarity::{audio_affinity, jaccard, normalize_audio};
