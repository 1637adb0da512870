// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ArtistRecord, AudioDimension, AudioFeatures, AudioVector, Candidate, MatchScore, ProfilePack,
    RecentPlay, ScoredMatch, TasteSnapshot, Term, TrackRecord, UserId, UserRecord, UserSettings,
};
pub use requests::{ExplainMatchQuery, RankMatchesQuery};
pub use responses::{
    ArtistSuggestion, AudioDelta, ErrorResponse, ExplainReport, ExplainSummary, HealthResponse,
    IcebreakerTrack, RankMatchesResponse, RecentActivity, SharedArtist, SharedGenre,
};
