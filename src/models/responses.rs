use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::models::domain::{AudioDimension, ScoredMatch};

/// Response for the ranked matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankMatchesResponse {
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<usize>,
    pub count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Side-by-side comparison of two listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainReport {
    pub summary: ExplainSummary,
    pub shared_artists: Vec<SharedArtist>,
    pub shared_genres: Vec<SharedGenre>,
    pub audio_breakdown: Vec<AudioDelta>,
    pub suggestions_new_artists: Vec<ArtistSuggestion>,
    pub icebreaker_tracks: Vec<IcebreakerTrack>,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainSummary {
    pub score: f64,
    pub shared_artists_count: usize,
    pub genre_overlap: f64,
    pub audio_affinity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedArtist {
    pub id: String,
    pub name: String,
    pub rank_me: u32,
    pub rank_other: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedGenre {
    pub genre: String,
    pub me_count: usize,
    pub other_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDelta {
    pub dimension: AudioDimension,
    pub me_raw: f64,
    pub other_raw: f64,
    pub me_normalized: f64,
    pub other_normalized: f64,
    pub abs_delta_normalized: f64,
}

/// An artist the other listener plays that the requester does not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSuggestion {
    pub id: String,
    pub name: String,
    pub rank: u32,
    pub genres: Vec<String>,
    pub overlap_genres: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcebreakerTrack {
    pub id: String,
    pub name: String,
    pub artist_ids: Vec<String>,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: String,
    pub name: String,
    pub artist_ids: Vec<String>,
    pub played_at: Option<DateTime<Utc>>,
}
