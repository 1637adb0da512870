use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Numeric user identifier, as issued by the account service
pub type UserId = i64;

/// Audio attributes in fixed dimension order, see [`AudioDimension::ALL`]
pub type AudioVector = [f64; 6];

/// Listening-history window of the music provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Term {
    Short,
    #[default]
    Medium,
    Long,
}

impl Term {
    pub fn as_str(&self) -> &'static str {
        match self {
            Term::Short => "short",
            Term::Medium => "medium",
            Term::Long => "long",
        }
    }
}

/// Display info for a user known to the account service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// Privacy and discovery settings of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "isPublic", default = "default_true")]
    pub is_public: bool,
    #[serde(rename = "allowMessages", default = "default_true")]
    pub allow_messages: bool,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(rename = "blockedUserIds", default)]
    pub blocked_user_ids: HashSet<UserId>,
}

fn default_true() -> bool { true }

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            is_public: true,
            allow_messages: true,
            country: None,
            blocked_user_ids: HashSet::new(),
        }
    }
}

impl UserSettings {
    /// Whether this user has blocked `user_id`
    #[inline]
    pub fn blocks(&self, user_id: UserId) -> bool {
        self.blocked_user_ids.contains(&user_id)
    }

    /// Parse a comma-separated list of blocked user IDs.
    ///
    /// Blank and non-numeric tokens are skipped silently.
    pub fn parse_blocked_csv(csv: Option<&str>) -> HashSet<UserId> {
        csv.unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| token.parse::<UserId>().ok())
            .collect()
    }
}

/// One of a user's top artists for a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRecord {
    #[serde(rename = "artistId")]
    pub artist_id: String,
    #[serde(rename = "artistName", default)]
    pub artist_name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    pub rank: u32,
}

/// One of a user's top tracks for a term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "trackName", default)]
    pub track_name: String,
    #[serde(rename = "artistIds", default)]
    pub artist_ids: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
    pub rank: u32,
}

/// A recently played track, in the order the provider reported it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPlay {
    #[serde(rename = "trackId")]
    pub track_id: String,
    #[serde(rename = "trackName", default)]
    pub track_name: String,
    #[serde(rename = "artistIds", default)]
    pub artist_ids: Vec<String>,
    #[serde(rename = "playedAt", default)]
    pub played_at: Option<DateTime<Utc>>,
}

/// Raw audio attributes, either per track or as a user's centroid
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub tempo: f64,
    pub energy: f64,
    pub valence: f64,
    pub danceability: f64,
    pub acousticness: f64,
    pub loudness: f64,
}

impl AudioFeatures {
    pub fn to_vector(&self) -> AudioVector {
        [
            self.tempo,
            self.energy,
            self.valence,
            self.danceability,
            self.acousticness,
            self.loudness,
        ]
    }
}

/// Everything the taste source knows about one user for one term
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasteSnapshot {
    #[serde(default)]
    pub artists: Vec<ArtistRecord>,
    #[serde(default)]
    pub tracks: Vec<TrackRecord>,
    /// Stored audio centroid; derived from `track_features` when absent
    #[serde(rename = "audioProfile", default)]
    pub audio_profile: Option<AudioFeatures>,
    #[serde(rename = "trackFeatures", default)]
    pub track_features: Vec<AudioFeatures>,
    #[serde(rename = "recentPlays", default)]
    pub recent_plays: Vec<RecentPlay>,
}

/// The six audio dimensions, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioDimension {
    Tempo,
    Energy,
    Valence,
    Danceability,
    Acousticness,
    Loudness,
}

impl AudioDimension {
    pub const ALL: [AudioDimension; 6] = [
        AudioDimension::Tempo,
        AudioDimension::Energy,
        AudioDimension::Valence,
        AudioDimension::Danceability,
        AudioDimension::Acousticness,
        AudioDimension::Loudness,
    ];
}

/// Normalized taste representation of one user
///
/// Built once per request by the projector and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePack {
    artist_ids: HashSet<String>,
    genres: HashSet<String>,
    audio: AudioVector,
}

impl ProfilePack {
    pub fn new(artist_ids: HashSet<String>, genres: HashSet<String>, audio: AudioVector) -> Self {
        Self { artist_ids, genres, audio }
    }

    pub fn artist_ids(&self) -> &HashSet<String> {
        &self.artist_ids
    }

    pub fn genres(&self) -> &HashSet<String> {
        &self.genres
    }

    /// Raw (un-normalized) audio vector
    pub fn audio(&self) -> &AudioVector {
        &self.audio
    }
}

/// Similarity of two profiles, every field in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    pub artist_overlap: f64,
    pub genre_overlap: f64,
    pub audio_affinity: f64,
    pub composite: f64,
}

/// A user considered for ranking, or the requester being ranked against
#[derive(Debug, Clone)]
pub struct Candidate {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub pack: ProfilePack,
    pub settings: UserSettings,
}

/// Scored match result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub score: f64,
    #[serde(rename = "sharedArtistsCount")]
    pub shared_artists_count: usize,
    #[serde(rename = "genreOverlap")]
    pub genre_overlap: f64,
    #[serde(rename = "audioAffinity")]
    pub audio_affinity: f64,
}
