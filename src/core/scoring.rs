use crate::core::similarity::{audio_affinity, jaccard};
use crate::models::{MatchScore, ProfilePack};

/// Weight of artist-set overlap in the composite score
pub const ARTIST_WEIGHT: f64 = 0.4;
/// Weight of genre-set overlap in the composite score
pub const GENRE_WEIGHT: f64 = 0.2;
/// Weight of audio affinity in the composite score
pub const AUDIO_WEIGHT: f64 = 0.4;

/// Score two taste profiles against each other
///
/// Scoring formula:
/// composite = (
///     artist_overlap * 0.4 +     # Jaccard of artist IDs
///     genre_overlap * 0.2 +      # Jaccard of genre tags
///     audio_affinity * 0.4       # inverted normalized audio distance
/// )
///
/// Symmetric in its arguments.
pub fn calculate_match_score(a: &ProfilePack, b: &ProfilePack) -> MatchScore {
    let artist_overlap = jaccard(a.artist_ids(), b.artist_ids());
    let genre_overlap = jaccard(a.genres(), b.genres());
    let audio_affinity = audio_affinity(a.audio(), b.audio());

    let composite = artist_overlap * ARTIST_WEIGHT
        + genre_overlap * GENRE_WEIGHT
        + audio_affinity * AUDIO_WEIGHT;

    MatchScore {
        artist_overlap,
        genre_overlap,
        audio_affinity,
        composite: composite.clamp(0.0, 1.0),
    }
}

/// Number of artist IDs both profiles share
#[inline]
pub fn shared_artist_count(a: &ProfilePack, b: &ProfilePack) -> usize {
    a.artist_ids().intersection(b.artist_ids()).count()
}

/// Round to 4 decimal places for output
#[inline]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
