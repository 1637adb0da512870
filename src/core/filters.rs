use crate::core::scoring::{calculate_match_score, shared_artist_count};
use crate::models::{Candidate, MatchScore, ProfilePack};
use std::collections::HashSet;

/// Optional narrowing applied on top of the privacy rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchFilters {
    /// Country code compared case-insensitively
    pub country: Option<String>,
    /// Minimum composite score (unrounded)
    pub min_score: Option<f64>,
    /// Minimum number of shared artists; 0 disables the check
    pub min_shared_artists: usize,
    /// Lower-cased genres, candidate must carry at least one; empty disables the check
    pub required_genres: HashSet<String>,
}

impl MatchFilters {
    /// Build filters from raw request values
    ///
    /// A blank country and a genre list that parses to nothing are treated as absent.
    pub fn new(
        country: Option<&str>,
        min_score: Option<f64>,
        min_shared_artists: usize,
        has_genres: Option<&str>,
    ) -> Self {
        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Self {
            country,
            min_score,
            min_shared_artists,
            required_genres: has_genres.map(parse_genre_filter).unwrap_or_default(),
        }
    }
}

/// Parse a comma-separated genre filter into a lower-cased set
pub fn parse_genre_filter(csv: &str) -> HashSet<String> {
    csv.split(',')
        .map(|genre| genre.trim().to_lowercase())
        .filter(|genre| !genre.is_empty())
        .collect()
}

/// Stage 1: private profiles never appear in rankings
#[inline]
pub fn is_visible(candidate: &Candidate) -> bool {
    candidate.settings.is_public
}

/// Stage 2: a block in either direction hides both users from each other
#[inline]
pub fn is_blocked_either_way(requester: &Candidate, candidate: &Candidate) -> bool {
    requester.settings.blocks(candidate.user_id) || candidate.settings.blocks(requester.user_id)
}

/// Stage 3: country filter; candidates without a country fail an active filter
#[inline]
pub fn matches_country(candidate: &Candidate, country: Option<&str>) -> bool {
    match country {
        None => true,
        Some(wanted) => candidate
            .settings
            .country
            .as_deref()
            .map(|c| c.trim().eq_ignore_ascii_case(wanted))
            .unwrap_or(false),
    }
}

/// Stage 5: any-of genre filter, case-insensitive
#[inline]
pub fn has_any_genre(pack: &ProfilePack, required: &HashSet<String>) -> bool {
    if required.is_empty() {
        return true;
    }
    pack.genres()
        .iter()
        .any(|genre| required.contains(&genre.trim().to_lowercase()))
}

/// Run a candidate through every stage in order
///
/// Returns the score and shared-artist count of a surviving candidate, `None`
/// as soon as one stage rejects it.
pub fn evaluate_candidate(
    requester: &Candidate,
    candidate: &Candidate,
    filters: &MatchFilters,
) -> Option<(MatchScore, usize)> {
    if !is_visible(candidate) {
        return None;
    }

    if is_blocked_either_way(requester, candidate) {
        return None;
    }

    if !matches_country(candidate, filters.country.as_deref()) {
        return None;
    }

    // Stage 4: minimum shared artists
    let shared = shared_artist_count(&requester.pack, &candidate.pack);
    if filters.min_shared_artists > 0 && shared < filters.min_shared_artists {
        return None;
    }

    if !has_any_genre(&candidate.pack, &filters.required_genres) {
        return None;
    }

    // Stage 6: minimum score
    let score = calculate_match_score(&requester.pack, &candidate.pack);
    if let Some(min_score) = filters.min_score {
        if score.composite < min_score {
            return None;
        }
    }

    Some((score, shared))
}
