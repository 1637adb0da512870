use crate::core::{
    filters::{evaluate_candidate, MatchFilters},
    scoring::round4,
};
use crate::models::{Candidate, ScoredMatch};
use rayon::prelude::*;
use std::cmp::Ordering;

/// Page size used when the caller does not ask for one
pub const DEFAULT_LIMIT: i64 = 20;
/// Largest page the matcher will return
pub const MAX_LIMIT: i64 = 100;
/// Candidate count from which scoring is spread over the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Result of the matching process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    /// Candidates that survived every filter, before pagination
    pub total_qualified: usize,
    /// Cursor of the following page, when there is one
    pub next_cursor: Option<usize>,
}

impl MatchResult {
    pub fn empty() -> Self {
        Self {
            matches: Vec::new(),
            total_qualified: 0,
            next_cursor: None,
        }
    }
}

/// Requested page window, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub cursor: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            cursor: 0,
        }
    }
}

impl PageRequest {
    /// Clamp into `(cursor >= 0, 1 <= limit <= 100)`
    pub fn clamped(&self) -> (usize, usize) {
        let cursor = self.cursor.max(0) as usize;
        let limit = self.limit.clamp(1, MAX_LIMIT) as usize;
        (cursor, limit)
    }
}

/// Main matching orchestrator - filters, scores, ranks and paginates
///
/// # Pipeline Stages
/// 1. Visibility
/// 2. Mutual block
/// 3. Country
/// 4. Minimum shared artists
/// 5. Required genres
/// 6. Minimum score
/// 7. Ranking and pagination
#[derive(Debug, Clone)]
pub struct Matcher {
    parallel_threshold: usize,
}

impl Matcher {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold }
    }

    /// Rank candidates for a requester and return one page
    ///
    /// # Arguments
    /// * `requester` - The user matches are computed for
    /// * `candidates` - Every other user, with packs and settings already loaded
    /// * `filters` - Optional narrowing on top of the privacy rules
    /// * `page` - Requested page window
    ///
    /// # Returns
    /// MatchResult containing the requested page of ranked matches
    pub fn rank_matches(
        &self,
        requester: &Candidate,
        candidates: Vec<Candidate>,
        filters: &MatchFilters,
        page: PageRequest,
    ) -> MatchResult {
        let score_candidate = |candidate: Candidate| -> Option<ScoredMatch> {
            if candidate.user_id == requester.user_id {
                return None;
            }

            let (score, shared) = evaluate_candidate(requester, &candidate, filters)?;

            Some(ScoredMatch {
                user_id: candidate.user_id,
                display_name: candidate.display_name,
                avatar_url: candidate.avatar_url,
                score: round4(score.composite),
                shared_artists_count: shared,
                genre_overlap: round4(score.genre_overlap),
                audio_affinity: round4(score.audio_affinity),
            })
        };

        let mut scored: Vec<ScoredMatch> = if candidates.len() >= self.parallel_threshold {
            candidates.into_par_iter().filter_map(score_candidate).collect()
        } else {
            candidates.into_iter().filter_map(score_candidate).collect()
        };

        sort_matches(&mut scored);

        let total_qualified = scored.len();
        let (matches, next_cursor) = paginate(scored, page);

        tracing::debug!(
            "Ranked {} qualifying candidates for user {}, returning {}",
            total_qualified,
            requester.user_id,
            matches.len()
        );

        MatchResult {
            matches,
            total_qualified,
            next_cursor,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_PARALLEL_THRESHOLD)
    }
}

/// Sort by score (descending), then by user ID (ascending)
pub fn sort_matches(matches: &mut [ScoredMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}

/// Slice `[cursor, cursor + limit)` out of the ranked list
///
/// A cursor past the end yields an empty page.
pub fn paginate(ranked: Vec<ScoredMatch>, page: PageRequest) -> (Vec<ScoredMatch>, Option<usize>) {
    let (cursor, limit) = page.clamped();
    let total = ranked.len();

    let matches: Vec<ScoredMatch> = ranked.into_iter().skip(cursor).take(limit).collect();

    let end = cursor.saturating_add(limit);
    let next_cursor = if end < total { Some(end) } else { None };

    (matches, next_cursor)
}
