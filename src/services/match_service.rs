use crate::core::{explain_match, project, MatchFilters, MatchResult, Matcher, PageRequest};
use crate::models::{Candidate, ExplainReport, Term, UserId, UserRecord};
use crate::services::taste_source::{TasteSource, TasteSourceError};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Window every ranking and explanation reads from
pub const MATCH_TERM: Term = Term::Medium;

/// Candidates loaded from the taste source at the same time
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 16;

/// Errors surfaced by the match service
#[derive(Debug, Error)]
pub enum MatchServiceError {
    #[error("User not found: {0}")]
    NotFound(UserId),

    #[error("Taste source error: {0}")]
    SourceError(#[from] TasteSourceError),

    #[error("Candidate loading task failed: {0}")]
    TaskError(String),
}

/// Parameters of a ranking request
#[derive(Debug, Clone, PartialEq)]
pub struct RankParams {
    pub limit: i64,
    pub cursor: i64,
    pub country: Option<String>,
    pub min_score: Option<f64>,
    pub min_shared_artists: usize,
    pub has_genres: Option<String>,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            limit: crate::core::matcher::DEFAULT_LIMIT,
            cursor: 0,
            country: None,
            min_score: None,
            min_shared_artists: 0,
            has_genres: None,
        }
    }
}

impl RankParams {
    pub fn filters(&self) -> MatchFilters {
        MatchFilters::new(
            self.country.as_deref(),
            self.min_score,
            self.min_shared_artists,
            self.has_genres.as_deref(),
        )
    }

    pub fn page(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            cursor: self.cursor,
        }
    }
}

/// Fetches taste data and runs the matching engine on it
///
/// All I/O happens here; the engine in `core` only ever sees fully loaded,
/// immutable candidates.
pub struct MatchService {
    source: Arc<dyn TasteSource>,
    matcher: Matcher,
    load_permits: Arc<Semaphore>,
}

/// Load settings and taste snapshot of a known user and project them
async fn load_candidate(
    source: &dyn TasteSource,
    user: UserRecord,
) -> Result<Candidate, TasteSourceError> {
    let settings = source.settings(user.user_id).await?.unwrap_or_default();
    let snapshot = source.taste_snapshot(user.user_id, MATCH_TERM).await?;

    Ok(Candidate {
        user_id: user.user_id,
        display_name: user.display_name,
        avatar_url: user.avatar_url,
        pack: project(&snapshot),
        settings,
    })
}

/// Load one listed candidate once a load permit is free
async fn load_by_id(
    source: Arc<dyn TasteSource>,
    permits: Arc<Semaphore>,
    id: UserId,
) -> Result<Option<Candidate>, MatchServiceError> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| MatchServiceError::TaskError(e.to_string()))?;

    match source.user(id).await? {
        Some(user) => Ok(Some(load_candidate(source.as_ref(), user).await?)),
        None => {
            tracing::debug!("Candidate {} vanished before lookup, skipping", id);
            Ok(None)
        }
    }
}

impl MatchService {
    pub fn new(source: Arc<dyn TasteSource>, matcher: Matcher) -> Self {
        Self {
            source,
            matcher,
            load_permits: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_LOADS)),
        }
    }

    /// Bound the number of candidates loaded concurrently (at least 1)
    pub fn with_max_concurrent_loads(mut self, max_concurrent_loads: usize) -> Self {
        self.load_permits = Arc::new(Semaphore::new(max_concurrent_loads.max(1)));
        self
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Load every candidate except the requester, concurrently
    ///
    /// At most `max_concurrent_loads` candidates load at once, counted across
    /// every request of this service. Users that disappear between listing and
    /// lookup are skipped.
    async fn load_candidates(&self, requester_id: UserId) -> Result<Vec<Candidate>, MatchServiceError> {
        let ids = self.source.candidate_user_ids(requester_id).await?;

        let mut tasks = JoinSet::new();
        for id in ids {
            let source = Arc::clone(&self.source);
            let permits = Arc::clone(&self.load_permits);
            tasks.spawn(load_by_id(source, permits, id));
        }

        let mut candidates = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            let loaded = joined.map_err(|e| MatchServiceError::TaskError(e.to_string()))?;
            if let Some(candidate) = loaded? {
                candidates.push(candidate);
            }
        }

        Ok(candidates)
    }

    /// Rank taste-compatible users for `requester_id`
    ///
    /// An unknown requester yields an empty result, not an error.
    pub async fn rank_matches(
        &self,
        requester_id: UserId,
        params: &RankParams,
    ) -> Result<MatchResult, MatchServiceError> {
        let requester = match self.source.user(requester_id).await? {
            Some(user) => load_candidate(self.source.as_ref(), user).await?,
            None => {
                tracing::info!("Unknown requester {}, returning no matches", requester_id);
                return Ok(MatchResult::empty());
            }
        };

        let candidates = self.load_candidates(requester_id).await?;
        tracing::debug!("Loaded {} candidates for {}", candidates.len(), requester_id);

        let matcher = self.matcher.clone();
        let filters = params.filters();
        let page = params.page();

        // scoring is CPU-bound; keep it off the async worker
        let result = tokio::task::spawn_blocking(move || {
            matcher.rank_matches(&requester, candidates, &filters, page)
        })
        .await
        .map_err(|e| MatchServiceError::TaskError(e.to_string()))?;

        Ok(result)
    }

    /// Detailed breakdown of how `user_id` and `other_id` match
    pub async fn explain_match(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> Result<ExplainReport, MatchServiceError> {
        for id in [user_id, other_id] {
            if self.source.user(id).await?.is_none() {
                return Err(MatchServiceError::NotFound(id));
            }
        }

        let me = self.source.taste_snapshot(user_id, MATCH_TERM).await?;
        let other = self.source.taste_snapshot(other_id, MATCH_TERM).await?;

        Ok(explain_match(&me, &other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtistRecord, TasteSnapshot, UserSettings};
    use crate::services::taste_source::{InMemoryTasteSource, SeedUser};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Wraps a source and records the peak number of concurrent `user` lookups
    struct CountingSource {
        inner: InMemoryTasteSource,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl TasteSource for CountingSource {
        async fn user(&self, user_id: UserId) -> Result<Option<UserRecord>, TasteSourceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            let user = self.inner.user(user_id).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            user
        }

        async fn settings(&self, user_id: UserId) -> Result<Option<UserSettings>, TasteSourceError> {
            self.inner.settings(user_id).await
        }

        async fn candidate_user_ids(&self, excluding: UserId) -> Result<Vec<UserId>, TasteSourceError> {
            self.inner.candidate_user_ids(excluding).await
        }

        async fn taste_snapshot(&self, user_id: UserId, term: Term) -> Result<TasteSnapshot, TasteSourceError> {
            self.inner.taste_snapshot(user_id, term).await
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn snapshot(artists: &[&str]) -> TasteSnapshot {
        TasteSnapshot {
            artists: artists
                .iter()
                .enumerate()
                .map(|(i, id)| ArtistRecord {
                    artist_id: id.to_string(),
                    artist_name: id.to_uppercase(),
                    genres: vec!["house".to_string()],
                    popularity: 10,
                    rank: i as u32 + 1,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn service(users: Vec<SeedUser>) -> MatchService {
        MatchService::new(Arc::new(InMemoryTasteSource::new(users)), Matcher::default())
    }

    #[tokio::test]
    async fn test_unknown_requester_gets_empty_list() {
        let service = service(vec![SeedUser::new(2, "Beta")]);
        let result = service.rank_matches(1, &RankParams::default()).await.unwrap();
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn test_rank_uses_medium_term_and_defaults() {
        let service = service(vec![
            SeedUser::new(1, "Alpha").with_taste(Term::Medium, snapshot(&["a1", "a2"])),
            SeedUser::new(2, "Beta").with_taste(Term::Medium, snapshot(&["a2"])),
            SeedUser::new(3, "Gamma").with_taste(Term::Long, snapshot(&["a1", "a2"])),
        ]);

        let result = service.rank_matches(1, &RankParams::default()).await.unwrap();

        let ids: Vec<i64> = result.matches.iter().map(|m| m.user_id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(result.matches[0].shared_artists_count, 1);
        assert_eq!(result.matches[1].shared_artists_count, 0);
    }

    #[tokio::test]
    async fn test_explain_not_found() {
        let service = service(vec![SeedUser::new(1, "Alpha")]);

        let err = service.explain_match(1, 5).await.unwrap_err();
        assert!(matches!(err, MatchServiceError::NotFound(5)));

        let err = service.explain_match(7, 1).await.unwrap_err();
        assert!(matches!(err, MatchServiceError::NotFound(7)));
    }

    #[tokio::test]
    async fn test_explain_ignores_privacy() {
        let service = service(vec![
            SeedUser::new(1, "Alpha").with_taste(Term::Medium, snapshot(&["a1"])),
            SeedUser::new(2, "Beta")
                .with_taste(Term::Medium, snapshot(&["a1"]))
                .with_settings(UserSettings { is_public: false, ..Default::default() }),
        ]);

        let report = service.explain_match(1, 2).await.unwrap();
        assert_eq!(report.summary.shared_artists_count, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_candidate_loads_are_bounded() {
        let users = (1..=200)
            .map(|id| SeedUser::new(id, "Listener").with_taste(Term::Medium, snapshot(&["a1"])))
            .collect();
        let source = Arc::new(CountingSource {
            inner: InMemoryTasteSource::new(users),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let service = MatchService::new(source.clone(), Matcher::default()).with_max_concurrent_loads(4);

        let params = RankParams { limit: 100, ..RankParams::default() };
        let result = service.rank_matches(1, &params).await.unwrap();

        assert_eq!(result.total_qualified, 199);
        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 4, "peak in-flight loads was {}", peak);
    }

    #[tokio::test]
    async fn test_zero_load_limit_still_makes_progress() {
        let service = service(vec![SeedUser::new(1, "Alpha"), SeedUser::new(2, "Beta")]).with_max_concurrent_loads(0);
        let result = service.rank_matches(1, &RankParams::default()).await.unwrap();
        assert_eq!(result.total_qualified, 1);
    }
}
