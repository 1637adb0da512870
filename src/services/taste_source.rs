use crate::models::{TasteSnapshot, Term, UserId, UserRecord, UserSettings};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when reading taste data
#[derive(Debug, Error)]
pub enum TasteSourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Seed data error: {0}")]
    SeedError(String),
}

/// Read-only access to users and their listening data
///
/// Absent data is reported as `None` or an empty snapshot, never as an error;
/// errors are reserved for the source itself failing.
#[async_trait]
pub trait TasteSource: Send + Sync {
    /// Display info of a user, `None` if the user does not exist
    async fn user(&self, user_id: UserId) -> Result<Option<UserRecord>, TasteSourceError>;

    /// Stored settings, `None` if the user never saved any
    async fn settings(&self, user_id: UserId) -> Result<Option<UserSettings>, TasteSourceError>;

    /// IDs of every user other than `excluding`, in source order
    async fn candidate_user_ids(&self, excluding: UserId) -> Result<Vec<UserId>, TasteSourceError>;

    /// Raw taste records for one term
    async fn taste_snapshot(&self, user_id: UserId, term: Term) -> Result<TasteSnapshot, TasteSourceError>;

    /// Source name for logging
    fn name(&self) -> &'static str;
}

/// Per-term snapshots of a seeded user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TermSnapshots {
    #[serde(default)]
    pub short: Option<TasteSnapshot>,
    #[serde(default)]
    pub medium: Option<TasteSnapshot>,
    #[serde(default)]
    pub long: Option<TasteSnapshot>,
}

impl TermSnapshots {
    fn get(&self, term: Term) -> Option<&TasteSnapshot> {
        match term {
            Term::Short => self.short.as_ref(),
            Term::Medium => self.medium.as_ref(),
            Term::Long => self.long.as_ref(),
        }
    }
}

/// One user of a seed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub settings: Option<UserSettings>,
    #[serde(default)]
    pub taste: TermSnapshots,
}

impl SeedUser {
    pub fn new(user_id: UserId, display_name: &str) -> Self {
        Self {
            user_id,
            display_name: Some(display_name.to_string()),
            avatar_url: None,
            settings: None,
            taste: TermSnapshots::default(),
        }
    }

    pub fn with_settings(mut self, settings: UserSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_taste(mut self, term: Term, snapshot: TasteSnapshot) -> Self {
        match term {
            Term::Short => self.taste.short = Some(snapshot),
            Term::Medium => self.taste.medium = Some(snapshot),
            Term::Long => self.taste.long = Some(snapshot),
        }
        self
    }
}

/// JSON document an in-memory source is loaded from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedDocument {
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

/// Immutable in-memory taste source
///
/// Used for local runs and tests. Users iterate in ascending ID order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTasteSource {
    users: BTreeMap<UserId, SeedUser>,
}

impl InMemoryTasteSource {
    pub fn new(users: Vec<SeedUser>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.user_id, u)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, TasteSourceError> {
        let document: SeedDocument = serde_json::from_str(json)
            .map_err(|e| TasteSourceError::SeedError(format!("Failed to parse seed: {}", e)))?;
        Ok(Self::new(document.users))
    }

    /// Load a seed document from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TasteSourceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            TasteSourceError::SeedError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let source = Self::from_json(&json)?;
        tracing::info!("Loaded {} seeded users from {}", source.len(), path.display());
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl TasteSource for InMemoryTasteSource {
    async fn user(&self, user_id: UserId) -> Result<Option<UserRecord>, TasteSourceError> {
        Ok(self.users.get(&user_id).map(|u| UserRecord {
            user_id: u.user_id,
            display_name: u.display_name.clone(),
            avatar_url: u.avatar_url.clone(),
        }))
    }

    async fn settings(&self, user_id: UserId) -> Result<Option<UserSettings>, TasteSourceError> {
        Ok(self.users.get(&user_id).and_then(|u| u.settings.clone()))
    }

    async fn candidate_user_ids(&self, excluding: UserId) -> Result<Vec<UserId>, TasteSourceError> {
        Ok(self.users.keys().copied().filter(|id| *id != excluding).collect())
    }

    async fn taste_snapshot(&self, user_id: UserId, term: Term) -> Result<TasteSnapshot, TasteSourceError> {
        Ok(self
            .users
            .get(&user_id)
            .and_then(|u| u.taste.get(term))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
