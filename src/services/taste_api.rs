use crate::models::{TasteSnapshot, Term, UserId, UserRecord, UserSettings};
use crate::services::taste_source::{TasteSource, TasteSourceError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Settings document as stored upstream; blocked IDs are a CSV string
#[derive(Debug, Deserialize)]
struct StoredSettings {
    #[serde(rename = "isPublic", default)]
    is_public: Option<bool>,
    #[serde(rename = "allowMessages", default)]
    allow_messages: Option<bool>,
    #[serde(default)]
    country: Option<String>,
    #[serde(rename = "blockedUserIds", default)]
    blocked_user_ids: Option<String>,
}

impl From<StoredSettings> for UserSettings {
    fn from(stored: StoredSettings) -> Self {
        Self {
            is_public: stored.is_public.unwrap_or(true),
            allow_messages: stored.allow_messages.unwrap_or(true),
            country: stored.country.filter(|c| !c.trim().is_empty()),
            blocked_user_ids: UserSettings::parse_blocked_csv(stored.blocked_user_ids.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserIdList {
    #[serde(rename = "userIds", default)]
    user_ids: Vec<UserId>,
}

/// Taste-data API client
///
/// Reads users, settings and listening snapshots from the upstream profile
/// service. A 404 from any endpoint means "absent", not failure.
pub struct TasteApiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl TasteApiClient {
    /// Create a new API client
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, TasteSourceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// GET a JSON document, mapping 404 to `None`
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, TasteSourceError> {
        let url = self.url(path);
        tracing::debug!("Fetching taste data from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Taste API request to {} failed: {} - {}", path, status, body);
            return Err(TasteSourceError::ApiError(format!("{} returned {}", path, status)));
        }

        let value = response
            .json::<T>()
            .await
            .map_err(|e| TasteSourceError::InvalidResponse(format!("Failed to parse {}: {}", path, e)))?;

        Ok(Some(value))
    }
}

#[async_trait]
impl TasteSource for TasteApiClient {
    async fn user(&self, user_id: UserId) -> Result<Option<UserRecord>, TasteSourceError> {
        self.get_json(&format!("/users/{}", user_id), &[]).await
    }

    async fn settings(&self, user_id: UserId) -> Result<Option<UserSettings>, TasteSourceError> {
        let stored: Option<StoredSettings> = self
            .get_json(&format!("/users/{}/settings", user_id), &[])
            .await?;
        Ok(stored.map(UserSettings::from))
    }

    async fn candidate_user_ids(&self, excluding: UserId) -> Result<Vec<UserId>, TasteSourceError> {
        let list: Option<UserIdList> = self
            .get_json("/users", &[("exclude", excluding.to_string())])
            .await?;

        Ok(list
            .map(|l| l.user_ids.into_iter().filter(|id| *id != excluding).collect())
            .unwrap_or_default())
    }

    async fn taste_snapshot(&self, user_id: UserId, term: Term) -> Result<TasteSnapshot, TasteSourceError> {
        let snapshot: Option<TasteSnapshot> = self
            .get_json(
                &format!("/users/{}/taste", user_id),
                &[("term", term.as_str().to_string())],
            )
            .await?;
        Ok(snapshot.unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
