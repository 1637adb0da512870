use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query string of the ranked matches endpoint
///
/// `limit` and `cursor` are coerced into range by the matcher rather than rejected.
/// Any `userId` is accepted; an unknown requester simply has no matches.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankMatchesQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub cursor: i64,
    #[serde(default)]
    pub country: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(alias = "min_score", rename = "minScore", default)]
    pub min_score: Option<f64>,
    #[validate(range(min = 0))]
    #[serde(alias = "min_shared_artists", rename = "minSharedArtists", default)]
    pub min_shared_artists: i64,
    #[serde(alias = "has_genres", rename = "hasGenres", default)]
    pub has_genres: Option<String>,
}

/// Query string of the explain endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExplainMatchQuery {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: i64,
    #[serde(alias = "other_id", rename = "otherId")]
    pub other_id: i64,
}
