use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ErrorResponse, ExplainMatchQuery, HealthResponse, RankMatchesQuery, RankMatchesResponse};
use crate::services::{MatchService, MatchServiceError, RankParams};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MatchService>,
    pub default_limit: i64,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches", web::get().to(rank_matches))
        .route("/matches/explain", web::get().to(explain_match));
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

fn service_error(err: MatchServiceError) -> HttpResponse {
    match err {
        MatchServiceError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse {
            error: "User not found".to_string(),
            message: err.to_string(),
            status_code: 404,
        }),
        MatchServiceError::SourceError(_) => {
            tracing::error!("Taste source failure: {}", err);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Failed to fetch taste data".to_string(),
                message: err.to_string(),
                status_code: 502,
            })
        }
        MatchServiceError::TaskError(_) => {
            tracing::error!("Matching failed: {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching failed".to_string(),
                message: err.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::trace!("Health check (source: {})", state.service.source_name());

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked matches endpoint
///
/// GET /api/v1/matches?userId={id}&limit=20&cursor=0&country=US&minScore=0.5&minSharedArtists=1&hasGenres=techno,house
async fn rank_matches(
    state: web::Data<AppState>,
    query: web::Query<RankMatchesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for rank_matches request: {:?}", errors);
        return validation_failed(errors);
    }

    let query = query.into_inner();
    let params = RankParams {
        limit: query.limit.unwrap_or(state.default_limit),
        cursor: query.cursor,
        country: query.country,
        min_score: query.min_score,
        min_shared_artists: query.min_shared_artists.max(0) as usize,
        has_genres: query.has_genres,
    };

    tracing::info!("Ranking matches for user: {}, limit: {}, cursor: {}", query.user_id, params.limit, params.cursor);

    match state.service.rank_matches(query.user_id, &params).await {
        Ok(result) => {
            tracing::info!(
                "Returning {} matches for user {} (from {} qualifying)",
                result.matches.len(),
                query.user_id,
                result.total_qualified
            );
            HttpResponse::Ok().json(RankMatchesResponse {
                count: result.matches.len(),
                matches: result.matches,
                next_cursor: result.next_cursor,
            })
        }
        Err(e) => service_error(e),
    }
}

/// Match explanation endpoint
///
/// GET /api/v1/matches/explain?userId={id}&otherId={id}
async fn explain_match(
    state: web::Data<AppState>,
    query: web::Query<ExplainMatchQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    tracing::info!("Explaining match {} -> {}", query.user_id, query.other_id);

    match state.service.explain_match(query.user_id, query.other_id).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => service_error(e),
    }
}
