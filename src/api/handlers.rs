use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        EnrichedRecommendation, MovieDetails, MovieSummary, Recommendation,
        RecommendationResponse,
    },
    services::{enrich_recommendations, DetailFetcher},
};

use super::{AppState, RecommendationLimits};

const MOVIE_NOT_FOUND: &str = "Movie not found. Please try again.";

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub title: String,
    pub count: Option<i64>,
}

impl RecommendationQuery {
    /// Validates the requested count against the configured bounds
    fn resolve_count(&self, limits: RecommendationLimits) -> AppResult<usize> {
        let Some(count) = self.count else {
            return Ok(limits.default_count);
        };

        usize::try_from(count)
            .ok()
            .filter(|count| (1..=limits.max_count).contains(count))
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "count must be between 1 and {}",
                    limits.max_count
                ))
            })
    }
}

/// Resolves the title and count shared by both recommendation endpoints
fn lookup(
    state: &AppState,
    query: &RecommendationQuery,
) -> AppResult<(usize, Vec<Recommendation>)> {
    let count = query.resolve_count(state.limits)?;

    if !state.recommender.contains(&query.title) {
        return Err(AppError::NotFound(MOVIE_NOT_FOUND.to_string()));
    }

    Ok((count, state.recommender.recommend(&query.title, count)))
}

fn detail_fetcher(state: &AppState) -> AppResult<Arc<dyn DetailFetcher>> {
    state
        .detail_fetcher
        .clone()
        .ok_or_else(|| AppError::Unavailable("Movie details are not configured".to_string()))
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "movies": state.recommender.catalog().len(),
        })),
    )
}

/// Lists the catalog in row order
pub async fn list_movies(State(state): State<AppState>) -> Json<Vec<MovieSummary>> {
    let movies = state
        .recommender
        .catalog()
        .iter()
        .map(MovieSummary::from)
        .collect();
    Json(movies)
}

/// Returns movies similar to the requested title
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse<Recommendation>>> {
    let (count, recommendations) = lookup(&state, &query)?;

    tracing::info!(
        request_id = %request_id,
        title = %query.title,
        count,
        results = recommendations.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationResponse {
        title: query.title,
        count,
        recommendations,
    }))
}

/// Returns similar movies enriched with poster, rating and overview
pub async fn recommend_with_details(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RecommendationQuery>,
) -> AppResult<Json<RecommendationResponse<EnrichedRecommendation>>> {
    let (count, recommendations) = lookup(&state, &query)?;
    let fetcher = detail_fetcher(&state)?;

    let enriched = enrich_recommendations(fetcher, recommendations).await;

    tracing::info!(
        request_id = %request_id,
        title = %query.title,
        count,
        results = enriched.len(),
        missing_details = enriched.iter().filter(|r| r.details.is_none()).count(),
        "Enriched recommendations served"
    );

    Ok(Json(RecommendationResponse {
        title: query.title,
        count,
        recommendations: enriched,
    }))
}

/// Returns details for a single catalog movie
pub async fn movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MovieDetails>> {
    let fetcher = detail_fetcher(&state)?;

    if state.recommender.catalog().find_by_id(movie_id).is_none() {
        return Err(AppError::NotFound(format!(
            "Movie {} is not in the catalog",
            movie_id
        )));
    }

    let details = fetcher.fetch_details(movie_id).await?;
    Ok(Json(details))
}
