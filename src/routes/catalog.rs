use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{filter::parse_number, FilterCriteria, NormalizedRecord, SearchParams},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub success: bool,
    pub movies: Vec<NormalizedRecord>,
    pub count: usize,
    pub recommendation: Option<NormalizedRecord>,
    #[serde(rename = "matchConfidence")]
    pub match_confidence: Option<u8>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub success: bool,
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ActorsResponse {
    pub success: bool,
    pub actors: Vec<String>,
}

/// Handler for the catalog search endpoint
pub async fn movies(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> AppResult<Json<MoviesResponse>> {
    let params = SearchParams::from_pairs(pairs);
    let criteria = FilterCriteria::from(&params);
    let target_runtime = parse_number(params.runtime.as_deref());

    tracing::info!(
        request_id = %request_id,
        actor_count = criteria.actors.len(),
        "Processing catalog search"
    );

    let outcome = state.catalog.search(&criteria, target_runtime).await?;

    Ok(Json(MoviesResponse {
        success: true,
        count: outcome.records.len(),
        movies: outcome.records,
        recommendation: outcome.recommendation,
        match_confidence: outcome.match_confidence,
    }))
}

/// Handler for the genre listing endpoint
pub async fn genres(State(state): State<Arc<AppState>>) -> AppResult<Json<GenresResponse>> {
    let genres = state.catalog.genres().await?;
    Ok(Json(GenresResponse {
        success: true,
        genres,
    }))
}

/// Handler for the actor listing endpoint
pub async fn actors(State(state): State<Arc<AppState>>) -> AppResult<Json<ActorsResponse>> {
    let actors = state.catalog.actors().await?;
    Ok(Json(ActorsResponse {
        success: true,
        actors,
    }))
}
