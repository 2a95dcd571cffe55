use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    error::AppResult,
    extract::JsonBody,
    movies::{
        dto::{AddMovieRequest, AddMovieResponse, RecommendRequest, RecommendResponse},
        repo_types::Movie,
        services,
    },
    state::AppState,
};

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/add", post(add_movie))
        .route("/movies/recommend", post(recommend))
}

#[instrument(skip(state, payload))]
pub async fn add_movie(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AddMovieRequest>,
) -> AppResult<(StatusCode, Json<AddMovieResponse>)> {
    services::add_movie(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddMovieResponse {
            success: true,
            message: "Movie Added".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_movies(State(state): State<AppState>) -> AppResult<Json<Vec<Movie>>> {
    Ok(Json(services::list_movies(&state).await?))
}

#[instrument(skip_all)]
pub async fn recommend(
    JsonBody(payload): JsonBody<RecommendRequest>,
) -> Json<RecommendResponse> {
    debug!(mood = ?payload.mood, count = payload.movies.len(), "ranking catalog results");
    Json(services::recommend(payload))
}
