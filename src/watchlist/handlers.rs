use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    extract::JsonBody,
    state::AppState,
    watchlist::{
        dto::{AddEntryRequest, WatchlistChangedResponse, WatchlistResponse},
        services,
    },
};

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist/add", post(add_entry))
        .route("/watchlist/get", get(list_entries))
        .route("/watchlist/remove/:movie_id", delete(remove_entry))
}

#[instrument(skip(state, payload))]
pub async fn add_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonBody(payload): JsonBody<AddEntryRequest>,
) -> AppResult<(StatusCode, Json<WatchlistChangedResponse>)> {
    let watchlist = services::add_entry(&state, user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(WatchlistChangedResponse {
            message: "Added to Watchlist".into(),
            watchlist,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<WatchlistResponse>> {
    let watchlist = services::list_entries(&state, user_id).await?;
    Ok(Json(WatchlistResponse { watchlist }))
}

#[instrument(skip(state))]
pub async fn remove_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(movie_id): Path<String>,
) -> AppResult<Json<WatchlistChangedResponse>> {
    let watchlist = services::remove_entry(&state, user_id, &movie_id).await?;
    Ok(Json(WatchlistChangedResponse {
        message: "Removed from watchlist".into(),
        watchlist,
    }))
}
