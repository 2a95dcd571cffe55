use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// One saved movie. `movie_id` is unique within a user's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub movie_id: String,
    pub title: String,
    pub poster: Option<String>,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
}

/// Append-only record of a viewed movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub movie_id: String,
    pub title: String,
    pub poster: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub watched_at: OffsetDateTime,
}
