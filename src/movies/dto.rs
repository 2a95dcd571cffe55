use serde::{Deserialize, Serialize};

use crate::movies::scoring::{CatalogMovie, Mood, ScoredMovie};

#[derive(Debug, Default, Deserialize)]
pub struct AddMovieRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct AddMovieResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub mood: Mood,
    #[serde(default)]
    pub genre_id: Option<i64>,
    #[serde(default)]
    pub movies: Vec<CatalogMovie>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<ScoredMovie>,
    pub top: Vec<ScoredMovie>,
}
