//! Heuristic "pick" ranking over catalog results.
//!
//! The score starts at the catalog's vote average. Additive bonuses are then
//! keyed on the selected mood and genre. Nothing is learned.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub const GENRE_ACTION: i64 = 28;
pub const GENRE_SCI_FI: i64 = 878;
pub const GENRE_FAMILY: i64 = 10751;

const MOOD_GENRE_BONUS: f64 = 2.0;
const SELECTED_GENRE_BONUS: f64 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Action,
    SciFi,
    Family,
}

/// A catalog result as the client received it. Accepts the catalog's own
/// snake_case keys as well as camelCase.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogMovie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "poster_path")]
    pub poster_path: Option<String>,
    #[serde(default, alias = "vote_average")]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default, alias = "genre_ids")]
    pub genre_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMovie {
    #[serde(flatten)]
    pub movie: CatalogMovie,
    pub ai_score: f64,
}

pub fn score(movie: &CatalogMovie, mood: Mood, genre: Option<i64>) -> f64 {
    let has = |g: i64| movie.genre_ids.contains(&g);
    let mut s = movie.vote_average;

    match mood {
        Mood::Neutral => {}
        Mood::Happy => s += movie.popularity * 0.01,
        Mood::Sad => s += (10.0 - movie.vote_average) * 0.3,
        Mood::Action if has(GENRE_ACTION) => s += MOOD_GENRE_BONUS,
        Mood::SciFi if has(GENRE_SCI_FI) => s += MOOD_GENRE_BONUS,
        Mood::Family if has(GENRE_FAMILY) => s += MOOD_GENRE_BONUS,
        Mood::Action | Mood::SciFi | Mood::Family => {}
    }

    if let Some(g) = genre {
        if has(g) {
            s += SELECTED_GENRE_BONUS;
        }
    }
    s
}

/// Scores every movie and sorts by score, highest first. Ties keep input order.
pub fn rank(movies: Vec<CatalogMovie>, mood: Mood, genre: Option<i64>) -> Vec<ScoredMovie> {
    let mut scored: Vec<ScoredMovie> = movies
        .into_iter()
        .map(|movie| {
            let ai_score = score(&movie, mood, genre);
            ScoredMovie { movie, ai_score }
        })
        .collect();
    scored.sort_by(|a, b| b.ai_score.partial_cmp(&a.ai_score).unwrap_or(Ordering::Equal));
    scored
}

/// First `n` entries with distinct catalog ids, in ranked order.
pub fn top_unique(ranked: &[ScoredMovie], n: usize) -> Vec<ScoredMovie> {
    let mut seen = HashSet::new();
    ranked
        .iter()
        .filter(|m| seen.insert(m.movie.id))
        .take(n)
        .cloned()
        .collect()
}
