use tracing::info;

use crate::{
    error::{AppError, AppResult},
    movies::{
        dto::{AddMovieRequest, RecommendRequest, RecommendResponse},
        repo_types::{Movie, NewMovie},
        scoring,
    },
    state::AppState,
};

const TOP_PICKS: usize = 10;

pub async fn add_movie(st: &AppState, req: AddMovieRequest) -> AppResult<Movie> {
    let title = req
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::validation("Title is required"))?;

    let movie = st
        .store
        .insert_movie(NewMovie {
            title,
            poster: req.poster,
            rating: req.rating,
            genres: req.genre.unwrap_or_default(),
        })
        .await?;
    info!(movie_id = %movie.id, title = %movie.title, "movie added");
    Ok(movie)
}

pub async fn list_movies(st: &AppState) -> AppResult<Vec<Movie>> {
    Ok(st.store.list_movies().await?)
}

pub fn recommend(req: RecommendRequest) -> RecommendResponse {
    let results = scoring::rank(req.movies, req.mood, req.genre_id);
    let top = scoring::top_unique(&results, TOP_PICKS);
    RecommendResponse { results, top }
}
