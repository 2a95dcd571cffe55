use serde::{Deserialize, Deserializer, Serialize};

use crate::watchlist::repo_types::WatchlistEntry;

/// Request body for `POST /watchlist/add`.
///
/// `movieId` comes straight from the catalog, which uses numeric ids, so
/// both `"27205"` and `27205` are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    pub movie_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
}

fn string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IdRepr> = Option::deserialize(d)?;
    Ok(raw.map(|r| match r {
        IdRepr::Text(s) => s,
        IdRepr::Int(n) => n.to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<WatchlistEntry>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistChangedResponse {
    pub message: String,
    pub watchlist: Vec<WatchlistEntry>,
}
