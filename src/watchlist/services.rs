use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
    watchlist::{dto::AddEntryRequest, repo_types::WatchlistEntry},
};

fn required(field: Option<String>, msg: &str) -> AppResult<String> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(msg))
}

/// Appends a movie unless it is already saved. Returns the whole list in
/// insertion order.
pub async fn add_entry(
    st: &AppState,
    user_id: Uuid,
    req: AddEntryRequest,
) -> AppResult<Vec<WatchlistEntry>> {
    let movie_id = required(req.movie_id, "Movie ID and title are required")?;
    let title = required(req.title, "Movie ID and title are required")?;

    let entry = WatchlistEntry {
        movie_id,
        title,
        poster: req.poster,
        rating: req.rating,
        genres: req.genres.unwrap_or_default(),
    };
    let movie_id = entry.movie_id.clone();

    match st.store.add_watchlist_entry(user_id, entry).await {
        Ok(list) => {
            info!(user_id = %user_id, movie_id = %movie_id, "watchlist entry added");
            Ok(list)
        }
        Err(e) => {
            let e = AppError::from(e);
            warn!(user_id = %user_id, movie_id = %movie_id, kind = e.kind(), "watchlist add rejected");
            Err(e)
        }
    }
}

pub async fn list_entries(st: &AppState, user_id: Uuid) -> AppResult<Vec<WatchlistEntry>> {
    Ok(st.store.list_watchlist(user_id).await?)
}

/// Removing a movie that is not on the list is a successful no-op. The id is
/// trimmed the same way `add_entry` trims it.
pub async fn remove_entry(
    st: &AppState,
    user_id: Uuid,
    movie_id: &str,
) -> AppResult<Vec<WatchlistEntry>> {
    let movie_id = movie_id.trim();
    let list = st.store.remove_watchlist_entry(user_id, movie_id).await?;
    info!(user_id = %user_id, movie_id = %movie_id, "watchlist entry removed");
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{dto::RegisterRequest, services::register};

    async fn setup() -> (AppState, Uuid) {
        let st = AppState::fake();
        let user = register(
            &st,
            RegisterRequest {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                password: "password-1".into(),
            },
        )
        .await
        .unwrap();
        (st, user.id)
    }

    fn req(movie_id: &str, title: &str) -> AddEntryRequest {
        AddEntryRequest {
            movie_id: Some(movie_id.into()),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn ids(list: &[WatchlistEntry]) -> Vec<&str> {
        list.iter().map(|e| e.movie_id.as_str()).collect()
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let (st, id) = setup().await;
        add_entry(&st, id, req("m1", "Inception")).await.unwrap();
        let err = add_entry(&st, id, req("m1", "Inception")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry));

        let list = list_entries(&st, id).await.unwrap();
        assert_eq!(ids(&list), ["m1"]);
    }

    #[tokio::test]
    async fn add_requires_movie_id_and_title() {
        let (st, id) = setup().await;
        for r in [req("", "Inception"), req("m1", "  "), AddEntryRequest::default()] {
            let err = add_entry(&st, id, r).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(list_entries(&st, id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_keeps_optional_fields() {
        let (st, id) = setup().await;
        let list = add_entry(
            &st,
            id,
            AddEntryRequest {
                movie_id: Some("27205".into()),
                title: Some("Inception".into()),
                poster: Some("/poster.jpg".into()),
                rating: Some(8.4),
                genres: Some(vec!["Sci-Fi".into(), "Action".into()]),
            },
        )
        .await
        .unwrap();
        assert_eq!(list[0].poster.as_deref(), Some("/poster.jpg"));
        assert_eq!(list[0].rating, Some(8.4));
        assert_eq!(list[0].genres, ["Sci-Fi", "Action"]);
    }

    #[tokio::test]
    async fn insertion_order_is_preserved() {
        let (st, id) = setup().await;
        for m in ["m1", "m2", "m3"] {
            add_entry(&st, id, req(m, m)).await.unwrap();
        }
        assert_eq!(ids(&list_entries(&st, id).await.unwrap()), ["m1", "m2", "m3"]);

        remove_entry(&st, id, "m2").await.unwrap();
        add_entry(&st, id, req("m2", "m2")).await.unwrap();
        assert_eq!(ids(&list_entries(&st, id).await.unwrap()), ["m1", "m3", "m2"]);
    }

    #[tokio::test]
    async fn removing_absent_movie_is_noop() {
        let (st, id) = setup().await;
        add_entry(&st, id, req("m1", "Inception")).await.unwrap();
        let list = remove_entry(&st, id, "does-not-exist").await.unwrap();
        assert_eq!(ids(&list), ["m1"]);

        let list = remove_entry(&st, id, "m1").await.unwrap();
        assert!(list.is_empty());
        let list = remove_entry(&st, id, "m1").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn padded_movie_id_matches_on_add_and_remove() {
        let (st, id) = setup().await;
        let list = add_entry(&st, id, req(" m1 ", "Inception")).await.unwrap();
        assert_eq!(ids(&list), ["m1"]);

        let err = add_entry(&st, id, req("m1", "Inception")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry));

        let list = remove_entry(&st, id, " m1").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let st = AppState::fake();
        let ghost = Uuid::new_v4();
        assert!(matches!(
            add_entry(&st, ghost, req("m1", "x")).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            list_entries(&st, ghost).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            remove_entry(&st, ghost, "m1").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn watchlists_are_per_user() {
        let (st, ada) = setup().await;
        let bob = register(
            &st,
            RegisterRequest {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                password: "password-2".into(),
            },
        )
        .await
        .unwrap()
        .id;

        add_entry(&st, ada, req("m1", "Inception")).await.unwrap();
        add_entry(&st, bob, req("m1", "Inception")).await.unwrap();
        remove_entry(&st, bob, "m1").await.unwrap();

        assert_eq!(ids(&list_entries(&st, ada).await.unwrap()), ["m1"]);
        assert!(list_entries(&st, bob).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_of_same_movie_yield_one_entry() {
        const N: usize = 32;
        let (st, id) = setup().await;

        let mut handles = Vec::with_capacity(N);
        for _ in 0..N {
            let st = st.clone();
            handles.push(tokio::spawn(async move {
                add_entry(&st, id, req("m1", "Inception")).await
            }));
        }

        let mut ok = 0;
        let mut dup = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(AppError::DuplicateEntry) => dup += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(dup, N - 1);

        let list = list_entries(&st, id).await.unwrap();
        assert_eq!(list.iter().filter(|e| e.movie_id == "m1").count(), 1);
    }
}
