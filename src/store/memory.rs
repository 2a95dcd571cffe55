//! In-process store used when no `DATABASE_URL` is configured and by tests.
//!
//! One `RwLock` guards the whole dataset, so every read-modify-write below
//! runs as a single critical section.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::auth::repo_types::{NewUser, User, DEFAULT_PROFILE_COLOR};
use crate::movies::repo_types::{Movie, NewMovie};
use crate::profile::repo_types::ProfileUpdate;
use crate::watchlist::repo_types::{WatchHistoryEntry, WatchlistEntry};

struct UserDoc {
    user: User,
    watchlist: Vec<WatchlistEntry>,
    history: Vec<WatchHistoryEntry>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, UserDoc>,
    by_email: HashMap<String, Uuid>,
    movies: Vec<Movie>,
}

impl Inner {
    fn doc(&self, id: Uuid) -> StoreResult<&UserDoc> {
        self.users.get(&id).ok_or(StoreError::NotFound)
    }

    fn doc_mut(&mut self, id: Uuid) -> StoreResult<&mut UserDoc> {
        self.users.get_mut(&id).ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            profile_color: DEFAULT_PROFILE_COLOR.to_string(),
            profile_image: None,
            private_watchlist: false,
            created_at: now,
            updated_at: now,
        };
        inner.by_email.insert(user.email.clone(), user.id);
        inner.users.insert(
            user.id,
            UserDoc {
                user: user.clone(),
                watchlist: Vec::new(),
                history: Vec::new(),
            },
        );
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.users.get(id))
            .map(|doc| doc.user.clone()))
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).map(|doc| doc.user.clone()))
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        let user = &mut inner.doc_mut(id)?.user;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(color) = &update.profile_color {
            user.profile_color = color.clone();
        }
        if let Some(image) = &update.profile_image {
            user.profile_image = image.clone();
        }
        if let Some(private) = update.private_watchlist {
            user.private_watchlist = private;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(user.clone())
    }

    async fn replace_password_hash(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> StoreResult<bool> {
        let mut inner = self.inner.write().await;
        let user = &mut inner.doc_mut(id)?.user;
        if user.password_hash != expected {
            return Ok(false);
        }
        user.password_hash = new.to_string();
        user.updated_at = OffsetDateTime::now_utc();
        Ok(true)
    }

    async fn add_watchlist_entry(
        &self,
        user_id: Uuid,
        entry: WatchlistEntry,
    ) -> StoreResult<Vec<WatchlistEntry>> {
        let mut inner = self.inner.write().await;
        let doc = inner.doc_mut(user_id)?;
        if doc.watchlist.iter().any(|e| e.movie_id == entry.movie_id) {
            return Err(StoreError::DuplicateEntry);
        }
        doc.watchlist.push(entry);
        Ok(doc.watchlist.clone())
    }

    async fn list_watchlist(&self, user_id: Uuid) -> StoreResult<Vec<WatchlistEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.doc(user_id)?.watchlist.clone())
    }

    async fn remove_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: &str,
    ) -> StoreResult<Vec<WatchlistEntry>> {
        let mut inner = self.inner.write().await;
        let doc = inner.doc_mut(user_id)?;
        doc.watchlist.retain(|e| e.movie_id != movie_id);
        Ok(doc.watchlist.clone())
    }

    async fn record_watch(&self, user_id: Uuid, entry: WatchHistoryEntry) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        inner.doc_mut(user_id)?.history.push(entry);
        Ok(())
    }

    async fn watch_history(&self, user_id: Uuid) -> StoreResult<Vec<WatchHistoryEntry>> {
        let inner = self.inner.read().await;
        Ok(inner.doc(user_id)?.history.clone())
    }

    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        let mut inner = self.inner.write().await;
        let movie = Movie {
            id: Uuid::new_v4(),
            title: movie.title,
            poster: movie.poster,
            rating: movie.rating,
            genres: movie.genres,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.movies.push(movie.clone());
        Ok(movie)
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.clone())
    }
}
