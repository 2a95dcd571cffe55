//! Persistence boundary. Services only see [`UserStore`]; the Postgres and
//! in-memory backends both live behind it.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::movies::repo_types::{Movie, NewMovie};
use crate::profile::repo_types::ProfileUpdate;
use crate::watchlist::repo_types::{WatchHistoryEntry, WatchlistEntry};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("movie already in watchlist")]
    DuplicateEntry,
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    // ── users ──

    /// Inserts a user. Fails with `DuplicateEmail` if the email is taken.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> StoreResult<User>;

    /// Swaps the password hash only if it still equals `expected`.
    /// Returns `false` when the stored hash changed underneath the caller.
    async fn replace_password_hash(&self, id: Uuid, expected: &str, new: &str)
        -> StoreResult<bool>;

    // ── watchlist ──

    /// Appends `entry` unless its movie id is already present. The check and
    /// the append are one atomic step. Returns the full list after insert.
    async fn add_watchlist_entry(
        &self,
        user_id: Uuid,
        entry: WatchlistEntry,
    ) -> StoreResult<Vec<WatchlistEntry>>;
    async fn list_watchlist(&self, user_id: Uuid) -> StoreResult<Vec<WatchlistEntry>>;
    async fn remove_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: &str,
    ) -> StoreResult<Vec<WatchlistEntry>>;

    // ── history ──

    async fn record_watch(&self, user_id: Uuid, entry: WatchHistoryEntry) -> StoreResult<()>;
    async fn watch_history(&self, user_id: Uuid) -> StoreResult<Vec<WatchHistoryEntry>>;

    // ── movies ──

    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie>;
    async fn list_movies(&self) -> StoreResult<Vec<Movie>>;
}
