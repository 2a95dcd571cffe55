use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::auth::repo_types::{NewUser, User, DEFAULT_PROFILE_COLOR};
use crate::movies::repo_types::{Movie, NewMovie};
use crate::profile::repo_types::ProfileUpdate;
use crate::watchlist::repo_types::{WatchHistoryEntry, WatchlistEntry};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str = "id, name, email, password_hash, profile_color, profile_image, \
                            private_watchlist, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy(database_url)
            .context("parse database url")?;

        // A failed migration aborts startup.
        MIGRATOR
            .run(&pool)
            .await
            .context("run database migrations")?;
        info!("database migrations applied");

        Ok(Self { pool })
    }

    async fn ensure_user(&self, id: Uuid) -> StoreResult<()> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        if exists {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn entries(&self, user_id: Uuid) -> StoreResult<Vec<WatchlistEntry>> {
        sqlx::query_as::<_, WatchlistEntry>(
            r#"
            SELECT movie_id, title, poster, rating, genres
              FROM watchlist_entries
             WHERE user_id = $1
             ORDER BY position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, profile_color)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(DEFAULT_PROFILE_COLOR)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateEmail
                } else {
                    backend(e)
                }
            })
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> StoreResult<User> {
        let sql = format!(
            r#"
            UPDATE users
               SET name              = COALESCE($2, name),
                   profile_color     = COALESCE($3, profile_color),
                   profile_image     = CASE WHEN $4 THEN $5 ELSE profile_image END,
                   private_watchlist = COALESCE($6, private_watchlist),
                   updated_at        = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.profile_color.as_deref())
            .bind(update.profile_image.is_some())
            .bind(update.profile_image.as_ref().and_then(|i| i.as_deref()))
            .bind(update.private_watchlist)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound)
    }

    async fn replace_password_hash(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> StoreResult<bool> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET password_hash = $3, updated_at = now()
             WHERE id = $1 AND password_hash = $2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(new)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(res.rows_affected() == 1)
    }

    async fn add_watchlist_entry(
        &self,
        user_id: Uuid,
        entry: WatchlistEntry,
    ) -> StoreResult<Vec<WatchlistEntry>> {
        self.ensure_user(user_id).await?;

        let res = sqlx::query(
            r#"
            INSERT INTO watchlist_entries (user_id, movie_id, title, poster, rating, genres)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&entry.movie_id)
        .bind(&entry.title)
        .bind(entry.poster.as_deref())
        .bind(entry.rating)
        .bind(&entry.genres)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if res.rows_affected() == 0 {
            return Err(StoreError::DuplicateEntry);
        }
        self.entries(user_id).await
    }

    async fn list_watchlist(&self, user_id: Uuid) -> StoreResult<Vec<WatchlistEntry>> {
        self.ensure_user(user_id).await?;
        self.entries(user_id).await
    }

    async fn remove_watchlist_entry(
        &self,
        user_id: Uuid,
        movie_id: &str,
    ) -> StoreResult<Vec<WatchlistEntry>> {
        self.ensure_user(user_id).await?;
        sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        self.entries(user_id).await
    }

    async fn record_watch(&self, user_id: Uuid, entry: WatchHistoryEntry) -> StoreResult<()> {
        self.ensure_user(user_id).await?;
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, movie_id, title, poster, watched_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&entry.movie_id)
        .bind(&entry.title)
        .bind(entry.poster.as_deref())
        .bind(entry.watched_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(())
    }

    async fn watch_history(&self, user_id: Uuid) -> StoreResult<Vec<WatchHistoryEntry>> {
        self.ensure_user(user_id).await?;
        sqlx::query_as::<_, WatchHistoryEntry>(
            r#"
            SELECT movie_id, title, poster, watched_at
              FROM watch_history
             WHERE user_id = $1
             ORDER BY position ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }

    async fn insert_movie(&self, movie: NewMovie) -> StoreResult<Movie> {
        sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (id, title, poster, rating, genres)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, poster, rating, genres, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&movie.title)
        .bind(movie.poster.as_deref())
        .bind(movie.rating)
        .bind(&movie.genres)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)
    }

    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, poster, rating, genres, created_at
              FROM movies
             ORDER BY position ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)
    }
}
