//! PostgreSQL backend.

use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

use super::{is_unique_violation, AccountStore, PlaylistStore, StoreError, VideoStore};
use crate::{
    catalog::models::{NewPlaylist, NewVideo, Playlist, Video},
    session::models::{Account, NewAccount},
};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create tables and indexes if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        let span = info_span!("db.schema", db.system = "postgresql");
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

fn conflict_or_database(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict
    } else {
        StoreError::Database(err)
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = "SELECT * FROM accounts WHERE id = $1";
        let account = sqlx::query_as::<_, Account>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(account)
    }

    async fn find_account_by_identity(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<Account>, StoreError> {
        if username.is_none() && email.is_none() {
            return Ok(None);
        }
        let query = r"
            SELECT * FROM accounts
            WHERE ($1::text IS NOT NULL AND username = $1)
               OR ($2::text IS NOT NULL AND email = $2)
            LIMIT 1
        ";
        let account = sqlx::query_as::<_, Account>(query)
            .bind(username)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(account)
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let query = r"
            INSERT INTO accounts
                (id, username, email, full_name, avatar, cover_image, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
        ";
        sqlx::query_as::<_, Account>(query)
            .bind(Uuid::now_v7())
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.full_name)
            .bind(&account.avatar)
            .bind(&account.cover_image)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await
            .map_err(conflict_or_database)
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<bool, StoreError> {
        // Single-row overwrite: the previous refresh token stops matching in the same write.
        let query = "UPDATE accounts SET refresh_token = $2, updated_at = NOW() WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn rotate_refresh_token(
        &self,
        id: Uuid,
        presented: &str,
        next: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts
            SET refresh_token = $3, updated_at = NOW()
            WHERE id = $1 AND refresh_token = $2
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(presented)
            .bind(next)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query = r"
            UPDATE accounts
            SET full_name = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        ";
        sqlx::query_as::<_, Account>(query)
            .bind(id)
            .bind(full_name)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .map_err(conflict_or_database)
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query =
            "UPDATE accounts SET password_hash = $2, updated_at = NOW() WHERE id = $1 RETURNING *";
        let account = sqlx::query_as::<_, Account>(query)
            .bind(id)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(account)
    }

    async fn update_avatar(&self, id: Uuid, url: &str) -> Result<Option<Account>, StoreError> {
        let query =
            "UPDATE accounts SET avatar = $2, updated_at = NOW() WHERE id = $1 RETURNING *";
        let account = sqlx::query_as::<_, Account>(query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(account)
    }

    async fn update_cover_image(
        &self,
        id: Uuid,
        url: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query =
            "UPDATE accounts SET cover_image = $2, updated_at = NOW() WHERE id = $1 RETURNING *";
        let account = sqlx::query_as::<_, Account>(query)
            .bind(id)
            .bind(url)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(account)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .instrument(info_span!(
                "db.acquire",
                db.system = "postgresql",
                db.operation = "ACQUIRE"
            ))
            .await?;
        conn.ping()
            .instrument(info_span!(
                "db.ping",
                db.system = "postgresql",
                db.operation = "PING"
            ))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VideoStore for PgStore {
    async fn insert_video(&self, video: NewVideo) -> Result<Video, StoreError> {
        let query = r"
            INSERT INTO videos
                (id, video_file, thumbnail, owner_id, title, description, duration)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
        ";
        let video = sqlx::query_as::<_, Video>(query)
            .bind(Uuid::now_v7())
            .bind(&video.video_file)
            .bind(&video.thumbnail)
            .bind(video.owner)
            .bind(&video.title)
            .bind(&video.description)
            .bind(video.duration)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;
        Ok(video)
    }

    async fn find_video(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        let query = "SELECT * FROM videos WHERE id = $1";
        let video = sqlx::query_as::<_, Video>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(video)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<Video>, StoreError> {
        let query = "UPDATE videos SET views = views + 1 WHERE id = $1 RETURNING *";
        let video = sqlx::query_as::<_, Video>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(video)
    }

    async fn list_published(
        &self,
        owner: Option<Uuid>,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Video>, u64), StoreError> {
        let query = r"
            SELECT * FROM videos
            WHERE is_published AND ($1::uuid IS NULL OR owner_id = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
        ";
        let videos = sqlx::query_as::<_, Video>(query)
            .bind(owner)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;

        let query = r"
            SELECT COUNT(*) AS total FROM videos
            WHERE is_published AND ($1::uuid IS NULL OR owner_id = $1)
        ";
        let total: i64 = sqlx::query(query)
            .bind(owner)
            .fetch_one(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?
            .try_get("total")?;

        Ok((videos, u64::try_from(total).unwrap_or_default()))
    }

    async fn set_published(
        &self,
        id: Uuid,
        published: bool,
    ) -> Result<Option<Video>, StoreError> {
        let query =
            "UPDATE videos SET is_published = $2, updated_at = NOW() WHERE id = $1 RETURNING *";
        let video = sqlx::query_as::<_, Video>(query)
            .bind(id)
            .bind(published)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(video)
    }
}

#[async_trait]
impl PlaylistStore for PgStore {
    async fn insert_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, StoreError> {
        let query = r"
            INSERT INTO playlists (id, name, description, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
        ";
        let playlist = sqlx::query_as::<_, Playlist>(query)
            .bind(Uuid::now_v7())
            .bind(&playlist.name)
            .bind(&playlist.description)
            .bind(playlist.owner)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", query))
            .await?;
        Ok(playlist)
    }

    async fn find_playlist(&self, id: Uuid) -> Result<Option<Playlist>, StoreError> {
        let query = "SELECT * FROM playlists WHERE id = $1";
        let playlist = sqlx::query_as::<_, Playlist>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await?;
        Ok(playlist)
    }

    async fn add_video(&self, id: Uuid, video_id: Uuid) -> Result<Option<Playlist>, StoreError> {
        let query = r"
            UPDATE playlists
            SET videos = CASE
                    WHEN $2 = ANY(videos) THEN videos
                    ELSE array_append(videos, $2)
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
        ";
        let playlist = sqlx::query_as::<_, Playlist>(query)
            .bind(id)
            .bind(video_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(playlist)
    }

    async fn remove_video(
        &self,
        id: Uuid,
        video_id: Uuid,
    ) -> Result<Option<Playlist>, StoreError> {
        let query = r"
            UPDATE playlists
            SET videos = array_remove(videos, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING *
        ";
        let playlist = sqlx::query_as::<_, Playlist>(query)
            .bind(id)
            .bind(video_id)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await?;
        Ok(playlist)
    }
}
