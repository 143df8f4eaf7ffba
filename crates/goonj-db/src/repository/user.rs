//! # User Repository
//!
//! Directory of identities that have signed in, for the operator surface.
//! The identity provider stays the source of truth; rows here are refreshed
//! every time a user starts a checkout.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use goonj_core::User;

use crate::error::DbResult;

/// Repository for user directory operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts the user or refreshes their profile fields.
    pub async fn upsert(&self, user: &User) -> DbResult<()> {
        debug!(uid = %user.uid, "Upserting user");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (uid, email, display_name, photo_url, created_at, last_seen_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (uid) DO UPDATE SET
                email = excluded.email,
                display_name = excluded.display_name,
                photo_url = excluded.photo_url,
                last_seen_at = excluded.last_seen_at
            "#,
        )
        .bind(&user.uid)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.photo_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by uid.
    pub async fn get(&self, uid: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(
            "SELECT uid, email, display_name, photo_url FROM users WHERE uid = ?1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// All known users, ordered by display name.
    pub async fn list_all(&self) -> DbResult<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT uid, email, display_name, photo_url
            FROM users
            ORDER BY display_name COLLATE NOCASE, uid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }
}

fn user_from_row(row: &SqliteRow) -> DbResult<User> {
    Ok(User {
        uid: row.try_get("uid")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        photo_url: row.try_get("photo_url")?,
    })
}
