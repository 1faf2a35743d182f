use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AccessToken, User};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<AccessToken, sqlx::Error> {
    sqlx::query_as::<_, AccessToken>(
        "INSERT INTO access_tokens (id, user_id, expires_at)
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

/// Resolve a live token to its owner. Revoked (deleted) or expired rows yield `None`.
pub async fn find_user_for_token(
    pool: &PgPool,
    token_id: Uuid,
    user_id: Uuid,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM access_tokens t
         JOIN users u ON u.id = t.user_id
         WHERE t.id = $1 AND t.user_id = $2 AND t.expires_at > now()",
    )
    .bind(token_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM access_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

pub async fn delete_all_for_user<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM access_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM access_tokens WHERE expires_at <= now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
