use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::jwt::{encode_token, Claims};
use crate::config::Config;
use crate::db;
use crate::error::AppError;

/// Record a new token row and sign a bearer token pointing at it.
pub async fn issue<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    config: &Config,
    user_id: Uuid,
) -> Result<String, AppError> {
    let expires_at = Utc::now() + Duration::hours(config.token_ttl_hours);
    let record = db::access_tokens::create(executor, Uuid::now_v7(), user_id, expires_at).await?;

    let claims = Claims::new(user_id, record.id, record.expires_at);
    encode_token(&claims, &config.jwt_secret).map_err(AppError::Internal)
}
