use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Server-side record of an issued bearer token. The row id is the token's `jti`;
/// deleting the row revokes the token.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
