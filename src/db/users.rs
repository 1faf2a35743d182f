use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EmployeeSummary, Role, User};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, name, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(executor)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
}

pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Every employee with their leave counts per status, in one pass.
pub async fn list_employees_with_leave_counts(
    pool: &PgPool,
) -> Result<Vec<EmployeeSummary>, sqlx::Error> {
    sqlx::query_as::<_, EmployeeSummary>(
        "SELECT u.*,
                COUNT(l.id) FILTER (WHERE l.status = 'pending')  AS pending_leaves_count,
                COUNT(l.id) FILTER (WHERE l.status = 'approved') AS approved_leaves_count,
                COUNT(l.id) FILTER (WHERE l.status = 'rejected') AS rejected_leaves_count
         FROM users u
         LEFT JOIN leaves l ON l.user_id = u.id
         WHERE u.role = 'employee'
         GROUP BY u.id
         ORDER BY u.created_at ASC",
    )
    .fetch_all(pool)
    .await
}
