use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Leave, LeaveStatus, LeaveType};

pub struct NewLeave<'a> {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: &'a str,
    pub leave_type: LeaveType,
}

pub async fn create(pool: &PgPool, new: &NewLeave<'_>) -> Result<Leave, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "INSERT INTO leaves (id, user_id, start_date, end_date, reason, type, status)
         VALUES ($1, $2, $3, $4, $5, $6, 'pending') RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(new.user_id)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.reason)
    .bind(new.leave_type)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>("SELECT * FROM leaves WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All leave requests, newest first.
pub async fn list_all(pool: &PgPool) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>("SELECT * FROM leaves ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "SELECT * FROM leaves WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Move a pending leave to `status`. Returns `None` if the leave is missing or
/// no longer pending, so two concurrent decisions cannot both land.
pub async fn decide(
    pool: &PgPool,
    id: Uuid,
    status: LeaveStatus,
) -> Result<Option<Leave>, sqlx::Error> {
    sqlx::query_as::<_, Leave>(
        "UPDATE leaves SET status = $2, updated_at = now()
         WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}
