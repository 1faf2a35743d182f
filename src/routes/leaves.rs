use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::{Leave, LeaveView, User};
use crate::state::SharedState;
use crate::validation::{self, LeaveInput};

#[derive(Deserialize)]
pub struct CreateLeave {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason: Option<String>,
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateLeaveStatus {
    pub status: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct LeaveUpdated {
    pub message: String,
    pub leave: LeaveView,
}

/// Embed each leave's owner, loading all owners in a single query.
async fn with_owners(pool: &PgPool, leaves: Vec<Leave>) -> Result<Vec<LeaveView>, AppError> {
    let mut ids: Vec<Uuid> = leaves.iter().map(|l| l.user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let owners: HashMap<Uuid, User> = db::users::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    Ok(leaves
        .into_iter()
        .map(|leave| {
            let owner = owners.get(&leave.user_id).cloned();
            LeaveView::new(leave, owner)
        })
        .collect())
}

async fn with_owner(pool: &PgPool, leave: Leave) -> Result<LeaveView, AppError> {
    let owner = db::users::find_by_id(pool, leave.user_id).await?;
    Ok(LeaveView::new(leave, owner))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<LeaveView>>, AppError> {
    tracing::debug!(user_id = %auth.user_id(), role = %auth.role(), "Listing leaves");

    let views = if auth.is_admin() {
        let leaves = db::leaves::list_all(&state.pool).await?;
        with_owners(&state.pool, leaves).await?
    } else {
        db::leaves::list_by_user(&state.pool, auth.user_id())
            .await?
            .into_iter()
            .map(|leave| LeaveView::new(leave, None))
            .collect()
    };

    Ok(Json(views))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateLeave>, AppError>,
) -> Result<(StatusCode, Json<LeaveView>), AppError> {
    let input = LeaveInput {
        start_date: req.start_date.as_deref(),
        end_date: req.end_date.as_deref(),
        reason: req.reason.as_deref(),
        leave_type: req.leave_type.as_deref(),
    };
    let valid = validation::new_leave(&input, Utc::now().date_naive())?;

    let leave = db::leaves::create(
        &state.pool,
        &db::leaves::NewLeave {
            user_id: auth.user_id(),
            start_date: valid.start_date,
            end_date: valid.end_date,
            reason: &valid.reason,
            leave_type: valid.leave_type,
        },
    )
    .await?;

    tracing::info!(
        leave_id = %leave.id,
        user_id = %auth.user_id(),
        start = %leave.start_date,
        end = %leave.end_date,
        "Leave request submitted"
    );

    Ok((StatusCode::CREATED, Json(LeaveView::new(leave, None))))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<LeaveView>, AppError> {
    let leave = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    auth.require_admin_or_self(leave.user_id)?;

    Ok(Json(with_owner(&state.pool, leave).await?))
}

pub async fn update_status(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateLeaveStatus>, AppError>,
) -> Result<Json<LeaveUpdated>, AppError> {
    auth.require_admin()?;

    let status = validation::decision(req.status.as_deref())?;

    let current = db::leaves::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave request not found".to_string()))?;

    if !current.status.can_transition_to(status) {
        return Err(AppError::Conflict(format!(
            "Leave request has already been {}",
            current.status
        )));
    }

    // Lost a race with another decision between the read and the write
    let leave = db::leaves::decide(&state.pool, id, status)
        .await?
        .ok_or_else(|| AppError::Conflict("Leave request has already been decided".to_string()))?;

    tracing::info!(
        leave_id = %leave.id,
        from = %current.status,
        to = %leave.status,
        admin_id = %auth.user_id(),
        "Leave request decided"
    );

    Ok(Json(LeaveUpdated {
        message: "Leave request updated successfully".to_string(),
        leave: with_owner(&state.pool, leave).await?,
    }))
}

pub async fn list_for_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<Json<Vec<LeaveView>>, AppError> {
    auth.require_admin_or_self(user_id)?;

    let owner = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let views = db::leaves::list_by_user(&state.pool, owner.id)
        .await?
        .into_iter()
        .map(|leave| LeaveView::new(leave, Some(owner.clone())))
        .collect();

    Ok(Json(views))
}
