use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::EmployeeSummary;
use crate::state::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeDirectory {
    pub message: String,
    pub employees: Vec<EmployeeSummary>,
}

pub async fn list_employees(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<EmployeeDirectory>, AppError> {
    auth.require_admin()?;

    let employees = db::users::list_employees_with_leave_counts(&state.pool).await?;

    tracing::info!(count = employees.len(), user_id = %auth.user_id(), "Employees fetched");

    Ok(Json(EmployeeDirectory {
        message: "Employees fetched successfully".to_string(),
        employees,
    }))
}
