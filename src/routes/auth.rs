use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::{password, tokens};
use crate::db;
use crate::error::{AppError, FieldErrors};
use crate::models::User;
use crate::state::SharedState;
use crate::validation::{self, RegistrationInput};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: User,
}

#[derive(Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn auth_response(access_token: String, user: User) -> AuthResponse {
    AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        user,
    }
}

fn duplicate_email() -> AppError {
    AppError::Validation(FieldErrors::single(
        "email",
        "This email is already registered",
    ))
}

pub async fn register(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    tracing::info!(email = ?req.email, role = ?req.role, "Registration attempt");

    let input = RegistrationInput {
        name: req.name.as_deref(),
        email: req.email.as_deref(),
        password: req.password.as_deref(),
        password_confirmation: req.password_confirmation.as_deref(),
        role: req.role.as_deref(),
    };

    let mut valid = validation::registration(&input);
    let email = validation::normalize_email(req.email.as_deref().unwrap_or_default());
    if !email.is_empty() && db::users::email_exists(&state.pool, &email).await? {
        match &mut valid {
            Ok(_) => return Err(duplicate_email()),
            Err(errors) => errors.add("email", "This email is already registered"),
        }
    }
    let valid = valid.map_err(AppError::Validation)?;

    let pw_hash = password::hash_blocking(valid.password)
        .await
        .map_err(AppError::Internal)?;

    let mut tx = state.pool.begin().await?;

    let user = db::users::create(&mut *tx, &valid.name, &valid.email, &pw_hash, valid.role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => duplicate_email(),
            _ => AppError::Database(e),
        })?;

    let access_token = tokens::issue(&mut *tx, &state.config, user.id).await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((StatusCode::CREATED, Json(auth_response(access_token, user))))
}

pub async fn login(
    State(state): State<SharedState>,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = validation::normalize_email(req.email.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();

    let mut errors = FieldErrors::new();
    if email.is_empty() {
        errors.add("email", "The email field is required.");
    }
    if password.is_empty() {
        errors.add("password", "The password field is required.");
    }
    errors.into_result()?;

    if state.login_limiter.check(&email).is_err() {
        tracing::warn!(%email, "Login throttled");
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        tracing::warn!(%email, "Login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let valid = password::verify_blocking(password, user.password_hash.clone())
        .await
        .map_err(AppError::Internal)?;

    if !valid {
        state.login_limiter.record_failure(&email);
        tracing::warn!(%email, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    state.login_limiter.reset(&email);

    // One active session per user: old tokens go in the same transaction
    // that issues the new one.
    let mut tx = state.pool.begin().await?;
    let revoked = db::access_tokens::delete_all_for_user(&mut *tx, user.id).await?;
    let access_token = tokens::issue(&mut *tx, &state.config, user.id).await?;
    tx.commit().await?;

    tracing::info!(user_id = %user.id, role = %user.role, revoked, "User logged in");

    Ok(Json(auth_response(access_token, user)))
}

pub async fn logout(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MessageResponse>, AppError> {
    let revoked = db::access_tokens::delete_all_for_user(&state.pool, auth.user_id()).await?;

    tracing::info!(user_id = %auth.user_id(), revoked, "User logged out");

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

pub async fn current_user(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
