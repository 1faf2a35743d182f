use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use uuid::Uuid;

use crate::auth::jwt;
use crate::db;
use crate::error::AppError;
use crate::models::{Role, User};
use crate::state::SharedState;

/// The caller, resolved from the bearer token on every protected request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token_id: Uuid,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Route-level check: the caller's role must be exactly `required`.
    pub fn require_role(&self, required: Role) -> Result<(), AppError> {
        if self.user.role == required {
            Ok(())
        } else {
            Err(AppError::RoleRequired {
                actual: self.user.role,
                required,
            })
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user.id, role = %self.user.role, "Admin access denied");
            Err(AppError::Forbidden("Unauthorized".to_string()))
        }
    }

    /// Admins see everything; everyone else only what they own.
    pub fn require_admin_or_self(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.user.id == owner_id {
            Ok(())
        } else {
            tracing::warn!(user_id = %self.user.id, %owner_id, "Cross-user access denied");
            Err(AppError::Forbidden("Unauthorized".to_string()))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by the role guard further up the stack
        if let Some(auth) = parts.extensions.get::<AuthUser>() {
            return Ok(auth.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Unauthenticated("Unauthenticated.".to_string()))?;

        let claims = jwt::decode_token(bearer.token(), &state.config.jwt_secret)
            .map_err(|_| AppError::Unauthenticated("Unauthenticated.".to_string()))?;

        let user = db::access_tokens::find_user_for_token(&state.pool, claims.jti, claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Unauthenticated.".to_string()))?;

        let auth = AuthUser {
            user,
            token_id: claims.jti,
        };
        parts.extensions.insert(auth.clone());

        Ok(auth)
    }
}
