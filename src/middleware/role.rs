use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::auth::extractor::AuthUser;
use crate::error::AppError;
use crate::models::Role;

/// Route guard for admin-only routes. Resolving `AuthUser` here also caches
/// it in the request extensions for the handler.
pub async fn require_admin(auth: AuthUser, req: Request, next: Next) -> Result<Response, AppError> {
    require(Role::Admin, auth, req, next).await
}

async fn require(
    required: Role,
    auth: AuthUser,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = auth.require_role(required) {
        tracing::warn!(
            user_id = %auth.user_id(),
            user_role = %auth.role(),
            required_role = %required,
            path = %req.uri().path(),
            "Role guard rejected request"
        );
        return Err(e);
    }

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}
