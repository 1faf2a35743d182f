pub mod admin;
pub mod auth;
pub mod leaves;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;

use crate::middleware::role::require_admin;
use crate::state::SharedState;

pub fn api_routes(state: SharedState) -> Router<SharedState> {
    let admin_guard = || from_fn_with_state(state.clone(), require_admin);

    let api = Router::new()
        // Auth
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
        // Leaves
        .route("/leaves", get(leaves::list).post(leaves::create))
        .route(
            "/leaves/{id}",
            get(leaves::get).merge(put(leaves::update_status).route_layer(admin_guard())),
        )
        .route("/users/{user_id}/leaves", get(leaves::list_for_user))
        // Admin
        .route(
            "/admin/employees",
            get(admin::list_employees).route_layer(admin_guard()),
        );

    Router::new().nest("/api", api)
}
