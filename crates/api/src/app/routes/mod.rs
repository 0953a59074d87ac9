use axum::{
    Router,
    routing::{get, post, put},
};

use declarant_auth::PolicyError;

use crate::authz::ops;
use crate::middleware::PolicyGuard;

pub mod auth;
pub mod system;
pub mod users;

/// Router for every endpoint, each bound to its operation in the policy table.
pub fn router(guard: &PolicyGuard) -> Result<Router, PolicyError> {
    Ok(Router::new()
        .route("/health", guard.protect(ops::HEALTH, get(system::health))?)
        .route("/auth/login", guard.protect(ops::LOGIN, post(auth::login))?)
        .route("/auth/register", guard.protect(ops::REGISTER, post(auth::register))?)
        .route(
            "/auth/check-auth-status",
            guard.protect(ops::CHECK_STATUS, get(auth::check_auth_status))?,
        )
        .route("/users/:id", guard.protect(ops::USERS_READ, get(users::get_user))?)
        .route(
            "/users/:id/deactivate",
            guard.protect(ops::USERS_DEACTIVATE, post(users::deactivate_user))?,
        )
        .route(
            "/users/:id/activate",
            guard.protect(ops::USERS_ACTIVATE, post(users::activate_user))?,
        )
        .route(
            "/users/:id/role",
            guard.protect(ops::USERS_UPDATE_ROLE, put(users::update_role))?,
        ))
}
