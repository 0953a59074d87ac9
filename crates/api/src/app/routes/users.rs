use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use declarant_auth::{AuthError, PrincipalId, PrincipalRepository};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// GET /users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.find_by_id(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => not_found(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}

/// POST /users/:id/deactivate
pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(&services, &actor, &id, false)
}

/// POST /users/:id/activate
pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    set_active(&services, &actor, &id, true)
}

/// PUT /users/:id/role
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateRoleRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.set_role(id, body.role) {
        Ok(Some(user)) => {
            tracing::info!(
                actor_id = %actor.principal_id(),
                principal_id = %user.id,
                role = %user.role,
                "principal role changed"
            );
            (StatusCode::OK, Json(user)).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}

fn set_active(
    services: &AppServices,
    actor: &PrincipalContext,
    id: &str,
    active: bool,
) -> axum::response::Response {
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.store.set_active(id, active) {
        Ok(Some(user)) => {
            tracing::info!(
                actor_id = %actor.principal_id(),
                principal_id = %user.id,
                is_active = active,
                "principal status changed"
            );
            (StatusCode::OK, Json(user)).into_response()
        }
        Ok(None) => not_found(),
        Err(e) => errors::auth_error_to_response(AuthError::from(e)),
    }
}

fn parse_id(raw: &str) -> Result<PrincipalId, axum::response::Response> {
    raw.parse::<PrincipalId>()
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()))
}

fn not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
}
