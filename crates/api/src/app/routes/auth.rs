use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };

    let principal = match services
        .credentials
        .verify(&body.document_number, &body.password)
        .await
    {
        Ok(p) => p,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services.tokens.issue(principal.id) {
        Ok(issued) => {
            tracing::info!(principal_id = %principal.id, "login succeeded");
            (StatusCode::OK, Json(dto::SessionResponse::new(principal, issued))).into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /auth/register (administrators only)
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<PrincipalContext>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::invalid_body(rejection),
    };
    let (identity, password) = body.into_parts();

    match services.credentials.register(identity, password).await {
        Ok(user) => {
            tracing::info!(
                actor_id = %actor.principal_id(),
                principal_id = %user.id,
                "principal registered via api"
            );
            (
                StatusCode::CREATED,
                Json(dto::RegisterResponse {
                    message: "User created successfully",
                    user,
                }),
            )
                .into_response()
        }
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /auth/check-auth-status
///
/// Returns the current principal and a freshly issued token.
pub async fn check_auth_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> axum::response::Response {
    let issued = match services.tokens.issue(ctx.principal_id()) {
        Ok(issued) => issued,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let user = ctx.principal().clone();
    (StatusCode::OK, Json(dto::SessionResponse::new(user, issued))).into_response()
}
