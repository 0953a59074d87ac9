use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use declarant_auth::{AuthError, Rejection};

/// Map a caller-facing rejection to its HTTP response.
pub fn rejection_to_response(rejection: Rejection) -> Response {
    match rejection {
        Rejection::InvalidCredentials => unauthorized("invalid_credentials", "invalid credentials"),
        Rejection::Unauthenticated => unauthorized("unauthenticated", "authentication required"),
        Rejection::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        Rejection::BadRequest(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        Rejection::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        Rejection::Unavailable => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "service temporarily unavailable",
        ),
    }
}

/// Log the internal cause, respond with the narrowed outcome.
pub fn auth_error_to_response(err: AuthError) -> Response {
    tracing::warn!(cause = %err, "request failed");
    rejection_to_response(Rejection::from(&err))
}

/// Malformed or incomplete request body.
pub fn invalid_body(rejection: JsonRejection) -> Response {
    tracing::debug!(cause = %rejection, "request body rejected");
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

fn unauthorized(code: &'static str, message: &'static str) -> Response {
    let mut response = json_error(StatusCode::UNAUTHORIZED, code, message);
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, axum::http::HeaderValue::from_static("Bearer"));
    response
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
