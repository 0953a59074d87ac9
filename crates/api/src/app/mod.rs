//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: principal store, credential verifier, token codec, gate
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use crate::authz;
use crate::config::AppConfig;
use crate::middleware::PolicyGuard;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every route passes through the policy guard; a route whose operation is
/// missing from the policy table makes this fail.
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);
    let guard = PolicyGuard::new(authz::policy_table()?, services.gate.clone());

    Ok(routes::router(&guard)?.layer(Extension(services)))
}
