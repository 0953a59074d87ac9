use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
    routing::MethodRouter,
};
use tracing::debug;

use declarant_auth::{
    Admission, AuthenticationGate, OperationId, PolicyError, PolicyTable, RoleRequirement,
};

use crate::app::errors;
use crate::context::PrincipalContext;

/// Attaches the declared requirement of an operation to its route.
#[derive(Clone)]
pub struct PolicyGuard {
    table: Arc<PolicyTable>,
    gate: AuthenticationGate,
}

impl PolicyGuard {
    pub fn new(table: PolicyTable, gate: AuthenticationGate) -> Self {
        Self {
            table: Arc::new(table),
            gate,
        }
    }

    /// Wrap `route` so every request is admitted against `operation`'s requirement.
    ///
    /// Fails if the operation is not in the policy table.
    pub fn protect(&self, operation: OperationId, route: MethodRouter) -> Result<MethodRouter, PolicyError> {
        let requirement = self.table.requirement(operation)?.clone();
        let state = OperationGuard {
            operation,
            requirement,
            gate: self.gate.clone(),
        };
        Ok(route.route_layer(axum::middleware::from_fn_with_state(state, enforce)))
    }
}

#[derive(Clone)]
pub struct OperationGuard {
    operation: OperationId,
    requirement: RoleRequirement,
    gate: AuthenticationGate,
}

pub async fn enforce(
    State(guard): State<OperationGuard>,
    mut req: Request,
    next: Next,
) -> Response {
    let authorization = authorization_header(req.headers());

    match guard.gate.admit(&guard.requirement, authorization.as_deref()).await {
        Ok(Admission::Anonymous) => next.run(req).await,
        Ok(Admission::Principal(principal)) => {
            req.extensions_mut().insert(PrincipalContext::new(principal));
            next.run(req).await
        }
        Err(rejection) => {
            debug!(operation = %guard.operation, outcome = ?rejection, "request rejected");
            errors::rejection_to_response(rejection)
        }
    }
}

/// Raw `Authorization` value; a non-UTF-8 header counts as absent.
fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
