//! Authentication Gate: bearer credential in, authenticated principal out.
//!
//! Per request: `Unauthenticated -> TokenVerified -> PrincipalResolved ->
//! {Allowed | Denied}`. Any failing step ends the request with a rejection.
//! The gate is read-only and keeps no state between requests.

use std::sync::Arc;

use tracing::{info, warn};

use crate::policy::{RoleRequirement, authorize};
use crate::{AuthError, Principal, PrincipalResolver, Rejection, TokenCodec};

const BEARER: &str = "bearer";

/// Outcome of admitting a request to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Public operation; no authentication was attempted.
    Anonymous,
    Principal(Principal),
}

impl Admission {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Admission::Anonymous => None,
            Admission::Principal(p) => Some(p),
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn extract_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredential)?.trim();

    let (scheme, token) = value
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MissingCredential)?;
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(AuthError::MissingCredential);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

#[derive(Clone)]
pub struct AuthenticationGate {
    codec: Arc<TokenCodec>,
    resolver: PrincipalResolver,
}

impl AuthenticationGate {
    pub fn new(codec: Arc<TokenCodec>, resolver: PrincipalResolver) -> Self {
        Self { codec, resolver }
    }

    /// Authenticate, keeping the precise cause of failure.
    pub async fn try_authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = extract_bearer(authorization)?;
        let claims = self.codec.verify(token)?;
        self.resolver.resolve(claims.sub).await
    }

    /// Authenticate for a caller: the cause is logged, the caller sees a
    /// single `Unauthenticated` (or `Unavailable` if storage failed).
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, Rejection> {
        self.try_authenticate(authorization).await.map_err(|err| {
            warn!(cause = %err, "authentication rejected");
            Rejection::from(&err)
        })
    }

    /// Admit a request to an operation with the given requirement.
    ///
    /// Public operations skip authentication entirely. Every other
    /// requirement authenticates first, then consults the policy engine.
    pub async fn admit(
        &self,
        requirement: &RoleRequirement,
        authorization: Option<&str>,
    ) -> Result<Admission, Rejection> {
        if !requirement.requires_authentication() {
            return Ok(Admission::Anonymous);
        }

        let principal = self.authenticate(authorization).await?;

        if let Err(err) = authorize(&principal, requirement) {
            info!(
                principal_id = %principal.id,
                role = %principal.role,
                required = %requirement,
                "authorization denied"
            );
            return Err(err.into());
        }

        Ok(Admission::Principal(principal))
    }
}
