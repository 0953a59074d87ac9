//! Error taxonomy for authentication, and its caller-facing narrowing.

use thiserror::Error;

use declarant_core::{DomainError, PrincipalId};

use crate::RepositoryError;
use crate::policy::AuthzError;

/// Internal authentication failure, carrying full detail for logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown login identifier or wrong secret (indistinguishable on purpose).
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("missing bearer credential")]
    MissingCredential,

    /// Bad signature, malformed token or inconsistent claims.
    #[error("token invalid: {0}")]
    TokenInvalid(String),

    #[error("token expired")]
    TokenExpired,

    #[error("principal {0} not found")]
    PrincipalNotFound(PrincipalId),

    #[error("principal {0} is inactive")]
    PrincipalInactive(PrincipalId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("credential hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl AuthError {
    /// True for every cause that surfaces as `Unauthenticated`.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingCredential
                | AuthError::TokenInvalid(_)
                | AuthError::TokenExpired
                | AuthError::PrincipalNotFound(_)
                | AuthError::PrincipalInactive(_)
        )
    }
}

/// Caller-facing outcome of a rejected request.
///
/// Deliberately coarse: the sub-causes of `Unauthenticated` and
/// `InvalidCredentials` are only visible in server logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("authentication required")]
    Unauthenticated,

    /// Role mismatch; the message names the unmet requirement.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("service temporarily unavailable")]
    Unavailable,
}

impl From<&AuthError> for Rejection {
    fn from(err: &AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Rejection::InvalidCredentials,
            e if e.is_unauthenticated() => Rejection::Unauthenticated,
            AuthError::Domain(e) => Rejection::BadRequest(e.to_string()),
            AuthError::Repository(RepositoryError::Conflict(msg)) => Rejection::Conflict(msg.clone()),
            _ => Rejection::Unavailable,
        }
    }
}

impl From<AuthError> for Rejection {
    fn from(err: AuthError) -> Self {
        Rejection::from(&err)
    }
}

impl From<AuthzError> for Rejection {
    fn from(err: AuthzError) -> Self {
        Rejection::Forbidden(err.to_string())
    }
}
