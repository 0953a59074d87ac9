//! `declarant-auth`: credential verification, identity tokens and role-based
//! authorization.
//!
//! This crate is intentionally decoupled from HTTP and storage: principals are
//! read through [`PrincipalRepository`], which the caller implements.

pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod password;
pub mod policy;
pub mod principal;
pub mod resolver;
pub mod roles;
pub mod token;

#[cfg(test)]
mod testing;

pub use claims::{Claims, TokenValidationError, validate_claims};
pub use declarant_core::PrincipalId;
pub use config::{AuthConfig, ConfigError, SigningSecret};
pub use credentials::CredentialVerifier;
pub use error::{AuthError, Rejection};
pub use gate::{Admission, AuthenticationGate, extract_bearer};
pub use policy::{
    AuthzError, OperationId, PolicyError, PolicyTable, PolicyTableBuilder, RoleRequirement,
    authorize,
};
pub use principal::{CredentialHash, NewPrincipal, Principal, PrincipalRepository, RepositoryError};
pub use resolver::PrincipalResolver;
pub use roles::Role;
pub use token::{IssuedToken, TokenCodec};
