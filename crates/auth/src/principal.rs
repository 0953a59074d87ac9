use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use declarant_core::{DomainError, DomainResult, PrincipalId};

use crate::Role;

/// A principal (user account) as seen by the authentication layer.
///
/// Owned by the principal repository; this crate only reads it. The credential
/// hash is deliberately not part of this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: PrincipalId,
    pub full_name: String,
    pub document_number: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity fields supplied when a principal is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPrincipal {
    pub full_name: String,
    pub document_number: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl NewPrincipal {
    pub fn new(full_name: impl Into<String>, document_number: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            document_number: document_number.into(),
            email: None,
            phone_number: None,
            role: Role::User,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("full name must not be empty"));
        }
        if self.document_number.trim().is_empty() {
            return Err(DomainError::validation("document number must not be empty"));
        }
        if let Some(email) = &self.email {
            if !email.contains('@') {
                return Err(DomainError::validation("email is malformed"));
            }
        }
        Ok(())
    }
}

/// A one-way password hash in PHC string form.
///
/// Never serialized and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CredentialHash([REDACTED])")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store could not serve the request.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage contract for principals, implemented outside this crate.
///
/// Normal reads never include the credential hash; it is only returned by
/// `find_by_login_identifier`, which exists for credential verification.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, RepositoryError>;

    /// Lookup by login identifier (the document number), including the stored hash.
    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, CredentialHash)>, RepositoryError>;

    /// Persist a new, active principal together with its single credential hash.
    async fn insert(
        &self,
        principal: NewPrincipal,
        credential: CredentialHash,
    ) -> Result<Principal, RepositoryError>;
}
