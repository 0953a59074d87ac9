//! Credential Verifier: registration with hashed secrets, and login checks.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::password::{derive_default_secret, hash_secret_blocking, verify_secret_blocking};
use crate::resolver::bounded;
use crate::{AuthError, NewPrincipal, Principal, PrincipalRepository};

#[derive(Clone)]
pub struct CredentialVerifier {
    repository: Arc<dyn PrincipalRepository>,
    lookup_timeout: Duration,
}

impl CredentialVerifier {
    pub fn new(repository: Arc<dyn PrincipalRepository>, lookup_timeout: Duration) -> Self {
        Self {
            repository,
            lookup_timeout,
        }
    }

    /// Create a principal with a hashed secret.
    ///
    /// Without a secret (or with an empty one) the default derived by
    /// [`derive_default_secret`] is hashed instead. Neither the plaintext nor
    /// the hash leaves this function.
    pub async fn register(
        &self,
        identity: NewPrincipal,
        secret: Option<String>,
    ) -> Result<Principal, AuthError> {
        identity.validate()?;

        let secret = match secret.filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                info!(
                    document_number = %identity.document_number,
                    "no secret supplied, hashing derived default"
                );
                derive_default_secret(&identity.full_name, &identity.document_number)
            }
        };

        let hash = hash_secret_blocking(secret).await?;
        let principal = bounded(
            self.lookup_timeout,
            "principal insert",
            self.repository.insert(identity, hash),
        )
        .await?;

        info!(principal_id = %principal.id, role = %principal.role, "principal registered");
        Ok(principal)
    }

    /// Check a login identifier and candidate secret.
    ///
    /// Unknown identifier, wrong secret and an inactive principal all yield
    /// `InvalidCredentials`.
    pub async fn verify(&self, identifier: &str, candidate: &str) -> Result<Principal, AuthError> {
        let found = bounded(
            self.lookup_timeout,
            "credential lookup",
            self.repository.find_by_login_identifier(identifier),
        )
        .await?;

        let Some((principal, hash)) = found else {
            warn!(cause = "unknown login identifier", "credential verification failed");
            return Err(AuthError::InvalidCredentials);
        };

        match verify_secret_blocking(candidate.to_owned(), hash).await {
            Ok(true) if !principal.is_active => {
                warn!(principal_id = %principal.id, cause = "principal inactive", "credential verification failed");
                Err(AuthError::InvalidCredentials)
            }
            Ok(true) => Ok(principal),
            Ok(false) => {
                warn!(principal_id = %principal.id, cause = "secret mismatch", "credential verification failed");
                Err(AuthError::InvalidCredentials)
            }
            Err(err) => {
                warn!(principal_id = %principal.id, cause = %err, "credential verification failed");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
