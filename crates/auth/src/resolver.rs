//! Principal Resolver: maps a verified subject claim to a live principal.
//!
//! Nothing is cached; every call reads the repository, so deactivation takes
//! effect on the next request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use declarant_core::PrincipalId;

use crate::{AuthError, Principal, PrincipalRepository, RepositoryError};

/// Run a repository call under a deadline. A timeout is a repository failure.
pub(crate) async fn bounded<T, F>(timeout: Duration, op: &'static str, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(RepositoryError::Unavailable(format!("{op} timed out after {timeout:?}")).into()),
    }
}

#[derive(Clone)]
pub struct PrincipalResolver {
    repository: Arc<dyn PrincipalRepository>,
    lookup_timeout: Duration,
}

impl PrincipalResolver {
    pub fn new(repository: Arc<dyn PrincipalRepository>, lookup_timeout: Duration) -> Self {
        Self {
            repository,
            lookup_timeout,
        }
    }

    pub async fn resolve(&self, subject: PrincipalId) -> Result<Principal, AuthError> {
        let principal = bounded(
            self.lookup_timeout,
            "principal lookup",
            self.repository.find_by_id(subject),
        )
        .await?
        .ok_or(AuthError::PrincipalNotFound(subject))?;

        if !principal.is_active {
            return Err(AuthError::PrincipalInactive(subject));
        }

        debug!(principal_id = %subject, role = %principal.role, "principal resolved");
        Ok(principal)
    }
}
