use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use declarant_auth::{CredentialHash, NewPrincipal, Principal, PrincipalRepository, RepositoryError, Role};
use declarant_core::PrincipalId;

#[derive(Debug, Clone)]
struct PrincipalRow {
    principal: Principal,
    credential: CredentialHash,
}

/// In-memory principal repository.
///
/// Intended for tests/dev. Document number and email are unique; the email
/// comparison ignores ASCII case.
#[derive(Debug, Default)]
pub struct InMemoryPrincipalStore {
    rows: RwLock<HashMap<PrincipalId, PrincipalRow>>,
}

impl InMemoryPrincipalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<PrincipalId, PrincipalRow>>, RepositoryError> {
        self.rows
            .read()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<PrincipalId, PrincipalRow>>, RepositoryError> {
        self.rows
            .write()
            .map_err(|_| RepositoryError::Unavailable("lock poisoned".to_string()))
    }

    /// Activate or deactivate a principal. Returns `None` if it does not exist.
    pub fn set_active(&self, id: PrincipalId, active: bool) -> Result<Option<Principal>, RepositoryError> {
        self.update(id, |p| p.is_active = active)
    }

    pub fn set_role(&self, id: PrincipalId, role: Role) -> Result<Option<Principal>, RepositoryError> {
        self.update(id, |p| p.role = role)
    }

    pub fn len(&self) -> usize {
        self.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(
        &self,
        id: PrincipalId,
        change: impl FnOnce(&mut Principal),
    ) -> Result<Option<Principal>, RepositoryError> {
        let mut rows = self.write()?;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };
        change(&mut row.principal);
        row.principal.updated_at = Utc::now();
        debug!(principal_id = %id, is_active = row.principal.is_active, role = %row.principal.role, "principal updated");
        Ok(Some(row.principal.clone()))
    }
}

#[async_trait]
impl PrincipalRepository for InMemoryPrincipalStore {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, RepositoryError> {
        Ok(self.read()?.get(&id).map(|row| row.principal.clone()))
    }

    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, CredentialHash)>, RepositoryError> {
        let identifier = identifier.trim();
        Ok(self
            .read()?
            .values()
            .find(|row| row.principal.document_number == identifier)
            .map(|row| (row.principal.clone(), row.credential.clone())))
    }

    async fn insert(
        &self,
        principal: NewPrincipal,
        credential: CredentialHash,
    ) -> Result<Principal, RepositoryError> {
        let document_number = principal.document_number.trim().to_string();
        let email = principal.email.as_deref().map(str::trim).map(str::to_string);

        let mut rows = self.write()?;

        for row in rows.values() {
            if row.principal.document_number == document_number {
                return Err(RepositoryError::Conflict(
                    "document number already registered".to_string(),
                ));
            }
            if let (Some(existing), Some(new)) = (&row.principal.email, &email) {
                if existing.eq_ignore_ascii_case(new) {
                    return Err(RepositoryError::Conflict("email already registered".to_string()));
                }
            }
        }

        let now = Utc::now();
        let stored = Principal {
            id: PrincipalId::new(),
            full_name: principal.full_name.trim().to_string(),
            document_number,
            email,
            phone_number: principal.phone_number,
            role: principal.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        rows.insert(
            stored.id,
            PrincipalRow {
                principal: stored.clone(),
                credential,
            },
        );

        Ok(stored)
    }
}
