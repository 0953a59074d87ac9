//! Repository doubles for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use declarant_core::PrincipalId;

use crate::{CredentialHash, NewPrincipal, Principal, PrincipalRepository, RepositoryError};

#[derive(Default)]
pub struct StubRepository {
    rows: Mutex<HashMap<PrincipalId, (Principal, CredentialHash)>>,
}

impl StubRepository {
    /// Insert a principal whose hash matches nothing.
    pub fn seed(&self, new: NewPrincipal) -> Principal {
        let principal = materialize(new);
        self.rows.lock().unwrap().insert(
            principal.id,
            (principal.clone(), CredentialHash::from_phc("$unusable")),
        );
        principal
    }

    pub fn set_active(&self, id: PrincipalId, active: bool) {
        if let Some((p, _)) = self.rows.lock().unwrap().get_mut(&id) {
            p.is_active = active;
        }
    }

    pub fn stored_hash(&self, id: PrincipalId) -> Option<CredentialHash> {
        self.rows.lock().unwrap().get(&id).map(|(_, h)| h.clone())
    }
}

fn materialize(new: NewPrincipal) -> Principal {
    let now = Utc::now();
    Principal {
        id: PrincipalId::new(),
        full_name: new.full_name,
        document_number: new.document_number,
        email: new.email,
        phone_number: new.phone_number,
        role: new.role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl PrincipalRepository for StubRepository {
    async fn find_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, RepositoryError> {
        Ok(self.rows.lock().unwrap().get(&id).map(|(p, _)| p.clone()))
    }

    async fn find_by_login_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<(Principal, CredentialHash)>, RepositoryError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .values()
            .find(|(p, _)| p.document_number == identifier)
            .cloned())
    }

    async fn insert(
        &self,
        principal: NewPrincipal,
        credential: CredentialHash,
    ) -> Result<Principal, RepositoryError> {
        let mut rows = self.rows.lock().unwrap();
        if rows
            .values()
            .any(|(p, _)| p.document_number == principal.document_number)
        {
            return Err(RepositoryError::Conflict("document number already registered".into()));
        }
        let principal = materialize(principal);
        rows.insert(principal.id, (principal.clone(), credential));
        Ok(principal)
    }
}

/// Never answers within any reasonable deadline.
pub struct SlowRepository {
    delay: Duration,
}

impl SlowRepository {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PrincipalRepository for SlowRepository {
    async fn find_by_id(&self, _id: PrincipalId) -> Result<Option<Principal>, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn find_by_login_identifier(
        &self,
        _identifier: &str,
    ) -> Result<Option<(Principal, CredentialHash)>, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn insert(
        &self,
        _principal: NewPrincipal,
        _credential: CredentialHash,
    ) -> Result<Principal, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        Err(RepositoryError::Unavailable("slow".into()))
    }
}
