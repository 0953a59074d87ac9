//! Service wiring: principal store, credential verifier, token codec and gate.

use std::sync::Arc;

use anyhow::Context;

use declarant_auth::{
    AuthenticationGate, CredentialVerifier, NewPrincipal, PrincipalRepository, PrincipalResolver,
    Role, TokenCodec,
};
use declarant_infra::principal_store::InMemoryPrincipalStore;

use crate::config::{AppConfig, BootstrapAdmin};

pub struct AppServices {
    pub store: Arc<InMemoryPrincipalStore>,
    pub credentials: CredentialVerifier,
    pub tokens: Arc<TokenCodec>,
    pub gate: AuthenticationGate,
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = Arc::new(InMemoryPrincipalStore::new());
    let repository: Arc<dyn PrincipalRepository> = store.clone();
    let lookup_timeout = config.auth.lookup_timeout();

    let tokens = Arc::new(TokenCodec::new(&config.auth));
    let credentials = CredentialVerifier::new(repository.clone(), lookup_timeout);
    let gate = AuthenticationGate::new(
        tokens.clone(),
        PrincipalResolver::new(repository, lookup_timeout),
    );

    let services = AppServices {
        store,
        credentials,
        tokens,
        gate,
    };

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&services, admin).await?;
    }

    Ok(services)
}

async fn bootstrap_admin(services: &AppServices, admin: &BootstrapAdmin) -> anyhow::Result<()> {
    let existing = services
        .store
        .find_by_login_identifier(&admin.document_number)
        .await?;
    if existing.is_some() {
        tracing::debug!("bootstrap administrator already present");
        return Ok(());
    }

    let identity = NewPrincipal::new(&admin.full_name, &admin.document_number).with_role(Role::Admin);
    let principal = services
        .credentials
        .register(identity, admin.password.clone())
        .await
        .context("failed to register bootstrap administrator")?;

    tracing::info!(principal_id = %principal.id, "bootstrap administrator registered");
    Ok(())
}
