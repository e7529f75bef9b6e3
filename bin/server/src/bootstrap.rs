//! Backend selection at startup.
//!
//! Configured backends are used when present; otherwise the server falls
//! back to in-process ones, logging a warning for each.

use rootcause::prelude::Report;
use seminar_pulse_access::{
    CustomClaims, IdentityProvider, LocalIdentityProvider, NewIdentity, ProviderError,
};
use seminar_pulse_identity::IdentityToolkitClient;
use seminar_pulse_store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{LocalAdminConfig, ServerConfig};

/// Creates the local admin identity and returns a bearer credential for it.
pub async fn seed_local_admin(
    provider: &LocalIdentityProvider,
    admin: &LocalAdminConfig,
) -> Result<String, Report<ProviderError>> {
    let identity = provider
        .create_identity(
            NewIdentity::new(admin.email.clone(), admin.password.clone())
                .with_display_name(Some("Local Admin".to_string())),
        )
        .await?;
    provider
        .set_custom_claims(identity.uid(), CustomClaims::admin_only(true))
        .await?;
    provider.issue_token(identity.uid()).await
}

/// Picks the identity provider for this configuration.
pub async fn identity_provider(
    config: &ServerConfig,
) -> Result<Arc<dyn IdentityProvider>, Report<ProviderError>> {
    if let Some(identity) = &config.identity {
        info!(
            project = identity.project_id(),
            base_url = identity.base_url(),
            "using identity service"
        );
        return Ok(Arc::new(IdentityToolkitClient::new(identity.clone())));
    }

    warn!("no identity service configured; using local in-memory identities");
    let local = LocalIdentityProvider::new();
    let token = seed_local_admin(&local, &config.local_admin).await?;
    warn!(
        email = %config.local_admin.email,
        %token,
        "seeded local admin; this credential is for development only"
    );
    Ok(Arc::new(local))
}

/// Picks the document store for an optional database pool.
pub fn document_store(pool: Option<PgPool>) -> Arc<dyn DocumentStore> {
    match pool {
        Some(pool) => Arc::new(PgDocumentStore::new(pool)),
        None => {
            warn!("no database configured; documents are kept in memory");
            Arc::new(MemoryDocumentStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seminar_pulse_access::RequestAuthorizer;

    #[tokio::test]
    async fn seeded_admin_can_authorize() {
        let provider = Arc::new(LocalIdentityProvider::new());
        let token = seed_local_admin(&provider, &LocalAdminConfig::default())
            .await
            .expect("seed");

        let authorizer = RequestAuthorizer::new(provider);
        let header = format!("Bearer {token}");
        let identity = authorizer
            .authorize(Some(header.as_str()), true)
            .await
            .expect("admin authorized");
        assert!(identity.is_admin());
    }

    #[tokio::test]
    async fn falls_back_to_local_provider() {
        let config: ServerConfig = config::Config::builder()
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");
        let provider = identity_provider(&config).await.expect("provider");
        let admins: Vec<_> = provider
            .list_identities(10)
            .await
            .expect("list")
            .into_iter()
            .filter(|identity| identity.is_admin())
            .collect();
        assert_eq!(admins.len(), 1);
    }
}
