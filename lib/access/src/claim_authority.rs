//! Admin-claim management.
//!
//! Only an already-admin caller may grant or revoke the admin claim; the same
//! rule applies when the target is the caller. Writing the claim replaces the
//! identity's entire custom-claims map with `{admin: <flag>}`, so any other
//! claim is dropped.

use rootcause::prelude::Report;
use seminar_pulse_core::Uid;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::authorizer::AuthorizedIdentity;
use crate::claims::CustomClaims;
use crate::error::{ClaimError, ProviderError};
use crate::identity::UserIdentity;
use crate::provider::IdentityProvider;

/// Grants and revokes the admin claim through the identity provider.
#[derive(Clone)]
pub struct ClaimAuthority {
    provider: Arc<dyn IdentityProvider>,
}

fn upstream(report: &Report<ProviderError>) -> ClaimError {
    match report.current_context() {
        ProviderError::NotFound { uid } => ClaimError::TargetNotFound { uid: uid.clone() },
        other => ClaimError::Upstream {
            reason: other.to_string(),
        },
    }
}

impl ClaimAuthority {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Sets the admin claim on `target` and returns the updated identity.
    ///
    /// Calling this twice with the same arguments leaves the same claim
    /// state as calling it once.
    #[instrument(skip(self, caller), fields(caller = %caller.uid()))]
    pub async fn set_admin_claim(
        &self,
        caller: &AuthorizedIdentity,
        target: Option<&Uid>,
        is_admin: bool,
    ) -> Result<UserIdentity, Report<ClaimError>> {
        if !caller.is_admin() {
            return Err(ClaimError::Forbidden {
                uid: caller.uid().clone(),
            }
            .into());
        }

        let target = target
            .filter(|uid| !uid.is_blank())
            .ok_or(ClaimError::MissingTarget)?;

        // Existence check first so an unknown uid reports NotFound rather
        // than whatever the claims call returns for it.
        self.provider
            .get_identity(target)
            .await
            .map_err(|report| upstream(&report))?;

        self.provider
            .set_custom_claims(target, CustomClaims::admin_only(is_admin))
            .await
            .map_err(|report| upstream(&report))?;

        let updated = self
            .provider
            .get_identity(target)
            .await
            .map_err(|report| upstream(&report))?;

        info!(target = %target, is_admin, "admin claim updated");
        Ok(updated)
    }

    /// Reads the current admin claim of an identity.
    pub async fn is_admin(&self, uid: &Uid) -> Result<bool, Report<ClaimError>> {
        let identity = self
            .provider
            .get_identity(uid)
            .await
            .map_err(|report| upstream(&report))?;
        Ok(identity.is_admin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorizer::RequestAuthorizer;
    use crate::local::LocalIdentityProvider;
    use serde_json::json;

    fn admin_caller() -> AuthorizedIdentity {
        AuthorizedIdentity::new(Uid::new("admin-1"), Some("admin@example.com".into()), true)
    }

    async fn provider_with_user() -> Arc<LocalIdentityProvider> {
        let provider = Arc::new(LocalIdentityProvider::new());
        provider
            .insert_identity(UserIdentity::new(Uid::new("uid-1"), "u1@example.com"), "secret-pw")
            .await;
        provider
    }

    #[tokio::test]
    async fn grant_admin_claim() {
        let provider = provider_with_user().await;
        let authority = ClaimAuthority::new(provider.clone());

        let updated = authority
            .set_admin_claim(&admin_caller(), Some(&Uid::new("uid-1")), true)
            .await
            .expect("grant");

        assert!(updated.is_admin());
        assert!(authority.is_admin(&Uid::new("uid-1")).await.expect("read"));
    }

    #[tokio::test]
    async fn granting_twice_is_idempotent() {
        let provider = provider_with_user().await;
        let authority = ClaimAuthority::new(provider.clone());
        let target = Uid::new("uid-1");

        let once = authority
            .set_admin_claim(&admin_caller(), Some(&target), true)
            .await
            .expect("first");
        let twice = authority
            .set_admin_claim(&admin_caller(), Some(&target), true)
            .await
            .expect("second");

        assert_eq!(once.custom_claims(), twice.custom_claims());
    }

    #[tokio::test]
    async fn non_admin_caller_is_rejected() {
        let provider = provider_with_user().await;
        let authority = ClaimAuthority::new(provider.clone());
        let caller = AuthorizedIdentity::new(Uid::new("uid-1"), None, false);

        let err = authority
            .set_admin_claim(&caller, Some(&Uid::new("uid-1")), true)
            .await
            .unwrap_err();

        assert!(matches!(err.current_context(), ClaimError::Forbidden { .. }));
        assert!(!authority.is_admin(&Uid::new("uid-1")).await.expect("read"));
    }

    #[tokio::test]
    async fn missing_or_blank_target_is_validation_error() {
        let authority = ClaimAuthority::new(provider_with_user().await);

        let err = authority
            .set_admin_claim(&admin_caller(), None, true)
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &ClaimError::MissingTarget);

        let err = authority
            .set_admin_claim(&admin_caller(), Some(&Uid::new("")), true)
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &ClaimError::MissingTarget);
    }

    #[tokio::test]
    async fn unknown_target_is_not_found() {
        let authority = ClaimAuthority::new(provider_with_user().await);
        let err = authority
            .set_admin_claim(&admin_caller(), Some(&Uid::new("ghost")), true)
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ClaimError::TargetNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn claim_write_replaces_other_claims() {
        let provider = provider_with_user().await;
        let uid = Uid::new("uid-1");
        let mut existing = serde_json::Map::new();
        existing.insert("tier".to_string(), json!("gold"));
        provider
            .set_custom_claims(&uid, CustomClaims::from_map(existing))
            .await
            .expect("seed claims");

        let authority = ClaimAuthority::new(provider.clone());
        let updated = authority
            .set_admin_claim(&admin_caller(), Some(&uid), true)
            .await
            .expect("grant");

        assert!(updated.custom_claims().get("tier").is_none());
        assert_eq!(updated.custom_claims(), &CustomClaims::admin_only(true));
    }

    #[tokio::test]
    async fn promotion_flips_authorizer_outcome_for_same_credential() {
        let provider = provider_with_user().await;
        let token = provider.issue_token(&Uid::new("uid-1")).await.expect("token");
        let header = format!("Bearer {token}");
        let authorizer = RequestAuthorizer::new(provider.clone());
        let authority = ClaimAuthority::new(provider.clone());

        let before = authorizer.authorize(Some(&header), true).await.unwrap_err();
        assert_eq!(before.status_code(), 403);

        authority
            .set_admin_claim(&admin_caller(), Some(&Uid::new("uid-1")), true)
            .await
            .expect("grant");

        let after = authorizer.authorize(Some(&header), true).await.expect("authorized");
        assert!(after.is_admin());
    }
}
