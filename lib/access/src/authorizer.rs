//! The single authorization checkpoint for privileged requests.
//!
//! Every privileged route hands its `Authorization` header to
//! [`RequestAuthorizer::authorize`] before touching data and forwards any
//! failure unchanged. Client-side session checks are a UX gate only and never
//! substitute for this check.

use seminar_pulse_core::Uid;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::error::{AuthorizationError, ProviderError};
use crate::provider::IdentityProvider;

/// Identity decoded from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizedIdentity {
    uid: Uid,
    email: Option<String>,
    is_admin: bool,
}

impl AuthorizedIdentity {
    #[must_use]
    pub fn new(uid: Uid, email: Option<String>, is_admin: bool) -> Self {
        Self {
            uid,
            email,
            is_admin,
        }
    }

    #[must_use]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Outcome of authorizing one request. Never persisted.
pub type AuthorizationResult = Result<AuthorizedIdentity, AuthorizationError>;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty token is treated as
/// missing.
#[must_use]
pub fn extract_bearer(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verifies bearer credentials against the identity provider.
#[derive(Clone)]
pub struct RequestAuthorizer {
    provider: Arc<dyn IdentityProvider>,
}

impl RequestAuthorizer {
    /// Creates an authorizer backed by the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Authorizes a request from its `Authorization` header.
    ///
    /// Fails with `Unauthenticated` when the header is missing or malformed
    /// or the provider rejects the credential, with `Upstream` when the
    /// provider cannot be asked, and with `Forbidden` when `require_admin` is
    /// set and the identity lacks the admin claim.
    #[instrument(skip(self, authorization))]
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        require_admin: bool,
    ) -> AuthorizationResult {
        let Some(token) = extract_bearer(authorization) else {
            debug!("request without bearer credential");
            return Err(AuthorizationError::Unauthenticated {
                reason: "missing or malformed bearer credential".to_string(),
            });
        };

        let claims = self
            .provider
            .verify_credential(token)
            .await
            .map_err(|report| match report.current_context() {
                ProviderError::InvalidCredential { .. } | ProviderError::NotFound { .. } => {
                    warn!(error = %report, "bearer credential rejected");
                    AuthorizationError::Unauthenticated {
                        reason: "invalid or expired credential".to_string(),
                    }
                }
                _ => {
                    error!(error = %report, "identity provider failed during authorization");
                    AuthorizationError::Upstream
                }
            })?;

        if require_admin && !claims.admin {
            warn!(uid = %claims.uid, "non-admin attempted admin operation");
            return Err(AuthorizationError::Forbidden { uid: claims.uid });
        }

        debug!(uid = %claims.uid, admin = claims.admin, "request authorized");
        Ok(AuthorizedIdentity::new(claims.uid, claims.email, claims.admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::CustomClaims;
    use crate::identity::{IdentityUpdate, NewIdentity, TokenClaims, UserIdentity};
    use crate::local::LocalIdentityProvider;
    use async_trait::async_trait;
    use rootcause::prelude::Report;

    /// Provider whose every call fails with the same error.
    struct FailingProvider(ProviderError);

    impl FailingProvider {
        fn fail<T>(&self) -> Result<T, Report<ProviderError>> {
            Err(self.0.clone().into())
        }
    }

    #[async_trait]
    impl IdentityProvider for FailingProvider {
        async fn verify_credential(&self, _token: &str) -> Result<TokenClaims, Report<ProviderError>> {
            self.fail()
        }

        async fn create_identity(
            &self,
            _identity: NewIdentity,
        ) -> Result<UserIdentity, Report<ProviderError>> {
            self.fail()
        }

        async fn get_identity(&self, _uid: &Uid) -> Result<UserIdentity, Report<ProviderError>> {
            self.fail()
        }

        async fn set_custom_claims(
            &self,
            _uid: &Uid,
            _claims: CustomClaims,
        ) -> Result<(), Report<ProviderError>> {
            self.fail()
        }

        async fn list_identities(
            &self,
            _page_size: usize,
        ) -> Result<Vec<UserIdentity>, Report<ProviderError>> {
            self.fail()
        }

        async fn delete_identity(&self, _uid: &Uid) -> Result<(), Report<ProviderError>> {
            self.fail()
        }

        async fn update_identity(
            &self,
            _uid: &Uid,
            _update: IdentityUpdate,
        ) -> Result<UserIdentity, Report<ProviderError>> {
            self.fail()
        }
    }

    async fn authorize_with(error: ProviderError) -> AuthorizationError {
        RequestAuthorizer::new(Arc::new(FailingProvider(error)))
            .authorize(Some("Bearer some-token"), false)
            .await
            .unwrap_err()
    }

    async fn fixture() -> (Arc<LocalIdentityProvider>, RequestAuthorizer, String, String) {
        let provider = Arc::new(LocalIdentityProvider::new());
        provider
            .insert_identity(
                UserIdentity::new(Uid::new("admin-1"), "admin@example.com")
                    .with_claims(CustomClaims::admin_only(true)),
                "secret-pw",
            )
            .await;
        provider
            .insert_identity(UserIdentity::new(Uid::new("uid-1"), "u1@example.com"), "secret-pw")
            .await;
        let admin_token = provider.issue_token(&Uid::new("admin-1")).await.expect("token");
        let user_token = provider.issue_token(&Uid::new("uid-1")).await.expect("token");
        let authorizer = RequestAuthorizer::new(provider.clone());
        (provider, authorizer, admin_token, user_token)
    }

    #[test]
    fn extract_bearer_variants() {
        assert_eq!(extract_bearer(Some("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer(Some("bearer   abc ")), Some("abc"));
        assert_eq!(extract_bearer(Some("Basic abc")), None);
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Bearer")), None);
        assert_eq!(extract_bearer(Some("")), None);
        assert_eq!(extract_bearer(None), None);
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let (_, authorizer, _, _) = fixture().await;
        let err = authorizer.authorize(None, false).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthenticated() {
        let (_, authorizer, _, _) = fixture().await;
        let err = authorizer
            .authorize(Some("Bearer forged"), false)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[tokio::test]
    async fn non_admin_forbidden_on_admin_route() {
        let (_, authorizer, _, user_token) = fixture().await;
        let header = format!("Bearer {user_token}");

        let ok = authorizer.authorize(Some(&header), false).await.expect("authorized");
        assert_eq!(ok.uid().as_str(), "uid-1");
        assert!(!ok.is_admin());

        let err = authorizer.authorize(Some(&header), true).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn admin_passes_admin_check() {
        let (_, authorizer, admin_token, _) = fixture().await;
        let identity = authorizer
            .authorize(Some(&format!("Bearer {admin_token}")), true)
            .await
            .expect("authorized");
        assert!(identity.is_admin());
        assert_eq!(identity.email(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn revoked_admin_claim_takes_effect_immediately() {
        let (provider, authorizer, admin_token, _) = fixture().await;
        let header = format!("Bearer {admin_token}");
        provider
            .set_custom_claims(&Uid::new("admin-1"), CustomClaims::admin_only(false))
            .await
            .expect("claims");

        let err = authorizer.authorize(Some(&header), true).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn provider_outage_is_upstream_not_unauthenticated() {
        let unavailable = authorize_with(ProviderError::Unavailable {
            reason: "connection refused".to_string(),
        })
        .await;
        assert_eq!(unavailable, AuthorizationError::Upstream);
        assert_eq!(unavailable.status_code(), 500);

        let failed = authorize_with(ProviderError::RequestFailed {
            status: 503,
            reason: "backend error".to_string(),
        })
        .await;
        assert_eq!(failed.status_code(), 500);
    }

    #[tokio::test]
    async fn rejected_credential_is_unauthenticated() {
        let invalid = authorize_with(ProviderError::InvalidCredential {
            reason: "TOKEN_EXPIRED".to_string(),
        })
        .await;
        assert_eq!(invalid.status_code(), 401);

        let unknown = authorize_with(ProviderError::NotFound {
            uid: Uid::new("gone"),
        })
        .await;
        assert_eq!(unknown.status_code(), 401);
    }
}
