//! Identity provider seams.
//!
//! [`IdentityProvider`] is the privileged, server-side contract (token
//! verification and identity administration). [`PasswordAuthenticator`] is
//! the client-facing contract used by the credential verifier.

use async_trait::async_trait;
use rootcause::prelude::Report;
use seminar_pulse_core::Uid;

use crate::claims::CustomClaims;
use crate::error::ProviderError;
use crate::identity::{IdentityUpdate, NewIdentity, TokenClaims, UserIdentity};

/// Server-side identity provider operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a bearer credential and returns the claims of its identity.
    ///
    /// Implementations must read the admin flag from the provider's current
    /// state, so claim changes apply to already-issued credentials.
    async fn verify_credential(&self, token: &str) -> Result<TokenClaims, Report<ProviderError>>;

    /// Creates a new identity.
    async fn create_identity(
        &self,
        identity: NewIdentity,
    ) -> Result<UserIdentity, Report<ProviderError>>;

    /// Fetches an identity by uid. Unknown uids yield `ProviderError::NotFound`.
    async fn get_identity(&self, uid: &Uid) -> Result<UserIdentity, Report<ProviderError>>;

    /// Replaces the identity's custom claims map.
    async fn set_custom_claims(
        &self,
        uid: &Uid,
        claims: CustomClaims,
    ) -> Result<(), Report<ProviderError>>;

    /// Lists up to `page_size` identities.
    async fn list_identities(
        &self,
        page_size: usize,
    ) -> Result<Vec<UserIdentity>, Report<ProviderError>>;

    /// Deletes an identity.
    async fn delete_identity(&self, uid: &Uid) -> Result<(), Report<ProviderError>>;

    /// Updates identity fields and returns the result.
    async fn update_identity(
        &self,
        uid: &Uid,
        update: IdentityUpdate,
    ) -> Result<UserIdentity, Report<ProviderError>>;
}

/// Result of a successful password sign-in or sign-up.
#[derive(Debug, Clone)]
pub struct SignedIn {
    /// The authenticated identity.
    pub identity: UserIdentity,
    /// Bearer credential to present on later API calls.
    pub id_token: String,
}

/// Client-facing password authentication.
#[async_trait]
pub trait PasswordAuthenticator: Send + Sync {
    /// Checks an email/password pair.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, Report<ProviderError>>;

    /// Registers a new email/password identity.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignedIn, Report<ProviderError>>;
}
