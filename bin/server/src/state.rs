//! Shared application state.

use seminar_pulse_access::{ClaimAuthority, IdentityProvider, RequestAuthorizer};
use seminar_pulse_store::DocumentStore;
use std::sync::Arc;

use crate::config::ListingConfig;

/// State shared by every handler.
pub struct AppState {
    /// Checks bearer credentials on privileged routes.
    pub authorizer: RequestAuthorizer,
    /// Grants and revokes the admin claim.
    pub claims: ClaimAuthority,
    /// Identity provider for user administration.
    pub provider: Arc<dyn IdentityProvider>,
    /// Document database.
    pub store: Arc<dyn DocumentStore>,
    /// Listing limits.
    pub listing: ListingConfig,
}

impl AppState {
    /// Creates a new application state around one identity provider.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        listing: ListingConfig,
    ) -> Self {
        Self {
            authorizer: RequestAuthorizer::new(provider.clone()),
            claims: ClaimAuthority::new(provider.clone()),
            provider,
            store,
            listing,
        }
    }
}
