//! Access control for seminar-pulse.
//!
//! This crate provides:
//! - Identity types and custom claims (`UserIdentity`, `CustomClaims`, `Role`)
//! - The identity provider seams (`IdentityProvider`, `PasswordAuthenticator`)
//!   and an in-process implementation (`LocalIdentityProvider`)
//! - The request authorizer used by every privileged route
//! - The claim authority that grants and revokes the admin claim
//! - The client-side session store and credential verifier
//!
//! # Access Control Model
//!
//! The only role distinction is the boolean `admin` custom claim held by the
//! identity provider. It is re-read on every authorization, never cached.
//! The client session record is a convenience for the UI and carries no
//! authority.
//!
//! # Features
//!
//! - `server` (default): the tokio-backed `LocalIdentityProvider` and the
//!   simulated demo-login delay.
//! - `web`: `BrowserStorage` over `localStorage` for wasm32 builds. Build it
//!   with `default-features = false` so tokio is left out.
//!
//! # Example
//!
//! ```
//! use seminar_pulse_access::{
//!     CredentialVerifier, LocalIdentityProvider, MemoryStorage, SessionStore,
//!     TEST_ACCOUNT_EMAIL, TEST_ACCOUNT_PASSWORD,
//! };
//! use std::{sync::Arc, time::Duration};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let verifier = CredentialVerifier::new(
//!     Arc::new(LocalIdentityProvider::new()),
//!     SessionStore::new(MemoryStorage::new()),
//! )
//! .with_demo_delay(Duration::ZERO);
//!
//! verifier
//!     .verify(TEST_ACCOUNT_EMAIL, TEST_ACCOUNT_PASSWORD)
//!     .await
//!     .expect("demo account");
//! assert!(verifier.sessions().is_logged_in());
//! # });
//! ```

pub mod authorizer;
#[cfg(feature = "web")]
pub mod browser;
pub mod claim_authority;
pub mod claims;
pub mod credential;
pub mod error;
pub mod identity;
#[cfg(feature = "server")]
pub mod local;
pub mod provider;
pub mod session;

// Re-export main types at crate root
pub use authorizer::{AuthorizationResult, AuthorizedIdentity, RequestAuthorizer, extract_bearer};
#[cfg(feature = "web")]
pub use browser::BrowserStorage;
pub use claim_authority::ClaimAuthority;
pub use claims::{ADMIN_CLAIM, CustomClaims, Role};
pub use credential::{
    CredentialVerifier, LoginSuccess, TEST_ACCOUNT_EMAIL, TEST_ACCOUNT_PASSWORD,
};
pub use error::{
    AuthenticationError, AuthorizationError, ClaimError, ProviderError, SessionStoreError,
};
pub use identity::{IdentityUpdate, NewIdentity, TokenClaims, UserIdentity};
#[cfg(feature = "server")]
pub use local::LocalIdentityProvider;
pub use provider::{IdentityProvider, PasswordAuthenticator, SignedIn};
pub use session::{MemoryStorage, SESSION_KEY, SessionRecord, SessionStore, StorageBackend};
