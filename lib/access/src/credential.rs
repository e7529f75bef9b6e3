//! Client-side login and registration.
//!
//! The verifier checks email/password pairs against the identity provider
//! and, on success, writes the session record. One fixed demo account is
//! accepted without contacting the provider so the dashboard can be shown
//! with sample data.

use rootcause::prelude::Report;
use seminar_pulse_core::Uid;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::AuthenticationError;
use crate::identity::UserIdentity;
use crate::provider::PasswordAuthenticator;
use crate::session::{SessionRecord, SessionStore, StorageBackend};

/// Email of the built-in demo account.
pub const TEST_ACCOUNT_EMAIL: &str = "test@example.com";

/// Password of the built-in demo account.
pub const TEST_ACCOUNT_PASSWORD: &str = "password123";

/// Uid given to the synthetic demo identity.
pub const TEST_ACCOUNT_UID: &str = "test-user";

/// Simulated latency of a demo-account login.
pub const DEFAULT_DEMO_DELAY: Duration = Duration::from_millis(500);

#[cfg(feature = "server")]
async fn demo_pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// Browser builds have no tokio timer; the demo login answers immediately.
#[cfg(not(feature = "server"))]
async fn demo_pause(_delay: Duration) {}

/// A successful login or registration.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    /// The identity that logged in.
    pub identity: UserIdentity,
    /// Bearer credential for API calls; absent for the demo account.
    pub id_token: Option<String>,
    /// The session record that was persisted.
    pub session: SessionRecord,
}

/// Verifies credentials and maintains the client session record.
pub struct CredentialVerifier<B> {
    authenticator: Arc<dyn PasswordAuthenticator>,
    sessions: SessionStore<B>,
    demo_delay: Duration,
}

impl<B: StorageBackend> CredentialVerifier<B> {
    #[must_use]
    pub fn new(authenticator: Arc<dyn PasswordAuthenticator>, sessions: SessionStore<B>) -> Self {
        Self {
            authenticator,
            sessions,
            demo_delay: DEFAULT_DEMO_DELAY,
        }
    }

    /// Overrides the simulated demo-account latency.
    #[must_use]
    pub fn with_demo_delay(mut self, delay: Duration) -> Self {
        self.demo_delay = delay;
        self
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore<B> {
        &self.sessions
    }

    /// Checks an email/password pair and persists a session on success.
    ///
    /// Failures never write or overwrite the stored session record.
    pub async fn verify(
        &self,
        email: &str,
        password: &str,
    ) -> Result<LoginSuccess, Report<AuthenticationError>> {
        if email == TEST_ACCOUNT_EMAIL && password == TEST_ACCOUNT_PASSWORD {
            demo_pause(self.demo_delay).await;
            let identity = UserIdentity::new(Uid::new(TEST_ACCOUNT_UID), TEST_ACCOUNT_EMAIL)
                .with_display_name(Some("Test User".to_string()));
            let session = SessionRecord::logged_in(TEST_ACCOUNT_EMAIL, Some("Test User".to_string()))
                .with_has_data(true);
            self.persist(&session)?;
            info!("demo account logged in");
            return Ok(LoginSuccess {
                identity,
                id_token: None,
                session,
            });
        }

        let signed_in = self
            .authenticator
            .sign_in(email, password)
            .await
            .map_err(|report| {
                debug!(error = %report, "sign-in rejected by provider");
                AuthenticationError::InvalidCredentials
            })?;

        let session = SessionRecord::logged_in(
            signed_in.identity.email(),
            signed_in.identity.display_name().map(str::to_string),
        );
        self.persist(&session)?;
        info!(uid = %signed_in.identity.uid(), "logged in");

        Ok(LoginSuccess {
            identity: signed_in.identity,
            id_token: Some(signed_in.id_token),
            session,
        })
    }

    /// Creates an account and persists a fresh session for it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<LoginSuccess, Report<AuthenticationError>> {
        for (field, value) in [("email", email), ("password", password), ("name", name)] {
            if value.trim().is_empty() {
                return Err(AuthenticationError::MissingField { field }.into());
            }
        }

        let signed_in = self
            .authenticator
            .sign_up(email.trim(), password, Some(name.trim()))
            .await
            .map_err(|report| {
                warn!(error = %report, "registration rejected by provider");
                AuthenticationError::RegistrationFailed
            })?;

        let session = SessionRecord::logged_in(
            signed_in.identity.email(),
            signed_in.identity.display_name().map(str::to_string),
        )
        .with_has_data(false);
        self.persist(&session)?;
        info!(uid = %signed_in.identity.uid(), "registered");

        Ok(LoginSuccess {
            identity: signed_in.identity,
            id_token: Some(signed_in.id_token),
            session,
        })
    }

    /// Drops the stored session.
    pub fn logout(&self) {
        self.sessions.clear();
    }

    /// Returns the stored session, if any.
    #[must_use]
    pub fn current_session(&self) -> Option<SessionRecord> {
        self.sessions.load()
    }

    fn persist(&self, session: &SessionRecord) -> Result<(), Report<AuthenticationError>> {
        self.sessions.save(session).map_err(|e| {
            warn!(error = %e, "failed to persist session");
            AuthenticationError::SessionNotSaved
        })?;
        Ok(())
    }
}
