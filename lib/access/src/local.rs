//! In-process identity provider.
//!
//! Used for local development when no hosted provider is configured and as
//! the provider double in tests. Uids are locally scoped (`local_<ulid>`)
//! and credentials are opaque random tokens mapped back to a uid.
//! Passwords are held in memory as given; never point this at real users.

use async_trait::async_trait;
use chrono::Utc;
use rootcause::prelude::Report;
use seminar_pulse_core::Uid;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::claims::CustomClaims;
use crate::error::ProviderError;
use crate::identity::{IdentityUpdate, NewIdentity, TokenClaims, UserIdentity};
use crate::provider::{IdentityProvider, PasswordAuthenticator, SignedIn};

/// Minimum password length accepted for new identities.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Live credentials kept per identity; issuing past this drops the oldest.
pub const MAX_TOKENS_PER_IDENTITY: usize = 16;

struct Account {
    identity: UserIdentity,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: BTreeMap<Uid, Account>,
    tokens: HashMap<String, Uid>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<&Uid>) -> bool {
        self.accounts.iter().any(|(uid, account)| {
            Some(uid) != except && account.identity.email().eq_ignore_ascii_case(email)
        })
    }

    fn issue_token(&mut self, uid: &Uid) -> String {
        let mut issued: Vec<String> = self
            .tokens
            .iter()
            .filter(|(_, owner)| *owner == uid)
            .map(|(token, _)| token.clone())
            .collect();
        if issued.len() >= MAX_TOKENS_PER_IDENTITY {
            // Ulid suffixes sort by issue time.
            issued.sort();
            let excess = issued.len() + 1 - MAX_TOKENS_PER_IDENTITY;
            for stale in &issued[..excess] {
                self.tokens.remove(stale);
            }
        }

        let token = format!("local-token_{}", ulid::Ulid::new());
        self.tokens.insert(token.clone(), uid.clone());
        token
    }

    fn insert(&mut self, new: NewIdentity) -> Result<UserIdentity, ProviderError> {
        let email = new.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(ProviderError::InvalidInput {
                reason: "invalid email".to_string(),
            });
        }
        if new.password.len() < MIN_PASSWORD_LEN {
            return Err(ProviderError::InvalidInput {
                reason: format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        if self.email_taken(&email, None) {
            return Err(ProviderError::EmailExists { email });
        }

        let uid = Uid::new(format!("local_{}", ulid::Ulid::new()));
        let identity = UserIdentity::new(uid.clone(), email)
            .with_display_name(new.display_name)
            .with_timestamps(Some(Utc::now()), None);
        self.accounts.insert(
            uid,
            Account {
                identity: identity.clone(),
                password: new.password,
            },
        );
        Ok(identity)
    }
}

/// Identity provider backed by in-memory maps.
///
/// Tokens never expire; each identity keeps at most
/// [`MAX_TOKENS_PER_IDENTITY`] of them and deleting the identity drops all.
#[derive(Default)]
pub struct LocalIdentityProvider {
    state: RwLock<State>,
}

impl LocalIdentityProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an identity with a fixed uid, replacing any existing one.
    ///
    /// Used to seed fixtures and the bootstrap admin.
    pub async fn insert_identity(&self, identity: UserIdentity, password: impl Into<String>) {
        let mut state = self.state.write().await;
        state.accounts.insert(
            identity.uid().clone(),
            Account {
                identity,
                password: password.into(),
            },
        );
    }

    /// Issues a bearer credential for an existing identity.
    pub async fn issue_token(&self, uid: &Uid) -> Result<String, Report<ProviderError>> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(uid) {
            return Err(ProviderError::NotFound { uid: uid.clone() }.into());
        }
        Ok(state.issue_token(uid))
    }

    /// Returns the number of identities held.
    pub async fn len(&self) -> usize {
        self.state.read().await.accounts.len()
    }

    /// Returns true if no identities are held.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.accounts.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn verify_credential(&self, token: &str) -> Result<TokenClaims, Report<ProviderError>> {
        let state = self.state.read().await;
        let account = state
            .tokens
            .get(token)
            .and_then(|uid| state.accounts.get(uid))
            .ok_or_else(|| ProviderError::InvalidCredential {
                reason: "unknown token".to_string(),
            })?;

        if account.identity.is_disabled() {
            return Err(ProviderError::InvalidCredential {
                reason: "identity disabled".to_string(),
            }
            .into());
        }

        Ok(TokenClaims {
            uid: account.identity.uid().clone(),
            email: Some(account.identity.email().to_string()),
            admin: account.identity.is_admin(),
        })
    }

    async fn create_identity(
        &self,
        identity: NewIdentity,
    ) -> Result<UserIdentity, Report<ProviderError>> {
        let mut state = self.state.write().await;
        let created = state.insert(identity)?;
        debug!(uid = %created.uid(), "local identity created");
        Ok(created)
    }

    async fn get_identity(&self, uid: &Uid) -> Result<UserIdentity, Report<ProviderError>> {
        let state = self.state.read().await;
        state
            .accounts
            .get(uid)
            .map(|account| account.identity.clone())
            .ok_or_else(|| ProviderError::NotFound { uid: uid.clone() }.into())
    }

    async fn set_custom_claims(
        &self,
        uid: &Uid,
        claims: CustomClaims,
    ) -> Result<(), Report<ProviderError>> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(uid)
            .ok_or_else(|| ProviderError::NotFound { uid: uid.clone() })?;
        account.identity.set_claims(claims);
        Ok(())
    }

    async fn list_identities(
        &self,
        page_size: usize,
    ) -> Result<Vec<UserIdentity>, Report<ProviderError>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .take(page_size)
            .map(|account| account.identity.clone())
            .collect())
    }

    async fn delete_identity(&self, uid: &Uid) -> Result<(), Report<ProviderError>> {
        let mut state = self.state.write().await;
        if state.accounts.remove(uid).is_none() {
            return Err(ProviderError::NotFound { uid: uid.clone() }.into());
        }
        state.tokens.retain(|_, owner| owner != uid);
        Ok(())
    }

    async fn update_identity(
        &self,
        uid: &Uid,
        update: IdentityUpdate,
    ) -> Result<UserIdentity, Report<ProviderError>> {
        let mut state = self.state.write().await;
        if let Some(email) = &update.email {
            if state.email_taken(email, Some(uid)) {
                return Err(ProviderError::EmailExists {
                    email: email.clone(),
                }
                .into());
            }
        }
        let account = state
            .accounts
            .get_mut(uid)
            .ok_or_else(|| ProviderError::NotFound { uid: uid.clone() })?;
        account.identity.apply(&update);
        Ok(account.identity.clone())
    }
}

#[async_trait]
impl PasswordAuthenticator for LocalIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, Report<ProviderError>> {
        let mut state = self.state.write().await;
        let uid = state
            .accounts
            .iter()
            .find(|(_, account)| {
                account.identity.email().eq_ignore_ascii_case(email)
                    && account.password == password
                    && !account.identity.is_disabled()
            })
            .map(|(uid, _)| uid.clone())
            .ok_or_else(|| ProviderError::InvalidCredential {
                reason: "email or password rejected".to_string(),
            })?;

        let id_token = state.issue_token(&uid);
        let account = state
            .accounts
            .get_mut(&uid)
            .ok_or_else(|| ProviderError::NotFound { uid: uid.clone() })?;
        account.identity.touch_sign_in();

        Ok(SignedIn {
            identity: account.identity.clone(),
            id_token,
        })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignedIn, Report<ProviderError>> {
        let mut state = self.state.write().await;
        let identity = state.insert(
            NewIdentity::new(email, password).with_display_name(display_name.map(str::to_string)),
        )?;
        let id_token = state.issue_token(identity.uid());
        Ok(SignedIn { identity, id_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_then_verify_token() {
        let provider = LocalIdentityProvider::new();
        let signed_in = provider
            .sign_up("alice@example.com", "secret-pw", Some("Alice"))
            .await
            .expect("sign up");

        assert!(signed_in.identity.uid().as_str().starts_with("local_"));
        assert_eq!(signed_in.identity.display_name(), Some("Alice"));

        let claims = provider
            .verify_credential(&signed_in.id_token)
            .await
            .expect("verify");
        assert_eq!(&claims.uid, signed_in.identity.uid());
        assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
        assert!(!claims.admin);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let provider = LocalIdentityProvider::new();
        provider
            .create_identity(NewIdentity::new("a@example.com", "secret-pw"))
            .await
            .expect("first");
        let err = provider
            .create_identity(NewIdentity::new("A@example.com", "secret-pw"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::EmailExists { .. }
        ));
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let provider = LocalIdentityProvider::new();
        let err = provider
            .create_identity(NewIdentity::new("a@example.com", "123"))
            .await
            .unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::InvalidInput { .. }
        ));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let provider = LocalIdentityProvider::new();
        let err = provider.verify_credential("nope").await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            ProviderError::InvalidCredential { .. }
        ));
    }

    #[tokio::test]
    async fn claims_are_read_at_verification_time() {
        let provider = LocalIdentityProvider::new();
        let uid = Uid::new("uid-1");
        provider
            .insert_identity(UserIdentity::new(uid.clone(), "u1@example.com"), "secret-pw")
            .await;
        let token = provider.issue_token(&uid).await.expect("token");

        assert!(!provider.verify_credential(&token).await.expect("verify").admin);
        provider
            .set_custom_claims(&uid, CustomClaims::admin_only(true))
            .await
            .expect("claims");
        assert!(provider.verify_credential(&token).await.expect("verify").admin);
    }

    #[tokio::test]
    async fn disabled_identity_cannot_authenticate() {
        let provider = LocalIdentityProvider::new();
        let uid = Uid::new("uid-1");
        provider
            .insert_identity(UserIdentity::new(uid.clone(), "u1@example.com"), "secret-pw")
            .await;
        let token = provider.issue_token(&uid).await.expect("token");

        provider
            .update_identity(
                &uid,
                IdentityUpdate {
                    disabled: Some(true),
                    ..IdentityUpdate::default()
                },
            )
            .await
            .expect("update");

        assert!(provider.verify_credential(&token).await.is_err());
        assert!(provider.sign_in("u1@example.com", "secret-pw").await.is_err());
    }

    #[tokio::test]
    async fn delete_revokes_tokens() {
        let provider = LocalIdentityProvider::new();
        let uid = Uid::new("uid-2");
        provider
            .insert_identity(UserIdentity::new(uid.clone(), "u2@example.com"), "secret-pw")
            .await;
        let token = provider.issue_token(&uid).await.expect("token");

        provider.delete_identity(&uid).await.expect("delete");

        assert!(provider.verify_credential(&token).await.is_err());
        let err = provider.get_identity(&uid).await.unwrap_err();
        assert!(matches!(err.current_context(), ProviderError::NotFound { .. }));
        assert!(provider.is_empty().await);
    }

    #[tokio::test]
    async fn list_respects_page_size() {
        let provider = LocalIdentityProvider::new();
        for i in 0..5 {
            provider
                .create_identity(NewIdentity::new(format!("u{i}@example.com"), "secret-pw"))
                .await
                .expect("create");
        }
        assert_eq!(provider.list_identities(3).await.expect("list").len(), 3);
        assert_eq!(provider.len().await, 5);
    }

    #[tokio::test]
    async fn token_map_is_capped_per_identity() {
        let provider = LocalIdentityProvider::new();
        let uid = Uid::new("uid-1");
        provider
            .insert_identity(UserIdentity::new(uid.clone(), "u1@example.com"), "secret-pw")
            .await;

        let mut latest = String::new();
        for _ in 0..MAX_TOKENS_PER_IDENTITY + 5 {
            latest = provider.issue_token(&uid).await.expect("token");
        }

        assert_eq!(provider.state.read().await.tokens.len(), MAX_TOKENS_PER_IDENTITY);
        assert!(provider.verify_credential(&latest).await.is_ok());
    }
}
