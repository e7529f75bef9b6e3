//! Identity Toolkit REST client.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use rootcause::prelude::Report;
use seminar_pulse_access::{
    CustomClaims, IdentityProvider, IdentityUpdate, NewIdentity, PasswordAuthenticator,
    ProviderError, SignedIn, TokenClaims, UserIdentity,
};
use seminar_pulse_core::Uid;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::config::IdentityConfig;
use crate::wire::{
    AuthResponse, DeleteRequest, PasswordRequest, TokenLookupRequest, UidLookupRequest,
    UpdateRequest, UserRecord, UsersResponse, error_from_response,
};

/// Largest page the service returns from `accounts:batchGet`.
const MAX_PAGE_SIZE: usize = 1000;

/// Client for an Identity Toolkit-compatible service.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl IdentityToolkitClient {
    /// Creates a client with a default HTTP connection pool.
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a client sharing an existing HTTP connection pool.
    #[must_use]
    pub fn with_http_client(config: IdentityConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    /// URL of a client endpoint, keyed by the API key.
    fn client_url(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{method}?key={}",
            self.config.base_url(),
            self.config.api_key()
        )
    }

    /// URL of a project-scoped administrative endpoint. `suffix` is appended
    /// to `.../accounts`, e.g. `":lookup"`.
    fn admin_url(&self, suffix: &str) -> String {
        format!(
            "{}/v1/projects/{}/accounts{suffix}",
            self.config.base_url(),
            self.config.project_id()
        )
    }

    fn admin_request(&self, method: Method, suffix: &str) -> Result<RequestBuilder, ProviderError> {
        let token = self
            .config
            .service_token()
            .ok_or_else(|| ProviderError::Unavailable {
                reason: "no service token configured for administrative calls".to_string(),
            })?;
        Ok(self
            .http
            .request(method, self.admin_url(suffix))
            .bearer_auth(token))
    }

    /// Sends a request and decodes a successful JSON body. `subject` names
    /// the uid or email the call is about, for error reporting.
    async fn send<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        subject: &str,
    ) -> Result<R, Report<ProviderError>> {
        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = error_from_response(status.as_u16(), &body, subject);
            debug!(status = status.as_u16(), %error, "identity service rejected request");
            return Err(error.into());
        }

        let decoded = response
            .json::<R>()
            .await
            .map_err(|e| ProviderError::RequestFailed {
                status: status.as_u16(),
                reason: format!("malformed response: {e}"),
            })?;
        Ok(decoded)
    }

    async fn lookup_token(&self, id_token: &str) -> Result<UserRecord, Report<ProviderError>> {
        let request = self
            .http
            .post(self.client_url("lookup"))
            .json(&TokenLookupRequest { id_token });
        let response: UsersResponse = self.send(request, "id token").await?;
        let record = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidCredential {
                reason: "token does not resolve to an account".to_string(),
            })?;
        Ok(record)
    }

    async fn password_call(
        &self,
        method: &str,
        body: PasswordRequest<'_>,
    ) -> Result<SignedIn, Report<ProviderError>> {
        let request = self.http.post(self.client_url(method)).json(&body);
        let response: AuthResponse = self.send(request, body.email).await?;
        let id_token = response.id_token.ok_or_else(|| ProviderError::RequestFailed {
            status: 200,
            reason: "response carried no id token".to_string(),
        })?;

        let record = self.lookup_token(&id_token).await?;
        Ok(SignedIn {
            identity: record.into_identity(),
            id_token,
        })
    }
}

#[async_trait]
impl IdentityProvider for IdentityToolkitClient {
    #[instrument(skip(self, token))]
    async fn verify_credential(&self, token: &str) -> Result<TokenClaims, Report<ProviderError>> {
        let record = self.lookup_token(token).await?;
        if record.disabled {
            return Err(ProviderError::InvalidCredential {
                reason: "USER_DISABLED".to_string(),
            }
            .into());
        }

        let admin = record.claims().is_admin();
        debug!(uid = %record.local_id, admin, "credential verified");
        Ok(TokenClaims {
            uid: Uid::new(record.local_id),
            email: record.email,
            admin,
        })
    }

    #[instrument(skip(self, identity), fields(email = %identity.email))]
    async fn create_identity(
        &self,
        identity: NewIdentity,
    ) -> Result<UserIdentity, Report<ProviderError>> {
        let request = self.admin_request(Method::POST, "")?.json(&PasswordRequest {
            email: &identity.email,
            password: &identity.password,
            display_name: identity.display_name.as_deref(),
            return_secure_token: false,
        });
        let created: AuthResponse = self.send(request, &identity.email).await?;
        self.get_identity(&Uid::new(created.local_id)).await
    }

    #[instrument(skip(self))]
    async fn get_identity(&self, uid: &Uid) -> Result<UserIdentity, Report<ProviderError>> {
        let request = self
            .admin_request(Method::POST, ":lookup")?
            .json(&UidLookupRequest {
                local_id: [uid.as_str()],
            });
        let response: UsersResponse = self.send(request, uid.as_str()).await?;
        let record = response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound { uid: uid.clone() })?;
        Ok(record.into_identity())
    }

    #[instrument(skip(self, claims))]
    async fn set_custom_claims(
        &self,
        uid: &Uid,
        claims: CustomClaims,
    ) -> Result<(), Report<ProviderError>> {
        let request = self
            .admin_request(Method::POST, ":update")?
            .json(&UpdateRequest {
                local_id: uid.as_str(),
                custom_attributes: Some(claims.to_json_string()),
                ..UpdateRequest::default()
            });
        let _: serde_json::Value = self.send(request, uid.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_identities(
        &self,
        page_size: usize,
    ) -> Result<Vec<UserIdentity>, Report<ProviderError>> {
        let max_results = page_size.clamp(1, MAX_PAGE_SIZE);
        let request = self
            .admin_request(Method::GET, &format!(":batchGet?maxResults={max_results}"))?;
        let response: UsersResponse = self.send(request, "accounts").await?;
        debug!(count = response.users.len(), "identities listed");
        Ok(response
            .users
            .into_iter()
            .map(UserRecord::into_identity)
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_identity(&self, uid: &Uid) -> Result<(), Report<ProviderError>> {
        let request = self
            .admin_request(Method::POST, ":delete")?
            .json(&DeleteRequest {
                local_id: uid.as_str(),
            });
        let _: serde_json::Value = self.send(request, uid.as_str()).await?;
        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn update_identity(
        &self,
        uid: &Uid,
        update: IdentityUpdate,
    ) -> Result<UserIdentity, Report<ProviderError>> {
        if !update.is_empty() {
            let request = self
                .admin_request(Method::POST, ":update")?
                .json(&UpdateRequest::for_identity(uid, &update));
            let _: serde_json::Value = self.send(request, uid.as_str()).await?;
        }
        self.get_identity(uid).await
    }
}

#[async_trait]
impl PasswordAuthenticator for IdentityToolkitClient {
    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, Report<ProviderError>> {
        self.password_call(
            "signInWithPassword",
            PasswordRequest {
                email,
                password,
                display_name: None,
                return_secure_token: true,
            },
        )
        .await
    }

    #[instrument(skip(self, password))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<SignedIn, Report<ProviderError>> {
        self.password_call(
            "signUp",
            PasswordRequest {
                email,
                password,
                display_name,
                return_secure_token: true,
            },
        )
        .await
    }
}
