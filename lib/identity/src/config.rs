//! Identity service configuration.

use serde::Deserialize;

/// Public Identity Toolkit endpoint.
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Identity service configuration.
///
/// Typically loaded from environment variables through the server's
/// `config` source (e.g. `IDENTITY__API_KEY`, `IDENTITY__PROJECT_ID`).
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Web API key used for client endpoints.
    api_key: String,
    /// Project owning the identities.
    project_id: String,
    /// Bearer token for administrative endpoints. The emulator accepts
    /// `owner`.
    #[serde(default)]
    service_token: Option<String>,
    /// Service root, without the `/v1` suffix.
    /// Default: the public Identity Toolkit endpoint
    #[serde(default = "default_base_url")]
    base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl IdentityConfig {
    /// Creates a configuration against the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            service_token: None,
            base_url: default_base_url(),
        }
    }

    /// Sets the administrative bearer token.
    #[must_use]
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    /// Points the client at another service root, such as the emulator.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[must_use]
    pub fn service_token(&self) -> Option<&str> {
        self.service_token.as_deref()
    }

    /// Returns the service root with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
