//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables
//! (e.g. `BIND_ADDR`, `DATABASE_URL`, `IDENTITY__API_KEY`).
//!
//! See [`IdentityConfig`] for identity service configuration.

use serde::Deserialize;
use seminar_pulse_identity::IdentityConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL database connection URL. Without it documents are kept in
    /// memory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Identity service configuration. Without it a local in-process
    /// identity provider is used.
    #[serde(default)]
    pub identity: Option<IdentityConfig>,

    /// Listing limits.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Bootstrap admin for the local identity provider.
    #[serde(default)]
    pub local_admin: LocalAdminConfig,
}

/// Listing-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Page size requested from the identity provider when listing users.
    #[serde(default = "default_user_page_size")]
    pub user_page_size: usize,

    /// Upper bound on the `limit` accepted by event listings.
    #[serde(default = "default_max_event_limit")]
    pub max_event_limit: usize,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_user_page_size() -> usize {
    1000
}

fn default_max_event_limit() -> usize {
    500
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            user_page_size: default_user_page_size(),
            max_event_limit: default_max_event_limit(),
        }
    }
}

/// Admin identity seeded into the local identity provider at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalAdminConfig {
    #[serde(default = "default_local_admin_email")]
    pub email: String,

    #[serde(default = "default_local_admin_password")]
    pub password: String,
}

fn default_local_admin_email() -> String {
    "admin@localhost".to_string()
}

fn default_local_admin_password() -> String {
    "change-me-locally".to_string()
}

impl Default for LocalAdminConfig {
    fn default() -> Self {
        Self {
            email: default_local_admin_email(),
            password: default_local_admin_password(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
