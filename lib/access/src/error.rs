//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `ProviderError`: Failures reported by the identity provider
//! - `AuthenticationError`: Client-side login/registration failures
//! - `AuthorizationError`: Request authorization failures (401/403/500)
//! - `ClaimError`: Admin-claim management failures
//! - `SessionStoreError`: Client-local storage failures

use seminar_pulse_core::Uid;
use std::fmt;

/// Errors reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Credential (password or token) was rejected, expired, or belongs to a
    /// disabled identity.
    InvalidCredential { reason: String },
    /// No identity exists with the given uid.
    NotFound { uid: Uid },
    /// An identity with this email already exists.
    EmailExists { email: String },
    /// The provider rejected the request parameters.
    InvalidInput { reason: String },
    /// The provider answered with an unexpected failure.
    RequestFailed { status: u16, reason: String },
    /// The provider could not be reached.
    Unavailable { reason: String },
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredential { reason } => write!(f, "invalid credential: {reason}"),
            Self::NotFound { uid } => write!(f, "identity not found: {uid}"),
            Self::EmailExists { email } => write!(f, "email already in use: {email}"),
            Self::InvalidInput { reason } => write!(f, "invalid provider input: {reason}"),
            Self::RequestFailed { status, reason } => {
                write!(f, "identity provider request failed ({status}): {reason}")
            }
            Self::Unavailable { reason } => {
                write!(f, "identity provider unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors from client-side login and registration.
///
/// Display text is safe to show to the person at the keyboard; provider
/// detail is never carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// Email/password combination was not accepted.
    InvalidCredentials,
    /// A required registration field was missing.
    MissingField { field: &'static str },
    /// The identity provider refused to create the account.
    RegistrationFailed,
    /// The session record could not be persisted.
    SessionNotSaved,
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::MissingField { field } => write!(f, "{field} is required"),
            Self::RegistrationFailed => write!(f, "could not create account"),
            Self::SessionNotSaved => write!(f, "could not save session"),
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from the request authorizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No usable bearer credential, or the provider rejected it.
    Unauthenticated { reason: String },
    /// Credential is valid but lacks the admin claim.
    Forbidden { uid: Uid },
    /// The identity provider could not check the credential.
    Upstream,
}

impl AuthorizationError {
    /// HTTP status code for this failure.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::Upstream => 500,
        }
    }

    /// Short machine-readable category name.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::Upstream => "upstream",
        }
    }
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated { reason } => write!(f, "unauthenticated: {reason}"),
            Self::Forbidden { .. } => write!(f, "admin access required"),
            Self::Upstream => write!(f, "could not verify credential"),
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from admin-claim management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// The request did not name a target identity.
    MissingTarget,
    /// The target identity does not exist.
    TargetNotFound { uid: Uid },
    /// The caller is not an admin.
    Forbidden { uid: Uid },
    /// The identity provider failed.
    Upstream { reason: String },
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "target uid is required"),
            Self::TargetNotFound { uid } => write!(f, "user not found: {uid}"),
            Self::Forbidden { uid } => write!(f, "user {uid} may not change admin claims"),
            Self::Upstream { reason } => write!(f, "claim update failed: {reason}"),
        }
    }
}

impl std::error::Error for ClaimError {}

/// Errors from client-local session storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// Storage is not available in this environment.
    Unavailable,
    /// The storage backend rejected the write.
    WriteFailed { key: String, reason: String },
    /// The record could not be serialized.
    Serialize { reason: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "session storage unavailable"),
            Self::WriteFailed { key, reason } => {
                write!(f, "failed to write '{key}': {reason}")
            }
            Self::Serialize { reason } => write!(f, "failed to serialize session: {reason}"),
        }
    }
}

impl std::error::Error for SessionStoreError {}
