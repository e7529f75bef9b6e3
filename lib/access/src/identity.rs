//! User identity types owned by the identity provider.
//!
//! The platform never mutates identity fields directly; it reads
//! [`UserIdentity`] values from the provider and sends [`NewIdentity`] or
//! [`IdentityUpdate`] requests back to it.

use chrono::{DateTime, Utc};
use seminar_pulse_core::Uid;
use serde::{Deserialize, Serialize};

use crate::claims::{CustomClaims, Role};

/// A person known to the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    uid: Uid,
    email: String,
    display_name: Option<String>,
    disabled: bool,
    #[serde(default)]
    custom_claims: CustomClaims,
    created_at: Option<DateTime<Utc>>,
    last_sign_in_at: Option<DateTime<Utc>>,
}

impl UserIdentity {
    /// Creates an enabled identity with no claims.
    #[must_use]
    pub fn new(uid: Uid, email: impl Into<String>) -> Self {
        Self {
            uid,
            email: email.into(),
            display_name: None,
            disabled: false,
            custom_claims: CustomClaims::new(),
            created_at: None,
            last_sign_in_at: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }

    /// Sets the disabled flag.
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Sets the custom claims map.
    #[must_use]
    pub fn with_claims(mut self, claims: CustomClaims) -> Self {
        self.custom_claims = claims;
        self
    }

    /// Sets the provider timestamps.
    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        last_sign_in_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.last_sign_in_at = last_sign_in_at;
        self
    }

    #[must_use]
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    #[must_use]
    pub fn custom_claims(&self) -> &CustomClaims {
        &self.custom_claims
    }

    /// Returns true if the identity carries the admin claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.custom_claims.is_admin()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.custom_claims.role()
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn last_sign_in_at(&self) -> Option<DateTime<Utc>> {
        self.last_sign_in_at
    }

    /// Applies an update in place, the way a provider would.
    pub fn apply(&mut self, update: &IdentityUpdate) {
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(display_name) = &update.display_name {
            self.display_name = (!display_name.is_empty()).then(|| display_name.clone());
        }
        if let Some(disabled) = update.disabled {
            self.disabled = disabled;
        }
    }

    pub(crate) fn set_claims(&mut self, claims: CustomClaims) {
        self.custom_claims = claims;
    }

    pub(crate) fn touch_sign_in(&mut self) {
        self.last_sign_in_at = Some(Utc::now());
    }
}

/// Request to create a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl NewIdentity {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            display_name: None,
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: Option<String>) -> Self {
        self.display_name = display_name;
        self
    }
}

/// Partial update of identity fields. `None` leaves a field unchanged; an
/// empty display name clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityUpdate {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: Option<bool>,
}

impl IdentityUpdate {
    /// Returns true if the update changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.display_name.is_none() && self.disabled.is_none()
    }
}

/// Identity claims decoded from a verified bearer credential.
///
/// The admin flag reflects the claims held by the provider at verification
/// time, not at token issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub uid: Uid,
    pub email: Option<String>,
    pub admin: bool,
}
