//! User profile documents and the joined user view.
//!
//! The identity provider owns identities; the `users` collection keeps a
//! profile per uid. Listings join the two by uid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use seminar_pulse_access::{Role, UserIdentity};
use seminar_pulse_core::Uid;

/// Collection of user profiles, keyed by uid.
pub const USERS_COLLECTION: &str = "users";

/// Collection of per-user settings documents.
pub const USER_SETTINGS_COLLECTION: &str = "user_settings";

/// Collections whose documents carry an owning `uid` and are removed with
/// their user.
pub const USER_SCOPED_COLLECTIONS: [&str; 2] = [USERS_COLLECTION, USER_SETTINGS_COLLECTION];

/// Profile document stored under `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: Uid,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds a profile mirroring an identity.
    #[must_use]
    pub fn for_identity(identity: &UserIdentity) -> Self {
        let now = Utc::now();
        Self {
            uid: identity.uid().clone(),
            email: identity.email().to_string(),
            display_name: identity.display_name().map(str::to_string),
            role: identity.role(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the mirrored fields from an identity.
    pub fn sync_from(&mut self, identity: &UserIdentity) {
        self.email = identity.email().to_string();
        self.display_name = identity.display_name().map(str::to_string);
        self.role = identity.role();
        self.updated_at = Utc::now();
    }
}

/// An identity joined with its profile, as returned by the users API.
///
/// Role and admin flag come from the identity's claims; the profile is
/// informational.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub uid: Uid,
    pub email: String,
    pub display_name: Option<String>,
    pub disabled: bool,
    pub role: Role,
    pub is_admin: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub profile: Option<UserProfile>,
}

impl UserView {
    #[must_use]
    pub fn new(identity: &UserIdentity, profile: Option<UserProfile>) -> Self {
        Self {
            uid: identity.uid().clone(),
            email: identity.email().to_string(),
            display_name: identity.display_name().map(str::to_string),
            disabled: identity.is_disabled(),
            role: identity.role(),
            is_admin: identity.is_admin(),
            created_at: identity.created_at(),
            last_sign_in_at: identity.last_sign_in_at(),
            profile,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seminar_pulse_access::CustomClaims;

    #[test]
    fn view_takes_role_from_claims() {
        let identity = UserIdentity::new(Uid::new("uid-1"), "ada@example.com")
            .with_claims(CustomClaims::admin_only(true));
        let mut profile = UserProfile::for_identity(&identity);
        profile.role = Role::User;

        let view = UserView::new(&identity, Some(profile));
        assert_eq!(view.role, Role::Admin);
        assert!(view.is_admin);

        let json = serde_json::to_value(&view).expect("serialize");
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["profile"]["role"], "user");
    }

    #[test]
    fn sync_refreshes_mirrored_fields() {
        let identity = UserIdentity::new(Uid::new("uid-1"), "old@example.com");
        let mut profile = UserProfile::for_identity(&identity);
        let renamed = UserIdentity::new(Uid::new("uid-1"), "new@example.com")
            .with_display_name(Some("Ada".to_string()))
            .with_claims(CustomClaims::admin_only(true));
        profile.sync_from(&renamed);
        assert_eq!(profile.email, "new@example.com");
        assert_eq!(profile.display_name.as_deref(), Some("Ada"));
        assert_eq!(profile.role, Role::Admin);
    }
}
