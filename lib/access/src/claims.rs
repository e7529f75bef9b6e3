//! Custom claims and the roles derived from them.
//!
//! The identity provider stores an arbitrary key/value map per identity.
//! The platform only interprets the boolean `admin` key; every other key is
//! carried through untouched when read, but is dropped whenever the admin
//! claim is rewritten (the provider replaces the whole map).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim key carrying the admin flag.
pub const ADMIN_CLAIM: &str = "admin";

/// Platform role derived from the admin claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Marketer with access to events and analytics.
    User,
    /// Administrator who may manage users and claims.
    Admin,
}

impl Role {
    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Maps an admin flag to a role.
    #[must_use]
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::User }
    }

    /// Returns the lowercase role name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom claims map attached to an identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomClaims(Map<String, Value>);

impl CustomClaims {
    /// Creates an empty claims map.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Creates the claims map written by the claim authority: exactly
    /// `{admin: is_admin}`.
    #[must_use]
    pub fn admin_only(is_admin: bool) -> Self {
        let mut map = Map::new();
        map.insert(ADMIN_CLAIM.to_string(), Value::Bool(is_admin));
        Self(map)
    }

    /// Wraps an existing JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parses the JSON-encoded form some providers use on the wire.
    ///
    /// Anything that is not a JSON object yields an empty map.
    #[must_use]
    pub fn from_json_str(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self(map),
            _ => Self::new(),
        }
    }

    /// Encodes the claims as a JSON string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Returns true only if the `admin` claim is the boolean `true`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.0.get(ADMIN_CLAIM), Some(Value::Bool(true)))
    }

    /// Returns the role implied by the claims.
    #[must_use]
    pub fn role(&self) -> Role {
        Role::from_admin_flag(self.is_admin())
    }

    /// Returns a claim value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if no claims are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
