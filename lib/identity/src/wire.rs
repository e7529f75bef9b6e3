//! Identity Toolkit request and response bodies.

use chrono::{DateTime, Utc};
use seminar_pulse_access::{CustomClaims, IdentityUpdate, ProviderError, UserIdentity};
use seminar_pulse_core::Uid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    pub return_secure_token: bool,
}

/// Response of `signInWithPassword`, `signUp` and admin account creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponse {
    pub local_id: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenLookupRequest<'a> {
    pub id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UidLookupRequest<'a> {
    pub local_id: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteRequest<'a> {
    pub local_id: &'a str,
}

/// Body of `accounts:update`. Absent fields are left unchanged.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateRequest<'a> {
    pub local_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_user: Option<bool>,
    /// Attributes to clear, e.g. `DISPLAY_NAME`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete_attribute: Vec<&'static str>,
    /// Serialized claims object; replaces the stored claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<String>,
}

impl<'a> UpdateRequest<'a> {
    /// Body for an identity field update. An empty display name is cleared.
    pub fn for_identity(uid: &'a Uid, update: &'a IdentityUpdate) -> Self {
        let (display_name, delete_attribute) = match update.display_name.as_deref() {
            Some("") => (None, vec!["DISPLAY_NAME"]),
            name => (name, Vec::new()),
        };
        Self {
            local_id: uid.as_str(),
            email: update.email.as_deref(),
            display_name,
            disable_user: update.disabled,
            delete_attribute,
            custom_attributes: None,
        }
    }
}

/// Response of `accounts:lookup` and `accounts:batchGet`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsersResponse {
    #[serde(default)]
    pub users: Vec<UserRecord>,
}

/// One account as reported by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRecord {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub custom_attributes: Option<String>,
    /// Milliseconds since the epoch, as a decimal string.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login_at: Option<String>,
}

fn millis(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis)
}

impl UserRecord {
    pub fn claims(&self) -> CustomClaims {
        self.custom_attributes
            .as_deref()
            .map(CustomClaims::from_json_str)
            .unwrap_or_default()
    }

    pub fn into_identity(self) -> UserIdentity {
        let claims = self.claims();
        let created_at = millis(self.created_at.as_deref());
        let last_sign_in_at = millis(self.last_login_at.as_deref());
        UserIdentity::new(Uid::new(self.local_id), self.email.unwrap_or_default())
            .with_display_name(self.display_name.filter(|n| !n.is_empty()))
            .with_disabled(self.disabled)
            .with_claims(claims)
            .with_timestamps(created_at, last_sign_in_at)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Maps an error response to a provider error.
///
/// The service reports a code in `error.message`, optionally followed by
/// ` : detail` (e.g. `WEAK_PASSWORD : Password should be at least 6
/// characters`).
pub(crate) fn error_from_response(status: u16, body: &str, subject: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_default();
    let code = message.split(" : ").next().unwrap_or_default().trim();

    match code {
        "EMAIL_NOT_FOUND"
        | "INVALID_PASSWORD"
        | "INVALID_LOGIN_CREDENTIALS"
        | "USER_DISABLED"
        | "INVALID_ID_TOKEN"
        | "TOKEN_EXPIRED"
        | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => ProviderError::InvalidCredential {
            reason: code.to_string(),
        },
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => ProviderError::EmailExists {
            email: subject.to_string(),
        },
        "USER_NOT_FOUND" => ProviderError::NotFound {
            uid: Uid::new(subject),
        },
        "WEAK_PASSWORD" | "INVALID_EMAIL" | "MISSING_PASSWORD" | "MISSING_EMAIL"
        | "INVALID_CLAIMS" | "CLAIMS_TOO_LARGE" => ProviderError::InvalidInput {
            reason: message.clone(),
        },
        "" => ProviderError::RequestFailed {
            status,
            reason: "unrecognized error response".to_string(),
        },
        _ => ProviderError::RequestFailed {
            status,
            reason: message.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(message: &str) -> String {
        json!({"error": {"code": 400, "message": message}}).to_string()
    }

    #[test]
    fn credential_codes_map_to_invalid_credential() {
        for code in ["INVALID_LOGIN_CREDENTIALS", "USER_DISABLED", "TOKEN_EXPIRED"] {
            assert_eq!(
                error_from_response(400, &envelope(code), "a@b.c"),
                ProviderError::InvalidCredential {
                    reason: code.to_string()
                }
            );
        }
    }

    #[test]
    fn detail_suffix_is_stripped_from_code() {
        let err = error_from_response(
            400,
            &envelope("WEAK_PASSWORD : Password should be at least 6 characters"),
            "a@b.c",
        );
        assert!(matches!(err, ProviderError::InvalidInput { .. }));
    }

    #[test]
    fn subject_fills_not_found_and_email_exists() {
        assert_eq!(
            error_from_response(400, &envelope("USER_NOT_FOUND"), "uid-9"),
            ProviderError::NotFound {
                uid: Uid::new("uid-9")
            }
        );
        assert_eq!(
            error_from_response(400, &envelope("EMAIL_EXISTS"), "dup@example.com"),
            ProviderError::EmailExists {
                email: "dup@example.com".to_string()
            }
        );
    }

    #[test]
    fn unknown_and_garbled_bodies() {
        assert!(matches!(
            error_from_response(500, &envelope("INTERNAL"), "x"),
            ProviderError::RequestFailed { status: 500, .. }
        ));
        assert!(matches!(
            error_from_response(502, "<html>bad gateway</html>", "x"),
            ProviderError::RequestFailed { status: 502, .. }
        ));
    }

    #[test]
    fn user_record_becomes_identity() {
        let record: UserRecord = serde_json::from_value(json!({
            "localId": "uid-1",
            "email": "ada@example.com",
            "displayName": "Ada",
            "customAttributes": "{\"admin\":true}",
            "createdAt": "1767225600000",
            "lastLoginAt": "not-a-number"
        }))
        .expect("deserialize");

        let identity = record.into_identity();
        assert_eq!(identity.uid().as_str(), "uid-1");
        assert_eq!(identity.display_name(), Some("Ada"));
        assert!(identity.is_admin());
        assert!(!identity.is_disabled());
        assert_eq!(
            identity.created_at().map(|t| t.timestamp()),
            Some(1_767_225_600)
        );
        assert_eq!(identity.last_sign_in_at(), None);
    }

    #[test]
    fn missing_claims_are_empty() {
        let record: UserRecord =
            serde_json::from_value(json!({"localId": "uid-2"})).expect("deserialize");
        assert!(record.claims().is_empty());
        assert_eq!(record.into_identity().email(), "");
    }

    #[test]
    fn update_request_omits_absent_fields() {
        let body = serde_json::to_value(UpdateRequest {
            local_id: "uid-1",
            custom_attributes: Some("{\"admin\":false}".to_string()),
            ..UpdateRequest::default()
        })
        .expect("serialize");
        assert_eq!(
            body,
            json!({"localId": "uid-1", "customAttributes": "{\"admin\":false}"})
        );
    }

    #[test]
    fn blank_display_name_is_deleted() {
        let uid = Uid::new("uid-1");
        let update = IdentityUpdate {
            display_name: Some(String::new()),
            disabled: Some(false),
            ..IdentityUpdate::default()
        };
        let body = serde_json::to_value(UpdateRequest::for_identity(&uid, &update))
            .expect("serialize");
        assert_eq!(
            body,
            json!({"localId": "uid-1", "disableUser": false, "deleteAttribute": ["DISPLAY_NAME"]})
        );

        let rename = IdentityUpdate {
            display_name: Some("Ada".to_string()),
            ..IdentityUpdate::default()
        };
        let body = serde_json::to_value(UpdateRequest::for_identity(&uid, &rename))
            .expect("serialize");
        assert_eq!(body, json!({"localId": "uid-1", "displayName": "Ada"}));
    }
}
