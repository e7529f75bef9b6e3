//! HTTP error responses.
//!
//! Every handler failure becomes an [`ApiError`], rendered as
//! `{"success": false, "error": <category>, "message": <text>}`.
//! Authorizer failures keep their category and message; everything else is
//! logged here and replaced with a generic message.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::prelude::Report;
use serde::Serialize;
use seminar_pulse_access::{AuthorizationError, ClaimError, ProviderError};
use seminar_pulse_marketing::ValidationError;
use seminar_pulse_store::StoreError;
use std::fmt;
use tracing::{error, warn};

/// A failed API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request body or parameters were rejected.
    Validation { message: String },
    /// No valid bearer credential.
    Unauthenticated { message: String },
    /// Credential valid but not allowed.
    Forbidden { message: String },
    /// The addressed resource does not exist.
    NotFound { message: String },
    /// A backing service failed.
    Upstream,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Upstream => "upstream",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Validation { message }
            | Self::Unauthenticated { message }
            | Self::Forbidden { message }
            | Self::NotFound { message } => message,
            Self::Upstream => "internal server error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category(), self.message())
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.category(),
            message: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::Unauthenticated { reason } => Self::Unauthenticated {
                message: reason,
            },
            forbidden @ AuthorizationError::Forbidden { .. } => Self::Forbidden {
                message: forbidden.to_string(),
            },
            AuthorizationError::Upstream => Self::Upstream,
        }
    }
}

impl From<Report<ClaimError>> for ApiError {
    fn from(report: Report<ClaimError>) -> Self {
        match report.current_context() {
            ClaimError::MissingTarget => Self::validation("uid is required"),
            ClaimError::TargetNotFound { .. } => Self::not_found("user not found"),
            ClaimError::Forbidden { .. } => Self::Forbidden {
                message: "admin access required".to_string(),
            },
            ClaimError::Upstream { .. } => {
                error!(error = %report, "admin claim update failed");
                Self::Upstream
            }
        }
    }
}

impl From<Report<ProviderError>> for ApiError {
    fn from(report: Report<ProviderError>) -> Self {
        match report.current_context() {
            ProviderError::NotFound { .. } => Self::not_found("user not found"),
            ProviderError::EmailExists { .. } => Self::validation("email already in use"),
            ProviderError::InvalidInput { .. } => {
                warn!(error = %report, "identity provider rejected input");
                Self::validation("invalid user details")
            }
            _ => {
                error!(error = %report, "identity provider call failed");
                Self::Upstream
            }
        }
    }
}

impl From<Report<StoreError>> for ApiError {
    fn from(report: Report<StoreError>) -> Self {
        match report.current_context() {
            StoreError::NotFound { .. } => Self::not_found("document not found"),
            _ => {
                error!(error = %report, "document store call failed");
                Self::Upstream
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seminar_pulse_core::Uid;

    #[test]
    fn authorizer_failures_pass_through() {
        let unauthenticated = ApiError::from(AuthorizationError::Unauthenticated {
            reason: "missing or malformed bearer credential".to_string(),
        });
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            unauthenticated.message(),
            "missing or malformed bearer credential"
        );

        let forbidden = ApiError::from(AuthorizationError::Forbidden {
            uid: Uid::new("uid-1"),
        });
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(forbidden.message(), "admin access required");

        let upstream = ApiError::from(AuthorizationError::Upstream);
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream.category(), "upstream");
    }

    #[test]
    fn provider_detail_is_not_exposed() {
        let report: Report<ProviderError> = ProviderError::Unavailable {
            reason: "connection refused to 10.0.0.3".to_string(),
        }
        .into();
        let err = ApiError::from(report);
        assert_eq!(err, ApiError::Upstream);
        assert!(!err.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn claim_errors_map_to_statuses() {
        let cases = [
            (ClaimError::MissingTarget, StatusCode::BAD_REQUEST),
            (
                ClaimError::TargetNotFound {
                    uid: Uid::new("ghost"),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ClaimError::Forbidden {
                    uid: Uid::new("uid-1"),
                },
                StatusCode::FORBIDDEN,
            ),
            (
                ClaimError::Upstream {
                    reason: "boom".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (claim_error, status) in cases {
            let report: Report<ClaimError> = claim_error.into();
            assert_eq!(ApiError::from(report).status(), status);
        }
    }

    #[test]
    fn store_not_found_is_404() {
        let report: Report<StoreError> = StoreError::NotFound {
            collection: "marketing_events".to_string(),
            id: "evt_x".to_string(),
        }
        .into();
        assert_eq!(ApiError::from(report).status(), StatusCode::NOT_FOUND);
    }
}
