//! Authorization extractors for Axum.
//!
//! Both extractors delegate to the [`RequestAuthorizer`] and reject with its
//! failure unchanged. Place them before any body extractor so a request
//! without a valid credential is refused before its body is read.
//!
//! [`RequestAuthorizer`]: seminar_pulse_access::RequestAuthorizer

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use seminar_pulse_access::AuthorizedIdentity;
use std::sync::Arc;

use crate::error::ApiError;
use crate::state::AppState;

async fn authorize<S>(
    parts: &Parts,
    state: &S,
    require_admin: bool,
) -> Result<AuthorizedIdentity, ApiError>
where
    Arc<AppState>: FromRef<S>,
{
    let app_state = Arc::<AppState>::from_ref(state);
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let identity = app_state.authorizer.authorize(header, require_admin).await?;
    Ok(identity)
}

/// Extractor for requiring any authenticated caller.
pub struct RequireAuth(pub AuthorizedIdentity);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, false).await.map(RequireAuth)
    }
}

/// Extractor for requiring a caller holding the admin claim.
pub struct RequireAdmin(pub AuthorizedIdentity);

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, true).await.map(RequireAdmin)
    }
}
