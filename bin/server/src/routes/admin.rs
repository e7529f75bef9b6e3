//! Admin claim management and credential verification.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use seminar_pulse_access::Role;
use seminar_pulse_core::Uid;
use seminar_pulse_store::{Document, StoreError};
use serde_json::Value;
use std::sync::Arc;

use crate::audit::{self, ADMIN_CLAIM_SET, AuditEntry};
use crate::auth::{RequireAdmin, RequireAuth};
use crate::error::ApiError;
use crate::profile::{USERS_COLLECTION, UserView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAdminClaimRequest {
    pub uid: Option<Uid>,
    pub is_admin: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SetAdminClaimResponse {
    pub success: bool,
    pub message: String,
    pub user: UserView,
}

/// Mirrors a claim change into the profile document, if one exists.
///
/// A store failure fails the request; setting the claim again is idempotent
/// and brings the profile back in line.
pub(crate) async fn sync_profile_role(
    state: &AppState,
    uid: &Uid,
    role: Role,
) -> Result<(), ApiError> {
    let mut patch = Document::new();
    patch.insert("role".to_string(), Value::String(role.as_str().to_string()));
    patch.insert(
        "updatedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    match state.store.update(USERS_COLLECTION, uid.as_str(), patch).await {
        Ok(()) => Ok(()),
        Err(report) if matches!(report.current_context(), StoreError::NotFound { .. }) => Ok(()),
        Err(report) => Err(report.into()),
    }
}

/// `POST /api/admin/set-admin-claim`
pub async fn set_admin_claim(
    State(state): State<Arc<AppState>>,
    RequireAdmin(caller): RequireAdmin,
    payload: Result<Json<SetAdminClaimRequest>, JsonRejection>,
) -> Result<Json<SetAdminClaimResponse>, ApiError> {
    let Json(request) = payload?;
    let is_admin = request
        .is_admin
        .ok_or_else(|| ApiError::validation("isAdmin is required"))?;

    let identity = state
        .claims
        .set_admin_claim(&caller, request.uid.as_ref(), is_admin)
        .await?;

    sync_profile_role(&state, identity.uid(), identity.role()).await?;
    audit::record(
        state.store.as_ref(),
        &AuditEntry::new(
            ADMIN_CLAIM_SET,
            format!("admin claim set to {is_admin} for {}", identity.uid()),
            caller.uid().clone(),
        ),
    )
    .await?;

    Ok(Json(SetAdminClaimResponse {
        success: true,
        message: format!("Admin claim set to {is_admin} for user {}", identity.uid()),
        user: UserView::new(&identity, None),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub uid: Uid,
    pub email: Option<String>,
    pub is_admin: bool,
}

/// `GET /api/admin/verify`
pub async fn verify(RequireAuth(caller): RequireAuth) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        uid: caller.uid().clone(),
        email: caller.email().map(str::to_string),
        is_admin: caller.is_admin(),
    })
}
