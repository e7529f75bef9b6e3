//! User administration routes. Every handler requires the admin claim.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use seminar_pulse_access::{IdentityUpdate, NewIdentity, Role, UserIdentity};
use seminar_pulse_core::Uid;
use seminar_pulse_store::{FieldFilter, from_document, to_document};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audit::{self, AuditEntry, USER_DELETED};
use crate::auth::RequireAdmin;
use crate::error::ApiError;
use crate::profile::{USER_SCOPED_COLLECTIONS, USERS_COLLECTION, UserProfile, UserView};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: Option<bool>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub count: usize,
    pub users: Vec<UserView>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub success: bool,
    pub message: String,
    pub deleted_documents: u64,
}

fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(format!("{field} is required")))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn load_profile(state: &AppState, uid: &Uid) -> Result<Option<UserProfile>, ApiError> {
    match state.store.get(USERS_COLLECTION, uid.as_str()).await? {
        Some(document) => Ok(Some(from_document(USERS_COLLECTION, document)?)),
        None => Ok(None),
    }
}

async fn save_profile(state: &AppState, identity: &UserIdentity) -> Result<UserProfile, ApiError> {
    let profile = match load_profile(state, identity.uid()).await? {
        Some(mut existing) => {
            existing.sync_from(identity);
            existing
        }
        None => UserProfile::for_identity(identity),
    };
    let document = to_document(USERS_COLLECTION, &profile)?;
    state
        .store
        .set(USERS_COLLECTION, identity.uid().as_str(), document)
        .await?;
    Ok(profile)
}

/// `GET /api/users`
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_caller): RequireAdmin,
) -> Result<Json<UsersResponse>, ApiError> {
    let identities = state
        .provider
        .list_identities(state.listing.user_page_size)
        .await?;

    let mut profiles: HashMap<Uid, UserProfile> = state
        .store
        .query(USERS_COLLECTION, None, None)
        .await?
        .into_iter()
        .filter_map(|doc| {
            match from_document::<UserProfile>(USERS_COLLECTION, doc.data) {
                Ok(profile) => Some((profile.uid.clone(), profile)),
                Err(report) => {
                    warn!(id = %doc.id, error = %report, "skipping malformed profile");
                    None
                }
            }
        })
        .collect();

    let users: Vec<UserView> = identities
        .iter()
        .map(|identity| UserView::new(identity, profiles.remove(identity.uid())))
        .collect();

    Ok(Json(UsersResponse {
        success: true,
        count: users.len(),
        users,
    }))
}

/// `POST /api/users`
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(caller): RequireAdmin,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Json(request) = payload?;
    let email = required(request.email, "email")?;
    let password = required(request.password, "password")?;

    let mut identity = state
        .provider
        .create_identity(
            NewIdentity::new(email, password).with_display_name(trimmed(request.display_name)),
        )
        .await?;

    if request.role.is_some_and(|role| role.is_admin()) {
        identity = state
            .claims
            .set_admin_claim(&caller, Some(identity.uid()), true)
            .await?;
    }

    let profile = save_profile(&state, &identity).await?;
    info!(uid = %identity.uid(), role = %identity.role(), "user created");

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            success: true,
            user: UserView::new(&identity, Some(profile)),
        }),
    ))
}

/// `GET /api/users/{id}`
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_caller): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let uid = Uid::new(id);
    let identity = state.provider.get_identity(&uid).await?;
    let profile = load_profile(&state, &uid).await?;
    Ok(Json(UserResponse {
        success: true,
        user: UserView::new(&identity, profile),
    }))
}

/// `PATCH /api/users/{id}`
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, ApiError> {
    let Json(request) = payload?;
    let uid = Uid::new(id);

    let email = match request.email {
        Some(email) => Some(required(Some(email), "email")?),
        None => None,
    };
    let update = IdentityUpdate {
        email,
        display_name: request.display_name.map(|name| name.trim().to_string()),
        disabled: request.disabled,
    };

    let mut identity = state.provider.update_identity(&uid, update).await?;
    if let Some(role) = request.role {
        if role.is_admin() != identity.is_admin() {
            identity = state
                .claims
                .set_admin_claim(&caller, Some(&uid), role.is_admin())
                .await?;
        }
    }

    let profile = save_profile(&state, &identity).await?;
    info!(%uid, "user updated");

    Ok(Json(UserResponse {
        success: true,
        user: UserView::new(&identity, Some(profile)),
    }))
}

/// `DELETE /api/users/{id}`
///
/// Deletes every document owned by the uid in the user-scoped collections,
/// then the identity, then records one audit entry. Documents go first so a
/// failed attempt leaves the identity in place and can be retried.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(caller): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let uid = Uid::new(id);
    if uid.is_blank() {
        return Err(ApiError::validation("user id is required"));
    }

    state.provider.get_identity(&uid).await?;

    let filter = FieldFilter::eq("uid", uid.as_str());
    let mut deleted_documents = 0;
    for collection in USER_SCOPED_COLLECTIONS {
        let ids: Vec<String> = state
            .store
            .query(collection, Some(&filter), None)
            .await?
            .into_iter()
            .map(|doc| doc.id)
            .collect();
        deleted_documents += state.store.batch_delete(collection, &ids).await?;
    }

    state.provider.delete_identity(&uid).await?;

    audit::record(
        state.store.as_ref(),
        &AuditEntry::new(
            USER_DELETED,
            format!("deleted user {uid} and {deleted_documents} documents"),
            caller.uid().clone(),
        ),
    )
    .await?;
    info!(%uid, deleted_documents, "user deleted");

    Ok(Json(DeleteUserResponse {
        success: true,
        message: "User deleted successfully".to_string(),
        deleted_documents,
    }))
}
