//! HTTP routes.
//!
//! Privileged handlers take [`RequireAuth`](crate::auth::RequireAuth) or
//! [`RequireAdmin`](crate::auth::RequireAdmin) as their first extractor,
//! then validate input, then touch the identity provider or the database.

pub mod admin;
pub mod analytics;
pub mod events;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Users (admin)
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        // Marketing events
        .route(
            "/api/marketing-events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/marketing-events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/api/analytics/summary", get(analytics::summary))
        // Admin
        .route("/api/admin/set-admin-claim", post(admin::set_admin_claim))
        .route("/api/admin/verify", get(admin::verify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
