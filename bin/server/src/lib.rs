//! seminar-pulse HTTP API server.
//!
//! This crate provides the JSON API behind the seminar marketing dashboard:
//! user administration, admin claim management, marketing event CRUD and
//! portfolio analytics. Every privileged route passes through the request
//! authorizer before touching the identity provider or the database.

pub mod audit;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod profile;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
