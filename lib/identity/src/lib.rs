//! Identity Toolkit REST client for seminar-pulse.
//!
//! [`IdentityToolkitClient`] implements the access crate's
//! [`IdentityProvider`](seminar_pulse_access::IdentityProvider) and
//! [`PasswordAuthenticator`](seminar_pulse_access::PasswordAuthenticator)
//! seams against a hosted Identity Toolkit-compatible service, or against
//! its local emulator when `base_url` points there.
//!
//! Client endpoints (`accounts:signInWithPassword`, `accounts:signUp`,
//! `accounts:lookup` by id token) authenticate with the project API key.
//! Administrative endpoints under `projects/{project}/` authenticate with a
//! bearer service token.

mod client;
mod config;
mod wire;

pub use client::IdentityToolkitClient;
pub use config::{DEFAULT_BASE_URL, IdentityConfig};
