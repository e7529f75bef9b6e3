//! Core identifiers and shared error handling for the seminar-pulse platform.
//!
//! This crate provides the foundational types used by the access-control,
//! storage, marketing and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{AuditEntryId, EventId, ParseIdError, Uid};
