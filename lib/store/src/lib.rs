//! Document database seam for seminar-pulse.
//!
//! Records are JSON objects grouped into named collections and addressed by
//! string ids. The contract is deliberately small: get/set/merge/delete by
//! id, one-field equality queries with a limit, and batch delete.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;

pub use document::{
    Document, DocumentStore, FieldFilter, StoredDocument, from_document, to_document,
};
pub use error::StoreError;
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;
