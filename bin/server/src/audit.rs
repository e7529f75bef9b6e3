//! Audit log of administrative actions.

use chrono::{DateTime, Utc};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use seminar_pulse_core::{AuditEntryId, Uid};
use seminar_pulse_store::{DocumentStore, StoreError, to_document};
use tracing::info;

/// Collection holding audit entries.
pub const AUDIT_COLLECTION: &str = "audit_logs";

/// Action recorded when a user and their documents are deleted.
pub const USER_DELETED: &str = "user_deleted";

/// Action recorded when the admin claim is set or cleared.
pub const ADMIN_CLAIM_SET: &str = "admin_claim_set";

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub action: String,
    pub details: String,
    pub performed_by: Uid,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    #[must_use]
    pub fn new(action: &str, details: impl Into<String>, performed_by: Uid) -> Self {
        Self {
            id: AuditEntryId::new(),
            action: action.to_string(),
            details: details.into(),
            performed_by,
            timestamp: Utc::now(),
        }
    }
}

/// Appends an entry to the audit log.
pub async fn record(
    store: &dyn DocumentStore,
    entry: &AuditEntry,
) -> Result<(), Report<StoreError>> {
    let document = to_document(AUDIT_COLLECTION, entry)?;
    store
        .set(AUDIT_COLLECTION, &entry.id.to_string(), document)
        .await?;
    info!(action = %entry.action, performed_by = %entry.performed_by, "audit entry recorded");
    Ok(())
}
