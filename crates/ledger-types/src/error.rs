use thiserror::Error;

use crate::types::{AmendmentId, ChargeId};

/// Fatal ledger problems; a run that hits one of these aborts
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Schema error at {location}: {message}")]
    Schema { location: String, message: String },

    #[error("Duplicate amendment_id {0}")]
    DuplicateAmendment(AmendmentId),

    #[error("Duplicate charge_id {0}")]
    DuplicateCharge(ChargeId),

    #[error("Duplicate property_id {0}")]
    DuplicateProperty(String),

    #[error("Audit chain broken at event {index}: {reason}")]
    AuditChainBroken { index: usize, reason: String },

    #[error("Audit record does not apply to ledger version {found} (expected {expected})")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn schema(location: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Schema {
            location: location.into(),
            message: message.into(),
        }
    }
}
