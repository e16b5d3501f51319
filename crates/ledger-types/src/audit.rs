//! Tamper-evident audit log for ledger remediation
//!
//! Each remediation action records the value it replaced, so the chain is
//! both the explanation of a ledger version and its rollback path.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::types::{AmendmentId, AmendmentStatus, ChargeLine};

/// A single, reversible change to the ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemediationAction {
    /// Status flipped to Superseded
    SupersedeAmendment {
        amendment_id: AmendmentId,
        previous_status: AmendmentStatus,
    },
    /// End date nulled because it preceded the start date
    ClearEndDate {
        amendment_id: AmendmentId,
        previous_end_date: NaiveDate,
    },
    /// Charge removed from the ledger; the full row is kept here
    ArchiveCharge { charge: ChargeLine },
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub timestamp: String,
    pub action: RemediationAction,
    pub actor: String,
    pub ledger_version: u32,
    pub previous_hash: Option<String>,
    pub note: Option<String>,
}

impl AuditEvent {
    pub fn new(
        action: RemediationAction,
        actor: &str,
        ledger_version: u32,
        previous_hash: Option<String>,
        note: Option<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            action,
            actor: actor.to_string(),
            ledger_version,
            previous_hash,
            note,
        }
    }

    /// Compute the hash of this event (for chain linking)
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.event_id.as_bytes());
        hasher.update(self.timestamp.as_bytes());
        hasher.update(format!("{:?}", self.action).as_bytes());
        hasher.update(self.actor.as_bytes());
        hasher.update(self.ledger_version.to_le_bytes());
        if let Some(ref note) = self.note {
            hasher.update(note.as_bytes());
        }
        if let Some(ref prev) = self.previous_hash {
            hasher.update(prev.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Chain of remediation events with hash linking
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditChain {
    pub events: Vec<AuditEvent>,
    /// Version of the ledger the actions were applied to
    pub base_version: u32,
    pub base_fingerprint: String,
    pub created_at: String,
}

impl AuditChain {
    pub fn new(base_version: u32, base_fingerprint: &str) -> Self {
        Self {
            events: Vec::new(),
            base_version,
            base_fingerprint: base_fingerprint.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn last_hash(&self) -> Option<String> {
        self.events.last().map(|e| e.compute_hash())
    }

    /// Append an event, automatically linking to previous hash
    pub fn append(&mut self, action: RemediationAction, actor: &str, note: Option<String>) {
        let previous_hash = self.last_hash();
        let event = AuditEvent::new(action, actor, self.base_version, previous_hash, note);
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Verify the integrity of the chain
    pub fn verify(&self) -> Result<(), LedgerError> {
        let mut expected_prev: Option<String> = None;

        for (index, event) in self.events.iter().enumerate() {
            if event.previous_hash != expected_prev {
                return Err(LedgerError::AuditChainBroken {
                    index,
                    reason: format!(
                        "expected prev {:?}, got {:?}",
                        expected_prev, event.previous_hash
                    ),
                });
            }
            if event.ledger_version != self.base_version {
                return Err(LedgerError::AuditChainBroken {
                    index,
                    reason: format!(
                        "event targets ledger version {}, chain is for {}",
                        event.ledger_version, self.base_version
                    ),
                });
            }
            expected_prev = Some(event.compute_hash());
        }

        Ok(())
    }

    pub fn actions(&self) -> impl DoubleEndedIterator<Item = &RemediationAction> {
        self.events.iter().map(|e| &e.action)
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// SHA-256 hex digest of arbitrary bytes
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
