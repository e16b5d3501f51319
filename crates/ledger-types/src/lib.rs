//! Entity types shared by the lease engine and its tools

pub mod audit;
pub mod error;
pub mod findings;
pub mod types;

pub use audit::{fingerprint, AuditChain, AuditEvent, RemediationAction};
pub use error::LedgerError;
pub use findings::{critical_count, Finding, FindingKind, Severity};
pub use types::{
    Amendment, AmendmentId, AmendmentStatus, AmendmentType, ChargeId, ChargeLine, LeaseKey,
    Property, ResolvedLease,
};
