//! Machine-readable data-quality findings
//!
//! Every row the engine excludes, zeroes, or refuses to resolve is described
//! by a [`Finding`], so that no financial total changes without a trace.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{AmendmentId, ChargeId, LeaseKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    InvalidStatus,
    /// Cancelled or pending row left out of resolution
    ExcludedStatus,
    InvalidType,
    MissingStartDate,
    InvalidDateRange,
    DuplicateCurrent,
    DuplicateSequence,
    ResolutionConflict,
    MissingRentCharge,
    OrphanCharge,
    UnknownProperty,
    UncountedCommencement,
}

impl FindingKind {
    pub const ALL: [FindingKind; 12] = [
        FindingKind::InvalidStatus,
        FindingKind::ExcludedStatus,
        FindingKind::InvalidType,
        FindingKind::MissingStartDate,
        FindingKind::InvalidDateRange,
        FindingKind::DuplicateCurrent,
        FindingKind::DuplicateSequence,
        FindingKind::ResolutionConflict,
        FindingKind::MissingRentCharge,
        FindingKind::OrphanCharge,
        FindingKind::UnknownProperty,
        FindingKind::UncountedCommencement,
    ];

    pub fn default_severity(self) -> Severity {
        match self {
            FindingKind::DuplicateCurrent
            | FindingKind::DuplicateSequence
            | FindingKind::InvalidDateRange
            | FindingKind::ResolutionConflict => Severity::Critical,
            FindingKind::ExcludedStatus | FindingKind::UncountedCommencement => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::InvalidStatus => "invalid_status",
            FindingKind::ExcludedStatus => "excluded_status",
            FindingKind::InvalidType => "invalid_type",
            FindingKind::MissingStartDate => "missing_start_date",
            FindingKind::InvalidDateRange => "invalid_date_range",
            FindingKind::DuplicateCurrent => "duplicate_current",
            FindingKind::DuplicateSequence => "duplicate_sequence",
            FindingKind::ResolutionConflict => "resolution_conflict",
            FindingKind::MissingRentCharge => "missing_rent_charge",
            FindingKind::OrphanCharge => "orphan_charge",
            FindingKind::UnknownProperty => "unknown_property",
            FindingKind::UncountedCommencement => "uncounted_commencement",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<LeaseKey>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amendment_ids: Vec<AmendmentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_id: Option<ChargeId>,
    /// Monthly financial impact, when the finding concerns money
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

impl Finding {
    /// New finding at the kind's default severity
    pub fn new(kind: FindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            key: None,
            amendment_ids: Vec::new(),
            charge_id: None,
            amount: None,
        }
    }

    pub fn with_key(mut self, key: LeaseKey) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_amendment(mut self, amendment_id: AmendmentId) -> Self {
        self.amendment_ids.push(amendment_id);
        self
    }

    pub fn with_amendments(mut self, ids: impl IntoIterator<Item = AmendmentId>) -> Self {
        self.amendment_ids.extend(ids);
        self
    }

    pub fn with_charge(mut self, charge_id: ChargeId) -> Self {
        self.charge_id = Some(charge_id);
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }
}

/// Number of findings at `Critical` severity
pub fn critical_count(findings: &[Finding]) -> usize {
    findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count()
}
