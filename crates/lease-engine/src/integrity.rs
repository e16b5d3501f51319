//! Integrity validator: invariant checks over the raw ledger
//!
//! Independent of any rent roll. Each check produces findings; the report
//! folds them into per-check counts with a sample of offending keys.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use ledger_types::{
    Amendment, AmendmentStatus, Finding, FindingKind, LeaseKey, Severity,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::IntegrityConfig;
use crate::eligibility::filter_eligible;
use crate::ledger::Ledger;

/// Order in which checks appear in a report
const CHECK_ORDER: [FindingKind; 8] = [
    FindingKind::DuplicateCurrent,
    FindingKind::DuplicateSequence,
    FindingKind::InvalidDateRange,
    FindingKind::MissingStartDate,
    FindingKind::OrphanCharge,
    FindingKind::InvalidStatus,
    FindingKind::InvalidType,
    FindingKind::UnknownProperty,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub kind: FindingKind,
    pub severity: Severity,
    pub count: usize,
    pub samples: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityReport {
    pub as_of: NaiveDate,
    pub ledger_version: u32,
    pub checks: Vec<CheckResult>,
    pub findings: Vec<Finding>,
}

impl IntegrityReport {
    pub fn check(&self, kind: FindingKind) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.kind == kind)
    }

    pub fn count(&self, kind: FindingKind) -> usize {
        self.check(kind).map_or(0, |c| c.count)
    }

    pub fn critical_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.severity == Severity::Critical)
            .map(|c| c.count)
            .sum()
    }

    pub fn total_violations(&self) -> usize {
        self.checks.iter().map(|c| c.count).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total_violations() == 0
    }
}

pub struct IntegrityValidator<'a> {
    config: &'a IntegrityConfig,
}

impl<'a> IntegrityValidator<'a> {
    pub fn new(config: &'a IntegrityConfig) -> Self {
        Self { config }
    }

    /// Run every check; `as_of` anchors the duplicate-current check
    pub fn validate(&self, ledger: &Ledger, as_of: NaiveDate) -> IntegrityReport {
        let mut findings = Vec::new();
        findings.extend(check_duplicate_current(ledger.amendments(), as_of));
        findings.extend(check_duplicate_sequence(ledger.amendments()));
        findings.extend(check_date_ranges(ledger.amendments()));
        findings.extend(check_orphaned_charges(ledger));
        findings.extend(check_enumerations(ledger.amendments()));
        findings.extend(check_unknown_properties(ledger));

        for finding in &mut findings {
            finding.severity = self.config.severity_for(finding.kind);
        }

        let checks: Vec<CheckResult> = CHECK_ORDER
            .iter()
            .map(|&kind| self.summarize(kind, &findings))
            .collect();

        for check in checks.iter().filter(|c| c.count > 0) {
            warn!(check = %check.kind, count = check.count, severity = ?check.severity, "integrity violation");
        }
        info!(
            version = ledger.version(),
            %as_of,
            violations = findings.len(),
            "integrity validation complete"
        );

        IntegrityReport {
            as_of,
            ledger_version: ledger.version(),
            checks,
            findings,
        }
    }

    fn summarize(&self, kind: FindingKind, findings: &[Finding]) -> CheckResult {
        let matching: Vec<&Finding> = findings.iter().filter(|f| f.kind == kind).collect();
        let samples = matching
            .iter()
            .take(self.config.sample_size)
            .map(|f| sample_label(f))
            .collect();
        let amount = if matching.iter().any(|f| f.amount.is_some()) {
            Some(matching.iter().filter_map(|f| f.amount).sum())
        } else {
            None
        };

        CheckResult {
            kind,
            severity: self.config.severity_for(kind),
            count: matching.len(),
            samples,
            amount,
        }
    }
}

fn sample_label(finding: &Finding) -> String {
    if let Some(charge_id) = finding.charge_id {
        return format!("charge {}", charge_id);
    }
    let ids = finding
        .amendment_ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");
    match &finding.key {
        Some(key) if ids.is_empty() => key.to_string(),
        Some(key) => format!("{} [{}]", key, ids),
        None => ids,
    }
}

/// Keys with a shared max sequence, or more than one Activated row, among
/// amendments eligible on `as_of`
pub fn check_duplicate_current(amendments: &[Amendment], as_of: NaiveDate) -> Vec<Finding> {
    let eligibility = filter_eligible(amendments, as_of);
    let mut groups: BTreeMap<LeaseKey, Vec<&Amendment>> = BTreeMap::new();
    for &amendment in &eligibility.eligible {
        groups.entry(amendment.key()).or_default().push(amendment);
    }

    let mut findings = Vec::new();
    for (key, rows) in groups {
        let Some(max_sequence) = rows.iter().map(|a| a.sequence).max() else {
            continue;
        };
        let top: Vec<_> = rows.iter().filter(|a| a.sequence == max_sequence).collect();
        let activated: Vec<_> = rows
            .iter()
            .filter(|a| a.status == AmendmentStatus::Activated)
            .collect();

        let offending = if top.len() > 1 {
            &top
        } else if activated.len() > 1 {
            &activated
        } else {
            continue;
        };
        let mut ids: Vec<_> = offending.iter().map(|a| a.amendment_id).collect();
        ids.sort_unstable();

        findings.push(
            Finding::new(
                FindingKind::DuplicateCurrent,
                format!(
                    "{} has {} competing current amendments on {}",
                    key,
                    ids.len(),
                    as_of
                ),
            )
            .with_key(key)
            .with_amendments(ids),
        );
    }
    findings
}

/// Two amendments of one key sharing a sequence, regardless of status
pub fn check_duplicate_sequence(amendments: &[Amendment]) -> Vec<Finding> {
    let mut by_sequence: BTreeMap<(LeaseKey, i64), Vec<u64>> = BTreeMap::new();
    for amendment in amendments {
        by_sequence
            .entry((amendment.key(), amendment.sequence))
            .or_default()
            .push(amendment.amendment_id);
    }

    by_sequence
        .into_iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|((key, sequence), ids)| {
            Finding::new(
                FindingKind::DuplicateSequence,
                format!("{} reuses sequence {} on {} amendments", key, sequence, ids.len()),
            )
            .with_key(key)
            .with_amendments(ids)
        })
        .collect()
}

/// End before start, and missing start dates
pub fn check_date_ranges(amendments: &[Amendment]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for amendment in amendments {
        if amendment.start_date.is_none() {
            findings.push(
                Finding::new(
                    FindingKind::MissingStartDate,
                    format!("Amendment {} has no start date", amendment.amendment_id),
                )
                .with_key(amendment.key())
                .with_amendment(amendment.amendment_id),
            );
        } else if amendment.has_invalid_date_range() {
            findings.push(
                Finding::new(
                    FindingKind::InvalidDateRange,
                    format!(
                        "Amendment {} ends {} before it starts {}",
                        amendment.amendment_id,
                        amendment.end_date.map(|d| d.to_string()).unwrap_or_default(),
                        amendment.start_date.map(|d| d.to_string()).unwrap_or_default(),
                    ),
                )
                .with_key(amendment.key())
                .with_amendment(amendment.amendment_id),
            );
        }
    }
    findings
}

/// Charges whose amendment never existed
pub fn check_orphaned_charges(ledger: &Ledger) -> Vec<Finding> {
    ledger
        .charges()
        .iter()
        .filter(|c| ledger.amendment(c.amendment_id).is_none())
        .map(|c| {
            Finding::new(
                FindingKind::OrphanCharge,
                format!(
                    "Charge {} references missing amendment {}",
                    c.charge_id, c.amendment_id
                ),
            )
            .with_charge(c.charge_id)
            .with_amendment(c.amendment_id)
            .with_amount(c.monthly_amount)
        })
        .collect()
}

pub fn check_enumerations(amendments: &[Amendment]) -> Vec<Finding> {
    let mut findings = Vec::new();
    for amendment in amendments {
        if !amendment.status.is_recognized() {
            findings.push(
                Finding::new(
                    FindingKind::InvalidStatus,
                    format!(
                        "Amendment {} has unrecognized status '{}'",
                        amendment.amendment_id, amendment.status
                    ),
                )
                .with_key(amendment.key())
                .with_amendment(amendment.amendment_id),
            );
        }
        if !amendment.amendment_type.is_recognized() {
            findings.push(
                Finding::new(
                    FindingKind::InvalidType,
                    format!(
                        "Amendment {} has unrecognized type '{}'",
                        amendment.amendment_id, amendment.amendment_type
                    ),
                )
                .with_key(amendment.key())
                .with_amendment(amendment.amendment_id),
            );
        }
    }
    findings
}

/// One finding per property id referenced by amendments but not defined
pub fn check_unknown_properties(ledger: &Ledger) -> Vec<Finding> {
    let mut seen = HashSet::new();
    ledger
        .amendments()
        .iter()
        .filter(|a| ledger.property(&a.property_id).is_none())
        .filter(|a| seen.insert(a.property_id.clone()))
        .map(|a| {
            Finding::new(
                FindingKind::UnknownProperty,
                format!("Property {} is not in the property table", a.property_id),
            )
            .with_key(a.key())
            .with_amendment(a.amendment_id)
        })
        .collect()
}
