//! Eligibility filter: which amendments can describe occupancy on a date

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ledger_types::{
    Amendment, AmendmentId, AmendmentStatus, AmendmentType, Finding, FindingKind, LeaseKey,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Cancelled or pending
    IneligibleStatus,
    UnrecognizedStatus,
    Termination,
    Proposal,
    UnrecognizedType,
    MissingStartDate,
    NotStarted,
    Expired,
}

/// An amendment left out of resolution, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub amendment_id: AmendmentId,
    pub key: LeaseKey,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone)]
pub struct EligibilityOutcome<'a> {
    pub as_of: NaiveDate,
    pub eligible: Vec<&'a Amendment>,
    /// Termination amendments already in effect on `as_of`
    pub terminations: Vec<&'a Amendment>,
    pub exclusions: Vec<Exclusion>,
    pub findings: Vec<Finding>,
    eligible_ids: BTreeSet<AmendmentId>,
}

impl EligibilityOutcome<'_> {
    pub fn is_eligible(&self, id: AmendmentId) -> bool {
        self.eligible_ids.contains(&id)
    }
}

/// Classify every amendment for `as_of`
pub fn filter_eligible(amendments: &[Amendment], as_of: NaiveDate) -> EligibilityOutcome<'_> {
    let mut eligible = Vec::new();
    let mut terminations = Vec::new();
    let mut exclusions = Vec::new();
    let mut findings = Vec::new();

    for amendment in amendments {
        match classify(amendment, as_of) {
            Ok(()) => eligible.push(amendment),
            Err(reason) => {
                match reason {
                    ExclusionReason::UnrecognizedStatus => findings.push(
                        Finding::new(
                            FindingKind::InvalidStatus,
                            format!(
                                "Amendment {} has unrecognized status '{}'",
                                amendment.amendment_id, amendment.status
                            ),
                        )
                        .with_key(amendment.key())
                        .with_amendment(amendment.amendment_id),
                    ),
                    ExclusionReason::IneligibleStatus => findings.push(
                        Finding::new(
                            FindingKind::ExcludedStatus,
                            format!(
                                "Amendment {} is {} and not used",
                                amendment.amendment_id, amendment.status
                            ),
                        )
                        .with_key(amendment.key())
                        .with_amendment(amendment.amendment_id),
                    ),
                    ExclusionReason::UnrecognizedType => findings.push(
                        Finding::new(
                            FindingKind::InvalidType,
                            format!(
                                "Amendment {} has unrecognized type '{}'",
                                amendment.amendment_id, amendment.amendment_type
                            ),
                        )
                        .with_key(amendment.key())
                        .with_amendment(amendment.amendment_id),
                    ),
                    ExclusionReason::MissingStartDate => findings.push(
                        Finding::new(
                            FindingKind::MissingStartDate,
                            format!("Amendment {} has no start date", amendment.amendment_id),
                        )
                        .with_key(amendment.key())
                        .with_amendment(amendment.amendment_id),
                    ),
                    ExclusionReason::Termination => {
                        let in_effect = amendment
                            .effective_termination_date()
                            .is_some_and(|d| d <= as_of);
                        if in_effect {
                            terminations.push(amendment);
                        }
                    }
                    _ => {}
                }
                exclusions.push(Exclusion {
                    amendment_id: amendment.amendment_id,
                    key: amendment.key(),
                    reason,
                });
            }
        }
    }

    debug!(
        %as_of,
        eligible = eligible.len(),
        excluded = exclusions.len(),
        terminations = terminations.len(),
        "eligibility filter"
    );

    let eligible_ids = eligible.iter().map(|a| a.amendment_id).collect();
    EligibilityOutcome {
        as_of,
        eligible,
        terminations,
        exclusions,
        findings,
        eligible_ids,
    }
}

/// Status, then type, then the date window
fn classify(amendment: &Amendment, as_of: NaiveDate) -> Result<(), ExclusionReason> {
    match amendment.status {
        AmendmentStatus::Activated | AmendmentStatus::Superseded => {}
        AmendmentStatus::Other(_) => return Err(ExclusionReason::UnrecognizedStatus),
        _ => return Err(ExclusionReason::IneligibleStatus),
    }

    match amendment.amendment_type {
        AmendmentType::Termination => return Err(ExclusionReason::Termination),
        AmendmentType::ProposalInDm => return Err(ExclusionReason::Proposal),
        AmendmentType::Other(_) => return Err(ExclusionReason::UnrecognizedType),
        _ => {}
    }

    let start = amendment
        .start_date
        .ok_or(ExclusionReason::MissingStartDate)?;
    if start > as_of {
        return Err(ExclusionReason::NotStarted);
    }
    if amendment.end_date.is_some_and(|end| end < as_of) {
        return Err(ExclusionReason::Expired);
    }

    Ok(())
}
