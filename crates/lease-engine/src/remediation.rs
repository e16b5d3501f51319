//! Explicit remediation batches and their rollback
//!
//! A batch never touches the input ledger. It clones the tables, applies the
//! repairs the policy allows, and returns the next ledger version together
//! with a hash-linked audit chain that records every previous value.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ledger_types::{
    Amendment, AmendmentId, AmendmentStatus, AuditChain, ChargeLine, Finding, FindingKind,
    LeaseKey, LedgerError, RemediationAction,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RemediationPolicy;
use crate::eligibility::filter_eligible;
use crate::error::Result;
use crate::ledger::Ledger;

#[derive(Debug, Clone)]
pub struct RemediationOutcome {
    pub ledger: Ledger,
    pub audit: AuditChain,
    /// Charge rows removed from the ledger, kept verbatim
    pub archived_charges: Vec<ChargeLine>,
    /// Problems the batch could not decide on its own
    pub skipped: Vec<Finding>,
}

impl RemediationOutcome {
    pub fn is_noop(&self) -> bool {
        self.audit.is_empty()
    }

    pub fn summary(&self) -> RemediationSummary {
        let mut summary = RemediationSummary {
            base_version: self.audit.base_version,
            new_version: self.ledger.version(),
            skipped: self.skipped.len(),
            ..RemediationSummary::default()
        };
        for action in self.audit.actions() {
            match action {
                RemediationAction::SupersedeAmendment { .. } => summary.superseded += 1,
                RemediationAction::ClearEndDate { .. } => summary.cleared_end_dates += 1,
                RemediationAction::ArchiveCharge { .. } => summary.archived_charges += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RemediationSummary {
    pub base_version: u32,
    pub new_version: u32,
    pub superseded: usize,
    pub cleared_end_dates: usize,
    pub archived_charges: usize,
    pub skipped: usize,
}

/// Apply one remediation batch and produce the next ledger version
///
/// Duplicate Activated rows are judged against the amendments eligible on
/// `as_of`.
pub fn remediate(
    ledger: &Ledger,
    as_of: NaiveDate,
    policy: &RemediationPolicy,
) -> Result<RemediationOutcome> {
    let next_version = ledger.version() + 1;
    let mut audit = AuditChain::new(ledger.version(), &ledger.fingerprint()?);
    let mut amendments = ledger.amendments().to_vec();
    let mut charges = ledger.charges().to_vec();
    let mut archived_charges = Vec::new();
    let mut skipped = Vec::new();

    if policy.supersede_duplicates {
        for plan in plan_supersessions(ledger, as_of) {
            match plan {
                Supersession::Keep { key, keepers, sequence, losers } => {
                    let kept_by = keepers
                        .iter()
                        .map(|id| id.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    for id in losers {
                        let Some(row) = row_mut(&mut amendments, id) else {
                            continue;
                        };
                        let note = format!(
                            "v{}: superseded by amendment {} (sequence {}) for {}",
                            next_version, kept_by, sequence, key
                        );
                        let previous_status =
                            std::mem::replace(&mut row.status, AmendmentStatus::Superseded);
                        row.audit_notes.push(note.clone());
                        info!(amendment = id, ?keepers, %key, "superseded duplicate activated amendment");
                        audit.append(
                            RemediationAction::SupersedeAmendment {
                                amendment_id: id,
                                previous_status,
                            },
                            &policy.actor,
                            Some(note),
                        );
                    }
                }
                Supersession::Tied { key, sequence, ids } => {
                    warn!(%key, sequence, ?ids, "activated amendments tie on sequence; skipped");
                    skipped.push(
                        Finding::new(
                            FindingKind::DuplicateCurrent,
                            format!(
                                "{} has {} activated amendments at sequence {}; cannot pick one",
                                key,
                                ids.len(),
                                sequence
                            ),
                        )
                        .with_key(key)
                        .with_amendments(ids),
                    );
                }
            }
        }
    }

    if policy.clear_invalid_end_dates {
        for row in amendments.iter_mut().filter(|a| a.has_invalid_date_range()) {
            let Some(previous_end_date) = row.end_date.take() else {
                continue;
            };
            let note = format!(
                "v{}: end date {} preceded start date; cleared",
                next_version, previous_end_date
            );
            row.audit_notes.push(note.clone());
            info!(amendment = row.amendment_id, %previous_end_date, "cleared invalid end date");
            audit.append(
                RemediationAction::ClearEndDate {
                    amendment_id: row.amendment_id,
                    previous_end_date,
                },
                &policy.actor,
                Some(note),
            );
        }
    }

    if policy.archive_orphan_charges {
        let (orphans, kept): (Vec<_>, Vec<_>) = charges
            .into_iter()
            .partition(|c| ledger.amendment(c.amendment_id).is_none());
        charges = kept;
        for charge in orphans {
            info!(charge = charge.charge_id, amendment = charge.amendment_id, "archived orphaned charge");
            audit.append(
                RemediationAction::ArchiveCharge {
                    charge: charge.clone(),
                },
                &policy.actor,
                Some(format!(
                    "v{}: amendment {} does not exist",
                    next_version, charge.amendment_id
                )),
            );
            archived_charges.push(charge);
        }
    }

    let remediated = ledger.next_version(amendments, charges)?;
    info!(
        base_version = ledger.version(),
        new_version = remediated.version(),
        actions = audit.len(),
        skipped = skipped.len(),
        "remediation batch complete"
    );

    Ok(RemediationOutcome {
        ledger: remediated,
        audit,
        archived_charges,
        skipped,
    })
}

/// Rebuild the ledger a remediation batch started from
///
/// Fails when the chain does not verify, targets another version, or does
/// not reproduce the recorded base fingerprint.
pub fn revert(remediated: &Ledger, audit: &AuditChain) -> Result<Ledger> {
    let expected = audit.base_version + 1;
    if remediated.version() != expected {
        return Err(LedgerError::VersionMismatch {
            expected,
            found: remediated.version(),
        }
        .into());
    }
    audit.verify()?;

    let mut amendments = remediated.amendments().to_vec();
    let mut charges = remediated.charges().to_vec();

    for (index, event) in audit.events.iter().enumerate().rev() {
        match &event.action {
            RemediationAction::SupersedeAmendment {
                amendment_id,
                previous_status,
            } => {
                let row = row_mut(&mut amendments, *amendment_id)
                    .ok_or_else(|| missing_row(index, *amendment_id))?;
                row.status = previous_status.clone();
                drop_note(row, event.note.as_deref());
            }
            RemediationAction::ClearEndDate {
                amendment_id,
                previous_end_date,
            } => {
                let row = row_mut(&mut amendments, *amendment_id)
                    .ok_or_else(|| missing_row(index, *amendment_id))?;
                row.end_date = Some(*previous_end_date);
                drop_note(row, event.note.as_deref());
            }
            RemediationAction::ArchiveCharge { charge } => charges.push(charge.clone()),
        }
    }

    let restored = Ledger::new(
        audit.base_version,
        amendments,
        charges,
        remediated.properties().to_vec(),
    )?;
    if restored.fingerprint()? != audit.base_fingerprint {
        return Err(LedgerError::AuditChainBroken {
            index: audit.len(),
            reason: "restored ledger does not match the base fingerprint".to_string(),
        }
        .into());
    }

    info!(
        from_version = remediated.version(),
        to_version = restored.version(),
        actions = audit.len(),
        "remediation reverted"
    );
    Ok(restored)
}

enum Supersession {
    /// Every lower-sequence Activated row loses to the rows at the top
    Keep {
        key: LeaseKey,
        keepers: Vec<AmendmentId>,
        sequence: i64,
        losers: Vec<AmendmentId>,
    },
    Tied {
        key: LeaseKey,
        sequence: i64,
        ids: Vec<AmendmentId>,
    },
}

/// Keys with more than one eligible Activated row
///
/// A tie at the top sequence is left for a manual decision, but the rows
/// below it are still superseded.
fn plan_supersessions(ledger: &Ledger, as_of: NaiveDate) -> Vec<Supersession> {
    let eligibility = filter_eligible(ledger.amendments(), as_of);
    let mut groups: BTreeMap<LeaseKey, Vec<&Amendment>> = BTreeMap::new();
    for &amendment in &eligibility.eligible {
        if amendment.status == AmendmentStatus::Activated {
            groups.entry(amendment.key()).or_default().push(amendment);
        }
    }

    let mut plans = Vec::new();
    for (key, rows) in groups.into_iter().filter(|(_, rows)| rows.len() > 1) {
        let Some(sequence) = rows.iter().map(|a| a.sequence).max() else {
            continue;
        };
        let mut top: Vec<AmendmentId> = rows
            .iter()
            .filter(|a| a.sequence == sequence)
            .map(|a| a.amendment_id)
            .collect();
        top.sort_unstable();

        let losers: Vec<AmendmentId> = rows
            .iter()
            .filter(|a| a.sequence < sequence)
            .map(|a| a.amendment_id)
            .collect();
        if !losers.is_empty() {
            plans.push(Supersession::Keep {
                key: key.clone(),
                keepers: top.clone(),
                sequence,
                losers,
            });
        }
        if top.len() > 1 {
            plans.push(Supersession::Tied {
                key,
                sequence,
                ids: top,
            });
        }
    }
    plans
}

/// Rows stay sorted by id, as [`Ledger::new`] leaves them
fn row_mut(amendments: &mut [Amendment], id: AmendmentId) -> Option<&mut Amendment> {
    let index = amendments
        .binary_search_by_key(&id, |a| a.amendment_id)
        .ok()?;
    amendments.get_mut(index)
}

fn drop_note(row: &mut Amendment, note: Option<&str>) {
    if let Some(note) = note {
        if row.audit_notes.last().map(String::as_str) == Some(note) {
            row.audit_notes.pop();
        }
    }
}

fn missing_row(index: usize, amendment_id: AmendmentId) -> LedgerError {
    LedgerError::AuditChainBroken {
        index,
        reason: format!("amendment {} is not in the remediated ledger", amendment_id),
    }
}
