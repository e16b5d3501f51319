//! Sequence resolver: one current amendment per lease key
//!
//! Runs on eligible amendments only, before any charge is looked at. Joining
//! charges first lets an outranked amendment back in whenever its charges
//! happen to match, so the order here is load-bearing.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use ledger_types::{Amendment, AmendmentId, Finding, FindingKind, LeaseKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Two or more eligible amendments share a key's highest sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConflict {
    pub key: LeaseKey,
    pub sequence: i64,
    pub amendment_ids: Vec<AmendmentId>,
}

/// A lease vacated by a later termination amendment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminatedLease {
    pub key: LeaseKey,
    pub amendment_id: AmendmentId,
    pub termination_id: AmendmentId,
    pub effective_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct Resolution<'a> {
    pub current: BTreeMap<LeaseKey, &'a Amendment>,
    pub conflicts: Vec<ResolutionConflict>,
    pub terminated: Vec<TerminatedLease>,
    pub findings: Vec<Finding>,
    current_ids: BTreeSet<AmendmentId>,
}

impl Resolution<'_> {
    pub fn is_current(&self, id: AmendmentId) -> bool {
        self.current_ids.contains(&id)
    }

    pub fn is_conflicted(&self, key: &LeaseKey) -> bool {
        self.conflicts.iter().any(|c| &c.key == key)
    }
}

/// Pick the highest-sequence eligible amendment for every key
pub fn resolve_current<'a>(
    eligible: &[&'a Amendment],
    terminations: &[&'a Amendment],
) -> Resolution<'a> {
    let mut groups: BTreeMap<LeaseKey, Vec<&'a Amendment>> = BTreeMap::new();
    for &amendment in eligible {
        groups.entry(amendment.key()).or_default().push(amendment);
    }

    let mut latest_termination: BTreeMap<LeaseKey, &'a Amendment> = BTreeMap::new();
    for &termination in terminations {
        latest_termination
            .entry(termination.key())
            .and_modify(|held| {
                if termination.sequence > held.sequence {
                    *held = termination;
                }
            })
            .or_insert(termination);
    }

    let mut resolution = Resolution::default();

    for (key, rows) in groups {
        let Some(max_sequence) = rows.iter().map(|a| a.sequence).max() else {
            continue;
        };
        let top: Vec<&Amendment> = rows
            .into_iter()
            .filter(|a| a.sequence == max_sequence)
            .collect();

        if top.len() > 1 {
            let mut ids: Vec<AmendmentId> = top.iter().map(|a| a.amendment_id).collect();
            ids.sort_unstable();
            warn!(%key, sequence = max_sequence, ?ids, "resolution conflict");
            resolution.findings.push(
                Finding::new(
                    FindingKind::ResolutionConflict,
                    format!(
                        "{} eligible amendments for {} share sequence {}; key omitted",
                        ids.len(),
                        key,
                        max_sequence
                    ),
                )
                .with_key(key.clone())
                .with_amendments(ids.iter().copied()),
            );
            resolution.conflicts.push(ResolutionConflict {
                key,
                sequence: max_sequence,
                amendment_ids: ids,
            });
            continue;
        }

        let current = top[0];
        if let Some(termination) = latest_termination.get(&key) {
            if termination.sequence > current.sequence {
                debug!(%key, termination = termination.amendment_id, "lease terminated");
                resolution.terminated.push(TerminatedLease {
                    key,
                    amendment_id: current.amendment_id,
                    termination_id: termination.amendment_id,
                    effective_date: termination.effective_termination_date(),
                });
                continue;
            }
        }

        resolution.current_ids.insert(current.amendment_id);
        resolution.current.insert(key, current);
    }

    debug!(
        current = resolution.current.len(),
        conflicts = resolution.conflicts.len(),
        terminated = resolution.terminated.len(),
        "sequence resolver"
    );
    resolution
}
