//! Charge aggregator: monthly rent per current amendment, plus orphans
//!
//! Every charge line active on the target date ends up in exactly one place:
//! summed into a current amendment, or listed as an orphan. Nothing is
//! dropped, which is what makes [`ChargeAggregation::is_conserved`] hold.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ledger_types::{AmendmentId, ChargeLine, Finding, FindingKind, LeaseKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::eligibility::EligibilityOutcome;
use crate::ledger::Ledger;
use crate::resolver::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// Amendment id not present in the ledger
    MissingAmendment,
    /// Amendment exists but is not eligible on the date
    Ineligible,
    /// Eligible but outranked by a higher sequence, or terminated
    NotCurrent,
    /// Key could not be resolved because of a sequence tie
    Conflicted,
}

/// An active charge line that is not attached to a current amendment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrphanCharge {
    pub charge: ChargeLine,
    pub reason: OrphanReason,
    pub key: Option<LeaseKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChargeTotals {
    pub rent: Decimal,
    pub other: Decimal,
    /// At least one active rent line was found, even if its amount is zero
    pub has_rent_line: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ChargeAggregation {
    pub per_amendment: BTreeMap<AmendmentId, ChargeTotals>,
    pub orphans: Vec<OrphanCharge>,
    pub findings: Vec<Finding>,
    /// Sum over every charge line active on the date
    pub active_total: Decimal,
    pub active_rent_total: Decimal,
}

impl ChargeAggregation {
    pub fn totals_for(&self, id: AmendmentId) -> ChargeTotals {
        self.per_amendment.get(&id).cloned().unwrap_or_default()
    }

    pub fn orphan_total(&self) -> Decimal {
        self.orphans.iter().map(|o| o.charge.monthly_amount).sum()
    }

    pub fn summed_total(&self) -> Decimal {
        self.per_amendment.values().map(|t| t.rent + t.other).sum()
    }

    /// Summed plus orphaned equals everything active
    pub fn is_conserved(&self) -> bool {
        self.summed_total() + self.orphan_total() == self.active_total
    }
}

pub fn aggregate_charges(
    ledger: &Ledger,
    eligibility: &EligibilityOutcome<'_>,
    resolution: &Resolution<'_>,
    rent_codes: &[String],
) -> ChargeAggregation {
    let as_of = eligibility.as_of;
    let mut aggregation = ChargeAggregation::default();

    for amendment in resolution.current.values() {
        aggregation
            .per_amendment
            .insert(amendment.amendment_id, ChargeTotals::default());
    }

    for charge in ledger.charges().iter().filter(|c| c.is_active_on(as_of)) {
        let is_rent = charge.is_rent(rent_codes);
        aggregation.active_total += charge.monthly_amount;
        if is_rent {
            aggregation.active_rent_total += charge.monthly_amount;
        }

        if let Some(totals) = aggregation.per_amendment.get_mut(&charge.amendment_id) {
            if is_rent {
                totals.rent += charge.monthly_amount;
                totals.has_rent_line = true;
            } else {
                totals.other += charge.monthly_amount;
            }
            continue;
        }

        let orphan = classify_orphan(ledger, eligibility, resolution, charge);
        aggregation.findings.push(orphan_finding(&orphan, as_of));
        aggregation.orphans.push(orphan);
    }

    for (key, amendment) in &resolution.current {
        let totals = &aggregation.per_amendment[&amendment.amendment_id];
        if !totals.has_rent_line {
            aggregation.findings.push(
                Finding::new(
                    FindingKind::MissingRentCharge,
                    format!(
                        "Amendment {} for {} has no rent charge active on {}; monthly rent set to 0",
                        amendment.amendment_id, key, as_of
                    ),
                )
                .with_key(key.clone())
                .with_amendment(amendment.amendment_id),
            );
        }
    }

    if !aggregation.orphans.is_empty() {
        warn!(
            %as_of,
            count = aggregation.orphans.len(),
            amount = %aggregation.orphan_total(),
            "orphaned charges excluded from rent"
        );
    }
    debug!(
        %as_of,
        active = %aggregation.active_total,
        summed = %aggregation.summed_total(),
        "charge aggregation"
    );

    aggregation
}

fn classify_orphan(
    ledger: &Ledger,
    eligibility: &EligibilityOutcome<'_>,
    resolution: &Resolution<'_>,
    charge: &ChargeLine,
) -> OrphanCharge {
    let (reason, key) = match ledger.amendment(charge.amendment_id) {
        None => (OrphanReason::MissingAmendment, None),
        Some(amendment) => {
            let key = amendment.key();
            let reason = if !eligibility.is_eligible(amendment.amendment_id) {
                OrphanReason::Ineligible
            } else if resolution.is_conflicted(&key) {
                OrphanReason::Conflicted
            } else {
                OrphanReason::NotCurrent
            };
            (reason, Some(key))
        }
    };

    OrphanCharge {
        charge: charge.clone(),
        reason,
        key,
    }
}

fn orphan_finding(orphan: &OrphanCharge, as_of: NaiveDate) -> Finding {
    let charge = &orphan.charge;
    let why = match orphan.reason {
        OrphanReason::MissingAmendment => "does not exist",
        OrphanReason::Ineligible => "is not eligible",
        OrphanReason::NotCurrent => "is not the current revision",
        OrphanReason::Conflicted => "belongs to a conflicted lease",
    };
    let mut finding = Finding::new(
        FindingKind::OrphanCharge,
        format!(
            "Charge {} ({}) references amendment {} which {} on {}",
            charge.charge_id, charge.charge_code, charge.amendment_id, why, as_of
        ),
    )
    .with_charge(charge.charge_id)
    .with_amendment(charge.amendment_id)
    .with_amount(charge.monthly_amount);
    if let Some(key) = &orphan.key {
        finding = finding.with_key(key.clone());
    }
    finding
}
