//! Snapshot builder: the rent roll for one date

use chrono::NaiveDate;
use ledger_types::{
    critical_count, Amendment, Finding, FindingKind, LeaseKey, Property, ResolvedLease,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calendar::LeaseCalendar;
use crate::charges::{aggregate_charges, ChargeAggregation, ChargeTotals, OrphanCharge};
use crate::eligibility::{filter_eligible, EligibilityOutcome, Exclusion};
use crate::ledger::Ledger;
use crate::resolver::{resolve_current, Resolution, ResolutionConflict, TerminatedLease};

const MONTHS_PER_YEAR: i64 = 12;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTotals {
    pub lease_count: usize,
    pub leased_area: Decimal,
    pub monthly_rent: Decimal,
    pub monthly_other_charges: Decimal,
    pub annual_rent: Decimal,
    pub orphaned_amount: Decimal,
    /// Every charge line active on the date, current or orphaned
    pub active_charges: Decimal,
}

/// Resolved state of the ledger as of one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRoll {
    pub as_of: NaiveDate,
    pub ledger_version: u32,
    pub leases: Vec<ResolvedLease>,
    pub orphans: Vec<OrphanCharge>,
    pub exclusions: Vec<Exclusion>,
    pub conflicts: Vec<ResolutionConflict>,
    pub terminated: Vec<TerminatedLease>,
    pub findings: Vec<Finding>,
    pub totals: SnapshotTotals,
}

impl RentRoll {
    pub fn lease(&self, key: &LeaseKey) -> Option<&ResolvedLease> {
        self.leases
            .iter()
            .find(|l| l.property_id == key.property_id && l.tenant_id == key.tenant_id)
    }

    pub fn critical_count(&self) -> usize {
        critical_count(&self.findings)
    }

    /// Sum of rent plus orphans equals every active charge
    pub fn is_conserved(&self) -> bool {
        self.totals.monthly_rent + self.totals.monthly_other_charges + self.totals.orphaned_amount
            == self.totals.active_charges
    }
}

/// Run the full pipeline for one date
pub fn resolve_rent_roll(ledger: &Ledger, as_of: NaiveDate, rent_codes: &[String]) -> RentRoll {
    let eligibility = filter_eligible(ledger.amendments(), as_of);
    let resolution = resolve_current(&eligibility.eligible, &eligibility.terminations);
    let charges = aggregate_charges(ledger, &eligibility, &resolution, rent_codes);
    build_snapshot(ledger, eligibility, resolution, charges)
}

/// Combine the stage outputs into sorted rent-roll rows
pub fn build_snapshot(
    ledger: &Ledger,
    eligibility: EligibilityOutcome<'_>,
    resolution: Resolution<'_>,
    charges: ChargeAggregation,
) -> RentRoll {
    let as_of = eligibility.as_of;
    let mut findings = eligibility.findings;
    findings.extend(resolution.findings);
    findings.extend(charges.findings.iter().cloned());

    let mut leases = Vec::with_capacity(resolution.current.len());
    for (key, amendment) in &resolution.current {
        let property = ledger.property(&key.property_id);
        if property.is_none() {
            findings.push(
                Finding::new(
                    FindingKind::UnknownProperty,
                    format!("Property {} is not in the property table", key.property_id),
                )
                .with_key(key.clone())
                .with_amendment(amendment.amendment_id),
            );
        }
        let totals = charges.totals_for(amendment.amendment_id);
        if let Some(lease) = derive_lease(amendment, property, &totals, as_of) {
            leases.push(lease);
        }
    }

    leases.sort_by(|a, b| {
        a.property_code
            .cmp(&b.property_code)
            .then_with(|| a.tenant_id.cmp(&b.tenant_id))
    });

    let totals = SnapshotTotals {
        lease_count: leases.len(),
        leased_area: leases.iter().map(|l| l.leased_area).sum(),
        monthly_rent: leases.iter().map(|l| l.monthly_rent).sum(),
        monthly_other_charges: leases.iter().map(|l| l.monthly_other_charges).sum(),
        annual_rent: leases.iter().map(|l| l.annual_rent).sum(),
        orphaned_amount: charges.orphan_total(),
        active_charges: charges.active_total,
    };

    info!(
        %as_of,
        leases = totals.lease_count,
        monthly_rent = %totals.monthly_rent,
        orphans = charges.orphans.len(),
        findings = findings.len(),
        "rent roll resolved"
    );

    RentRoll {
        as_of,
        ledger_version: ledger.version(),
        leases,
        orphans: charges.orphans,
        exclusions: eligibility.exclusions,
        conflicts: resolution.conflicts,
        terminated: resolution.terminated,
        findings,
        totals,
    }
}

/// Derived metrics for one current amendment
///
/// Returns `None` only for an amendment without a start date, which the
/// eligibility filter never lets through.
pub fn derive_lease(
    amendment: &Amendment,
    property: Option<&Property>,
    totals: &ChargeTotals,
    as_of: NaiveDate,
) -> Option<ResolvedLease> {
    let start_date = amendment.start_date?;
    let annual_rent = totals.rent * Decimal::from(MONTHS_PER_YEAR);

    Some(ResolvedLease {
        property_id: amendment.property_id.clone(),
        property_code: property
            .map(|p| p.code.clone())
            .unwrap_or_else(|| amendment.property_id.clone()),
        property_name: property.map(|p| p.name.clone()),
        tenant_id: amendment.tenant_id.clone(),
        tenant_name: amendment.tenant_name.clone(),
        suite: amendment.suite.clone(),
        amendment_id: amendment.amendment_id,
        sequence: amendment.sequence,
        amendment_type: amendment.amendment_type.clone(),
        start_date,
        end_date: amendment.end_date,
        leased_area: amendment.leased_area,
        monthly_rent: totals.rent,
        monthly_other_charges: totals.other,
        annual_rent,
        rent_psf: rent_psf(annual_rent, amendment.leased_area),
        lease_term_months: LeaseCalendar::term_months(start_date, amendment.end_date),
        remaining_term_months: LeaseCalendar::remaining_months(as_of, amendment.end_date),
    })
}

/// Annual rent per square foot, rounded to cents; zero without area
pub fn rent_psf(annual_rent: Decimal, leased_area: Decimal) -> Decimal {
    if leased_area <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    annual_rent
        .checked_div(leased_area)
        .map(|psf| psf.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}
