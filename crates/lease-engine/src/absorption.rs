//! Absorption calculator: same-store occupancy movement between two dates
//!
//! A space is either vacant or occupied by one tenant, and only lease starts
//! and lease ends move it between the two. Commencements and expirations are
//! read from the amendment table; the two rent-roll snapshots supply the
//! occupied area on each side so the movement can be reconciled.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Days, NaiveDate};
use ledger_types::{
    Amendment, AmendmentId, AmendmentType, Finding, FindingKind, LeaseKey, ResolvedLease,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::AbsorptionConfig;
use crate::error::{EngineError, Result};
use crate::ledger::Ledger;
use crate::snapshot::{resolve_rent_roll, RentRoll};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementCause {
    Commencement,
    /// Lease reached its end date
    LeaseEnd,
    Termination,
}

/// One lease starting or ending occupancy inside the interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceMovement {
    pub key: LeaseKey,
    pub property_code: String,
    pub suite: Option<String>,
    pub amendment_id: AmendmentId,
    pub sequence: i64,
    pub amendment_type: AmendmentType,
    pub cause: MovementCause,
    /// Start date for commencements, last occupied day for lease ends,
    /// effective date for terminations
    pub date: NaiveDate,
    pub area: Decimal,
}

/// One tenant replacing another in the same suite without a vacancy gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantChange {
    pub property_id: String,
    pub suite: String,
    pub outgoing_tenant: String,
    pub incoming_tenant: String,
    pub vacated_on: NaiveDate,
    pub commenced_on: NaiveDate,
}

/// Area change on a lease occupied at both ends of the interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaAdjustment {
    pub key: LeaseKey,
    pub from_area: Decimal,
    pub to_area: Decimal,
    pub delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsorptionReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Property ids held throughout the interval
    pub same_store: Vec<String>,
    pub commencements: Vec<SpaceMovement>,
    pub expirations: Vec<SpaceMovement>,
    pub tenant_changes: Vec<TenantChange>,
    pub area_adjustments: Vec<AreaAdjustment>,
    pub commencements_sf: Decimal,
    pub expirations_sf: Decimal,
    pub net_absorption: Decimal,
    pub adjustments_sf: Decimal,
    pub occupied_start: Decimal,
    pub occupied_end: Decimal,
    pub unexplained_sf: Decimal,
    pub tolerance_sf: Decimal,
    pub findings: Vec<Finding>,
}

impl AbsorptionReport {
    pub fn is_consistent(&self) -> bool {
        self.unexplained_sf.abs() <= self.tolerance_sf
    }
}

pub struct AbsorptionCalculator<'a> {
    config: &'a AbsorptionConfig,
    rent_codes: &'a [String],
}

impl<'a> AbsorptionCalculator<'a> {
    pub fn new(config: &'a AbsorptionConfig, rent_codes: &'a [String]) -> Self {
        Self { config, rent_codes }
    }

    /// Resolve both snapshots from the ledger, then compute
    pub fn compute(
        &self,
        ledger: &Ledger,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AbsorptionReport> {
        check_interval(from, to)?;
        let start = resolve_rent_roll(ledger, from, self.rent_codes);
        let end = resolve_rent_roll(ledger, to, self.rent_codes);
        self.compute_with_snapshots(ledger, &start, &end)
    }

    /// Compute from snapshots produced elsewhere, e.g. by a trend run
    pub fn compute_with_snapshots(
        &self,
        ledger: &Ledger,
        start: &RentRoll,
        end: &RentRoll,
    ) -> Result<AbsorptionReport> {
        let (from, to) = (start.as_of, end.as_of);
        check_interval(from, to)?;

        let same_store: BTreeSet<&str> = ledger
            .properties()
            .iter()
            .filter(|p| p.is_same_store(from, to))
            .map(|p| p.property_id.as_str())
            .collect();
        let in_scope = |property_id: &str| same_store.contains(property_id);

        let occupied_before = occupancy(start, &in_scope);
        let occupied_after = occupancy(end, &in_scope);
        let mut findings = Vec::new();

        let window = Window { from, to };
        let starts = self.commencement_periods(ledger, window, &in_scope, &mut findings);
        let mut vacates = vacate_events(ledger, window, &in_scope);

        let keys: BTreeSet<&LeaseKey> = occupied_before.keys().chain(starts.keys()).collect();
        let mut commencements = Vec::new();
        let mut expirations = Vec::new();
        let mut area_adjustments = Vec::new();

        for key in keys {
            let before = occupied_before.get(key).copied();
            let after = occupied_after.get(key).copied();
            let started: &[&Amendment] = starts.get(key).map(Vec::as_slice).unwrap_or_default();

            if let (Some(before), Some(after), []) = (before, after, started) {
                let delta = after.leased_area - before.leased_area;
                if !delta.is_zero() {
                    area_adjustments.push(AreaAdjustment {
                        key: key.clone(),
                        from_area: before.leased_area,
                        to_area: after.leased_area,
                        delta,
                    });
                }
                continue;
            }

            let stretches = stretches(ledger, from, before, started, after);
            for stretch in stretches.iter().filter(|s| s.commenced) {
                commencements.push(movement(
                    ledger,
                    stretch.amendment,
                    MovementCause::Commencement,
                    stretch.began,
                    stretch.area,
                ));
            }

            let mut unused = vacates.remove(key).unwrap_or_default();
            for (index, stretch) in stretches.iter().enumerate() {
                let next = stretches.get(index + 1);
                if next.is_none() && after.is_some() {
                    break;
                }
                let until = next.map_or(to, |n| n.began);
                // a termination ends the stretch outright; otherwise the last end wins
                let found = unused
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| stretch.began <= e.vacant_from && e.vacant_from <= until)
                    .max_by_key(|(_, e)| {
                        let terminated = e.cause == MovementCause::Termination;
                        (terminated, e.vacant_from, e.amendment.sequence)
                    })
                    .map(|(i, _)| i);

                if let Some(found) = found {
                    let event = unused.swap_remove(found);
                    expirations.push(movement(
                        ledger,
                        event.amendment,
                        event.cause,
                        event.date,
                        stretch.area,
                    ));
                } else if let Some(last_day) = next.and_then(|n| n.began.pred_opt()) {
                    // a later lease on the key ends this one the day before, at the latest
                    debug!(%key, amendment = stretch.amendment.amendment_id, "occupancy ended by a new lease");
                    expirations.push(movement(
                        ledger,
                        stretch.amendment,
                        MovementCause::LeaseEnd,
                        last_day,
                        stretch.area,
                    ));
                }
            }
        }

        let tenant_changes = match_tenant_changes(&expirations, &commencements);

        let commencements_sf: Decimal = commencements.iter().map(|m| m.area).sum();
        let expirations_sf: Decimal = expirations.iter().map(|m| m.area).sum();
        let adjustments_sf: Decimal = area_adjustments.iter().map(|a| a.delta).sum();
        let occupied_start: Decimal = occupied_before.values().map(|l| l.leased_area).sum();
        let occupied_end: Decimal = occupied_after.values().map(|l| l.leased_area).sum();
        let net_absorption = commencements_sf - expirations_sf;
        let unexplained_sf = occupied_end - occupied_start - net_absorption - adjustments_sf;

        let report = AbsorptionReport {
            from,
            to,
            same_store: same_store.iter().map(|id| id.to_string()).collect(),
            commencements,
            expirations,
            tenant_changes,
            area_adjustments,
            commencements_sf,
            expirations_sf,
            net_absorption,
            adjustments_sf,
            occupied_start,
            occupied_end,
            unexplained_sf,
            tolerance_sf: self.config.tolerance_sf,
            findings,
        };

        if !report.is_consistent() {
            warn!(%from, %to, unexplained = %report.unexplained_sf, "absorption does not reconcile");
        }
        info!(
            %from,
            %to,
            commencements = report.commencements.len(),
            expirations = report.expirations.len(),
            net = %report.net_absorption,
            "absorption computed"
        );
        Ok(report)
    }

    /// Commencement-type amendments starting in the window, one per
    /// occupancy period
    ///
    /// Rows whose terms overlap describe the same period and the highest
    /// sequence among them stands for it. A period without a rent line is
    /// reported and not counted.
    fn commencement_periods<'l>(
        &self,
        ledger: &'l Ledger,
        window: Window,
        in_scope: &dyn Fn(&str) -> bool,
        findings: &mut Vec<Finding>,
    ) -> BTreeMap<LeaseKey, Vec<&'l Amendment>> {
        let mut groups: BTreeMap<LeaseKey, Vec<&'l Amendment>> = BTreeMap::new();
        for amendment in ledger.amendments() {
            let starts_inside = amendment.start_date.is_some_and(|d| window.contains(d));
            if starts_inside
                && amendment.status.is_eligible()
                && in_scope(&amendment.property_id)
                && self.config.commencement_types.contains(&amendment.amendment_type)
            {
                groups.entry(amendment.key()).or_default().push(amendment);
            }
        }

        let with_rent: HashSet<AmendmentId> = ledger
            .charges()
            .iter()
            .filter(|c| c.is_rent(self.rent_codes))
            .map(|c| c.amendment_id)
            .collect();

        let mut periods_by_key = BTreeMap::new();
        for (key, mut rows) in groups {
            rows.sort_by_key(|a| (a.start_date, a.sequence));
            let mut periods: Vec<Vec<&'l Amendment>> = Vec::new();
            for row in rows {
                match periods.last_mut() {
                    Some(period) if overlaps(period, row) => period.push(row),
                    _ => periods.push(vec![row]),
                }
            }

            let mut counted = Vec::new();
            for period in &periods {
                let Some(latest) = pick_latest(&key, period, findings) else {
                    continue;
                };
                if !with_rent.contains(&latest.amendment_id) {
                    debug!(%key, amendment = latest.amendment_id, "commencement without rent line");
                    findings.push(
                        Finding::new(
                            FindingKind::UncountedCommencement,
                            format!(
                                "Amendment {} for {} starts inside the interval but has no rent charge",
                                latest.amendment_id, key
                            ),
                        )
                        .with_key(key.clone())
                        .with_amendment(latest.amendment_id),
                    );
                    continue;
                }
                counted.push(latest);
            }
            if !counted.is_empty() {
                counted.sort_by_key(|a| a.start_date);
                periods_by_key.insert(key, counted);
            }
        }
        periods_by_key
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    from: NaiveDate,
    to: NaiveDate,
}

impl Window {
    /// Half-open on the left: (from, to]
    fn contains(&self, date: NaiveDate) -> bool {
        self.from < date && date <= self.to
    }
}

fn check_interval(from: NaiveDate, to: NaiveDate) -> Result<()> {
    if from >= to {
        return Err(EngineError::InvalidInterval { from, to });
    }
    Ok(())
}

fn occupancy<'r>(
    roll: &'r RentRoll,
    in_scope: &dyn Fn(&str) -> bool,
) -> BTreeMap<LeaseKey, &'r ResolvedLease> {
    roll.leases
        .iter()
        .filter(|l| in_scope(&l.property_id))
        .map(|l| (l.key(), l))
        .collect()
}

/// A row joins the period when any member is still running on its start
fn overlaps(period: &[&Amendment], row: &Amendment) -> bool {
    let Some(start) = row.start_date else {
        return false;
    };
    period
        .iter()
        .any(|a| a.end_date.map_or(true, |end| start <= end))
}

/// Highest sequence wins; a tie is reported and counts as nothing
fn pick_latest<'a>(
    key: &LeaseKey,
    rows: &[&'a Amendment],
    findings: &mut Vec<Finding>,
) -> Option<&'a Amendment> {
    let sequence = rows.iter().map(|a| a.sequence).max()?;
    let top: Vec<&'a Amendment> = rows.iter().copied().filter(|a| a.sequence == sequence).collect();
    if let [latest] = top.as_slice() {
        return Some(*latest);
    }

    let mut ids: Vec<AmendmentId> = top.iter().map(|a| a.amendment_id).collect();
    ids.sort_unstable();
    warn!(%key, sequence, ?ids, "absorption candidates share a sequence");
    findings.push(
        Finding::new(
            FindingKind::ResolutionConflict,
            format!(
                "{} amendments for {} share sequence {} inside the interval",
                ids.len(),
                key,
                sequence
            ),
        )
        .with_key(key.clone())
        .with_amendments(ids),
    );
    None
}

/// One uninterrupted occupancy of a key inside the interval
struct Stretch<'l> {
    began: NaiveDate,
    amendment: &'l Amendment,
    commenced: bool,
    area: Decimal,
}

/// The lease held at the start, if any, then every counted commencement
///
/// A stretch still running at the end takes its area from the closing
/// snapshot.
fn stretches<'l>(
    ledger: &'l Ledger,
    from: NaiveDate,
    before: Option<&ResolvedLease>,
    started: &[&'l Amendment],
    after: Option<&ResolvedLease>,
) -> Vec<Stretch<'l>> {
    let mut stretches = Vec::with_capacity(started.len() + 1);
    if let Some(lease) = before {
        if let Some(amendment) = ledger.amendment(lease.amendment_id) {
            stretches.push(Stretch {
                began: from,
                amendment,
                commenced: false,
                area: lease.leased_area,
            });
        }
    }
    stretches.extend(started.iter().filter_map(|&amendment| {
        Some(Stretch {
            began: amendment.start_date?,
            amendment,
            commenced: true,
            area: amendment.leased_area,
        })
    }));

    if let (Some(lease), Some(last)) = (after, stretches.last_mut()) {
        if last.commenced {
            last.area = lease.leased_area;
        }
    }
    stretches
}

/// A dated reason for a key to fall vacant
struct VacateEvent<'l> {
    amendment: &'l Amendment,
    cause: MovementCause,
    /// Last occupied day for lease ends, effective date for terminations
    date: NaiveDate,
    vacant_from: NaiveDate,
}

/// Lease ends and terminations that leave a key vacant inside the window
///
/// A lease ending on `end_date` is vacant from the next day; a termination
/// is vacant from its effective date.
fn vacate_events<'l>(
    ledger: &'l Ledger,
    window: Window,
    in_scope: &dyn Fn(&str) -> bool,
) -> BTreeMap<LeaseKey, Vec<VacateEvent<'l>>> {
    let mut events: BTreeMap<LeaseKey, Vec<VacateEvent<'l>>> = BTreeMap::new();

    for amendment in ledger.amendments() {
        if !amendment.status.is_eligible() || !in_scope(&amendment.property_id) {
            continue;
        }
        let event = match amendment.amendment_type {
            AmendmentType::ProposalInDm | AmendmentType::Other(_) => continue,
            AmendmentType::Termination => {
                let Some(effective) = amendment.effective_termination_date() else {
                    continue;
                };
                VacateEvent {
                    amendment,
                    cause: MovementCause::Termination,
                    date: effective,
                    vacant_from: effective,
                }
            }
            _ => {
                let Some(end) = amendment.end_date else {
                    continue;
                };
                let Some(next_day) = end.checked_add_days(Days::new(1)) else {
                    continue;
                };
                VacateEvent {
                    amendment,
                    cause: MovementCause::LeaseEnd,
                    date: end,
                    vacant_from: next_day,
                }
            }
        };
        if window.contains(event.vacant_from) {
            events.entry(amendment.key()).or_default().push(event);
        }
    }
    events
}

fn movement(
    ledger: &Ledger,
    amendment: &Amendment,
    cause: MovementCause,
    date: NaiveDate,
    area: Decimal,
) -> SpaceMovement {
    SpaceMovement {
        key: amendment.key(),
        property_code: ledger
            .property(&amendment.property_id)
            .map(|p| p.code.clone())
            .unwrap_or_else(|| amendment.property_id.clone()),
        suite: amendment.suite.clone(),
        amendment_id: amendment.amendment_id,
        sequence: amendment.sequence,
        amendment_type: amendment.amendment_type.clone(),
        cause,
        date,
        area,
    }
}

/// Pair each expiration with at most one commencement in the same suite
fn match_tenant_changes(
    expirations: &[SpaceMovement],
    commencements: &[SpaceMovement],
) -> Vec<TenantChange> {
    let mut used: HashSet<usize> = HashSet::new();
    let mut changes = Vec::new();

    for expiration in expirations {
        let Some(suite) = expiration.suite.as_deref() else {
            continue;
        };
        // a termination frees the suite on its effective date, a lease end the day after
        let vacant_from = match expiration.cause {
            MovementCause::Termination => expiration.date,
            _ => match expiration.date.checked_add_days(Days::new(1)) {
                Some(next_day) => next_day,
                None => continue,
            },
        };
        let found = commencements.iter().enumerate().find(|(i, c)| {
            !used.contains(i)
                && c.key.property_id == expiration.key.property_id
                && c.key.tenant_id != expiration.key.tenant_id
                && c.suite.as_deref() == Some(suite)
                && c.date <= vacant_from
        });
        if let Some((index, commencement)) = found {
            used.insert(index);
            changes.push(TenantChange {
                property_id: expiration.key.property_id.clone(),
                suite: suite.to_string(),
                outgoing_tenant: expiration.key.tenant_id.clone(),
                incoming_tenant: commencement.key.tenant_id.clone(),
                vacated_on: expiration.date,
                commenced_on: commencement.date,
            });
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{amendment, charge, charge_between, date, ledger, property};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn compute(ledger: &Ledger, from: NaiveDate, to: NaiveDate) -> Result<AbsorptionReport> {
        let config = AbsorptionConfig::default();
        let codes = vec!["rent".to_string()];
        AbsorptionCalculator::new(&config, &codes).compute(ledger, from, to)
    }

    fn h1() -> (NaiveDate, NaiveDate) {
        (date(2025, 1, 1), date(2025, 6, 30))
    }

    #[test]
    fn test_reversed_interval_is_an_error() {
        let ledger = ledger(vec![], vec![], vec![]);
        let err = compute(&ledger, date(2025, 6, 30), date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInterval { .. }));
        assert!(compute(&ledger, date(2025, 1, 1), date(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_commencement_and_expiration_net_out() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "OLD", 0)
                    .start(date(2022, 1, 1))
                    .end(Some(date(2025, 3, 31)))
                    .area(dec!(2000))
                    .build(),
                amendment(2, "P", "NEW", 0)
                    .start(date(2025, 5, 1))
                    .area(dec!(1500))
                    .build(),
                amendment(3, "P", "STAY", 0).area(dec!(800)).build(),
            ],
            vec![
                charge(10, 1, "rent", dec!(3000)),
                charge_between(11, 2, dec!(2500), date(2025, 5, 1), None),
                charge(12, 3, "rent", dec!(900)),
            ],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.commencements_sf, dec!(1500));
        assert_eq!(report.expirations_sf, dec!(2000));
        assert_eq!(report.net_absorption, dec!(-500));
        assert_eq!(report.occupied_start, dec!(2800));
        assert_eq!(report.occupied_end, dec!(2300));
        assert_eq!(report.unexplained_sf, Decimal::ZERO);
        assert!(report.is_consistent());
        assert_eq!(report.expirations[0].cause, MovementCause::LeaseEnd);
    }

    #[test]
    fn test_non_same_store_property_is_ignored() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![amendment(1, "NEWBUY", "X", 0).start(date(2025, 3, 1)).build()],
            vec![charge(10, 1, "rent", dec!(100))],
            vec![property("NEWBUY", "NB", date(2025, 2, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert!(report.same_store.is_empty());
        assert!(report.commencements.is_empty());
        assert_eq!(report.occupied_end, Decimal::ZERO);
    }

    #[test]
    fn test_commencement_without_rent_is_not_counted() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![amendment(1, "P", "X", 0).start(date(2025, 2, 1)).build()],
            vec![charge(10, 1, "CAM", dec!(100))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert!(report.commencements.is_empty());
        assert_eq!(report.findings[0].kind, FindingKind::UncountedCommencement);
        assert_eq!(report.unexplained_sf, dec!(1000));
        assert!(!report.is_consistent());
    }

    #[test]
    fn test_termination_expires_the_lease() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "X", 0).area(dec!(1200)).build(),
                amendment(2, "P", "X", 1)
                    .kind("Termination")
                    .start(date(2025, 4, 1))
                    .end(Some(date(2025, 4, 30)))
                    .area(Decimal::ZERO)
                    .build(),
            ],
            vec![charge(10, 1, "rent", dec!(100))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.expirations.len(), 1);
        assert_eq!(report.expirations[0].cause, MovementCause::Termination);
        assert_eq!(report.expirations[0].area, dec!(1200));
        assert!(report.is_consistent());
    }

    #[test]
    fn test_renewal_is_neither_expiration_nor_commencement() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "X", 0)
                    .status("Superseded")
                    .end(Some(date(2025, 2, 28)))
                    .build(),
                amendment(2, "P", "X", 1)
                    .kind("Renewal")
                    .start(date(2025, 3, 1))
                    .area(dec!(1300))
                    .build(),
            ],
            vec![charge(10, 1, "rent", dec!(100)), charge(11, 2, "rent", dec!(120))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert!(report.expirations.is_empty());
        assert!(report.commencements.is_empty());
        assert_eq!(
            report.area_adjustments,
            vec![AreaAdjustment {
                key: LeaseKey::new("P", "X"),
                from_area: dec!(1000),
                to_area: dec!(1300),
                delta: dec!(300),
            }]
        );
        assert!(report.is_consistent());
    }

    #[test]
    fn test_suite_handover_is_a_tenant_change() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "A", 0)
                    .end(Some(date(2025, 3, 31)))
                    .suite("100")
                    .build(),
                amendment(2, "P", "B", 0)
                    .start(date(2025, 4, 1))
                    .suite("100")
                    .build(),
                amendment(3, "P", "C", 0)
                    .start(date(2025, 5, 1))
                    .suite("200")
                    .build(),
            ],
            vec![
                charge(10, 1, "rent", dec!(100)),
                charge_between(11, 2, dec!(100), date(2025, 4, 1), None),
                charge_between(12, 3, dec!(100), date(2025, 5, 1), None),
            ],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(
            report.tenant_changes,
            vec![TenantChange {
                property_id: "P".to_string(),
                suite: "100".to_string(),
                outgoing_tenant: "A".to_string(),
                incoming_tenant: "B".to_string(),
                vacated_on: date(2025, 3, 31),
                commenced_on: date(2025, 4, 1),
            }]
        );
        assert_eq!(report.commencements.len(), 2);
        assert_eq!(report.expirations.len(), 1);
    }

    #[test]
    fn test_short_lease_inside_interval_nets_to_zero() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![amendment(1, "P", "POPUP", 0)
                .start(date(2025, 2, 1))
                .end(Some(date(2025, 4, 30)))
                .area(dec!(400))
                .build()],
            vec![charge_between(10, 1, dec!(50), date(2025, 2, 1), Some(date(2025, 4, 30)))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.commencements_sf, dec!(400));
        assert_eq!(report.expirations_sf, dec!(400));
        assert_eq!(report.net_absorption, Decimal::ZERO);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_lease_ending_on_start_date_counts_as_expiration() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![amendment(1, "P", "X", 0).end(Some(from)).build()],
            vec![charge(10, 1, "rent", dec!(100))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.occupied_start, dec!(1000));
        assert_eq!(report.expirations_sf, dec!(1000));
        assert!(report.is_consistent());
    }

    #[test]
    fn test_each_occupancy_of_a_key_counts() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "X", 0)
                    .kind("New Lease")
                    .start(date(2025, 2, 1))
                    .end(Some(date(2025, 2, 28)))
                    .area(dec!(400))
                    .build(),
                amendment(2, "P", "X", 1)
                    .kind("New Lease")
                    .start(date(2025, 5, 1))
                    .area(dec!(400))
                    .build(),
            ],
            vec![
                charge_between(10, 1, dec!(50), date(2025, 2, 1), Some(date(2025, 2, 28))),
                charge_between(11, 2, dec!(50), date(2025, 5, 1), None),
            ],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.commencements.len(), 2);
        assert_eq!(report.commencements_sf, dec!(800));
        assert_eq!(report.expirations.len(), 1);
        assert_eq!(report.expirations[0].amendment_id, 1);
        assert_eq!(report.expirations[0].date, date(2025, 2, 28));
        assert_eq!(report.net_absorption, dec!(400));
        assert_eq!(report.occupied_end, dec!(400));
        assert_eq!(report.unexplained_sf, Decimal::ZERO);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_overlapping_rows_are_one_occupancy() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![
                amendment(1, "P", "X", 0)
                    .start(date(2025, 2, 1))
                    .area(dec!(400))
                    .build(),
                amendment(2, "P", "X", 1)
                    .kind("New Lease")
                    .start(date(2025, 3, 1))
                    .area(dec!(600))
                    .build(),
            ],
            vec![
                charge_between(10, 1, dec!(50), date(2025, 2, 1), None),
                charge_between(11, 2, dec!(70), date(2025, 3, 1), None),
            ],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let report = compute(&ledger, from, to).unwrap();

        assert_eq!(report.commencements.len(), 1);
        assert_eq!(report.commencements[0].amendment_id, 2);
        assert_eq!(report.commencements_sf, dec!(600));
        assert!(report.expirations.is_empty());
        assert!(report.is_consistent());
    }

    #[test]
    fn test_termination_day_is_already_vacant() {
        let (from, to) = h1();
        let handover = |incoming_start: NaiveDate| {
            ledger(
                vec![
                    amendment(1, "P", "A", 0).suite("100").build(),
                    amendment(2, "P", "A", 1)
                        .kind("Termination")
                        .suite("100")
                        .start(date(2025, 4, 1))
                        .end(Some(date(2025, 4, 1)))
                        .area(Decimal::ZERO)
                        .build(),
                    amendment(3, "P", "B", 0)
                        .start(incoming_start)
                        .suite("100")
                        .build(),
                ],
                vec![
                    charge(10, 1, "rent", dec!(100)),
                    charge_between(11, 3, dec!(100), incoming_start, None),
                ],
                vec![property("P", "ALPHA", date(2020, 1, 1))],
            )
        };

        let same_day = compute(&handover(date(2025, 4, 1)), from, to).unwrap();
        assert_eq!(same_day.tenant_changes.len(), 1);
        assert_eq!(same_day.tenant_changes[0].vacated_on, date(2025, 4, 1));

        let next_day = compute(&handover(date(2025, 4, 2)), from, to).unwrap();
        assert!(next_day.tenant_changes.is_empty());
        assert_eq!(next_day.expirations[0].cause, MovementCause::Termination);
        assert!(next_day.is_consistent());
    }

    #[test]
    fn test_snapshots_from_elsewhere_give_same_report() {
        let (from, to) = h1();
        let ledger = ledger(
            vec![amendment(1, "P", "X", 0).start(date(2025, 2, 1)).build()],
            vec![charge(10, 1, "rent", dec!(100))],
            vec![property("P", "ALPHA", date(2020, 1, 1))],
        );
        let codes = vec!["rent".to_string()];
        let config = AbsorptionConfig::default();
        let calculator = AbsorptionCalculator::new(&config, &codes);
        let start = resolve_rent_roll(&ledger, from, &codes);
        let end = resolve_rent_roll(&ledger, to, &codes);

        assert_eq!(
            calculator.compute_with_snapshots(&ledger, &start, &end).unwrap(),
            calculator.compute(&ledger, from, to).unwrap()
        );
    }
}
