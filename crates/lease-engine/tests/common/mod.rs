//! Ledger generators shared by the property tests

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use lease_engine::Ledger;
use ledger_types::{Amendment, ChargeLine, Property};
use proptest::prelude::*;
use proptest::sample::select;
use rust_decimal::Decimal;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Days after 2023-01-01
pub fn day(offset: u64) -> NaiveDate {
    date(2023, 1, 1) + Days::new(offset)
}

pub fn properties() -> Vec<Property> {
    [("P0", "ALPHA", date(2020, 1, 1)), ("P1", "BRAVO", date(2020, 1, 1)), ("P2", "CEDAR", date(2025, 3, 1))]
        .into_iter()
        .map(|(id, code, acquired)| Property {
            property_id: id.to_string(),
            code: code.to_string(),
            name: format!("{code} Center"),
            acquire_date: acquired,
            dispose_date: None,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn row(
    id: u64,
    property: usize,
    tenant: String,
    sequence: i64,
    status: &str,
    kind: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    area: Decimal,
    suite: Option<String>,
) -> Amendment {
    Amendment {
        amendment_id: id,
        property_id: format!("P{property}"),
        tenant_id: tenant,
        sequence,
        status: status.into(),
        amendment_type: kind.into(),
        start_date: start,
        end_date: end,
        leased_area: area,
        sign_date: None,
        tenant_name: None,
        suite,
        audit_notes: Vec::new(),
    }
}

fn rent_line(id: u64, amendment_id: u64, amount: Decimal, from: NaiveDate, to: Option<NaiveDate>) -> ChargeLine {
    ChargeLine {
        charge_id: id,
        amendment_id,
        charge_code: "rent".to_string(),
        monthly_amount: amount,
        from_date: from,
        to_date: to,
    }
}

/// Anything goes: unknown statuses, sequence ties, charges on missing
/// amendments, inverted date ranges
pub fn arb_messy_ledger() -> impl Strategy<Value = Ledger> {
    let amendment = (
        0usize..3,
        0u8..4,
        0i64..4,
        select(vec!["Activated", "Superseded", "Cancelled", "Pending", "Draft"]),
        select(vec![
            "Original Lease",
            "Renewal",
            "Expansion",
            "Termination",
            "Proposal in DM",
            "Holdover",
        ]),
        prop::option::weighted(0.9, 0u64..1200),
        prop::option::of(0u64..900),
        0i64..5000,
    );
    let charge = (
        0u64..25,
        select(vec!["rent", "RENT", "CAM", "tax"]),
        0i64..1_000_000,
        0u64..1200,
        prop::option::of(0u64..900),
    );

    (
        prop::collection::vec(amendment, 0..20),
        prop::collection::vec(charge, 0..30),
    )
        .prop_map(|(amendments, charges)| {
            let amendments = amendments
                .into_iter()
                .enumerate()
                .map(|(i, (property, tenant, sequence, status, kind, start, length, area))| {
                    let start = start.map(day);
                    // Occasionally ends before it starts
                    let end = match (start, length) {
                        (Some(s), Some(len)) if len % 7 == 0 => s.checked_sub_days(Days::new(len + 1)),
                        (Some(s), Some(len)) => Some(s + Days::new(len)),
                        _ => None,
                    };
                    row(
                        i as u64 + 1,
                        property,
                        format!("T{tenant}"),
                        sequence,
                        status,
                        kind,
                        start,
                        end,
                        Decimal::from(area),
                        None,
                    )
                })
                .collect();
            let charges = charges
                .into_iter()
                .enumerate()
                .map(|(i, (amendment, code, cents, from, length))| ChargeLine {
                    charge_id: i as u64 + 100,
                    amendment_id: amendment,
                    charge_code: code.to_string(),
                    monthly_amount: Decimal::new(cents, 2),
                    from_date: day(from),
                    to_date: length.map(|len| day(from + len)),
                })
                .collect();
            Ledger::new(1, amendments, charges, properties()).unwrap()
        })
}

/// One tenant history: an original lease, optionally expanded, optionally
/// terminated early, optionally let again after it ends
#[derive(Debug, Clone)]
struct Tenancy {
    property: usize,
    suite: Option<usize>,
    start: u64,
    length: Option<u64>,
    area: i64,
    expansion: Option<(u64, i64)>,
    termination: Option<u64>,
    /// Gap after the original end, relet length, relet area
    relet: Option<(u64, Option<u64>, i64)>,
}

fn arb_tenancy() -> impl Strategy<Value = Tenancy> {
    (
        (0usize..3, prop::option::of(0usize..3)),
        0u64..1400,
        prop::option::of(60u64..1200),
        1i64..50,
        prop::option::of((0u64..600, 1i64..50)),
        prop::option::of(0u64..1200),
        prop::option::of((0u64..90, prop::option::of(30u64..600), 1i64..50)),
    )
        .prop_map(
            |((property, suite), start, length, area, expansion, termination, relet)| Tenancy {
                property,
                suite,
                start,
                length,
                area: area * 100,
                expansion: expansion.map(|(offset, area)| (offset, area * 100)),
                termination,
                // only a lease with an end date can be let again
                relet: relet
                    .filter(|_| length.is_some())
                    .map(|(gap, len, area)| (gap, len, area * 100)),
            },
        )
}

/// Well-formed ledgers: unique keys, no ties, every original lease carries
/// rent, expansions and terminations stay inside the lease term, a relet
/// starts after the first term ends. Tenancies may share a suite.
pub fn arb_clean_ledger() -> impl Strategy<Value = Ledger> {
    prop::collection::vec(arb_tenancy(), 0..12).prop_map(|tenancies| {
        let mut amendments = Vec::new();
        let mut charges = Vec::new();

        for (i, t) in tenancies.into_iter().enumerate() {
            let base = i as u64 * 10;
            let tenant = format!("T{i}");
            let start = day(t.start);
            let end = t.length.map(|len| day(t.start + len));
            let suite = t.suite.map(|n| format!("1{n}0"));
            let status = if t.expansion.is_some() { "Superseded" } else { "Activated" };

            amendments.push(row(
                base + 1,
                t.property,
                tenant.clone(),
                0,
                status,
                "Original Lease",
                Some(start),
                end,
                Decimal::from(t.area),
                suite.clone(),
            ));
            charges.push(rent_line(base + 1, base + 1, Decimal::from(t.area), start, end));

            if let Some((offset, area)) = t.expansion {
                let shift = match t.length {
                    Some(len) => 1 + offset % len,
                    None => 1 + offset,
                };
                let expansion_start = day(t.start + shift);
                amendments.push(row(
                    base + 2,
                    t.property,
                    tenant.clone(),
                    1,
                    "Activated",
                    "Expansion",
                    Some(expansion_start),
                    end,
                    Decimal::from(area),
                    suite.clone(),
                ));
                charges.push(rent_line(base + 2, base + 2, Decimal::from(area), expansion_start, end));
            }

            if let Some(offset) = t.termination {
                let shift = match t.length {
                    Some(len) => offset % (len + 1),
                    None => offset,
                };
                let effective = day(t.start + shift);
                amendments.push(row(
                    base + 3,
                    t.property,
                    tenant.clone(),
                    2,
                    "Activated",
                    "Termination",
                    Some(effective),
                    Some(effective),
                    Decimal::ZERO,
                    suite.clone(),
                ));
            }

            if let (Some(len), Some((gap, relet_length, area))) = (t.length, t.relet) {
                let relet_offset = t.start + len + 1 + gap;
                let relet_start = day(relet_offset);
                let relet_end = relet_length.map(|l| day(relet_offset + l));
                amendments.push(row(
                    base + 4,
                    t.property,
                    tenant,
                    3,
                    "Activated",
                    "New Lease",
                    Some(relet_start),
                    relet_end,
                    Decimal::from(area),
                    suite,
                ));
                charges.push(rent_line(base + 4, base + 4, Decimal::from(area), relet_start, relet_end));
            }
        }

        Ledger::new(1, amendments, charges, properties()).unwrap()
    })
}

/// T1 < T2, both within the generated date range
pub fn arb_interval() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (0u64..1800, 1u64..730).prop_map(|(from, length)| (day(from), day(from + length)))
}

pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..2200).prop_map(day)
}
