//! Month-end trend series
//!
//! Each date is an independent rent-roll resolution over the same borrowed
//! ledger, so dates are split across scoped threads.

use std::num::NonZeroUsize;
use std::thread;

use chrono::NaiveDate;
use ledger_types::critical_count;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EngineConfig;
use crate::ledger::Ledger;
use crate::snapshot::{resolve_rent_roll, RentRoll};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub as_of: NaiveDate,
    pub lease_count: usize,
    pub occupied_sf: Decimal,
    pub monthly_rent: Decimal,
    pub orphaned_amount: Decimal,
    pub finding_count: usize,
    pub critical_count: usize,
}

impl TrendPoint {
    fn from_roll(roll: &mut RentRoll, config: &EngineConfig) -> Self {
        config.grade(&mut roll.findings);
        Self {
            as_of: roll.as_of,
            lease_count: roll.totals.lease_count,
            occupied_sf: roll.totals.leased_area,
            monthly_rent: roll.totals.monthly_rent,
            orphaned_amount: roll.totals.orphaned_amount,
            finding_count: roll.findings.len(),
            critical_count: critical_count(&roll.findings),
        }
    }
}

/// Resolve every date, returning points in the order given
pub fn resolve_series(ledger: &Ledger, dates: &[NaiveDate], config: &EngineConfig) -> Vec<TrendPoint> {
    if dates.is_empty() {
        return Vec::new();
    }

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(dates.len());
    let chunk_size = dates.len().div_ceil(workers);
    debug!(dates = dates.len(), workers, "resolving trend series");

    thread::scope(|scope| {
        let handles: Vec<_> = dates
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&as_of| {
                            let mut roll =
                                resolve_rent_roll(ledger, as_of, &config.charges.rent_codes);
                            TrendPoint::from_roll(&mut roll, config)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}
