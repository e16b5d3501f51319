//! Lease ledger resolution and absorption engine
//!
//! One pipeline (eligibility, sequence resolution, charge aggregation,
//! snapshot) serves every read path. Integrity validation runs over the raw
//! ledger, and remediation is a separate, explicit batch that produces a new
//! ledger version.

pub mod absorption;
pub mod calendar;
pub mod charges;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod integrity;
pub mod ledger;
pub mod remediation;
pub mod resolver;
pub mod snapshot;
pub mod trend;

#[cfg(test)]
mod testing;

use chrono::NaiveDate;
use ledger_types::AuditChain;

pub use absorption::{AbsorptionCalculator, AbsorptionReport};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use integrity::{IntegrityReport, IntegrityValidator};
pub use ledger::{Ledger, LedgerDocument};
pub use remediation::{RemediationOutcome, RemediationSummary};
pub use snapshot::RentRoll;
pub use trend::TrendPoint;

use calendar::LeaseCalendar;

/// LeaseEngine entry point
#[derive(Debug, Clone, Default)]
pub struct LeaseEngine {
    config: EngineConfig,
}

impl LeaseEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rent roll for one date, findings graded by the configured critical set
    pub fn rent_roll(&self, ledger: &Ledger, as_of: NaiveDate) -> RentRoll {
        let mut roll = snapshot::resolve_rent_roll(ledger, as_of, &self.config.charges.rent_codes);
        self.config.grade(&mut roll.findings);
        roll
    }

    pub fn validate(&self, ledger: &Ledger, as_of: NaiveDate) -> IntegrityReport {
        IntegrityValidator::new(&self.config.integrity).validate(ledger, as_of)
    }

    pub fn absorption(
        &self,
        ledger: &Ledger,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AbsorptionReport> {
        let mut report =
            AbsorptionCalculator::new(&self.config.absorption, &self.config.charges.rent_codes)
                .compute(ledger, from, to)?;
        self.config.grade(&mut report.findings);
        Ok(report)
    }

    /// One point per month end in `[from, to]`
    pub fn trend(&self, ledger: &Ledger, from: NaiveDate, to: NaiveDate) -> Result<Vec<TrendPoint>> {
        if from > to {
            return Err(EngineError::InvalidInterval { from, to });
        }
        let dates = LeaseCalendar::month_ends_between(from, to);
        Ok(trend::resolve_series(ledger, &dates, &self.config))
    }

    pub fn remediate(&self, ledger: &Ledger, as_of: NaiveDate) -> Result<RemediationOutcome> {
        remediation::remediate(ledger, as_of, &self.config.remediation)
    }

    pub fn revert(&self, remediated: &Ledger, audit: &AuditChain) -> Result<Ledger> {
        remediation::revert(remediated, audit)
    }
}
