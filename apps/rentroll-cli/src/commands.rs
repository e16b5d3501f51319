//! Command implementations shared by the binary and its tests

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lease_engine::{EngineConfig, LeaseEngine};
use tracing::{info, warn};

use crate::loader::{self, RemediationFiles};
use crate::reporter::{OutputFormat, Report, Reporter};

/// Finding counts that decide the exit status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub findings: usize,
    pub critical: usize,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        if self.critical > 0 {
            1
        } else {
            0
        }
    }
}

pub struct Runner {
    engine: LeaseEngine,
    reporter: Reporter,
    output: Option<PathBuf>,
}

impl Runner {
    pub fn new(config: EngineConfig, format: OutputFormat, output: Option<PathBuf>) -> Self {
        Self {
            engine: LeaseEngine::new(config),
            reporter: Reporter::new(format),
            output,
        }
    }

    /// Flag first, then the configured date, then today
    pub fn as_of(&self, flag: Option<NaiveDate>) -> NaiveDate {
        flag.or(self.engine.config().integrity.as_of)
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    fn emit(&self, report: Report<'_>) -> Result<()> {
        match &self.output {
            Some(path) => self
                .reporter
                .write_to_file(report, path)
                .with_context(|| format!("Failed to write report {}", path.display())),
            None => self.reporter.report(report),
        }
    }

    /// Rent roll plus the integrity checks for the same date
    pub fn rent_roll(&self, ledger: &Path, as_of: NaiveDate) -> Result<Outcome> {
        let ledger = loader::load_ledger(ledger)?;
        let roll = self.engine.rent_roll(&ledger, as_of);
        let integrity = self.engine.validate(&ledger, as_of);
        self.emit(Report::RentRoll {
            roll: &roll,
            integrity: &integrity,
        })?;
        Ok(Outcome {
            findings: roll.findings.len() + integrity.total_violations(),
            critical: roll.critical_count() + integrity.critical_count(),
        })
    }

    pub fn absorption(
        &self,
        ledger: &Path,
        from: NaiveDate,
        to: NaiveDate,
        as_of: NaiveDate,
    ) -> Result<Outcome> {
        let ledger = loader::load_ledger(ledger)?;
        let absorption = self.engine.absorption(&ledger, from, to)?;
        let integrity = self.engine.validate(&ledger, as_of);
        self.emit(Report::Absorption {
            absorption: &absorption,
            integrity: &integrity,
        })?;
        Ok(Outcome {
            findings: integrity.total_violations() + absorption.findings.len(),
            critical: integrity.critical_count() + ledger_types::critical_count(&absorption.findings),
        })
    }

    pub fn validate(&self, ledger: &Path, as_of: NaiveDate) -> Result<Outcome> {
        let ledger = loader::load_ledger(ledger)?;
        let integrity = self.engine.validate(&ledger, as_of);
        self.emit(Report::Integrity(&integrity))?;
        Ok(Outcome {
            findings: integrity.total_violations(),
            critical: integrity.critical_count(),
        })
    }

    /// Write the next ledger version, its audit chain and archived charges
    ///
    /// Counts reflect the remediated ledger, so a run that repaired
    /// everything exits cleanly.
    pub fn remediate(&self, ledger: &Path, as_of: NaiveDate, out_dir: &Path) -> Result<Outcome> {
        let ledger = loader::load_ledger(ledger)?;
        let outcome = self.engine.remediate(&ledger, as_of)?;
        let files = RemediationFiles::in_dir(out_dir, outcome.ledger.version());
        files.write(&outcome.ledger, &outcome.audit, &outcome.archived_charges)?;
        info!(
            ledger = %files.ledger.display(),
            audit = %files.audit.display(),
            "remediated ledger written"
        );
        if !outcome.skipped.is_empty() {
            warn!(skipped = outcome.skipped.len(), "some problems need a manual decision");
        }

        let integrity = self.engine.validate(&outcome.ledger, as_of);
        let summary = outcome.summary();
        self.emit(Report::Remediation {
            summary: &summary,
            integrity: &integrity,
        })?;
        Ok(Outcome {
            findings: integrity.total_violations(),
            critical: integrity.critical_count(),
        })
    }

    pub fn revert(&self, ledger: &Path, audit: &Path, out: &Path) -> Result<Outcome> {
        let remediated = loader::load_ledger(ledger)?;
        let audit = loader::load_audit(audit)?;
        let restored = self
            .engine
            .revert(&remediated, &audit)
            .context("Audit chain does not reproduce its base ledger")?;
        loader::write_ledger(out, &restored)?;
        info!(version = restored.version(), path = %out.display(), "prior ledger restored");
        Ok(Outcome::default())
    }

    /// The series stays a plain list; integrity at `to` only feeds the exit status
    pub fn trend(&self, ledger: &Path, from: NaiveDate, to: NaiveDate) -> Result<Outcome> {
        let ledger = loader::load_ledger(ledger)?;
        let points = self.engine.trend(&ledger, from, to)?;
        let integrity = self.engine.validate(&ledger, to);
        if integrity.critical_count() > 0 {
            warn!(
                as_of = %to,
                critical = integrity.critical_count(),
                "ledger fails integrity checks"
            );
        }
        self.emit(Report::Trend(&points))?;
        Ok(Outcome {
            findings: points.iter().map(|p| p.finding_count).sum::<usize>()
                + integrity.total_violations(),
            critical: points.iter().map(|p| p.critical_count).sum::<usize>()
                + integrity.critical_count(),
        })
    }
}
