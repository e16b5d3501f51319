//! Engine configuration
//!
//! Loaded from TOML; every section and field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! [charges]
//! rent_codes = ["rent", "base rent"]
//!
//! [integrity]
//! as_of = "2025-06-30"
//! sample_size = 5
//! critical = ["duplicate_current", "invalid_date_range"]
//!
//! [absorption]
//! tolerance_sf = "0.5"
//!
//! [remediation]
//! archive_orphan_charges = false
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use ledger_types::{AmendmentType, Finding, FindingKind, Severity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub charges: ChargeConfig,
    #[serde(default)]
    pub integrity: IntegrityConfig,
    #[serde(default)]
    pub absorption: AbsorptionConfig,
    #[serde(default)]
    pub remediation: RemediationPolicy,
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        content.parse()
    }

    /// Re-grade findings against the configured critical set
    pub fn grade(&self, findings: &mut [Finding]) {
        for finding in findings.iter_mut() {
            finding.severity = self.integrity.severity_for(finding.kind);
        }
    }
}

impl FromStr for EngineConfig {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeConfig {
    /// Charge codes summed into monthly rent (case-insensitive)
    #[serde(default = "default_rent_codes")]
    pub rent_codes: Vec<String>,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            rent_codes: default_rent_codes(),
        }
    }
}

fn default_rent_codes() -> Vec<String> {
    vec!["rent".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityConfig {
    /// Reference date for checks that need one; callers fall back to today
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Offending keys listed per check
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    /// Finding kinds that fail a run
    #[serde(default = "default_critical")]
    pub critical: Vec<FindingKind>,
}

impl IntegrityConfig {
    pub fn severity_for(&self, kind: FindingKind) -> Severity {
        if self.critical.contains(&kind) {
            return Severity::Critical;
        }
        match kind.default_severity() {
            Severity::Critical => Severity::Warning,
            other => other,
        }
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            as_of: None,
            sample_size: default_sample_size(),
            critical: default_critical(),
        }
    }
}

fn default_sample_size() -> usize {
    10
}

fn default_critical() -> Vec<FindingKind> {
    FindingKind::ALL
        .into_iter()
        .filter(|kind| kind.default_severity() == Severity::Critical)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbsorptionConfig {
    /// Largest unexplained movement (SF) still considered consistent
    #[serde(default = "default_tolerance")]
    pub tolerance_sf: Decimal,
    /// Amendment types that open a new occupancy
    #[serde(default = "default_commencement_types")]
    pub commencement_types: Vec<AmendmentType>,
}

impl Default for AbsorptionConfig {
    fn default() -> Self {
        Self {
            tolerance_sf: default_tolerance(),
            commencement_types: default_commencement_types(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_commencement_types() -> Vec<AmendmentType> {
    vec![AmendmentType::OriginalLease, AmendmentType::NewLease]
}

/// Which repairs a remediation batch may apply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemediationPolicy {
    #[serde(default = "enabled")]
    pub supersede_duplicates: bool,
    #[serde(default = "enabled")]
    pub clear_invalid_end_dates: bool,
    #[serde(default = "enabled")]
    pub archive_orphan_charges: bool,
    #[serde(default = "default_actor")]
    pub actor: String,
}

impl Default for RemediationPolicy {
    fn default() -> Self {
        Self {
            supersede_duplicates: true,
            clear_invalid_end_dates: true,
            archive_orphan_charges: true,
            actor: default_actor(),
        }
    }
}

fn enabled() -> bool {
    true
}

fn default_actor() -> String {
    "ledger-remediation".to_string()
}
