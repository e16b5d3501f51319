//! File I/O at the CLI boundary
//!
//! The engine never touches the filesystem; everything it reads or writes
//! passes through here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lease_engine::{EngineConfig, Ledger};
use ledger_types::{AuditChain, ChargeLine};
use tracing::{debug, info};

pub fn load_ledger(path: &Path) -> Result<Ledger> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read ledger {}", path.display()))?;
    let ledger = Ledger::from_json(&json)
        .with_context(|| format!("Invalid ledger {}", path.display()))?;
    info!(
        path = %path.display(),
        version = ledger.version(),
        amendments = ledger.amendments().len(),
        charges = ledger.charges().len(),
        properties = ledger.properties().len(),
        "ledger loaded"
    );
    Ok(ledger)
}

/// Defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            EngineConfig::from_file(path)
                .with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

pub fn load_audit(path: &Path) -> Result<AuditChain> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read audit chain {}", path.display()))?;
    AuditChain::from_json(&json).with_context(|| format!("Invalid audit chain {}", path.display()))
}

pub fn write_ledger(path: &Path, ledger: &Ledger) -> Result<()> {
    fs::write(path, ledger.to_json()?)
        .with_context(|| format!("Failed to write ledger {}", path.display()))
}

/// Files written by one remediation run
#[derive(Debug, Clone)]
pub struct RemediationFiles {
    pub ledger: PathBuf,
    pub audit: PathBuf,
    pub archived_charges: PathBuf,
}

impl RemediationFiles {
    pub fn in_dir(dir: &Path, version: u32) -> Self {
        Self {
            ledger: dir.join(format!("ledger-v{version}.json")),
            audit: dir.join(format!("audit-v{version}.json")),
            archived_charges: dir.join(format!("archived-charges-v{version}.json")),
        }
    }

    pub fn write(&self, ledger: &Ledger, audit: &AuditChain, archived: &[ChargeLine]) -> Result<()> {
        if let Some(dir) = self.ledger.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        write_ledger(&self.ledger, ledger)?;
        fs::write(&self.audit, audit.to_json()?)
            .with_context(|| format!("Failed to write audit chain {}", self.audit.display()))?;
        fs::write(&self.archived_charges, serde_json::to_string_pretty(archived)?)
            .with_context(|| {
                format!("Failed to write archived charges {}", self.archived_charges.display())
            })?;
        Ok(())
    }
}
