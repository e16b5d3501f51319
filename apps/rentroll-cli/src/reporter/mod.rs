//! Report output
//!
//! Every command result goes through one [`Reporter`], which renders it as
//! console text, JSON or Markdown and writes it to stdout or a file.
//!
//! # Output Formats
//!
//! - **JSON**: Machine-readable format for downstream tooling
//! - **Console**: Human-readable tables
//! - **Markdown**: Documentation-friendly format for reports

mod console;
mod json;
mod markdown;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use lease_engine::remediation::RemediationSummary;
use lease_engine::{AbsorptionReport, IntegrityReport, RentRoll, TrendPoint};
use rust_decimal::Decimal;
use serde::Serialize;

pub use console::ConsoleReporter;
pub use json::JsonReporter;
pub use markdown::MarkdownReporter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console tables
    #[default]
    Console,
    /// Markdown format for documentation
    Markdown,
}

/// One command result, borrowed for rendering
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Report<'a> {
    RentRoll {
        roll: &'a RentRoll,
        integrity: &'a IntegrityReport,
    },
    Absorption {
        absorption: &'a AbsorptionReport,
        integrity: &'a IntegrityReport,
    },
    Integrity(&'a IntegrityReport),
    Trend(&'a [TrendPoint]),
    Remediation {
        summary: &'a RemediationSummary,
        integrity: &'a IntegrityReport,
    },
}

pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report to stdout
    pub fn report(&self, report: Report<'_>) -> Result<()> {
        let output = self.format_report(report)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, report: Report<'_>, path: P) -> Result<()> {
        let output = self.format_report(report)?;
        fs::write(path, output)?;
        Ok(())
    }

    pub fn format_report(&self, report: Report<'_>) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
            OutputFormat::Markdown => MarkdownReporter::format(report),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

/// Two decimal places, for money and PSF columns
fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn area(value: Decimal) -> String {
    value.normalize().to_string()
}

fn months(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |m| m.to_string())
}
