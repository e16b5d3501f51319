//! Console reporter
//!
//! Plain ASCII tables with a status line per report.

use std::fmt::Write;

use anyhow::Result;
use lease_engine::remediation::RemediationSummary;
use lease_engine::{AbsorptionReport, IntegrityReport, RentRoll, TrendPoint};
use ledger_types::{Finding, Severity};
use rust_decimal::Decimal;

use super::{area, money, months, Report};

const RULE: &str = "────────────────────────────────────────────────────────────────────────────";

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(report: Report<'_>) -> Result<String> {
        let mut output = String::new();
        match report {
            Report::RentRoll { roll, integrity } => {
                Self::format_rent_roll(&mut output, roll)?;
                Self::format_integrity(&mut output, integrity)?;
            }
            Report::Absorption {
                absorption,
                integrity,
            } => {
                Self::format_absorption(&mut output, absorption)?;
                Self::format_integrity(&mut output, integrity)?;
            }
            Report::Integrity(integrity) => Self::format_integrity(&mut output, integrity)?,
            Report::Trend(points) => Self::format_trend(&mut output, points)?,
            Report::Remediation { summary, integrity } => {
                Self::format_remediation(&mut output, summary)?;
                Self::format_integrity(&mut output, integrity)?;
            }
        }
        Ok(output)
    }

    fn header(output: &mut String, title: &str) -> Result<()> {
        writeln!(output)?;
        writeln!(output, "{}", RULE)?;
        writeln!(output, "{}", title)?;
        writeln!(output, "{}", RULE)?;
        Ok(())
    }

    fn format_rent_roll(output: &mut String, roll: &RentRoll) -> Result<()> {
        Self::header(
            output,
            &format!("RENT ROLL as of {} (ledger v{})", roll.as_of, roll.ledger_version),
        )?;
        writeln!(
            output,
            "{:<10} {:<12} {:<20} {:>4} {:>10} {:>12} {:>12} {:>8} {:>6} {:>6}",
            "Property", "Tenant", "Name", "Seq", "Area", "Monthly", "Annual", "PSF", "Term", "Left"
        )?;
        for lease in &roll.leases {
            writeln!(
                output,
                "{:<10} {:<12} {:<20} {:>4} {:>10} {:>12} {:>12} {:>8} {:>6} {:>6}",
                lease.property_code,
                lease.tenant_id,
                lease.tenant_name.as_deref().unwrap_or("-"),
                lease.sequence,
                area(lease.leased_area),
                money(lease.monthly_rent),
                money(lease.annual_rent),
                money(lease.rent_psf),
                months(lease.lease_term_months),
                months(lease.remaining_term_months),
            )?;
        }

        let totals = &roll.totals;
        writeln!(output, "{}", RULE)?;
        writeln!(output, "Leases:           {}", totals.lease_count)?;
        writeln!(output, "Leased area:      {} SF", area(totals.leased_area))?;
        writeln!(output, "Monthly rent:     {}", money(totals.monthly_rent))?;
        writeln!(output, "Other charges:    {}", money(totals.monthly_other_charges))?;
        writeln!(output, "Annual rent:      {}", money(totals.annual_rent))?;
        writeln!(output, "Orphaned charges: {} ({} lines)", money(totals.orphaned_amount), roll.orphans.len())?;
        writeln!(output, "Excluded rows:    {}", roll.exclusions.len())?;

        Self::format_findings(output, &roll.findings)?;
        Ok(())
    }

    fn format_absorption(output: &mut String, report: &AbsorptionReport) -> Result<()> {
        Self::header(output, &format!("ABSORPTION {} .. {}", report.from, report.to))?;
        writeln!(output, "Same-store properties: {}", report.same_store.len())?;
        writeln!(output)?;

        writeln!(output, "Commencements ({}):", report.commencements.len())?;
        for movement in &report.commencements {
            writeln!(
                output,
                "  + {:<10} {:<12} {:<8} {} {:>10} SF",
                movement.property_code,
                movement.key.tenant_id,
                movement.suite.as_deref().unwrap_or("-"),
                movement.date,
                area(movement.area)
            )?;
        }
        writeln!(output, "Expirations ({}):", report.expirations.len())?;
        for movement in &report.expirations {
            writeln!(
                output,
                "  - {:<10} {:<12} {:<8} {} {:>10} SF",
                movement.property_code,
                movement.key.tenant_id,
                movement.suite.as_deref().unwrap_or("-"),
                movement.date,
                area(movement.area)
            )?;
        }
        if !report.tenant_changes.is_empty() {
            writeln!(output, "Tenant changes:")?;
            for change in &report.tenant_changes {
                writeln!(
                    output,
                    "  {} suite {}: {} -> {} ({} / {})",
                    change.property_id,
                    change.suite,
                    change.outgoing_tenant,
                    change.incoming_tenant,
                    change.vacated_on,
                    change.commenced_on
                )?;
            }
        }
        if !report.area_adjustments.is_empty() {
            writeln!(output, "Area adjustments:")?;
            for adjustment in &report.area_adjustments {
                writeln!(
                    output,
                    "  {} {} -> {} ({})",
                    adjustment.key,
                    area(adjustment.from_area),
                    area(adjustment.to_area),
                    signed(adjustment.delta)
                )?;
            }
        }

        writeln!(output)?;
        writeln!(output, "Commenced:        {} SF", area(report.commencements_sf))?;
        writeln!(output, "Expired:          {} SF", area(report.expirations_sf))?;
        writeln!(output, "Net absorption:   {} SF", area(report.net_absorption))?;
        writeln!(output, "Adjustments:      {} SF", area(report.adjustments_sf))?;
        writeln!(
            output,
            "Occupied:         {} SF -> {} SF",
            area(report.occupied_start),
            area(report.occupied_end)
        )?;
        let status = if report.is_consistent() { "✓ reconciled" } else { "✗ does not reconcile" };
        writeln!(output, "Unexplained:      {} SF {}", area(report.unexplained_sf), status)?;

        Self::format_findings(output, &report.findings)?;
        Ok(())
    }

    fn format_integrity(output: &mut String, report: &IntegrityReport) -> Result<()> {
        Self::header(
            output,
            &format!("INTEGRITY as of {} (ledger v{})", report.as_of, report.ledger_version),
        )?;
        for check in &report.checks {
            let symbol = if check.count == 0 { "✓" } else { "✗" };
            write!(
                output,
                "{} {:<20} {:<9} {:>5}",
                symbol,
                check.kind.as_str(),
                severity_label(check.severity),
                check.count
            )?;
            if let Some(amount) = check.amount {
                write!(output, "  amount {}", money(amount))?;
            }
            writeln!(output)?;
            if !check.samples.is_empty() {
                writeln!(output, "      e.g. {}", check.samples.join("; "))?;
            }
        }
        writeln!(output, "{}", RULE)?;
        let status = if report.critical_count() == 0 { "PASSED" } else { "FAILED" };
        writeln!(
            output,
            "Status: {} ({} violations, {} critical)",
            status,
            report.total_violations(),
            report.critical_count()
        )?;
        Ok(())
    }

    fn format_trend(output: &mut String, points: &[TrendPoint]) -> Result<()> {
        Self::header(output, "OCCUPANCY TREND")?;
        writeln!(
            output,
            "{:<12} {:>7} {:>12} {:>14} {:>12} {:>9} {:>9}",
            "Month end", "Leases", "Occupied SF", "Monthly rent", "Orphaned", "Findings", "Critical"
        )?;
        for point in points {
            writeln!(
                output,
                "{:<12} {:>7} {:>12} {:>14} {:>12} {:>9} {:>9}",
                point.as_of.to_string(),
                point.lease_count,
                area(point.occupied_sf),
                money(point.monthly_rent),
                money(point.orphaned_amount),
                point.finding_count,
                point.critical_count
            )?;
        }
        Ok(())
    }

    fn format_remediation(output: &mut String, summary: &RemediationSummary) -> Result<()> {
        Self::header(
            output,
            &format!("REMEDIATION v{} -> v{}", summary.base_version, summary.new_version),
        )?;
        writeln!(output, "Superseded amendments: {}", summary.superseded)?;
        writeln!(output, "Cleared end dates:     {}", summary.cleared_end_dates)?;
        writeln!(output, "Archived charges:      {}", summary.archived_charges)?;
        writeln!(output, "Skipped (undecidable): {}", summary.skipped)?;
        Ok(())
    }

    fn format_findings(output: &mut String, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            return Ok(());
        }
        writeln!(output)?;
        writeln!(output, "Findings ({}):", findings.len())?;
        for finding in findings {
            writeln!(
                output,
                "  [{}] {}: {}",
                severity_label(finding.severity),
                finding.kind,
                finding.message
            )?;
        }
        Ok(())
    }
}

fn signed(delta: Decimal) -> String {
    if delta.is_sign_positive() && !delta.is_zero() {
        format!("+{}", area(delta))
    } else {
        area(delta)
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "CRITICAL",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}
