//! Markdown reporter

use std::fmt::Write;

use anyhow::Result;
use lease_engine::remediation::RemediationSummary;
use lease_engine::{AbsorptionReport, IntegrityReport, RentRoll, TrendPoint};
use ledger_types::Finding;

use super::{area, money, months, Report};

pub struct MarkdownReporter;

impl MarkdownReporter {
    pub fn format(report: Report<'_>) -> Result<String> {
        let mut output = String::new();
        match report {
            Report::RentRoll { roll, integrity } => {
                Self::format_rent_roll(&mut output, roll)?;
                writeln!(output)?;
                Self::format_integrity(&mut output, integrity, "##")?;
            }
            Report::Absorption {
                absorption,
                integrity,
            } => {
                Self::format_absorption(&mut output, absorption)?;
                writeln!(output)?;
                Self::format_integrity(&mut output, integrity, "##")?;
            }
            Report::Integrity(integrity) => Self::format_integrity(&mut output, integrity, "#")?,
            Report::Trend(points) => Self::format_trend(&mut output, points)?,
            Report::Remediation { summary, integrity } => {
                Self::format_remediation(&mut output, summary)?;
                writeln!(output)?;
                Self::format_integrity(&mut output, integrity, "##")?;
            }
        }
        Ok(output)
    }

    fn format_rent_roll(output: &mut String, roll: &RentRoll) -> Result<()> {
        writeln!(output, "# Rent Roll")?;
        writeln!(output)?;
        writeln!(output, "**As of:** {}  ", roll.as_of)?;
        writeln!(output, "**Ledger version:** {}", roll.ledger_version)?;
        writeln!(output)?;
        writeln!(
            output,
            "| Property | Tenant | Seq | Area (SF) | Monthly Rent | Annual Rent | PSF | Term | Remaining |"
        )?;
        writeln!(output, "|---|---|---:|---:|---:|---:|---:|---:|---:|")?;
        for lease in &roll.leases {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
                lease.property_code,
                lease.tenant_name.as_deref().unwrap_or(&lease.tenant_id),
                lease.sequence,
                area(lease.leased_area),
                money(lease.monthly_rent),
                money(lease.annual_rent),
                money(lease.rent_psf),
                months(lease.lease_term_months),
                months(lease.remaining_term_months),
            )?;
        }
        writeln!(output)?;

        let totals = &roll.totals;
        writeln!(output, "## Totals")?;
        writeln!(output)?;
        writeln!(output, "| Metric | Value |")?;
        writeln!(output, "|---|---:|")?;
        writeln!(output, "| Leases | {} |", totals.lease_count)?;
        writeln!(output, "| Leased area (SF) | {} |", area(totals.leased_area))?;
        writeln!(output, "| Monthly rent | {} |", money(totals.monthly_rent))?;
        writeln!(output, "| Other charges | {} |", money(totals.monthly_other_charges))?;
        writeln!(output, "| Orphaned charges | {} |", money(totals.orphaned_amount))?;

        Self::format_findings(output, &roll.findings)?;
        Ok(())
    }

    fn format_absorption(output: &mut String, report: &AbsorptionReport) -> Result<()> {
        writeln!(output, "# Absorption {} to {}", report.from, report.to)?;
        writeln!(output)?;
        writeln!(output, "| Movement | Property | Tenant | Suite | Date | Area (SF) |")?;
        writeln!(output, "|---|---|---|---|---|---:|")?;
        let rows = report
            .commencements
            .iter()
            .map(|m| ("Commencement", m))
            .chain(report.expirations.iter().map(|m| ("Expiration", m)));
        for (label, movement) in rows {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} |",
                label,
                movement.property_code,
                movement.key.tenant_id,
                movement.suite.as_deref().unwrap_or("-"),
                movement.date,
                area(movement.area)
            )?;
        }
        writeln!(output)?;
        writeln!(output, "| Metric | SF |")?;
        writeln!(output, "|---|---:|")?;
        writeln!(output, "| Commenced | {} |", area(report.commencements_sf))?;
        writeln!(output, "| Expired | {} |", area(report.expirations_sf))?;
        writeln!(output, "| **Net absorption** | **{}** |", area(report.net_absorption))?;
        writeln!(output, "| Area adjustments | {} |", area(report.adjustments_sf))?;
        writeln!(output, "| Occupied at start | {} |", area(report.occupied_start))?;
        writeln!(output, "| Occupied at end | {} |", area(report.occupied_end))?;
        writeln!(output, "| Unexplained | {} |", area(report.unexplained_sf))?;

        if !report.tenant_changes.is_empty() {
            writeln!(output)?;
            writeln!(output, "## Tenant Changes")?;
            writeln!(output)?;
            for change in &report.tenant_changes {
                writeln!(
                    output,
                    "- {} suite {}: {} → {} ({})",
                    change.property_id,
                    change.suite,
                    change.outgoing_tenant,
                    change.incoming_tenant,
                    change.commenced_on
                )?;
            }
        }

        Self::format_findings(output, &report.findings)?;
        Ok(())
    }

    fn format_integrity(output: &mut String, report: &IntegrityReport, level: &str) -> Result<()> {
        writeln!(output, "{} Integrity as of {}", level, report.as_of)?;
        writeln!(output)?;
        writeln!(output, "| Check | Severity | Count | Amount | Samples |")?;
        writeln!(output, "|---|---|---:|---:|---|")?;
        for check in &report.checks {
            writeln!(
                output,
                "| {} | {:?} | {} | {} | {} |",
                check.kind,
                check.severity,
                check.count,
                check.amount.map(money).unwrap_or_default(),
                check.samples.join(", ")
            )?;
        }
        writeln!(output)?;
        writeln!(
            output,
            "**Critical violations:** {}",
            report.critical_count()
        )?;
        Ok(())
    }

    fn format_trend(output: &mut String, points: &[TrendPoint]) -> Result<()> {
        writeln!(output, "# Occupancy Trend")?;
        writeln!(output)?;
        writeln!(output, "| Month End | Leases | Occupied SF | Monthly Rent | Findings | Critical |")?;
        writeln!(output, "|---|---:|---:|---:|---:|---:|")?;
        for point in points {
            writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} |",
                point.as_of,
                point.lease_count,
                area(point.occupied_sf),
                money(point.monthly_rent),
                point.finding_count,
                point.critical_count
            )?;
        }
        Ok(())
    }

    fn format_remediation(output: &mut String, summary: &RemediationSummary) -> Result<()> {
        writeln!(output, "# Remediation v{} → v{}", summary.base_version, summary.new_version)?;
        writeln!(output)?;
        writeln!(output, "- Superseded amendments: {}", summary.superseded)?;
        writeln!(output, "- Cleared end dates: {}", summary.cleared_end_dates)?;
        writeln!(output, "- Archived charges: {}", summary.archived_charges)?;
        writeln!(output, "- Skipped: {}", summary.skipped)?;
        Ok(())
    }

    fn format_findings(output: &mut String, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            return Ok(());
        }
        writeln!(output)?;
        writeln!(output, "## Findings")?;
        writeln!(output)?;
        for finding in findings {
            writeln!(output, "- **{:?}** `{}`: {}", finding.severity, finding.kind, finding.message)?;
        }
        Ok(())
    }
}
