//! JSON reporter

use anyhow::Result;

use super::Report;

pub struct JsonReporter;

impl JsonReporter {
    /// Serialize a report, one trailing newline either way
    pub fn format(report: Report<'_>, pretty: bool) -> Result<String> {
        let mut output = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        output.push('\n');
        Ok(output)
    }
}
