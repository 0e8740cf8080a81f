//! JSON reporter
//!
//! Outputs the full AuditReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::AuditReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &AuditReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
