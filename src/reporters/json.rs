//! JSON reporter
//!
//! Outputs the full VibesReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::correlate::VibesReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &VibesReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render report as compact JSON (single line)
#[allow(dead_code)] // Public API helper
pub fn render_compact(report: &VibesReport) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}
