use crate::report::RunReport;
use std::path::Path;

pub fn write_json(report: &RunReport, out: &Path) -> anyhow::Result<()> {
    std::fs::write(out, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

pub fn read_json(path: &Path) -> anyhow::Result<RunReport> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
