use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use tracing::{debug, info};

use crate::report::Report;

/// Writes the report table as CSV, header first, replacing any existing file.
pub fn write_csv(path: &str, report: &Report) -> Result<()> {
    debug!(path, "Writing CSV report");
    let file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(report.header())?;
    for row in &report.rows {
        writer.write_record(row.fields())?;
    }
    writer.flush()?;

    info!(path, rows = report.rows.len(), "CSV report saved");
    Ok(())
}
