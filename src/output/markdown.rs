use anyhow::{Context, Result};
use std::fs;
use tracing::info;

use crate::report::Report;

const TITLE: &str = "# Informe de Disponibilitat";

fn table_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = String::from("|");
    for field in fields {
        line.push(' ');
        line.push_str(&field.as_ref().replace('|', "\\|"));
        line.push_str(" |");
    }
    line
}

/// Renders the report as a markdown document with a single table. Pipes
/// inside cells are escaped.
///
/// Output depends only on `report`, so identical data gives identical bytes.
pub fn render_markdown(report: &Report) -> String {
    let header = report.header();
    let separator: Vec<String> = header
        .iter()
        .map(|label| "-".repeat(label.chars().count() + 2))
        .collect();

    let mut out = format!("{TITLE}\n\n");
    out.push_str(&table_line(&header));
    out.push('\n');
    out.push('|');
    out.push_str(&separator.join("|"));
    out.push_str("|\n");

    for row in &report.rows {
        out.push_str(&table_line(&row.fields()));
        out.push('\n');
    }
    out
}

/// Writes [`render_markdown`] output to `path`, replacing any existing file.
pub fn write_markdown(path: &str, report: &Report) -> Result<()> {
    fs::write(path, render_markdown(report))
        .with_context(|| format!("failed to write markdown report to '{path}'"))?;
    info!(path, rows = report.rows.len(), "Markdown report saved");
    Ok(())
}
