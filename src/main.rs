//! CLI entry point: checks refuge availability along La Alta Ruta de los
//! Perdidos and writes the markdown, PDF and optional CSV reports.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Parser;
use refugi_check::{
    dates::{DEFAULT_END, DEFAULT_START},
    fetch::BasicClient,
    output::{render_markdown, write_csv, write_markdown, write_pdf},
    report::{Settings, collect},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "refugi_check")]
#[command(about = "Checks mountain refuge availability for a range of nights", long_about = None)]
struct Cli {
    /// First night to check (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_START)]
    start: NaiveDate,

    /// Last night to check, included (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_END)]
    end: NaiveDate,

    /// Markdown report path
    #[arg(short, long, default_value = "availability.md")]
    markdown: String,

    /// PDF report path
    #[arg(short, long, default_value = "availability.pdf")]
    pdf: String,

    /// Optional: also write the table as CSV
    #[arg(long)]
    csv: Option<String>,

    /// Add a Bujaruelo column (one extra request per night)
    #[arg(long, default_value_t = false)]
    bujaruelo: bool,
}

/// Builds a filter from directives such as `RUST_LOG` would hold, falling
/// back to `default` when none are given.
fn filter_from(directives: Option<String>, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .parse_lossy(directives.unwrap_or_default())
}

fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    filter_from(std::env::var(var).ok(), default)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/refugi_check.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("refugi_check.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    if cli.start > cli.end {
        bail!("--start {} is after --end {}", cli.start, cli.end);
    }

    let settings = Settings {
        start: cli.start,
        end: cli.end,
        bujaruelo: cli.bujaruelo,
    };
    info!(start = %settings.start, end = %settings.end, bujaruelo = settings.bujaruelo, "Starting availability check");

    let client = BasicClient::new()?;
    let report = collect(&client, &settings).await;

    println!("{}", render_markdown(&report));

    write_markdown(&cli.markdown, &report)?;
    write_pdf(&cli.pdf, &report)?;
    if let Some(path) = &cli.csv {
        write_csv(path, &report)?;
    }

    info!(rows = report.rows.len(), "Availability check finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_defaults_when_unset() {
        let filter = filter_from(None, LevelFilter::INFO);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_filter_honours_lower_level() {
        let filter = filter_from(Some("debug".into()), LevelFilter::INFO);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_filter_honours_higher_level() {
        let filter = filter_from(Some("warn".into()), LevelFilter::DEBUG);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }
}
