//! Per-date aggregation of every provider into report rows.
//!
//! Bulk providers are fetched once; per-day providers are fetched while the
//! rows are assembled. A row always has one cell per column, in
//! [`Column`] order, whatever the providers returned.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::dates::{date_range, iso};
use crate::fetch::HttpClient;
use crate::providers::{
    BAYSSELLANCE, GorizBeds, SERRADETS, fetch_bujaruelo, fetch_espuguettes, fetch_goriz,
    fetch_pineta, fetch_structure,
};

/// Label of the leading date column.
pub const DATE_LABEL: &str = "Data";

/// One report cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Count(i64),
    Text(String),
    /// No data for this date. Rendered as `N/A`.
    NotAvailable,
    /// The provider could not be queried. Rendered as `Error`.
    Error,
}

impl Availability {
    /// Normalizes a raw JSON value. Nulls and blank strings mean no data.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Availability::NotAvailable,
            Value::Number(n) => n
                .as_i64()
                .map(Availability::Count)
                .unwrap_or_else(|| Availability::Text(n.to_string())),
            Value::String(s) if s.trim().is_empty() => Availability::NotAvailable,
            Value::String(s) => Availability::Text(s.clone()),
            other => Availability::Text(other.to_string()),
        }
    }

    fn normalized(self) -> Self {
        match self {
            Availability::Text(s) if s.trim().is_empty() => Availability::NotAvailable,
            other => other,
        }
    }
}

impl From<i64> for Availability {
    fn from(count: i64) -> Self {
        Availability::Count(count)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Availability::Count(n) => write!(f, "{n}"),
            Availability::Text(s) => f.write_str(s),
            Availability::NotAvailable => f.write_str("N/A"),
            Availability::Error => f.write_str("Error"),
        }
    }
}

/// Provider columns, declared in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Pineta,
    GorizRefugi,
    GorizAcampada,
    Espuguettes,
    Bayssellance,
    Serradets,
    Bujaruelo,
}

impl Column {
    /// The columns of a run; Bujaruelo is opt-in.
    pub fn enabled(with_bujaruelo: bool) -> Vec<Column> {
        let mut columns = vec![
            Column::Pineta,
            Column::GorizRefugi,
            Column::GorizAcampada,
            Column::Espuguettes,
            Column::Bayssellance,
            Column::Serradets,
        ];
        if with_bujaruelo {
            columns.push(Column::Bujaruelo);
        }
        columns
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Pineta => "Pineta",
            Column::GorizRefugi => "Góriz (Refugi)",
            Column::GorizAcampada => "Góriz (Acampada)",
            Column::Espuguettes => "Espuguettes",
            Column::Bayssellance => "Bayssellance",
            Column::Serradets => "Serradets",
            Column::Bujaruelo => "Bujaruelo",
        }
    }

    /// Label used where horizontal space is tight (PDF header).
    pub fn short_label(self) -> &'static str {
        match self {
            Column::GorizRefugi => "Góriz (Ref)",
            Column::GorizAcampada => "Góriz (Acam)",
            other => other.label(),
        }
    }
}

/// One date and one cell per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub date: NaiveDate,
    pub cells: Vec<Availability>,
}

impl Row {
    /// The date followed by every cell, as rendered text.
    pub fn fields(&self) -> Vec<String> {
        std::iter::once(iso(self.date))
            .chain(self.cells.iter().map(ToString::to_string))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Report {
    pub fn header(&self) -> Vec<&'static str> {
        std::iter::once(DATE_LABEL)
            .chain(self.columns.iter().map(|c| c.label()))
            .collect()
    }

    pub fn short_header(&self) -> Vec<&'static str> {
        std::iter::once(DATE_LABEL)
            .chain(self.columns.iter().map(|c| c.short_label()))
            .collect()
    }
}

/// Everything the bulk providers returned, keyed by ISO date.
#[derive(Debug, Default, Clone)]
pub struct BulkData {
    pub pineta: BTreeMap<String, i64>,
    pub goriz: BTreeMap<String, GorizBeds>,
    pub bayssellance: BTreeMap<String, Availability>,
    pub serradets: BTreeMap<String, Availability>,
}

impl BulkData {
    pub async fn fetch<C: HttpClient>(client: &C) -> Self {
        Self {
            pineta: fetch_pineta(client).await,
            goriz: fetch_goriz(client).await,
            bayssellance: fetch_structure(client, &BAYSSELLANCE).await,
            serradets: fetch_structure(client, &SERRADETS).await,
        }
    }
}

/// Per-day provider results for one date. `None` means not queried.
#[derive(Debug, Default, Clone)]
pub struct DailyData {
    pub espuguettes: Option<Availability>,
    pub bujaruelo: Option<Availability>,
}

impl DailyData {
    /// Queries the per-day providers that have a column in `columns`.
    pub async fn fetch<C: HttpClient>(client: &C, date: NaiveDate, columns: &[Column]) -> Self {
        let mut daily = DailyData::default();
        if columns.contains(&Column::Espuguettes) {
            daily.espuguettes = Some(fetch_espuguettes(client, date).await);
        }
        if columns.contains(&Column::Bujaruelo) {
            daily.bujaruelo = Some(fetch_bujaruelo(client, date).await);
        }
        daily
    }
}

fn lookup<T>(map: &BTreeMap<String, T>, key: &str) -> Availability
where
    T: Clone + Into<Availability>,
{
    map.get(key)
        .cloned()
        .map(Into::into)
        .map(Availability::normalized)
        .unwrap_or(Availability::NotAvailable)
}

/// Assembles the row for `date`. Missing data becomes [`Availability::NotAvailable`].
pub fn build_row(date: NaiveDate, columns: &[Column], bulk: &BulkData, daily: &DailyData) -> Row {
    let key = iso(date);
    let goriz = bulk.goriz.get(&key);

    let cells = columns
        .iter()
        .map(|column| match column {
            Column::Pineta => lookup(&bulk.pineta, &key),
            Column::GorizRefugi => goriz
                .map(|beds| Availability::Count(beds.refugio))
                .unwrap_or(Availability::NotAvailable),
            Column::GorizAcampada => goriz
                .map(|beds| Availability::Count(beds.acampada))
                .unwrap_or(Availability::NotAvailable),
            Column::Espuguettes => daily
                .espuguettes
                .clone()
                .map(Availability::normalized)
                .unwrap_or(Availability::NotAvailable),
            Column::Bayssellance => lookup(&bulk.bayssellance, &key),
            Column::Serradets => lookup(&bulk.serradets, &key),
            Column::Bujaruelo => daily
                .bujaruelo
                .clone()
                .map(Availability::normalized)
                .unwrap_or(Availability::NotAvailable),
        })
        .collect();

    Row { date, cells }
}

/// What a run checks.
#[derive(Debug, Clone)]
pub struct Settings {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bujaruelo: bool,
}

/// Runs every provider for the configured window, strictly one request at a
/// time, and returns the finished report.
#[tracing::instrument(skip(client))]
pub async fn collect<C: HttpClient>(client: &C, settings: &Settings) -> Report {
    let columns = Column::enabled(settings.bujaruelo);
    let bulk = BulkData::fetch(client).await;

    let mut rows = Vec::new();
    for date in date_range(settings.start, settings.end) {
        let daily = DailyData::fetch(client, date, &columns).await;
        rows.push(build_row(date, &columns, &bulk, &daily));
        info!(date = %date, "Date processed");
    }

    Report { columns, rows }
}
