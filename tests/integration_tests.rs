use async_trait::async_trait;
use chrono::NaiveDate;
use refugi_check::fetch::HttpClient;
use refugi_check::output::{render_markdown, write_csv, write_markdown, write_pdf};
use refugi_check::report::{Availability, Column, Settings, collect};
use std::sync::Mutex;

/// Answers from fixture files; anything without a route gets a 404.
#[derive(Default)]
struct FixtureClient {
    routes: Vec<(&'static str, &'static str)>,
    hits: Mutex<Vec<String>>,
}

impl FixtureClient {
    fn route(mut self, needle: &'static str, body: &'static str) -> Self {
        self.routes.push((needle, body));
        self
    }
}

#[async_trait]
impl HttpClient for FixtureClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let url = req.url().to_string();
        let form = req
            .body()
            .and_then(|b| b.as_bytes())
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        self.hits.lock().unwrap().push(url.clone());

        let response = match self
            .routes
            .iter()
            .find(|(needle, _)| url.contains(needle) || form.contains(needle))
        {
            Some((_, body)) => http::Response::builder().status(200).body(*body),
            None => http::Response::builder().status(404).body(""),
        };
        Ok(response.unwrap().into())
    }
}

/// Text drawn by `<hex> Tj` operators, in page order.
fn pdf_text(pdf: &[u8]) -> Vec<String> {
    let content = String::from_utf8_lossy(pdf);
    let mut shown = Vec::new();
    let mut rest: &str = &content;
    while let Some(end) = rest.find("> Tj") {
        if let Some(start) = rest[..end].rfind('<') {
            let bytes: Vec<u8> = rest[start + 1..end]
                .as_bytes()
                .chunks(2)
                .filter_map(|pair| std::str::from_utf8(pair).ok())
                .filter_map(|pair| u8::from_str_radix(pair, 16).ok())
                .collect();
            shown.push(String::from_utf8_lossy(&bytes).replace('\0', ""));
        }
        rest = &rest[end + 4..];
    }
    shown
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, d).unwrap()
}

fn all_providers() -> FixtureClient {
    FixtureClient::default()
        .route("/get/7/", include_str!("fixtures/pineta.json"))
        .route("/get/5/", include_str!("fixtures/goriz.json"))
        .route("101245", include_str!("fixtures/espuguettes.jsonp"))
        .route("BK_STRUCTURE%3A107", include_str!("fixtures/bayssellance.html"))
        .route("hotelgest", include_str!("fixtures/bujaruelo.json"))
}

fn settings(start: u32, end: u32, bujaruelo: bool) -> Settings {
    Settings {
        start: day(start),
        end: day(end),
        bujaruelo,
    }
}

#[tokio::test]
async fn test_full_pipeline() {
    let client = all_providers();
    let report = collect(&client, &settings(26, 28, false)).await;

    let md = render_markdown(&report);
    let expected = "# Informe de Disponibilitat\n\n\
| Data | Pineta | Góriz (Refugi) | Góriz (Acampada) | Espuguettes | Bayssellance | Serradets |\n\
|------|--------|----------------|------------------|-------------|--------------|-----------|\n\
| 2026-07-26 | 8 | 12 | 20 | 9 | 3 | N/A |\n\
| 2026-07-27 | 5 | 0 | 15 | 9 | 0 | N/A |\n\
| 2026-07-28 | 0 | N/A | N/A | 9 | N/A | N/A |\n";
    assert_eq!(md, expected);
}

#[tokio::test]
async fn test_one_row_per_date_in_order() {
    let client = all_providers();
    let report = collect(&client, &settings(26, 31, false)).await;

    let dates: Vec<_> = report.rows.iter().map(|r| r.date).collect();
    assert_eq!(dates, (26..=31).map(day).collect::<Vec<_>>());
    assert!(report.rows.iter().all(|r| r.cells.len() == report.columns.len()));
}

#[tokio::test]
async fn test_bulk_providers_fetched_once_per_day_providers_per_date() {
    let client = all_providers();
    collect(&client, &settings(26, 29, true)).await;

    let hits = client.hits.lock().unwrap();
    assert_eq!(hits.iter().filter(|u| u.contains("/get/7/")).count(), 1);
    assert_eq!(hits.iter().filter(|u| u.contains("/get/5/")).count(), 1);
    assert_eq!(hits.iter().filter(|u| u.contains("centrale.ffcam.fr")).count(), 2);
    assert_eq!(hits.iter().filter(|u| u.contains("101245")).count(), 4);
    assert_eq!(hits.iter().filter(|u| u.contains("hotelgest")).count(), 4);
}

#[tokio::test]
async fn test_bujaruelo_column() {
    let client = all_providers();
    let report = collect(&client, &settings(26, 26, true)).await;

    assert_eq!(report.columns.last(), Some(&Column::Bujaruelo));
    assert_eq!(
        report.rows[0].cells.last(),
        Some(&Availability::Text("2x4p, 1x2p".into()))
    );
}

#[tokio::test]
async fn test_every_provider_down_still_reports() {
    let client = FixtureClient::default();
    let report = collect(&client, &settings(26, 27, true)).await;

    assert_eq!(report.rows.len(), 2);
    for row in &report.rows {
        assert_eq!(
            row.fields()[1..],
            ["N/A", "N/A", "N/A", "Error", "N/A", "N/A", "Error"]
        );
    }
}

#[tokio::test]
async fn test_malformed_bodies_become_sentinels() {
    let client = FixtureClient::default()
        .route("/get/7/", "<html>503</html>")
        .route("/get/5/", "{\"result\": 42}")
        .route("101245", "jQuery1()")
        .route("BK_STRUCTURE%3A107", "BK.availability = {broken};");
    let report = collect(&client, &settings(26, 26, false)).await;

    assert_eq!(
        report.rows[0].fields(),
        ["2026-07-26", "N/A", "N/A", "N/A", "Error", "N/A", "N/A"]
    );
}

#[tokio::test]
async fn test_rerun_is_byte_identical() {
    let first = render_markdown(&collect(&all_providers(), &settings(26, 30, true)).await);
    let second = render_markdown(&collect(&all_providers(), &settings(26, 30, true)).await);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_outputs_share_rows() {
    let report = collect(&all_providers(), &settings(26, 28, false)).await;
    let dir = tempfile::tempdir().unwrap();

    let md_path = dir.path().join("availability.md");
    let pdf_path = dir.path().join("availability.pdf");
    let csv_path = dir.path().join("availability.csv");
    write_markdown(md_path.to_str().unwrap(), &report).unwrap();
    write_pdf(pdf_path.to_str().unwrap(), &report).unwrap();
    write_csv(csv_path.to_str().unwrap(), &report).unwrap();

    let md = std::fs::read_to_string(&md_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let md_rows: Vec<_> = md.lines().skip(4).collect();
    let csv_rows: Vec<_> = csv.lines().skip(1).collect();
    assert_eq!(md_rows.len(), csv_rows.len());
    for (md_row, csv_row) in md_rows.iter().zip(&csv_rows) {
        let md_cells: Vec<_> = md_row
            .trim_matches('|')
            .split('|')
            .map(str::trim)
            .collect();
        let csv_cells: Vec<_> = csv_row.split(',').collect();
        assert_eq!(md_cells, csv_cells);
    }

    let pdf = std::fs::read(&pdf_path).unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let shown = pdf_text(&pdf);
    let pdf_dates: Vec<&str> = shown
        .iter()
        .map(String::as_str)
        .filter(|t| t.parse::<NaiveDate>().is_ok())
        .collect();
    let md_dates: Vec<&str> = md_rows
        .iter()
        .map(|row| row.trim_matches('|').split('|').next().unwrap().trim())
        .collect();
    assert_eq!(pdf_dates, md_dates);

    let md_first: Vec<&str> = md_rows[0]
        .trim_matches('|')
        .split('|')
        .map(str::trim)
        .collect();
    let first_row = shown.iter().position(|t| t == "2026-07-26").unwrap();
    assert_eq!(shown[first_row..first_row + 7], md_first[..]);
}

#[tokio::test]
async fn test_pdf_spans_pages_one_row_per_date() {
    let client = all_providers();
    let report = collect(
        &client,
        &Settings {
            start: day(1),
            end: NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            bujaruelo: false,
        },
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.pdf");
    write_pdf(path.to_str().unwrap(), &report).unwrap();

    let shown = pdf_text(&std::fs::read(&path).unwrap());
    let dates: Vec<NaiveDate> = shown.iter().filter_map(|t| t.parse().ok()).collect();
    assert_eq!(dates.len(), 40);
    assert_eq!(dates, report.rows.iter().map(|r| r.date).collect::<Vec<_>>());
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(shown.iter().filter(|t| t.contains("gina ")).count(), 2);
}
