//! Espuguettes, booked through the for-system "etape" REST endpoint.
//!
//! The endpoint has no bulk mode: it answers one night at a time and wraps
//! its JSON in a jQuery callback (`jQuery123({...})`).

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::dates::dmy;
use crate::fetch::{HttpClient, fetch_text};
use crate::report::Availability;

const PRODUCT_ID: u32 = 101245;

pub fn url_for(date: NaiveDate) -> String {
    format!(
        "https://etape-rest.for-system.com/index.aspx/index.aspx?ref=json-produit-refuge&q=es,{PRODUCT_ID},{},1",
        dmy(date)
    )
}

/// Extracts `refuge.nbPlacesDispos` from a JSONP body.
pub fn parse_espuguettes(body: &str) -> Result<Availability> {
    let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
        bail!("no JSON object in response");
    };
    if end < start {
        bail!("no JSON object in response");
    }

    let data: Value =
        serde_json::from_str(&body[start..=end]).context("invalid JSON inside callback")?;

    let places = data
        .get("refuge")
        .and_then(|refuge| refuge.get("nbPlacesDispos"))
        .context("missing refuge.nbPlacesDispos")?;

    Ok(Availability::from_json(places))
}

#[tracing::instrument(skip(client))]
pub async fn fetch_espuguettes<C: HttpClient>(client: &C, date: NaiveDate) -> Availability {
    info!("Fetching Espuguettes");
    match fetch_text(client, &url_for(date))
        .await
        .and_then(|body| parse_espuguettes(&body))
    {
        Ok(cell) => cell,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Espuguettes fetch failed");
            Availability::Error
        }
    }
}
