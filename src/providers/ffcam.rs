//! Bayssellance and Serradets, both on the FFCAM booking centre.
//!
//! The availability endpoint answers a form POST with a whole HTML page; the
//! data sits in an inline script as `BK.availability = {...};`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{error, info};

use crate::fetch::{HttpClient, WithHeaders, post_form};
use crate::report::Availability;

pub const FFCAM_URL: &str = "https://centrale.ffcam.fr/index.php?";
const ORIGIN: &str = "https://centrale.ffcam.fr";

static AVAILABILITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)BK\.availability\s*=\s*(\{.*?\});").expect("availability pattern is valid")
});

/// One FFCAM-managed refuge.
#[derive(Debug, Clone, Copy)]
pub struct Structure {
    pub name: &'static str,
    pub id: u32,
    pub referer: &'static str,
}

pub const BAYSSELLANCE: Structure = Structure {
    name: "Bayssellance",
    id: 107,
    referer: "https://centrale.ffcam.fr/index.php?structure=BK_STRUCTURE%3A107&mode=FORM&_lang=FR",
};

pub const SERRADETS: Structure = Structure {
    name: "Serradets",
    id: 112,
    referer: "https://centrale.ffcam.fr/index.php?structure=112&mode=FORM&_lang=FR",
};

/// Pulls the `BK.availability` object out of the page, keyed by ISO date.
pub fn parse_availability(body: &str) -> Result<BTreeMap<String, Availability>> {
    let captures = AVAILABILITY_RE
        .captures(body)
        .context("BK.availability not found in page")?;

    let raw: BTreeMap<String, Value> = serde_json::from_str(&captures[1])
        .context("BK.availability is not valid JSON")?;

    Ok(raw
        .into_iter()
        .map(|(date, value)| (date, Availability::from_json(&value)))
        .collect())
}

async fn request<C: HttpClient>(client: &C, structure: &Structure) -> Result<String> {
    let client = WithHeaders::new(
        client,
        &[("origin", ORIGIN), ("referer", structure.referer)],
    )?;
    let structure_id = format!("BK_STRUCTURE:{}", structure.id);

    post_form(
        &client,
        FFCAM_URL,
        &[
            ("action", "availability"),
            ("structure", structure_id.as_str()),
            ("productCategory", "BK_PRODUCTCATEGORY:NUITEE"),
            ("pax", "8"),
        ],
    )
    .await
}

#[tracing::instrument(skip(client, structure), fields(refuge = structure.name, id = structure.id))]
pub async fn fetch_structure<C: HttpClient>(
    client: &C,
    structure: &Structure,
) -> BTreeMap<String, Availability> {
    info!("Fetching FFCAM availability");
    match request(client, structure)
        .await
        .and_then(|body| parse_availability(&body))
    {
        Ok(map) => {
            info!(dates = map.len(), "FFCAM availability loaded");
            map
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "FFCAM fetch failed");
            BTreeMap::new()
        }
    }
}
