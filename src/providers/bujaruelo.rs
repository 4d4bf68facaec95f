//! Bujaruelo, priced through the hotelgest booking engine.
//!
//! The price task returns one object per room type with its free units and a
//! map of rates. A night renders as `"<units>x<occupancy>p"` per room with
//! free units, for example `"2x4p, 1x2p"`.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::as_count;
use crate::dates::iso;
use crate::fetch::{HttpClient, fetch_text};
use crate::report::Availability;

const PCODE: u32 = 278;

pub fn url_for(date: NaiveDate) -> Result<String> {
    let next = date.succ_opt().context("date has no successor")?;
    Ok(format!(
        "https://booking.hotelgest.com/v4/api/?task=price&pcode={PCODE}&fromDate={}&toDate={}&promocode=",
        iso(date),
        iso(next)
    ))
}

/// Reads `key` as a count; a missing key counts as zero.
fn count_field(object: &Map<String, Value>, key: &str) -> Result<i64> {
    match object.get(key) {
        None => Ok(0),
        Some(value) => as_count(value).with_context(|| format!("'{key}' is not a number: {value}")),
    }
}

/// Summarizes the rooms with free units. Only the first rate of each room is
/// consulted for its occupancy.
pub fn parse_bujaruelo(body: &str) -> Result<Availability> {
    let data: Value = serde_json::from_str(body).context("invalid price response")?;
    let rooms = data.as_object().context("expected an object of rooms")?;

    let mut summary = Vec::new();
    for room in rooms.values() {
        let Some(room) = room.as_object() else {
            continue;
        };

        let units = count_field(room, "availability")?;
        let occupancy = match room
            .get("rate")
            .and_then(Value::as_object)
            .and_then(|rates| rates.values().next())
        {
            Some(Value::Object(rate)) => count_field(rate, "occupancy")?,
            Some(other) => bail!("unexpected rate entry: {other}"),
            None => 0,
        };

        if units > 0 {
            summary.push(format!("{units}x{occupancy}p"));
        }
    }

    Ok(if summary.is_empty() {
        Availability::Count(0)
    } else {
        Availability::Text(summary.join(", "))
    })
}

#[tracing::instrument(skip(client))]
pub async fn fetch_bujaruelo<C: HttpClient>(client: &C, date: NaiveDate) -> Availability {
    info!("Fetching Bujaruelo");
    let body = match url_for(date) {
        Ok(url) => fetch_text(client, &url).await,
        Err(e) => Err(e),
    };

    match body.and_then(|body| parse_bujaruelo(&body)) {
        Ok(cell) => cell,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Bujaruelo fetch failed");
            Availability::Error
        }
    }
}
