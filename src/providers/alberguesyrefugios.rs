//! Pineta and Góriz, both served by the alberguesyrefugios.com API.
//!
//! `getPlazas2` returns every room of a refuge with a per-date bed count:
//!
//! ```json
//! {"result": {"12": {"nombre": "Habitación", "plazas": {"2026-07-27": {"plazas": 5}}}}}
//! ```
//!
//! PHP serializes empty maps as `[]`, so both levels accept an empty array.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{error, info};

use super::as_count;
use crate::fetch::{HttpClient, fetch_text};

pub const PINETA_URL: &str = "https://api.alberguesyrefugios.com/refugios/get/7/getPlazas2/";
pub const GORIZ_URL: &str = "https://api.alberguesyrefugios.com/refugios/get/5/getPlazas2/";

/// Góriz splits its beds between the refuge building and the campsite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GorizBeds {
    pub refugio: i64,
    pub acampada: i64,
}

#[derive(Debug, Deserialize)]
struct PlazasResponse {
    #[serde(default, deserialize_with = "map_or_empty")]
    result: BTreeMap<String, Room>,
}

#[derive(Debug, Deserialize)]
struct Room {
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default, deserialize_with = "map_or_empty")]
    plazas: BTreeMap<String, DayPlazas>,
}

/// `plazas` must be present; it may be null.
#[derive(Debug, Deserialize)]
struct DayPlazas {
    plazas: Value,
}

fn map_or_empty<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MapOrSeq<T> {
        Map(BTreeMap<String, T>),
        Seq(Vec<serde::de::IgnoredAny>),
    }

    Ok(match MapOrSeq::deserialize(deserializer)? {
        MapOrSeq::Map(map) => map,
        MapOrSeq::Seq(_) => BTreeMap::new(),
    })
}

/// One `(room, date, beds)` triple. Null bed counts are skipped.
struct RoomCount {
    room: String,
    date: String,
    beds: i64,
}

fn room_counts(body: &str) -> Result<Vec<RoomCount>> {
    let response: PlazasResponse =
        serde_json::from_str(body).context("invalid getPlazas2 response")?;

    let mut counts = Vec::new();
    for (room_id, room) in response.result {
        let name = room.nombre.unwrap_or_default();
        for (date, day) in room.plazas {
            if day.plazas.is_null() {
                continue;
            }
            let beds = as_count(&day.plazas).with_context(|| {
                format!("room {room_id} has a non-numeric bed count on {date}")
            })?;
            counts.push(RoomCount {
                room: name.clone(),
                date,
                beds,
            });
        }
    }
    Ok(counts)
}

/// Total beds per date across all rooms.
pub fn parse_pineta(body: &str) -> Result<BTreeMap<String, i64>> {
    let mut map = BTreeMap::new();
    for count in room_counts(body)? {
        *map.entry(count.date).or_insert(0) += count.beds;
    }
    Ok(map)
}

/// Beds per date, split by whether the room name mentions "acampada".
pub fn parse_goriz(body: &str) -> Result<BTreeMap<String, GorizBeds>> {
    let mut map: BTreeMap<String, GorizBeds> = BTreeMap::new();
    for count in room_counts(body)? {
        let entry = map.entry(count.date).or_default();
        if count.room.to_lowercase().contains("acampada") {
            entry.acampada += count.beds;
        } else {
            entry.refugio += count.beds;
        }
    }
    Ok(map)
}

#[tracing::instrument(skip(client))]
pub async fn fetch_pineta<C: HttpClient>(client: &C) -> BTreeMap<String, i64> {
    info!("Fetching Pineta");
    match fetch_text(client, PINETA_URL)
        .await
        .and_then(|body| parse_pineta(&body))
    {
        Ok(map) => {
            info!(dates = map.len(), "Pineta availability loaded");
            map
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Pineta fetch failed");
            BTreeMap::new()
        }
    }
}

#[tracing::instrument(skip(client))]
pub async fn fetch_goriz<C: HttpClient>(client: &C) -> BTreeMap<String, GorizBeds> {
    info!("Fetching Góriz");
    match fetch_text(client, GORIZ_URL)
        .await
        .and_then(|body| parse_goriz(&body))
    {
        Ok(map) => {
            info!(dates = map.len(), "Góriz availability loaded");
            map
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Góriz fetch failed");
            BTreeMap::new()
        }
    }
}
