//! One fetcher per refuge booking backend.
//!
//! Each backend gets a pure `parse_*` function over the raw response body and
//! an async `fetch_*` wrapper that performs the request. The wrappers never
//! fail: transport and parse errors are logged and turned into an empty map
//! or an [`Availability::Error`](crate::report::Availability::Error) cell.

pub mod alberguesyrefugios;
pub mod bujaruelo;
pub mod espuguettes;
pub mod ffcam;

pub use alberguesyrefugios::{GorizBeds, fetch_goriz, fetch_pineta};
pub use bujaruelo::fetch_bujaruelo;
pub use espuguettes::fetch_espuguettes;
pub use ffcam::{BAYSSELLANCE, SERRADETS, Structure, fetch_structure};

use serde_json::Value;

/// Reads a count that may arrive as a JSON number or a numeric string.
///
/// Fractional numbers are truncated toward zero.
pub(crate) fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
