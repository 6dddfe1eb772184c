//! Taipower open-data feed client.
//!
//! Retrieves the live per-unit generation dataset published by Taipower
//! and normalizes it into `UnitRecord`s.
//!
//! The feed is hostile in small ways and every quirk here is observed
//! behavior, not speculation:
//! - the document is served with a UTF-8 BOM some of the time;
//! - the record array arrives either bare or wrapped in an object under
//!   an `aaData` field;
//! - column headers drift between publications, so mapping is heuristic
//!   (exact headers first, then substring matching);
//! - generation values appear as numbers or as strings, occasionally
//!   non-numeric.
//!
//! Feed index: https://service.taipower.com.tw/data/opendata/

use serde_json::Value;

use crate::model::{FeedError, UnitRecord};

/// Live generation dataset (d006001).
pub const TAIPOWER_FEED_URL: &str =
    "https://service.taipower.com.tw/data/opendata/apply/file/d006001/001.json";

// ---------------------------------------------------------------------------
// Exact column headers (current publication)
// ---------------------------------------------------------------------------

const COL_NAME: &str = "機組名稱";
const COL_TYPE: &str = "機組類型";
const COL_GEN: &str = "淨發電量(MW)";

// Substring fallbacks for drifted headers. The 比 exclusion keeps the
// percentage column (淨發電量比) from shadowing the MW column.
const HINT_NAME: &str = "名稱";
const HINT_TYPE: &str = "類型";
const HINT_GEN: &str = "淨發電量";
const HINT_GEN_EXCLUDE: &str = "比";

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Fetches and parses the live unit list.
///
/// One blocking GET per call; no retries — the caller decides whether a
/// failed cycle is fatal. Returns every record the feed carries, including
/// zero and negative generation values.
pub fn fetch_unit_records(
    client: &reqwest::blocking::Client,
    url: &str,
) -> Result<Vec<UnitRecord>, FeedError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| FeedError::RequestError(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FeedError::HttpError(response.status().as_u16()));
    }

    let bytes = response
        .bytes()
        .map_err(|e| FeedError::RequestError(e.to_string()))?;

    let text = decode_feed_text(&bytes);
    parse_unit_records(&text)
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decodes feed bytes with a two-step fallback: strict BOM-aware UTF-8
/// first, then plain lossy UTF-8.
///
/// The BOM is stripped before either attempt — a leading U+FEFF would
/// reach the JSON parser otherwise. Bytes that fail strict decoding still
/// produce a parseable document as long as the damage sits inside string
/// values; anything worse surfaces as a `ParseError` downstream.
pub fn decode_feed_text(bytes: &[u8]) -> String {
    let body = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

/// Parses decoded feed text into unit records.
///
/// Accepts a bare array or an object wrapping the array under `aaData`.
/// Rows that are not objects are skipped; within a row, missing columns
/// degrade to empty strings / 0.0 rather than failing the run.
pub fn parse_unit_records(text: &str) -> Result<Vec<UnitRecord>, FeedError> {
    let document: Value =
        serde_json::from_str(text).map_err(|e| FeedError::ParseError(e.to_string()))?;

    let rows = match &document {
        Value::Object(map) => match map.get("aaData") {
            Some(Value::Array(rows)) => rows,
            _ => {
                return Err(FeedError::ParseError(
                    "object document without an aaData array".to_string(),
                ));
            }
        },
        Value::Array(rows) => rows,
        _ => {
            return Err(FeedError::ParseError(
                "document is neither an array nor an object".to_string(),
            ));
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        if let Value::Object(fields) = row {
            records.push(record_from_row(fields));
        }
    }
    Ok(records)
}

/// Maps one row object to a record, exact headers first, substring
/// heuristics for whatever remains unfilled.
fn record_from_row(fields: &serde_json::Map<String, Value>) -> UnitRecord {
    let mut name: Option<String> = None;
    let mut declared_type: Option<String> = None;
    let mut net_mw: Option<f64> = None;

    for (column, value) in fields {
        match column.as_str() {
            COL_NAME => name = Some(text_value(value)),
            COL_TYPE => declared_type = Some(text_value(value)),
            COL_GEN => net_mw = Some(parse_generation(value)),
            _ => {
                if name.is_none() && column.contains(HINT_NAME) {
                    name = Some(text_value(value));
                } else if declared_type.is_none() && column.contains(HINT_TYPE) {
                    declared_type = Some(text_value(value));
                } else if net_mw.is_none()
                    && column.contains(HINT_GEN)
                    && !column.contains(HINT_GEN_EXCLUDE)
                {
                    net_mw = Some(parse_generation(value));
                }
            }
        }
    }

    UnitRecord {
        name: name.unwrap_or_default(),
        declared_type: declared_type.unwrap_or_default(),
        net_generation_mw: net_mw.unwrap_or(0.0),
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Permissive numeric parse: numbers pass through, numeric strings parse,
/// everything else is 0.0.
fn parse_generation(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
