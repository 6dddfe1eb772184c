//! Integration tests for the full classify-resolve-aggregate-render
//! pipeline, driven by fixture documents shaped like real feed
//! publications.
//!
//! These tests verify:
//! 1. Feed documents (bare and aaData-wrapped, BOM'd and clean) parse
//! 2. The pipeline's sign handling and totals invariants hold end to end
//! 3. The rendered page carries markers, legend, and HUD content
//! 4. The whole pipeline is deterministic and idempotent
//!
//! No network, no clock: fixtures and fixed timestamps only.

use chrono::{FixedOffset, TimeZone};

use powmap_service::aggregate::aggregate;
use powmap_service::ingest::taipower::{decode_feed_text, parse_unit_records};
use powmap_service::model::FuelCategory;
use powmap_service::render::html::render_page;
use powmap_service::resolve::OTHER_WIND_KEY;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A feed publication shaped like the current d006001 document: wrapped
/// in aaData, native headers, values as a mix of numbers and strings.
const WRAPPED_FEED: &str = r#"{
  "": "2025-07-01 20:30",
  "aaData": [
    {"機組名稱": "核一#1", "機組類型": "核能", "淨發電量(MW)": 500.0, "淨發電量比(%)": "9.4"},
    {"機組名稱": "核三#2", "機組類型": "核能", "淨發電量(MW)": "451.0", "淨發電量比(%)": "8.5"},
    {"機組名稱": "台中#5", "機組類型": "燃煤", "淨發電量(MW)": 550.0, "淨發電量比(%)": "10.3"},
    {"機組名稱": "大潭 (#3)", "機組類型": "燃氣", "淨發電量(MW)": 724.2, "淨發電量比(%)": "13.6"},
    {"機組名稱": "協和#2", "機組類型": "燃油", "淨發電量(MW)": 80.0, "淨發電量比(%)": "1.5"},
    {"機組名稱": "明潭#1", "機組類型": "抽蓄", "淨發電量(MW)": -200.0, "淨發電量比(%)": "0.0"},
    {"機組名稱": "大觀#2", "機組類型": "水力", "淨發電量(MW)": 150.0, "淨發電量比(%)": "2.8"},
    {"機組名稱": "德基", "機組類型": "水力", "淨發電量(MW)": 90.0, "淨發電量比(%)": "1.7"},
    {"機組名稱": "彰化海上風機X", "機組類型": "風力", "淨發電量(MW)": 30.0, "淨發電量比(%)": "0.6"},
    {"機組名稱": "彰濱光", "機組類型": "太陽能", "淨發電量(MW)": 0.0, "淨發電量比(%)": "0.0"},
    {"機組名稱": "某汽電共生", "機組類型": "汽電共生", "淨發電量(MW)": 40.0, "淨發電量比(%)": "0.8"},
    {"機組名稱": "歲修機組", "機組類型": "燃煤", "淨發電量(MW)": "N/A", "淨發電量比(%)": ""}
  ]
}"#;

fn fixed_render_time() -> chrono::DateTime<FixedOffset> {
    FixedOffset::east_opt(8 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 7, 1, 20, 30, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Parse -> aggregate
// ---------------------------------------------------------------------------

#[test]
fn test_wrapped_feed_flows_through_the_whole_pipeline() {
    let records = parse_unit_records(WRAPPED_FEED).expect("fixture should parse");
    assert_eq!(records.len(), 12);

    let snapshot = aggregate(&records);

    // Positive grand total: every record except 明潭 (-200), 彰濱光 (0)
    // and the N/A unit (coerced to 0).
    let expected_total = 500.0 + 451.0 + 550.0 + 724.2 + 80.0 + 150.0 + 90.0 + 30.0 + 40.0;
    assert!((snapshot.total_gen - expected_total).abs() < 1e-9);

    // 大觀 reports a 水力 type but the name override keeps it in storage.
    assert!((snapshot.totals.get(FuelCategory::PumpedStorage) - 150.0).abs() < 1e-9);
    assert!((snapshot.totals.get(FuelCategory::Hydro) - 90.0).abs() < 1e-9);
    assert!((snapshot.totals.get(FuelCategory::Nuclear) - 951.0).abs() < 1e-9);
    assert!((snapshot.totals.get(FuelCategory::Other) - 40.0).abs() < 1e-9);

    // 明潭 keeps its pumping draw inside its own group.
    assert!((snapshot.groups["明潭"].total_generation_mw - (-200.0)).abs() < 1e-9);

    // The unmatched offshore unit lands on the generic wind point.
    assert!(snapshot.groups.contains_key(OTHER_WIND_KEY));

    // The unresolvable cogeneration unit is in no group.
    assert!(!snapshot.groups.contains_key("某汽電共生"));
}

#[test]
fn test_category_totals_match_grand_total_for_nonnegative_feed() {
    let records = parse_unit_records(WRAPPED_FEED).unwrap();
    let nonnegative: Vec<_> = records
        .into_iter()
        .filter(|r| r.net_generation_mw >= 0.0)
        .collect();
    let snapshot = aggregate(&nonnegative);
    let sum: f64 = snapshot.totals.iter().map(|(_, mw)| mw).sum();
    assert!(
        (sum - snapshot.total_gen).abs() < 1e-9,
        "category sum {} != total {}",
        sum,
        snapshot.total_gen
    );
}

#[test]
fn test_zero_generation_unit_appears_only_in_group_details() {
    let records = parse_unit_records(WRAPPED_FEED).unwrap();
    let snapshot = aggregate(&records);

    assert_eq!(snapshot.totals.get(FuelCategory::Solar), 0.0);
    let group = &snapshot.groups["彰濱光"];
    assert_eq!(group.total_generation_mw, 0.0);
    assert_eq!(group.details, vec!["彰濱光: 0 MW".to_string()]);
}

#[test]
fn test_pipeline_is_idempotent_and_order_independent() {
    let records = parse_unit_records(WRAPPED_FEED).unwrap();

    let first = aggregate(&records);
    let second = aggregate(&records);
    assert_eq!(first, second, "two runs over identical input must agree");

    let mut reversed = records.clone();
    reversed.reverse();
    let backward = aggregate(&reversed);
    assert_eq!(first.totals, backward.totals);
    assert_eq!(first.total_gen, backward.total_gen);
    let keys_a: Vec<_> = first.groups.keys().collect();
    let keys_b: Vec<_> = backward.groups.keys().collect();
    assert_eq!(keys_a, keys_b, "group keys must not depend on input order");
}

// ---------------------------------------------------------------------------
// Decode variants
// ---------------------------------------------------------------------------

#[test]
fn test_bom_prefixed_publication_parses() {
    let mut bytes = b"\xef\xbb\xbf".to_vec();
    bytes.extend_from_slice(WRAPPED_FEED.as_bytes());
    let text = decode_feed_text(&bytes);
    let records = parse_unit_records(&text).expect("BOM'd publication should parse");
    assert_eq!(records.len(), 12);
}

#[test]
fn test_mojibake_publication_survives_plain_decode_fallback() {
    // Corrupt one byte inside a string value: strict decoding fails, the
    // plain fallback substitutes U+FFFD, and the pipeline still runs.
    let mut bytes = WRAPPED_FEED.as_bytes().to_vec();
    let pos = bytes
        .windows("核一#1".len())
        .position(|w| w == "核一#1".as_bytes())
        .expect("fixture contains 核一#1");
    bytes[pos] = 0xFF;
    let text = decode_feed_text(&bytes);
    let records = parse_unit_records(&text).expect("fallback decode should keep the feed parseable");
    assert_eq!(records.len(), 12);
    let snapshot = aggregate(&records);
    assert!(snapshot.total_gen > 0.0);
}

#[test]
fn test_bare_array_publication_parses_like_the_wrapped_one() {
    let wrapped = parse_unit_records(WRAPPED_FEED).unwrap();
    let bare = {
        let document: serde_json::Value = serde_json::from_str(WRAPPED_FEED).unwrap();
        let rows = document.get("aaData").unwrap().clone();
        parse_unit_records(&rows.to_string()).unwrap()
    };
    assert_eq!(wrapped, bare);
}

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

#[test]
fn test_rendered_page_carries_every_group_marker() {
    let records = parse_unit_records(WRAPPED_FEED).unwrap();
    let snapshot = aggregate(&records);
    let page = render_page(&snapshot, fixed_render_time());

    for key in snapshot.groups.keys() {
        assert!(page.contains(key.as_str()), "page is missing group '{}'", key);
    }
    assert!(page.contains("conic-gradient("));
    assert!(page.contains("總發電量"));
    assert!(page.contains("2025-07-01 20:30"));
    // The pumping group renders its annotation.
    assert!(page.contains("抽水/充電中"));
}

#[test]
fn test_rendering_is_deterministic() {
    let records = parse_unit_records(WRAPPED_FEED).unwrap();
    let snapshot = aggregate(&records);
    let a = render_page(&snapshot, fixed_render_time());
    let b = render_page(&snapshot, fixed_render_time());
    assert_eq!(a, b);
}
