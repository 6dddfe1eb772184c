//! Leaflet page assembly.
//!
//! Produces one self-contained HTML document: dark CARTO basemap centered
//! on Taiwan, one circle marker per plant group, a fixed HUD bar with the
//! headline metrics, and a draggable legend overlay whose radial chart is
//! a plain CSS conic gradient — no chart library, no build step, Leaflet
//! from the CDN is the only script dependency.

use chrono::{DateTime, FixedOffset, Utc};

use crate::model::GridSnapshot;
use crate::render::markers::{build_legend, build_markers, build_summary, LegendSegment};

/// Map center and zoom covering Taiwan proper with the strait islands.
const MAP_CENTER: (f64, f64) = (23.6, 121.0);
const MAP_ZOOM: u8 = 8;

/// Returns the current wall-clock time in Taiwan (UTC+8, no DST).
pub fn taipei_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset");
    Utc::now().with_timezone(&offset)
}

/// Renders the complete map page for one snapshot.
///
/// `generated_at` is taken as a parameter (rather than read from the
/// clock) so rendering stays deterministic in tests.
pub fn render_page(snapshot: &GridSnapshot, generated_at: DateTime<FixedOffset>) -> String {
    let markers = build_markers(snapshot);
    let markers_json = serde_json::to_string(&markers)
        .expect("markers contain only finite numbers and strings")
        // A literal "</script>" inside popup JSON would terminate the
        // script element early.
        .replace("</", "<\\/");

    let summary = build_summary(snapshot);
    let segments = build_legend(&snapshot.totals, snapshot.total_gen);

    let hud = hud_html(
        summary.total_mw,
        summary.thermal_mw,
        summary.nuclear_mw,
        summary.renewable_mw,
        summary.storage_mw,
    );
    let legend = legend_html(&segments, summary.total_mw, generated_at);

    PAGE_TEMPLATE
        .replace("__MAP_LAT__", &MAP_CENTER.0.to_string())
        .replace("__MAP_LON__", &MAP_CENTER.1.to_string())
        .replace("__MAP_ZOOM__", &MAP_ZOOM.to_string())
        .replace("__MARKERS_JSON__", &markers_json)
        .replace("__HUD_HTML__", &hud)
        .replace("__LEGEND_HTML__", &legend)
}

// ---------------------------------------------------------------------------
// HUD bar
// ---------------------------------------------------------------------------

fn hud_html(total: f64, thermal: f64, nuclear: f64, renewable: f64, storage: f64) -> String {
    let cell = |label: &str, label_color: &str, value: String| {
        format!(
            concat!(
                "<div style=\"display:flex; flex-direction:column; align-items:center;\">",
                "<span style=\"font-size:10px; color:{color};\">{label}</span>",
                "<span style=\"font-weight:bold;\">{value}</span>",
                "</div>"
            ),
            color = label_color,
            label = label,
            value = value,
        )
    };

    let total_cell = format!(
        concat!(
            "<div style=\"display:flex; flex-direction:column; align-items:center;\">",
            "<span style=\"font-size:10px; color:#aaa;\">總發電量</span>",
            "<span style=\"font-weight:bold; font-size:16px;\">{} ",
            "<span style=\"font-size:10px\">MW</span></span>",
            "</div>"
        ),
        thousands(total)
    );

    format!(
        concat!(
            "<div id=\"hud-bar\" style=\"position: fixed; top: 20px; left: 50%; ",
            "transform: translateX(-50%); z-index: 9999; ",
            "background-color: rgba(20, 20, 20, 0.7); padding: 10px 20px; ",
            "border-radius: 50px; border: 1px solid #444; display: flex; gap: 25px; ",
            "color: white; font-family: 'Arial', sans-serif; font-size: 14px; ",
            "backdrop-filter: blur(5px); box-shadow: 0 4px 6px rgba(0,0,0,0.3); ",
            "white-space: nowrap;\">",
            "{total}",
            "<div style=\"width:1px; background:#555;\"></div>",
            "{thermal}{nuclear}{renewable}{storage}",
            "</div>"
        ),
        total = total_cell,
        thermal = cell("火力合計", "#FF4500", thousands(thermal)),
        nuclear = cell("核能", "yellow", thousands(nuclear)),
        renewable = cell("風光綠能", "#00FF00", thousands(renewable)),
        storage = cell("抽蓄儲能", "#9932CC", thousands(storage)),
    )
}

// ---------------------------------------------------------------------------
// Legend overlay
// ---------------------------------------------------------------------------

fn legend_html(
    segments: &[LegendSegment],
    total_mw: f64,
    generated_at: DateTime<FixedOffset>,
) -> String {
    let stops = segments
        .iter()
        .map(|s| format!("{} {:.1}% {:.1}%", s.color, s.start_pct, s.end_pct))
        .collect::<Vec<_>>()
        .join(", ");

    let rows = segments
        .iter()
        .map(|s| {
            format!(
                concat!(
                    "<div style=\"display:flex; justify-content:space-between; color:{color};\">",
                    "<span>■ {label}</span> <span>{pct:.1}%</span>",
                    "</div>"
                ),
                color = s.color,
                label = s.label,
                pct = s.pct,
            )
        })
        .collect::<String>();

    format!(
        concat!(
            "<div id=\"draggable-legend\" style=\"position: fixed; bottom: 30px; left: 30px; ",
            "width: 260px; background-color: rgba(30, 30, 30, 0.9); color: white; ",
            "z-index: 9999; padding: 15px; border-radius: 12px; border: 1px solid #555; ",
            "font-family: 'Microsoft JhengHei', Arial; ",
            "box-shadow: 0 4px 15px rgba(0,0,0,0.5); cursor: move; user-select: none;\">",
            "<div style=\"font-size:16px; font-weight:bold; margin-bottom:5px; ",
            "border-bottom:1px solid #555; padding-bottom:5px;\">",
            "⚡ 台灣電力戰情",
            "<span style=\"font-size:11px; float:right; margin-top:4px; color:#aaa;\">{time}</span>",
            "</div>",
            "<div style=\"display: flex; align-items: flex-start; margin-top:10px;\">",
            "<div style=\"width: 80px; height: 80px; border-radius: 50%; margin-right: 15px; ",
            "flex-shrink: 0; background: conic-gradient({stops}); border: 2px solid #fff;\"></div>",
            "<div style=\"font-size:12px; line-height: 1.5; width: 100%;\">{rows}</div>",
            "</div>",
            "<div style=\"margin-top:8px; font-size:11px; color:#ddd; text-align:center; ",
            "background:#444; border-radius:4px;\">總發電量: {total} MW</div>",
            "</div>"
        ),
        time = generated_at.format("%Y-%m-%d %H:%M"),
        stops = stops,
        rows = rows,
        total = thousands(total_mw),
    )
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Rounds to a whole number and inserts thousands separators, e.g.
/// 32864.7 -> "32,865".
pub fn thousands(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

// ---------------------------------------------------------------------------
// Page template
// ---------------------------------------------------------------------------

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>台灣電力即時戰情室</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  html, body { height: 100%; margin: 0; }
  #map { height: 100%; width: 100%; background: #090909; }
</style>
</head>
<body>
<div id="map"></div>
__HUD_HTML__
__LEGEND_HTML__
<script>
  var map = L.map('map').setView([__MAP_LAT__, __MAP_LON__], __MAP_ZOOM__);
  L.tileLayer('https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png', {
    attribution: '&copy; OpenStreetMap contributors &copy; CARTO',
    subdomains: 'abcd',
    maxZoom: 19
  }).addTo(map);

  var plantMarkers = __MARKERS_JSON__;
  plantMarkers.forEach(function (m) {
    L.circleMarker([m.lat, m.lon], {
      radius: m.radius,
      color: m.color,
      weight: 1,
      fill: true,
      fillColor: m.color,
      fillOpacity: 0.8
    }).bindPopup(m.popup, { maxWidth: 250 }).addTo(map);
  });

  (function () {
    var elmnt = document.getElementById("draggable-legend");
    if (!elmnt) { return; }
    var pos1 = 0, pos2 = 0, pos3 = 0, pos4 = 0;

    elmnt.onmousedown = dragMouseDown;

    function dragMouseDown(e) {
      e = e || window.event;
      e.preventDefault();
      pos3 = e.clientX;
      pos4 = e.clientY;
      document.onmouseup = closeDragElement;
      document.onmousemove = elementDrag;
    }

    function elementDrag(e) {
      e = e || window.event;
      e.preventDefault();
      pos1 = pos3 - e.clientX;
      pos2 = pos4 - e.clientY;
      pos3 = e.clientX;
      pos4 = e.clientY;
      elmnt.style.top = (elmnt.offsetTop - pos2) + "px";
      elmnt.style.left = (elmnt.offsetLeft - pos1) + "px";
      elmnt.style.bottom = "auto";
    }

    function closeDragElement() {
      document.onmouseup = null;
      document.onmousemove = null;
    }
  })();
</script>
</body>
</html>
"#;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::UnitRecord;
    use chrono::TimeZone;

    fn record(name: &str, declared_type: &str, mw: f64) -> UnitRecord {
        UnitRecord {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            net_generation_mw: mw,
        }
    }

    fn fixed_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 7, 1, 20, 30, 0)
            .unwrap()
    }

    fn sample_snapshot() -> GridSnapshot {
        aggregate(&[
            record("核一#1", "核能", 500.0),
            record("台中#5", "燃煤", 300.0),
            record("明潭#1", "抽蓄", -200.0),
        ])
    }

    #[test]
    fn test_page_embeds_markers_and_overlays() {
        let page = render_page(&sample_snapshot(), fixed_time());
        assert!(page.contains("var plantMarkers = ["));
        assert!(page.contains("conic-gradient("));
        assert!(page.contains("draggable-legend"));
        assert!(page.contains("hud-bar"));
        assert!(page.contains("2025-07-01 20:30"));
        // No placeholder token may survive assembly.
        assert!(!page.contains("__MARKERS_JSON__"));
        assert!(!page.contains("__HUD_HTML__"));
        assert!(!page.contains("__LEGEND_HTML__"));
        assert!(!page.contains("__MAP_"));
    }

    #[test]
    fn test_embedded_json_cannot_close_the_script_element() {
        let page = render_page(&sample_snapshot(), fixed_time());
        let script_payload = page
            .split("var plantMarkers = ")
            .nth(1)
            .expect("marker assignment present");
        let json_line = script_payload.split('\n').next().unwrap();
        assert!(
            !json_line.contains("</"),
            "popup HTML inside the JSON must be escaped: {}",
            json_line
        );
    }

    #[test]
    fn test_page_shows_headline_numbers() {
        let page = render_page(&sample_snapshot(), fixed_time());
        // total 800 (negative excluded), nuclear 500, thermal 300
        assert!(page.contains("800"));
        assert!(page.contains("總發電量"));
        assert!(page.contains("抽蓄儲能"));
    }

    #[test]
    fn test_empty_snapshot_still_renders_a_page() {
        let snapshot = aggregate(&[]);
        let page = render_page(&snapshot, fixed_time());
        assert!(page.contains("var plantMarkers = []"));
        assert!(page.contains("conic-gradient("));
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1000.0), "1,000");
        assert_eq!(thousands(32864.7), "32,865");
        assert_eq!(thousands(-1234.0), "-1,234");
        assert_eq!(thousands(1234567.0), "1,234,567");
    }
}
