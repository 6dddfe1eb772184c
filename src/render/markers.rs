//! Presentation builders: aggregated state to renderable values.
//!
//! Everything here is pure formatting over the aggregator's output
//! contract. Marker geometry and popup text, the legend's percentage
//! breakdown with cumulative radial offsets, and the headline metrics all
//! come from this module; the HTML skeleton lives in `html`.

use serde::Serialize;

use crate::model::{CategoryTotals, FuelCategory, GridSnapshot, PlantGroup};

/// Radius scale factor applied to sqrt(|MW|).
pub const RADIUS_SCALE: f64 = 0.8;

/// Smallest marker radius that stays visible on the dark basemap.
pub const MIN_RADIUS: f64 = 3.0;

/// Popup detail lines shown before truncation.
pub const MAX_POPUP_DETAILS: usize = 8;

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// One circle marker, ready to embed in the page as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub color: &'static str,
    pub popup: String,
}

/// Builds one marker per plant group, in the snapshot's deterministic
/// group order.
pub fn build_markers(snapshot: &GridSnapshot) -> Vec<MapMarker> {
    snapshot
        .groups
        .iter()
        .map(|(key, group)| MapMarker {
            lat: group.latitude,
            lon: group.longitude,
            radius: marker_radius(group.total_generation_mw),
            color: group.color,
            popup: popup_html(key, group),
        })
        .collect()
}

/// Marker radius: square root keeps the area roughly proportional to
/// output without gigawatt plants swallowing the map. Pumping groups get
/// sized by their absolute draw so the purple circle stays visible.
pub fn marker_radius(total_mw: f64) -> f64 {
    (total_mw.abs().sqrt() * RADIUS_SCALE).max(MIN_RADIUS)
}

fn popup_html(group_key: &str, group: &PlantGroup) -> String {
    let mw = group.total_generation_mw;
    let mw_text = if mw < 0.0 {
        format!("<span style='color:red'>{:.1} (抽水/充電中)</span>", mw)
    } else {
        format!("{:.1} MW", mw)
    };

    let details = group
        .details
        .iter()
        .take(MAX_POPUP_DETAILS)
        .cloned()
        .collect::<Vec<_>>()
        .join("<br>");

    format!(
        concat!(
            "<div style=\"font-family: Arial; min-width: 150px;\">",
            "<b style=\"font-size:14px\">{key}</b><br>",
            "<span style=\"color:{color}; font-weight:bold;\">● {label}</span><br>",
            "<b>{mw}</b>",
            "<hr style=\"margin:5px 0\">",
            "<div style=\"font-size:11px; color:#555\">{details}</div>",
            "</div>"
        ),
        key = group_key,
        color = group.color,
        label = group.category.label(),
        mw = mw_text,
        details = details,
    )
}

// ---------------------------------------------------------------------------
// Legend
// ---------------------------------------------------------------------------

/// One legend row / radial chart segment. `start_pct..end_pct` are the
/// cumulative angular offsets (as percentages of the full turn) consumed
/// by the conic gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendSegment {
    pub category: FuelCategory,
    pub label: &'static str,
    pub color: &'static str,
    pub pct: f64,
    pub start_pct: f64,
    pub end_pct: f64,
}

/// Builds the legend segments in fixed baseload-to-peaking order with
/// cumulative offsets. With `total_gen == 0` every segment is zero-width
/// and the chart renders as an empty ring, which is the desired "no data"
/// look.
pub fn build_legend(totals: &CategoryTotals, total_gen: f64) -> Vec<LegendSegment> {
    let mut acc = 0.0;
    FuelCategory::LEGEND_ORDER
        .iter()
        .map(|&category| {
            let pct = if total_gen > 0.0 {
                totals.get(category) / total_gen * 100.0
            } else {
                0.0
            };
            let segment = LegendSegment {
                category,
                label: category.label(),
                color: category.legend_color(),
                pct,
                start_pct: acc,
                end_pct: acc + pct,
            };
            acc += pct;
            segment
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Headline numbers for the HUD bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryMetrics {
    pub total_mw: f64,
    pub thermal_mw: f64,
    pub nuclear_mw: f64,
    pub renewable_mw: f64,
    pub storage_mw: f64,
}

pub fn build_summary(snapshot: &GridSnapshot) -> SummaryMetrics {
    SummaryMetrics {
        total_mw: snapshot.total_gen,
        thermal_mw: snapshot.totals.thermal_mw(),
        nuclear_mw: snapshot.totals.get(FuelCategory::Nuclear),
        renewable_mw: snapshot.totals.renewable_mw(),
        storage_mw: snapshot.totals.get(FuelCategory::PumpedStorage),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
