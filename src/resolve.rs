//! Unit-name to map-location resolution.
//!
//! Best-effort geocoding over the static registry in `plants`: sanitize
//! the published name, scan the registry in declaration order, and fall
//! back to a generic per-technology point for wind and solar units the
//! registry does not know. Not authoritative — several distinct physical
//! units legitimately share one representative point.

use crate::plants::{self, PlantSite, GENERIC_SOLAR_KEY, GENERIC_WIND_KEY};

/// Fallback group key for wind units with no registry match.
pub const OTHER_WIND_KEY: &str = "其他風力(彰化外海示意)";

/// Fallback group key for solar units with no registry match.
pub const OTHER_SOLAR_KEY: &str = "其他光電(南部示意)";

/// Strips parentheses and internal spaces from a published unit name so
/// registry fragments match names like "大潭 (#3)" or "核三(二號機)".
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '(' | ')' | ' ')).collect()
}

/// Resolves a unit to a map point and a grouping key.
///
/// Returns `(Some(point), registry_key)` on a registry match, a generic
/// wind/solar fallback keyed by `OTHER_WIND_KEY`/`OTHER_SOLAR_KEY` when the
/// declared type carries a wind or solar marker, and `(None, name)` when
/// nothing applies — such records are left off the map but still count
/// toward category totals upstream.
pub fn resolve(name: &str, declared_type: &str) -> (Option<(f64, f64)>, String) {
    let sanitized = sanitize_name(name);
    if let Some(site) = plants::find_site(&sanitized) {
        return (Some(point_of(site)), site.key.to_string());
    }

    if declared_type.contains('風') || declared_type.contains("Wind") {
        let site = plants::site_by_key(GENERIC_WIND_KEY).expect("generic wind key in registry");
        return (Some(point_of(site)), OTHER_WIND_KEY.to_string());
    }
    if declared_type.contains('光')
        || declared_type.contains("太陽")
        || declared_type.contains("Solar")
    {
        let site = plants::site_by_key(GENERIC_SOLAR_KEY).expect("generic solar key in registry");
        return (Some(point_of(site)), OTHER_SOLAR_KEY.to_string());
    }

    (None, name.to_string())
}

fn point_of(site: &PlantSite) -> (f64, f64) {
    (site.latitude, site.longitude)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
