//! Core data types for the Taipower grid map service.
//!
//! This module defines the shared domain model imported by all other modules.
//! It contains no logic beyond small accessors, no I/O, and no external
//! dependencies — only types.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Raw feed records
// ---------------------------------------------------------------------------

/// A single generation unit as reported by the Taipower open-data feed.
///
/// One entry per unit (not per plant — large plants report several units).
/// Constructed fresh on every fetch, immutable, and discarded once the
/// aggregation pass has consumed it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitRecord {
    /// Unit name as published, e.g. "核三#2" or "大潭 (#3)".
    pub name: String,
    /// Free-text fuel/technology label, e.g. "燃氣(LNG)" or "風力".
    /// Granularity is inconsistent upstream; see `classify`.
    pub declared_type: String,
    /// Instantaneous net output in MW. Negative while a pumped-storage
    /// unit is consuming power to pump.
    pub net_generation_mw: f64,
}

// ---------------------------------------------------------------------------
// Fuel categories
// ---------------------------------------------------------------------------

/// Closed fuel/technology classification. Every record maps to exactly one
/// variant; anything the rules cannot place degrades to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FuelCategory {
    Nuclear,
    Gas,
    Coal,
    Oil,
    PumpedStorage,
    Hydro,
    Wind,
    Solar,
    Other,
}

impl FuelCategory {
    pub const COUNT: usize = 9;

    /// All variants, for iteration over totals.
    pub const ALL: [FuelCategory; Self::COUNT] = [
        FuelCategory::Nuclear,
        FuelCategory::Gas,
        FuelCategory::Coal,
        FuelCategory::Oil,
        FuelCategory::PumpedStorage,
        FuelCategory::Hydro,
        FuelCategory::Wind,
        FuelCategory::Solar,
        FuelCategory::Other,
    ];

    /// Legend/pie display order: baseload first, then peaking and
    /// renewables. `Other` is deliberately absent — it counts toward the
    /// grand total but is never drawn in the radial chart, matching the
    /// upstream dashboard.
    pub const LEGEND_ORDER: [FuelCategory; 8] = [
        FuelCategory::Nuclear,
        FuelCategory::Coal,
        FuelCategory::Gas,
        FuelCategory::Oil,
        FuelCategory::PumpedStorage,
        FuelCategory::Hydro,
        FuelCategory::Wind,
        FuelCategory::Solar,
    ];

    /// Display label (zh-TW, as rendered on the map and legend).
    pub fn label(&self) -> &'static str {
        match self {
            FuelCategory::Nuclear => "核能",
            FuelCategory::Gas => "燃氣",
            FuelCategory::Coal => "燃煤",
            FuelCategory::Oil => "燃油",
            FuelCategory::PumpedStorage => "抽蓄",
            FuelCategory::Hydro => "水力",
            FuelCategory::Wind => "風力",
            FuelCategory::Solar => "太陽能",
            FuelCategory::Other => "其他",
        }
    }

    /// Color used in the legend rows and the radial chart. Identical to
    /// the marker color except for `Other`, which is drawn dark red on the
    /// map but near-black in the legend.
    pub fn legend_color(&self) -> &'static str {
        match self {
            FuelCategory::Nuclear => "yellow",
            FuelCategory::Gas => "#FF4500",
            FuelCategory::Coal => "#AAAAAA",
            FuelCategory::Oil => "#A0522D",
            FuelCategory::PumpedStorage => "#9932CC",
            FuelCategory::Hydro => "#00BFFF",
            FuelCategory::Wind => "#00FF00",
            FuelCategory::Solar => "#FFA500",
            FuelCategory::Other => "#333333",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).expect("variant listed in ALL")
    }
}

impl std::fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ---------------------------------------------------------------------------
// Aggregation output
// ---------------------------------------------------------------------------

/// Per-category accumulated generation, positive contributions only.
///
/// Negative (pumped-load) values are excluded here so that percentage
/// shares are not distorted; the signed value still accumulates into the
/// owning `PlantGroup`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals {
    totals: [f64; FuelCategory::COUNT],
}

impl CategoryTotals {
    pub fn add(&mut self, category: FuelCategory, mw: f64) {
        self.totals[category.index()] += mw;
    }

    pub fn get(&self, category: FuelCategory) -> f64 {
        self.totals[category.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FuelCategory, f64)> + '_ {
        FuelCategory::ALL.iter().map(|c| (*c, self.get(*c)))
    }

    /// Combined thermal output (coal + gas + oil).
    pub fn thermal_mw(&self) -> f64 {
        self.get(FuelCategory::Coal) + self.get(FuelCategory::Gas) + self.get(FuelCategory::Oil)
    }

    /// Combined wind + solar output.
    pub fn renewable_mw(&self) -> f64 {
        self.get(FuelCategory::Wind) + self.get(FuelCategory::Solar)
    }
}

/// All units that resolved to one map location, folded together.
///
/// Created lazily on the first record resolving to a group key and mutated
/// by accumulation within a single pipeline run. Not persisted across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantGroup {
    pub latitude: f64,
    pub longitude: f64,
    /// Category of the first record that created the group.
    pub category: FuelCategory,
    /// Marker color of the first record that created the group.
    pub color: &'static str,
    /// Signed running sum — pumped load stays negative here.
    pub total_generation_mw: f64,
    /// One "name: value MW" line per member unit, in input order.
    pub details: Vec<String>,
}

/// Output of one aggregation pass over a full record list.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub totals: CategoryTotals,
    /// Keyed by group key; BTreeMap so iteration (and thus marker order in
    /// the rendered page) is deterministic.
    pub groups: BTreeMap<String, PlantGroup>,
    /// Grand total of all positive contributions, resolvable or not.
    pub total_gen: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding the Taipower feed.
#[derive(Debug, PartialEq)]
pub enum FeedError {
    /// Non-2xx HTTP response from the open-data endpoint.
    HttpError(u16),
    /// The request itself failed (connect, TLS, timeout).
    RequestError(String),
    /// The response body could not be deserialized as a record list.
    ParseError(String),
    /// The feed parsed but contained no unit records.
    EmptyFeed,
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FeedError::RequestError(msg) => write!(f, "Request failed: {}", msg),
            FeedError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            FeedError::EmptyFeed => write!(f, "Feed contained no unit records"),
        }
    }
}

impl std::error::Error for FeedError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
