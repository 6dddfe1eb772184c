//! Single-pass aggregation of unit records into map state.
//!
//! One fold over the record list produces three things: per-category
//! totals for the legend, per-location plant groups for the markers, and
//! the positive grand total. Sign handling is deliberate and asymmetric:
//! totals and shares only ever see `max(0, mw)` so pumped load cannot eat
//! into the percentage breakdown, while each plant group accumulates the
//! unclamped signed value so a pumping station shows its true draw on the
//! map. The two sums therefore need not agree, and unresolvable records
//! widen the gap further (counted in totals, absent from every group).

use std::collections::BTreeMap;

use crate::classify::classify;
use crate::model::{GridSnapshot, PlantGroup, UnitRecord};
use crate::resolve::resolve;

/// Folds a full record list into a `GridSnapshot`.
///
/// Pure and idempotent: identical input yields identical totals, group
/// keys, and detail lines, independent of how often it runs.
pub fn aggregate(records: &[UnitRecord]) -> GridSnapshot {
    let mut snapshot = GridSnapshot {
        totals: Default::default(),
        groups: BTreeMap::new(),
        total_gen: 0.0,
    };

    for record in records {
        let positive_mw = record.net_generation_mw.max(0.0);
        let (color, category) = classify(&record.declared_type, &record.name);
        if positive_mw > 0.0 {
            snapshot.total_gen += positive_mw;
            snapshot.totals.add(category, positive_mw);
        }

        let (point, group_key) = resolve(&record.name, &record.declared_type);
        if let Some((latitude, longitude)) = point {
            let group = snapshot.groups.entry(group_key).or_insert_with(|| PlantGroup {
                latitude,
                longitude,
                category,
                color,
                total_generation_mw: 0.0,
                details: Vec::new(),
            });
            group.total_generation_mw += record.net_generation_mw;
            group
                .details
                .push(format!("{}: {} MW", record.name, record.net_generation_mw));
        }
    }

    snapshot
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
