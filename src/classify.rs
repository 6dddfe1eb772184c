//! Fuel/technology classification for generation units.
//!
//! The feed's declared-type field is a free-text label with inconsistent
//! granularity, so classification is an ordered rule chain over substring
//! markers, first match wins, degrading to `Other` rather than failing.
//!
//! Rule order is load-bearing: pumped-storage plants also perform
//! hydro-like generation and pumping, and their type string can carry a
//! hydro marker — the name-based pumped-storage override must run before
//! the hydro type match.

use crate::model::FuelCategory;

/// Marker color for records no rule matches.
pub const OTHER_COLOR: &str = "#8B0000";

/// One classification rule. A rule matches when any `type_markers` entry
/// is contained in the declared type, or any `name_markers` entry is
/// contained in the unit name. Case-sensitive, as the upstream labels are.
pub struct ClassifyRule {
    pub category: FuelCategory,
    /// Marker color for units classified by this rule.
    pub color: &'static str,
    pub type_markers: &'static [&'static str],
    pub name_markers: &'static [&'static str],
}

/// Classification rules in precedence order.
pub static CLASSIFY_RULES: &[ClassifyRule] = &[
    // Pumped storage first: 明潭 and 大觀 units sometimes report a plain
    // hydro type, so the plant names act as an override.
    ClassifyRule {
        category: FuelCategory::PumpedStorage,
        color: "#9932CC",
        type_markers: &["抽蓄"],
        name_markers: &["明潭", "大觀"],
    },
    ClassifyRule {
        category: FuelCategory::Nuclear,
        color: "yellow",
        type_markers: &["核能"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Wind,
        color: "#00FF00",
        type_markers: &["風力"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Solar,
        color: "#FFA500",
        type_markers: &["太陽", "光電"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Hydro,
        color: "#00BFFF",
        type_markers: &["水力"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Coal,
        color: "#AAAAAA",
        type_markers: &["燃煤", "煤"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Gas,
        color: "#FF4500",
        type_markers: &["燃氣", "氣", "LNG"],
        name_markers: &[],
    },
    ClassifyRule {
        category: FuelCategory::Oil,
        color: "#A0522D",
        type_markers: &["燃油", "輕油", "柴油"],
        name_markers: &[],
    },
];

/// Assigns a marker color and fuel category to one record.
///
/// Every record classifies: if no rule matches, the result is
/// (`OTHER_COLOR`, `FuelCategory::Other`).
pub fn classify(declared_type: &str, name: &str) -> (&'static str, FuelCategory) {
    for rule in CLASSIFY_RULES {
        let type_hit = rule.type_markers.iter().any(|m| declared_type.contains(m));
        let name_hit = rule.name_markers.iter().any(|m| name.contains(m));
        if type_hit || name_hit {
            return (rule.color, rule.category);
        }
    }
    (OTHER_COLOR, FuelCategory::Other)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_fuel_type_classifies_to_its_category() {
        let cases = [
            ("核能", FuelCategory::Nuclear),
            ("風力", FuelCategory::Wind),
            ("太陽能", FuelCategory::Solar),
            ("光電", FuelCategory::Solar),
            ("水力", FuelCategory::Hydro),
            ("燃煤", FuelCategory::Coal),
            ("燃氣", FuelCategory::Gas),
            ("燃氣(LNG)", FuelCategory::Gas),
            ("LNG", FuelCategory::Gas),
            ("燃油", FuelCategory::Oil),
            ("輕油", FuelCategory::Oil),
            ("柴油", FuelCategory::Oil),
            ("抽蓄", FuelCategory::PumpedStorage),
        ];
        for (declared_type, expected) in cases {
            let (_, category) = classify(declared_type, "某機組");
            assert_eq!(category, expected, "type '{}' misclassified", declared_type);
        }
    }

    #[test]
    fn test_pumped_storage_name_override_beats_hydro_type() {
        // 明潭/大觀 units occasionally report a plain 水力 type; the name
        // override must win or pumped load distorts the hydro share.
        let (color, category) = classify("水力", "明潭#3");
        assert_eq!(category, FuelCategory::PumpedStorage);
        assert_eq!(color, "#9932CC");

        let (_, category) = classify("水力", "大觀二廠#1");
        assert_eq!(category, FuelCategory::PumpedStorage);

        // A hydro unit without the override names stays hydro.
        let (_, category) = classify("水力", "德基#1");
        assert_eq!(category, FuelCategory::Hydro);
    }

    #[test]
    fn test_unrecognized_type_degrades_to_other() {
        let (color, category) = classify("汽電共生", "某汽電共生機組");
        assert_eq!(category, FuelCategory::Other);
        assert_eq!(color, OTHER_COLOR);

        let (_, category) = classify("", "");
        assert_eq!(category, FuelCategory::Other);
    }

    #[test]
    fn test_bare_fuel_markers_still_match() {
        // Upstream sometimes drops the 燃 prefix.
        let (_, category) = classify("煤", "某機組");
        assert_eq!(category, FuelCategory::Coal);
        let (_, category) = classify("氣", "某機組");
        assert_eq!(category, FuelCategory::Gas);
    }

    #[test]
    fn test_coal_precedes_gas_for_combined_labels() {
        // "燃煤" contains neither gas marker, but a hypothetical combined
        // label must resolve by rule order, coal before gas.
        let (_, category) = classify("燃煤/燃氣混燒", "某機組");
        assert_eq!(category, FuelCategory::Coal);
    }

    #[test]
    fn test_classification_ignores_name_except_for_overrides() {
        // A wind-farm name with an unhelpful type does not classify as
        // wind — only the declared type carries fuel markers.
        let (_, category) = classify("其他", "彰工風力一號");
        assert_eq!(category, FuelCategory::Other);
    }

    #[test]
    fn test_every_rule_color_matches_its_legend_color_except_other() {
        // Marker colors and legend colors agree for all real categories;
        // Other diverges on purpose (dark red marker, near-black legend).
        for rule in CLASSIFY_RULES {
            assert_eq!(
                rule.color,
                rule.category.legend_color(),
                "marker/legend color drift for {:?}",
                rule.category
            );
        }
        assert_ne!(OTHER_COLOR, FuelCategory::Other.legend_color());
    }
}
