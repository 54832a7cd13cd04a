//! KPI focus classification.
//!
//! RULE ORDER (fixed business policy, never reordered):
//!   1. Dormant days > 80                 → Dormant Inventory (Age)
//!   2. Surplus cost > 2 × Lost sales     → Inventory Reduction
//!   3. AVG availability (%) < 75         → Availability Improvement
//!   4. fewer than two so far             → Sales Through
//!   5. still fewer than two              → Inventory Reduction, else Availability Improvement
//!
//! Only the first two labels found are kept.

use crate::record::AgRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DORMANT_DAYS_TRIGGER: f64 = 80.0;
pub const SURPLUS_TO_LOST_SALES_RATIO: f64 = 2.0;
pub const LOW_AVAILABILITY_TRIGGER: f64 = 75.0;

/// Declaration order is label priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum KpiLabel {
    #[serde(rename = "Dormant Inventory (Age)")]
    DormantInventory,
    #[serde(rename = "Inventory Reduction")]
    InventoryReduction,
    #[serde(rename = "Availability Improvement")]
    AvailabilityImprovement,
    #[serde(rename = "Sales Through")]
    SalesThrough,
}

impl KpiLabel {
    pub const ALL: [KpiLabel; 4] = [
        KpiLabel::DormantInventory,
        KpiLabel::InventoryReduction,
        KpiLabel::AvailabilityImprovement,
        KpiLabel::SalesThrough,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KpiLabel::DormantInventory => "Dormant Inventory (Age)",
            KpiLabel::InventoryReduction => "Inventory Reduction",
            KpiLabel::AvailabilityImprovement => "Availability Improvement",
            KpiLabel::SalesThrough => "Sales Through",
        }
    }

    pub fn rationale(&self) -> &'static str {
        match self {
            KpiLabel::DormantInventory => "Indicates stagnant stock nearing obsolescence",
            KpiLabel::InventoryReduction => "Surplus is the dominant problem to solve",
            KpiLabel::AvailabilityImprovement => {
                "Chronic stockouts risk lost sales and customer experience"
            }
            KpiLabel::SalesThrough => "Healthy balance \u{2192} optimize sell-through further",
        }
    }
}

impl fmt::Display for KpiLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two KPI focuses chosen for one AG, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiFocus {
    pub primary: KpiLabel,
    pub secondary: KpiLabel,
}

impl KpiFocus {
    pub fn labels(&self) -> [KpiLabel; 2] {
        [self.primary, self.secondary]
    }

    /// Labels joined with ", " for the `KPI Recommendations` column.
    pub fn joined(&self) -> String {
        format!("{}, {}", self.primary, self.secondary)
    }
}

/// Choose the two KPI focuses for one record.
pub fn classify(record: &AgRecord) -> KpiFocus {
    let mut labels: Vec<KpiLabel> = Vec::with_capacity(3);

    if record.dormant_days > DORMANT_DAYS_TRIGGER {
        labels.push(KpiLabel::DormantInventory);
    }
    if record.surplus_cost > SURPLUS_TO_LOST_SALES_RATIO * record.lost_sales {
        labels.push(KpiLabel::InventoryReduction);
    }
    if record.availability < LOW_AVAILABILITY_TRIGGER {
        labels.push(KpiLabel::AvailabilityImprovement);
    }

    if labels.len() < 2 {
        labels.push(KpiLabel::SalesThrough);
    }
    if labels.len() < 2 {
        if !labels.contains(&KpiLabel::InventoryReduction) {
            labels.push(KpiLabel::InventoryReduction);
        } else if !labels.contains(&KpiLabel::AvailabilityImprovement) {
            labels.push(KpiLabel::AvailabilityImprovement);
        }
    }

    // Steps above always leave at least two labels.
    KpiFocus {
        primary: labels[0],
        secondary: labels[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(dormant: f64, surplus: f64, lost: f64, availability: f64) -> AgRecord {
        AgRecord {
            ag: "test".into(),
            dormant_days: dormant,
            surplus_cost: surplus,
            lost_sales: lost,
            availability,
            ..Default::default()
        }
    }

    #[test]
    fn first_two_triggered_rules_win() {
        let focus = classify(&record(90.0, 500.0, 100.0, 60.0));
        assert_eq!(
            focus.labels(),
            [KpiLabel::DormantInventory, KpiLabel::InventoryReduction]
        );
    }

    #[test]
    fn nothing_triggered_falls_back_to_sales_through() {
        let focus = classify(&record(10.0, 50.0, 100.0, 90.0));
        assert_eq!(
            focus.labels(),
            [KpiLabel::SalesThrough, KpiLabel::InventoryReduction]
        );
    }

    #[test]
    fn single_trigger_is_paired_with_sales_through() {
        let focus = classify(&record(10.0, 500.0, 100.0, 90.0));
        assert_eq!(
            focus.labels(),
            [KpiLabel::InventoryReduction, KpiLabel::SalesThrough]
        );

        let focus = classify(&record(10.0, 0.0, 100.0, 60.0));
        assert_eq!(
            focus.labels(),
            [KpiLabel::AvailabilityImprovement, KpiLabel::SalesThrough]
        );
    }

    #[test]
    fn triggers_are_strict_thresholds() {
        // 80 days, surplus exactly 2x lost, availability exactly 75: nothing fires
        let focus = classify(&record(80.0, 200.0, 100.0, 75.0));
        assert_eq!(
            focus.labels(),
            [KpiLabel::SalesThrough, KpiLabel::InventoryReduction]
        );
    }

    #[test]
    fn all_zero_record_still_gets_two_labels() {
        let focus = classify(&AgRecord::default());
        // availability 0 < 75 fires; surplus 0 > 0 does not
        assert_eq!(
            focus.labels(),
            [KpiLabel::AvailabilityImprovement, KpiLabel::SalesThrough]
        );
    }

    #[test]
    fn always_two_distinct_labels_in_priority_order() {
        for dormant in [0.0, 80.0, 81.0] {
            for (surplus, lost) in [(0.0, 0.0), (201.0, 100.0), (50.0, 100.0)] {
                for availability in [0.0, 74.9, 75.0, 100.0] {
                    let focus = classify(&record(dormant, surplus, lost, availability));
                    assert_ne!(focus.primary, focus.secondary);
                    let triggered = [
                        dormant > 80.0,
                        surplus > 2.0 * lost,
                        availability < 75.0,
                    ]
                    .iter()
                    .filter(|t| **t)
                    .count();
                    if triggered >= 2 {
                        assert!(
                            focus.primary < focus.secondary,
                            "out of priority order: {focus:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn every_label_has_a_rationale() {
        for label in KpiLabel::ALL {
            assert!(!label.rationale().is_empty(), "{label} has no rationale");
        }
        assert_eq!(
            KpiLabel::SalesThrough.rationale(),
            "Healthy balance → optimize sell-through further"
        );
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&KpiLabel::DormantInventory).unwrap();
        assert_eq!(json, "\"Dormant Inventory (Age)\"");
        let back: KpiLabel = serde_json::from_str("\"Sales Through\"").unwrap();
        assert_eq!(back, KpiLabel::SalesThrough);
    }

    #[test]
    fn joined_uses_comma_space() {
        let focus = classify(&record(90.0, 500.0, 100.0, 60.0));
        assert_eq!(focus.joined(), "Dormant Inventory (Age), Inventory Reduction");
    }
}
