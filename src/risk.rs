//! Fish-kill risk classification.
//!
//! Dissolved oxygen (ODO, mg/L) is the primary driver of fish kills. A
//! predicted ODO value maps to a [`RiskLevel`] by fixed thresholds, and a set
//! of classified rows rolls up into a [`RiskSummary`] with one overall
//! [`Severity`].

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Below this ODO (mg/L) the risk is High.
pub const HIGH_RISK_ODO_MG_L: f64 = 4.0;
/// Below this ODO (mg/L), and at or above the High threshold, the risk is Moderate.
pub const MODERATE_RISK_ODO_MG_L: f64 = 6.0;
/// Predicted water temperature above this (°C) is a critical condition.
pub const CRITICAL_TEMP_C: f64 = 30.0;
/// Predicted pH below this is a critical condition.
pub const CRITICAL_PH: f64 = 6.5;

/// Risk levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Classify a finite ODO reading. Lower bounds are exclusive for the
    /// worse band: 4.0 is Moderate, 6.0 is Low.
    pub fn classify(odo_mg_l: f64) -> RiskLevel {
        if odo_mg_l < HIGH_RISK_ODO_MG_L {
            RiskLevel::High
        } else if odo_mg_l < MODERATE_RISK_ODO_MG_L {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    /// Like [`RiskLevel::classify`], but `None` for NaN or infinite input.
    pub fn try_from_odo(odo_mg_l: f64) -> Option<RiskLevel> {
        odo_mg_l.is_finite().then(|| RiskLevel::classify(odo_mg_l))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Overall severity of a set of classified rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Urgent,
    Advisory,
    AllClear,
}

impl Severity {
    pub fn message(self) -> &'static str {
        match self {
            Severity::Urgent => {
                "Areas with High Risk of Fish Kill detected. Immediate action recommended."
            }
            Severity::Advisory => {
                "Areas with Moderate Risk of Fish Kill detected. Monitoring required."
            }
            Severity::AllClear => "All areas show Low Risk of Fish Kill.",
        }
    }
}

/// Per-level counts for a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RiskSummary {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    /// Rows that could not be classified (no finite prediction).
    pub unclassified: usize,
}

impl RiskSummary {
    pub fn from_levels<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Option<RiskLevel>>,
    {
        let mut summary = RiskSummary::default();
        for level in levels {
            match level {
                Some(RiskLevel::Low) => summary.low += 1,
                Some(RiskLevel::Moderate) => summary.moderate += 1,
                Some(RiskLevel::High) => summary.high += 1,
                None => summary.unclassified += 1,
            }
        }
        summary
    }

    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Moderate => self.moderate,
            RiskLevel::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.moderate + self.high + self.unclassified
    }

    /// High anywhere is urgent, otherwise Moderate anywhere is an advisory,
    /// otherwise all clear (including when nothing was classified).
    pub fn severity(&self) -> Severity {
        if self.high > 0 {
            Severity::Urgent
        } else if self.moderate > 0 {
            Severity::Advisory
        } else {
            Severity::AllClear
        }
    }
}

/// Counts of zones meeting each critical water-quality condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CriticalConditions {
    /// Predicted ODO below 4 mg/L.
    pub low_oxygen: usize,
    /// Predicted temperature above 30 °C.
    pub high_temperature: usize,
    /// Predicted pH below 6.5.
    pub low_ph: usize,
    /// Zones meeting at least one of the above.
    pub at_risk_zones: usize,
}

impl CriticalConditions {
    /// Tally conditions over `(odo, temperature, ph)` predictions; a missing
    /// value never meets its condition.
    pub fn tally<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Option<f64>, Option<f64>, Option<f64>)>,
    {
        let mut counts = CriticalConditions::default();
        for (odo, temp, ph) in rows {
            let low_oxygen = odo.is_some_and(|v| v < HIGH_RISK_ODO_MG_L);
            let high_temperature = temp.is_some_and(|v| v > CRITICAL_TEMP_C);
            let low_ph = ph.is_some_and(|v| v < CRITICAL_PH);

            counts.low_oxygen += usize::from(low_oxygen);
            counts.high_temperature += usize::from(high_temperature);
            counts.low_ph += usize::from(low_ph);
            counts.at_risk_zones += usize::from(low_oxygen || high_temperature || low_ph);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(RiskLevel::classify(3.9), RiskLevel::High);
        assert_eq!(RiskLevel::classify(4.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(5.999), RiskLevel::Moderate);
        assert_eq!(RiskLevel::classify(6.0), RiskLevel::Low);
    }

    #[test]
    fn test_classify_extremes() {
        assert_eq!(RiskLevel::classify(-1.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(0.0), RiskLevel::High);
        assert_eq!(RiskLevel::classify(14.6), RiskLevel::Low);
    }

    #[test]
    fn test_classify_matches_threshold_definition_over_a_sweep() {
        for step in 0..=1200 {
            let v = step as f64 / 100.0;
            let level = RiskLevel::classify(v);
            assert_eq!(level == RiskLevel::High, v < 4.0, "v={v}");
            assert_eq!(level == RiskLevel::Moderate, (4.0..6.0).contains(&v), "v={v}");
            assert_eq!(level == RiskLevel::Low, v >= 6.0, "v={v}");
        }
    }

    #[test]
    fn test_try_from_odo_rejects_non_finite() {
        assert_eq!(RiskLevel::try_from_odo(f64::NAN), None);
        assert_eq!(RiskLevel::try_from_odo(f64::INFINITY), None);
        assert_eq!(RiskLevel::try_from_odo(f64::NEG_INFINITY), None);
        assert_eq!(RiskLevel::try_from_odo(5.0), Some(RiskLevel::Moderate));
    }

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert_eq!(RiskLevel::High.to_string(), "High");
    }

    #[test]
    fn test_summary_counts_and_severity() {
        let summary = RiskSummary::from_levels(vec![
            Some(RiskLevel::Low),
            Some(RiskLevel::High),
            Some(RiskLevel::Moderate),
            Some(RiskLevel::Low),
            None,
        ]);
        assert_eq!(summary.count(RiskLevel::Low), 2);
        assert_eq!(summary.moderate, 1);
        assert_eq!(summary.high, 1);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.severity(), Severity::Urgent);
    }

    #[test]
    fn test_severity_advisory_and_all_clear() {
        let advisory = RiskSummary::from_levels(vec![Some(RiskLevel::Moderate), Some(RiskLevel::Low)]);
        assert_eq!(advisory.severity(), Severity::Advisory);
        assert!(advisory.severity().message().contains("Monitoring required"));

        let clear = RiskSummary::from_levels(vec![Some(RiskLevel::Low)]);
        assert_eq!(clear.severity(), Severity::AllClear);

        let empty = RiskSummary::from_levels(Vec::new());
        assert_eq!(empty.severity(), Severity::AllClear);
        assert_eq!(empty.severity().message(), "All areas show Low Risk of Fish Kill.");
    }

    #[test]
    fn test_critical_conditions_tally() {
        let counts = CriticalConditions::tally(vec![
            (Some(3.5), Some(31.0), Some(6.0)),
            (Some(7.0), Some(25.0), Some(8.0)),
            (Some(8.0), Some(30.0), Some(6.5)),
            (None, Some(32.0), None),
        ]);
        assert_eq!(counts.low_oxygen, 1);
        assert_eq!(counts.high_temperature, 2);
        assert_eq!(counts.low_ph, 1);
        assert_eq!(counts.at_risk_zones, 2);
    }
}
