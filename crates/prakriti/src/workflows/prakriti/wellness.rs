use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::UserId;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 10;
pub const DEFAULT_LEVEL: u8 = 5;

fn default_level() -> u8 {
    DEFAULT_LEVEL
}

/// Self-reported check-in as submitted by a user. Sleep, stress, and
/// digestion default to the middle of the scale when left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntryInput {
    pub weight_kg: f64,
    pub energy_level: u8,
    #[serde(default = "default_level")]
    pub sleep_quality: u8,
    #[serde(default = "default_level")]
    pub stress_level: u8,
    #[serde(default = "default_level")]
    pub digestive_health: u8,
    #[serde(default)]
    pub notes: String,
}

/// A validated, timestamped wellness check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub weight_kg: f64,
    pub energy_level: u8,
    pub sleep_quality: u8,
    pub stress_level: u8,
    pub digestive_health: u8,
    pub notes: String,
    pub recorded_at: DateTime<Utc>,
}

impl ProgressEntry {
    pub fn from_input(
        input: ProgressEntryInput,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ProgressEntryError> {
        if !input.weight_kg.is_finite() || input.weight_kg <= 0.0 {
            return Err(ProgressEntryError::InvalidWeight {
                value: input.weight_kg,
            });
        }

        let levels = [
            (WellnessMetric::Energy, input.energy_level),
            (WellnessMetric::Sleep, input.sleep_quality),
            (WellnessMetric::Stress, input.stress_level),
            (WellnessMetric::Digestion, input.digestive_health),
        ];
        if let Some((metric, value)) = levels
            .into_iter()
            .find(|(_, value)| !(MIN_LEVEL..=MAX_LEVEL).contains(value))
        {
            return Err(ProgressEntryError::LevelOutOfRange { metric, value });
        }

        Ok(Self {
            weight_kg: input.weight_kg,
            energy_level: input.energy_level,
            sleep_quality: input.sleep_quality,
            stress_level: input.stress_level,
            digestive_health: input.digestive_health,
            notes: input.notes.trim().to_string(),
            recorded_at,
        })
    }

    pub fn value(&self, metric: WellnessMetric) -> f64 {
        match metric {
            WellnessMetric::Weight => self.weight_kg,
            WellnessMetric::Energy => f64::from(self.energy_level),
            WellnessMetric::Sleep => f64::from(self.sleep_quality),
            WellnessMetric::Stress => f64::from(self.stress_level),
            WellnessMetric::Digestion => f64::from(self.digestive_health),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WellnessMetric {
    Weight,
    Energy,
    Sleep,
    Stress,
    Digestion,
}

impl WellnessMetric {
    pub fn ordered() -> [WellnessMetric; 5] {
        [
            WellnessMetric::Weight,
            WellnessMetric::Energy,
            WellnessMetric::Sleep,
            WellnessMetric::Stress,
            WellnessMetric::Digestion,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            WellnessMetric::Weight => "weight",
            WellnessMetric::Energy => "energy level",
            WellnessMetric::Sleep => "sleep quality",
            WellnessMetric::Stress => "stress level",
            WellnessMetric::Digestion => "digestive health",
        }
    }

    /// Weight loss and falling stress count as improvement.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, WellnessMetric::Weight | WellnessMetric::Stress)
    }
}

impl fmt::Display for WellnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Change between the two most recent check-ins for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub metric: WellnessMetric,
    pub previous: f64,
    pub latest: f64,
    pub change: f64,
    /// Absolute change relative to the previous value, to one decimal.
    pub percent_change: f64,
    pub improving: bool,
}

/// Compare the latest entry against the one before it. Fewer than two
/// entries yields no trends, and a metric whose previous value is zero is
/// skipped.
pub fn metric_trends(entries: &[ProgressEntry]) -> Vec<MetricTrend> {
    if entries.len() < 2 {
        return Vec::new();
    }

    let mut ordered: Vec<&ProgressEntry> = entries.iter().collect();
    ordered.sort_by_key(|entry| entry.recorded_at);
    let latest = ordered[ordered.len() - 1];
    let previous = ordered[ordered.len() - 2];

    WellnessMetric::ordered()
        .into_iter()
        .filter_map(|metric| {
            let before = previous.value(metric);
            let after = latest.value(metric);
            if before == 0.0 || after == 0.0 {
                return None;
            }

            let change = after - before;
            let improving = if metric.lower_is_better() {
                change < 0.0
            } else {
                change > 0.0
            };
            Some(MetricTrend {
                metric,
                previous: before,
                latest: after,
                change,
                percent_change: ((change / before * 100.0).abs() * 10.0).round() / 10.0,
                improving,
            })
        })
        .collect()
}

/// A user's check-ins in recording order with trends for the latest pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressHistory {
    pub user_id: UserId,
    pub entries: Vec<ProgressEntry>,
    pub trends: Vec<MetricTrend>,
}

impl ProgressHistory {
    pub fn new(user_id: UserId, entries: Vec<ProgressEntry>) -> Self {
        let trends = metric_trends(&entries);
        Self {
            user_id,
            entries,
            trends,
        }
    }

    pub fn latest(&self) -> Option<&ProgressEntry> {
        self.entries.iter().max_by_key(|entry| entry.recorded_at)
    }

    pub fn trend(&self, metric: WellnessMetric) -> Option<&MetricTrend> {
        self.trends.iter().find(|trend| trend.metric == metric)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressEntryError {
    #[error("weight must be a positive number of kilograms (found {value})")]
    InvalidWeight { value: f64 },
    #[error("{metric} must be between 1 and 10 (found {value})")]
    LevelOutOfRange { metric: WellnessMetric, value: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn input(weight_kg: f64, energy_level: u8, stress_level: u8) -> ProgressEntryInput {
        ProgressEntryInput {
            weight_kg,
            energy_level,
            sleep_quality: DEFAULT_LEVEL,
            stress_level,
            digestive_health: DEFAULT_LEVEL,
            notes: String::new(),
        }
    }

    fn entry(weight_kg: f64, energy_level: u8, stress_level: u8, day: i64) -> ProgressEntry {
        let start = Utc
            .with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp");
        ProgressEntry::from_input(
            input(weight_kg, energy_level, stress_level),
            start + Duration::days(day),
        )
        .expect("valid entry")
    }

    #[test]
    fn omitted_levels_default_to_midpoint() {
        let input: ProgressEntryInput =
            serde_json::from_str(r#"{"weight_kg": 64.0, "energy_level": 7}"#).expect("parses");
        assert_eq!(input.sleep_quality, DEFAULT_LEVEL);
        assert_eq!(input.stress_level, DEFAULT_LEVEL);
        assert_eq!(input.digestive_health, DEFAULT_LEVEL);
        assert!(input.notes.is_empty());
    }

    #[test]
    fn entries_are_validated() {
        let now = Utc::now();
        assert_eq!(
            ProgressEntry::from_input(input(0.0, 5, 5), now),
            Err(ProgressEntryError::InvalidWeight { value: 0.0 })
        );
        let unreadable = ProgressEntry::from_input(input(f64::NAN, 5, 5), now);
        assert!(unreadable.is_err());
        assert_eq!(
            ProgressEntry::from_input(input(70.0, 5, 11), now),
            Err(ProgressEntryError::LevelOutOfRange {
                metric: WellnessMetric::Stress,
                value: 11,
            })
        );
        assert_eq!(
            ProgressEntry::from_input(input(70.0, 0, 5), now),
            Err(ProgressEntryError::LevelOutOfRange {
                metric: WellnessMetric::Energy,
                value: 0,
            })
        );
    }

    #[test]
    fn single_entry_has_no_trend() {
        assert!(metric_trends(&[entry(70.0, 5, 5, 0)]).is_empty());
        assert!(metric_trends(&[]).is_empty());
    }

    #[test]
    fn trends_compare_the_two_latest_entries() {
        // recorded out of order: day 3 is the latest, day 1 the previous
        let entries = vec![
            entry(72.5, 5, 6, 1),
            entry(70.0, 7, 4, 3),
            entry(80.0, 2, 9, 0),
        ];
        let history = ProgressHistory::new(UserId("patient-1".to_string()), entries);

        let weight = history.trend(WellnessMetric::Weight).expect("weight trend");
        assert_eq!(weight.change, -2.5);
        assert_eq!(weight.percent_change, 3.4);
        assert!(weight.improving);

        let energy = history.trend(WellnessMetric::Energy).expect("energy trend");
        assert_eq!(energy.percent_change, 40.0);
        assert!(energy.improving);

        let stress = history.trend(WellnessMetric::Stress).expect("stress trend");
        assert_eq!(stress.change, -2.0);
        assert_eq!(stress.percent_change, 33.3);
        assert!(stress.improving);

        let sleep = history.trend(WellnessMetric::Sleep).expect("sleep trend");
        assert_eq!(sleep.change, 0.0);
        assert!(!sleep.improving);

        assert_eq!(history.latest().map(|entry| entry.weight_kg), Some(70.0));
    }

    #[test]
    fn rising_weight_is_not_improvement() {
        let trends = metric_trends(&[entry(60.0, 5, 5, 0), entry(61.5, 5, 5, 1)]);
        let weight = trends
            .iter()
            .find(|trend| trend.metric == WellnessMetric::Weight)
            .expect("weight trend");
        assert!(!weight.improving);
        assert_eq!(weight.percent_change, 2.5);
    }
}
