use crate::domain::models::{MentalReading, PhysicalReading};
use serde::{Deserialize, Serialize};

/// `{average, min, max}` reduction of one metric.
///
/// `average` is rounded to 2 decimal places (half away from zero), `min`/`max`
/// are exact. Non-finite values are ignored; an empty input summarizes to all
/// zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    #[serde(rename = "avg")]
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

pub fn summarize(values: &[f64]) -> NumericSummary {
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return NumericSummary::default();
    }

    // Dividing each term first keeps the sum finite near f64::MAX.
    let n = values.len() as f64;
    let mean: f64 = values.iter().map(|v| v / n).sum();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    NumericSummary {
        average: round_to(mean, 2).clamp(min, max),
        min,
        max,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalSummary {
    pub heart_rate: NumericSummary,
    pub sleep_hours: NumericSummary,
    pub exercise_minutes: NumericSummary,
    pub weight: NumericSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentalSummary {
    pub mood: NumericSummary,
    pub stress_level: NumericSummary,
    pub energy_level: NumericSummary,
    pub meditation_minutes: NumericSummary,
}

pub fn summarize_physical(readings: &[PhysicalReading]) -> PhysicalSummary {
    PhysicalSummary {
        heart_rate: summarize_field(readings, |r| r.heart_rate),
        sleep_hours: summarize_field(readings, |r| r.sleep_hours),
        exercise_minutes: summarize_field(readings, |r| r.exercise_minutes),
        weight: summarize_field(readings, |r| r.weight),
    }
}

pub fn summarize_mental(readings: &[MentalReading]) -> MentalSummary {
    MentalSummary {
        mood: summarize_field(readings, |r| r.mood),
        stress_level: summarize_field(readings, |r| r.stress_level),
        energy_level: summarize_field(readings, |r| r.energy_level),
        meditation_minutes: summarize_field(readings, |r| r.meditation_minutes),
    }
}

// Absent readings are skipped, not counted as zero.
fn summarize_field<T>(readings: &[T], field: impl Fn(&T) -> Option<f64>) -> NumericSummary {
    let values: Vec<f64> = readings.iter().filter_map(field).collect();
    summarize(&values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_all_zero() {
        let s = summarize(&[]);
        assert_eq!(s.average, 0.0);
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 0.0);
    }

    #[test]
    fn test_single_value() {
        let s = summarize(&[7.25]);
        assert_eq!(s, NumericSummary { average: 7.25, min: 7.25, max: 7.25 });
    }

    #[test]
    fn test_average_is_rounded_but_bounds_are_exact() {
        let s = summarize(&[1.0, 2.0, 2.0]);
        assert_eq!(s.average, 1.67);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 2.0);

        let s = summarize(&[60.123, 70.456]);
        assert_eq!(s.min, 60.123);
        assert_eq!(s.max, 70.456);
    }

    #[test]
    fn test_average_between_min_and_max() {
        let samples: [&[f64]; 7] = [
            &[3.0, 9.0, 1.0],
            &[-2.5, 4.0],
            &[0.1, 0.2, 0.3, 0.4],
            &[72.0, 64.0, 80.0, 58.0, 91.0],
            &[1e308, 1e308],
            &[f64::MAX, f64::MAX, 1.0],
            &[0.001, 0.001],
        ];
        for values in samples {
            let s = summarize(values);
            assert!(s.average.is_finite(), "{values:?} -> {s:?}");
            assert!(s.min <= s.average && s.average <= s.max, "{values:?} -> {s:?}");
        }
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        assert_eq!(summarize(&[f64::NAN]), NumericSummary::default());
        let s = summarize(&[f64::INFINITY, 4.0, f64::NAN, 6.0]);
        assert_eq!(s, NumericSummary { average: 5.0, min: 4.0, max: 6.0 });
    }

    #[test]
    fn test_huge_values_serialize_as_numbers() {
        let s = summarize(&[1e308, 1e308]);
        assert_eq!(s.average, 1e308);
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json["avg"], serde_json::json!(1e308));
    }

    #[test]
    fn test_bundle_skips_missing_readings() {
        let readings = vec![
            PhysicalReading {
                sleep_hours: Some(6.0),
                heart_rate: Some(60.0),
                ..Default::default()
            },
            PhysicalReading {
                sleep_hours: Some(8.0),
                ..Default::default()
            },
        ];
        let summary = summarize_physical(&readings);
        assert_eq!(summary.sleep_hours.average, 7.0);
        assert_eq!(summary.heart_rate, NumericSummary { average: 60.0, min: 60.0, max: 60.0 });
        assert_eq!(summary.weight, NumericSummary::default());

        let mental = summarize_mental(&[MentalReading {
            mood: Some(2.0),
            ..Default::default()
        }]);
        assert_eq!(mental.mood.average, 2.0);
        assert_eq!(mental.stress_level.average, 0.0);
    }

    #[test]
    fn test_serializes_average_as_avg() {
        let json = serde_json::to_value(summarize(&[6.0, 7.0])).unwrap();
        assert_eq!(json, serde_json::json!({ "avg": 6.5, "min": 6.0, "max": 7.0 }));

        let bundle = serde_json::to_value(PhysicalSummary::default()).unwrap();
        assert!(bundle.get("sleepHours").is_some());
        assert!(bundle.get("exerciseMinutes").is_some());
    }
}
