use crate::domain::models::{Goal, MentalEntry, PhysicalEntry};
use crate::domain::summary::round_to;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DASHBOARD_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthMetric {
    pub label: String,
    pub value: f64,
    pub unit: String,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoalProgress {
    pub id: uuid::Uuid,
    pub title: String,
    pub progress: u8,
    pub completed: bool,
}

pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

impl Dated for PhysicalEntry {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Dated for MentalEntry {
    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Entries strictly newer than `now - days`, sorted oldest first.
pub fn recent<T: Dated>(entries: &[T], days: i64, now: DateTime<Utc>) -> Vec<&T> {
    let cutoff = now - Duration::days(days);
    let mut out: Vec<&T> = entries.iter().filter(|e| e.date() > cutoff).collect();
    out.sort_by_key(|e| e.date());
    out
}

/// Mean rounded to one decimal; 0 when there is nothing to average.
pub fn average_metric(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round_to(values.iter().sum::<f64>() / values.len() as f64, 1)
}

/// Compares the first and second halves of a date-ordered series. Changes
/// under 5% of the first-half average count as stable.
pub fn trend(values: &[f64]) -> Trend {
    let n = values.len();
    if n < 2 {
        return Trend::Stable;
    }

    let first = &values[..n.div_ceil(2)];
    let second = &values[n / 2..];
    let first_avg = first.iter().sum::<f64>() / first.len() as f64;
    let second_avg = second.iter().sum::<f64>() / second.len() as f64;

    let difference = (second_avg - first_avg).abs();
    if difference < first_avg * 0.05 {
        Trend::Stable
    } else if second_avg > first_avg {
        Trend::Up
    } else {
        Trend::Down
    }
}

pub fn bmi(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let meters = height_cm / 100.0;
    Some(round_to(weight_kg / (meters * meters), 1))
}

pub fn bmi_category(bmi: f64) -> &'static str {
    if bmi < 18.5 {
        "Underweight"
    } else if bmi < 25.0 {
        "Normal weight"
    } else if bmi < 30.0 {
        "Overweight"
    } else {
        "Obese"
    }
}

/// Percentage toward the target, clamped to 0..=100.
pub fn goal_progress(current: f64, target: f64) -> u8 {
    if target <= 0.0 || !current.is_finite() {
        return 0;
    }
    (current / target * 100.0).round().clamp(0.0, 100.0) as u8
}

pub fn goals_progress(goals: &[Goal]) -> Vec<GoalProgress> {
    goals
        .iter()
        .map(|g| GoalProgress {
            id: g.id,
            title: g.title.clone(),
            progress: if g.completed {
                100
            } else {
                goal_progress(g.current_value, g.target_value)
            },
            completed: g.completed,
        })
        .collect()
}

pub fn dashboard_metrics(
    physical: &[PhysicalEntry],
    mental: &[MentalEntry],
    now: DateTime<Utc>,
) -> Vec<HealthMetric> {
    let physical = recent(physical, DASHBOARD_WINDOW_DAYS, now);
    let mental = recent(mental, DASHBOARD_WINDOW_DAYS, now);

    let heart_rate: Vec<f64> = physical.iter().filter_map(|e| e.heart_rate).collect();
    let sleep_quality: Vec<f64> = physical
        .iter()
        .filter_map(|e| e.sleep_quality.map(f64::from))
        .collect();
    let steps: Vec<f64> = physical
        .iter()
        .filter_map(|e| e.steps.map(f64::from))
        .collect();
    let mood: Vec<f64> = mental.iter().filter_map(|e| e.mood.map(f64::from)).collect();
    let stress: Vec<f64> = mental
        .iter()
        .filter_map(|e| e.stress_level.map(f64::from))
        .collect();
    let energy: Vec<f64> = mental
        .iter()
        .filter_map(|e| e.energy_level.map(f64::from))
        .collect();

    [
        ("Average Heart Rate", heart_rate, "bpm"),
        ("Sleep Quality", sleep_quality, "/5"),
        ("Daily Steps", steps, "steps"),
        ("Mood Score", mood, "/5"),
        ("Stress Level", stress, "/5"),
        ("Energy Level", energy, "/5"),
    ]
    .into_iter()
    .map(|(label, values, unit)| HealthMetric {
        label: label.to_string(),
        value: average_metric(&values),
        unit: unit.to_string(),
        trend: trend(&values),
    })
    .collect()
}
