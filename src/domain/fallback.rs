use crate::domain::models::InsightResult;
use crate::domain::summary::{MentalSummary, PhysicalSummary};

const STEADY_INSIGHT: &str = "Your recent data looks steady.";
const DEFAULT_SUGGESTION: &str = "Drink water regularly and take stretch breaks.";

/// Offline advice used when the completion service refuses on quota.
///
/// Rules run in a fixed order (sleep, stress, exercise, mood) and each one only
/// fires for a nonzero average: a zero average means "no data" here.
pub fn generate_fallback(physical: &PhysicalSummary, mental: &MentalSummary) -> InsightResult {
    let mut insights = Vec::new();
    let mut suggestions = Vec::new();

    let sleep = physical.sleep_hours.average;
    if sleep != 0.0 && sleep < 7.0 {
        insights.push(format!("Average sleep is {sleep} h (below 7 h)."));
        suggestions.push("Aim for a consistent bedtime and wind-down routine.".to_string());
    }

    let stress = mental.stress_level.average;
    if stress != 0.0 && stress >= 3.0 {
        insights.push(format!("Stress level averages {stress}/5."));
        suggestions.push("Try a 5-minute breathing exercise today.".to_string());
    }

    let exercise = physical.exercise_minutes.average;
    if exercise != 0.0 && exercise < 20.0 {
        insights.push(format!("Exercise averages {exercise} min/day."));
        suggestions.push("Take a 10–15 minute walk to get moving.".to_string());
    }

    let mood = mental.mood.average;
    if mood != 0.0 && mood < 3.0 {
        insights.push(format!("Mood averages {mood}/5."));
        suggestions.push("Do one enjoyable, low-effort activity you like.".to_string());
    }

    if insights.is_empty() {
        insights.push(STEADY_INSIGHT.to_string());
    }
    if suggestions.is_empty() {
        suggestions.push(DEFAULT_SUGGESTION.to_string());
    }

    InsightResult {
        insights,
        suggestions,
        goals: Vec::new(),
    }
}
