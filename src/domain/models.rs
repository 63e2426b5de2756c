use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "goal_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GoalCategory {
    Physical,
    Mental,
    Both,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "exercise_intensity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExerciseIntensity {
    Low,
    Moderate,
    High,
}

impl ExerciseIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseIntensity::Low => "low",
            ExerciseIntensity::Moderate => "moderate",
            ExerciseIntensity::High => "high",
        }
    }
}

// ============================================
// Persisted records
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub age: i32,
    pub gender: String,
    pub height: f64,
    pub weight: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub heart_rate: Option<f64>,
    pub blood_pressure_systolic: Option<i32>,
    pub blood_pressure_diastolic: Option<i32>,
    pub weight: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<i16>,
    pub exercise_minutes: Option<f64>,
    pub exercise_type: Option<String>,
    pub exercise_intensity: Option<ExerciseIntensity>,
    pub steps: Option<i32>,
    pub water_intake: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MentalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: DateTime<Utc>,
    pub mood: Option<i16>,
    pub stress_level: Option<i16>,
    pub anxiety_level: Option<i16>,
    pub energy_level: Option<i16>,
    pub meditation_minutes: Option<f64>,
    pub journaling_done: bool,
    pub social_connection: Option<i16>,
    pub gratitude_practice: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub category: GoalCategory,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub target_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

// ============================================
// Inputs for persisted records
// ============================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileInput {
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    pub height: f64,
    pub weight: f64,
}

impl ProfileInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0..=130).contains(&self.age) {
            return Err(ValidationError::OutOfRange("age"));
        }
        if !(0.0..=300.0).contains(&self.height) {
            return Err(ValidationError::OutOfRange("height"));
        }
        if !(0.0..=500.0).contains(&self.weight) {
            return Err(ValidationError::OutOfRange("weight"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhysicalEntry {
    pub date: DateTime<Utc>,
    pub heart_rate: Option<f64>,
    pub blood_pressure_systolic: Option<i32>,
    pub blood_pressure_diastolic: Option<i32>,
    pub weight: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<i16>,
    pub exercise_minutes: Option<f64>,
    pub exercise_type: Option<String>,
    pub exercise_intensity: Option<ExerciseIntensity>,
    pub steps: Option<i32>,
    pub water_intake: Option<f64>,
    pub notes: Option<String>,
}

impl NewPhysicalEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_non_negative("heartRate", self.heart_rate)?;
        check_non_negative("weight", self.weight)?;
        check_non_negative("exerciseMinutes", self.exercise_minutes)?;
        check_non_negative("waterIntake", self.water_intake)?;
        if let Some(hours) = self.sleep_hours {
            if !(0.0..=24.0).contains(&hours) {
                return Err(ValidationError::OutOfRange("sleepHours"));
            }
        }
        check_scale("sleepQuality", self.sleep_quality)?;
        if self
            .exercise_type
            .as_deref()
            .is_some_and(|t| t.chars().count() > MAX_EXERCISE_TYPE_LEN)
        {
            return Err(ValidationError::OutOfRange("exerciseType"));
        }
        if self.steps.is_some_and(|s| s < 0) {
            return Err(ValidationError::OutOfRange("steps"));
        }
        if self.blood_pressure_systolic.is_some_and(|v| v < 0)
            || self.blood_pressure_diastolic.is_some_and(|v| v < 0)
        {
            return Err(ValidationError::OutOfRange("bloodPressure"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMentalEntry {
    pub date: DateTime<Utc>,
    pub mood: Option<i16>,
    pub stress_level: Option<i16>,
    pub anxiety_level: Option<i16>,
    pub energy_level: Option<i16>,
    pub meditation_minutes: Option<f64>,
    #[serde(default)]
    pub journaling_done: bool,
    pub social_connection: Option<i16>,
    #[serde(default)]
    pub gratitude_practice: bool,
    pub notes: Option<String>,
}

impl NewMentalEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_scale("mood", self.mood)?;
        check_scale("stressLevel", self.stress_level)?;
        check_scale("anxietyLevel", self.anxiety_level)?;
        check_scale("energyLevel", self.energy_level)?;
        check_scale("socialConnection", self.social_connection)?;
        check_non_negative("meditationMinutes", self.meditation_minutes)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: GoalCategory,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub unit: String,
    pub target_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
}

impl NewGoal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        if self.target_value <= 0.0 {
            return Err(ValidationError::OutOfRange("targetValue"));
        }
        check_non_negative("currentValue", Some(self.current_value))
    }
}

/// Partial update; absent fields keep their stored value. `targetDate: null`
/// clears the date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub id: Uuid,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<GoalCategory>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub target_date: Option<Option<NaiveDate>>,
    pub completed: Option<bool>,
}

impl GoalUpdate {
    pub fn apply(&self, goal: &mut Goal) -> Result<(), ValidationError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ValidationError::Empty("title"));
            }
            goal.title = title.clone();
        }
        if let Some(description) = &self.description {
            goal.description = description.clone();
        }
        if let Some(category) = self.category {
            goal.category = category;
        }
        if let Some(target) = self.target_value {
            if target <= 0.0 {
                return Err(ValidationError::OutOfRange("targetValue"));
            }
            goal.target_value = target;
        }
        if let Some(current) = self.current_value {
            check_non_negative("currentValue", Some(current))?;
            goal.current_value = current;
        }
        if let Some(unit) = &self.unit {
            goal.unit = unit.clone();
        }
        if let Some(target_date) = self.target_date {
            goal.target_date = target_date;
        }
        if let Some(completed) = self.completed {
            goal.completed = completed;
        }
        Ok(())
    }
}

const MAX_EXERCISE_TYPE_LEN: usize = 64;

fn check_scale(field: &'static str, value: Option<i16>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !(1..=5).contains(&v) => Err(ValidationError::OutOfRange(field)),
        _ => Ok(()),
    }
}

fn check_non_negative(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ValidationError::OutOfRange(field)),
        _ => Ok(()),
    }
}

// ============================================
// Insight request payload
// ============================================

/// Body of an insight request. Every numeric field keeps JSON numbers only;
/// strings, booleans and objects are treated as absent, never as 0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightPayload {
    #[serde(default)]
    pub profile: Option<ProfileReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub physical: Vec<PhysicalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mental: Vec<MentalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub goals: Vec<GoalReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileReading {
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub heart_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub sleep_hours: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub exercise_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MentalReading {
    #[serde(default, deserialize_with = "lenient_number")]
    pub mood: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub stress_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_level: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub meditation_minutes: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
}

/// Reduced goal as sent to the completion service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalReading {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub target_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl From<&Profile> for ProfileReading {
    fn from(p: &Profile) -> Self {
        Self {
            age: Some(p.age as f64),
            gender: Some(p.gender.clone()),
            height: Some(p.height),
            weight: Some(p.weight),
        }
    }
}

impl From<&PhysicalEntry> for PhysicalReading {
    fn from(e: &PhysicalEntry) -> Self {
        Self {
            heart_rate: e.heart_rate,
            sleep_hours: e.sleep_hours,
            exercise_minutes: e.exercise_minutes,
            weight: e.weight,
            date: Some(e.date.to_rfc3339()),
        }
    }
}

impl From<&MentalEntry> for MentalReading {
    fn from(e: &MentalEntry) -> Self {
        Self {
            mood: e.mood.map(f64::from),
            stress_level: e.stress_level.map(f64::from),
            energy_level: e.energy_level.map(f64::from),
            meditation_minutes: e.meditation_minutes,
            date: Some(e.date.to_rfc3339()),
        }
    }
}

impl From<&Goal> for GoalReading {
    fn from(g: &Goal) -> Self {
        Self {
            title: Some(g.title.clone()),
            completed: g.completed,
            target_value: Some(g.target_value),
            current_value: Some(g.current_value),
            unit: Some(g.unit.clone()),
        }
    }
}

/// Structured advice returned to the caller. Missing keys default to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsightResult {
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or(false))
}

/// Distinguishes an explicit `null` (`Some(None)`) from a missing key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_keeps_only_numbers() {
        let payload: InsightPayload = serde_json::from_value(json!({
            "physical": [
                { "heartRate": 70, "sleepHours": "8", "exerciseMinutes": null },
                { "heartRate": true, "sleepHours": 6.5, "weight": { "kg": 70 } }
            ],
            "mental": [{ "mood": 4, "stressLevel": "high" }]
        }))
        .unwrap();

        assert_eq!(payload.physical[0].heart_rate, Some(70.0));
        assert_eq!(payload.physical[0].sleep_hours, None);
        assert_eq!(payload.physical[0].exercise_minutes, None);
        assert_eq!(payload.physical[1].heart_rate, None);
        assert_eq!(payload.physical[1].sleep_hours, Some(6.5));
        assert_eq!(payload.physical[1].weight, None);
        assert_eq!(payload.mental[0].mood, Some(4.0));
        assert_eq!(payload.mental[0].stress_level, None);
        assert!(payload.goals.is_empty());
        assert!(payload.profile.is_none());
    }

    #[test]
    fn test_null_arrays_are_empty() {
        let payload: InsightPayload =
            serde_json::from_value(json!({ "physical": null, "goals": null })).unwrap();
        assert!(payload.physical.is_empty());
        assert!(payload.goals.is_empty());
    }

    #[test]
    fn test_non_array_is_rejected() {
        let result = serde_json::from_value::<InsightPayload>(json!({ "physical": 5 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_goal_reading_defaults_completed_to_false() {
        let goal: GoalReading = serde_json::from_value(json!({
            "title": "Walk", "completed": "yes", "targetValue": 10000, "unit": "steps"
        }))
        .unwrap();
        assert!(!goal.completed);
        assert_eq!(goal.target_value, Some(10000.0));
        assert_eq!(goal.current_value, None);

        let out = serde_json::to_value(&goal).unwrap();
        assert_eq!(
            out,
            json!({ "title": "Walk", "completed": false, "targetValue": 10000.0, "unit": "steps" })
        );

        let bare: GoalReading = serde_json::from_value(json!({ "title": null })).unwrap();
        assert_eq!(serde_json::to_value(&bare).unwrap(), json!({ "completed": false }));
    }

    #[test]
    fn test_insight_result_missing_keys_default() {
        let result: InsightResult = serde_json::from_str(r#"{"insights":["a"]}"#).unwrap();
        assert_eq!(result.insights, vec!["a"]);
        assert!(result.suggestions.is_empty());
        assert!(result.goals.is_empty());
    }

    #[test]
    fn test_mental_entry_validation() {
        let mut entry = NewMentalEntry {
            date: Utc::now(),
            mood: Some(3),
            stress_level: Some(6),
            anxiety_level: None,
            energy_level: None,
            meditation_minutes: Some(10.0),
            journaling_done: false,
            social_connection: Some(4),
            gratitude_practice: true,
            notes: None,
        };
        assert_eq!(entry.validate(), Err(ValidationError::OutOfRange("stressLevel")));
        entry.stress_level = Some(2);
        assert!(entry.validate().is_ok());
        entry.meditation_minutes = Some(-1.0);
        assert_eq!(entry.validate(), Err(ValidationError::OutOfRange("meditationMinutes")));
    }

    #[test]
    fn test_physical_entry_new_fields() {
        let mut entry: NewPhysicalEntry = serde_json::from_value(json!({
            "date": "2024-03-02T07:30:00Z",
            "exerciseMinutes": 30,
            "exerciseType": "cycling",
            "exerciseIntensity": "moderate"
        }))
        .unwrap();
        assert_eq!(entry.exercise_intensity, Some(ExerciseIntensity::Moderate));
        assert!(entry.validate().is_ok());

        entry.exercise_type = Some("x".repeat(MAX_EXERCISE_TYPE_LEN + 1));
        assert_eq!(entry.validate(), Err(ValidationError::OutOfRange("exerciseType")));

        let bad = serde_json::from_value::<NewPhysicalEntry>(json!({
            "date": "2024-03-02T07:30:00Z",
            "exerciseIntensity": "extreme"
        }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_social_connection_uses_five_point_scale() {
        let mut entry: NewMentalEntry = serde_json::from_value(json!({
            "date": "2024-03-02T07:30:00Z",
            "socialConnection": 5
        }))
        .unwrap();
        assert!(entry.validate().is_ok());
        entry.social_connection = Some(0);
        assert_eq!(entry.validate(), Err(ValidationError::OutOfRange("socialConnection")));
    }

    #[test]
    fn test_goal_update_keeps_unset_fields() {
        let mut goal = Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "10k steps".into(),
            description: "Daily step target".into(),
            category: GoalCategory::Physical,
            target_value: 10000.0,
            current_value: 8000.0,
            unit: "steps".into(),
            target_date: None,
            completed: false,
            created_at: Utc::now(),
        };
        let update: GoalUpdate = serde_json::from_value(json!({
            "id": goal.id, "currentValue": 10000, "completed": true
        }))
        .unwrap();
        update.apply(&mut goal).unwrap();
        assert_eq!(goal.current_value, 10000.0);
        assert!(goal.completed);
        assert_eq!(goal.title, "10k steps");

        let bad: GoalUpdate =
            serde_json::from_value(json!({ "id": goal.id, "targetValue": 0 })).unwrap();
        assert!(bad.apply(&mut goal).is_err());
    }

    #[test]
    fn test_goal_update_target_date() {
        let mut goal = Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Meditate".into(),
            description: String::new(),
            category: GoalCategory::Mental,
            target_value: 30.0,
            current_value: 5.0,
            unit: "days".into(),
            target_date: None,
            completed: false,
            created_at: Utc::now(),
        };
        let due = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        let set: GoalUpdate =
            serde_json::from_value(json!({ "id": goal.id, "targetDate": "2024-06-01" })).unwrap();
        set.apply(&mut goal).unwrap();
        assert_eq!(goal.target_date, Some(due));

        let untouched: GoalUpdate =
            serde_json::from_value(json!({ "id": goal.id, "title": "Meditate daily" })).unwrap();
        untouched.apply(&mut goal).unwrap();
        assert_eq!(goal.target_date, Some(due));

        let cleared: GoalUpdate =
            serde_json::from_value(json!({ "id": goal.id, "targetDate": null })).unwrap();
        assert_eq!(cleared.target_date, Some(None));
        cleared.apply(&mut goal).unwrap();
        assert_eq!(goal.target_date, None);
    }
}
