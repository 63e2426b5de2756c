use crate::domain::models::{MentalEntry, PhysicalEntry};

const PHYSICAL_HEADERS: [&str; 14] = [
    "date",
    "heartRate",
    "bloodPressureSystolic",
    "bloodPressureDiastolic",
    "weight",
    "sleepHours",
    "sleepQuality",
    "exerciseMinutes",
    "exerciseType",
    "exerciseIntensity",
    "steps",
    "waterIntake",
    "notes",
    "createdAt",
];

const MENTAL_HEADERS: [&str; 11] = [
    "date",
    "mood",
    "stressLevel",
    "anxietyLevel",
    "energyLevel",
    "meditationMinutes",
    "journalingDone",
    "socialConnection",
    "gratitudePractice",
    "notes",
    "createdAt",
];

pub fn physical_csv(entries: &[PhysicalEntry]) -> String {
    let mut lines = vec![csv_row(PHYSICAL_HEADERS.iter().map(|h| h.to_string()))];
    lines.extend(entries.iter().map(|e| {
        csv_row([
            e.date.to_rfc3339(),
            cell(e.heart_rate),
            cell(e.blood_pressure_systolic),
            cell(e.blood_pressure_diastolic),
            cell(e.weight),
            cell(e.sleep_hours),
            cell(e.sleep_quality),
            cell(e.exercise_minutes),
            e.exercise_type.clone().unwrap_or_default(),
            cell(e.exercise_intensity.map(|i| i.as_str())),
            cell(e.steps),
            cell(e.water_intake),
            e.notes.clone().unwrap_or_default(),
            e.created_at.to_rfc3339(),
        ])
    }));
    lines.join("\n")
}

pub fn mental_csv(entries: &[MentalEntry]) -> String {
    let mut lines = vec![csv_row(MENTAL_HEADERS.iter().map(|h| h.to_string()))];
    lines.extend(entries.iter().map(|e| {
        csv_row([
            e.date.to_rfc3339(),
            cell(e.mood),
            cell(e.stress_level),
            cell(e.anxiety_level),
            cell(e.energy_level),
            cell(e.meditation_minutes),
            flag(e.journaling_done),
            cell(e.social_connection),
            flag(e.gratitude_practice),
            e.notes.clone().unwrap_or_default(),
            e.created_at.to_rfc3339(),
        ])
    }));
    lines.join("\n")
}

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> String {
    let s = if value { "1" } else { "0" };
    s.to_string()
}

fn csv_row(values: impl IntoIterator<Item = String>) -> String {
    values
        .into_iter()
        .map(|v| {
            if v.contains(&[',', '"', '\n'][..]) {
                format!("\"{}\"", v.replace('"', "\"\""))
            } else {
                v
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ExerciseIntensity;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_csv_row_escaping() {
        let row = csv_row(["plain".into(), "a,b".into(), "say \"hi\"".into(), "".into()]);
        assert_eq!(row, "plain,\"a,b\",\"say \"\"hi\"\"\",");
    }

    #[test]
    fn test_mental_csv() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entry = MentalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date,
            mood: Some(4),
            stress_level: None,
            anxiety_level: Some(2),
            energy_level: Some(3),
            meditation_minutes: Some(12.5),
            journaling_done: true,
            social_connection: Some(5),
            gratitude_practice: false,
            notes: Some("calm,\nfocused".into()),
            created_at: date,
        };

        let csv = mental_csv(&[entry]);
        let (header, body) = csv.split_once('\n').unwrap();
        assert_eq!(
            header,
            "date,mood,stressLevel,anxietyLevel,energyLevel,meditationMinutes,journalingDone,\
             socialConnection,gratitudePractice,notes,createdAt"
        );
        assert_eq!(
            body,
            "2024-03-01T12:00:00+00:00,4,,2,3,12.5,1,5,0,\"calm,\nfocused\",2024-03-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_physical_csv() {
        let date = Utc.with_ymd_and_hms(2024, 3, 2, 7, 30, 0).unwrap();
        let entry = PhysicalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            date,
            heart_rate: Some(64.0),
            blood_pressure_systolic: Some(118),
            blood_pressure_diastolic: None,
            weight: Some(70.4),
            sleep_hours: Some(7.5),
            sleep_quality: Some(4),
            exercise_minutes: Some(30.0),
            exercise_type: Some("cycling, indoor".into()),
            exercise_intensity: Some(ExerciseIntensity::Moderate),
            steps: Some(8421),
            water_intake: None,
            notes: None,
            created_at: date,
        };

        let csv = physical_csv(&[entry]);
        let (header, body) = csv.split_once('\n').unwrap();
        assert_eq!(
            header,
            "date,heartRate,bloodPressureSystolic,bloodPressureDiastolic,weight,sleepHours,\
             sleepQuality,exerciseMinutes,exerciseType,exerciseIntensity,steps,waterIntake,\
             notes,createdAt"
        );
        assert_eq!(
            body,
            "2024-03-02T07:30:00+00:00,64,118,,70.4,7.5,4,30,\"cycling, indoor\",moderate,8421,,,\
             2024-03-02T07:30:00+00:00"
        );
    }

    #[test]
    fn test_empty_physical_csv_is_header_only() {
        assert_eq!(physical_csv(&[]), PHYSICAL_HEADERS.join(","));
    }
}
