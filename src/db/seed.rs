use crate::db;
use crate::domain::models::{
    ExerciseIntensity, GoalCategory, NewGoal, NewMentalEntry, NewPhysicalEntry, ProfileInput,
};
use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, DurationRound, Utc};
use rand::Rng;
use rand_core::OsRng;
use sqlx::PgPool;

pub const DEMO_EMAIL: &str = "seed.user@example.com";
const DEMO_PASSWORD: &str = "demo-password";
const DEMO_DAYS: i64 = 14;

/// Creates a demo account with two weeks of entries. Skipped when any user exists.
pub async fn seed_demo(pool: &PgPool) -> Result<()> {
    if db::count_users(pool).await? > 0 {
        tracing::info!("Seed skipped (data already present)");
        return Ok(());
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(DEMO_PASSWORD.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash demo password: {e}"))?
        .to_string();

    let Some(user) = db::create_user(pool, DEMO_EMAIL, "Seed User", &hash).await? else {
        return Ok(());
    };

    db::upsert_profile(
        pool,
        user.id,
        &ProfileInput {
            age: 35,
            gender: "other".to_string(),
            height: 170.0,
            weight: 70.0,
        },
    )
    .await?;

    let today_noon = Utc::now().duration_trunc(Duration::days(1))? + Duration::hours(12);
    let (physical, mental) = demo_entries(today_noon);

    for entry in &physical {
        db::insert_physical_entry(pool, user.id, entry).await?;
    }
    for entry in &mental {
        db::insert_mental_entry(pool, user.id, entry).await?;
    }

    db::insert_goal(
        pool,
        user.id,
        &NewGoal {
            title: "10k steps".to_string(),
            description: "Daily step target".to_string(),
            category: GoalCategory::Physical,
            target_value: 10000.0,
            current_value: 8000.0,
            unit: "steps".to_string(),
            target_date: Some(today_noon.date_naive() + Duration::days(30)),
            completed: false,
        },
    )
    .await?;

    tracing::info!(
        "Seeded demo user {} ({} days of entries)",
        user.id,
        DEMO_DAYS
    );
    Ok(())
}

fn demo_entries(today_noon: DateTime<Utc>) -> (Vec<NewPhysicalEntry>, Vec<NewMentalEntry>) {
    let mut rng = rand::thread_rng();
    let mut physical = Vec::new();
    let mut mental = Vec::new();

    for offset in (0..DEMO_DAYS).rev() {
        let date = today_noon - Duration::days(offset);
        let exercise = rng.gen_range(0..60_i32);
        physical.push(NewPhysicalEntry {
            date,
            heart_rate: Some(rng.gen_range(58.0..72.0_f64).round()),
            blood_pressure_systolic: Some(rng.gen_range(110..125)),
            blood_pressure_diastolic: Some(rng.gen_range(70..82)),
            weight: Some(one_decimal(70.0 + rng.gen_range(-0.8..0.8))),
            sleep_hours: Some(one_decimal(rng.gen_range(5.5..8.5))),
            sleep_quality: Some(rng.gen_range(2..=5)),
            exercise_minutes: Some(f64::from(exercise)),
            exercise_type: (exercise > 0).then(|| "walking".to_string()),
            exercise_intensity: (exercise > 0).then(|| {
                if exercise >= 40 {
                    ExerciseIntensity::High
                } else if exercise >= 20 {
                    ExerciseIntensity::Moderate
                } else {
                    ExerciseIntensity::Low
                }
            }),
            steps: Some(rng.gen_range(4000..12000)),
            water_intake: Some(one_decimal(rng.gen_range(1.2..2.8))),
            notes: None,
        });
        mental.push(NewMentalEntry {
            date,
            mood: Some(rng.gen_range(2..=5)),
            stress_level: Some(rng.gen_range(1..=4)),
            anxiety_level: Some(rng.gen_range(1..=3)),
            energy_level: Some(rng.gen_range(2..=5)),
            meditation_minutes: Some(f64::from(rng.gen_range(0..20_i32))),
            journaling_done: rng.gen_bool(0.4),
            social_connection: Some(rng.gen_range(2..=5)),
            gratitude_practice: rng.gen_bool(0.3),
            notes: None,
        });
    }

    (physical, mental)
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_entries_are_valid() {
        let noon = Utc::now().duration_trunc(Duration::days(1)).unwrap() + Duration::hours(12);
        let (physical, mental) = demo_entries(noon);
        assert_eq!(physical.len(), DEMO_DAYS as usize);
        assert_eq!(mental.len(), DEMO_DAYS as usize);
        assert!(physical.iter().all(|e| e.validate().is_ok()));
        assert!(mental.iter().all(|e| e.validate().is_ok()));
        assert_eq!(physical.last().map(|e| e.date), Some(noon));
    }
}
