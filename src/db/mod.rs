pub mod seed;

use crate::domain::models::{
    Goal, MentalEntry, NewGoal, NewMentalEntry, NewPhysicalEntry, PhysicalEntry, Profile,
    ProfileInput,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub hash: String,
    pub created_at: DateTime<Utc>,
}

const PHYSICAL_COLUMNS: &str = r#"
    id, user_id, date, heart_rate, blood_pressure_systolic, blood_pressure_diastolic,
    weight, sleep_hours, sleep_quality, exercise_minutes, exercise_type, exercise_intensity,
    steps, water_intake, notes, created_at
"#;

const MENTAL_COLUMNS: &str = r#"
    id, user_id, date, mood, stress_level, anxiety_level, energy_level,
    meditation_minutes, journaling_done, social_connection, gratitude_practice, notes, created_at
"#;

const GOAL_COLUMNS: &str = r#"
    id, user_id, title, description, category, target_value, current_value,
    unit, target_date, completed, created_at
"#;

// ============================================
// Users
// ============================================

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, name, hash, created_at
        FROM users
        WHERE lower(email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT id, email, name, hash, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Returns `None` when the email is already registered.
pub async fn create_user(pool: &PgPool, email: &str, name: &str, hash: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (id, email, name, hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, name, hash, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(hash)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count_users(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

// ============================================
// Profile
// ============================================

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT user_id, age, gender, height, weight, updated_at
        FROM profiles
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(profile)
}

pub async fn upsert_profile(pool: &PgPool, user_id: Uuid, input: &ProfileInput) -> Result<Profile> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (user_id, age, gender, height, weight, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        ON CONFLICT (user_id) DO UPDATE
        SET age = EXCLUDED.age,
            gender = EXCLUDED.gender,
            height = EXCLUDED.height,
            weight = EXCLUDED.weight,
            updated_at = NOW()
        RETURNING user_id, age, gender, height, weight, updated_at
        "#,
    )
    .bind(user_id)
    .bind(input.age)
    .bind(&input.gender)
    .bind(input.height)
    .bind(input.weight)
    .fetch_one(pool)
    .await?;
    Ok(profile)
}

// ============================================
// Entries
// ============================================

pub async fn list_physical_entries(pool: &PgPool, user_id: Uuid) -> Result<Vec<PhysicalEntry>> {
    let entries = sqlx::query_as::<_, PhysicalEntry>(&format!(
        "SELECT {PHYSICAL_COLUMNS} FROM physical_entries WHERE user_id = $1 ORDER BY date ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn insert_physical_entry(
    pool: &PgPool,
    user_id: Uuid,
    entry: &NewPhysicalEntry,
) -> Result<PhysicalEntry> {
    let created = sqlx::query_as::<_, PhysicalEntry>(&format!(
        r#"
        INSERT INTO physical_entries (
            id, user_id, date, heart_rate, blood_pressure_systolic, blood_pressure_diastolic,
            weight, sleep_hours, sleep_quality, exercise_minutes, exercise_type, exercise_intensity,
            steps, water_intake, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        RETURNING {PHYSICAL_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.date)
    .bind(entry.heart_rate)
    .bind(entry.blood_pressure_systolic)
    .bind(entry.blood_pressure_diastolic)
    .bind(entry.weight)
    .bind(entry.sleep_hours)
    .bind(entry.sleep_quality)
    .bind(entry.exercise_minutes)
    .bind(&entry.exercise_type)
    .bind(entry.exercise_intensity)
    .bind(entry.steps)
    .bind(entry.water_intake)
    .bind(&entry.notes)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

pub async fn list_mental_entries(pool: &PgPool, user_id: Uuid) -> Result<Vec<MentalEntry>> {
    let entries = sqlx::query_as::<_, MentalEntry>(&format!(
        "SELECT {MENTAL_COLUMNS} FROM mental_entries WHERE user_id = $1 ORDER BY date ASC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn insert_mental_entry(
    pool: &PgPool,
    user_id: Uuid,
    entry: &NewMentalEntry,
) -> Result<MentalEntry> {
    let created = sqlx::query_as::<_, MentalEntry>(&format!(
        r#"
        INSERT INTO mental_entries (
            id, user_id, date, mood, stress_level, anxiety_level, energy_level,
            meditation_minutes, journaling_done, social_connection, gratitude_practice, notes
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {MENTAL_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.date)
    .bind(entry.mood)
    .bind(entry.stress_level)
    .bind(entry.anxiety_level)
    .bind(entry.energy_level)
    .bind(entry.meditation_minutes)
    .bind(entry.journaling_done)
    .bind(entry.social_connection)
    .bind(entry.gratitude_practice)
    .bind(&entry.notes)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

// ============================================
// Goals
// ============================================

pub async fn list_goals(pool: &PgPool, user_id: Uuid) -> Result<Vec<Goal>> {
    let goals = sqlx::query_as::<_, Goal>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(goals)
}

pub async fn find_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> Result<Option<Goal>> {
    let goal = sqlx::query_as::<_, Goal>(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE id = $1 AND user_id = $2"
    ))
    .bind(goal_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(goal)
}

pub async fn insert_goal(pool: &PgPool, user_id: Uuid, goal: &NewGoal) -> Result<Goal> {
    let created = sqlx::query_as::<_, Goal>(&format!(
        r#"
        INSERT INTO goals (
            id, user_id, title, description, category, target_value, current_value,
            unit, target_date, completed
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {GOAL_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&goal.title)
    .bind(&goal.description)
    .bind(goal.category)
    .bind(goal.target_value)
    .bind(goal.current_value)
    .bind(&goal.unit)
    .bind(goal.target_date)
    .bind(goal.completed)
    .fetch_one(pool)
    .await?;
    Ok(created)
}

pub async fn update_goal(pool: &PgPool, goal: &Goal) -> Result<Goal> {
    let updated = sqlx::query_as::<_, Goal>(&format!(
        r#"
        UPDATE goals
        SET title = $3,
            description = $4,
            category = $5,
            target_value = $6,
            current_value = $7,
            unit = $8,
            target_date = $9,
            completed = $10
        WHERE id = $1 AND user_id = $2
        RETURNING {GOAL_COLUMNS}
        "#
    ))
    .bind(goal.id)
    .bind(goal.user_id)
    .bind(&goal.title)
    .bind(&goal.description)
    .bind(goal.category)
    .bind(goal.target_value)
    .bind(goal.current_value)
    .bind(&goal.unit)
    .bind(goal.target_date)
    .bind(goal.completed)
    .fetch_one(pool)
    .await?;
    Ok(updated)
}

/// Returns whether a row owned by `user_id` was deleted.
pub async fn delete_goal(pool: &PgPool, user_id: Uuid, goal_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
        .bind(goal_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Everything recorded for one user, loaded concurrently.
#[derive(Debug, Default)]
pub struct HealthRecords {
    pub profile: Option<Profile>,
    pub physical: Vec<PhysicalEntry>,
    pub mental: Vec<MentalEntry>,
    pub goals: Vec<Goal>,
}

pub async fn load_health_records(pool: &PgPool, user_id: Uuid) -> Result<HealthRecords> {
    let (profile, physical, mental, goals) = futures::try_join!(
        get_profile(pool, user_id),
        list_physical_entries(pool, user_id),
        list_mental_entries(pool, user_id),
        list_goals(pool, user_id),
    )?;
    Ok(HealthRecords {
        profile,
        physical,
        mental,
        goals,
    })
}
