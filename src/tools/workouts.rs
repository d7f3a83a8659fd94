//! Workout MCP Tools

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::models::{Workout, WorkoutCategory, WorkoutCreate, WorkoutUpdate};
use crate::reporting::summary::TodayWorkoutStats;
use crate::reporting::{Reporter, Zone};

/// Response for list_workouts
#[derive(Debug, Serialize)]
pub struct ListWorkoutsResponse {
    pub workouts: Vec<Workout>,
    pub total_duration: i64,
    pub total_calories: i64,
    /// Today's workouts, regardless of the listed range
    pub today: TodayWorkoutStats,
}

#[derive(Debug, Serialize)]
pub struct DeleteWorkoutResponse {
    pub success: bool,
    pub id: i64,
}

pub fn parse_category(s: &str) -> Result<WorkoutCategory, String> {
    WorkoutCategory::parse(s).ok_or_else(|| {
        format!(
            "Invalid workout category '{}': expected one of Cardio, Strength, Yoga, Sports, Other",
            s
        )
    })
}

/// Log a workout
pub fn log_workout(db: &Database, data: WorkoutCreate) -> Result<Workout, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let workout = Workout::create(&conn, &data).map_err(|e| format!("Failed to log workout: {}", e))?;
    tracing::info!(
        owner_id = workout.owner_id,
        id = workout.id,
        category = workout.category.as_str(),
        "logged workout"
    );
    Ok(workout)
}

pub fn get_workout(db: &Database, owner_id: i64, id: i64) -> Result<Option<Workout>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Workout::get_by_id(&conn, owner_id, id).map_err(|e| format!("Failed to get workout: {}", e))
}

/// List workouts, newest first, with today's totals
pub fn list_workouts(
    db: &Database,
    reporter: &Reporter<Database, Zone>,
    owner_id: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    category: Option<WorkoutCategory>,
    now: DateTime<Utc>,
) -> Result<ListWorkoutsResponse, String> {
    let workouts = {
        let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
        Workout::list(&conn, owner_id, start.as_ref(), end.as_ref(), category)
            .map_err(|e| format!("Failed to list workouts: {}", e))?
    };

    let today = reporter
        .today_workout_stats(owner_id, now)
        .map_err(|e| format!("Failed to get today's workouts: {}", e))?;

    Ok(ListWorkoutsResponse {
        total_duration: workouts.iter().fold(0i64, |acc, w| acc.saturating_add(w.duration_minutes)),
        total_calories: workouts.iter().fold(0i64, |acc, w| acc.saturating_add(w.calories_burned)),
        workouts,
        today,
    })
}

pub fn update_workout(
    db: &Database,
    owner_id: i64,
    id: i64,
    data: WorkoutUpdate,
) -> Result<Option<Workout>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    Workout::update(&conn, owner_id, id, &data).map_err(|e| format!("Failed to update workout: {}", e))
}

pub fn delete_workout(db: &Database, owner_id: i64, id: i64) -> Result<DeleteWorkoutResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let success =
        Workout::delete(&conn, owner_id, id).map_err(|e| format!("Failed to delete workout: {}", e))?;
    Ok(DeleteWorkoutResponse { success, id })
}
