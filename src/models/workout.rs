//! Workout model
//!
//! A logged exercise session with duration and estimated calories burned.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{instant, DbError, DbResult};
use crate::nutrition::round_whole;

/// Workout category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkoutCategory {
    Cardio,
    Strength,
    Yoga,
    Sports,
    Other,
}

impl WorkoutCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutCategory::Cardio => "Cardio",
            WorkoutCategory::Strength => "Strength",
            WorkoutCategory::Yoga => "Yoga",
            WorkoutCategory::Sports => "Sports",
            WorkoutCategory::Other => "Other",
        }
    }

    /// Lenient conversion; anything unrecognised is `Other`
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(WorkoutCategory::Other)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "cardio" => Some(WorkoutCategory::Cardio),
            "strength" => Some(WorkoutCategory::Strength),
            "yoga" => Some(WorkoutCategory::Yoga),
            "sports" | "sport" => Some(WorkoutCategory::Sports),
            "other" => Some(WorkoutCategory::Other),
            _ => None,
        }
    }
}

/// A logged workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub category: WorkoutCategory,
    pub duration_minutes: i64,
    pub calories_burned: i64,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for logging a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCreate {
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub category: WorkoutCategory,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub notes: Option<String>,
}

/// Data for updating a workout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub occurred_at: Option<DateTime<Utc>>,
    pub category: Option<WorkoutCategory>,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
}

/// A workout can't run longer than a day
pub const MAX_DURATION_MINUTES: f64 = 1_440.0;
pub const MAX_CALORIES_BURNED: f64 = 100_000.0;

fn ingest_amount(field: &str, value: f64, max: f64) -> DbResult<i64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Invalid(format!("{} must be a non-negative number", field)));
    }
    if value > max {
        return Err(DbError::Invalid(format!("{} must be at most {}", field, max)));
    }
    Ok(round_whole(value))
}

impl Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            occurred_at: instant::from_row(row, "occurred_at")?,
            category: WorkoutCategory::from_str(&category),
            duration_minutes: row.get("duration_minutes")?,
            calories_burned: row.get("calories_burned")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Log a workout
    pub fn create(conn: &Connection, data: &WorkoutCreate) -> DbResult<Self> {
        let duration = ingest_amount("duration_minutes", data.duration_minutes, MAX_DURATION_MINUTES)?;
        let calories = ingest_amount("calories_burned", data.calories_burned, MAX_CALORIES_BURNED)?;

        conn.execute(
            r#"
            INSERT INTO workouts (
                owner_id, occurred_at, category, duration_minutes, calories_burned, notes
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.owner_id,
                instant::to_column(&data.occurred_at),
                data.category.as_str(),
                duration,
                calories,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, data.owner_id, id)?
            .ok_or_else(|| DbError::NotFound(format!("Workout {}", id)))
    }

    /// Get a workout by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, owner_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?1 AND owner_id = ?2")?;

        let result = stmt.query_row(params![id, owner_id], Self::from_row);
        match result {
            Ok(workout) => Ok(Some(workout)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List an owner's workouts with optional inclusive bounds and category, newest first
    pub fn list(
        conn: &Connection,
        owner_id: i64,
        start: Option<&DateTime<Utc>>,
        end: Option<&DateTime<Utc>>,
        category: Option<WorkoutCategory>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM workouts WHERE owner_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(owner_id)];

        if let Some(start) = start {
            params_vec.push(Box::new(instant::to_column(start)));
            sql.push_str(&format!(" AND occurred_at >= ?{}", params_vec.len()));
        }

        if let Some(end) = end {
            params_vec.push(Box::new(instant::to_column(end)));
            sql.push_str(&format!(" AND occurred_at <= ?{}", params_vec.len()));
        }

        if let Some(category) = category {
            params_vec.push(Box::new(category.as_str()));
            sql.push_str(&format!(" AND category = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY occurred_at DESC, id DESC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let workouts = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(workouts)
    }

    /// Apply a partial update. Returns `None` if the workout does not exist.
    pub fn update(
        conn: &Connection,
        owner_id: i64,
        id: i64,
        data: &WorkoutUpdate,
    ) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, owner_id, id)? else {
            return Ok(None);
        };

        let occurred_at = data.occurred_at.unwrap_or(existing.occurred_at);
        let category = data.category.unwrap_or(existing.category);
        let duration = match data.duration_minutes {
            Some(v) => ingest_amount("duration_minutes", v, MAX_DURATION_MINUTES)?,
            None => existing.duration_minutes,
        };
        let calories = match data.calories_burned {
            Some(v) => ingest_amount("calories_burned", v, MAX_CALORIES_BURNED)?,
            None => existing.calories_burned,
        };
        let notes = data.notes.clone().or(existing.notes);

        conn.execute(
            r#"
            UPDATE workouts SET
                occurred_at = ?1,
                category = ?2,
                duration_minutes = ?3,
                calories_burned = ?4,
                notes = ?5,
                updated_at = datetime('now')
            WHERE id = ?6 AND owner_id = ?7
            "#,
            params![
                instant::to_column(&occurred_at),
                category.as_str(),
                duration,
                calories,
                notes,
                id,
                owner_id,
            ],
        )?;

        Self::get_by_id(conn, owner_id, id)
    }

    /// Delete a workout
    pub fn delete(conn: &Connection, owner_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM workouts WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(rows > 0)
    }

    /// Total number of stored workouts
    pub fn count_all(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))?;
        Ok(count)
    }
}
