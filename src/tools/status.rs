//! Status Tool
//!
//! Provides runtime status information about the nutrilog service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::{Database, DbResult};
use crate::models::{MealEntry, User, WaterEntry, Workout};
use crate::reporting::Zone;

/// Logging instructions for AI assistants
pub const LOGGING_INSTRUCTIONS: &str = r#"
# nutrilog Logging Instructions

Every tool takes an `owner_id`. Create a user with `create_user` first and
reuse its `id`.

## Users

- Profile fields: `age` (1-150), `height_cm` (50-300), `primary_goal` (Lose
  Weight, Gain Muscle, Maintain Weight), `diet_types`, `allergies`.
- `update_goals` changes only the fields given. Use `clear_current_weight` or
  `clear_goal_weight` to remove a stored weight.

## Times

- `occurred_at` accepts an RFC 3339 timestamp (`2024-01-05T08:30:00Z`), a local
  date-time without offset (`2024-01-05T08:30`), or a plain date (`2024-01-05`,
  meaning local midnight). Omit it to log "now". Years 1970-9999.
- Days are local calendar days in the server's configured time zone.

## Meals

- `category` is one of Breakfast, Lunch, Dinner, Snack.
- Calories and macros (grams) are rounded to whole numbers when logged.
- Leave a macro out if it is unknown; it counts as zero in reports.
- `search_foods` looks up common foods with per-serving nutrition.

## Water

- `amount` with `unit` (ml, l, cup, fl oz, pint, quart, gallon). Stored in ml.
- The daily water goal defaults to 2000 ml.

## Workouts

- `category` is one of Cardio, Strength, Yoga, Sports, Other.
- `duration_minutes` and `calories_burned` must not be negative.

## Reports

- `daily_summary` / `daily_progress` take an optional `date` (default today).
- `period_summary`, `calorie_trend`, `macro_split` take `days_back` (default 30).
  The window runs from local midnight `days_back` days ago through the end of
  today, so it covers `days_back + 1` calendar days.
- `water_trend` always returns the last 7 days, oldest first.
- `dashboard` returns today's summary, calorie progress, water and workouts.
"#;

/// Row counts per table
#[derive(Debug, Clone, Serialize)]
pub struct RecordCounts {
    pub users: i64,
    pub meals: i64,
    pub water_entries: i64,
    pub workouts: i64,
}

impl RecordCounts {
    fn load(db: &Database) -> DbResult<Self> {
        db.with_conn(|conn| {
            Ok(Self {
                users: User::count_all(conn)?,
                meals: MealEntry::count_all(conn)?,
                water_entries: WaterEntry::count_all(conn)?,
                workouts: Workout::count_all(conn)?,
            })
        })
    }
}

/// Service status
#[derive(Debug, Clone, Serialize)]
pub struct NutrilogStatus {
    pub build_number: u64,
    pub build_timestamp: String,
    pub version: String,
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub time_zone: String,
    pub records: Option<RecordCounts>,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    zone: Zone,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, zone: Zone) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            zone,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> NutrilogStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let records = match RecordCounts::load(db) {
            Ok(counts) => Some(counts),
            Err(e) => {
                tracing::warn!(error = %e, "failed to count records");
                None
            }
        };

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutrilogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp.to_string(),
            version: build_info.version.to_string(),
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            time_zone: self.zone.to_string(),
            records,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}
