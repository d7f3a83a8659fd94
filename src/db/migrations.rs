//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 2;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    if current_version < 2 {
        migrate_v2(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (2)", [])?;
        tracing::info!(version = 2, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
///
/// Event instants are RFC 3339 UTC text with millisecond precision, so lexical
/// order in `occurred_at` is chronological order.
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- Profile and goal configuration per owner
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            display_name TEXT NOT NULL,

            daily_calorie_goal INTEGER NOT NULL DEFAULT 2000,
            current_weight_kg REAL,
            goal_weight_kg REAL,
            daily_water_goal_ml INTEGER NOT NULL DEFAULT 2000,

            -- Macro targets in grams
            protein_target_g INTEGER NOT NULL DEFAULT 140,
            carbs_target_g INTEGER NOT NULL DEFAULT 220,
            fat_target_g INTEGER NOT NULL DEFAULT 65,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- MEAL ENTRIES
        -- One logged food per row, values rounded at ingestion
        -- ============================================
        CREATE TABLE meal_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            occurred_at TEXT NOT NULL,
            category TEXT NOT NULL,              -- Breakfast, Lunch, Dinner, Snack
            food_name TEXT NOT NULL,
            serving_size TEXT NOT NULL DEFAULT '1 serving',

            calories INTEGER NOT NULL CHECK(calories >= 0),
            protein INTEGER CHECK(protein IS NULL OR protein >= 0),   -- grams
            carbs INTEGER CHECK(carbs IS NULL OR carbs >= 0),         -- grams
            fat INTEGER CHECK(fat IS NULL OR fat >= 0),               -- grams

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meal_entries_owner_time ON meal_entries(owner_id, occurred_at);

        -- ============================================
        -- WATER ENTRIES
        -- ============================================
        CREATE TABLE water_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            occurred_at TEXT NOT NULL,
            amount_ml INTEGER NOT NULL CHECK(amount_ml > 0),

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_water_entries_owner_time ON water_entries(owner_id, occurred_at);

        -- ============================================
        -- WORKOUTS
        -- ============================================
        CREATE TABLE workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            occurred_at TEXT NOT NULL,
            category TEXT NOT NULL,              -- Cardio, Strength, Yoga, Sports, Other
            duration_minutes INTEGER NOT NULL CHECK(duration_minutes >= 0),
            calories_burned INTEGER NOT NULL CHECK(calories_burned >= 0),
            notes TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_workouts_owner_time ON workouts(owner_id, occurred_at);
        "#,
    )?;

    Ok(())
}

/// Migration v2: Profile details
///
/// Diet types and allergies are JSON arrays of strings.
fn migrate_v2(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        ALTER TABLE users ADD COLUMN age INTEGER CHECK(age IS NULL OR age BETWEEN 1 AND 150);
        ALTER TABLE users ADD COLUMN height_cm REAL CHECK(height_cm IS NULL OR height_cm BETWEEN 50 AND 300);
        ALTER TABLE users ADD COLUMN primary_goal TEXT NOT NULL DEFAULT 'Maintain Weight';
        ALTER TABLE users ADD COLUMN diet_types TEXT NOT NULL DEFAULT '[]';
        ALTER TABLE users ADD COLUMN allergies TEXT NOT NULL DEFAULT '[]';
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_v2_adds_profile_columns_to_existing_users() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )
        .unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", []).unwrap();
        conn.execute("INSERT INTO users (display_name) VALUES ('Ada')", []).unwrap();
        assert!(needs_migration(&conn).unwrap());

        run_migrations(&conn).unwrap();

        let (goal, diets): (String, String) = conn
            .query_row("SELECT primary_goal, diet_types FROM users", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(goal, "Maintain Weight");
        assert_eq!(diets, "[]");
        assert_eq!(get_schema_version(&conn).unwrap(), 2);
    }
}
