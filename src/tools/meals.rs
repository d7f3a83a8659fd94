//! Meal MCP Tools
//!
//! Tools for logging and managing meal entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::models::{MealCategory, MealEntry, MealEntryCreate, MealEntryUpdate};

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<MealEntry>,
    pub total: usize,
    pub total_calories: i64,
}

/// Response for delete_meal
#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub success: bool,
    pub id: i64,
}

/// Parse a category argument strictly
pub fn parse_category(s: &str) -> Result<MealCategory, String> {
    MealCategory::parse(s).ok_or_else(|| {
        format!(
            "Invalid meal category '{}': expected one of Breakfast, Lunch, Dinner, Snack",
            s
        )
    })
}

/// Log a meal
pub fn log_meal(db: &Database, data: MealEntryCreate) -> Result<MealEntry, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entry = MealEntry::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;
    tracing::info!(owner_id = entry.owner_id, id = entry.id, calories = entry.calories, "logged meal");
    Ok(entry)
}

pub fn get_meal(db: &Database, owner_id: i64, id: i64) -> Result<Option<MealEntry>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    MealEntry::get_by_id(&conn, owner_id, id).map_err(|e| format!("Failed to get meal: {}", e))
}

/// List meals, newest first
pub fn list_meals(
    db: &Database,
    owner_id: i64,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    category: Option<MealCategory>,
) -> Result<ListMealsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meals = MealEntry::list(&conn, owner_id, start.as_ref(), end.as_ref(), category)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    Ok(ListMealsResponse {
        total: meals.len(),
        total_calories: meals.iter().fold(0i64, |acc, m| acc.saturating_add(m.calories)),
        meals,
    })
}

pub fn update_meal(
    db: &Database,
    owner_id: i64,
    id: i64,
    data: MealEntryUpdate,
) -> Result<Option<MealEntry>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    MealEntry::update(&conn, owner_id, id, &data).map_err(|e| format!("Failed to update meal: {}", e))
}

pub fn delete_meal(db: &Database, owner_id: i64, id: i64) -> Result<DeleteMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let success =
        MealEntry::delete(&conn, owner_id, id).map_err(|e| format!("Failed to delete meal: {}", e))?;
    Ok(DeleteMealResponse { success, id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{User, UserCreate};
    use chrono::TimeZone;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let owner = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                User::create(conn, &UserCreate::named("Ada"))
            })
            .unwrap()
            .id;
        (db, owner)
    }

    fn snack(owner_id: i64, calories: f64) -> MealEntryCreate {
        MealEntryCreate {
            owner_id,
            occurred_at: Utc.with_ymd_and_hms(2024, 2, 1, 15, 0, 0).unwrap(),
            category: MealCategory::Snack,
            food_name: "Greek Yogurt Parfait".to_string(),
            serving_size: Some("1 cup".to_string()),
            calories,
            protein: Some(20.0),
            carbs: Some(35.0),
            fat: Some(8.0),
        }
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("lunch").unwrap(), MealCategory::Lunch);
        assert!(parse_category("second breakfast").is_err());
    }

    #[test]
    fn test_log_and_list() {
        let (db, owner) = setup();
        log_meal(&db, snack(owner, 280.0)).unwrap();
        log_meal(&db, snack(owner, 120.0)).unwrap();

        let listed = list_meals(&db, owner, None, None, Some(MealCategory::Snack)).unwrap();
        assert_eq!(listed.total, 2);
        assert_eq!(listed.total_calories, 400);
    }

    #[test]
    fn test_log_invalid_meal_reports_error() {
        let (db, owner) = setup();
        let err = log_meal(&db, snack(owner, -10.0)).unwrap_err();
        assert!(err.starts_with("Failed to log meal"));
    }

    #[test]
    fn test_delete_missing_meal() {
        let (db, owner) = setup();
        let response = delete_meal(&db, owner, 99).unwrap();
        assert!(!response.success);
    }
}
