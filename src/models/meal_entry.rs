//! Meal Entry model
//!
//! One logged food with its calories and macros, owned by a user.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{instant, DbError, DbResult};
use crate::nutrition::round_whole;

/// Meal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    /// A stored value the product does not recognise
    Unspecified,
}

impl MealCategory {
    /// The categories shown in the daily breakdown, in display order
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "Breakfast",
            MealCategory::Lunch => "Lunch",
            MealCategory::Dinner => "Dinner",
            MealCategory::Snack => "Snack",
            MealCategory::Unspecified => "Unspecified",
        }
    }

    /// Lenient conversion used when reading rows
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(MealCategory::Unspecified)
    }

    /// Strict conversion used when logging
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealCategory::Breakfast),
            "lunch" => Some(MealCategory::Lunch),
            "dinner" => Some(MealCategory::Dinner),
            "snack" => Some(MealCategory::Snack),
            _ => None,
        }
    }
}

/// A logged meal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: i64,
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub category: MealCategory,
    pub food_name: String,
    pub serving_size: String,
    pub calories: i64,
    /// Grams; `None` when the food was logged without macros
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fat: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealEntryCreate {
    pub owner_id: i64,
    pub occurred_at: DateTime<Utc>,
    pub category: MealCategory,
    pub food_name: String,
    pub serving_size: Option<String>,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

/// Data for updating a meal entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealEntryUpdate {
    pub occurred_at: Option<DateTime<Utc>>,
    pub category: Option<MealCategory>,
    pub food_name: Option<String>,
    pub serving_size: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

const DEFAULT_SERVING_SIZE: &str = "1 serving";

/// Upper bound for a single entry's calories or grams of a macro
pub const MAX_MEAL_AMOUNT: f64 = 100_000.0;

/// Round a logged amount, rejecting negative, non-finite or oversized input
fn ingest_amount(field: &str, value: f64) -> DbResult<i64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Invalid(format!("{} must be a non-negative number", field)));
    }
    if value > MAX_MEAL_AMOUNT {
        return Err(DbError::Invalid(format!("{} must be at most {}", field, MAX_MEAL_AMOUNT)));
    }
    Ok(round_whole(value))
}

fn ingest_optional(field: &str, value: Option<f64>) -> DbResult<Option<i64>> {
    value.map(|v| ingest_amount(field, v)).transpose()
}

fn ingest_category(category: MealCategory) -> DbResult<MealCategory> {
    if category == MealCategory::Unspecified {
        return Err(DbError::Invalid(
            "category must be one of Breakfast, Lunch, Dinner, Snack".to_string(),
        ));
    }
    Ok(category)
}

fn ingest_food_name(name: &str) -> DbResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DbError::Invalid("food_name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

impl MealEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            id: row.get("id")?,
            owner_id: row.get("owner_id")?,
            occurred_at: instant::from_row(row, "occurred_at")?,
            category: MealCategory::from_str(&category),
            food_name: row.get("food_name")?,
            serving_size: row.get("serving_size")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Log a new meal entry. Calories and macros are rounded here.
    pub fn create(conn: &Connection, data: &MealEntryCreate) -> DbResult<Self> {
        let category = ingest_category(data.category)?;
        let food_name = ingest_food_name(&data.food_name)?;
        let calories = ingest_amount("calories", data.calories)?;
        let protein = ingest_optional("protein", data.protein)?;
        let carbs = ingest_optional("carbs", data.carbs)?;
        let fat = ingest_optional("fat", data.fat)?;
        let serving_size = data
            .serving_size
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVING_SIZE);

        conn.execute(
            r#"
            INSERT INTO meal_entries (
                owner_id, occurred_at, category, food_name, serving_size,
                calories, protein, carbs, fat
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.owner_id,
                instant::to_column(&data.occurred_at),
                category.as_str(),
                food_name,
                serving_size,
                calories,
                protein,
                carbs,
                fat,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, data.owner_id, id)?
            .ok_or_else(|| DbError::NotFound(format!("Meal entry {}", id)))
    }

    /// Get a meal entry by ID, scoped to its owner
    pub fn get_by_id(conn: &Connection, owner_id: i64, id: i64) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM meal_entries WHERE id = ?1 AND owner_id = ?2")?;

        let result = stmt.query_row(params![id, owner_id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List an owner's meal entries with optional inclusive bounds and category,
    /// newest first
    pub fn list(
        conn: &Connection,
        owner_id: i64,
        start: Option<&DateTime<Utc>>,
        end: Option<&DateTime<Utc>>,
        category: Option<MealCategory>,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM meal_entries WHERE owner_id = ?1");
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

        let entries = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Apply a partial update. Returns `None` if the entry does not exist.
    pub fn update(
        conn: &Connection,
        owner_id: i64,
        id: i64,
        data: &MealEntryUpdate,
    ) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, owner_id, id)? else {
            return Ok(None);
        };

        let occurred_at = data.occurred_at.unwrap_or(existing.occurred_at);
        let category = match data.category {
            Some(c) => ingest_category(c)?,
            None => existing.category,
        };
        let food_name = match data.food_name.as_deref() {
            Some(name) => ingest_food_name(name)?,
            None => existing.food_name,
        };
        let serving_size = data.serving_size.clone().unwrap_or(existing.serving_size);
        let calories = match data.calories {
            Some(v) => ingest_amount("calories", v)?,
            None => existing.calories,
        };
        let protein = ingest_optional("protein", data.protein)?.or(existing.protein);
        let carbs = ingest_optional("carbs", data.carbs)?.or(existing.carbs);
        let fat = ingest_optional("fat", data.fat)?.or(existing.fat);

        conn.execute(
            r#"
            UPDATE meal_entries SET
                occurred_at = ?1,
                category = ?2,
                food_name = ?3,
                serving_size = ?4,
                calories = ?5,
                protein = ?6,
                carbs = ?7,
                fat = ?8,
                updated_at = datetime('now')
            WHERE id = ?9 AND owner_id = ?10
            "#,
            params![
                instant::to_column(&occurred_at),
                category.as_str(),
                food_name,
                serving_size,
                calories,
                protein,
                carbs,
                fat,
                id,
                owner_id,
            ],
        )?;

        Self::get_by_id(conn, owner_id, id)
    }

    /// Delete a meal entry
    pub fn delete(conn: &Connection, owner_id: i64, id: i64) -> DbResult<bool> {
        let rows = conn.execute(
            "DELETE FROM meal_entries WHERE id = ?1 AND owner_id = ?2",
            params![id, owner_id],
        )?;
        Ok(rows > 0)
    }

    /// Total number of stored meal entries
    pub fn count_all(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM meal_entries", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{User, UserCreate};
    use chrono::TimeZone;

    fn setup() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let user = User::create(&conn, &UserCreate::named("Ada")).unwrap();
        (conn, user.id)
    }

    fn lunch(owner_id: i64, hour: u32) -> MealEntryCreate {
        MealEntryCreate {
            owner_id,
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            category: MealCategory::Lunch,
            food_name: " Quinoa Salad Bowl ".to_string(),
            serving_size: None,
            calories: 419.6,
            protein: Some(15.4),
            carbs: Some(58.0),
            fat: None,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(MealCategory::parse("breakfast"), Some(MealCategory::Breakfast));
        assert_eq!(MealCategory::parse(" Snack "), Some(MealCategory::Snack));
        assert_eq!(MealCategory::parse("brunch"), None);
        assert_eq!(MealCategory::from_str("brunch"), MealCategory::Unspecified);
    }

    #[test]
    fn test_create_rounds_and_defaults() {
        let (conn, owner) = setup();
        let entry = MealEntry::create(&conn, &lunch(owner, 12)).unwrap();

        assert_eq!(entry.calories, 420);
        assert_eq!(entry.protein, Some(15));
        assert_eq!(entry.carbs, Some(58));
        assert_eq!(entry.fat, None);
        assert_eq!(entry.food_name, "Quinoa Salad Bowl");
        assert_eq!(entry.serving_size, "1 serving");
        assert_eq!(entry.occurred_at, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_create_rejects_negative_and_unspecified() {
        let (conn, owner) = setup();

        let mut negative = lunch(owner, 12);
        negative.calories = -1.0;
        assert!(matches!(MealEntry::create(&conn, &negative), Err(DbError::Invalid(_))));

        let mut unspecified = lunch(owner, 12);
        unspecified.category = MealCategory::Unspecified;
        assert!(matches!(MealEntry::create(&conn, &unspecified), Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_create_rejects_oversized_amounts() {
        let (conn, owner) = setup();

        let mut huge = lunch(owner, 12);
        huge.calories = 1e19;
        assert!(matches!(MealEntry::create(&conn, &huge), Err(DbError::Invalid(_))));

        let mut heavy = lunch(owner, 12);
        heavy.fat = Some(MAX_MEAL_AMOUNT + 1.0);
        assert!(matches!(MealEntry::create(&conn, &heavy), Err(DbError::Invalid(_))));

        let entry = MealEntry::create(&conn, &lunch(owner, 12)).unwrap();
        let update = MealEntryUpdate { calories: Some(f64::MAX), ..Default::default() };
        assert!(matches!(MealEntry::update(&conn, owner, entry.id, &update), Err(DbError::Invalid(_))));
        assert_eq!(MealEntry::count_all(&conn).unwrap(), 1);
    }

    #[test]
    fn test_list_is_inclusive_and_newest_first() {
        let (conn, owner) = setup();
        for hour in [8, 12, 18] {
            MealEntry::create(&conn, &lunch(owner, hour)).unwrap();
        }

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).unwrap();
        let entries = MealEntry::list(&conn, owner, Some(&start), Some(&end), None).unwrap();

        let hours: Vec<_> = entries.iter().map(|e| e.occurred_at).collect();
        assert_eq!(hours, vec![end, start]);
    }

    #[test]
    fn test_list_is_scoped_to_owner() {
        let (conn, owner) = setup();
        let other = User::create(&conn, &UserCreate::named("Grace")).unwrap();
        MealEntry::create(&conn, &lunch(owner, 12)).unwrap();

        assert!(MealEntry::list(&conn, other.id, None, None, None).unwrap().is_empty());
        assert!(MealEntry::get_by_id(&conn, other.id, 1).unwrap().is_none());
    }

    #[test]
    fn test_update_and_delete() {
        let (conn, owner) = setup();
        let entry = MealEntry::create(&conn, &lunch(owner, 12)).unwrap();

        let updated = MealEntry::update(
            &conn,
            owner,
            entry.id,
            &MealEntryUpdate {
                category: Some(MealCategory::Dinner),
                calories: Some(500.4),
                fat: Some(12.0),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.category, MealCategory::Dinner);
        assert_eq!(updated.calories, 500);
        assert_eq!(updated.fat, Some(12));
        assert_eq!(updated.protein, Some(15));

        assert!(MealEntry::delete(&conn, owner, entry.id).unwrap());
        assert!(!MealEntry::delete(&conn, owner, entry.id).unwrap());
        assert!(MealEntry::update(&conn, owner, entry.id, &MealEntryUpdate::default())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unknown_stored_category_reads_as_unspecified() {
        let (conn, owner) = setup();
        conn.execute(
            "INSERT INTO meal_entries (owner_id, occurred_at, category, food_name, calories)
             VALUES (?1, '2024-01-01T10:00:00.000Z', 'Brunch', 'Waffles', 300)",
            [owner],
        )
        .unwrap();

        let entries = MealEntry::list(&conn, owner, None, None, None).unwrap();
        assert_eq!(entries[0].category, MealCategory::Unspecified);
        assert_eq!(entries[0].protein, None);
    }
}
