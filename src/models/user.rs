//! User model
//!
//! Profile, dietary preferences and goal configuration. Every event row
//! belongs to a user.

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::round_whole;

pub const DEFAULT_CALORIE_GOAL: i64 = 2000;
pub const DEFAULT_WATER_GOAL_ML: i64 = 2000;
pub const DEFAULT_PROTEIN_TARGET_G: i64 = 140;
pub const DEFAULT_CARBS_TARGET_G: i64 = 220;
pub const DEFAULT_FAT_TARGET_G: i64 = 65;

/// Accepted body weight range in kilograms
pub const MIN_WEIGHT_KG: f64 = 20.0;
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// Accepted age range in years
pub const MIN_AGE: i64 = 1;
pub const MAX_AGE: i64 = 150;

/// Accepted height range in centimeters
pub const MIN_HEIGHT_CM: f64 = 50.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;

/// What the user is working toward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PrimaryGoal {
    #[serde(rename = "Lose Weight")]
    LoseWeight,
    #[serde(rename = "Gain Muscle")]
    GainMuscle,
    #[default]
    #[serde(rename = "Maintain Weight")]
    MaintainWeight,
}

impl PrimaryGoal {
    pub const ALL: [PrimaryGoal; 3] = [
        PrimaryGoal::LoseWeight,
        PrimaryGoal::GainMuscle,
        PrimaryGoal::MaintainWeight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrimaryGoal::LoseWeight => "Lose Weight",
            PrimaryGoal::GainMuscle => "Gain Muscle",
            PrimaryGoal::MaintainWeight => "Maintain Weight",
        }
    }

    /// Case-insensitive; spaces, hyphens and underscores are ignored
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "loseweight" => Some(PrimaryGoal::LoseWeight),
            "gainmuscle" => Some(PrimaryGoal::GainMuscle),
            "maintainweight" => Some(PrimaryGoal::MaintainWeight),
            _ => None,
        }
    }
}

/// A user, their profile and their goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub age: Option<i64>,
    pub height_cm: Option<f64>,
    pub primary_goal: PrimaryGoal,
    pub diet_types: Vec<String>,
    pub allergies: Vec<String>,
    pub daily_calorie_goal: i64,
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
    pub daily_water_goal_ml: i64,
    pub protein_target_g: i64,
    pub carbs_target_g: i64,
    pub fat_target_g: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// The goal configuration reports are measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserGoals {
    pub owner_id: i64,
    pub daily_calorie_goal: i64,
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
    pub daily_water_goal_ml: i64,
    pub protein_target_g: i64,
    pub carbs_target_g: i64,
    pub fat_target_g: i64,
}

impl UserGoals {
    /// Product defaults, used when an owner has no profile
    pub fn defaults(owner_id: i64) -> Self {
        Self {
            owner_id,
            daily_calorie_goal: DEFAULT_CALORIE_GOAL,
            current_weight_kg: None,
            goal_weight_kg: None,
            daily_water_goal_ml: DEFAULT_WATER_GOAL_ML,
            protein_target_g: DEFAULT_PROTEIN_TARGET_G,
            carbs_target_g: DEFAULT_CARBS_TARGET_G,
            fat_target_g: DEFAULT_FAT_TARGET_G,
        }
    }
}

/// Data for creating a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCreate {
    pub display_name: String,
    pub age: Option<i64>,
    pub height_cm: Option<f64>,
    pub primary_goal: Option<PrimaryGoal>,
    pub diet_types: Vec<String>,
    pub allergies: Vec<String>,
    pub daily_calorie_goal: Option<f64>,
    pub current_weight_kg: Option<f64>,
    pub goal_weight_kg: Option<f64>,
    pub daily_water_goal_ml: Option<f64>,
}

impl UserCreate {
    /// A user with default goals
    pub fn named(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            ..Default::default()
        }
    }
}

/// Partial update of a user's profile and goals.
///
/// Weights are doubly optional: `None` keeps the stored value and
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub age: Option<i64>,
    pub height_cm: Option<f64>,
    pub primary_goal: Option<PrimaryGoal>,
    pub diet_types: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub daily_calorie_goal: Option<f64>,
    pub current_weight_kg: Option<Option<f64>>,
    pub goal_weight_kg: Option<Option<f64>>,
    pub daily_water_goal_ml: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
}

fn positive_goal(field: &str, value: f64) -> DbResult<i64> {
    let rounded = round_whole(value);
    if !value.is_finite() || rounded <= 0 {
        return Err(DbError::Invalid(format!("{} must be greater than zero", field)));
    }
    Ok(rounded)
}

fn macro_target(field: &str, value: f64) -> DbResult<i64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Invalid(format!("{} must be a non-negative number", field)));
    }
    Ok(round_whole(value))
}

fn body_weight(field: &str, value: f64) -> DbResult<f64> {
    if !(MIN_WEIGHT_KG..=MAX_WEIGHT_KG).contains(&value) {
        return Err(DbError::Invalid(format!(
            "{} must be between {} and {} kg",
            field, MIN_WEIGHT_KG, MAX_WEIGHT_KG
        )));
    }
    Ok(value)
}

fn age(value: i64) -> DbResult<i64> {
    if !(MIN_AGE..=MAX_AGE).contains(&value) {
        return Err(DbError::Invalid(format!("age must be between {} and {}", MIN_AGE, MAX_AGE)));
    }
    Ok(value)
}

fn height(value: f64) -> DbResult<f64> {
    if !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&value) {
        return Err(DbError::Invalid(format!(
            "height_cm must be between {} and {} cm",
            MIN_HEIGHT_CM, MAX_HEIGHT_CM
        )));
    }
    Ok(value)
}

/// Trimmed, non-empty, first occurrence kept (case-insensitive)
fn tag_list(values: &[String]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if !trimmed.is_empty() && !tags.iter().any(|t| t.eq_ignore_ascii_case(trimmed)) {
            tags.push(trimmed.to_string());
        }
    }
    tags
}

fn tags_to_column(tags: &[String]) -> DbResult<String> {
    serde_json::to_string(tags).map_err(|e| DbError::Invalid(format!("Invalid list: {}", e)))
}

fn tags_from_row(row: &Row, column: &str) -> rusqlite::Result<Vec<String>> {
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn display_name(name: &str) -> DbResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DbError::Invalid("display_name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let primary_goal: String = row.get("primary_goal")?;
        Ok(Self {
            id: row.get("id")?,
            display_name: row.get("display_name")?,
            age: row.get("age")?,
            height_cm: row.get("height_cm")?,
            primary_goal: PrimaryGoal::parse(&primary_goal).unwrap_or_default(),
            diet_types: tags_from_row(row, "diet_types")?,
            allergies: tags_from_row(row, "allergies")?,
            daily_calorie_goal: row.get("daily_calorie_goal")?,
            current_weight_kg: row.get("current_weight_kg")?,
            goal_weight_kg: row.get("goal_weight_kg")?,
            daily_water_goal_ml: row.get("daily_water_goal_ml")?,
            protein_target_g: row.get("protein_target_g")?,
            carbs_target_g: row.get("carbs_target_g")?,
            fat_target_g: row.get("fat_target_g")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Goal configuration view of this user
    pub fn goals(&self) -> UserGoals {
        UserGoals {
            owner_id: self.id,
            daily_calorie_goal: self.daily_calorie_goal,
            current_weight_kg: self.current_weight_kg,
            goal_weight_kg: self.goal_weight_kg,
            daily_water_goal_ml: self.daily_water_goal_ml,
            protein_target_g: self.protein_target_g,
            carbs_target_g: self.carbs_target_g,
            fat_target_g: self.fat_target_g,
        }
    }

    /// Create a new user
    pub fn create(conn: &Connection, data: &UserCreate) -> DbResult<Self> {
        let name = display_name(&data.display_name)?;
        let age = data.age.map(age).transpose()?;
        let height = data.height_cm.map(height).transpose()?;
        let primary_goal = data.primary_goal.unwrap_or_default();
        let diet_types = tags_to_column(&tag_list(&data.diet_types))?;
        let allergies = tags_to_column(&tag_list(&data.allergies))?;
        let calorie_goal = data
            .daily_calorie_goal
            .map(|v| positive_goal("daily_calorie_goal", v))
            .transpose()?
            .unwrap_or(DEFAULT_CALORIE_GOAL);
        let water_goal = data
            .daily_water_goal_ml
            .map(|v| positive_goal("daily_water_goal_ml", v))
            .transpose()?
            .unwrap_or(DEFAULT_WATER_GOAL_ML);
        let current = data
            .current_weight_kg
            .map(|v| body_weight("current_weight_kg", v))
            .transpose()?;
        let goal = data
            .goal_weight_kg
            .map(|v| body_weight("goal_weight_kg", v))
            .transpose()?;

        conn.execute(
            r#"
            INSERT INTO users (
                display_name, age, height_cm, primary_goal, diet_types, allergies,
                daily_calorie_goal, current_weight_kg, goal_weight_kg, daily_water_goal_ml
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                name,
                age,
                height,
                primary_goal.as_str(),
                diet_types,
                allergies,
                calorie_goal,
                current,
                goal,
                water_goal,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("User {}", id)))
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all users
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Update profile and goals. Returns `None` if the user does not exist.
    pub fn update(conn: &Connection, id: i64, data: &UserUpdate) -> DbResult<Option<Self>> {
        let Some(existing) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let name = match data.display_name.as_deref() {
            Some(n) => display_name(n)?,
            None => existing.display_name,
        };
        let age = match data.age {
            Some(v) => Some(age(v)?),
            None => existing.age,
        };
        let height = match data.height_cm {
            Some(v) => Some(height(v)?),
            None => existing.height_cm,
        };
        let primary_goal = data.primary_goal.unwrap_or(existing.primary_goal);
        let diet_types = match &data.diet_types {
            Some(v) => tag_list(v),
            None => existing.diet_types,
        };
        let allergies = match &data.allergies {
            Some(v) => tag_list(v),
            None => existing.allergies,
        };
        let calorie_goal = match data.daily_calorie_goal {
            Some(v) => positive_goal("daily_calorie_goal", v)?,
            None => existing.daily_calorie_goal,
        };
        let water_goal = match data.daily_water_goal_ml {
            Some(v) => positive_goal("daily_water_goal_ml", v)?,
            None => existing.daily_water_goal_ml,
        };
        let current = match data.current_weight_kg {
            Some(Some(v)) => Some(body_weight("current_weight_kg", v)?),
            Some(None) => None,
            None => existing.current_weight_kg,
        };
        let goal = match data.goal_weight_kg {
            Some(Some(v)) => Some(body_weight("goal_weight_kg", v)?),
            Some(None) => None,
            None => existing.goal_weight_kg,
        };
        let protein = match data.protein_target_g {
            Some(v) => macro_target("protein_target_g", v)?,
            None => existing.protein_target_g,
        };
        let carbs = match data.carbs_target_g {
            Some(v) => macro_target("carbs_target_g", v)?,
            None => existing.carbs_target_g,
        };
        let fat = match data.fat_target_g {
            Some(v) => macro_target("fat_target_g", v)?,
            None => existing.fat_target_g,
        };

        conn.execute(
            r#"
            UPDATE users SET
                display_name = ?1,
                age = ?2,
                height_cm = ?3,
                primary_goal = ?4,
                diet_types = ?5,
                allergies = ?6,
                daily_calorie_goal = ?7,
                current_weight_kg = ?8,
                goal_weight_kg = ?9,
                daily_water_goal_ml = ?10,
                protein_target_g = ?11,
                carbs_target_g = ?12,
                fat_target_g = ?13,
                updated_at = datetime('now')
            WHERE id = ?14
            "#,
            params![
                name,
                age,
                height,
                primary_goal.as_str(),
                tags_to_column(&diet_types)?,
                tags_to_column(&allergies)?,
                calorie_goal,
                current,
                goal,
                water_goal,
                protein,
                carbs,
                fat,
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Total number of users
    pub fn count_all(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_create_uses_default_goals() {
        let conn = setup();
        let user = User::create(&conn, &UserCreate::named("Ada")).unwrap();
        let goals = user.goals();

        assert_eq!(goals, UserGoals::defaults(user.id));
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let conn = setup();
        assert!(matches!(User::create(&conn, &UserCreate::named("  ")), Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_update_goals() {
        let conn = setup();
        let user = User::create(&conn, &UserCreate::named("Ada")).unwrap();

        let updated = User::update(
            &conn,
            user.id,
            &UserUpdate {
                daily_calorie_goal: Some(1800.0),
                current_weight_kg: Some(Some(72.5)),
                goal_weight_kg: Some(Some(68.0)),
                protein_target_g: Some(120.4),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();

        assert_eq!(updated.daily_calorie_goal, 1800);
        assert_eq!(updated.current_weight_kg, Some(72.5));
        assert_eq!(updated.goal_weight_kg, Some(68.0));
        assert_eq!(updated.protein_target_g, 120);
        assert_eq!(updated.carbs_target_g, DEFAULT_CARBS_TARGET_G);
        assert_eq!(updated.daily_water_goal_ml, DEFAULT_WATER_GOAL_ML);
    }

    #[test]
    fn test_update_validates_ranges() {
        let conn = setup();
        let user = User::create(&conn, &UserCreate::named("Ada")).unwrap();

        let too_light = UserUpdate { goal_weight_kg: Some(Some(10.0)), ..Default::default() };
        assert!(matches!(User::update(&conn, user.id, &too_light), Err(DbError::Invalid(_))));

        let no_water = UserUpdate { daily_water_goal_ml: Some(0.0), ..Default::default() };
        assert!(matches!(User::update(&conn, user.id, &no_water), Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_profile_fields_round_trip() {
        let conn = setup();
        let user = User::create(
            &conn,
            &UserCreate {
                age: Some(34),
                height_cm: Some(172.5),
                primary_goal: Some(PrimaryGoal::LoseWeight),
                diet_types: vec![" Vegetarian ".to_string(), "vegetarian".to_string(), "".to_string()],
                allergies: vec!["Peanuts".to_string()],
                ..UserCreate::named("Ada")
            },
        )
        .unwrap();

        assert_eq!(user.age, Some(34));
        assert_eq!(user.height_cm, Some(172.5));
        assert_eq!(user.primary_goal, PrimaryGoal::LoseWeight);
        assert_eq!(user.diet_types, vec!["Vegetarian".to_string()]);
        assert_eq!(user.allergies, vec!["Peanuts".to_string()]);

        let updated = User::update(
            &conn,
            user.id,
            &UserUpdate {
                allergies: Some(Vec::new()),
                primary_goal: Some(PrimaryGoal::GainMuscle),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert!(updated.allergies.is_empty());
        assert_eq!(updated.diet_types, vec!["Vegetarian".to_string()]);
        assert_eq!(updated.primary_goal, PrimaryGoal::GainMuscle);
    }

    #[test]
    fn test_profile_defaults() {
        let conn = setup();
        let user = User::create(&conn, &UserCreate::named("Ada")).unwrap();
        assert_eq!(user.primary_goal, PrimaryGoal::MaintainWeight);
        assert!(user.age.is_none());
        assert!(user.diet_types.is_empty());
    }

    #[test]
    fn test_age_and_height_ranges() {
        let conn = setup();

        for bad_age in [0, 151, -3] {
            let data = UserCreate { age: Some(bad_age), ..UserCreate::named("Ada") };
            assert!(matches!(User::create(&conn, &data), Err(DbError::Invalid(_))));
        }
        for bad_height in [49.9, 300.5, f64::NAN] {
            let data = UserCreate { height_cm: Some(bad_height), ..UserCreate::named("Ada") };
            assert!(matches!(User::create(&conn, &data), Err(DbError::Invalid(_))));
        }

        let edges = UserCreate {
            age: Some(MAX_AGE),
            height_cm: Some(MIN_HEIGHT_CM),
            ..UserCreate::named("Ada")
        };
        let user = User::create(&conn, &edges).unwrap();

        let too_old = UserUpdate { age: Some(MAX_AGE + 1), ..Default::default() };
        assert!(matches!(User::update(&conn, user.id, &too_old), Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_primary_goal_parsing() {
        assert_eq!(PrimaryGoal::parse("Lose Weight"), Some(PrimaryGoal::LoseWeight));
        assert_eq!(PrimaryGoal::parse("gain_muscle"), Some(PrimaryGoal::GainMuscle));
        assert_eq!(PrimaryGoal::parse("maintain-weight"), Some(PrimaryGoal::MaintainWeight));
        assert_eq!(PrimaryGoal::parse("bulk"), None);
        for goal in PrimaryGoal::ALL {
            assert_eq!(PrimaryGoal::parse(goal.as_str()), Some(goal));
        }
    }

    #[test]
    fn test_update_clears_weights() {
        let conn = setup();
        let user = User::create(
            &conn,
            &UserCreate {
                current_weight_kg: Some(80.0),
                goal_weight_kg: Some(75.0),
                ..UserCreate::named("Ada")
            },
        )
        .unwrap();

        let keep = User::update(&conn, user.id, &UserUpdate::default()).unwrap().unwrap();
        assert_eq!(keep.current_weight_kg, Some(80.0));

        let cleared = User::update(
            &conn,
            user.id,
            &UserUpdate { goal_weight_kg: Some(None), ..Default::default() },
        )
        .unwrap()
        .unwrap();
        assert_eq!(cleared.current_weight_kg, Some(80.0));
        assert_eq!(cleared.goal_weight_kg, None);
        assert_eq!(crate::reporting::summary::weight_change(&cleared.goals()), 0.0);
    }

    #[test]
    fn test_update_missing_user() {
        let conn = setup();
        assert!(User::update(&conn, 42, &UserUpdate::default()).unwrap().is_none());
    }
}
