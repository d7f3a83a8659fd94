//! User and Goals MCP Tools

use crate::db::Database;
use crate::models::{PrimaryGoal, User, UserCreate, UserUpdate};
use crate::nutrition::{categorize_unit, to_kg, UnitCategory};

/// Convert a body weight in `unit` to kilograms
pub fn weight_in_kg(weight: f64, unit: &str) -> Result<f64, String> {
    to_kg(weight, unit).ok_or_else(|| match categorize_unit(unit) {
        UnitCategory::Volume => format!("'{}' is a volume unit; weight needs kg, lb or stone", unit),
        _ => format!("Unknown weight unit '{}'", unit),
    })
}

pub fn parse_primary_goal(s: &str) -> Result<PrimaryGoal, String> {
    PrimaryGoal::parse(s).ok_or_else(|| {
        let valid: Vec<&str> = PrimaryGoal::ALL.iter().map(|g| g.as_str()).collect();
        format!("Invalid primary goal '{}'. Valid values: {}", s, valid.join(", "))
    })
}

pub fn create_user(db: &Database, data: UserCreate) -> Result<User, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let user = User::create(&conn, &data).map_err(|e| format!("Failed to create user: {}", e))?;
    tracing::info!(owner_id = user.id, "created user");
    Ok(user)
}

pub fn get_user(db: &Database, owner_id: i64) -> Result<Option<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    User::get_by_id(&conn, owner_id).map_err(|e| format!("Failed to get user: {}", e))
}

pub fn list_users(db: &Database) -> Result<Vec<User>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    User::list(&conn).map_err(|e| format!("Failed to list users: {}", e))
}

/// Update profile and goals. Weights are given in `weight_unit`;
/// `Some(None)` clears a weight.
pub fn update_goals(
    db: &Database,
    owner_id: i64,
    mut data: UserUpdate,
    weight_unit: &str,
) -> Result<Option<User>, String> {
    let in_kg = |w: Option<f64>| w.map(|w| weight_in_kg(w, weight_unit)).transpose();
    data.current_weight_kg = data.current_weight_kg.map(in_kg).transpose()?;
    data.goal_weight_kg = data.goal_weight_kg.map(in_kg).transpose()?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    User::update(&conn, owner_id, &data).map_err(|e| format!("Failed to update goals: {}", e))
}
