//! nutrilog MCP Server Implementation
//!
//! Implements the MCP server with all nutrilog tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{MealEntryCreate, MealEntryUpdate, UserCreate, UserUpdate, WorkoutCreate, WorkoutUpdate};
use crate::reporting::{Reporter, Zone};
use crate::tools::input::{date_range, instant_or_now, parse_instant};
use crate::tools::status::StatusTracker;
use crate::tools::{foods, goals, meals, reports, water, workouts};

/// nutrilog MCP Service
#[derive(Clone)]
pub struct NutrilogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    reporter: Reporter<Database, Zone>,
    zone: Zone,
    tool_router: ToolRouter<NutrilogService>,
}

impl NutrilogService {
    pub fn new(database_path: PathBuf, database: Database, zone: Zone) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, zone))),
            reporter: Reporter::new(database.clone(), zone),
            database,
            zone,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn found_or_error<T: Serialize>(value: Option<T>, kind: &str, id: i64) -> Result<CallToolResult, McpError> {
    match value {
        Some(v) => json_result(&v),
        None => Ok(CallToolResult::success(vec![Content::text(format!(
            r#"{{"error": "{} not found", "id": {}}}"#,
            kind, id
        ))])),
    }
}

fn invalid(e: String) -> McpError {
    McpError::invalid_params(e, None)
}

fn internal(e: String) -> McpError {
    McpError::internal_error(e, None)
}

/// A new weight, an explicit clear, or no change
fn weight_change(field: &str, value: Option<f64>, clear: bool) -> Result<Option<Option<f64>>, McpError> {
    match (value, clear) {
        (Some(_), true) => Err(invalid(format!("{} cannot be set and cleared at once", field))),
        (Some(v), false) => Ok(Some(Some(v))),
        (None, true) => Ok(Some(None)),
        (None, false) => Ok(None),
    }
}

fn default_volume_unit() -> String { "ml".to_string() }
fn default_weight_unit() -> String { "kg".to_string() }
fn default_search_limit() -> i64 { 20 }

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub display_name: String,
    /// Daily calorie goal (default 2000)
    pub daily_calorie_goal: Option<f64>,
    /// Daily water goal in ml (default 2000)
    pub daily_water_goal_ml: Option<f64>,
    /// Years, 1-150
    pub age: Option<i64>,
    /// Centimeters, 50-300
    pub height_cm: Option<f64>,
    /// Lose Weight, Gain Muscle or Maintain Weight (default Maintain Weight)
    pub primary_goal: Option<String>,
    /// e.g. ["Vegetarian", "Low Carb"]
    #[serde(default)]
    pub diet_types: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Current body weight in `weight_unit`
    pub current_weight: Option<f64>,
    /// Goal body weight in `weight_unit`
    pub goal_weight: Option<f64>,
    /// kg, lb or stone (default kg)
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OwnerParams {
    pub owner_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalsParams {
    pub owner_id: i64,
    pub display_name: Option<String>,
    pub daily_calorie_goal: Option<f64>,
    /// Current body weight in `weight_unit`
    pub current_weight: Option<f64>,
    /// Goal body weight in `weight_unit`
    pub goal_weight: Option<f64>,
    /// kg, lb or stone (default kg)
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    /// Remove the stored current weight
    #[serde(default)]
    pub clear_current_weight: bool,
    /// Remove the stored goal weight
    #[serde(default)]
    pub clear_goal_weight: bool,
    pub age: Option<i64>,
    pub height_cm: Option<f64>,
    pub primary_goal: Option<String>,
    /// Replaces the stored list; pass [] to empty it
    pub diet_types: Option<Vec<String>>,
    /// Replaces the stored list; pass [] to empty it
    pub allergies: Option<Vec<String>>,
    pub daily_water_goal_ml: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
}

// ============================================================================
// Event Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EntryParams {
    pub owner_id: i64,
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub owner_id: i64,
    /// Breakfast, Lunch, Dinner or Snack
    pub category: String,
    pub food_name: String,
    /// Free text, e.g. "1 bowl (250g)" (default "1 serving")
    pub serving_size: Option<String>,
    pub calories: f64,
    /// Grams
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    /// RFC 3339, local YYYY-MM-DDTHH:MM, or YYYY-MM-DD (default now)
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealsParams {
    pub owner_id: i64,
    /// A single day (YYYY-MM-DD); takes precedence over start_date/end_date
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    pub owner_id: i64,
    pub id: i64,
    pub category: Option<String>,
    pub food_name: Option<String>,
    pub serving_size: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWaterParams {
    pub owner_id: i64,
    pub amount: f64,
    /// ml, l, cup, fl oz, pint, quart or gallon (default ml)
    #[serde(default = "default_volume_unit")]
    pub unit: String,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRangeParams {
    pub owner_id: i64,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWaterParams {
    pub owner_id: i64,
    pub id: i64,
    pub amount: Option<f64>,
    #[serde(default = "default_volume_unit")]
    pub unit: String,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogWorkoutParams {
    pub owner_id: i64,
    /// Cardio, Strength, Yoga, Sports or Other
    pub category: String,
    pub duration_minutes: f64,
    pub calories_burned: f64,
    pub notes: Option<String>,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListWorkoutsParams {
    pub owner_id: i64,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateWorkoutParams {
    pub owner_id: i64,
    pub id: i64,
    pub category: Option<String>,
    pub duration_minutes: Option<f64>,
    pub calories_burned: Option<f64>,
    pub notes: Option<String>,
    pub occurred_at: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

// ============================================================================
// Report Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DayReportParams {
    pub owner_id: i64,
    /// YYYY-MM-DD (default today)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PeriodReportParams {
    pub owner_id: i64,
    /// Look back this many days from today (default 30); today is included
    pub days_back: Option<i64>,
}

#[tool_router]
impl NutrilogService {
    // --- Status ---

    #[tool(description = "Get the current status of the nutrilog service including build info, database status, record counts, and process information")]
    async fn nutrilog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get instructions for logging meals, water and workouts and reading reports. Call this when starting a new logging session.")]
    fn logging_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::LOGGING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(LOGGING_INSTRUCTIONS)]))
    }

    // --- Users ---

    #[tool(description = "Create a user with an optional profile (age, height, primary goal, diet types, allergies) and goals. Returns the user with its id, which every other tool takes as owner_id.")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let data = UserCreate {
            display_name: p.display_name,
            age: p.age,
            height_cm: p.height_cm,
            primary_goal: p.primary_goal.as_deref().map(goals::parse_primary_goal).transpose().map_err(invalid)?,
            diet_types: p.diet_types,
            allergies: p.allergies,
            daily_calorie_goal: p.daily_calorie_goal,
            current_weight_kg: p.current_weight.map(|w| goals::weight_in_kg(w, &p.weight_unit)).transpose().map_err(invalid)?,
            goal_weight_kg: p.goal_weight.map(|w| goals::weight_in_kg(w, &p.weight_unit)).transpose().map_err(invalid)?,
            daily_water_goal_ml: p.daily_water_goal_ml,
        };
        let result = goals::create_user(&self.database, data).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get a user's profile and goals")]
    fn get_user(&self, Parameters(p): Parameters<OwnerParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_user(&self.database, p.owner_id).map_err(internal)?;
        found_or_error(result, "User", p.owner_id)
    }

    #[tool(description = "List all users")]
    fn list_users(&self) -> Result<CallToolResult, McpError> {
        let result = goals::list_users(&self.database).map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Update a user's profile and goals: age, height, primary goal, diet types, allergies, calorie goal, current and goal weight, water goal, macro targets. Only the given fields change.")]
    fn update_goals(&self, Parameters(p): Parameters<UpdateGoalsParams>) -> Result<CallToolResult, McpError> {
        let data = UserUpdate {
            display_name: p.display_name,
            age: p.age,
            height_cm: p.height_cm,
            primary_goal: p.primary_goal.as_deref().map(goals::parse_primary_goal).transpose().map_err(invalid)?,
            diet_types: p.diet_types,
            allergies: p.allergies,
            daily_calorie_goal: p.daily_calorie_goal,
            current_weight_kg: weight_change("current_weight", p.current_weight, p.clear_current_weight)?,
            goal_weight_kg: weight_change("goal_weight", p.goal_weight, p.clear_goal_weight)?,
            daily_water_goal_ml: p.daily_water_goal_ml,
            protein_target_g: p.protein_target_g,
            carbs_target_g: p.carbs_target_g,
            fat_target_g: p.fat_target_g,
        };
        let result = goals::update_goals(&self.database, p.owner_id, data, &p.weight_unit).map_err(invalid)?;
        found_or_error(result, "User", p.owner_id)
    }

    // --- Meals ---

    #[tool(description = "Log a meal with calories and optional macros (grams). Values are rounded to whole numbers.")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealEntryCreate {
            owner_id: p.owner_id,
            occurred_at: instant_or_now(p.occurred_at.as_deref(), Utc::now(), &self.zone).map_err(invalid)?,
            category: meals::parse_category(&p.category).map_err(invalid)?,
            food_name: p.food_name,
            serving_size: p.serving_size,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        let result = meals::log_meal(&self.database, data).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get a meal entry by id")]
    fn get_meal(&self, Parameters(p): Parameters<EntryParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meal(&self.database, p.owner_id, p.id).map_err(internal)?;
        found_or_error(result, "Meal entry", p.id)
    }

    #[tool(description = "List meals for a day or date range, newest first, optionally filtered by category")]
    fn list_meals(&self, Parameters(p): Parameters<ListMealsParams>) -> Result<CallToolResult, McpError> {
        let (start, end) = date_range(
            p.date.as_deref(),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            &self.zone,
        )
        .map_err(invalid)?;
        let category = p.category.as_deref().map(meals::parse_category).transpose().map_err(invalid)?;
        let result = meals::list_meals(&self.database, p.owner_id, start, end, category).map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Update a meal entry. Only the given fields change.")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealEntryUpdate {
            occurred_at: p.occurred_at.as_deref().map(|s| parse_instant(s, &self.zone)).transpose().map_err(invalid)?,
            category: p.category.as_deref().map(meals::parse_category).transpose().map_err(invalid)?,
            food_name: p.food_name,
            serving_size: p.serving_size,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        let result = meals::update_meal(&self.database, p.owner_id, p.id, data).map_err(invalid)?;
        found_or_error(result, "Meal entry", p.id)
    }

    #[tool(description = "Delete a meal entry")]
    fn delete_meal(&self, Parameters(p): Parameters<EntryParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, p.owner_id, p.id).map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Search the built-in food catalog by name for per-serving calories and macros")]
    fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::search_foods(&p.query, p.limit).map_err(invalid)?;
        json_result(&result)
    }

    // --- Water ---

    #[tool(description = "Log water intake in any volume unit; stored in ml")]
    fn log_water(&self, Parameters(p): Parameters<LogWaterParams>) -> Result<CallToolResult, McpError> {
        let occurred_at = instant_or_now(p.occurred_at.as_deref(), Utc::now(), &self.zone).map_err(invalid)?;
        let result = water::log_water(&self.database, p.owner_id, occurred_at, p.amount, &p.unit).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "List water entries for a day or date range, newest first, with today's total and count")]
    fn list_water(&self, Parameters(p): Parameters<ListRangeParams>) -> Result<CallToolResult, McpError> {
        let (start, end) = date_range(
            p.date.as_deref(),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            &self.zone,
        )
        .map_err(invalid)?;
        let result = water::list_water(&self.database, &self.reporter, p.owner_id, start, end, Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Update a water entry's amount or time")]
    fn update_water(&self, Parameters(p): Parameters<UpdateWaterParams>) -> Result<CallToolResult, McpError> {
        let occurred_at = p.occurred_at.as_deref().map(|s| parse_instant(s, &self.zone)).transpose().map_err(invalid)?;
        let result = water::update_water(&self.database, p.owner_id, p.id, occurred_at, p.amount, &p.unit)
            .map_err(invalid)?;
        found_or_error(result, "Water entry", p.id)
    }

    #[tool(description = "Delete a water entry")]
    fn delete_water(&self, Parameters(p): Parameters<EntryParams>) -> Result<CallToolResult, McpError> {
        let result = water::delete_water(&self.database, p.owner_id, p.id).map_err(internal)?;
        json_result(&result)
    }

    // --- Workouts ---

    #[tool(description = "Log a workout with duration and calories burned")]
    fn log_workout(&self, Parameters(p): Parameters<LogWorkoutParams>) -> Result<CallToolResult, McpError> {
        let data = WorkoutCreate {
            owner_id: p.owner_id,
            occurred_at: instant_or_now(p.occurred_at.as_deref(), Utc::now(), &self.zone).map_err(invalid)?,
            category: workouts::parse_category(&p.category).map_err(invalid)?,
            duration_minutes: p.duration_minutes,
            calories_burned: p.calories_burned,
            notes: p.notes,
        };
        let result = workouts::log_workout(&self.database, data).map_err(invalid)?;
        json_result(&result)
    }

    #[tool(description = "Get a workout by id")]
    fn get_workout(&self, Parameters(p): Parameters<EntryParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::get_workout(&self.database, p.owner_id, p.id).map_err(internal)?;
        found_or_error(result, "Workout", p.id)
    }

    #[tool(description = "List workouts for a day or date range, newest first, with today's totals")]
    fn list_workouts(&self, Parameters(p): Parameters<ListWorkoutsParams>) -> Result<CallToolResult, McpError> {
        let (start, end) = date_range(
            p.date.as_deref(),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            &self.zone,
        )
        .map_err(invalid)?;
        let category = p.category.as_deref().map(workouts::parse_category).transpose().map_err(invalid)?;
        let result = workouts::list_workouts(
            &self.database,
            &self.reporter,
            p.owner_id,
            start,
            end,
            category,
            Utc::now(),
        )
        .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Update a workout. Only the given fields change.")]
    fn update_workout(&self, Parameters(p): Parameters<UpdateWorkoutParams>) -> Result<CallToolResult, McpError> {
        let data = WorkoutUpdate {
            occurred_at: p.occurred_at.as_deref().map(|s| parse_instant(s, &self.zone)).transpose().map_err(invalid)?,
            category: p.category.as_deref().map(workouts::parse_category).transpose().map_err(invalid)?,
            duration_minutes: p.duration_minutes,
            calories_burned: p.calories_burned,
            notes: p.notes,
        };
        let result = workouts::update_workout(&self.database, p.owner_id, p.id, data).map_err(invalid)?;
        found_or_error(result, "Workout", p.id)
    }

    #[tool(description = "Delete a workout")]
    fn delete_workout(&self, Parameters(p): Parameters<EntryParams>) -> Result<CallToolResult, McpError> {
        let result = workouts::delete_workout(&self.database, p.owner_id, p.id).map_err(internal)?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Meal totals for one day with a Breakfast/Lunch/Dinner/Snack breakdown (default today)")]
    fn daily_summary(&self, Parameters(p): Parameters<DayReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::daily_summary(&self.reporter, p.owner_id, p.date.as_deref(), Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Calories left and macro progress against the user's targets for one day (default today)")]
    fn daily_progress(&self, Parameters(p): Parameters<DayReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::daily_progress(&self.reporter, p.owner_id, p.date.as_deref(), Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Average daily calories, weight still to lose or gain, workout sessions and water consistency over the last days_back days")]
    fn period_summary(&self, Parameters(p): Parameters<PeriodReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::period_summary(&self.reporter, p.owner_id, p.days_back, Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Daily calories and macros for each day with meals in the last days_back days, oldest first")]
    fn calorie_trend(&self, Parameters(p): Parameters<PeriodReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::calorie_trend(&self.reporter, p.owner_id, p.days_back, Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Percent split of protein, carbs and fat over the last days_back days")]
    fn macro_split(&self, Parameters(p): Parameters<PeriodReportParams>) -> Result<CallToolResult, McpError> {
        let result = reports::macro_split(&self.reporter, p.owner_id, p.days_back, Utc::now())
            .map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Water per day for the last 7 days with percent of the daily water goal")]
    fn water_trend(&self, Parameters(p): Parameters<OwnerParams>) -> Result<CallToolResult, McpError> {
        let result = reports::water_trend(&self.reporter, p.owner_id, Utc::now()).map_err(internal)?;
        json_result(&result)
    }

    #[tool(description = "Today's meal summary, calorie progress, water and workouts in one call")]
    fn dashboard(&self, Parameters(p): Parameters<OwnerParams>) -> Result<CallToolResult, McpError> {
        let result = reports::dashboard(&self.reporter, p.owner_id, Utc::now()).map_err(internal)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for NutrilogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrilog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("nutrilog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "nutrilog - meal, water and workout logging with daily and period reports. \
                 Call logging_instructions first. \
                 Users: create_user/get_user/list_users/update_goals. \
                 Meals: log_meal/get_meal/list_meals/update_meal/delete_meal, search_foods. \
                 Water: log_water/list_water/update_water/delete_water. \
                 Workouts: log_workout/get_workout/list_workouts/update_workout/delete_workout. \
                 Reports: daily_summary, daily_progress, period_summary, calorie_trend, macro_split, water_trend, dashboard."
                    .into(),
            ),
        }
    }
}
