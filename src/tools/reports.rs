//! Report MCP Tools
//!
//! Thin wrappers over [`Reporter`] that parse tool arguments and format errors.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::Database;
use crate::reporting::summary::{
    DailyProgress, DailySummary, MacroSplit, PeriodSummary, TodayWaterStats, TodayWorkoutStats,
};
use crate::reporting::trend::{CalorieTrendPoint, WaterTrendPoint};
use crate::reporting::{Reporter, Zone};
use crate::tools::input::parse_optional_date;

/// Lookback used when a report is asked for without `days_back`
pub const DEFAULT_DAYS_BACK: i64 = 30;

/// Everything the dashboard shows for today
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub summary: DailySummary,
    pub progress: DailyProgress,
    pub water: TodayWaterStats,
    pub workouts: TodayWorkoutStats,
}

#[derive(Debug, Serialize)]
pub struct CalorieTrendResponse {
    pub days_back: i64,
    pub points: Vec<CalorieTrendPoint>,
}

#[derive(Debug, Serialize)]
pub struct WaterTrendResponse {
    pub points: Vec<WaterTrendPoint>,
}

type AppReporter = Reporter<Database, Zone>;

pub fn daily_summary(
    reporter: &AppReporter,
    owner_id: i64,
    date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DailySummary, String> {
    let date = parse_optional_date(date)?;
    reporter
        .daily_summary(owner_id, date, now)
        .map_err(|e| format!("Failed to build daily summary: {}", e))
}

pub fn period_summary(
    reporter: &AppReporter,
    owner_id: i64,
    days_back: Option<i64>,
    now: DateTime<Utc>,
) -> Result<PeriodSummary, String> {
    reporter
        .period_summary(owner_id, days_back.unwrap_or(DEFAULT_DAYS_BACK), now)
        .map_err(|e| format!("Failed to build period summary: {}", e))
}

pub fn calorie_trend(
    reporter: &AppReporter,
    owner_id: i64,
    days_back: Option<i64>,
    now: DateTime<Utc>,
) -> Result<CalorieTrendResponse, String> {
    let days_back = days_back.unwrap_or(DEFAULT_DAYS_BACK);
    let points = reporter
        .calorie_trend(owner_id, days_back, now)
        .map_err(|e| format!("Failed to build calorie trend: {}", e))?;
    Ok(CalorieTrendResponse { days_back, points })
}

pub fn macro_split(
    reporter: &AppReporter,
    owner_id: i64,
    days_back: Option<i64>,
    now: DateTime<Utc>,
) -> Result<MacroSplit, String> {
    reporter
        .macro_split(owner_id, days_back.unwrap_or(DEFAULT_DAYS_BACK), now)
        .map_err(|e| format!("Failed to build macro split: {}", e))
}

pub fn water_trend(
    reporter: &AppReporter,
    owner_id: i64,
    now: DateTime<Utc>,
) -> Result<WaterTrendResponse, String> {
    let points = reporter
        .water_trend(owner_id, now)
        .map_err(|e| format!("Failed to build water trend: {}", e))?;
    Ok(WaterTrendResponse { points })
}

pub fn daily_progress(
    reporter: &AppReporter,
    owner_id: i64,
    date: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DailyProgress, String> {
    let date = parse_optional_date(date)?;
    reporter
        .daily_progress(owner_id, date, now)
        .map_err(|e| format!("Failed to build daily progress: {}", e))
}

/// Today's summary, calorie progress, water and workouts in one call
pub fn dashboard(
    reporter: &AppReporter,
    owner_id: i64,
    now: DateTime<Utc>,
) -> Result<DashboardResponse, String> {
    let progress = reporter
        .daily_progress(owner_id, None, now)
        .map_err(|e| format!("Failed to build dashboard: {}", e))?;
    let summary = reporter
        .daily_summary(owner_id, None, now)
        .map_err(|e| format!("Failed to build dashboard: {}", e))?;
    let water = reporter
        .today_water_stats(owner_id, now)
        .map_err(|e| format!("Failed to build dashboard: {}", e))?;
    let workouts = reporter
        .today_workout_stats(owner_id, now)
        .map_err(|e| format!("Failed to build dashboard: {}", e))?;

    Ok(DashboardResponse {
        summary,
        progress,
        water,
        workouts,
    })
}
