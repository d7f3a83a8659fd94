//! Summary aggregation
//!
//! Derives report values from day buckets. Every division is guarded, so no
//! value here is ever NaN or infinite.

use chrono::NaiveDate;
use serde::Serialize;

use super::bucket::{DayBuckets, MacroTotals, MealBreakdown, MealBucket, WaterBucket, WorkoutBucket};
use crate::models::UserGoals;
use crate::nutrition::{capped_percent_of, percent_of, round_tenth, round_whole};

/// Split used when there are no macros to split
pub const DEFAULT_MACRO_SPLIT: MacroSplit = MacroSplit {
    protein: 30,
    carbs: 45,
    fat: 25,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_calories: i64,
    pub total_protein: i64,
    pub total_carbs: i64,
    pub total_fat: i64,
    pub meal_count: usize,
    pub meal_breakdown: MealBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub days_back: i64,
    pub avg_calories: i64,
    /// Kilograms still to go; positive means above goal
    pub weight_change: f64,
    pub workout_sessions: usize,
    /// Percent of water-logged days that met the water goal
    pub water_consistency: i64,
}

/// Percent share of protein, carbs and fat grams.
///
/// Each share is rounded on its own, so the three may sum to 99 or 101.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroSplit {
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayWaterStats {
    pub total: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodayWorkoutStats {
    pub count: usize,
    pub total_duration: i64,
    pub total_calories: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalorieProgress {
    pub consumed: i64,
    pub goal: i64,
    /// Negative once the goal is exceeded
    pub remaining: i64,
    /// Percent of goal, capped at 100
    pub percent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroTarget {
    pub consumed: i64,
    pub target: i64,
    pub percent: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroProgress {
    pub protein: MacroTarget,
    pub carbs: MacroTarget,
    pub fat: MacroTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub calories: CalorieProgress,
    pub macros: MacroProgress,
}

/// Totals for one day, zeroed when nothing was logged
pub fn daily_summary(buckets: &DayBuckets<MealBucket>, date: NaiveDate) -> DailySummary {
    let bucket = buckets.get(date).copied().unwrap_or_default();
    DailySummary {
        date,
        total_calories: bucket.totals.calories,
        total_protein: bucket.totals.protein,
        total_carbs: bucket.totals.carbs,
        total_fat: bucket.totals.fat,
        meal_count: bucket.count,
        meal_breakdown: bucket.breakdown,
    }
}

/// Average daily calories over the days that have at least one meal
pub fn average_calories(buckets: &DayBuckets<MealBucket>) -> i64 {
    let logged: Vec<_> = buckets.values().filter(|b| b.count > 0).collect();
    if logged.is_empty() {
        return 0;
    }
    let total = logged.iter().fold(0i64, |acc, b| acc.saturating_add(b.totals.calories));
    round_whole(total as f64 / logged.len() as f64)
}

/// Percent of water-logged days whose total reached `goal_ml`
pub fn water_consistency(buckets: &DayBuckets<WaterBucket>, goal_ml: i64) -> i64 {
    let logged_days = buckets.values().filter(|b| b.count > 0).count() as i64;
    let met_days = buckets
        .values()
        .filter(|b| b.count > 0 && b.total_ml >= goal_ml)
        .count() as i64;
    percent_of(met_days, logged_days)
}

/// Number of workouts, not number of days with a workout
pub fn workout_sessions(buckets: &DayBuckets<WorkoutBucket>) -> usize {
    buckets.values().map(|b| b.count).sum()
}

/// `current - goal` to one decimal, or 0 unless both weights are set
pub fn weight_change(goals: &UserGoals) -> f64 {
    match (goals.current_weight_kg, goals.goal_weight_kg) {
        (Some(current), Some(goal)) => round_tenth(current - goal),
        _ => 0.0,
    }
}

pub fn macro_totals(buckets: &DayBuckets<MealBucket>) -> MacroTotals {
    buckets.values().fold(MacroTotals::default(), |acc, b| MacroTotals {
        calories: acc.calories.saturating_add(b.totals.calories),
        protein: acc.protein.saturating_add(b.totals.protein),
        carbs: acc.carbs.saturating_add(b.totals.carbs),
        fat: acc.fat.saturating_add(b.totals.fat),
    })
}

pub fn macro_split(buckets: &DayBuckets<MealBucket>) -> MacroSplit {
    let totals = macro_totals(buckets);
    let sum = totals.protein.saturating_add(totals.carbs).saturating_add(totals.fat);
    if sum <= 0 {
        return DEFAULT_MACRO_SPLIT;
    }
    MacroSplit {
        protein: percent_of(totals.protein, sum),
        carbs: percent_of(totals.carbs, sum),
        fat: percent_of(totals.fat, sum),
    }
}

pub fn today_water_stats(buckets: &DayBuckets<WaterBucket>) -> TodayWaterStats {
    buckets.values().fold(TodayWaterStats::default(), |acc, b| TodayWaterStats {
        total: acc.total.saturating_add(b.total_ml),
        count: acc.count + b.count,
    })
}

pub fn today_workout_stats(buckets: &DayBuckets<WorkoutBucket>) -> TodayWorkoutStats {
    buckets.values().fold(TodayWorkoutStats::default(), |acc, b| TodayWorkoutStats {
        count: acc.count + b.count,
        total_duration: acc.total_duration.saturating_add(b.total_duration),
        total_calories: acc.total_calories.saturating_add(b.total_calories),
    })
}

pub fn calorie_progress(consumed: i64, goals: &UserGoals) -> CalorieProgress {
    CalorieProgress {
        consumed,
        goal: goals.daily_calorie_goal,
        remaining: goals.daily_calorie_goal - consumed,
        percent: capped_percent_of(consumed, goals.daily_calorie_goal),
    }
}

fn macro_target(consumed: i64, target: i64) -> MacroTarget {
    MacroTarget {
        consumed,
        target,
        percent: capped_percent_of(consumed, target),
    }
}

pub fn macro_progress(totals: &MacroTotals, goals: &UserGoals) -> MacroProgress {
    MacroProgress {
        protein: macro_target(totals.protein, goals.protein_target_g),
        carbs: macro_target(totals.carbs, goals.carbs_target_g),
        fat: macro_target(totals.fat, goals.fat_target_g),
    }
}
