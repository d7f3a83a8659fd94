//! Data models
//!
//! Rust structs representing database entities.

mod meal_entry;
mod user;
mod water_entry;
mod workout;

pub use meal_entry::{MealCategory, MealEntry, MealEntryCreate, MealEntryUpdate};
pub use user::{
    PrimaryGoal, User, UserCreate, UserGoals, UserUpdate, DEFAULT_CALORIE_GOAL,
    DEFAULT_CARBS_TARGET_G, DEFAULT_FAT_TARGET_G, DEFAULT_PROTEIN_TARGET_G, DEFAULT_WATER_GOAL_ML,
    MAX_AGE, MAX_HEIGHT_CM, MAX_WEIGHT_KG, MIN_AGE, MIN_HEIGHT_CM, MIN_WEIGHT_KG,
};
pub use water_entry::{WaterEntry, WaterEntryCreate, WaterEntryUpdate};
pub use workout::{Workout, WorkoutCategory, WorkoutCreate, WorkoutUpdate};
