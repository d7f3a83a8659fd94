//! Data sources consumed by the reporter
//!
//! Reports never talk to storage directly; they read event slices and goals
//! through these traits so the aggregation can run over any backing store.

use thiserror::Error;

use super::range::TimeWindow;
use crate::models::{MealEntry, UserGoals, WaterEntry, Workout};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("owner {0} not found")]
    NotFound(i64),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to an owner's logged events.
///
/// Implementations return every event with `start <= occurred_at <= end`, in
/// any order.
pub trait EventStore {
    fn find_meals(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<MealEntry>, StoreError>;

    fn find_water(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<WaterEntry>, StoreError>;

    fn find_workouts(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<Workout>, StoreError>;
}

pub trait GoalsProvider {
    /// Goals for an owner, or [`StoreError::NotFound`] if the owner has no profile
    fn get_goals(&self, owner_id: i64) -> Result<UserGoals, StoreError>;
}
