//! SQLite-backed event store for reporting
//!
//! Each call checks out its own pooled connection and returns it before the
//! next fetch, so reports never hold two connections at once.

use crate::models::{MealEntry, User, UserGoals, WaterEntry, Workout};
use crate::reporting::range::TimeWindow;
use crate::reporting::source::{EventStore, GoalsProvider, StoreError};

use super::{Database, DbError};

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl EventStore for Database {
    fn find_meals(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<MealEntry>, StoreError> {
        let conn = self.get_conn()?;
        Ok(MealEntry::list(
            &conn,
            owner_id,
            Some(&window.start()),
            Some(&window.end()),
            None,
        )?)
    }

    fn find_water(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<WaterEntry>, StoreError> {
        let conn = self.get_conn()?;
        Ok(WaterEntry::list(
            &conn,
            owner_id,
            Some(&window.start()),
            Some(&window.end()),
        )?)
    }

    fn find_workouts(&self, owner_id: i64, window: &TimeWindow) -> Result<Vec<Workout>, StoreError> {
        let conn = self.get_conn()?;
        Ok(Workout::list(
            &conn,
            owner_id,
            Some(&window.start()),
            Some(&window.end()),
            None,
        )?)
    }
}

impl GoalsProvider for Database {
    fn get_goals(&self, owner_id: i64) -> Result<UserGoals, StoreError> {
        let conn = self.get_conn()?;
        User::get_by_id(&conn, owner_id)?
            .map(|user| user.goals())
            .ok_or(StoreError::NotFound(owner_id))
    }
}
