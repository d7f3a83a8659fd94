//! Reporter
//!
//! The entry point the tool layer calls. Each report resolves its window,
//! fetches the event kinds it needs, buckets them by local day and derives the
//! result. `now` is always passed in so "today" can be pinned.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, warn};

use super::bucket::{bucket_meals, bucket_water, bucket_workouts};
use super::calendar::{Calendar, Zone};
use super::error::{EventKind, ReportError, ReportResult};
use super::range::{last_n_days, resolve_today, resolve_window, today, TimeWindow};
use super::source::{EventStore, GoalsProvider, StoreError};
use super::summary::{
    self, DailyProgress, DailySummary, MacroSplit, PeriodSummary, TodayWaterStats,
    TodayWorkoutStats,
};
use super::trend::{self, CalorieTrendPoint, WaterTrendPoint, WATER_TREND_DAYS};
use crate::models::{MealEntry, UserGoals, WaterEntry, Workout};

#[derive(Debug, Clone)]
pub struct Reporter<S, C = Zone> {
    store: S,
    calendar: C,
}

fn upstream(kind: EventKind, owner_id: i64, source: StoreError) -> ReportError {
    warn!(owner_id, %kind, error = %source, "report fetch failed");
    ReportError::UpstreamFetch { kind, source }
}

impl<S, C> Reporter<S, C>
where
    S: EventStore + GoalsProvider,
    C: Calendar,
{
    pub fn new(store: S, calendar: C) -> Self {
        Self { store, calendar }
    }

    fn meals(&self, owner_id: i64, window: &TimeWindow) -> ReportResult<Vec<MealEntry>> {
        let meals = self
            .store
            .find_meals(owner_id, window)
            .map_err(|e| upstream(EventKind::Meals, owner_id, e))?;
        debug!(owner_id, start = %window.start(), end = %window.end(), count = meals.len(), "fetched meals");
        Ok(meals)
    }

    fn water(&self, owner_id: i64, window: &TimeWindow) -> ReportResult<Vec<WaterEntry>> {
        let water = self
            .store
            .find_water(owner_id, window)
            .map_err(|e| upstream(EventKind::Water, owner_id, e))?;
        debug!(owner_id, start = %window.start(), end = %window.end(), count = water.len(), "fetched water");
        Ok(water)
    }

    fn workouts(&self, owner_id: i64, window: &TimeWindow) -> ReportResult<Vec<Workout>> {
        let workouts = self
            .store
            .find_workouts(owner_id, window)
            .map_err(|e| upstream(EventKind::Workouts, owner_id, e))?;
        debug!(owner_id, start = %window.start(), end = %window.end(), count = workouts.len(), "fetched workouts");
        Ok(workouts)
    }

    fn goals(&self, owner_id: i64) -> ReportResult<UserGoals> {
        match self.store.get_goals(owner_id) {
            Ok(goals) => Ok(goals),
            Err(StoreError::NotFound(id)) => Err(ReportError::OwnerNotFound(id)),
            Err(e) => Err(upstream(EventKind::Goals, owner_id, e)),
        }
    }

    /// Meal totals for one day, today if `date` is `None`
    pub fn daily_summary(
        &self,
        owner_id: i64,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ReportResult<DailySummary> {
        let window = resolve_window(date, None, now, &self.calendar)?;
        let date = date.unwrap_or_else(|| today(now, &self.calendar));

        let buckets = bucket_meals(&self.meals(owner_id, &window)?, &self.calendar);
        Ok(summary::daily_summary(&buckets, date))
    }

    /// Averages and goal attainment over the last `days_back` days
    pub fn period_summary(
        &self,
        owner_id: i64,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> ReportResult<PeriodSummary> {
        let window = resolve_window(None, Some(days_back), now, &self.calendar)?;
        let goals = self.goals(owner_id)?;

        let meals = bucket_meals(&self.meals(owner_id, &window)?, &self.calendar);
        let water = bucket_water(&self.water(owner_id, &window)?, &self.calendar);
        let workouts = bucket_workouts(&self.workouts(owner_id, &window)?, &self.calendar);

        Ok(PeriodSummary {
            days_back,
            avg_calories: summary::average_calories(&meals),
            weight_change: summary::weight_change(&goals),
            workout_sessions: summary::workout_sessions(&workouts),
            water_consistency: summary::water_consistency(&water, goals.daily_water_goal_ml),
        })
    }

    pub fn calorie_trend(
        &self,
        owner_id: i64,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> ReportResult<Vec<CalorieTrendPoint>> {
        let window = resolve_window(None, Some(days_back), now, &self.calendar)?;
        let buckets = bucket_meals(&self.meals(owner_id, &window)?, &self.calendar);
        Ok(trend::calorie_trend(&buckets))
    }

    pub fn macro_split(
        &self,
        owner_id: i64,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> ReportResult<MacroSplit> {
        let window = resolve_window(None, Some(days_back), now, &self.calendar)?;
        let buckets = bucket_meals(&self.meals(owner_id, &window)?, &self.calendar);
        Ok(summary::macro_split(&buckets))
    }

    /// Water per day for the last week. Owners without a profile are measured
    /// against the default water goal.
    pub fn water_trend(&self, owner_id: i64, now: DateTime<Utc>) -> ReportResult<Vec<WaterTrendPoint>> {
        let window = last_n_days(WATER_TREND_DAYS, now, &self.calendar)?;
        let goals = match self.goals(owner_id) {
            Ok(goals) => goals,
            Err(ReportError::OwnerNotFound(_)) => {
                debug!(owner_id, "no profile, using default water goal");
                UserGoals::defaults(owner_id)
            }
            Err(e) => return Err(e),
        };

        let buckets = bucket_water(&self.water(owner_id, &window)?, &self.calendar);
        Ok(trend::water_trend(
            &buckets,
            today(now, &self.calendar),
            goals.daily_water_goal_ml,
        ))
    }

    pub fn today_water_stats(&self, owner_id: i64, now: DateTime<Utc>) -> ReportResult<TodayWaterStats> {
        let window = resolve_today(now, &self.calendar);
        let buckets = bucket_water(&self.water(owner_id, &window)?, &self.calendar);
        Ok(summary::today_water_stats(&buckets))
    }

    pub fn today_workout_stats(&self, owner_id: i64, now: DateTime<Utc>) -> ReportResult<TodayWorkoutStats> {
        let window = resolve_today(now, &self.calendar);
        let buckets = bucket_workouts(&self.workouts(owner_id, &window)?, &self.calendar);
        Ok(summary::today_workout_stats(&buckets))
    }

    /// Calories left and macro targets for one day, today if `date` is `None`
    pub fn daily_progress(
        &self,
        owner_id: i64,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> ReportResult<DailyProgress> {
        let window = resolve_window(date, None, now, &self.calendar)?;
        let date = date.unwrap_or_else(|| today(now, &self.calendar));
        let goals = self.goals(owner_id)?;

        let buckets = bucket_meals(&self.meals(owner_id, &window)?, &self.calendar);
        let totals = buckets.get(date).map(|b| b.totals).unwrap_or_default();

        Ok(DailyProgress {
            date,
            calories: summary::calorie_progress(totals.calories, &goals),
            macros: summary::macro_progress(&totals, &goals),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::Database;
    use crate::models::{
        MealCategory, MealEntryCreate, User, UserCreate, UserUpdate, WaterEntryCreate,
        WorkoutCategory, WorkoutCreate,
    };
    use chrono::{Duration, FixedOffset, TimeZone};
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn setup() -> (Reporter<Database, Utc>, Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let owner = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                User::create(conn, &UserCreate::named("Ada"))
            })
            .unwrap()
            .id;
        (Reporter::new(db.clone(), Utc), db, owner)
    }

    fn log_meal(db: &Database, owner_id: i64, occurred_at: DateTime<Utc>, category: MealCategory, calories: f64) {
        db.with_conn(|conn| {
            MealEntry::create(
                conn,
                &MealEntryCreate {
                    owner_id,
                    occurred_at,
                    category,
                    food_name: "Test food".to_string(),
                    serving_size: None,
                    calories,
                    protein: Some(calories / 20.0),
                    carbs: Some(calories / 10.0),
                    fat: Some(calories / 40.0),
                },
            )
        })
        .unwrap();
    }

    fn log_water(db: &Database, owner_id: i64, occurred_at: DateTime<Utc>, amount_ml: f64) {
        db.with_conn(|conn| {
            WaterEntry::create(conn, &WaterEntryCreate { owner_id, occurred_at, amount_ml })
        })
        .unwrap();
    }

    fn log_workout(db: &Database, owner_id: i64, occurred_at: DateTime<Utc>) {
        db.with_conn(|conn| {
            Workout::create(
                conn,
                &WorkoutCreate {
                    owner_id,
                    occurred_at,
                    category: WorkoutCategory::Strength,
                    duration_minutes: 40.0,
                    calories_burned: 250.0,
                    notes: None,
                },
            )
        })
        .unwrap();
    }

    #[test]
    fn test_daily_summary_scenario() {
        let (reporter, db, owner) = setup();
        log_meal(&db, owner, at(1, 8), MealCategory::Breakfast, 500.0);
        log_meal(&db, owner, at(1, 12), MealCategory::Lunch, 700.0);
        log_meal(&db, owner, at(2, 12), MealCategory::Lunch, 900.0);

        let summary = reporter.daily_summary(owner, Some(date(1)), now()).unwrap();
        assert_eq!(summary.total_calories, 1200);
        assert_eq!(summary.meal_breakdown.breakfast.calories, 500);
        assert_eq!(summary.meal_breakdown.lunch.count, 1);
        assert_eq!(summary.meal_breakdown.dinner.count, 0);
    }

    #[test]
    fn test_daily_summary_defaults_to_today() {
        let (reporter, db, owner) = setup();
        log_meal(&db, owner, at(10, 8), MealCategory::Breakfast, 350.0);

        let summary = reporter.daily_summary(owner, None, now()).unwrap();
        assert_eq!(summary.date, date(10));
        assert_eq!(summary.total_calories, 350);
    }

    #[test]
    fn test_period_summary() {
        let (reporter, db, owner) = setup();
        db.with_conn(|conn| {
            User::update(
                conn,
                owner,
                &UserUpdate {
                    current_weight_kg: Some(Some(80.0)),
                    goal_weight_kg: Some(Some(75.0)),
                    ..Default::default()
                },
            )
        })
        .unwrap();

        log_meal(&db, owner, at(8, 12), MealCategory::Lunch, 1500.0);
        log_meal(&db, owner, at(9, 8), MealCategory::Breakfast, 1000.0);
        log_meal(&db, owner, at(9, 19), MealCategory::Dinner, 1100.0);
        log_water(&db, owner, at(8, 9), 2500.0);
        log_water(&db, owner, at(9, 9), 800.0);
        log_workout(&db, owner, at(8, 7));
        log_workout(&db, owner, at(9, 7));
        log_workout(&db, owner, at(9, 18));

        let period = reporter.period_summary(owner, 7, now()).unwrap();
        assert_eq!(period.avg_calories, 1800);
        assert_eq!(period.weight_change, 5.0);
        assert_eq!(period.workout_sessions, 3);
        assert_eq!(period.water_consistency, 50);
    }

    #[test]
    fn test_period_window_includes_n_plus_one_days() {
        let (reporter, db, owner) = setup();
        // Local midnight of today - 7 is inside a 7-day lookback
        log_meal(&db, owner, at(3, 0), MealCategory::Breakfast, 600.0);
        log_meal(&db, owner, at(2, 23), MealCategory::Snack, 10_000.0);

        let period = reporter.period_summary(owner, 7, now()).unwrap();
        assert_eq!(period.avg_calories, 600);
    }

    #[test]
    fn test_period_summary_empty_window() {
        let (reporter, _db, owner) = setup();
        let period = reporter.period_summary(owner, 30, now()).unwrap();

        assert_eq!(period.avg_calories, 0);
        assert_eq!(period.water_consistency, 0);
        assert_eq!(period.workout_sessions, 0);
        assert_eq!(period.weight_change, 0.0);
    }

    #[test]
    fn test_period_summary_requires_owner() {
        let (reporter, _db, owner) = setup();
        assert!(matches!(
            reporter.period_summary(owner + 1, 7, now()),
            Err(ReportError::OwnerNotFound(id)) if id == owner + 1
        ));
    }

    #[test]
    fn test_negative_days_back_rejected() {
        let (reporter, _db, owner) = setup();
        assert!(matches!(reporter.calorie_trend(owner, -3, now()), Err(ReportError::InvalidWindow(_))));
        assert!(matches!(reporter.macro_split(owner, -1, now()), Err(ReportError::InvalidWindow(_))));
    }

    #[test]
    fn test_calorie_trend_and_macro_split() {
        let (reporter, db, owner) = setup();
        log_meal(&db, owner, at(9, 12), MealCategory::Lunch, 800.0);
        log_meal(&db, owner, at(6, 12), MealCategory::Lunch, 400.0);

        let trend = reporter.calorie_trend(owner, 7, now()).unwrap();
        let dates: Vec<_> = trend.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(6), date(9)]);

        // protein = cal/20, carbs = cal/10, fat = cal/40
        let split = reporter.macro_split(owner, 7, now()).unwrap();
        assert_eq!(split, MacroSplit { protein: 29, carbs: 57, fat: 14 });

        assert_eq!(
            reporter.macro_split(owner + 1, 7, now()).unwrap(),
            summary::DEFAULT_MACRO_SPLIT
        );
    }

    #[test]
    fn test_water_trend_without_profile_uses_default_goal() {
        let (reporter, db, owner) = setup();
        log_water(&db, owner, at(10, 9), 1000.0);
        log_water(&db, owner, at(3, 9), 3000.0);

        let trend = reporter.water_trend(owner, now()).unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].date, date(4));
        assert_eq!(trend[6].amount, 1000);
        assert_eq!(trend[6].percentage, 50);

        let stranger = reporter.water_trend(owner + 1, now()).unwrap();
        assert_eq!(stranger.len(), 7);
        assert!(stranger.iter().all(|p| p.amount == 0));
    }

    #[test]
    fn test_water_trend_uses_owner_goal() {
        let (reporter, db, owner) = setup();
        db.with_conn(|conn| {
            User::update(conn, owner, &UserUpdate { daily_water_goal_ml: Some(1000.0), ..Default::default() })
        })
        .unwrap();
        log_water(&db, owner, at(10, 9), 500.0);

        let trend = reporter.water_trend(owner, now()).unwrap();
        assert_eq!(trend[6].percentage, 50);
    }

    #[test]
    fn test_today_stats_ignore_rest_of_window() {
        let (reporter, db, owner) = setup();
        log_water(&db, owner, at(10, 8), 250.0);
        log_water(&db, owner, at(10, 13), 500.0);
        log_water(&db, owner, at(9, 13), 2000.0);
        log_workout(&db, owner, at(10, 7));
        log_workout(&db, owner, at(8, 7));

        assert_eq!(
            reporter.today_water_stats(owner, now()).unwrap(),
            TodayWaterStats { total: 750, count: 2 }
        );
        assert_eq!(
            reporter.today_workout_stats(owner, now()).unwrap(),
            TodayWorkoutStats { count: 1, total_duration: 40, total_calories: 250 }
        );
    }

    #[test]
    fn test_today_follows_configured_offset() {
        let db = Database::open_in_memory().unwrap();
        let owner = db
            .with_conn(|conn| {
                run_migrations(conn)?;
                User::create(conn, &UserCreate::named("Ada"))
            })
            .unwrap()
            .id;
        let reporter = Reporter::new(db.clone(), Zone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap()));

        // 03:00 UTC on Jan 10 is still Jan 9 at -05:00
        log_water(&db, owner, at(10, 3), 400.0);
        let late_evening = at(10, 4);
        assert_eq!(reporter.today_water_stats(owner, late_evening).unwrap().total, 400);
        assert_eq!(reporter.today_water_stats(owner, late_evening + Duration::hours(1)).unwrap().total, 0);
    }

    #[test]
    fn test_daily_progress() {
        let (reporter, db, owner) = setup();
        log_meal(&db, owner, at(10, 8), MealCategory::Breakfast, 600.0);
        log_meal(&db, owner, at(10, 12), MealCategory::Lunch, 900.0);

        let progress = reporter.daily_progress(owner, None, now()).unwrap();
        assert_eq!(progress.calories.consumed, 1500);
        assert_eq!(progress.calories.remaining, 500);
        assert_eq!(progress.calories.percent, 75);
        assert_eq!(progress.macros.protein.consumed, 75);
        assert_eq!(progress.macros.protein.target, 140);

        assert!(matches!(
            reporter.daily_progress(owner + 1, None, now()),
            Err(ReportError::OwnerNotFound(_))
        ));
    }

    /// Store whose water fetch always fails; counts fetch attempts
    #[derive(Default)]
    struct FlakyStore {
        fetches: Cell<usize>,
    }

    impl EventStore for FlakyStore {
        fn find_meals(&self, _: i64, _: &TimeWindow) -> Result<Vec<MealEntry>, StoreError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(Vec::new())
        }

        fn find_water(&self, _: i64, _: &TimeWindow) -> Result<Vec<WaterEntry>, StoreError> {
            self.fetches.set(self.fetches.get() + 1);
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        fn find_workouts(&self, _: i64, _: &TimeWindow) -> Result<Vec<Workout>, StoreError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(Vec::new())
        }
    }

    impl GoalsProvider for FlakyStore {
        fn get_goals(&self, owner_id: i64) -> Result<UserGoals, StoreError> {
            Ok(UserGoals::defaults(owner_id))
        }
    }

    #[test]
    fn test_failed_fetch_fails_whole_report() {
        let reporter = Reporter::new(FlakyStore::default(), Utc);

        let err = reporter.period_summary(1, 7, now()).unwrap_err();
        assert!(matches!(err, ReportError::UpstreamFetch { kind: EventKind::Water, .. }));

        assert!(reporter.daily_summary(1, None, now()).is_ok());
    }

    #[test]
    fn test_invalid_window_rejected_before_fetch() {
        let reporter = Reporter::new(FlakyStore::default(), Utc);
        assert!(reporter.period_summary(1, -1, now()).is_err());
        assert_eq!(reporter.store.fetches.get(), 0);
    }
}
