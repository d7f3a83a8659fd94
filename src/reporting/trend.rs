//! Chart-ready trend series

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

use super::bucket::{DayBuckets, MealBucket, WaterBucket};
use crate::nutrition::capped_percent_of;

/// The water chart always shows this many days
pub const WATER_TREND_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalorieTrendPoint {
    pub date: NaiveDate,
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaterTrendPoint {
    pub date: NaiveDate,
    /// Single-letter weekday label
    pub day: &'static str,
    pub full_day: &'static str,
    pub amount: i64,
    /// Percent of the daily water goal, capped at 100
    pub percentage: i64,
}

fn weekday_letter(date: &NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "M",
        Weekday::Tue => "T",
        Weekday::Wed => "W",
        Weekday::Thu => "T",
        Weekday::Fri => "F",
        Weekday::Sat => "S",
        Weekday::Sun => "S",
    }
}

fn weekday_name(date: &NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// One point per day that has at least one meal, oldest first. Days without
/// meals are left out rather than zero-filled.
pub fn calorie_trend(buckets: &DayBuckets<MealBucket>) -> Vec<CalorieTrendPoint> {
    let mut points: Vec<_> = buckets
        .iter()
        .filter(|(_, b)| b.count > 0)
        .map(|(date, b)| CalorieTrendPoint {
            date,
            calories: b.totals.calories,
            protein: b.totals.protein,
            carbs: b.totals.carbs,
            fat: b.totals.fat,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// Exactly [`WATER_TREND_DAYS`] points ending at `today`, oldest first, with
/// zero for days nothing was logged
pub fn water_trend(buckets: &DayBuckets<WaterBucket>, today: NaiveDate, goal_ml: i64) -> Vec<WaterTrendPoint> {
    (0..WATER_TREND_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
        .map(|date| {
            let amount = buckets.get(date).map(|b| b.total_ml).unwrap_or(0);
            WaterTrendPoint {
                date,
                day: weekday_letter(&date),
                full_day: weekday_name(&date),
                amount,
                percentage: capped_percent_of(amount, goal_ml),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealCategory;
    use crate::reporting::bucket::fixtures::*;
    use crate::reporting::bucket::{bucket_meals, bucket_water};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_calorie_trend_is_sparse_and_ascending() {
        let meals = vec![
            meal_with_macros(at(2024, 1, 5, 12), 600, 30, 60, 20),
            meal(at(2024, 1, 1, 8), MealCategory::Breakfast, 400),
            meal(at(2024, 1, 5, 19), MealCategory::Dinner, 800),
        ];
        let trend = calorie_trend(&bucket_meals(&meals, &Utc));

        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, date(2024, 1, 1));
        assert_eq!(trend[0].calories, 400);
        assert_eq!(trend[1].date, date(2024, 1, 5));
        assert_eq!(trend[1].calories, 1400);
        assert_eq!(trend[1].protein, 30);
    }

    #[test]
    fn test_water_trend_always_has_seven_points() {
        let today = date(2024, 1, 7);
        assert_eq!(water_trend(&DayBuckets::default(), today, 2000).len(), 7);

        let one = vec![water(at(2024, 1, 7, 9), 500)];
        assert_eq!(water_trend(&bucket_water(&one, &Utc), today, 2000).len(), 7);

        let many: Vec<_> = (0..50).map(|i| water(at(2024, 1, 1 + i % 7, 9), 100)).collect();
        assert_eq!(water_trend(&bucket_water(&many, &Utc), today, 2000).len(), 7);
    }

    #[test]
    fn test_water_trend_labels_and_percentages() {
        // 2024-01-07 is a Sunday
        let today = date(2024, 1, 7);
        let entries = vec![
            water(at(2024, 1, 1, 9), 1000),
            water(at(2024, 1, 7, 9), 2500),
        ];
        let trend = water_trend(&bucket_water(&entries, &Utc), today, 2000);

        assert_eq!(trend[0].date, date(2024, 1, 1));
        assert_eq!(trend[0].day, "M");
        assert_eq!(trend[0].full_day, "Monday");
        assert_eq!(trend[0].amount, 1000);
        assert_eq!(trend[0].percentage, 50);

        assert_eq!(trend[3].amount, 0);
        assert_eq!(trend[3].percentage, 0);

        assert_eq!(trend[6].date, today);
        assert_eq!(trend[6].full_day, "Sunday");
        assert_eq!(trend[6].percentage, 100);
    }

    #[test]
    fn test_water_trend_ignores_same_weekday_outside_range() {
        // The Sunday a week earlier must not leak into today's slot
        let today = date(2024, 1, 7);
        let entries = vec![
            water(at(2023, 12, 31, 9), 1500),
            water(at(2024, 1, 7, 9), 500),
        ];
        let trend = water_trend(&bucket_water(&entries, &Utc), today, 2000);

        assert_eq!(trend[6].amount, 500);
        assert_eq!(trend.iter().map(|p| p.amount).sum::<i64>(), 500);
    }
}
