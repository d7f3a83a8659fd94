//! Daily bucketing
//!
//! Groups raw events by the local calendar date they happened on and sums
//! them. Buckets keep the order in which each date was first seen.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::Calendar;
use crate::models::{MealCategory, MealEntry, WaterEntry, Workout};

/// Per-day buckets in first-seen order
#[derive(Debug, Clone, PartialEq)]
pub struct DayBuckets<B> {
    days: Vec<(NaiveDate, B)>,
    index: HashMap<NaiveDate, usize>,
}

impl<B> Default for DayBuckets<B> {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<B> DayBuckets<B> {
    pub fn get(&self, date: NaiveDate) -> Option<&B> {
        self.index.get(&date).map(|&i| &self.days[i].1)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &B)> {
        self.days.iter().map(|(date, bucket)| (*date, bucket))
    }

    pub fn values(&self) -> impl Iterator<Item = &B> {
        self.days.iter().map(|(_, bucket)| bucket)
    }
}

impl<B: Default> DayBuckets<B> {
    fn entry(&mut self, date: NaiveDate) -> &mut B {
        let i = match self.index.get(&date) {
            Some(&i) => i,
            None => {
                self.days.push((date, B::default()));
                self.index.insert(date, self.days.len() - 1);
                self.days.len() - 1
            }
        };
        &mut self.days[i].1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroTotals {
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub calories: i64,
    pub count: usize,
}

/// Calories and meal count per category. All four categories are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MealBreakdown {
    #[serde(rename = "Breakfast")]
    pub breakfast: CategoryTotals,
    #[serde(rename = "Lunch")]
    pub lunch: CategoryTotals,
    #[serde(rename = "Dinner")]
    pub dinner: CategoryTotals,
    #[serde(rename = "Snack")]
    pub snack: CategoryTotals,
}

impl MealBreakdown {
    pub fn get(&self, category: MealCategory) -> Option<&CategoryTotals> {
        match category {
            MealCategory::Breakfast => Some(&self.breakfast),
            MealCategory::Lunch => Some(&self.lunch),
            MealCategory::Dinner => Some(&self.dinner),
            MealCategory::Snack => Some(&self.snack),
            MealCategory::Unspecified => None,
        }
    }

    fn get_mut(&mut self, category: MealCategory) -> Option<&mut CategoryTotals> {
        match category {
            MealCategory::Breakfast => Some(&mut self.breakfast),
            MealCategory::Lunch => Some(&mut self.lunch),
            MealCategory::Dinner => Some(&mut self.dinner),
            MealCategory::Snack => Some(&mut self.snack),
            MealCategory::Unspecified => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MealBucket {
    pub totals: MacroTotals,
    pub breakdown: MealBreakdown,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaterBucket {
    pub total_ml: i64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkoutBucket {
    pub total_duration: i64,
    pub total_calories: i64,
    pub count: usize,
}

/// Group meals by local date. Missing macros count as zero.
///
/// Meals in an unrecognised category still count toward the day's totals but
/// not toward any category in the breakdown.
pub fn bucket_meals<C: Calendar + ?Sized>(meals: &[MealEntry], cal: &C) -> DayBuckets<MealBucket> {
    let mut buckets = DayBuckets::default();
    for meal in meals {
        let bucket: &mut MealBucket = buckets.entry(cal.date_of(&meal.occurred_at));
        let totals = &mut bucket.totals;
        totals.calories = totals.calories.saturating_add(meal.calories);
        totals.protein = totals.protein.saturating_add(meal.protein.unwrap_or(0));
        totals.carbs = totals.carbs.saturating_add(meal.carbs.unwrap_or(0));
        totals.fat = totals.fat.saturating_add(meal.fat.unwrap_or(0));
        bucket.count += 1;

        if let Some(category) = bucket.breakdown.get_mut(meal.category) {
            category.calories = category.calories.saturating_add(meal.calories);
            category.count += 1;
        }
    }
    buckets
}

pub fn bucket_water<C: Calendar + ?Sized>(entries: &[WaterEntry], cal: &C) -> DayBuckets<WaterBucket> {
    let mut buckets = DayBuckets::default();
    for entry in entries {
        let bucket: &mut WaterBucket = buckets.entry(cal.date_of(&entry.occurred_at));
        bucket.total_ml = bucket.total_ml.saturating_add(entry.amount_ml);
        bucket.count += 1;
    }
    buckets
}

pub fn bucket_workouts<C: Calendar + ?Sized>(workouts: &[Workout], cal: &C) -> DayBuckets<WorkoutBucket> {
    let mut buckets = DayBuckets::default();
    for workout in workouts {
        let bucket: &mut WorkoutBucket = buckets.entry(cal.date_of(&workout.occurred_at));
        bucket.total_duration = bucket.total_duration.saturating_add(workout.duration_minutes);
        bucket.total_calories = bucket.total_calories.saturating_add(workout.calories_burned);
        bucket.count += 1;
    }
    buckets
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::models::{MealCategory, MealEntry, WaterEntry, Workout, WorkoutCategory};

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    pub fn meal(occurred_at: DateTime<Utc>, category: MealCategory, calories: i64) -> MealEntry {
        MealEntry {
            id: 0,
            owner_id: 1,
            occurred_at,
            category,
            food_name: "Test food".to_string(),
            serving_size: "1 serving".to_string(),
            calories,
            protein: None,
            carbs: None,
            fat: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn meal_with_macros(
        occurred_at: DateTime<Utc>,
        calories: i64,
        protein: i64,
        carbs: i64,
        fat: i64,
    ) -> MealEntry {
        MealEntry {
            protein: Some(protein),
            carbs: Some(carbs),
            fat: Some(fat),
            ..meal(occurred_at, MealCategory::Lunch, calories)
        }
    }

    pub fn water(occurred_at: DateTime<Utc>, amount_ml: i64) -> WaterEntry {
        WaterEntry {
            id: 0,
            owner_id: 1,
            occurred_at,
            amount_ml,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn workout(occurred_at: DateTime<Utc>, duration_minutes: i64, calories_burned: i64) -> Workout {
        Workout {
            id: 0,
            owner_id: 1,
            occurred_at,
            category: WorkoutCategory::Cardio,
            duration_minutes,
            calories_burned,
            notes: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }
}
