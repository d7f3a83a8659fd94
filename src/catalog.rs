//! Built-in food catalog
//!
//! A small table of common foods with per-serving nutrition, used to prefill
//! meal logging.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogFood {
    pub name: &'static str,
    pub serving_size: &'static str,
    pub calories: i64,
    pub protein: i64,
    pub carbs: i64,
    pub fat: i64,
}

const fn food(
    name: &'static str,
    serving_size: &'static str,
    calories: i64,
    protein: i64,
    carbs: i64,
    fat: i64,
) -> CatalogFood {
    CatalogFood {
        name,
        serving_size,
        calories,
        protein,
        carbs,
        fat,
    }
}

pub const FOODS: [CatalogFood; 13] = [
    food("Oatmeal with Berries", "1 bowl (250g)", 320, 10, 55, 8),
    food("Black Coffee", "1 cup (200ml)", 2, 0, 0, 0),
    food("Boiled Egg", "1 large", 78, 6, 1, 5),
    food("Chicken Caesar Salad", "1 serving", 550, 38, 20, 35),
    food("Green Apple", "1 medium", 95, 0, 25, 0),
    food("Almonds", "1 handful (30g)", 150, 6, 6, 13),
    food("Quinoa Salad Bowl", "1 bowl", 420, 15, 58, 14),
    food("Veggie Pizza Slice", "1 slice", 280, 12, 36, 10),
    food("Avocado Toast with Egg", "1 slice (approx. 120g)", 320, 12, 24, 18),
    food("Avocado Toast", "1 slice (approx. 100g)", 250, 8, 22, 15),
    food("Banana", "1 medium (118g)", 105, 1, 27, 0),
    food("Grilled Chicken Salad", "1 bowl (approx. 250g)", 450, 35, 18, 22),
    food("Berry Oatmeal Bowl", "1 bowl (approx. 200g)", 320, 10, 55, 8),
];

/// Foods whose name contains `query`, ignoring case, in catalog order
pub fn search(query: &str, limit: usize) -> Vec<&'static CatalogFood> {
    let needle = query.trim().to_lowercase();
    FOODS
        .iter()
        .filter(|f| f.name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_is_case_insensitive() {
        let names: Vec<_> = search("AVOCADO", 10).iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Avocado Toast with Egg", "Avocado Toast"]);
    }

    #[test]
    fn test_search_respects_limit() {
        assert_eq!(search("salad", 10).len(), 3);
        assert_eq!(search("salad", 1).len(), 1);
    }

    #[test]
    fn test_search_without_match() {
        assert!(search("durian", 10).is_empty());
    }

    #[test]
    fn test_empty_query_lists_catalog() {
        assert_eq!(search("", 100).len(), FOODS.len());
    }
}
