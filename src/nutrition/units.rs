//! Unit types and conversion constants
//!
//! Water is stored in milliliters and body weight in kilograms; these helpers
//! convert whatever unit the caller logged in.

use serde::{Deserialize, Serialize};

/// Category of a measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    /// Volume units (ml, l, cup, fl oz, ...)
    Volume,
    /// Body weight units (kg, lb, ...)
    Weight,
    Unknown,
}

// ============================================================================
// Volume Conversion Constants (to milliliters)
// ============================================================================

/// Milliliters per fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;
/// Milliliters per pint (US)
pub const ML_PER_PINT: f64 = 473.176;
/// Milliliters per quart (US)
pub const ML_PER_QUART: f64 = 946.353;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;
/// Milliliters per gallon (US)
pub const ML_PER_GALLON: f64 = 3785.41;

// ============================================================================
// Weight Conversion Constants (to kilograms)
// ============================================================================

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;
/// Kilograms per stone
pub const KG_PER_STONE: f64 = 6.35029;

// ============================================================================
// Unit Recognition
// ============================================================================

/// Get the conversion factor to milliliters for a volume unit
pub fn ml_per_unit(unit: &str) -> Option<f64> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    match trimmed {
        "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Some(1.0),
        "l" | "liter" | "liters" | "litre" | "litres" => Some(ML_PER_LITER),
        "fl oz" | "floz" | "oz" | "fluid ounce" | "fluid ounces" => Some(ML_PER_FL_OZ),
        "cup" | "cups" => Some(ML_PER_CUP),
        "pint" | "pints" => Some(ML_PER_PINT),
        "quart" | "quarts" => Some(ML_PER_QUART),
        "gallon" | "gallons" => Some(ML_PER_GALLON),
        _ => None,
    }
}

/// Get the conversion factor to kilograms for a body weight unit
pub fn kg_per_unit(unit: &str) -> Option<f64> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    match trimmed {
        "kg" | "kgs" | "kilogram" | "kilograms" => Some(1.0),
        "lb" | "lbs" | "pound" | "pounds" => Some(KG_PER_LB),
        "st" | "stone" | "stones" => Some(KG_PER_STONE),
        _ => None,
    }
}

/// Determine the category of a unit string
pub fn categorize_unit(unit: &str) -> UnitCategory {
    if ml_per_unit(unit).is_some() {
        UnitCategory::Volume
    } else if kg_per_unit(unit).is_some() {
        UnitCategory::Weight
    } else {
        UnitCategory::Unknown
    }
}

/// Convert a volume to milliliters
pub fn to_ml(amount: f64, unit: &str) -> Option<f64> {
    ml_per_unit(unit).map(|factor| amount * factor)
}

/// Convert a body weight to kilograms
pub fn to_kg(amount: f64, unit: &str) -> Option<f64> {
    kg_per_unit(unit).map(|factor| amount * factor)
}
