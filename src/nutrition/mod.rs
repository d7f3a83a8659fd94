//! Nutrition calculation module
//!
//! Rounding rules and unit conversions.

pub mod rounding;
pub mod units;

pub use rounding::{capped_percent_of, percent_of, round_tenth, round_whole};
pub use units::{categorize_unit, kg_per_unit, ml_per_unit, to_kg, to_ml, UnitCategory};
