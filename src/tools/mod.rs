//! nutrilog Tools module
//!
//! MCP tool implementations. Each function takes plain arguments and returns
//! `Result<T, String>` so the server layer only has to serialize.

pub mod foods;
pub mod goals;
pub mod input;
pub mod meals;
pub mod reports;
pub mod status;
pub mod water;
pub mod workouts;
