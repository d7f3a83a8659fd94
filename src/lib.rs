//! nutrilog Library
//!
//! Meal, water and workout logging with daily and period reports.

pub mod build_info;
pub mod catalog;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod reporting;
pub mod tools;
