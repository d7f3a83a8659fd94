//! Reporting engine
//!
//! Day-bucketed totals, period summaries and trend series computed from the
//! logged meals, water and workouts of one owner.

pub mod bucket;
pub mod calendar;
pub mod error;
pub mod facade;
pub mod range;
pub mod source;
pub mod summary;
pub mod trend;

pub use calendar::{Calendar, Zone};
pub use error::{EventKind, ReportError, ReportResult};
pub use facade::Reporter;
pub use range::TimeWindow;
pub use source::{EventStore, GoalsProvider, StoreError};
