//! Reporting errors

use std::fmt;

use thiserror::Error;

use super::source::StoreError;

/// The kind of record a fetch was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Meals,
    Water,
    Workouts,
    Goals,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Meals => "meals",
            EventKind::Water => "water",
            EventKind::Workouts => "workouts",
            EventKind::Goals => "goals",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    #[error("Failed to fetch {kind}: {source}")]
    UpstreamFetch {
        kind: EventKind,
        #[source]
        source: StoreError,
    },

    #[error("User {0} not found")]
    OwnerNotFound(i64),
}

pub type ReportResult<T> = Result<T, ReportError>;
