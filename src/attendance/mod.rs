mod board;
mod grouping;
mod pending;
mod stats;

use std::fmt;

use chrono::NaiveDate;

use crate::error::ApiError;
use crate::models::{AttendanceRecord, AttendanceView};

pub use board::AttendanceBoard;
pub use grouping::group_by_class;
pub use pending::{ActionKey, PendingActions, PendingGuard};
pub use stats::AttendanceStats;

/// Key of a marked set: one date seen through one roster.
/// Displays as `2024-05-01-children`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkedKey {
    pub date: NaiveDate,
    pub view: AttendanceView,
}

impl MarkedKey {
    pub fn new(date: NaiveDate, view: AttendanceView) -> Self {
        Self { date, view }
    }
}

impl fmt::Display for MarkedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.view)
    }
}

#[derive(Debug)]
pub enum MarkOutcome {
    /// The api accepted the write; holds the record it returned.
    Saved(AttendanceRecord),
    /// The same person and status is already being sent.
    AlreadyPending,
    /// Flip requested for someone without a status.
    NotMarked,
    Failed(ApiError),
}

impl MarkOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, MarkOutcome::Saved(_))
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        match self {
            MarkOutcome::Saved(record) => Some(record),
            _ => None,
        }
    }
}
