//! Milestone due dates.
//!
//! Callers supply a calendar day; GitHub stores a full timestamp. Every date
//! entered on the command line is pinned to 08:00 UTC so it compares equal to
//! the value GitHub hands back for milestones set by this tool.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MilestoneError;

/// Accepted input format, e.g. `7/1/2019` or `12/31/2019`.
pub const INPUT_FORMAT: &str = "%m/%d/%Y";

/// Day rendering used by the list view (`Mon Jul  1 2019`).
const DAY_FORMAT: &str = "%a %b %e %Y";

/// Hour of day all milestones are due at.
const DUE_HOUR: i64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DueDate(DateTime<Utc>);

impl DueDate {
    /// Parses `M/D/YYYY` and normalizes to 08:00 UTC on that day.
    pub fn parse(input: &str) -> Result<Self, MilestoneError> {
        let malformed = |reason: String| {
            MilestoneError::Argument(format!(
                "malformed date '{input}'; please use M/D/YYYY format ({reason})"
            ))
        };
        let input = input.trim();
        // `%Y` takes any number of digits, so `8/1/19` would land in year 19.
        let year = input.rsplit('/').next().unwrap_or_default();
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("year must have four digits".to_string()));
        }
        let day = NaiveDate::parse_from_str(input, INPUT_FORMAT)
            .map_err(|e| malformed(e.to_string()))?;
        let at = day.and_time(NaiveTime::MIN) + TimeDelta::hours(DUE_HOUR);
        Ok(DueDate(at.and_utc()))
    }

    /// Day-only rendering for the list view.
    pub fn day(&self) -> impl fmt::Display + '_ {
        self.0.format(DAY_FORMAT)
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

/// Renders an optional due date, `none` when the milestone has no date.
pub fn describe(due: Option<&DueDate>) -> String {
    due.map_or_else(|| "none".to_string(), ToString::to_string)
}

/// Day rendering of an optional due date for the list view.
pub fn describe_day(due: Option<&DueDate>) -> String {
    due.map_or_else(|| "none".to_string(), |d| d.day().to_string())
}
