use crate::error::RuntimeError;
use chrono::{Duration, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `TimeWindow` bounds the creation time of the log objects we work on.
///
/// `created_after` is inclusive, `created_before` is exclusive.
/// A missing bound leaves that side of the window open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Earliest creation date, inclusive
    pub created_after: Option<NaiveDate>,
    /// Latest creation date, exclusive
    pub created_before: Option<NaiveDate>,
}

impl TimeWindow {
    /// Build a window from two optional `YYYY-MM-DD` strings.
    /// Empty strings count as missing bounds.
    pub fn parse(after: Option<&str>, before: Option<&str>) -> Result<TimeWindow, RuntimeError> {
        Ok(TimeWindow {
            created_after: parse_date(after)?,
            created_before: parse_date(before)?,
        })
    }

    /// Window that starts `days` before `today` and stays open at the end.
    pub fn trailing_days(today: NaiveDate, days: u32) -> TimeWindow {
        TimeWindow {
            created_after: Some(today - Duration::days(i64::from(days))),
            created_before: None,
        }
    }

    /// Whether logs copied for `self` already include every log in `other`.
    pub fn covers(&self, other: &TimeWindow) -> bool {
        // an open start sorts before every date
        let starts_earlier = match (self.created_after, other.created_after) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => mine <= theirs,
        };
        // an open end only reached the time the copy ran, not later arrivals
        let ends_later = match (self.created_before, other.created_before) {
            (None, None) => false,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(mine), Some(theirs)) => mine >= theirs,
        };
        starts_earlier && ends_later
    }

    /// A reconfiguration needs a new copy job only when the new window
    /// reaches outside the window that was copied before.
    pub fn requires_copy(previous: &TimeWindow, current: &TimeWindow) -> bool {
        !previous.covers(current)
    }
}

/// Format a date the way the query templates and messages expect it.
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, RuntimeError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(Some)
            .map_err(|err| RuntimeError::InvalidDate(v.into(), err)),
        None => Ok(None),
    }
}
