mod default_task;
mod event;
mod holding;
pub mod id;
mod reminder;
mod task;

pub use default_task::*;
pub use event::*;
pub use holding::*;
pub use reminder::*;
pub use task::*;

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Longest accepted lead time, roughly a century.
pub const MAX_DAYS_BEFORE: u32 = 36_500;

/// Holding dates must stay within SQLite's four-digit year range.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Lead times arrive as signed integers so negative values can be rejected
/// with a validation error instead of a deserialization failure.
pub(crate) fn days_before(value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::validation(
            "daysBefore must be greater than or equal to 0",
        ));
    }
    u32::try_from(value)
        .ok()
        .filter(|days| *days <= MAX_DAYS_BEFORE)
        .ok_or_else(|| {
            Error::validation(format!(
                "daysBefore must be at most {MAX_DAYS_BEFORE}"
            ))
        })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| Error::validation(format!("{field} must be in YYYY-MM-DD format")))?;
    if !YEAR_RANGE.contains(&date.year()) {
        return Err(Error::validation(format!(
            "{field} must be between years 0001 and 9999"
        )));
    }
    Ok(date)
}
