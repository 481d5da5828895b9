//! Date formatting for the HUD ARM schema.
//!
//! The schema wants `MM-DD-YYYY` dates and `MM-DD-YYYY HH:MM` datetimes.
//! CRM date fields arrive as `YYYY-MM-DD`, datetime fields as
//! `YYYY-MM-DDTHH:MM:SS.sss+0000`; RFC 3339 is accepted as well. Datetimes
//! are rendered in UTC.

use armlink_domain::{ArmLinkError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_FORMAT: &str = "%m-%d-%Y";
const DATETIME_FORMAT: &str = "%m-%d-%Y %H:%M";
/// Time used when a datetime field carries only a date.
const PLACEHOLDER_TIME: &str = "12:00";

enum Parsed {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

fn parse(raw: &str) -> Result<Parsed> {
    let value = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(Parsed::DateTime(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Ok(Parsed::DateTime(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Parsed::DateTime(naive.and_utc()));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Parsed::Date(date));
    }

    Err(ArmLinkError::InvalidInput(format!("unrecognised date value '{raw}'")))
}

/// `2023-03-05T00:00:00Z` → `03-05-2023`
pub fn format_date(raw: &str) -> Result<String> {
    let date = match parse(raw)? {
        Parsed::Date(date) => date,
        Parsed::DateTime(dt) => dt.date_naive(),
    };
    Ok(date.format(DATE_FORMAT).to_string())
}

/// `2023-03-05T14:30:00Z` → `03-05-2023 14:30`, `2023-03-05` → `03-05-2023 12:00`
pub fn format_datetime(raw: &str) -> Result<String> {
    match parse(raw)? {
        Parsed::Date(date) => Ok(format!("{} {PLACEHOLDER_TIME}", date.format(DATE_FORMAT))),
        Parsed::DateTime(dt) => Ok(dt.format(DATETIME_FORMAT).to_string()),
    }
}
