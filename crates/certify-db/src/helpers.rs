//! Parameter builders and row readers.
//!
//! Repos pass parameters as `Vec<libsql::Value>` and read rows by column
//! index. These helpers own the conventions: `-1` ids and `None` bind as
//! `NULL`, booleans are `0`/`1`, dates are ISO-8601 text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use libsql::Value;

use certify_core::ids::UNSET_ID;

use crate::error::DatabaseError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Bind an id, mapping the unset sentinel to `NULL`.
#[must_use]
pub const fn id_param(id: i64) -> Value {
    if id == UNSET_ID {
        Value::Null
    } else {
        Value::Integer(id)
    }
}

#[must_use]
pub const fn opt_id(id: Option<i64>) -> Value {
    match id {
        Some(id) => id_param(id),
        None => Value::Null,
    }
}

#[must_use]
pub fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

#[must_use]
pub fn opt_text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, text)
}

#[must_use]
pub const fn flag(b: bool) -> Value {
    Value::Integer(if b { 1 } else { 0 })
}

#[must_use]
pub const fn opt_real(f: Option<f64>) -> Value {
    match f {
        Some(f) => Value::Real(f),
        None => Value::Null,
    }
}

#[must_use]
pub fn date(d: NaiveDate) -> Value {
    Value::Text(d.format(DATE_FORMAT).to_string())
}

#[must_use]
pub fn opt_date(d: Option<NaiveDate>) -> Value {
    d.map_or(Value::Null, date)
}

#[must_use]
pub fn datetime(d: NaiveDateTime) -> Value {
    Value::Text(d.format(DATETIME_FORMAT).to_string())
}

#[must_use]
pub fn opt_datetime(d: Option<NaiveDateTime>) -> Value {
    d.map_or(Value::Null, datetime)
}

// ---------------------------------------------------------------------------
// Row readers
// ---------------------------------------------------------------------------

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a TEXT column, treating NULL as empty.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_string(row: &libsql::Row, idx: i32) -> Result<String, DatabaseError> {
    Ok(row.get::<Option<String>>(idx)?.unwrap_or_default())
}

/// Read a nullable key column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_id(row: &libsql::Row, idx: i32) -> Result<Option<i64>, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?)
}

/// Read a key column, mapping NULL to the unset sentinel.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_id(row: &libsql::Row, idx: i32) -> Result<i64, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?.unwrap_or(UNSET_ID))
}

/// Read a `0`/`1` column. NULL reads as false.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_flag(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<Option<i64>>(idx)?.is_some_and(|v| v != 0))
}

/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_real(row: &libsql::Row, idx: i32) -> Result<Option<f64>, DatabaseError> {
    Ok(row.get::<Option<f64>>(idx)?)
}

/// # Errors
///
/// Returns `DatabaseError` if the column read fails or holds a malformed date.
pub fn get_opt_date(row: &libsql::Row, idx: i32) -> Result<Option<NaiveDate>, DatabaseError> {
    parse_optional_date(get_opt_string(row, idx)?.as_deref())
}

/// # Errors
///
/// Returns `DatabaseError` if the column read fails or holds a malformed datetime.
pub fn get_opt_datetime(
    row: &libsql::Row,
    idx: i32,
) -> Result<Option<NaiveDateTime>, DatabaseError> {
    parse_optional_datetime(get_opt_string(row, idx)?.as_deref())
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a date column. Accepts a bare date or a datetime (date part kept).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string is not a date.
pub fn parse_optional_date(s: Option<&str>) -> Result<Option<NaiveDate>, DatabaseError> {
    match s {
        Some(s) if !s.is_empty() => {
            let date_part = s.get(..10).unwrap_or(s);
            NaiveDate::parse_from_str(date_part, DATE_FORMAT)
                .map(Some)
                .map_err(|e| DatabaseError::Query(format!("Failed to parse date '{s}': {e}")))
        }
        _ => Ok(None),
    }
}

/// Parse a datetime column.
///
/// Handles `SQLite`'s `datetime('now')` format, RFC 3339, and a bare date
/// (read as midnight).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a non-empty string matches no format.
pub fn parse_optional_datetime(s: Option<&str>) -> Result<Option<NaiveDateTime>, DatabaseError> {
    let Some(s) = s.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Ok(Some(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(dt.naive_utc()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(|d| d.and_hms_opt(0, 0, 0))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}
