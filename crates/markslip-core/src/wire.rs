//! Serde helpers for values that come out of spreadsheet cells.
//!
//! The backend reads cells verbatim, so a roll number may arrive as `12` or
//! `"12"` and an empty form field arrives as `""` rather than `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a number the way a number input shows it (`45`, `45.5`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

struct StringOrNumber;

impl<'de> Visitor<'de> for StringOrNumber {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.trim().to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v.trim().to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(format_number(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<String, E> {
        Ok(String::new())
    }
}

/// Deserialize a cell that may hold either a string or a number into a string
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrNumber)
}

/// A whole non-negative number such as `50`, `"150"` or `"40.0"`
pub fn parse_whole_number(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as u32)
}

/// `Option<u32>` encoded as `""` when absent
pub mod blank_u32 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u32>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&v.to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        let raw = d.deserialize_any(StringOrNumber)?;
        if raw.is_empty() {
            return Ok(None);
        }
        parse_whole_number(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid maximum marks: {raw}")))
    }
}

/// `Option<NaiveDate>` encoded as `YYYY-MM-DD`, or `""` when absent
pub mod blank_date {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = d.deserialize_any(StringOrNumber)?;
        if raw.is_empty() {
            return Ok(None);
        }
        // Sheets sometimes hand back a full timestamp; keep the date part.
        let day = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(day, DATE_FORMAT)
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid date: {raw}")))
    }
}

/// Parse a timestamp written by the backend.
///
/// Accepts RFC 3339, epoch milliseconds, and the `Date.toString()` form
/// (`Tue Feb 11 2025 10:00:00 GMT+0530 (India Standard Time)`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms);
    }
    let without_zone_name = raw.split(" (").next().unwrap_or(raw);
    DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z")
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// `Option<DateTime<Utc>>` that reads whatever [`parse_timestamp`] understands.
///
/// Unreadable values become `None`; the timestamp is informational only.
pub fn lenient_datetime<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::String(raw) => parse_timestamp(&raw),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
