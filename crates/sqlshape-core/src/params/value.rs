//! Bound parameter values.
//!
//! A [`ParamValues`] store maps parameter names to [`SqlValue`]s; the renderer reads
//! it to inline values or to decide the NULL rewrite.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;

use super::ValueType;
use crate::dialect::Dialect;
use crate::error::{Result, SqlError};

/// A value bound to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,
    /// The column default (`DEFAULT`).
    Default,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
    /// Timestamp with a UTC offset.
    TimestampTz(DateTime<FixedOffset>),
}

impl SqlValue {
    /// Returns true for [`SqlValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the canonical type of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Null | Self::Default => ValueType::Null,
            Self::Bool(_) => ValueType::Boolean,
            Self::Int(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::Text(_) => ValueType::String,
            Self::Blob(_) => ValueType::Blob,
            Self::Date(_) => ValueType::Date,
            Self::Time(_) => ValueType::Time,
            Self::Timestamp(_) | Self::TimestampTz(_) => ValueType::Timestamp,
        }
    }

    /// Returns the SQL literal for inline use in `dialect`.
    ///
    /// With `gmt`, offset-aware timestamps are converted to UTC first.
    #[must_use]
    pub fn to_sql_inline(&self, dialect: &dyn Dialect, gmt: bool) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Default => String::from("DEFAULT"),
            Self::Bool(b) => String::from(dialect.boolean_literal(*b)),
            Self::Int(n) => format!("{n}"),
            Self::Float(f) => format!("{f}"),
            Self::Text(s) => quote_string(s, dialect),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
            Self::Time(t) => format!("'{}'", t.format("%H:%M:%S%.f")),
            Self::Timestamp(ts) => format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::TimestampTz(ts) => {
                if gmt {
                    let utc = ts.with_timezone(&Utc);
                    format!("'{}'", utc.format("%Y-%m-%d %H:%M:%S%.f"))
                } else {
                    format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.f%:z"))
                }
            }
        }
    }

    /// Converts a JSON value into a bound value.
    ///
    /// Scalars map directly; objects select a typed value with a single key:
    /// `{"date": "2024-01-31"}`, `{"time": "12:00:00"}`,
    /// `{"timestamp": "2024-01-31T12:00:00+02:00"}`, `{"blob": "CAFE"}` or
    /// `{"default": true}`.
    ///
    /// # Errors
    ///
    /// Returns a `Bind` error naming `name` when the JSON cannot be mapped.
    pub fn from_json(name: &str, json: &JsonValue) -> Result<Self> {
        let invalid = |reason: String| SqlError::bind(name, reason);
        match json {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(b) => Ok(Self::Bool(*b)),
            JsonValue::Number(n) => n.as_i64().map_or_else(
                || {
                    n.as_f64()
                        .map(Self::Float)
                        .ok_or_else(|| invalid(format!("unsupported number {n}")))
                },
                |i| Ok(Self::Int(i)),
            ),
            JsonValue::String(s) => Ok(Self::Text(s.clone())),
            JsonValue::Array(_) => Err(invalid(String::from("arrays cannot be bound"))),
            JsonValue::Object(map) => {
                let mut entries = map.iter();
                let (Some((kind, value)), None) = (entries.next(), entries.next()) else {
                    return Err(invalid(String::from(
                        "typed values must be objects with exactly one key",
                    )));
                };
                let text = value.as_str().unwrap_or_default();
                match kind.as_str() {
                    "date" => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .map(Self::Date)
                        .map_err(|e| invalid(format!("invalid date '{text}': {e}"))),
                    "time" => NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
                        .map(Self::Time)
                        .map_err(|e| invalid(format!("invalid time '{text}': {e}"))),
                    "timestamp" => DateTime::parse_from_rfc3339(text)
                        .map(Self::TimestampTz)
                        .or_else(|_| {
                            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                                .map(Self::Timestamp)
                        })
                        .map_err(|e| invalid(format!("invalid timestamp '{text}': {e}"))),
                    "blob" => decode_hex(text)
                        .map(Self::Blob)
                        .ok_or_else(|| invalid(format!("invalid hex blob '{text}'"))),
                    "default" => Ok(Self::Default),
                    other => Err(invalid(format!("unknown value type '{other}'"))),
                }
            }
        }
    }
}

/// Quotes `s` as a string literal, doubling single quotes (and backslashes
/// where the dialect treats them as escapes).
#[must_use]
pub fn quote_string(s: &str, dialect: &dyn Dialect) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' if dialect.backslash_escapes() => out.push_str("\\\\"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| text.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok()))
        .collect()
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int(i64::from(self))
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Blob(self)
    }
}

impl ToSqlValue for NaiveDate {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Date(self)
    }
}

impl ToSqlValue for NaiveTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Time(self)
    }
}

impl ToSqlValue for NaiveDateTime {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Timestamp(self)
    }
}

impl ToSqlValue for DateTime<FixedOffset> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::TimestampTz(self)
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

/// The external name to value store read by the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamValues {
    values: BTreeMap<String, SqlValue>,
}

impl ParamValues {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to `name`, replacing any previous binding.
    pub fn set(&mut self, name: impl Into<String>, value: impl ToSqlValue) {
        self.values.insert(name.into(), value.to_sql_value());
    }

    /// Builder form of [`ParamValues::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl ToSqlValue) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.values.get(name)
    }

    /// Returns true if `name` is bound to NULL.
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        self.get(name).is_some_and(SqlValue::is_null)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Builds a store from a JSON object (`{"id": null, "name": "zzz"}`).
    ///
    /// # Errors
    ///
    /// Returns a `Bind` error if the JSON is not an object or a member cannot be mapped.
    pub fn from_json(json: &JsonValue) -> Result<Self> {
        let JsonValue::Object(map) = json else {
            return Err(SqlError::bind("*", "parameter values must be a JSON object"));
        };
        let mut values = Self::new();
        for (name, value) in map {
            values.set(name.clone(), SqlValue::from_json(name, value)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    fn inline(value: &SqlValue) -> String {
        value.to_sql_inline(DialectKind::Standard.dialect(), false)
    }

    #[test]
    fn test_sql_value_inline_scalars() {
        assert_eq!(inline(&SqlValue::Null), "NULL");
        assert_eq!(inline(&SqlValue::Default), "DEFAULT");
        assert_eq!(inline(&SqlValue::Bool(true)), "TRUE");
        assert_eq!(inline(&SqlValue::Int(-100)), "-100");
        assert_eq!(inline(&SqlValue::Float(2.5)), "2.5");
    }

    #[test]
    fn test_sql_value_inline_text_escaping() {
        assert_eq!(inline(&SqlValue::Text(String::from("O'Brien"))), "'O''Brien'");
        assert_eq!(
            inline(&SqlValue::Text(String::from("'; DROP TABLE users; --"))),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_mysql_escapes_backslashes() {
        let value = SqlValue::Text(String::from(r"C:\tmp"));
        assert_eq!(
            value.to_sql_inline(DialectKind::Mysql.dialect(), false),
            r"'C:\\tmp'"
        );
        assert_eq!(inline(&value), r"'C:\tmp'");
    }

    #[test]
    fn test_sqlite_booleans() {
        let sqlite = DialectKind::Sqlite.dialect();
        assert_eq!(SqlValue::Bool(true).to_sql_inline(sqlite, false), "1");
    }

    #[test]
    fn test_sql_value_inline_blob() {
        assert_eq!(
            inline(&SqlValue::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F])),
            "X'48454C4C4F'"
        );
    }

    #[test]
    fn test_timestamp_gmt_conversion() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T10:30:00+02:00").unwrap();
        let value = SqlValue::TimestampTz(ts);
        let standard = DialectKind::Standard.dialect();
        assert_eq!(
            value.to_sql_inline(standard, false),
            "'2024-03-01 10:30:00+02:00'"
        );
        assert_eq!(value.to_sql_inline(standard, true), "'2024-03-01 08:30:00'");
    }

    #[test]
    fn test_dates_and_times() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(inline(&date.to_sql_value()), "'2024-01-31'");
        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(inline(&time.to_sql_value()), "'07:05:00'");
    }

    #[test]
    fn test_to_sql_value_conversions() {
        assert_eq!(true.to_sql_value(), SqlValue::Bool(true));
        assert_eq!(42_i32.to_sql_value(), SqlValue::Int(42));
        assert_eq!("hello".to_sql_value(), SqlValue::Text(String::from("hello")));
        assert_eq!(None::<i32>.to_sql_value(), SqlValue::Null);
    }

    #[test]
    fn test_param_values_from_json() {
        let json = serde_json::json!({
            "id": null,
            "name": "zzz",
            "age": 42,
            "born": {"date": "1990-05-17"},
            "raw": {"blob": "CAFE"}
        });
        let values = ParamValues::from_json(&json).unwrap();
        assert_eq!(values.len(), 5);
        assert!(values.is_null("id"));
        assert_eq!(values.get("age"), Some(&SqlValue::Int(42)));
        assert_eq!(values.get("raw"), Some(&SqlValue::Blob(vec![0xCA, 0xFE])));
        assert!(matches!(values.get("born"), Some(SqlValue::Date(_))));
    }

    #[test]
    fn test_param_values_from_json_rejects_arrays() {
        let json = serde_json::json!({"ids": [1, 2]});
        let err = ParamValues::from_json(&json).unwrap_err();
        assert!(matches!(err, SqlError::Bind { param_name, .. } if param_name == "ids"));
    }
}
