//! Canonical parameter value types.

use core::fmt;

use super::SqlValue;

/// The value type a declared parameter type string maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// 64 bit integer.
    Integer,
    /// Floating point.
    Float,
    /// Exact decimal.
    Numeric,
    /// Text.
    String,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    Timestamp,
    /// Binary data.
    Blob,
    /// Only NULL.
    Null,
    /// A type string with no known mapping.
    Unknown,
}

impl ValueType {
    /// Maps a declared type string to its canonical type (case-insensitive).
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "int" | "integer" | "int4" | "int8" | "bigint" | "smallint" | "tinyint" | "gint"
            | "gint64" | "guint" | "glong" | "gulong" | "gshort" | "gushort" | "long" => {
                Self::Integer
            }
            "float" | "double" | "real" | "float4" | "float8" | "gfloat" | "gdouble" => {
                Self::Float
            }
            "numeric" | "decimal" | "gdanumeric" | "number" => Self::Numeric,
            "string" | "text" | "varchar" | "char" | "character" | "gchararray" | "clob" => {
                Self::String
            }
            "boolean" | "bool" | "gboolean" => Self::Boolean,
            "date" | "gdate" => Self::Date,
            "time" | "gdatime" | "gdatimestampz" => Self::Time,
            "timestamp" | "datetime" | "timestamptz" | "gdatetime" | "gdatimestamp" => {
                Self::Timestamp
            }
            "blob" | "binary" | "bytea" | "gdablob" | "gdabinary" => Self::Blob,
            "null" | "gdanull" => Self::Null,
            _ => Self::Unknown,
        }
    }

    /// Returns the canonical spelling of the type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Float => "float",
            Self::Numeric => "numeric",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Blob => "blob",
            Self::Null => "null",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether a value of `value`'s type may be bound to a parameter of this type.
    ///
    /// NULL and DEFAULT are accepted by every type; nullability is checked separately.
    #[must_use]
    pub const fn accepts(self, value: &SqlValue) -> bool {
        match (self, value) {
            (_, SqlValue::Null | SqlValue::Default) | (Self::Unknown, _) => true,
            (Self::Integer, SqlValue::Int(_))
            | (Self::Float | Self::Numeric, SqlValue::Int(_) | SqlValue::Float(_))
            | (Self::Numeric, SqlValue::Text(_))
            | (Self::String, SqlValue::Text(_))
            | (Self::Boolean, SqlValue::Bool(_))
            | (Self::Date, SqlValue::Date(_))
            | (Self::Time, SqlValue::Time(_))
            | (Self::Timestamp, SqlValue::Timestamp(_) | SqlValue::TimestampTz(_))
            | (Self::Blob, SqlValue::Blob(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(ValueType::from_type_name("gint"), ValueType::Integer);
        assert_eq!(ValueType::from_type_name("INT"), ValueType::Integer);
        assert_eq!(ValueType::from_type_name("varchar"), ValueType::String);
        assert_eq!(ValueType::from_type_name("GDateTime"), ValueType::Timestamp);
        assert_eq!(ValueType::from_type_name("geometry"), ValueType::Unknown);
    }

    #[test]
    fn test_accepts() {
        assert!(ValueType::Integer.accepts(&SqlValue::Int(1)));
        assert!(ValueType::Integer.accepts(&SqlValue::Null));
        assert!(!ValueType::Integer.accepts(&SqlValue::Text(String::from("1"))));
        assert!(ValueType::Float.accepts(&SqlValue::Int(1)));
        assert!(ValueType::Unknown.accepts(&SqlValue::Blob(vec![])));
    }
}
