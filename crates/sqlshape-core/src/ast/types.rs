//! SQL data types named in CAST expressions.

use core::fmt;

/// SQL data types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    // Integer types
    /// Small integer (2 bytes).
    Smallint,
    /// Integer (4 bytes).
    Integer,
    /// Big integer (8 bytes).
    Bigint,

    // Floating point
    /// Real (4-byte float).
    Real,
    /// Double precision (8-byte float).
    Double,
    /// Float.
    Float,
    /// Decimal with precision and scale.
    Decimal {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },
    /// Numeric (alias for Decimal).
    Numeric {
        /// Total number of digits.
        precision: Option<u16>,
        /// Number of digits after decimal point.
        scale: Option<u16>,
    },

    // String types
    /// Fixed-length character string.
    Char(Option<u32>),
    /// Variable-length character string.
    Varchar(Option<u32>),
    /// Text (variable length, no limit).
    Text,

    // Binary types
    /// Binary large object.
    Blob,

    // Date/time types
    /// Date.
    Date,
    /// Time.
    Time,
    /// Timestamp.
    Timestamp,
    /// DateTime (SQLite-style).
    Datetime,

    // Boolean
    /// Boolean.
    Boolean,

    /// Any other type, as written (arguments included).
    Custom(String),
}

impl DataType {
    /// Builds a data type from its name and the numbers in its parentheses.
    #[must_use]
    pub fn from_parts(name: &str, args: &[u32]) -> Self {
        let first = args.first().copied();
        let second = args.get(1).copied();
        let narrow = |n: Option<u32>| n.and_then(|n| u16::try_from(n).ok());
        match (name.to_ascii_uppercase().as_str(), args.len()) {
            ("SMALLINT", 0) => Self::Smallint,
            ("INT" | "INTEGER", 0) => Self::Integer,
            ("BIGINT", 0) => Self::Bigint,
            ("REAL", 0) => Self::Real,
            ("DOUBLE" | "DOUBLE PRECISION", 0) => Self::Double,
            ("FLOAT", 0) => Self::Float,
            ("DECIMAL", 0..=2) => Self::Decimal {
                precision: narrow(first),
                scale: narrow(second),
            },
            ("NUMERIC", 0..=2) => Self::Numeric {
                precision: narrow(first),
                scale: narrow(second),
            },
            ("CHAR", 0 | 1) => Self::Char(first),
            ("VARCHAR" | "CHARACTER VARYING", 0 | 1) => Self::Varchar(first),
            ("TEXT", 0) => Self::Text,
            ("BLOB", 0) => Self::Blob,
            ("DATE", 0) => Self::Date,
            ("TIME", 0) => Self::Time,
            ("TIMESTAMP", 0) => Self::Timestamp,
            ("DATETIME", 0) => Self::Datetime,
            ("BOOLEAN", 0) => Self::Boolean,
            _ if args.is_empty() => Self::Custom(String::from(name)),
            _ => {
                let list: Vec<String> = args.iter().map(ToString::to_string).collect();
                Self::Custom(format!("{name}({})", list.join(", ")))
            }
        }
    }

    /// Returns the SQL representation of the data type.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Smallint => String::from("SMALLINT"),
            Self::Integer => String::from("INTEGER"),
            Self::Bigint => String::from("BIGINT"),
            Self::Real => String::from("REAL"),
            Self::Double => String::from("DOUBLE"),
            Self::Float => String::from("FLOAT"),
            Self::Decimal { precision, scale } => sized("DECIMAL", *precision, *scale),
            Self::Numeric { precision, scale } => sized("NUMERIC", *precision, *scale),
            Self::Char(len) => match len {
                Some(n) => format!("CHAR({n})"),
                None => String::from("CHAR"),
            },
            Self::Varchar(len) => match len {
                Some(n) => format!("VARCHAR({n})"),
                None => String::from("VARCHAR"),
            },
            Self::Text => String::from("TEXT"),
            Self::Blob => String::from("BLOB"),
            Self::Date => String::from("DATE"),
            Self::Time => String::from("TIME"),
            Self::Timestamp => String::from("TIMESTAMP"),
            Self::Datetime => String::from("DATETIME"),
            Self::Boolean => String::from("BOOLEAN"),
            Self::Custom(name) => name.clone(),
        }
    }
}

fn sized(name: &str, precision: Option<u16>, scale: Option<u16>) -> String {
    match (precision, scale) {
        (Some(p), Some(s)) => format!("{name}({p}, {s})"),
        (Some(p), None) => format!("{name}({p})"),
        _ => String::from(name),
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
