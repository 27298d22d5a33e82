//! Parameter placeholders.
//!
//! Placeholders are embedded in SQL text as `##name::type[::null]`, as
//! positional `##+N::type` / `##-N::type`, in the legacy comment form
//! `## /* name:x type:t */`, or as host parameters (`?`, `:name`, `$1`, ...).
//! Each one yields or reuses a [`ParamSpec`] in the statement's [`ParamSet`].

mod set;
mod types;
mod value;

use core::fmt;

pub use set::{ParamConflict, ParamSet};
pub use types::ValueType;
pub use value::{quote_string, ParamValues, SqlValue, ToSqlValue};

/// How a parameter is identified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    /// Named parameter (`##id::int`).
    Named(String),
    /// Relative row or context offset (`##+1::int`, `##-2::string`).
    Offset(i32),
}

impl ParamKey {
    /// Returns the name of a named key.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Offset(_) => None,
        }
    }

    /// Parses `+N` / `-N` into an offset key, anything else into a name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let bytes = text.as_bytes();
        if bytes.len() > 1 && matches!(bytes[0], b'+' | b'-') {
            if let Ok(offset) = text.parse::<i32>() {
                return Self::Offset(offset);
            }
        }
        Self::Named(String::from(text))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Offset(n) => write!(f, "{n:+}"),
        }
    }
}

/// A parameter declaration: name or offset, declared type and nullability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Name or offset.
    pub key: ParamKey,
    /// Free text description (legacy form only).
    pub descr: Option<String>,
    /// Type string as declared.
    pub type_name: Option<String>,
    /// Canonical type derived from `type_name`.
    pub value_type: ValueType,
    /// Whether NULL may be bound.
    pub nullok: bool,
}

impl ParamSpec {
    /// Creates a spec; the canonical type is derived from `type_name`.
    #[must_use]
    pub fn new(key: ParamKey, type_name: Option<String>, nullok: bool) -> Self {
        let value_type = type_name
            .as_deref()
            .map_or(ValueType::Unknown, ValueType::from_type_name);
        Self {
            key,
            descr: None,
            type_name,
            value_type,
            nullok,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_descr(mut self, descr: impl Into<String>) -> Self {
        self.descr = Some(descr.into());
        self
    }

    /// Returns the display name (`id`, `+1`).
    #[must_use]
    pub fn name(&self) -> String {
        self.key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parse() {
        assert_eq!(ParamKey::parse("+2"), ParamKey::Offset(2));
        assert_eq!(ParamKey::parse("-1"), ParamKey::Offset(-1));
        assert_eq!(ParamKey::parse("id"), ParamKey::Named(String::from("id")));
        assert_eq!(ParamKey::parse("+x"), ParamKey::Named(String::from("+x")));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(ParamKey::Offset(3).to_string(), "+3");
        assert_eq!(ParamKey::Offset(-3).to_string(), "-3");
        assert_eq!(ParamKey::Named(String::from("a")).to_string(), "a");
    }

    #[test]
    fn test_spec_canonical_type() {
        let spec = ParamSpec::new(ParamKey::parse("id"), Some(String::from("gint")), true);
        assert_eq!(spec.value_type, ValueType::Integer);
        assert_eq!(spec.name(), "id");
    }
}
