//! SQLite dialect implementation.

use super::{Dialect, DialectKind};

/// SQLite dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn backtick_identifiers(&self) -> bool {
        true // accepted for MySQL compatibility
    }

    fn supports_full_join(&self) -> bool {
        false
    }

    fn supports_set_op_all(&self) -> bool {
        false
    }

    fn supports_parenthesized_branches(&self) -> bool {
        false
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_dialect() {
        let dialect = SqliteDialect::new();
        assert_eq!(dialect.name(), "sqlite");
        assert_eq!(dialect.identifier_quote(), '"');
        assert!(dialect.backtick_identifiers());
        assert!(!dialect.supports_full_join());
        assert!(!dialect.supports_set_op_all());
        assert!(!dialect.supports_parenthesized_branches());
        assert_eq!(dialect.boolean_literal(false), "0");
    }
}
