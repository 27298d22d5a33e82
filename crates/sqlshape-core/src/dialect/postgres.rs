//! PostgreSQL dialect implementation.

use super::{Dialect, DialectKind};

/// PostgreSQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgresql
    }

    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn dollar_quoted_strings(&self) -> bool {
        true
    }

    fn supports_regexp_operators(&self) -> bool {
        true
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn supports_distinct_on(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_dialect() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.name(), "postgresql");
        assert!(dialect.supports_ilike());
        assert!(dialect.supports_regexp_operators());
        assert!(dialect.dollar_quoted_strings());
    }
}
