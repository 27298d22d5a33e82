//! Generic SQL dialect.

use super::{Dialect, DialectKind};

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Standard
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_dialect() {
        let dialect = GenericDialect::new();
        assert_eq!(dialect.name(), "standard");
        assert_eq!(dialect.identifier_quote(), '"');
        assert!(!dialect.backtick_identifiers());
        assert!(!dialect.supports_ilike());
        assert!(dialect.supports_limit_offset());
        assert_eq!(dialect.boolean_literal(true), "TRUE");
    }
}
