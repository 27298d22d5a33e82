//! MySQL dialect implementation.

use super::{is_reserved_sql_word, Dialect, DialectKind};

/// MySQL dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quote(&self) -> char {
        '`'
    }

    fn backtick_identifiers(&self) -> bool {
        true
    }

    fn double_quoted_strings(&self) -> bool {
        true
    }

    fn backslash_escapes(&self) -> bool {
        true
    }

    fn hash_comments(&self) -> bool {
        true
    }

    fn supports_full_join(&self) -> bool {
        false
    }

    fn supports_set_op_all(&self) -> bool {
        false
    }

    fn supports_delimiter_command(&self) -> bool {
        true
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        is_reserved_sql_word(word)
            || matches!(
                word.to_ascii_uppercase().as_str(),
                "KEY" | "KEYS" | "DATABASE" | "SCHEMA" | "REPLACE" | "REGEXP" | "RLIKE" | "DIV"
            )
    }
}
