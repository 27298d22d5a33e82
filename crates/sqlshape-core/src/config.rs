//! Parser configuration.

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;

/// Default limit on the size of one statement, in bytes.
pub const DEFAULT_MAX_STATEMENT_LEN: usize = 1024 * 1024;

/// Default limit on expression and sub-select nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings for a [`SqlParser`](crate::parser::SqlParser).
///
/// Missing fields take their default when deserialized, so a JSON file only
/// needs the values it changes:
///
/// ```rust
/// use sqlshape_core::{DialectKind, ParserConfig};
///
/// let config: ParserConfig = serde_json::from_str(r#"{"dialect": "mysql"}"#).unwrap();
/// assert_eq!(config.dialect, DialectKind::Mysql);
/// assert_eq!(config.max_depth, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// SQL flavour of the input.
    pub dialect: DialectKind,
    /// Longest accepted statement, in bytes.
    pub max_statement_len: usize,
    /// Deepest accepted expression nesting.
    pub max_depth: usize,
    /// Reject a parameter redeclared with a different type.
    pub strict_param_types: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::for_dialect(DialectKind::Standard)
    }
}

impl ParserConfig {
    /// Default settings for `dialect`.
    #[must_use]
    pub const fn for_dialect(dialect: DialectKind) -> Self {
        Self {
            dialect,
            max_statement_len: DEFAULT_MAX_STATEMENT_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_param_types: false,
        }
    }
}
