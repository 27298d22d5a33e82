//! Error types shared by parsing, validation and rendering.

use crate::lexer::Position;

/// Errors produced by the parser, the structure checks and the renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlError {
    /// The input could not be tokenized or does not follow the grammar.
    #[error("Syntax error at line {line}, column {col}: {message}")]
    Syntax {
        /// 1-based line of the offending token.
        line: u32,
        /// 1-based column of the offending token.
        col: u32,
        /// Byte offset of the offending token.
        offset: usize,
        /// What went wrong.
        message: String,
    },

    /// A statement exceeded the configured size or nesting limit.
    #[error("Overflow error at line {line}, column {col}: {message}")]
    Overflow {
        /// 1-based line where the limit was hit.
        line: u32,
        /// 1-based column where the limit was hit.
        col: u32,
        /// Which limit was exceeded.
        message: String,
    },

    /// The input holds no statement at all (only blanks, comments or separators).
    #[error("SQL code does not contain any statement")]
    EmptySql,

    /// The AST violates a structural rule.
    #[error("Malformed statement: {0}")]
    Structure(String),

    /// A parameter is missing, has the wrong type or cannot be NULL.
    #[error("Parameter '{param_name}': {reason}")]
    Bind {
        /// Name of the offending parameter.
        param_name: String,
        /// Why the binding was rejected.
        reason: String,
    },

    /// The statement cannot be expressed in the requested dialect.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl SqlError {
    /// Creates a syntax error located at `pos`.
    #[must_use]
    pub fn syntax(pos: Position, message: impl Into<String>) -> Self {
        Self::Syntax {
            line: pos.line,
            col: pos.col,
            offset: pos.offset,
            message: message.into(),
        }
    }

    /// Creates an overflow error located at `pos`.
    #[must_use]
    pub fn overflow(pos: Position, message: impl Into<String>) -> Self {
        Self::Overflow {
            line: pos.line,
            col: pos.col,
            message: message.into(),
        }
    }

    /// Creates a binding error for `param_name`.
    #[must_use]
    pub fn bind(param_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Bind {
            param_name: param_name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for [`SqlError::EmptySql`], which most callers treat as a no-op.
    #[must_use]
    pub const fn is_empty_sql(&self) -> bool {
        matches!(self, Self::EmptySql)
    }
}

/// Result type for parsing and rendering operations.
pub type Result<T> = std::result::Result<T, SqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_message() {
        let err = SqlError::syntax(Position::new(13, 1, 14), "expected identifier");
        assert_eq!(
            err.to_string(),
            "Syntax error at line 1, column 14: expected identifier"
        );
    }

    #[test]
    fn test_empty_sql_is_distinct() {
        assert!(SqlError::EmptySql.is_empty_sql());
        assert!(!SqlError::Render(String::from("x")).is_empty_sql());
    }
}
