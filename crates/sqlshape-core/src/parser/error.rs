//! Parser error types.

use core::fmt;

use crate::error::SqlError;
use crate::lexer::{Position, Span, TokenKind};

/// A parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The location of the error.
    pub span: Span,
    /// Line, column and offset of the error.
    pub pos: Position,
    /// Expected tokens (if applicable).
    pub expected: Option<String>,
    /// The actual token found.
    pub found: Option<TokenKind>,
    /// Whether a nesting limit, rather than the grammar, was hit.
    pub overflow: bool,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span, pos: Position) -> Self {
        Self {
            message: message.into(),
            span,
            pos,
            expected: None,
            found: None,
            overflow: false,
        }
    }

    /// Creates an "unexpected token" error.
    #[must_use]
    pub fn unexpected(
        expected: impl Into<String>,
        found: TokenKind,
        span: Span,
        pos: Position,
    ) -> Self {
        let expected: String = expected.into();
        if found == TokenKind::Eof {
            return Self::unexpected_eof(expected, span, pos);
        }
        let message = match &found {
            TokenKind::Error(lexical) => lexical.clone(),
            other => format!("expected {expected}, found {}", describe(other)),
        };
        Self {
            message,
            span,
            pos,
            expected: Some(expected),
            found: Some(found),
            overflow: false,
        }
    }

    /// Creates an "unexpected end of input" error.
    #[must_use]
    pub fn unexpected_eof(expected: impl Into<String>, span: Span, pos: Position) -> Self {
        let expected: String = expected.into();
        Self {
            message: format!("expected {expected}, found end of input"),
            span,
            pos,
            expected: Some(expected),
            found: Some(TokenKind::Eof),
            overflow: false,
        }
    }

    /// Creates a nesting limit error.
    #[must_use]
    pub fn too_deep(limit: usize, span: Span, pos: Position) -> Self {
        Self {
            overflow: true,
            ..Self::new(format!("expression nesting exceeds {limit} levels"), span, pos)
        }
    }
}

/// Returns a short human description of a token.
#[must_use]
pub fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Integer(i) => format!("number {i}"),
        TokenKind::Float(f) => format!("number {f}"),
        TokenKind::String(s) => format!("string '{s}'"),
        TokenKind::Blob(_) => String::from("blob literal"),
        TokenKind::Identifier(name) => format!("identifier {name}"),
        TokenKind::Keyword(kw) => format!("keyword {}", kw.as_str()),
        TokenKind::Param(p) => format!("parameter {}", p.key),
        TokenKind::HostParam(name) => format!("parameter {name}"),
        TokenKind::Symbol(c) => format!("'{c}'"),
        TokenKind::Eof => String::from("end of input"),
        TokenKind::Error(message) => message.clone(),
        TokenKind::Semicolon | TokenKind::BlockSemicolon => String::from("';'"),
        TokenKind::LeftParen => String::from("'('"),
        TokenKind::RightParen => String::from("')'"),
        TokenKind::Comma => String::from("','"),
        TokenKind::Dot => String::from("'.'"),
        TokenKind::Eq => String::from("'='"),
        TokenKind::Star => String::from("'*'"),
        other => format!("{other:?}"),
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.pos.line, self.pos.col
        )
    }
}

impl std::error::Error for ParseError {}

impl From<ParseError> for SqlError {
    fn from(err: ParseError) -> Self {
        if err.overflow {
            Self::overflow(err.pos, err.message)
        } else {
            Self::syntax(err.pos, err.message)
        }
    }
}
