//! Pratt expression parser for operator precedence.

use crate::ast::Operator;
use crate::lexer::{Keyword, TokenKind};

/// Binding power of prefix NOT: looser than comparisons, tighter than AND.
pub const NOT_BP: u8 = 5;

/// Binding power of prefix `-`, `+` and `~`.
pub const UNARY_BP: u8 = 17;

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where:
/// - Higher binding power = binds tighter
/// - Left associative: left_bp < right_bp
///
/// Returns `None` if the token is not an infix operator.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        // Logical OR (lowest precedence)
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),

        // Logical AND
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),

        // Comparison operators
        TokenKind::Eq
        | TokenKind::NotEq
        | TokenKind::Lt
        | TokenKind::LtEq
        | TokenKind::Gt
        | TokenKind::GtEq
        | TokenKind::Regexp
        | TokenKind::RegexpCi
        | TokenKind::NotRegexp
        | TokenKind::NotRegexpCi => Some((5, 6)),

        // IS, IN, BETWEEN, LIKE and their NOT forms, postfix ISNULL / NOTNULL
        TokenKind::Keyword(
            Keyword::Is
            | Keyword::In
            | Keyword::Between
            | Keyword::Like
            | Keyword::Ilike
            | Keyword::Similar
            | Keyword::Not
            | Keyword::Isnull
            | Keyword::Notnull,
        ) => Some((5, 6)),

        // Bitwise OR
        TokenKind::BitOr => Some((7, 8)),

        // Bitwise AND
        TokenKind::BitAnd => Some((9, 10)),

        // Bit shifts
        TokenKind::LeftShift | TokenKind::RightShift => Some((11, 12)),

        // Additive (string concat has same precedence as addition)
        TokenKind::Plus | TokenKind::Minus | TokenKind::Concat => Some((13, 14)),

        // Multiplicative
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some((15, 16)),

        // PostgreSQL cast
        TokenKind::DoubleColon => Some((19, 20)),

        _ => None,
    }
}

/// Converts a token to the operator of a plain binary operation.
#[must_use]
pub const fn token_to_operator(kind: &TokenKind) -> Option<Operator> {
    match kind {
        TokenKind::Plus => Some(Operator::Plus),
        TokenKind::Minus => Some(Operator::Minus),
        TokenKind::Star => Some(Operator::Star),
        TokenKind::Slash => Some(Operator::Div),
        TokenKind::Percent => Some(Operator::Rem),
        TokenKind::Eq => Some(Operator::Eq),
        TokenKind::NotEq => Some(Operator::Diff),
        TokenKind::Lt => Some(Operator::Lt),
        TokenKind::LtEq => Some(Operator::Leq),
        TokenKind::Gt => Some(Operator::Gt),
        TokenKind::GtEq => Some(Operator::Geq),
        TokenKind::Keyword(Keyword::And) => Some(Operator::And),
        TokenKind::Keyword(Keyword::Or) => Some(Operator::Or),
        TokenKind::Concat => Some(Operator::Concat),
        TokenKind::Keyword(Keyword::Like) => Some(Operator::Like),
        TokenKind::Keyword(Keyword::Ilike) => Some(Operator::Ilike),
        TokenKind::BitAnd => Some(Operator::BitAnd),
        TokenKind::BitOr => Some(Operator::BitOr),
        TokenKind::LeftShift => Some(Operator::LeftShift),
        TokenKind::RightShift => Some(Operator::RightShift),
        TokenKind::Regexp => Some(Operator::Regexp),
        TokenKind::RegexpCi => Some(Operator::RegexpCi),
        TokenKind::NotRegexp => Some(Operator::NotRegexp),
        TokenKind::NotRegexpCi => Some(Operator::NotRegexpCi),
        _ => None,
    }
}
