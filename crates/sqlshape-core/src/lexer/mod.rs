//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer producing a stream of [`Token`]s with line, column and
//! byte offset. It recognizes `##` placeholders and host parameters, and in
//! [`LexMode::Delimit`] tracks procedural block nesting so statements can be
//! split without parsing them.

mod span;
mod token;
mod tokenizer;

pub use span::{Position, Span};
pub use token::{Keyword, ParamToken, Token, TokenKind};
pub use tokenizer::{LexMode, Lexer};
