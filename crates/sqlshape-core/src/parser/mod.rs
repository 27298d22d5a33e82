//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing.
//!
//! [`SqlParser`] splits a script into statements with a lexer in
//! [`LexMode::Delimit`](crate::lexer::LexMode::Delimit), then hands each
//! statement to a token-level [`Parser`]. Statements whose leading keyword
//! the grammar does not cover are kept as UNKNOWN text fragments.

mod error;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;
mod script;

pub use error::{describe, ParseError};
pub use parser::Parser;
pub use script::{parse_batch, parse_statement, SqlParser};
