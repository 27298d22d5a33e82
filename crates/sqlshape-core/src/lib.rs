//! # sqlshape-core
//!
//! A dialect-aware SQL statement parser with typed parameters.
//!
//! This crate provides:
//! - A hand-written recursive descent parser with Pratt expression parsing,
//!   producing a typed AST for SELECT (and compounds), INSERT, UPDATE, DELETE
//!   and transaction control; anything else is kept as text
//! - `##name::type[::null]` parameter placeholders collected into a
//!   per-statement parameter table
//! - A canonical, deterministic serialized form of every statement
//! - A renderer that turns the AST back into SQL for a given dialect, inlining
//!   bound values or emitting placeholders
//!
//! ## Parsing
//!
//! ```rust
//! use sqlshape_core::{get_parameters, parse_statement, DialectKind};
//!
//! let (stmt, rest) = parse_statement(
//!     "SELECT id FROM users WHERE name = ##name::string; DELETE FROM t",
//!     DialectKind::Postgresql,
//! )
//! .unwrap();
//! assert_eq!(stmt.stmt_type(), "SELECT");
//! assert_eq!(rest, "DELETE FROM t");
//! assert_eq!(get_parameters(&stmt).names(), vec!["name"]);
//! ```
//!
//! ## Scripts
//!
//! A [`SqlParser`] keeps state across statements, such as a MySQL
//! `DELIMITER` change:
//!
//! ```rust
//! use sqlshape_core::{DialectKind, SqlParser};
//!
//! let mut parser = SqlParser::for_dialect(DialectKind::Sqlite);
//! let batch = parser.parse_batch("BEGIN; INSERT INTO t VALUES (1);; COMMIT;").unwrap();
//! assert_eq!(batch.len(), 3);
//! ```
//!
//! ## Rendering
//!
//! ```rust
//! use sqlshape_core::{parse_statement, render, DialectKind, ParamValues, RenderOptions};
//!
//! let (stmt, _) =
//!     parse_statement("select * from t where id = ##id::int", DialectKind::Standard).unwrap();
//! let values = ParamValues::new().with("id", 7_i64);
//! let sql = render(&stmt, &values, &RenderOptions::default(), DialectKind::Mysql).unwrap();
//! assert_eq!(sql, "SELECT * FROM t WHERE id = 7");
//! ```

pub mod ast;
pub mod config;
pub mod dialect;
pub mod error;
pub mod lexer;
pub mod params;
pub mod parser;
pub mod render;
pub mod serialize;
pub mod validate;

pub use ast::{Batch, Expr, Statement, StatementBody};
pub use config::ParserConfig;
pub use dialect::{Dialect, DialectKind};
pub use error::{Result, SqlError};
pub use lexer::{Lexer, Token, TokenKind};
pub use params::{ParamKey, ParamSet, ParamSpec, ParamValues, SqlValue, ValueType};
pub use parser::{parse_batch, parse_statement, ParseError, Parser, SqlParser};
pub use render::{
    quote_identifier, render, rewrite_for_null_parameters, ParamStyle, RenderOptions, Renderer,
};
pub use serialize::{serialize, serialize_batch, serialize_expr};
pub use validate::{check_compound, check_structure};

/// Returns the parameter table of `statement`, for external binding code.
///
/// There is one entry per distinct parameter, whatever the number of
/// occurrences in the text.
#[must_use]
pub const fn get_parameters(statement: &Statement) -> &ParamSet {
    statement.parameters()
}
