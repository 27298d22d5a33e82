//! SQL rendering.
//!
//! Turns a [`Statement`] back into SQL text for a dialect, with parameters
//! either inlined from a [`ParamValues`] store or emitted as placeholders.
//!
//! ```rust
//! use sqlshape_core::{parse_statement, render, DialectKind, ParamValues, RenderOptions};
//!
//! let (stmt, _) = parse_statement(
//!     "select * from mytable where id = ##id::int::null AND name = ##name::string",
//!     DialectKind::Standard,
//! )
//! .unwrap();
//! let values = ParamValues::new().with("id", None::<i64>).with("name", "zzz");
//! let sql = render(&stmt, &values, &RenderOptions::default(), DialectKind::Standard).unwrap();
//! assert_eq!(sql, "SELECT * FROM mytable WHERE id IS NULL AND name = 'zzz'");
//! ```

mod quote;
mod renderer;
mod rewrite;

use serde::{Deserialize, Serialize};

pub use quote::quote_identifier;
pub use renderer::Renderer;
pub use rewrite::rewrite_for_null_parameters;

use crate::ast::Statement;
use crate::dialect::DialectKind;
use crate::error::Result;
use crate::params::ParamValues;

/// How parameters appear in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamStyle {
    /// The bound value as a literal.
    #[default]
    Inline,
    /// `##name::type[::NULL]`
    Short,
    /// `## /* name:"..." type:... */`
    Long,
    /// `:name`
    Colon,
    /// `$1`, `$2`, ...
    Dollar,
    /// `?1`, `?2`, ...
    QMark,
    /// `?`
    UQMark,
}

impl ParamStyle {
    /// Returns whether the style needs bound values.
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Inline)
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Parameter emission style.
    pub param_style: ParamStyle,
    /// Convert offset-aware timestamps to GMT before formatting.
    pub gmt: bool,
    /// Put each clause on its own line.
    pub pretty: bool,
    /// Quote every identifier.
    pub force_quotes: bool,
    /// Treat names with uppercase characters as case sensitive.
    pub meta_store_convention: bool,
}

/// Renders `statement` as SQL text for `dialect`.
///
/// Comparisons against parameters bound to NULL in `values` are rewritten
/// first (see [`rewrite_for_null_parameters`]).
///
/// # Errors
///
/// Returns [`SqlError::Bind`](crate::SqlError::Bind) when an inlined parameter
/// has no usable value, and [`SqlError::Render`](crate::SqlError::Render) when
/// the statement uses a construct `dialect` does not support.
pub fn render(
    statement: &Statement,
    values: &ParamValues,
    options: &RenderOptions,
    dialect: DialectKind,
) -> Result<String> {
    let rewritten = rewrite_for_null_parameters(statement, values);
    Renderer::new(&rewritten, values, options, dialect).render()
}
