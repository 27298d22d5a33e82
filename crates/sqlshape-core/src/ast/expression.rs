//! Expression AST types.

use core::fmt;

use super::{DataType, SelectQuery};
use crate::dialect::Dialect;
use crate::params::{quote_string, ParamKey, SqlValue};

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal.
    String(String),
    /// Blob literal.
    Blob(Vec<u8>),
    /// Boolean literal.
    Boolean(bool),
    /// NULL literal.
    Null,
    /// The DEFAULT keyword in VALUES rows and SET clauses.
    Default,
}

impl Literal {
    /// Returns the literal as SQL text in `dialect`.
    #[must_use]
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        match self {
            Self::String(s) => quote_string(s, dialect),
            other => other.to_value().to_sql_inline(dialect, false),
        }
    }

    /// Converts the literal to a bindable value.
    #[must_use]
    pub fn to_value(&self) -> SqlValue {
        match self {
            Self::Integer(i) => SqlValue::Int(*i),
            Self::Float(f) => SqlValue::Float(*f),
            Self::String(s) => SqlValue::Text(s.clone()),
            Self::Blob(b) => SqlValue::Blob(b.clone()),
            Self::Boolean(b) => SqlValue::Bool(*b),
            Self::Null => SqlValue::Null,
            Self::Default => SqlValue::Default,
        }
    }
}

/// A possibly qualified name (`schema.table.column`), parts as written.
///
/// Delimited parts keep their quotes so they survive rendering unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Name parts, outermost qualifier first.
    pub parts: Vec<String>,
}

impl Identifier {
    /// Creates an unqualified name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: vec![name.into()],
        }
    }

    /// Creates a qualified name from its parts.
    #[must_use]
    pub const fn qualified(parts: Vec<String>) -> Self {
        Self { parts }
    }

    /// Returns the last part.
    #[must_use]
    pub fn name(&self) -> &str {
        self.parts.last().map_or("", String::as_str)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join("."))
    }
}

/// A reference to a parameter of the owning statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRef {
    /// Key of the spec in the statement's parameter table.
    pub key: ParamKey,
    /// Literal written before a bare `/* name:... */` comment.
    pub default: Option<Literal>,
    /// Set by the NULL rewrite: the parameter is bound to NULL and renders as `NULL`.
    pub null_bound: bool,
}

impl ParamRef {
    /// Creates a reference with no default.
    #[must_use]
    pub const fn new(key: ParamKey) -> Self {
        Self {
            key,
            default: None,
            null_bound: false,
        }
    }
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name, as written.
    pub name: String,
    /// The arguments; `count(*)` has a single [`Expr::Wildcard`].
    pub args: Vec<Expr>,
    /// Whether DISTINCT was specified.
    pub distinct: bool,
}

/// Operators of [`Operation`] nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    Is,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    Like,
    NotLike,
    Ilike,
    NotIlike,
    Between,
    Gt,
    Lt,
    Geq,
    Leq,
    Diff,
    Regexp,
    RegexpCi,
    NotRegexp,
    NotRegexpCi,
    Similar,
    Concat,
    Plus,
    Minus,
    Star,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitNot,
    LeftShift,
    RightShift,
}

/// How many operands an operator takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one.
    Unary,
    /// Exactly two.
    Binary,
    /// Exactly three (BETWEEN).
    Ternary,
    /// Two or more (flattened chains, IN lists).
    Variadic,
    /// One (prefix minus) or two.
    UnaryOrBinary,
}

impl Operator {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Eq => "=",
            Self::Is => "IS",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Ilike => "ILIKE",
            Self::NotIlike => "NOT ILIKE",
            Self::Between => "BETWEEN",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Geq => ">=",
            Self::Leq => "<=",
            Self::Diff => "!=",
            Self::Regexp => "~",
            Self::RegexpCi => "~*",
            Self::NotRegexp => "!~",
            Self::NotRegexpCi => "!~*",
            Self::Similar => "SIMILAR TO",
            Self::Concat => "||",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitNot => "~",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }

    /// Returns the precedence of the operator (higher = binds tighter).
    #[must_use]
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Not => 3,
            Self::Eq
            | Self::Is
            | Self::IsNull
            | Self::IsNotNull
            | Self::In
            | Self::NotIn
            | Self::Like
            | Self::NotLike
            | Self::Ilike
            | Self::NotIlike
            | Self::Between
            | Self::Gt
            | Self::Lt
            | Self::Geq
            | Self::Leq
            | Self::Diff
            | Self::Regexp
            | Self::RegexpCi
            | Self::NotRegexp
            | Self::NotRegexpCi
            | Self::Similar => 4,
            Self::BitOr => 5,
            Self::BitAnd => 6,
            Self::LeftShift | Self::RightShift => 7,
            Self::Plus | Self::Minus | Self::Concat => 8,
            Self::Star | Self::Div | Self::Rem => 9,
            Self::BitNot => 10,
        }
    }

    /// Returns the number of operands the operator takes.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        match self {
            Self::Not | Self::IsNull | Self::IsNotNull | Self::BitNot => Arity::Unary,
            Self::Between => Arity::Ternary,
            Self::And | Self::Or | Self::Concat | Self::Plus | Self::Star | Self::In | Self::NotIn => {
                Arity::Variadic
            }
            Self::Minus => Arity::UnaryOrBinary,
            _ => Arity::Binary,
        }
    }

    /// Returns whether `n` operands are acceptable.
    #[must_use]
    pub const fn accepts_operands(&self, n: usize) -> bool {
        match self.arity() {
            Arity::Unary => n == 1,
            Arity::Binary => n == 2,
            Arity::Ternary => n == 3,
            Arity::Variadic => n >= 2,
            Arity::UnaryOrBinary => n == 1 || n == 2,
        }
    }

    /// Returns whether chains of this operator collapse into one operation.
    #[must_use]
    pub const fn flattens(&self) -> bool {
        matches!(
            self,
            Self::And | Self::Or | Self::Concat | Self::Plus | Self::Star
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operator applied to its operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// The operator.
    pub op: Operator,
    /// Operands, in source order.
    pub operands: Vec<Expr>,
}

/// A CASE expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    /// The operand of a simple CASE.
    pub base: Option<Box<Expr>>,
    /// WHEN/THEN pairs.
    pub when_then: Vec<(Expr, Expr)>,
    /// ELSE branch.
    pub else_expr: Option<Box<Expr>>,
}

/// An SQL expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value.
    Value(Literal),

    /// A column or other name reference.
    Identifier(Identifier),

    /// A parameter placeholder.
    Parameter(ParamRef),

    /// A function call.
    Function(FunctionCall),

    /// An operator with its operands.
    Operation(Operation),

    /// A sub-select.
    Select(Box<SelectQuery>),

    /// CASE expression.
    Case(CaseExpr),

    /// CAST expression.
    Cast {
        /// Expression to cast.
        expr: Box<Expr>,
        /// Target type.
        data_type: DataType,
    },

    /// Wildcard (*) in SELECT or `count(*)`.
    Wildcard {
        /// Table qualifier (optional).
        table: Option<String>,
    },
}

impl Expr {
    /// Creates a new column reference.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Identifier(Identifier::new(name))
    }

    /// Creates a new qualified column reference.
    #[must_use]
    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Identifier(Identifier::qualified(vec![table.into(), name.into()]))
    }

    /// Creates a new integer literal.
    #[must_use]
    pub const fn integer(value: i64) -> Self {
        Self::Value(Literal::Integer(value))
    }

    /// Creates a new string literal.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(Literal::String(value.into()))
    }

    /// Creates a NULL literal.
    #[must_use]
    pub const fn null() -> Self {
        Self::Value(Literal::Null)
    }

    /// Creates a reference to the named parameter `name`.
    #[must_use]
    pub fn param(name: impl Into<String>) -> Self {
        Self::Parameter(ParamRef::new(ParamKey::Named(name.into())))
    }

    /// Creates an operation.
    #[must_use]
    pub const fn operation(op: Operator, operands: Vec<Self>) -> Self {
        Self::Operation(Operation { op, operands })
    }

    /// Creates an equality expression.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        Self::operation(Operator::Eq, vec![self, right])
    }

    /// Creates an AND expression.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::operation(Operator::And, vec![self, right])
    }

    /// Returns the parameter reference if this is a parameter.
    #[must_use]
    pub const fn as_param(&self) -> Option<&ParamRef> {
        match self {
            Self::Parameter(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the expressions directly below this one.
    ///
    /// For a sub-select these are the top-level expressions of the query.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Value(_) | Self::Identifier(_) | Self::Parameter(_) | Self::Wildcard { .. } => {
                Vec::new()
            }
            Self::Function(f) => f.args.iter().collect(),
            Self::Operation(op) => op.operands.iter().collect(),
            Self::Select(query) => query.root_exprs(),
            Self::Case(case) => {
                let mut out: Vec<&Self> = case.base.as_deref().into_iter().collect();
                for (when, then) in &case.when_then {
                    out.push(when);
                    out.push(then);
                }
                out.extend(case.else_expr.as_deref());
                out
            }
            Self::Cast { expr, .. } => vec![expr.as_ref()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn test_operator_precedence() {
        assert!(Operator::Star.precedence() > Operator::Plus.precedence());
        assert!(Operator::And.precedence() > Operator::Or.precedence());
        assert!(Operator::Eq.precedence() > Operator::And.precedence());
        assert!(Operator::Not.precedence() < Operator::Eq.precedence());
    }

    #[test]
    fn test_operand_counts() {
        assert!(Operator::Between.accepts_operands(3));
        assert!(!Operator::Between.accepts_operands(2));
        assert!(Operator::And.accepts_operands(4));
        assert!(Operator::Minus.accepts_operands(1));
        assert!(!Operator::IsNull.accepts_operands(2));
    }

    #[test]
    fn test_expr_builders() {
        let expr = Expr::column("age")
            .eq(Expr::integer(18))
            .and(Expr::column("status").eq(Expr::param("status")));
        let Expr::Operation(op) = &expr else {
            panic!("expected an operation");
        };
        assert_eq!(op.op, Operator::And);
        assert_eq!(expr.children().len(), 2);
        assert!(op.operands[1].children()[1].as_param().is_some());
    }

    #[test]
    fn test_literal_to_sql() {
        let dialect = DialectKind::Standard.dialect();
        assert_eq!(Literal::String(String::from("a'b")).to_sql(dialect), "'a''b'");
        assert_eq!(Literal::Null.to_sql(dialect), "NULL");
        assert_eq!(
            Literal::Boolean(false).to_sql(DialectKind::Sqlite.dialect()),
            "0"
        );
    }

    #[test]
    fn test_identifier_display() {
        let id = Identifier::qualified(vec![String::from("s"), String::from("\"T\"")]);
        assert_eq!(id.to_string(), "s.\"T\"");
        assert_eq!(id.name(), "\"T\"");
    }
}
