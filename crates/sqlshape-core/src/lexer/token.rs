//! Token types for the SQL lexer.

use super::{Position, Span};
use crate::params::ParamKey;

/// SQL keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Data Query Language
    Select,
    From,
    Where,
    Order,
    By,
    Group,
    Having,
    Limit,
    Offset,
    Distinct,
    All,
    Collate,

    // Joins
    Join,
    Inner,
    Left,
    Right,
    Full,
    Outer,
    Cross,
    Natural,
    On,
    Using,

    // Set operations
    Union,
    Intersect,
    Except,

    // Data Manipulation Language
    Insert,
    Into,
    Values,
    Update,
    Set,
    Delete,
    Replace,
    Default,

    // Logical and comparison operators
    And,
    Or,
    Not,
    In,
    Between,
    Like,
    Ilike,
    Similar,
    To,
    Is,
    Isnull,
    Notnull,
    Null,
    True,
    False,
    Exists,

    // Ordering
    Asc,
    Desc,
    Nulls,
    First,
    Last,

    // Expressions
    As,
    Case,
    When,
    Then,
    Else,
    End,
    Cast,

    // Transactions
    Begin,
    Start,
    Commit,
    Rollback,
    Transaction,
    Work,
    Savepoint,
    Release,
    Isolation,
    Level,
    Read,
    Write,
    Only,
    Committed,
    Uncommitted,
    Repeatable,
    Serializable,
    Deferred,
    Immediate,
    Exclusive,

    // Conflict resolution
    Abort,
    Fail,
    Ignore,

    // Procedural blocks
    Create,
    Declare,
    Loop,
    If,

    // Data types
    Int,
    Integer,
    Smallint,
    Bigint,
    Real,
    Double,
    Float,
    Decimal,
    Numeric,
    Char,
    Varchar,
    Text,
    Blob,
    Boolean,
    Date,
    Time,
    Timestamp,
    Datetime,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "ORDER" => Some(Self::Order),
            "BY" => Some(Self::By),
            "GROUP" => Some(Self::Group),
            "HAVING" => Some(Self::Having),
            "LIMIT" => Some(Self::Limit),
            "OFFSET" => Some(Self::Offset),
            "DISTINCT" => Some(Self::Distinct),
            "ALL" => Some(Self::All),
            "COLLATE" => Some(Self::Collate),
            "JOIN" => Some(Self::Join),
            "INNER" => Some(Self::Inner),
            "LEFT" => Some(Self::Left),
            "RIGHT" => Some(Self::Right),
            "FULL" => Some(Self::Full),
            "OUTER" => Some(Self::Outer),
            "CROSS" => Some(Self::Cross),
            "NATURAL" => Some(Self::Natural),
            "ON" => Some(Self::On),
            "USING" => Some(Self::Using),
            "UNION" => Some(Self::Union),
            "INTERSECT" => Some(Self::Intersect),
            "EXCEPT" => Some(Self::Except),
            "INSERT" => Some(Self::Insert),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "UPDATE" => Some(Self::Update),
            "SET" => Some(Self::Set),
            "DELETE" => Some(Self::Delete),
            "REPLACE" => Some(Self::Replace),
            "DEFAULT" => Some(Self::Default),
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            "NOT" => Some(Self::Not),
            "IN" => Some(Self::In),
            "BETWEEN" => Some(Self::Between),
            "LIKE" => Some(Self::Like),
            "ILIKE" => Some(Self::Ilike),
            "SIMILAR" => Some(Self::Similar),
            "TO" => Some(Self::To),
            "IS" => Some(Self::Is),
            "ISNULL" => Some(Self::Isnull),
            "NOTNULL" => Some(Self::Notnull),
            "NULL" => Some(Self::Null),
            "TRUE" => Some(Self::True),
            "FALSE" => Some(Self::False),
            "EXISTS" => Some(Self::Exists),
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            "NULLS" => Some(Self::Nulls),
            "FIRST" => Some(Self::First),
            "LAST" => Some(Self::Last),
            "AS" => Some(Self::As),
            "CASE" => Some(Self::Case),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "END" => Some(Self::End),
            "CAST" => Some(Self::Cast),
            "BEGIN" => Some(Self::Begin),
            "START" => Some(Self::Start),
            "COMMIT" => Some(Self::Commit),
            "ROLLBACK" => Some(Self::Rollback),
            "TRANSACTION" => Some(Self::Transaction),
            "WORK" => Some(Self::Work),
            "SAVEPOINT" => Some(Self::Savepoint),
            "RELEASE" => Some(Self::Release),
            "ISOLATION" => Some(Self::Isolation),
            "LEVEL" => Some(Self::Level),
            "READ" => Some(Self::Read),
            "WRITE" => Some(Self::Write),
            "ONLY" => Some(Self::Only),
            "COMMITTED" => Some(Self::Committed),
            "UNCOMMITTED" => Some(Self::Uncommitted),
            "REPEATABLE" => Some(Self::Repeatable),
            "SERIALIZABLE" => Some(Self::Serializable),
            "DEFERRED" => Some(Self::Deferred),
            "IMMEDIATE" => Some(Self::Immediate),
            "EXCLUSIVE" => Some(Self::Exclusive),
            "ABORT" => Some(Self::Abort),
            "FAIL" => Some(Self::Fail),
            "IGNORE" => Some(Self::Ignore),
            "CREATE" => Some(Self::Create),
            "DECLARE" => Some(Self::Declare),
            "LOOP" => Some(Self::Loop),
            "IF" => Some(Self::If),
            "INT" => Some(Self::Int),
            "INTEGER" => Some(Self::Integer),
            "SMALLINT" => Some(Self::Smallint),
            "BIGINT" => Some(Self::Bigint),
            "REAL" => Some(Self::Real),
            "DOUBLE" => Some(Self::Double),
            "FLOAT" => Some(Self::Float),
            "DECIMAL" => Some(Self::Decimal),
            "NUMERIC" => Some(Self::Numeric),
            "CHAR" => Some(Self::Char),
            "VARCHAR" => Some(Self::Varchar),
            "TEXT" => Some(Self::Text),
            "BLOB" => Some(Self::Blob),
            "BOOLEAN" => Some(Self::Boolean),
            "DATE" => Some(Self::Date),
            "TIME" => Some(Self::Time),
            "TIMESTAMP" => Some(Self::Timestamp),
            "DATETIME" => Some(Self::Datetime),
            _ => None,
        }
    }

    /// Returns the canonical (upper case) spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Order => "ORDER",
            Self::By => "BY",
            Self::Group => "GROUP",
            Self::Having => "HAVING",
            Self::Limit => "LIMIT",
            Self::Offset => "OFFSET",
            Self::Distinct => "DISTINCT",
            Self::All => "ALL",
            Self::Collate => "COLLATE",
            Self::Join => "JOIN",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
            Self::Outer => "OUTER",
            Self::Cross => "CROSS",
            Self::Natural => "NATURAL",
            Self::On => "ON",
            Self::Using => "USING",
            Self::Union => "UNION",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
            Self::Insert => "INSERT",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
            Self::Default => "DEFAULT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::In => "IN",
            Self::Between => "BETWEEN",
            Self::Like => "LIKE",
            Self::Ilike => "ILIKE",
            Self::Similar => "SIMILAR",
            Self::To => "TO",
            Self::Is => "IS",
            Self::Isnull => "ISNULL",
            Self::Notnull => "NOTNULL",
            Self::Null => "NULL",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Exists => "EXISTS",
            Self::Asc => "ASC",
            Self::Desc => "DESC",
            Self::Nulls => "NULLS",
            Self::First => "FIRST",
            Self::Last => "LAST",
            Self::As => "AS",
            Self::Case => "CASE",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::End => "END",
            Self::Cast => "CAST",
            Self::Begin => "BEGIN",
            Self::Start => "START",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Transaction => "TRANSACTION",
            Self::Work => "WORK",
            Self::Savepoint => "SAVEPOINT",
            Self::Release => "RELEASE",
            Self::Isolation => "ISOLATION",
            Self::Level => "LEVEL",
            Self::Read => "READ",
            Self::Write => "WRITE",
            Self::Only => "ONLY",
            Self::Committed => "COMMITTED",
            Self::Uncommitted => "UNCOMMITTED",
            Self::Repeatable => "REPEATABLE",
            Self::Serializable => "SERIALIZABLE",
            Self::Deferred => "DEFERRED",
            Self::Immediate => "IMMEDIATE",
            Self::Exclusive => "EXCLUSIVE",
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Create => "CREATE",
            Self::Declare => "DECLARE",
            Self::Loop => "LOOP",
            Self::If => "IF",
            Self::Int => "INT",
            Self::Integer => "INTEGER",
            Self::Smallint => "SMALLINT",
            Self::Bigint => "BIGINT",
            Self::Real => "REAL",
            Self::Double => "DOUBLE",
            Self::Float => "FLOAT",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Datetime => "DATETIME",
        }
    }

    /// Returns true if the keyword can never be used as a bare identifier or alias.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(
            self,
            Self::Select
            | Self::From
            | Self::Where
            | Self::Order
            | Self::By
            | Self::Group
            | Self::Having
            | Self::Limit
            | Self::Offset
            | Self::Distinct
            | Self::All
            | Self::Collate
            | Self::Join
            | Self::Inner
            | Self::Left
            | Self::Right
            | Self::Full
            | Self::Outer
            | Self::Cross
            | Self::Natural
            | Self::On
            | Self::Using
            | Self::Union
            | Self::Intersect
            | Self::Except
            | Self::Insert
            | Self::Into
            | Self::Values
            | Self::Update
            | Self::Set
            | Self::Delete
            | Self::Default
            | Self::And
            | Self::Or
            | Self::Not
            | Self::In
            | Self::Between
            | Self::Like
            | Self::Ilike
            | Self::Similar
            | Self::Is
            | Self::Isnull
            | Self::Notnull
            | Self::Null
            | Self::True
            | Self::False
            | Self::Exists
            | Self::Asc
            | Self::Desc
            | Self::As
            | Self::Case
            | Self::When
            | Self::Then
            | Self::Else
            | Self::End
            | Self::Cast
            | Self::Create
        )
    }
}

/// A `##...` placeholder as read from the SQL text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    /// Name or relative offset of the parameter.
    pub key: ParamKey,
    /// Declared type, as written.
    pub type_name: Option<String>,
    /// Description (legacy comment form only).
    pub descr: Option<String>,
    /// Whether the value may be NULL.
    pub nullok: bool,
    /// True for a bare `/* name:... */` comment, which binds to the literal before it.
    pub attached: bool,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Float literal (e.g., 3.14)
    Float(f64),
    /// String literal, unescaped (e.g., 'hello')
    String(String),
    /// Blob literal (e.g., X'1234')
    Blob(Vec<u8>),

    // Identifiers and keywords
    /// Identifier; delimited identifiers keep their quotes (e.g., `"Order Id"`)
    Identifier(String),
    /// SQL keyword
    Keyword(Keyword),

    // Placeholders
    /// `##name::type[::null]`, `##+N::type` or the legacy comment form
    Param(Box<ParamToken>),
    /// Host parameter (`?1`, `:name`, `$1`, `$name`, `@name`), without its sigil.
    /// The Nth bare `?` is named `?N`.
    HostParam(String),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Eq,
    /// != or <>
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// &
    BitAnd,
    /// |
    BitOr,
    /// ~ outside PostgreSQL
    BitNot,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// ~ in PostgreSQL
    Regexp,
    /// ~*
    RegexpCi,
    /// !~
    NotRegexp,
    /// !~*
    NotRegexpCi,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// ,
    Comma,
    /// Statement delimiter (`;` unless changed by `DELIMITER`)
    Semicolon,
    /// A `;` nested in a BEGIN ... END block, which does not end the statement
    BlockSemicolon,
    /// .
    Dot,
    /// :
    Colon,
    /// ::
    DoubleColon,

    // Special
    /// A character with no meaning to the grammar, kept verbatim in passthrough statements
    Symbol(char),
    /// End of input
    Eof,
    /// Invalid/unknown token
    Error(String),
}

/// A token with its location in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range in the source code.
    pub span: Span,
    /// Line, column and offset of the first character.
    pub pos: Position,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, pos: Position) -> Self {
        Self { kind, span, pos }
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns true if this is a keyword.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword(_))
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token ends a statement.
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self.kind, TokenKind::Semicolon | TokenKind::Eof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind) -> Token {
        Token::new(kind, Span::new(0, 1), Position::default())
    }

    #[test]
    fn test_keyword_from_str() {
        assert_eq!(Keyword::from_str("SELECT"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_str("SaVePoInT"), Some(Keyword::Savepoint));
        assert_eq!(Keyword::from_str("not_a_keyword"), None);
    }

    #[test]
    fn test_keyword_as_str() {
        assert_eq!(Keyword::Select.as_str(), "SELECT");
        assert_eq!(Keyword::Ilike.as_str(), "ILIKE");
        assert_eq!(Keyword::Serializable.as_str(), "SERIALIZABLE");
    }

    #[test]
    fn test_reserved_keywords() {
        assert!(Keyword::Select.is_reserved());
        assert!(Keyword::Where.is_reserved());
        assert!(!Keyword::Date.is_reserved());
        assert!(!Keyword::Level.is_reserved());
    }

    #[test]
    fn test_token_predicates() {
        assert!(token(TokenKind::Eof).is_eof());
        assert!(token(TokenKind::Eof).is_terminator());
        assert!(token(TokenKind::Semicolon).is_terminator());
        assert!(!token(TokenKind::BlockSemicolon).is_terminator());
        assert_eq!(
            token(TokenKind::Keyword(Keyword::From)).as_keyword(),
            Some(Keyword::From)
        );
        assert_eq!(token(TokenKind::Plus).as_keyword(), None);
    }
}
