//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. The [`Dialect`] trait
//! gathers the lexical and rendering differences the parser and renderer care
//! about; [`DialectKind`] is the plain tag callers pass around.

mod generic;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub use generic::GenericDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

/// Words that always need quoting when used as identifiers.
///
/// Sorted, upper case, so lookups can binary search.
const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BETWEEN", "BOTH", "BY", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONSTRAINT", "CREATE", "CROSS", "CURRENT",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "ESCAPE", "EXCEPT", "EXISTS",
    "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "ILIKE", "IN",
    "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "LEADING", "LEFT",
    "LIKE", "LIMIT", "NATURAL", "NOT", "NOTNULL", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER",
    "PRIMARY", "REFERENCES", "RETURNING", "REVOKE", "RIGHT", "ROLLBACK", "SELECT", "SET",
    "SIMILAR", "SOME", "TABLE", "THEN", "TO", "TRAILING", "TRUE", "UNION", "UNIQUE", "UPDATE",
    "USING", "VALUES", "VIEW", "WHEN", "WHERE", "WITH",
];

/// Returns true if `word` is a reserved SQL word (case-insensitive).
#[must_use]
pub fn is_reserved_sql_word(word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    RESERVED_WORDS.binary_search(&upper.as_str()).is_ok()
}

/// Trait for SQL dialect-specific behavior.
pub trait Dialect: Send + Sync {
    /// Returns the tag of the dialect.
    fn kind(&self) -> DialectKind;

    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the identifier quote character (e.g., `"` for standard SQL, `` ` `` for MySQL).
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Returns whether `` `name` `` is a delimited identifier.
    fn backtick_identifiers(&self) -> bool {
        false
    }

    /// Returns whether `"text"` is a string literal rather than an identifier.
    fn double_quoted_strings(&self) -> bool {
        false
    }

    /// Returns whether a backslash escapes the next character inside string literals.
    fn backslash_escapes(&self) -> bool {
        false
    }

    /// Returns whether a single `#` starts a line comment.
    fn hash_comments(&self) -> bool {
        false
    }

    /// Returns whether `$tag$ ... $tag$` is a string literal.
    fn dollar_quoted_strings(&self) -> bool {
        false
    }

    /// Returns whether `~` and friends are regular expression operators.
    fn supports_regexp_operators(&self) -> bool {
        false
    }

    /// Returns whether ILIKE / NOT ILIKE are available.
    fn supports_ilike(&self) -> bool {
        false
    }

    /// Returns whether SELECT DISTINCT ON (...) is available.
    fn supports_distinct_on(&self) -> bool {
        false
    }

    /// Returns whether FULL and RIGHT joins are available.
    fn supports_full_join(&self) -> bool {
        true
    }

    /// Returns whether the dialect supports LIMIT with OFFSET.
    fn supports_limit_offset(&self) -> bool {
        true
    }

    /// Returns whether INTERSECT ALL and EXCEPT ALL are available.
    fn supports_set_op_all(&self) -> bool {
        true
    }

    /// Returns whether a branch of a compound may be a parenthesized query.
    fn supports_parenthesized_branches(&self) -> bool {
        true
    }

    /// Returns whether `DELIMITER x` changes the statement delimiter.
    fn supports_delimiter_command(&self) -> bool {
        false
    }

    /// Returns whether `CREATE ... AS|IS` opens a procedural block.
    fn create_opens_block(&self) -> bool {
        false
    }

    /// Returns the SQL spelling of a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// Returns whether `word` must be quoted to be used as an identifier.
    fn is_reserved_word(&self, word: &str) -> bool {
        is_reserved_sql_word(word)
    }

    /// Quotes an identifier unconditionally, doubling embedded quote characters.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Returns true if `name` is already a delimited identifier in this dialect.
    fn is_quoted_identifier(&self, name: &str) -> bool {
        let mut delimiters = vec![('"', '"'), (self.identifier_quote(), self.identifier_quote())];
        if self.backtick_identifiers() {
            delimiters.push(('`', '`'));
        }
        delimiters.iter().any(|&(open, close)| {
            name.len() >= 2 && name.starts_with(open) && name.ends_with(close)
        })
    }
}

/// The SQL flavours understood by the parser and renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// ANSI SQL.
    #[default]
    Standard,
    /// SQLite.
    Sqlite,
    /// MySQL / MariaDB.
    Mysql,
    /// Oracle.
    Oracle,
    /// PostgreSQL.
    Postgresql,
}

static GENERIC: GenericDialect = GenericDialect::new();
static SQLITE: SqliteDialect = SqliteDialect::new();
static MYSQL: MysqlDialect = MysqlDialect::new();
static ORACLE: OracleDialect = OracleDialect::new();
static POSTGRES: PostgresDialect = PostgresDialect::new();

impl DialectKind {
    /// All dialects, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Standard,
        Self::Sqlite,
        Self::Mysql,
        Self::Oracle,
        Self::Postgresql,
    ];

    /// Returns the rules for this dialect.
    #[must_use]
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Standard => &GENERIC,
            Self::Sqlite => &SQLITE,
            Self::Mysql => &MYSQL,
            Self::Oracle => &ORACLE,
            Self::Postgresql => &POSTGRES,
        }
    }

    /// Returns the lower case name of the dialect.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Postgresql => "postgresql",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "generic" | "ansi" => Ok(Self::Standard),
            "sqlite" => Ok(Self::Sqlite),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "oracle" => Ok(Self::Oracle),
            "postgresql" | "postgres" | "pg" => Ok(Self::Postgresql),
            other => Err(format!("unknown SQL dialect '{other}'")),
        }
    }
}
