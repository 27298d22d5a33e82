//! SQL statement AST types.

use super::compound::{CompoundStatement, SelectQuery};
use super::expression::{Expr, Identifier};
use super::transaction::TransactionStatement;
use super::unknown::UnknownStatement;
use crate::params::ParamSet;

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An ORDER BY clause entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    /// The expression to order by.
    pub expr: Expr,
    /// The direction (ASC or DESC).
    pub direction: OrderDirection,
    /// COLLATE name.
    pub collation: Option<String>,
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// CROSS JOIN, or a comma between FROM targets.
    Cross,
    /// NATURAL JOIN.
    Natural,
    /// INNER JOIN.
    Inner,
    /// LEFT OUTER JOIN.
    Left,
    /// RIGHT OUTER JOIN.
    Right,
    /// FULL OUTER JOIN.
    Full,
}

impl JoinType {
    /// Returns the name used by the serializer.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cross => "CROSS",
            Self::Natural => "NATURAL",
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Full => "FULL",
        }
    }

    /// Returns the SQL keywords introducing the join.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// How the rows of a join are matched.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    /// No condition (CROSS and NATURAL joins).
    None,
    /// `ON expr`.
    On(Expr),
    /// `USING (col, ...)`.
    Using(Vec<String>),
}

/// A join between the targets before `position` and the target at `position`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// The type of join.
    pub join_type: JoinType,
    /// Index of the joined target in [`FromClause::targets`].
    pub position: usize,
    /// The join condition.
    pub condition: JoinCondition,
}

/// Where a FROM target reads its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    /// A table or view, possibly schema-qualified.
    Table(Identifier),
    /// A sub-select.
    Subquery(Box<SelectQuery>),
}

/// A FROM target with its alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectTarget {
    /// The rows.
    pub source: TableSource,
    /// Alias.
    pub alias: Option<String>,
}

impl SelectTarget {
    /// Creates an unaliased table target.
    #[must_use]
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            source: TableSource::Table(Identifier::new(name)),
            alias: None,
        }
    }
}

/// The FROM clause: targets in source order, and the joins linking them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FromClause {
    /// Tables and sub-selects.
    pub targets: Vec<SelectTarget>,
    /// One entry per target after the first.
    pub joins: Vec<Join>,
}

/// A SELECT statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStatement {
    /// Whether to select DISTINCT values.
    pub distinct: bool,
    /// `DISTINCT ON (expr)`.
    pub distinct_on: Option<Expr>,
    /// The columns to select.
    pub columns: Vec<SelectColumn>,
    /// The FROM clause.
    pub from: Option<FromClause>,
    /// The WHERE clause.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING clause.
    pub having: Option<Expr>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Expr>,
    /// OFFSET clause.
    pub offset: Option<Expr>,
}

impl SelectStatement {
    /// Returns the number of result columns, or `None` when a wildcard makes it
    /// depend on the schema.
    #[must_use]
    pub fn column_count(&self) -> Option<usize> {
        if self
            .columns
            .iter()
            .any(|c| matches!(c.expr, Expr::Wildcard { .. }))
        {
            None
        } else {
            Some(self.columns.len())
        }
    }
}

/// A column in SELECT clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    /// The expression.
    pub expr: Expr,
    /// Column alias.
    pub alias: Option<String>,
}

impl SelectColumn {
    /// Creates a new select column.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates a select column with an alias.
    #[must_use]
    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// An INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table.
    pub table: Identifier,
    /// Column names; empty when omitted.
    pub columns: Vec<String>,
    /// Rows to insert.
    pub source: InsertSource,
    /// `OR <action>` conflict clause, or `REPLACE` for `REPLACE INTO`.
    pub on_conflict: Option<String>,
}

/// Source of data for INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// VALUES (...), (...), ...
    Values(Vec<Vec<Expr>>),
    /// SELECT ... or a compound.
    Select(Box<SelectQuery>),
    /// DEFAULT VALUES
    DefaultValues,
}

/// An UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table.
    pub table: Identifier,
    /// `OR <action>` conflict clause.
    pub on_conflict: Option<String>,
    /// SET assignments.
    pub assignments: Vec<UpdateAssignment>,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// An assignment in UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAssignment {
    /// Column name.
    pub column: String,
    /// Value expression.
    pub value: Expr,
}

/// A DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table.
    pub table: Identifier,
    /// WHERE clause.
    pub where_clause: Option<Expr>,
}

/// The typed body of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementBody {
    /// SELECT statement.
    Select(SelectStatement),
    /// INSERT statement.
    Insert(InsertStatement),
    /// UPDATE statement.
    Update(UpdateStatement),
    /// DELETE statement.
    Delete(DeleteStatement),
    /// UNION / INTERSECT / EXCEPT.
    Compound(CompoundStatement),
    /// Transaction control.
    Transaction(TransactionStatement),
    /// Anything else, kept as text.
    Unknown(UnknownStatement),
}

impl StatementBody {
    /// Wraps a query, unwrapping plain SELECTs.
    #[must_use]
    pub fn from_query(query: SelectQuery) -> Self {
        match query {
            SelectQuery::Select(select) => Self::Select(*select),
            SelectQuery::Compound(compound) => Self::Compound(compound),
        }
    }
}

/// A parsed statement: its text, typed body and parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// The statement text, without its terminator.
    pub sql: String,
    /// The typed body.
    pub body: StatementBody,
    /// Parameters found in the text.
    pub params: ParamSet,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(sql: impl Into<String>, body: StatementBody, params: ParamSet) -> Self {
        Self {
            sql: sql.into(),
            body,
            params,
        }
    }

    /// Returns the statement type name (`SELECT`, `INSERT`, `ROLLBACK_SAVEPOINT`, ...).
    #[must_use]
    pub const fn stmt_type(&self) -> &'static str {
        match &self.body {
            StatementBody::Select(_) => "SELECT",
            StatementBody::Insert(_) => "INSERT",
            StatementBody::Update(_) => "UPDATE",
            StatementBody::Delete(_) => "DELETE",
            StatementBody::Compound(_) => "COMPOUND",
            StatementBody::Transaction(t) => t.kind.as_str(),
            StatementBody::Unknown(_) => "UNKNOWN",
        }
    }

    /// Returns the parameter table.
    #[must_use]
    pub const fn parameters(&self) -> &ParamSet {
        &self.params
    }
}

/// Statements parsed from one script, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// The statements.
    pub statements: Vec<Statement>,
}

impl Batch {
    /// Returns the number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the batch holds no statement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates over the statements.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }
}
