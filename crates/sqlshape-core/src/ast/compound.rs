//! Set operations over SELECTs.

use super::expression::Expr;
use super::statement::{OrderBy, SelectStatement};

/// A query: a plain SELECT or a compound of queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectQuery {
    /// SELECT ...
    Select(Box<SelectStatement>),
    /// UNION / INTERSECT / EXCEPT.
    Compound(CompoundStatement),
}

impl SelectQuery {
    /// Returns true if the query carries its own ORDER BY, LIMIT or OFFSET.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        match self {
            Self::Select(select) => {
                !select.order_by.is_empty() || select.limit.is_some() || select.offset.is_some()
            }
            Self::Compound(compound) => compound.is_bounded(),
        }
    }

    /// Returns the number of result columns, or `None` when a wildcard hides it.
    ///
    /// For a compound this is the count of its first determinate branch.
    #[must_use]
    pub fn column_count(&self) -> Option<usize> {
        match self {
            Self::Select(select) => select.column_count(),
            Self::Compound(compound) => compound
                .branches
                .iter()
                .find_map(Self::column_count),
        }
    }
}

impl From<SelectStatement> for SelectQuery {
    fn from(select: SelectStatement) -> Self {
        Self::Select(Box::new(select))
    }
}

/// Set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    /// UNION
    Union,
    /// UNION ALL
    UnionAll,
    /// INTERSECT
    Intersect,
    /// INTERSECT ALL
    IntersectAll,
    /// EXCEPT
    Except,
    /// EXCEPT ALL
    ExceptAll,
}

impl CompoundOp {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT ALL",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT ALL",
        }
    }

    /// Returns the name used by the serializer.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION_ALL",
            Self::Intersect => "INTERSECT",
            Self::IntersectAll => "INTERSECT_ALL",
            Self::Except => "EXCEPT",
            Self::ExceptAll => "EXCEPT_ALL",
        }
    }
}

/// An operator applied to two or more queries.
///
/// ORDER BY, LIMIT and OFFSET written after the last branch apply to the
/// whole compound and live here, not on that branch.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundStatement {
    /// The set operator.
    pub op: CompoundOp,
    /// Branches, in source order.
    pub branches: Vec<SelectQuery>,
    /// ORDER BY over the combined rows.
    pub order_by: Vec<OrderBy>,
    /// LIMIT over the combined rows.
    pub limit: Option<Expr>,
    /// OFFSET over the combined rows.
    pub offset: Option<Expr>,
}

impl CompoundStatement {
    /// Creates a compound.
    #[must_use]
    pub const fn new(op: CompoundOp, branches: Vec<SelectQuery>) -> Self {
        Self {
            op,
            branches,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Returns true if ORDER BY, LIMIT or OFFSET applies to the whole compound.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !self.order_by.is_empty() || self.limit.is_some() || self.offset.is_some()
    }

    /// Reduces a single-branch compound to its branch; anything else is kept.
    #[must_use]
    pub fn reduce(mut self) -> SelectQuery {
        if self.branches.len() == 1 && !self.is_bounded() {
            if let Some(only) = self.branches.pop() {
                return only;
            }
        }
        SelectQuery::Compound(self)
    }
}
