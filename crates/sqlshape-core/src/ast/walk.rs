//! Tree traversal.
//!
//! Nodes store no parent pointers; [`parent_of`] finds a parent by walking
//! down from the statement root, and [`map_exprs`] rebuilds a tree bottom-up.

use core::ptr;

use super::compound::{CompoundStatement, SelectQuery};
use super::expression::{CaseExpr, Expr, Operation};
use super::statement::{
    FromClause, InsertSource, JoinCondition, OrderBy, SelectStatement, StatementBody,
    TableSource,
};

fn compound_roots<'a>(compound: &'a CompoundStatement, out: &mut Vec<&'a Expr>) {
    for branch in &compound.branches {
        out.extend(branch.root_exprs());
    }
    out.extend(compound.order_by.iter().map(|o| &o.expr));
    out.extend(compound.limit.as_ref());
    out.extend(compound.offset.as_ref());
}

fn select_roots<'a>(select: &'a SelectStatement, out: &mut Vec<&'a Expr>) {
    out.extend(select.distinct_on.as_ref());
    out.extend(select.columns.iter().map(|c| &c.expr));
    if let Some(from) = &select.from {
        for target in &from.targets {
            if let TableSource::Subquery(query) = &target.source {
                out.extend(query.root_exprs());
            }
        }
        for join in &from.joins {
            if let JoinCondition::On(cond) = &join.condition {
                out.push(cond);
            }
        }
    }
    out.extend(select.where_clause.as_ref());
    out.extend(select.group_by.iter());
    out.extend(select.having.as_ref());
    out.extend(select.order_by.iter().map(|o| &o.expr));
    out.extend(select.limit.as_ref());
    out.extend(select.offset.as_ref());
}

impl SelectQuery {
    /// Returns the top-level expressions of the query, in source order.
    #[must_use]
    pub fn root_exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        match self {
            Self::Select(select) => select_roots(select, &mut out),
            Self::Compound(compound) => compound_roots(compound, &mut out),
        }
        out
    }
}

impl StatementBody {
    /// Returns the top-level expressions of the statement, in source order.
    #[must_use]
    pub fn root_exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        match self {
            Self::Select(select) => select_roots(select, &mut out),
            Self::Insert(insert) => match &insert.source {
                InsertSource::Values(rows) => out.extend(rows.iter().flatten()),
                InsertSource::Select(query) => out.extend(query.root_exprs()),
                InsertSource::DefaultValues => {}
            },
            Self::Update(update) => {
                out.extend(update.assignments.iter().map(|a| &a.value));
                out.extend(update.where_clause.as_ref());
            }
            Self::Delete(delete) => out.extend(delete.where_clause.as_ref()),
            Self::Compound(compound) => compound_roots(compound, &mut out),
            Self::Transaction(_) | Self::Unknown(_) => {}
        }
        out
    }
}

fn visit<'a, F: FnMut(&'a Expr)>(expr: &'a Expr, f: &mut F) {
    f(expr);
    for child in expr.children() {
        visit(child, f);
    }
}

/// Calls `f` on every expression of `body`, parents before children, in source order.
pub fn for_each_expr<'a, F: FnMut(&'a Expr)>(body: &'a StatementBody, f: &mut F) {
    for root in body.root_exprs() {
        visit(root, f);
    }
}

/// Returns the expression directly containing `node`, compared by address.
///
/// Top-level expressions (a WHERE condition, a SELECT field) have no parent.
#[must_use]
pub fn parent_of<'a>(body: &'a StatementBody, node: &Expr) -> Option<&'a Expr> {
    let mut parent = None;
    for_each_expr(body, &mut |expr: &'a Expr| {
        if parent.is_none() && expr.children().into_iter().any(|c| ptr::eq(c, node)) {
            parent = Some(expr);
        }
    });
    parent
}

/// Rebuilds `body`, passing every expression through `f` after its children.
#[must_use]
pub fn map_exprs<F: FnMut(Expr) -> Expr>(body: StatementBody, f: &mut F) -> StatementBody {
    match body {
        StatementBody::Select(select) => StatementBody::Select(map_select(select, f)),
        StatementBody::Insert(mut insert) => {
            insert.source = match insert.source {
                InsertSource::Values(rows) => InsertSource::Values(
                    rows.into_iter()
                        .map(|row| row.into_iter().map(|e| map_expr(e, f)).collect())
                        .collect(),
                ),
                InsertSource::Select(query) => InsertSource::Select(Box::new(map_query(*query, f))),
                InsertSource::DefaultValues => InsertSource::DefaultValues,
            };
            StatementBody::Insert(insert)
        }
        StatementBody::Update(mut update) => {
            for assignment in &mut update.assignments {
                let value = core::mem::replace(&mut assignment.value, Expr::null());
                assignment.value = map_expr(value, f);
            }
            update.where_clause = update.where_clause.map(|e| map_expr(e, f));
            StatementBody::Update(update)
        }
        StatementBody::Delete(mut delete) => {
            delete.where_clause = delete.where_clause.map(|e| map_expr(e, f));
            StatementBody::Delete(delete)
        }
        StatementBody::Compound(compound) => StatementBody::Compound(map_compound(compound, f)),
        other @ (StatementBody::Transaction(_) | StatementBody::Unknown(_)) => other,
    }
}

fn map_compound<F: FnMut(Expr) -> Expr>(
    compound: CompoundStatement,
    f: &mut F,
) -> CompoundStatement {
    CompoundStatement {
        op: compound.op,
        branches: compound
            .branches
            .into_iter()
            .map(|b| map_query(b, f))
            .collect(),
        order_by: map_order_by(compound.order_by, f),
        limit: compound.limit.map(|e| map_expr(e, f)),
        offset: compound.offset.map(|e| map_expr(e, f)),
    }
}

fn map_order_by<F: FnMut(Expr) -> Expr>(order_by: Vec<OrderBy>, f: &mut F) -> Vec<OrderBy> {
    order_by
        .into_iter()
        .map(|o| OrderBy {
            expr: map_expr(o.expr, f),
            ..o
        })
        .collect()
}

fn map_query<F: FnMut(Expr) -> Expr>(query: SelectQuery, f: &mut F) -> SelectQuery {
    match query {
        SelectQuery::Select(select) => SelectQuery::Select(Box::new(map_select(*select, f))),
        SelectQuery::Compound(compound) => SelectQuery::Compound(map_compound(compound, f)),
    }
}

fn map_select<F: FnMut(Expr) -> Expr>(select: SelectStatement, f: &mut F) -> SelectStatement {
    let SelectStatement {
        distinct,
        distinct_on,
        columns,
        from,
        where_clause,
        group_by,
        having,
        order_by,
        limit,
        offset,
    } = select;

    let distinct_on = distinct_on.map(|e| map_expr(e, f));
    let columns = columns
        .into_iter()
        .map(|mut c| {
            c.expr = map_expr(c.expr, f);
            c
        })
        .collect();
    let from = from.map(|from| FromClause {
        targets: from
            .targets
            .into_iter()
            .map(|mut t| {
                if let TableSource::Subquery(query) = t.source {
                    t.source = TableSource::Subquery(Box::new(map_query(*query, f)));
                }
                t
            })
            .collect(),
        joins: from
            .joins
            .into_iter()
            .map(|mut j| {
                if let JoinCondition::On(cond) = j.condition {
                    j.condition = JoinCondition::On(map_expr(cond, f));
                }
                j
            })
            .collect(),
    });

    SelectStatement {
        distinct,
        distinct_on,
        columns,
        from,
        where_clause: where_clause.map(|e| map_expr(e, f)),
        group_by: group_by.into_iter().map(|e| map_expr(e, f)).collect(),
        having: having.map(|e| map_expr(e, f)),
        order_by: map_order_by(order_by, f),
        limit: limit.map(|e| map_expr(e, f)),
        offset: offset.map(|e| map_expr(e, f)),
    }
}

fn map_expr<F: FnMut(Expr) -> Expr>(expr: Expr, f: &mut F) -> Expr {
    let rebuilt = match expr {
        Expr::Function(mut call) => {
            call.args = call.args.into_iter().map(|a| map_expr(a, f)).collect();
            Expr::Function(call)
        }
        Expr::Operation(Operation { op, operands }) => Expr::Operation(Operation {
            op,
            operands: operands.into_iter().map(|o| map_expr(o, f)).collect(),
        }),
        Expr::Select(query) => Expr::Select(Box::new(map_query(*query, f))),
        Expr::Case(CaseExpr {
            base,
            when_then,
            else_expr,
        }) => Expr::Case(CaseExpr {
            base: base.map(|b| Box::new(map_expr(*b, f))),
            when_then: when_then
                .into_iter()
                .map(|(w, t)| (map_expr(w, f), map_expr(t, f)))
                .collect(),
            else_expr: else_expr.map(|e| Box::new(map_expr(*e, f))),
        }),
        Expr::Cast { expr, data_type } => Expr::Cast {
            expr: Box::new(map_expr(*expr, f)),
            data_type,
        },
        leaf => leaf,
    };
    f(rebuilt)
}
