//! Structural checks.
//!
//! The parser runs [`check_structure`] on every statement it builds; call it
//! again after editing an AST by hand. The first violation found is returned
//! as [`SqlError::Structure`].

use crate::ast::{
    for_each_expr, CompoundStatement, Expr, InsertSource, JoinCondition, JoinType, SelectQuery,
    SelectStatement, Statement, StatementBody, TableSource,
};
use crate::error::{Result, SqlError};

fn violation(message: impl Into<String>) -> SqlError {
    SqlError::Structure(message.into())
}

/// Checks the whole statement tree.
///
/// # Errors
///
/// Returns [`SqlError::Structure`] describing the first rule broken.
pub fn check_structure(body: &StatementBody) -> Result<()> {
    match body {
        StatementBody::Select(select) => check_select(select)?,
        StatementBody::Compound(compound) => check_compound(compound)?,
        StatementBody::Insert(insert) => match &insert.source {
            InsertSource::Values(rows) => {
                let width = if insert.columns.is_empty() {
                    rows.first().map_or(0, Vec::len)
                } else {
                    insert.columns.len()
                };
                for (n, row) in rows.iter().enumerate() {
                    if row.is_empty() || row.len() != width {
                        return Err(violation(format!(
                            "VALUES row {} has {} values, expected {width}",
                            n + 1,
                            row.len()
                        )));
                    }
                }
            }
            InsertSource::Select(query) => {
                check_query(query)?;
                if let Some(count) = query.column_count() {
                    if !insert.columns.is_empty() && count != insert.columns.len() {
                        return Err(violation(format!(
                            "INSERT lists {} columns but the query returns {count}",
                            insert.columns.len()
                        )));
                    }
                }
            }
            InsertSource::DefaultValues => {}
        },
        StatementBody::Update(update) => {
            if update.assignments.is_empty() {
                return Err(violation("UPDATE without assignments"));
            }
        }
        StatementBody::Delete(_) | StatementBody::Transaction(_) | StatementBody::Unknown(_) => {}
    }

    let mut result = Ok(());
    for_each_expr(body, &mut |expr| {
        if result.is_ok() {
            result = check_expr(expr);
        }
    });
    result
}

/// Checks a compound: at least two well-formed branches, all with the same
/// column count. Branches whose count a wildcard hides are not compared.
///
/// # Errors
///
/// Returns [`SqlError::Structure`] describing the first rule broken.
pub fn check_compound(compound: &CompoundStatement) -> Result<()> {
    if compound.branches.len() < 2 {
        return Err(violation(format!(
            "{} needs at least two branches, found {}",
            compound.op.as_str(),
            compound.branches.len()
        )));
    }

    let mut expected = None;
    for branch in &compound.branches {
        check_query(branch)?;
        let Some(count) = branch.column_count() else {
            continue;
        };
        match expected {
            None => expected = Some(count),
            Some(first) if first != count => {
                return Err(violation(format!(
                    "{} branches return {first} and {count} columns",
                    compound.op.as_str()
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn check_query(query: &SelectQuery) -> Result<()> {
    match query {
        SelectQuery::Select(select) => check_select(select),
        SelectQuery::Compound(compound) => check_compound(compound),
    }
}

fn check_select(select: &SelectStatement) -> Result<()> {
    if select.columns.is_empty() {
        return Err(violation("SELECT without fields"));
    }
    let Some(from) = &select.from else {
        return Ok(());
    };
    if from.targets.is_empty() {
        return Err(violation("FROM without targets"));
    }
    for target in &from.targets {
        if let TableSource::Subquery(query) = &target.source {
            check_query(query)?;
        }
    }
    for join in &from.joins {
        if join.position == 0 || join.position >= from.targets.len() {
            return Err(violation(format!(
                "join refers to target {} of {}",
                join.position,
                from.targets.len()
            )));
        }
        if matches!(join.join_type, JoinType::Cross | JoinType::Natural)
            && join.condition != JoinCondition::None
        {
            return Err(violation(format!(
                "{} cannot have a join condition",
                join.join_type.as_sql()
            )));
        }
    }
    Ok(())
}

fn check_expr(expr: &Expr) -> Result<()> {
    match expr {
        Expr::Operation(operation) if !operation.op.accepts_operands(operation.operands.len()) => {
            Err(violation(format!(
                "operator {} cannot take {} operands",
                operation.op,
                operation.operands.len()
            )))
        }
        Expr::Case(case) if case.when_then.is_empty() => Err(violation("CASE without WHEN")),
        Expr::Select(query) => check_query(query),
        _ => Ok(()),
    }
}

impl Statement {
    /// Checks the statement tree; see [`check_structure`].
    ///
    /// # Errors
    ///
    /// Returns [`SqlError::Structure`] describing the first rule broken.
    pub fn check_structure(&self) -> Result<()> {
        check_structure(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        CaseExpr, CompoundOp, FromClause, Identifier, InsertStatement, Join, Operator,
        SelectColumn, SelectTarget, UpdateStatement,
    };

    fn select_of(n: usize) -> SelectQuery {
        SelectStatement {
            columns: (0..n)
                .map(|i| SelectColumn::new(Expr::column(format!("c{i}"))))
                .collect(),
            ..SelectStatement::default()
        }
        .into()
    }

    fn wildcard() -> SelectQuery {
        SelectStatement {
            columns: vec![SelectColumn::new(Expr::Wildcard { table: None })],
            ..SelectStatement::default()
        }
        .into()
    }

    #[test]
    fn test_compound_column_counts() {
        let ok = CompoundStatement::new(CompoundOp::Union, vec![select_of(2), select_of(2)]);
        assert!(check_compound(&ok).is_ok());

        let bad = CompoundStatement::new(CompoundOp::Union, vec![select_of(2), select_of(3)]);
        assert!(matches!(check_compound(&bad), Err(SqlError::Structure(_))));

        let nested = CompoundStatement::new(
            CompoundOp::Except,
            vec![SelectQuery::Compound(ok), select_of(1)],
        );
        assert!(check_compound(&nested).is_err());
    }

    #[test]
    fn test_compound_needs_two_branches() {
        let single = CompoundStatement::new(CompoundOp::Union, vec![select_of(1)]);
        assert!(check_compound(&single).is_err());
        assert!(check_structure(&StatementBody::from_query(single.reduce())).is_ok());
    }

    #[test]
    fn test_wildcard_branch_skipped() {
        let compound = CompoundStatement::new(
            CompoundOp::UnionAll,
            vec![select_of(2), wildcard(), select_of(2)],
        );
        assert!(check_compound(&compound).is_ok());
    }

    #[test]
    fn test_operand_counts() {
        let body = StatementBody::Select(SelectStatement {
            columns: vec![SelectColumn::new(Expr::operation(
                Operator::Between,
                vec![Expr::integer(1), Expr::integer(2)],
            ))],
            ..SelectStatement::default()
        });
        assert!(check_structure(&body).is_err());
    }

    #[test]
    fn test_case_needs_when() {
        let body = StatementBody::Select(SelectStatement {
            columns: vec![SelectColumn::new(Expr::Case(CaseExpr {
                base: None,
                when_then: vec![],
                else_expr: Some(Box::new(Expr::integer(1))),
            }))],
            ..SelectStatement::default()
        });
        assert!(check_structure(&body).is_err());
    }

    #[test]
    fn test_join_rules() {
        let mut select = SelectStatement {
            columns: vec![SelectColumn::new(Expr::Wildcard { table: None })],
            from: Some(FromClause {
                targets: vec![SelectTarget::table("a"), SelectTarget::table("b")],
                joins: vec![Join {
                    join_type: JoinType::Cross,
                    position: 1,
                    condition: JoinCondition::None,
                }],
            }),
            ..SelectStatement::default()
        };
        assert!(check_select(&select).is_ok());

        if let Some(from) = &mut select.from {
            from.joins[0].condition = JoinCondition::On(Expr::integer(1));
        }
        assert!(check_select(&select).is_err());

        if let Some(from) = &mut select.from {
            from.joins[0].join_type = JoinType::Inner;
            from.joins[0].position = 2;
        }
        assert!(check_select(&select).is_err());
    }

    #[test]
    fn test_insert_row_width() {
        let insert = InsertStatement {
            table: Identifier::new("t"),
            columns: vec![String::from("a"), String::from("b")],
            source: InsertSource::Values(vec![vec![Expr::integer(1)]]),
            on_conflict: None,
        };
        assert!(check_structure(&StatementBody::Insert(insert)).is_err());
    }

    #[test]
    fn test_update_needs_assignment() {
        let update = UpdateStatement {
            table: Identifier::new("t"),
            on_conflict: None,
            assignments: vec![],
            where_clause: None,
        };
        assert!(check_structure(&StatementBody::Update(update)).is_err());
    }
}
