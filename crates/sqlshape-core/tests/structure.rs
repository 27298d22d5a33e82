//! Tests for structural checks on hand-edited trees and for the tree walkers.

mod common;
use common::*;

use sqlshape_core::ast::{
    for_each_expr, map_exprs, parent_of, CaseExpr, Expr, Join, JoinCondition, JoinType, Operator,
    SelectColumn, SelectQuery, SelectTarget, StatementBody,
};
use sqlshape_core::{check_structure, SqlError};

fn assert_violation(body: &StatementBody, fragment: &str) {
    match check_structure(body) {
        Err(SqlError::Structure(message)) => {
            assert!(message.contains(fragment), "{message:?} lacks {fragment:?}");
        }
        other => panic!("Expected a structure violation, got {other:?}"),
    }
}

#[test]
fn parsed_statements_pass() {
    for sql in [
        "SELECT a FROM t JOIN u ON t.id = u.id CROSS JOIN v",
        "INSERT INTO t (a, b) VALUES (1, 2), (3, 4)",
        "UPDATE t SET a = CASE WHEN b THEN 1 END",
        "SELECT a FROM t UNION SELECT b FROM u",
        "DELETE FROM t WHERE a BETWEEN 1 AND 2",
    ] {
        assert!(parse(sql).check_structure().is_ok(), "{sql}");
    }
}

#[test]
fn operand_count_after_edit() {
    let mut select = parse_select("SELECT a FROM t WHERE a = 1");
    if let Some(Expr::Operation(eq)) = &mut select.where_clause {
        eq.operands.push(Expr::integer(2));
    }
    assert_violation(
        &StatementBody::Select(select),
        "operator = cannot take 3 operands",
    );

    let lone_and = Expr::operation(Operator::And, vec![Expr::column("a")]);
    let mut select = parse_select("SELECT 1");
    select.having = Some(lone_and);
    assert_violation(&StatementBody::Select(select), "cannot take 1 operands");
}

#[test]
fn case_without_when() {
    let mut select = parse_select("SELECT 1 FROM t");
    select.columns[0] = SelectColumn::new(Expr::Case(CaseExpr {
        base: None,
        when_then: vec![],
        else_expr: Some(Box::new(Expr::integer(0))),
    }));
    assert_violation(&StatementBody::Select(select), "CASE without WHEN");
}

#[test]
fn violation_inside_a_subquery() {
    let mut select = parse_select("SELECT a FROM t WHERE a IN (SELECT b FROM u)");
    let Some(Expr::Operation(in_list)) = &mut select.where_clause else {
        panic!("Expected IN");
    };
    let Expr::Select(query) = &mut in_list.operands[1] else {
        panic!("Expected a sub-select");
    };
    let SelectQuery::Select(inner) = query.as_mut() else {
        panic!("Expected a plain select");
    };
    inner.columns.clear();
    assert_violation(&StatementBody::Select(select), "SELECT without fields");
}

#[test]
fn join_rules() {
    let mut select = parse_select("SELECT * FROM a JOIN b ON a.id = b.id");
    if let Some(from) = &mut select.from {
        from.joins[0].position = 2;
    }
    assert_violation(&StatementBody::Select(select), "join refers to target 2 of 2");

    let mut select = parse_select("SELECT * FROM a, b");
    if let Some(from) = &mut select.from {
        from.joins[0].condition = JoinCondition::On(Expr::column("x"));
    }
    assert_violation(&StatementBody::Select(select), "CROSS JOIN cannot have");

    let mut select = parse_select("SELECT * FROM a");
    if let Some(from) = &mut select.from {
        from.targets.push(SelectTarget::table("b"));
        from.joins.push(Join {
            join_type: JoinType::Left,
            position: 1,
            condition: JoinCondition::Using(vec![String::from("id")]),
        });
    }
    assert!(check_structure(&StatementBody::Select(select)).is_ok());
}

#[test]
fn dml_rules() {
    let mut update = parse_update("UPDATE t SET a = 1");
    update.assignments.clear();
    assert_violation(&StatementBody::Update(update), "UPDATE without assignments");

    let mut insert = parse_insert("INSERT INTO t (a, b) VALUES (1, 2)");
    insert.columns.pop();
    assert_violation(
        &StatementBody::Insert(insert),
        "VALUES row 1 has 2 values, expected 1",
    );
}

#[test]
fn compound_branch_edit() {
    let mut compound = parse_compound("SELECT a, b FROM t UNION SELECT c, d FROM u");
    if let SelectQuery::Select(second) = &mut compound.branches[1] {
        second.columns.pop();
    }
    assert_violation(&StatementBody::Compound(compound), "return 2 and 1 columns");
}

#[test]
fn walker_visits_parents_first() {
    let stmt = parse("SELECT a + 1 FROM t WHERE b = 2 AND c IS NULL");
    let mut seen = vec![];
    for_each_expr(&stmt.body, &mut |expr| {
        if let Expr::Operation(operation) = expr {
            seen.push(operation.op);
        }
    });
    assert_eq!(
        seen,
        vec![Operator::Plus, Operator::And, Operator::Eq, Operator::IsNull]
    );
}

#[test]
fn parent_lookup() {
    let stmt = parse("SELECT a FROM t WHERE b = ##p::int AND c = 1");
    let mut param = None;
    for_each_expr(&stmt.body, &mut |expr| {
        if expr.as_param().is_some() {
            param = Some(expr);
        }
    });
    let param = param.unwrap();

    let Some(Expr::Operation(eq)) = parent_of(&stmt.body, param) else {
        panic!("Expected the comparison as parent");
    };
    assert_eq!(eq.op, Operator::Eq);

    let StatementBody::Select(select) = &stmt.body else {
        panic!("Expected SELECT");
    };
    assert!(parent_of(&stmt.body, select.where_clause.as_ref().unwrap()).is_none());
}

#[test]
fn map_rebuilds_children_first() {
    let stmt = parse("SELECT * FROM t WHERE a = 1 OR b = 2");
    let body = map_exprs(stmt.body, &mut |expr| match expr {
        Expr::Operation(operation) if operation.op == Operator::Eq => {
            Expr::operation(Operator::Diff, operation.operands)
        }
        other => other,
    });
    assert!(check_structure(&body).is_ok());
    let StatementBody::Select(select) = body else {
        panic!("Expected SELECT");
    };
    let Some(Expr::Operation(or)) = select.where_clause else {
        panic!("Expected OR");
    };
    assert!(or
        .operands
        .iter()
        .all(|e| matches!(e, Expr::Operation(o) if o.op == Operator::Diff)));
}
