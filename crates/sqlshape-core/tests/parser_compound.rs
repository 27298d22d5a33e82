//! Tests for UNION / INTERSECT / EXCEPT and their structural checks.

mod common;
use common::*;

use sqlshape_core::ast::{
    CompoundOp, CompoundStatement, SelectColumn, SelectQuery, SelectStatement, StatementBody,
};
use sqlshape_core::{check_compound, check_structure, Expr, SqlError};

fn select_of(columns: &[&str]) -> SelectQuery {
    SelectQuery::from(SelectStatement {
        columns: columns
            .iter()
            .map(|c| SelectColumn::new(Expr::column(*c)))
            .collect(),
        ..SelectStatement::default()
    })
}

#[test]
fn union_of_two_selects() {
    let stmt = parse("SELECT a FROM t UNION SELECT a FROM t2");
    assert_eq!(stmt.stmt_type(), "COMPOUND");
    let StatementBody::Compound(compound) = &stmt.body else {
        panic!("Expected COMPOUND");
    };
    assert_eq!(compound.op, CompoundOp::Union);
    assert_eq!(compound.branches.len(), 2);
    assert!(compound
        .branches
        .iter()
        .all(|b| matches!(b, SelectQuery::Select(_))));
    assert!(check_structure(&stmt.body).is_ok());
    assert!(stmt.check_structure().is_ok());
}

#[test]
fn compound_operators() {
    for (sql, op) in [
        ("SELECT a FROM t UNION ALL SELECT a FROM u", CompoundOp::UnionAll),
        ("SELECT a FROM t UNION DISTINCT SELECT a FROM u", CompoundOp::Union),
        ("SELECT a FROM t INTERSECT SELECT a FROM u", CompoundOp::Intersect),
        ("SELECT a FROM t INTERSECT ALL SELECT a FROM u", CompoundOp::IntersectAll),
        ("SELECT a FROM t EXCEPT SELECT a FROM u", CompoundOp::Except),
        ("SELECT a FROM t EXCEPT ALL SELECT a FROM u", CompoundOp::ExceptAll),
    ] {
        assert_eq!(parse_compound(sql).op, op, "{sql}");
    }
    round_trip("SELECT a FROM t INTERSECT ALL SELECT a FROM u");
}

#[test]
fn same_operator_chain_is_flat() {
    let compound = parse_compound("SELECT 1 UNION SELECT 2 UNION SELECT 3");
    assert_eq!(compound.branches.len(), 3);
    assert_eq!(
        round_trip("SELECT 1 UNION SELECT 2 UNION SELECT 3"),
        "SELECT 1 UNION SELECT 2 UNION SELECT 3"
    );
}

#[test]
fn operator_change_nests_left() {
    let compound = parse_compound("SELECT 1 UNION SELECT 2 EXCEPT SELECT 3");
    assert_eq!(compound.op, CompoundOp::Except);
    assert_eq!(compound.branches.len(), 2);
    let SelectQuery::Compound(inner) = &compound.branches[0] else {
        panic!("Expected a nested compound");
    };
    assert_eq!(inner.op, CompoundOp::Union);
    assert_eq!(inner.branches.len(), 2);
    assert_eq!(
        round_trip("SELECT 1 UNION SELECT 2 EXCEPT SELECT 3"),
        "(SELECT 1 UNION SELECT 2) EXCEPT SELECT 3"
    );
}

#[test]
fn parenthesised_right_operand() {
    let compound = parse_compound("SELECT 1 UNION (SELECT 2 INTERSECT SELECT 3)");
    assert_eq!(compound.op, CompoundOp::Union);
    assert!(matches!(&compound.branches[1], SelectQuery::Compound(c) if c.op == CompoundOp::Intersect));
    round_trip("SELECT 1 UNION (SELECT 2 INTERSECT SELECT 3)");
}

#[test]
fn parenthesised_lone_select_reduces() {
    let stmt = parse("(SELECT a FROM t)");
    assert_eq!(stmt.stmt_type(), "SELECT");
    assert_eq!(stmt.body, parse("SELECT a FROM t").body);
}

#[test]
fn branch_with_limit_keeps_parentheses() {
    assert_eq!(
        round_trip("(SELECT a FROM t LIMIT 1) UNION SELECT a FROM u"),
        "(SELECT a FROM t LIMIT 1) UNION SELECT a FROM u"
    );
}

#[test]
fn trailing_order_and_limit_belong_to_the_compound() {
    let sql = "SELECT a FROM t UNION SELECT a FROM u ORDER BY a DESC LIMIT 3 OFFSET 1";
    let compound = parse_compound(sql);
    assert_eq!(compound.order_by.len(), 1);
    assert_eq!(compound.limit, Some(Expr::integer(3)));
    assert_eq!(compound.offset, Some(Expr::integer(1)));
    assert!(compound.branches.iter().all(|b| !b.is_bounded()));
    assert_eq!(round_trip(sql), sql);

    let nested = parse_compound("SELECT 1 UNION SELECT 2 EXCEPT SELECT 3 LIMIT 2");
    assert_eq!(nested.op, CompoundOp::Except);
    assert!(nested.limit.is_some());
    assert!(!nested.branches[0].is_bounded());
}

#[test]
fn parenthesised_branch_keeps_its_own_limit() {
    let compound = parse_compound("SELECT a FROM t UNION (SELECT a FROM u LIMIT 1) LIMIT 5");
    assert!(compound.branches[1].is_bounded());
    assert_eq!(compound.limit, Some(Expr::integer(5)));
    round_trip("SELECT a FROM t UNION (SELECT a FROM u LIMIT 1) LIMIT 5");
    round_trip("(SELECT a FROM t UNION SELECT a FROM u ORDER BY a) UNION SELECT b FROM v");
}

#[test]
fn order_by_before_union_is_rejected() {
    assert!(matches!(
        parse_err("SELECT a FROM t ORDER BY a UNION SELECT a FROM u"),
        SqlError::Syntax { .. }
    ));
}

#[test]
fn column_count_mismatch() {
    let err = parse_err("SELECT a, b FROM t UNION SELECT a FROM u");
    let SqlError::Structure(message) = err else {
        panic!("Expected a structure error");
    };
    assert!(message.contains("2 and 1"), "{message}");
}

#[test]
fn nested_column_count_mismatch() {
    assert!(matches!(
        parse_err("SELECT a FROM t UNION (SELECT a, b FROM u EXCEPT SELECT a, b FROM v)"),
        SqlError::Structure(_)
    ));
}

#[test]
fn wildcard_branch_is_not_compared() {
    let stmt = parse("SELECT * FROM t UNION SELECT a, b FROM u");
    assert!(stmt.check_structure().is_ok());
}

#[test]
fn hand_built_compounds() {
    let ok = CompoundStatement::new(CompoundOp::Union, vec![select_of(&["a"]), select_of(&["b"])]);
    assert!(check_compound(&ok).is_ok());

    let single = CompoundStatement::new(CompoundOp::Union, vec![select_of(&["a"])]);
    assert!(matches!(check_compound(&single), Err(SqlError::Structure(_))));

    let uneven = CompoundStatement::new(
        CompoundOp::Except,
        vec![select_of(&["a", "b"]), select_of(&["c"])],
    );
    assert!(matches!(check_compound(&uneven), Err(SqlError::Structure(_))));

    let nested = CompoundStatement::new(
        CompoundOp::Union,
        vec![SelectQuery::Compound(ok.clone()), select_of(&["z"])],
    );
    assert!(check_compound(&nested).is_ok());
}

#[test]
fn reduce_single_branch() {
    let single = CompoundStatement::new(CompoundOp::Intersect, vec![select_of(&["a"])]);
    assert_eq!(single.reduce(), select_of(&["a"]));

    let pair = CompoundStatement::new(CompoundOp::Union, vec![select_of(&["a"]), select_of(&["b"])]);
    assert!(matches!(pair.reduce(), SelectQuery::Compound(_)));
}
