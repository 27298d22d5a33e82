#![allow(dead_code)]

use sqlshape_core::ast::{
    CompoundStatement, DeleteStatement, InsertStatement, SelectStatement, StatementBody,
    TransactionStatement, UpdateStatement,
};
use sqlshape_core::{
    parse_statement, render, DialectKind, ParamValues, RenderOptions, SqlError, Statement,
};

pub fn parse(sql: &str) -> Statement {
    parse_in(sql, DialectKind::Standard)
}

pub fn parse_in(sql: &str, dialect: DialectKind) -> Statement {
    parse_statement(sql, dialect)
        .map(|(stmt, _)| stmt)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> SqlError {
    parse_statement(sql, DialectKind::Standard)
        .map(|(stmt, _)| stmt)
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_select(sql: &str) -> SelectStatement {
    match parse(sql).body {
        StatementBody::Select(s) => s,
        other => panic!("Expected SELECT, got {other:?}"),
    }
}

pub fn parse_compound(sql: &str) -> CompoundStatement {
    match parse(sql).body {
        StatementBody::Compound(c) => c,
        other => panic!("Expected COMPOUND, got {other:?}"),
    }
}

pub fn parse_insert(sql: &str) -> InsertStatement {
    match parse(sql).body {
        StatementBody::Insert(i) => i,
        other => panic!("Expected INSERT, got {other:?}"),
    }
}

pub fn parse_update(sql: &str) -> UpdateStatement {
    match parse(sql).body {
        StatementBody::Update(u) => u,
        other => panic!("Expected UPDATE, got {other:?}"),
    }
}

pub fn parse_delete(sql: &str) -> DeleteStatement {
    match parse(sql).body {
        StatementBody::Delete(d) => d,
        other => panic!("Expected DELETE, got {other:?}"),
    }
}

pub fn parse_transaction(sql: &str) -> TransactionStatement {
    match parse(sql).body {
        StatementBody::Transaction(t) => t,
        other => panic!("Expected a transaction statement, got {other:?}"),
    }
}

/// Renders with no bound values in the standard dialect.
pub fn to_sql(stmt: &Statement) -> String {
    render(
        stmt,
        &ParamValues::new(),
        &RenderOptions::default(),
        DialectKind::Standard,
    )
    .unwrap_or_else(|e| panic!("Failed to render: {}\nError: {e:?}", stmt.sql))
}

/// Verifies that rendering reaches a fixed point: render(parse(sql)) parses
/// back to the same tree and renders to the same text again.
pub fn round_trip(sql: &str) -> String {
    let ast1 = parse(sql);
    let rendered1 = to_sql(&ast1);
    let ast2 = parse(&rendered1);
    let rendered2 = to_sql(&ast2);
    assert_eq!(
        rendered1, rendered2,
        "Round-trip failed.\n  Input:    {sql}\n  First:    {rendered1}\n  Second:   {rendered2}"
    );
    assert_eq!(ast1.body, ast2.body, "Round-trip changed the tree for: {sql}");
    rendered1
}
