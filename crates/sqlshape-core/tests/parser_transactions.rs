//! Tests for transaction control statements.

mod common;
use common::*;

use sqlshape_core::ast::{IsolationLevel, TransactionKind, TransactionMode};
use sqlshape_core::{render, DialectKind, ParamValues, RenderOptions, SqlError};

fn render_in(sql: &str, dialect: DialectKind) -> Result<String, SqlError> {
    render(
        &parse_in(sql, dialect),
        &ParamValues::new(),
        &RenderOptions::default(),
        dialect,
    )
}

#[test]
fn begin_forms() {
    for sql in ["BEGIN", "BEGIN TRANSACTION", "BEGIN WORK", "START TRANSACTION"] {
        let t = parse_transaction(sql);
        assert_eq!(t.kind, TransactionKind::Begin, "{sql}");
        assert!(t.name.is_none());
        assert_eq!(parse(sql).stmt_type(), "BEGIN");
    }
}

#[test]
fn begin_locking_mode_and_name() {
    let t = parse_transaction("BEGIN IMMEDIATE TRANSACTION tx1");
    assert_eq!(t.mode, Some(TransactionMode::Immediate));
    assert_eq!(t.name.as_deref(), Some("tx1"));
    assert_eq!(
        render_in("BEGIN IMMEDIATE TRANSACTION tx1", DialectKind::Sqlite).unwrap(),
        "BEGIN IMMEDIATE TRANSACTION tx1"
    );
    assert!(matches!(
        render_in("BEGIN EXCLUSIVE", DialectKind::Postgresql),
        Err(SqlError::Render(_))
    ));
}

#[test]
fn isolation_levels() {
    for (sql, level) in [
        ("BEGIN ISOLATION LEVEL SERIALIZABLE", IsolationLevel::Serializable),
        ("BEGIN ISOLATION LEVEL REPEATABLE READ", IsolationLevel::RepeatableRead),
        ("BEGIN ISOLATION LEVEL READ COMMITTED", IsolationLevel::ReadCommitted),
        (
            "START TRANSACTION ISOLATION LEVEL READ UNCOMMITTED",
            IsolationLevel::ReadUncommitted,
        ),
    ] {
        assert_eq!(parse_transaction(sql).isolation_level, Some(level), "{sql}");
    }
}

#[test]
fn isolation_with_access_mode() {
    let t = parse_transaction("BEGIN TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ ONLY");
    assert_eq!(t.isolation_level, Some(IsolationLevel::Serializable));
    assert_eq!(t.mode, Some(TransactionMode::ReadOnly));
    assert_eq!(
        render_in(
            "BEGIN TRANSACTION ISOLATION LEVEL SERIALIZABLE, READ ONLY",
            DialectKind::Postgresql
        )
        .unwrap(),
        "BEGIN TRANSACTION ISOLATION LEVEL SERIALIZABLE READ ONLY"
    );
}

#[test]
fn begin_per_dialect() {
    assert_eq!(
        render_in("BEGIN", DialectKind::Mysql).unwrap(),
        "START TRANSACTION"
    );
    assert_eq!(
        render_in("BEGIN", DialectKind::Standard).unwrap(),
        "BEGIN TRANSACTION"
    );
    assert_eq!(
        render_in("BEGIN ISOLATION LEVEL SERIALIZABLE", DialectKind::Oracle).unwrap(),
        "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE"
    );
    assert!(matches!(
        render_in("BEGIN ISOLATION LEVEL SERIALIZABLE", DialectKind::Mysql),
        Err(SqlError::Render(_))
    ));
}

#[test]
fn commit_and_rollback() {
    for sql in ["COMMIT", "COMMIT WORK", "END", "END TRANSACTION"] {
        assert_eq!(parse_transaction(sql).kind, TransactionKind::Commit, "{sql}");
    }
    assert_eq!(parse_transaction("ROLLBACK").kind, TransactionKind::Rollback);
    assert_eq!(parse(" rollback transaction ").stmt_type(), "ROLLBACK");
    assert_eq!(to_sql(&parse("end")), "COMMIT");
}

#[test]
fn savepoints() {
    let t = parse_transaction("SAVEPOINT sp1");
    assert_eq!(t.kind, TransactionKind::Savepoint);
    assert_eq!(t.name.as_deref(), Some("sp1"));

    let t = parse_transaction("ROLLBACK TO SAVEPOINT sp1");
    assert_eq!(t.kind, TransactionKind::RollbackSavepoint);
    assert_eq!(t.name.as_deref(), Some("sp1"));
    assert_eq!(
        parse_transaction("ROLLBACK TRANSACTION TO sp1").kind,
        TransactionKind::RollbackSavepoint
    );

    let t = parse_transaction("RELEASE sp1");
    assert_eq!(t.kind, TransactionKind::ReleaseSavepoint);
    assert_eq!(parse("RELEASE SAVEPOINT sp1").stmt_type(), "DELETE_SAVEPOINT");

    assert_eq!(round_trip("RELEASE sp1"), "RELEASE SAVEPOINT sp1");
    assert_eq!(round_trip("ROLLBACK TO sp1"), "ROLLBACK TO SAVEPOINT sp1");
}

#[test]
fn savepoint_requires_name() {
    assert!(matches!(parse_err("SAVEPOINT"), SqlError::Syntax { .. }));
}
