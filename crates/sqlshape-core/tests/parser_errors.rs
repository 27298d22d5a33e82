//! Tests for parser error cases.

mod common;
use common::*;

use sqlshape_core::{parse_batch, DialectKind, ParserConfig, SqlError, SqlParser};

#[test]
fn error_empty_input() {
    assert_eq!(parse_err(""), SqlError::EmptySql);
}

#[test]
fn error_only_blanks_and_comments() {
    assert_eq!(parse_err("   \n\t"), SqlError::EmptySql);
    assert_eq!(parse_err("-- nothing here\n/* or here */"), SqlError::EmptySql);
    assert_eq!(parse_err(" ; ;; "), SqlError::EmptySql);
    assert!(parse_err("").is_empty_sql());
}

#[test]
fn error_missing_from_table() {
    let err = parse_err("SELECT * FROM");
    assert!(matches!(
        err,
        SqlError::Syntax {
            line: 1,
            col: 14,
            offset: 13,
            ..
        }
    ));
    assert_eq!(
        err.to_string(),
        "Syntax error at line 1, column 14: expected table name, found end of input"
    );
}

#[test]
fn error_position_on_later_line() {
    let err = parse_err("SELECT a\nFROM t\nWHERE = 1");
    assert!(matches!(err, SqlError::Syntax { line: 3, col: 7, .. }));
}

#[test]
fn error_incomplete_select() {
    assert!(matches!(parse_err("SELECT"), SqlError::Syntax { .. }));
}

#[test]
fn error_unclosed_paren() {
    assert!(matches!(parse_err("SELECT (1 + 2"), SqlError::Syntax { .. }));
}

#[test]
fn error_unterminated_string() {
    assert!(matches!(
        parse_err("SELECT 'abc"),
        SqlError::Syntax { line: 1, col: 8, .. }
    ));
}

#[test]
fn error_unterminated_comment() {
    assert!(matches!(
        parse_err("SELECT 1 /* never closed"),
        SqlError::Syntax { .. }
    ));
}

#[test]
fn error_case_without_when() {
    assert!(matches!(
        parse_err("SELECT CASE ELSE 1 END"),
        SqlError::Syntax { .. }
    ));
}

#[test]
fn error_trailing_tokens() {
    assert!(matches!(parse_err("SELECT 1 2"), SqlError::Syntax { .. }));
}

#[test]
fn error_values_width_is_structural() {
    assert!(matches!(
        parse_err("INSERT INTO t (a, b) VALUES (1)"),
        SqlError::Structure(_)
    ));
}

#[test]
fn error_compound_column_count() {
    assert!(matches!(
        parse_err("SELECT a, b FROM t UNION SELECT a FROM u"),
        SqlError::Structure(_)
    ));
}

#[test]
fn unsupported_statement_is_not_an_error() {
    let stmt = parse("TRUNCATE users");
    assert_eq!(stmt.stmt_type(), "UNKNOWN");
}

#[test]
fn error_statement_too_long() {
    let config = ParserConfig {
        max_statement_len: 10,
        ..ParserConfig::default()
    };
    let err = SqlParser::new(config)
        .parse_statement("SELECT a, b, c FROM t")
        .unwrap_err();
    assert!(matches!(err, SqlError::Overflow { .. }));
}

#[test]
fn error_nesting_too_deep() {
    let config = ParserConfig {
        max_depth: 10,
        ..ParserConfig::default()
    };
    let sql = format!("SELECT {}1{}", "(".repeat(30), ")".repeat(30));
    let err = SqlParser::new(config).parse_statement(&sql).unwrap_err();
    assert!(matches!(err, SqlError::Overflow { .. }));

    let ok = format!("SELECT {}1{}", "(".repeat(5), ")".repeat(5));
    assert!(SqlParser::new(ParserConfig::default())
        .parse_statement(&ok)
        .is_ok());
}

fn nested(depth: usize, subquery: bool) -> String {
    if subquery {
        format!("SELECT {}1{}", "(SELECT ".repeat(depth), ")".repeat(depth))
    } else {
        format!("SELECT {}1{}", "(".repeat(depth), ")".repeat(depth))
    }
}

#[test]
fn default_depth_fits_a_default_thread_stack() {
    // Spawned threads get the default 2 MiB stack
    let handle = std::thread::spawn(|| {
        let max = sqlshape_core::config::DEFAULT_MAX_DEPTH;
        for subquery in [false, true] {
            for depth in max.saturating_sub(3)..=max + 2 {
                let sql = nested(depth, subquery);
                match SqlParser::new(ParserConfig::default()).parse_statement(&sql) {
                    Ok((stmt, _)) => {
                        assert!(!sqlshape_core::serialize(&stmt).is_empty());
                        assert!(to_sql(&stmt).starts_with("SELECT"));
                    }
                    Err(SqlError::Overflow { .. }) => {}
                    Err(e) => panic!("depth {depth}: unexpected error {e}"),
                }
            }
        }

        // The statement and its field take two levels
        let deepest = nested(max - 2, false);
        assert!(SqlParser::new(ParserConfig::default())
            .parse_statement(&deepest)
            .is_ok());
        let too_deep = nested(max, false);
        assert!(matches!(
            SqlParser::new(ParserConfig::default()).parse_statement(&too_deep),
            Err(SqlError::Overflow { .. })
        ));
    });
    handle.join().unwrap();
}

#[test]
fn batch_error_reports_script_position() {
    let err = parse_batch("SELECT 1;\nSELECT * FROM;", DialectKind::Standard).unwrap_err();
    assert!(matches!(err, SqlError::Syntax { line: 2, .. }));
}
