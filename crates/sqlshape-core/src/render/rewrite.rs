//! Rewriting comparisons against NULL-bound parameters.
//!
//! `x = NULL` is never true in SQL, so a parameter bound to NULL has to turn
//! its comparison into `x IS NULL` before values are inlined.

use tracing::debug;

use crate::ast::{
    map_exprs, Expr, Operation, Operator, ParamRef, Statement, StatementBody, UnknownPart,
    UnknownStatement,
};
use crate::params::{ParamSet, ParamValues};

/// Parameters bound to NULL that may hold NULL.
///
/// A NULL bound to a parameter declared NOT NULL is left alone so that
/// rendering reports it.
struct NullBindings<'a> {
    params: &'a ParamSet,
    values: &'a ParamValues,
}

impl NullBindings<'_> {
    fn holds_null(&self, param: &ParamRef) -> bool {
        param.null_bound
            || (self.params.get(&param.key).is_some_and(|spec| spec.nullok)
                && self.values.is_null(&param.key.to_string()))
    }
}

/// Returns a copy of `statement` with comparisons against NULL-bound parameters rewritten.
///
/// `x = p` becomes `x IS NULL` and `x != p` becomes `x IS NOT NULL` when `p`
/// is declared nullable and bound to NULL in `values`, wherever the
/// comparison sits. In UPDATE SET lists the parameter stays in place, marked
/// so it renders as `NULL` while keeping its spec. UNKNOWN statements get the same treatment on their text.
/// Applying the rewrite twice gives the same tree as applying it once.
///
/// ```rust
/// use sqlshape_core::{parse_statement, render, rewrite_for_null_parameters};
/// use sqlshape_core::{DialectKind, ParamValues, RenderOptions, SqlValue};
///
/// let (stmt, _) =
///     parse_statement("SELECT * FROM t WHERE id = ##id::int::null", DialectKind::Standard)
///         .unwrap();
/// let values = ParamValues::new().with("id", SqlValue::Null);
/// let rewritten = rewrite_for_null_parameters(&stmt, &values);
/// let sql = render(&rewritten, &values, &RenderOptions::default(), DialectKind::Standard);
/// assert_eq!(sql.unwrap(), "SELECT * FROM t WHERE id IS NULL");
/// ```
#[must_use]
pub fn rewrite_for_null_parameters(statement: &Statement, values: &ParamValues) -> Statement {
    let nulls = NullBindings {
        params: &statement.params,
        values,
    };
    let mut rewrites = 0_usize;
    let body = match statement.body.clone() {
        StatementBody::Update(mut update) => {
            for assignment in &mut update.assignments {
                if let Expr::Parameter(param) = &mut assignment.value {
                    if !param.null_bound && nulls.holds_null(param) {
                        param.null_bound = true;
                        rewrites += 1;
                    }
                }
            }
            StatementBody::Update(update)
        }
        StatementBody::Unknown(unknown) => {
            StatementBody::Unknown(rewrite_unknown(unknown, &nulls, &mut rewrites))
        }
        other => other,
    };
    let body = map_exprs(body, &mut |expr| rewrite_comparison(expr, &nulls, &mut rewrites));

    if rewrites > 0 {
        debug!(stmt_type = statement.stmt_type(), rewrites, "rewrote NULL parameters");
    }
    Statement::new(statement.sql.clone(), body, statement.params.clone())
}

fn rewrite_comparison(expr: Expr, nulls: &NullBindings<'_>, rewrites: &mut usize) -> Expr {
    let Expr::Operation(Operation { op, mut operands }) = expr else {
        return expr;
    };
    let replacement = match op {
        Operator::Eq => Operator::IsNull,
        Operator::Diff => Operator::IsNotNull,
        _ => return Expr::operation(op, operands),
    };
    if operands.len() != 2 {
        return Expr::operation(op, operands);
    }

    let is_null_param = |e: &Expr| e.as_param().is_some_and(|param| nulls.holds_null(param));
    let keep = if is_null_param(&operands[1]) && operands[0].as_param().is_none() {
        0
    } else if is_null_param(&operands[0]) && operands[1].as_param().is_none() {
        1
    } else {
        return Expr::operation(op, operands);
    };
    *rewrites += 1;
    Expr::operation(replacement, vec![operands.swap_remove(keep)])
}

fn rewrite_unknown(
    unknown: UnknownStatement,
    nulls: &NullBindings<'_>,
    rewrites: &mut usize,
) -> UnknownStatement {
    let mut out = UnknownStatement::default();
    for part in unknown.parts {
        match part {
            UnknownPart::Param(param) if nulls.holds_null(&param) => {
                let replaced = match out.parts.last_mut() {
                    Some(UnknownPart::Text(text)) => replace_trailing_comparison(text),
                    _ => false,
                };
                if replaced {
                    *rewrites += 1;
                } else {
                    out.push_param(param);
                }
            }
            UnknownPart::Param(param) => out.push_param(param),
            UnknownPart::Text(text) => out.push_text(&text),
        }
    }
    out
}

/// Replaces a trailing `=`, `!=` or `<>` with `IS NULL` / `IS NOT NULL`.
fn replace_trailing_comparison(text: &mut String) -> bool {
    let trimmed = text.trim_end();
    let (cut, replacement) = if let Some(rest) = trimmed
        .strip_suffix("!=")
        .or_else(|| trimmed.strip_suffix("<>"))
    {
        (rest.len(), "IS NOT NULL")
    } else if let Some(rest) = trimmed.strip_suffix('=') {
        if rest.ends_with(['<', '>', '!', ':']) {
            return false;
        }
        (rest.len(), "IS NULL")
    } else {
        return false;
    };
    text.truncate(cut);
    if !text.ends_with(char::is_whitespace) {
        text.push(' ');
    }
    text.push_str(replacement);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;
    use crate::params::SqlValue;
    use crate::parser::parse_statement;

    fn parse(sql: &str) -> Statement {
        parse_statement(sql, DialectKind::Standard).unwrap().0
    }

    fn null_id() -> ParamValues {
        ParamValues::new().with("id", SqlValue::Null)
    }

    #[test]
    fn test_eq_and_diff() {
        let stmt = parse("SELECT * FROM t WHERE id = ##id::int::null OR ##id::int::null != b");
        let rewritten = rewrite_for_null_parameters(&stmt, &null_id());
        let StatementBody::Select(select) = &rewritten.body else {
            panic!("expected a SELECT");
        };
        let Some(Expr::Operation(or)) = &select.where_clause else {
            panic!("expected an operation");
        };
        assert!(matches!(&or.operands[0], Expr::Operation(o) if o.op == Operator::IsNull));
        assert!(matches!(&or.operands[1], Expr::Operation(o) if o.op == Operator::IsNotNull));
    }

    #[test]
    fn test_original_untouched_and_idempotent() {
        let stmt = parse("DELETE FROM t WHERE id = ##id::int::null");
        let once = rewrite_for_null_parameters(&stmt, &null_id());
        let twice = rewrite_for_null_parameters(&once, &null_id());
        assert_ne!(once, stmt);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_null_binding_kept() {
        let stmt = parse("SELECT * FROM t WHERE id = ##id::int::null");
        let values = ParamValues::new().with("id", 3_i64);
        assert_eq!(rewrite_for_null_parameters(&stmt, &values), stmt);
    }

    #[test]
    fn test_not_null_param_left_for_binding() {
        for sql in [
            "SELECT * FROM t WHERE id = ##id::int",
            "UPDATE t SET id = ##id::int WHERE k = 1",
            "DROP VIEW v WHERE id = ##id::int",
        ] {
            let stmt = parse(sql);
            assert_eq!(rewrite_for_null_parameters(&stmt, &null_id()), stmt, "{sql}");
        }
    }

    #[test]
    fn test_update_set_marks_param() {
        let stmt = parse("UPDATE t SET id = ##id::int::null WHERE k = 1");
        let rewritten = rewrite_for_null_parameters(&stmt, &null_id());
        let StatementBody::Update(update) = &rewritten.body else {
            panic!("expected an UPDATE");
        };
        let param = update.assignments[0].value.as_param().unwrap();
        assert!(param.null_bound);
        assert_eq!(rewritten.params, stmt.params);
    }

    #[test]
    fn test_unknown_text() {
        let stmt = parse("DROP VIEW v WHERE id = ##id::int::null");
        let rewritten = rewrite_for_null_parameters(&stmt, &null_id());
        let StatementBody::Unknown(unknown) = &rewritten.body else {
            panic!("expected UNKNOWN");
        };
        assert_eq!(
            unknown.parts,
            vec![UnknownPart::Text(String::from("DROP VIEW v WHERE id IS NULL"))]
        );
    }

    #[test]
    fn test_trailing_comparison() {
        let mut text = String::from("a <> ");
        assert!(replace_trailing_comparison(&mut text));
        assert_eq!(text, "a IS NOT NULL");
        let mut text = String::from("a >= ");
        assert!(!replace_trailing_comparison(&mut text));
    }
}
