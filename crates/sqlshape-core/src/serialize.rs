//! Canonical serialization.
//!
//! Statements serialize to a JSON-shaped text with a fixed key order, so the
//! same AST always produces the same bytes. This is the crate's own canonical
//! form, written by hand rather than through `serde`, because key order and
//! escaping are part of the format.

use crate::ast::{
    Batch, CaseExpr, CompoundStatement, Expr, FromClause, InsertSource, JoinCondition, OrderBy,
    SelectQuery, SelectStatement, SelectTarget, Statement, StatementBody, TableSource,
    TransactionStatement, UnknownPart,
};
use crate::ast::{Literal, ParamRef};
use crate::dialect::DialectKind;
use crate::params::{ParamSet, ParamSpec};

/// Quotes `s` as a JSON string, escaping `"`, `\`, `/` and control characters.
#[must_use]
pub fn json_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if u32::from(c) < 0x20 => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn quote_opt(s: Option<&str>) -> String {
    s.map_or_else(|| String::from("null"), json_quote)
}

fn array(items: impl IntoIterator<Item = String>) -> String {
    let items: Vec<String> = items.into_iter().collect();
    format!("[{}]", items.join(","))
}

/// Key/value pairs written in insertion order.
#[derive(Default)]
struct Object(Vec<(String, String)>);

impl Object {
    fn field(mut self, key: impl Into<String>, value: String) -> Self {
        self.0.push((key.into(), value));
        self
    }

    fn optional(self, key: &str, value: Option<String>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    fn finish(self) -> String {
        let fields: Vec<String> = self
            .0
            .into_iter()
            .map(|(key, value)| format!("{}:{value}", json_quote(&key)))
            .collect();
        format!("{{{}}}", fields.join(","))
    }
}

/// Serializes a statement as `{"sql":...,"stmt_type":...,"contents":{...}}`.
///
/// ```rust
/// use sqlshape_core::{parse_statement, serialize, DialectKind};
///
/// let (stmt, _) = parse_statement("DELETE FROM t", DialectKind::Standard).unwrap();
/// assert_eq!(
///     serialize(&stmt),
///     r#"{"sql":"DELETE FROM t","stmt_type":"DELETE","contents":{"table":"t","condition":null}}"#
/// );
/// ```
#[must_use]
pub fn serialize(statement: &Statement) -> String {
    let writer = Writer {
        params: &statement.params,
    };
    Object::default()
        .field("sql", json_quote(&statement.sql))
        .field("stmt_type", json_quote(statement.stmt_type()))
        .field("contents", writer.contents(&statement.body))
        .finish()
}

/// Serializes a batch as `{"statements":[...]}`, or `{"statements":null}` when empty.
#[must_use]
pub fn serialize_batch(batch: &Batch) -> String {
    let statements = if batch.is_empty() {
        String::from("null")
    } else {
        array(batch.iter().map(serialize))
    };
    Object::default().field("statements", statements).finish()
}

/// Serializes one expression; parameter specs are looked up in `params`.
#[must_use]
pub fn serialize_expr(expr: &Expr, params: &ParamSet) -> String {
    Writer { params }.expr(expr)
}

struct Writer<'a> {
    params: &'a ParamSet,
}

impl Writer<'_> {
    fn contents(&self, body: &StatementBody) -> String {
        match body {
            StatementBody::Select(select) => self.select(select),
            StatementBody::Compound(compound) => self.compound(compound),
            StatementBody::Insert(insert) => {
                let (values, select) = match &insert.source {
                    InsertSource::Values(rows) => (
                        Some(array(
                            rows.iter().map(|row| array(row.iter().map(|e| self.expr(e)))),
                        )),
                        None,
                    ),
                    InsertSource::Select(query) => (None, Some(self.query(query))),
                    InsertSource::DefaultValues => (None, None),
                };
                Object::default()
                    .field("table", json_quote(&insert.table.to_string()))
                    .field("fields", array(insert.columns.iter().map(|c| json_quote(c))))
                    .optional("values", values)
                    .optional("select", select)
                    .optional("on_conflict", insert.on_conflict.as_deref().map(json_quote))
                    .finish()
            }
            StatementBody::Update(update) => Object::default()
                .field("table", json_quote(&update.table.to_string()))
                .optional("on_conflict", update.on_conflict.as_deref().map(json_quote))
                .field(
                    "fields",
                    array(update.assignments.iter().map(|a| json_quote(&a.column))),
                )
                .field(
                    "expressions",
                    array(update.assignments.iter().map(|a| self.expr(&a.value))),
                )
                .field("condition", self.expr_opt(update.where_clause.as_ref()))
                .finish(),
            StatementBody::Delete(delete) => Object::default()
                .field("table", json_quote(&delete.table.to_string()))
                .field("condition", self.expr_opt(delete.where_clause.as_ref()))
                .finish(),
            StatementBody::Transaction(transaction) => Self::transaction(transaction),
            StatementBody::Unknown(unknown) => Object::default()
                .field(
                    "expressions",
                    array(unknown.parts.iter().map(|part| match part {
                        UnknownPart::Text(text) => {
                            Object::default().field("value", json_quote(text)).finish()
                        }
                        UnknownPart::Param(param) => self.param(param),
                    })),
                )
                .finish(),
        }
    }

    fn query(&self, query: &SelectQuery) -> String {
        match query {
            SelectQuery::Select(select) => self.select(select),
            SelectQuery::Compound(compound) => self.compound(compound),
        }
    }

    fn compound(&self, compound: &CompoundStatement) -> String {
        Object::default()
            .field("compound_type", json_quote(compound.op.type_name()))
            .field(
                "select",
                array(compound.branches.iter().map(|b| self.query(b))),
            )
            .optional("order_by", self.order_by(&compound.order_by))
            .optional("limit", compound.limit.as_ref().map(|e| self.expr(e)))
            .optional("offset", compound.offset.as_ref().map(|e| self.expr(e)))
            .finish()
    }

    fn order_by(&self, order_by: &[OrderBy]) -> Option<String> {
        (!order_by.is_empty()).then(|| {
            array(order_by.iter().map(|order| {
                Object::default()
                    .field("expr", self.expr(&order.expr))
                    .field("sort", json_quote(order.direction.as_str()))
                    .optional("collation", order.collation.as_deref().map(json_quote))
                    .finish()
            }))
        })
    }

    fn select(&self, select: &SelectStatement) -> String {
        let fields = array(select.columns.iter().map(|column| {
            Object::default()
                .field("expr", self.expr(&column.expr))
                .optional("alias", column.alias.as_deref().map(json_quote))
                .finish()
        }));
        let group_by = (!select.group_by.is_empty())
            .then(|| array(select.group_by.iter().map(|e| self.expr(e))));

        Object::default()
            .field("distinct", select.distinct.to_string())
            .optional("distinct_on", select.distinct_on.as_ref().map(|e| self.expr(e)))
            .field("fields", fields)
            .optional("from", select.from.as_ref().map(|from| self.from(from)))
            .optional("where", select.where_clause.as_ref().map(|e| self.expr(e)))
            .optional("group_by", group_by)
            .optional("having", select.having.as_ref().map(|e| self.expr(e)))
            .optional("order_by", self.order_by(&select.order_by))
            .optional("limit", select.limit.as_ref().map(|e| self.expr(e)))
            .optional("offset", select.offset.as_ref().map(|e| self.expr(e)))
            .finish()
    }

    fn from(&self, from: &FromClause) -> String {
        let joins = (!from.joins.is_empty()).then(|| {
            array(from.joins.iter().map(|join| {
                let (on_cond, using) = match &join.condition {
                    JoinCondition::None => (None, None),
                    JoinCondition::On(cond) => (Some(self.expr(cond)), None),
                    JoinCondition::Using(columns) => {
                        (None, Some(array(columns.iter().map(|c| json_quote(c)))))
                    }
                };
                Object::default()
                    .field("join_type", json_quote(join.join_type.as_str()))
                    .field("join_pos", json_quote(&join.position.to_string()))
                    .optional("on_cond", on_cond)
                    .optional("using", using)
                    .finish()
            }))
        });
        Object::default()
            .field(
                "targets",
                array(from.targets.iter().map(|t| self.target(t))),
            )
            .optional("joins", joins)
            .finish()
    }

    fn target(&self, target: &SelectTarget) -> String {
        let object = match &target.source {
            TableSource::Table(name) => {
                Object::default().field("table_name", json_quote(&name.to_string()))
            }
            TableSource::Subquery(query) => Object::default().field("select", self.query(query)),
        };
        object
            .optional("as", target.alias.as_deref().map(json_quote))
            .finish()
    }

    fn transaction(transaction: &TransactionStatement) -> String {
        Object::default()
            .field("trans_type", json_quote(transaction.kind.as_str()))
            .optional("trans_mode", transaction.mode.map(|m| json_quote(m.as_str())))
            .optional(
                "isolation_level",
                transaction.isolation_level.map(|l| json_quote(l.as_str())),
            )
            .optional("trans_name", transaction.name.as_deref().map(json_quote))
            .finish()
    }

    fn expr_opt(&self, expr: Option<&Expr>) -> String {
        expr.map_or_else(|| String::from("null"), |e| self.expr(e))
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Value(literal) => Object::default().field("value", literal_json(literal)).finish(),
            Expr::Identifier(ident) => Object::default()
                .field("value", json_quote(&ident.to_string()))
                .field("sqlident", String::from("true"))
                .finish(),
            Expr::Wildcard { table } => {
                let text = table.as_ref().map_or_else(|| String::from("*"), |t| format!("{t}.*"));
                Object::default()
                    .field("value", json_quote(&text))
                    .field("sqlident", String::from("true"))
                    .finish()
            }
            Expr::Parameter(param) => self.param(param),
            Expr::Function(call) => {
                let func = Object::default()
                    .field("function_name", json_quote(&call.name))
                    .field(
                        "function_args",
                        array(call.args.iter().map(|a| self.expr(a))),
                    );
                let func = if call.distinct {
                    func.field("distinct", String::from("true"))
                } else {
                    func
                };
                Object::default().field("func", func.finish()).finish()
            }
            Expr::Operation(operation) => {
                let mut object =
                    Object::default().field("operator", json_quote(operation.op.as_str()));
                for (n, operand) in operation.operands.iter().enumerate() {
                    object = object.field(format!("operand{n}"), self.expr(operand));
                }
                Object::default().field("operation", object.finish()).finish()
            }
            Expr::Select(query) => Object::default().field("select", self.query(query)).finish(),
            Expr::Case(case) => Object::default().field("case", self.case(case)).finish(),
            Expr::Cast { expr, data_type } => {
                let cast = json_quote(&data_type.to_sql());
                let inner = self.expr(expr);
                // Splice the cast into the inner object unless it already carries one
                match inner.strip_suffix('}') {
                    Some(body) if !matches!(**expr, Expr::Cast { .. }) => {
                        format!("{body},\"cast\":{cast}}}")
                    }
                    _ => Object::default()
                        .field("expr", inner)
                        .field("cast", cast)
                        .finish(),
                }
            }
        }
    }

    fn case(&self, case: &CaseExpr) -> String {
        Object::default()
            .field("base_expr", self.expr_opt(case.base.as_deref()))
            .field(
                "body",
                array(case.when_then.iter().map(|(when, then)| {
                    Object::default()
                        .field("when", self.expr(when))
                        .field("then", self.expr(then))
                        .finish()
                })),
            )
            .field("else_expr", self.expr_opt(case.else_expr.as_deref()))
            .finish()
    }

    fn param(&self, param: &ParamRef) -> String {
        let spec = self.params.get(&param.key);
        let name = spec.map_or_else(|| param.key.to_string(), ParamSpec::name);
        let param_spec = Object::default()
            .field("name", json_quote(&name))
            .field("descr", quote_opt(spec.and_then(|s| s.descr.as_deref())))
            .field("type", quote_opt(spec.and_then(|s| s.type_name.as_deref())))
            .field("is_param", String::from("true"))
            .field(
                "nullok",
                spec.is_some_and(|s| s.nullok).to_string(),
            )
            .finish();
        let value = param
            .default
            .as_ref()
            .map_or_else(|| String::from("null"), literal_json);
        Object::default()
            .field("value", value)
            .field("param_spec", param_spec)
            .finish()
    }
}

/// A literal in its SQL spelling, as a JSON string; NULL is `null`.
fn literal_json(literal: &Literal) -> String {
    match literal {
        Literal::Null => String::from("null"),
        other => json_quote(&other.to_sql(DialectKind::Standard.dialect())),
    }
}
