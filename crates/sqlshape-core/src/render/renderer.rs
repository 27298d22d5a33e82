//! The statement renderer.

use tracing::{debug, trace};

use super::quote::quote_for_dialect;
use super::{ParamStyle, RenderOptions};
use crate::ast::{
    CaseExpr, CompoundOp, CompoundStatement, DeleteStatement, Expr, FromClause, FunctionCall,
    Identifier, InsertSource, InsertStatement, JoinCondition, JoinType, Operation, Operator,
    OrderBy, OrderDirection, ParamRef, SelectQuery, SelectStatement, SelectTarget, Statement, StatementBody, TableSource,
    TransactionKind, TransactionMode, TransactionStatement, UnknownPart, UnknownStatement,
    UpdateStatement,
};
use crate::dialect::{Dialect, DialectKind};
use crate::error::{Result, SqlError};
use crate::params::{ParamValues, SqlValue};

/// Renders one statement, recording the parameters it consumes.
///
/// Unlike [`render`](super::render), a `Renderer` does not apply the NULL
/// rewrite; run [`rewrite_for_null_parameters`](super::rewrite_for_null_parameters)
/// first when inlining values that may be NULL.
pub struct Renderer<'a> {
    statement: &'a Statement,
    values: &'a ParamValues,
    options: &'a RenderOptions,
    dialect: &'static dyn Dialect,
    params_used: Vec<String>,
}

impl<'a> Renderer<'a> {
    /// Creates a renderer for `statement`.
    #[must_use]
    pub fn new(
        statement: &'a Statement,
        values: &'a ParamValues,
        options: &'a RenderOptions,
        dialect: DialectKind,
    ) -> Self {
        Self {
            statement,
            values,
            options,
            dialect: dialect.dialect(),
            params_used: Vec::new(),
        }
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns a `Bind` error for an inlined parameter without a usable value
    /// and a `Render` error for a construct the dialect lacks.
    pub fn render(&mut self) -> Result<String> {
        self.params_used.clear();
        let statement = self.statement;
        let sql = self.body(&statement.body)?;
        debug!(
            dialect = self.dialect.name(),
            stmt_type = statement.stmt_type(),
            params = self.params_used.len(),
            "rendered statement"
        );
        Ok(sql)
    }

    /// Names of the parameters consumed by the last render, one entry per occurrence.
    #[must_use]
    pub fn params_used(&self) -> &[String] {
        &self.params_used
    }

    fn unsupported(&self, construct: &str) -> SqlError {
        SqlError::Render(format!(
            "{construct} is not supported by the {} dialect",
            self.dialect.name()
        ))
    }

    const fn sep(&self) -> &'static str {
        if self.options.pretty {
            "\n"
        } else {
            " "
        }
    }

    fn ident(&self, name: &str) -> String {
        quote_for_dialect(
            name,
            self.dialect,
            self.options.meta_store_convention,
            self.options.force_quotes,
        )
    }

    fn qualified(&self, name: &Identifier) -> String {
        let parts: Vec<String> = name.parts.iter().map(|p| self.ident(p)).collect();
        parts.join(".")
    }

    fn list(&mut self, exprs: &[Expr]) -> Result<String> {
        let items = exprs
            .iter()
            .map(|e| self.expr(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(items.join(", "))
    }

    fn body(&mut self, body: &StatementBody) -> Result<String> {
        match body {
            StatementBody::Select(select) => self.select(select),
            StatementBody::Compound(compound) => self.compound(compound),
            StatementBody::Insert(insert) => self.insert(insert),
            StatementBody::Update(update) => self.update(update),
            StatementBody::Delete(delete) => self.delete(delete),
            StatementBody::Transaction(transaction) => self.transaction(transaction),
            StatementBody::Unknown(unknown) => self.unknown(unknown),
        }
    }

    fn query(&mut self, query: &SelectQuery) -> Result<String> {
        match query {
            SelectQuery::Select(select) => self.select(select),
            SelectQuery::Compound(compound) => self.compound(compound),
        }
    }

    fn compound(&mut self, compound: &CompoundStatement) -> Result<String> {
        if matches!(compound.op, CompoundOp::IntersectAll | CompoundOp::ExceptAll)
            && !self.dialect.supports_set_op_all()
        {
            return Err(self.unsupported(compound.op.as_str()));
        }

        let mut branches = Vec::with_capacity(compound.branches.len());
        for (n, branch) in compound.branches.iter().enumerate() {
            let text = self.query(branch)?;
            let wrap = match branch {
                // A left-nested compound of the same operator reads the same without parentheses
                SelectQuery::Compound(inner) => {
                    n > 0 || inner.op != compound.op || inner.is_bounded()
                }
                SelectQuery::Select(_) => branch.is_bounded(),
            };
            if !wrap {
                branches.push(text);
            } else if self.dialect.supports_parenthesized_branches() {
                branches.push(format!("({text})"));
            } else if n == 0 && !branch.is_bounded() {
                // Set operators of one precedence apply left to right
                branches.push(text);
            } else {
                return Err(self.unsupported("Parenthesized compound branch"));
            }
        }
        let glue = format!("{}{}{}", self.sep(), compound.op.as_str(), self.sep());
        let mut sql = branches.join(&glue);
        self.order_by(&mut sql, &compound.order_by)?;
        self.limit(&mut sql, compound.limit.as_ref(), compound.offset.as_ref())?;
        Ok(sql)
    }

    fn select(&mut self, select: &SelectStatement) -> Result<String> {
        let sep = self.sep();
        let mut sql = String::from("SELECT ");
        if let Some(on) = &select.distinct_on {
            if !self.dialect.supports_distinct_on() {
                return Err(self.unsupported("DISTINCT ON"));
            }
            sql.push_str(&format!("DISTINCT ON ({}) ", self.expr(on)?));
        } else if select.distinct {
            sql.push_str("DISTINCT ");
        }

        let mut columns = Vec::with_capacity(select.columns.len());
        for column in &select.columns {
            let mut text = self.expr(&column.expr)?;
            if let Some(alias) = &column.alias {
                text.push_str(" AS ");
                text.push_str(&self.ident(alias));
            }
            columns.push(text);
        }
        sql.push_str(&columns.join(", "));

        if let Some(from) = &select.from {
            sql.push_str(sep);
            sql.push_str("FROM ");
            sql.push_str(&self.from(from)?);
        }
        if let Some(cond) = &select.where_clause {
            sql.push_str(sep);
            sql.push_str("WHERE ");
            sql.push_str(&self.expr(cond)?);
        }
        if !select.group_by.is_empty() {
            sql.push_str(sep);
            sql.push_str("GROUP BY ");
            sql.push_str(&self.list(&select.group_by)?);
        }
        if let Some(having) = &select.having {
            sql.push_str(sep);
            sql.push_str("HAVING ");
            sql.push_str(&self.expr(having)?);
        }
        self.order_by(&mut sql, &select.order_by)?;
        self.limit(&mut sql, select.limit.as_ref(), select.offset.as_ref())?;
        Ok(sql)
    }

    fn order_by(&mut self, sql: &mut String, order_by: &[OrderBy]) -> Result<()> {
        if order_by.is_empty() {
            return Ok(());
        }
        let mut items = Vec::with_capacity(order_by.len());
        for order in order_by {
            let mut text = self.expr(&order.expr)?;
            if let Some(collation) = &order.collation {
                text.push_str(" COLLATE ");
                text.push_str(collation);
            }
            if order.direction == OrderDirection::Desc {
                text.push_str(" DESC");
            }
            items.push(text);
        }
        sql.push_str(self.sep());
        sql.push_str("ORDER BY ");
        sql.push_str(&items.join(", "));
        Ok(())
    }

    fn limit(
        &mut self,
        sql: &mut String,
        limit: Option<&Expr>,
        offset: Option<&Expr>,
    ) -> Result<()> {
        let sep = self.sep();
        let limit = limit.map(|e| self.expr(e)).transpose()?;
        let offset = offset.map(|e| self.expr(e)).transpose()?;

        if !self.dialect.supports_limit_offset() {
            if let Some(offset) = offset {
                sql.push_str(&format!("{sep}OFFSET {offset} ROWS"));
            }
            if let Some(limit) = limit {
                sql.push_str(&format!("{sep}FETCH NEXT {limit} ROWS ONLY"));
            }
            return Ok(());
        }

        match (limit, offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!("{sep}LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => sql.push_str(&format!("{sep}LIMIT {limit}")),
            (None, Some(offset)) => {
                // SQLite and MySQL only accept OFFSET after a LIMIT
                let unbounded = match self.dialect.kind() {
                    DialectKind::Sqlite => "LIMIT -1 ",
                    DialectKind::Mysql => "LIMIT 18446744073709551615 ",
                    _ => "",
                };
                sql.push_str(&format!("{sep}{unbounded}OFFSET {offset}"));
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn from(&mut self, from: &FromClause) -> Result<String> {
        let mut sql = String::new();
        for (position, target) in from.targets.iter().enumerate() {
            let target_sql = self.target(target)?;
            if position == 0 {
                sql.push_str(&target_sql);
                continue;
            }
            let Some(join) = from.joins.iter().find(|j| j.position == position) else {
                sql.push_str(", ");
                sql.push_str(&target_sql);
                continue;
            };
            if matches!(join.join_type, JoinType::Full | JoinType::Right)
                && !self.dialect.supports_full_join()
            {
                return Err(self.unsupported(join.join_type.as_sql()));
            }
            sql.push_str(self.sep());
            sql.push_str(join.join_type.as_sql());
            sql.push(' ');
            sql.push_str(&target_sql);
            match &join.condition {
                JoinCondition::None => {}
                JoinCondition::On(cond) => {
                    sql.push_str(" ON ");
                    sql.push_str(&self.expr(cond)?);
                }
                JoinCondition::Using(columns) => {
                    let columns: Vec<String> = columns.iter().map(|c| self.ident(c)).collect();
                    sql.push_str(&format!(" USING ({})", columns.join(", ")));
                }
            }
        }
        Ok(sql)
    }

    fn target(&mut self, target: &SelectTarget) -> Result<String> {
        let mut sql = match &target.source {
            TableSource::Table(name) => self.qualified(name),
            TableSource::Subquery(query) => format!("({})", self.query(query)?),
        };
        if let Some(alias) = &target.alias {
            // Oracle rejects AS before a table alias
            if self.dialect.kind() != DialectKind::Oracle {
                sql.push_str(" AS");
            }
            sql.push(' ');
            sql.push_str(&self.ident(alias));
        }
        Ok(sql)
    }

    fn insert(&mut self, insert: &InsertStatement) -> Result<String> {
        let mut sql = match (insert.on_conflict.as_deref(), self.dialect.kind()) {
            (None, _) => String::from("INSERT INTO "),
            (Some(conflict), DialectKind::Mysql) if conflict.eq_ignore_ascii_case("REPLACE") => {
                String::from("REPLACE INTO ")
            }
            (Some(conflict), DialectKind::Mysql) if conflict.eq_ignore_ascii_case("IGNORE") => {
                String::from("INSERT IGNORE INTO ")
            }
            (Some(conflict), _) => format!("INSERT OR {} INTO ", conflict.to_ascii_uppercase()),
        };
        sql.push_str(&self.qualified(&insert.table));
        if !insert.columns.is_empty() {
            let columns: Vec<String> = insert.columns.iter().map(|c| self.ident(c)).collect();
            sql.push_str(&format!(" ({})", columns.join(", ")));
        }
        sql.push_str(self.sep());
        match &insert.source {
            InsertSource::Values(rows) => {
                let rows = rows
                    .iter()
                    .map(|row| self.list(row).map(|row| format!("({row})")))
                    .collect::<Result<Vec<_>>>()?;
                sql.push_str("VALUES ");
                sql.push_str(&rows.join(", "));
            }
            InsertSource::Select(query) => sql.push_str(&self.query(query)?),
            InsertSource::DefaultValues => sql.push_str("DEFAULT VALUES"),
        }
        Ok(sql)
    }

    fn update(&mut self, update: &UpdateStatement) -> Result<String> {
        let mut sql = match update.on_conflict.as_deref() {
            Some(conflict) if self.dialect.kind() == DialectKind::Mysql => {
                if !conflict.eq_ignore_ascii_case("IGNORE") {
                    return Err(self.unsupported(&format!("UPDATE OR {conflict}")));
                }
                String::from("UPDATE IGNORE ")
            }
            Some(conflict) => format!("UPDATE OR {} ", conflict.to_ascii_uppercase()),
            None => String::from("UPDATE "),
        };
        sql.push_str(&self.qualified(&update.table));

        let mut assignments = Vec::with_capacity(update.assignments.len());
        for assignment in &update.assignments {
            assignments.push(format!(
                "{} = {}",
                self.ident(&assignment.column),
                self.expr(&assignment.value)?
            ));
        }
        sql.push_str(self.sep());
        sql.push_str("SET ");
        sql.push_str(&assignments.join(", "));

        if let Some(cond) = &update.where_clause {
            sql.push_str(self.sep());
            sql.push_str("WHERE ");
            sql.push_str(&self.expr(cond)?);
        }
        Ok(sql)
    }

    fn delete(&mut self, delete: &DeleteStatement) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.qualified(&delete.table));
        if let Some(cond) = &delete.where_clause {
            sql.push_str(self.sep());
            sql.push_str("WHERE ");
            sql.push_str(&self.expr(cond)?);
        }
        Ok(sql)
    }

    fn transaction(&self, transaction: &TransactionStatement) -> Result<String> {
        let name = transaction.name.as_deref().map(|n| self.ident(n));
        let savepoint = || {
            name.clone().ok_or_else(|| {
                SqlError::Render(format!("{} without a name", transaction.kind.as_str()))
            })
        };
        let sql = match transaction.kind {
            TransactionKind::Begin => self.begin(transaction, name.as_deref())?,
            TransactionKind::Commit | TransactionKind::Rollback => {
                let command = if transaction.kind == TransactionKind::Commit {
                    "COMMIT"
                } else {
                    "ROLLBACK"
                };
                name.as_ref()
                    .map_or_else(|| String::from(command), |name| format!("{command} {name}"))
            }
            TransactionKind::Savepoint => format!("SAVEPOINT {}", savepoint()?),
            TransactionKind::RollbackSavepoint => {
                format!("ROLLBACK TO SAVEPOINT {}", savepoint()?)
            }
            TransactionKind::ReleaseSavepoint => format!("RELEASE SAVEPOINT {}", savepoint()?),
        };
        Ok(sql)
    }

    fn begin(&self, transaction: &TransactionStatement, name: Option<&str>) -> Result<String> {
        let locking = matches!(
            transaction.mode,
            Some(TransactionMode::Deferred | TransactionMode::Immediate | TransactionMode::Exclusive)
        );
        let mut sql = match self.dialect.kind() {
            DialectKind::Mysql => {
                if transaction.isolation_level.is_some() {
                    return Err(self.unsupported("START TRANSACTION ISOLATION LEVEL"));
                }
                String::from("START TRANSACTION")
            }
            DialectKind::Oracle => String::from("SET TRANSACTION"),
            DialectKind::Sqlite => match transaction.mode {
                Some(mode) if locking => format!("BEGIN {} TRANSACTION", mode.as_str()),
                _ => String::from("BEGIN TRANSACTION"),
            },
            DialectKind::Standard | DialectKind::Postgresql => String::from("BEGIN TRANSACTION"),
        };
        if locking && self.dialect.kind() != DialectKind::Sqlite {
            return Err(self.unsupported("BEGIN DEFERRED/IMMEDIATE/EXCLUSIVE"));
        }
        if let Some(name) = name {
            if self.dialect.kind() == DialectKind::Sqlite {
                sql.push(' ');
                sql.push_str(name);
            }
        }
        if let Some(level) = transaction.isolation_level {
            sql.push_str(" ISOLATION LEVEL ");
            sql.push_str(level.as_str());
        }
        if let Some(mode) = transaction.mode.filter(|_| !locking) {
            sql.push(' ');
            sql.push_str(mode.as_str());
        }
        Ok(sql)
    }

    fn unknown(&mut self, unknown: &UnknownStatement) -> Result<String> {
        let mut sql = String::new();
        for part in &unknown.parts {
            match part {
                UnknownPart::Text(text) => sql.push_str(text),
                UnknownPart::Param(param) => sql.push_str(&self.param(param)?),
            }
        }
        Ok(sql)
    }

    fn expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Value(literal) => Ok(literal.to_sql(self.dialect)),
            Expr::Identifier(name) => Ok(self.qualified(name)),
            Expr::Wildcard { table: None } => Ok(String::from("*")),
            Expr::Wildcard { table: Some(table) } => {
                let parts: Vec<String> = table.split('.').map(|p| self.ident(p)).collect();
                Ok(format!("{}.*", parts.join(".")))
            }
            Expr::Parameter(param) => self.param(param),
            Expr::Function(call) => self.function(call),
            Expr::Operation(operation) => self.operation(operation),
            Expr::Select(query) => Ok(format!("({})", self.query(query)?)),
            Expr::Case(case) => self.case(case),
            Expr::Cast { expr, data_type } => {
                Ok(format!("CAST({} AS {})", self.expr(expr)?, data_type.to_sql()))
            }
        }
    }

    fn function(&mut self, call: &FunctionCall) -> Result<String> {
        if call.name.eq_ignore_ascii_case("EXISTS") {
            if let [Expr::Select(query)] = call.args.as_slice() {
                return Ok(format!("EXISTS ({})", self.query(query)?));
            }
        }
        let args = self.list(&call.args)?;
        let distinct = if call.distinct { "DISTINCT " } else { "" };
        Ok(format!("{}({distinct}{args})", call.name))
    }

    fn case(&mut self, case: &CaseExpr) -> Result<String> {
        let mut sql = String::from("CASE");
        if let Some(base) = &case.base {
            sql.push(' ');
            sql.push_str(&self.expr(base)?);
        }
        for (when, then) in &case.when_then {
            sql.push_str(&format!(" WHEN {} THEN {}", self.expr(when)?, self.expr(then)?));
        }
        if let Some(else_expr) = &case.else_expr {
            sql.push_str(" ELSE ");
            sql.push_str(&self.expr(else_expr)?);
        }
        sql.push_str(" END");
        Ok(sql)
    }

    fn check_operator(&self, op: Operator) -> Result<()> {
        match op {
            Operator::Ilike | Operator::NotIlike if !self.dialect.supports_ilike() => {
                Err(self.unsupported("ILIKE"))
            }
            Operator::Regexp | Operator::RegexpCi | Operator::NotRegexp | Operator::NotRegexpCi
                if !self.dialect.supports_regexp_operators() =>
            {
                Err(self.unsupported(&format!("regular expression operator {op}")))
            }
            _ => Ok(()),
        }
    }

    /// Renders an operand of `parent`, parenthesized when precedence requires it.
    fn operand(&mut self, expr: &Expr, parent: Operator, right: bool) -> Result<String> {
        let text = self.expr(expr)?;
        let Expr::Operation(child) = expr else {
            return Ok(text);
        };
        let (inner, outer) = (child.op.precedence(), parent.precedence());
        let unary_child = child.operands.len() == 1 && child.op == Operator::Minus;
        let wrap = !unary_child
            && (inner < outer
                || (right && inner == outer && !(child.op == parent && parent.flattens())));
        Ok(if wrap { format!("({text})") } else { text })
    }

    fn operation(&mut self, operation: &Operation) -> Result<String> {
        let op = operation.op;
        self.check_operator(op)?;
        let operands = operation.operands.as_slice();
        match (op, operands) {
            (Operator::Not, [operand]) => Ok(format!("NOT {}", self.operand(operand, op, true)?)),
            (Operator::BitNot, [operand]) => Ok(format!("~{}", self.operand(operand, op, true)?)),
            (Operator::Minus, [operand]) => {
                let text = self.operand(operand, Operator::BitNot, true)?;
                // `--` would open a comment
                if text.starts_with('-') {
                    Ok(format!("-({text})"))
                } else {
                    Ok(format!("-{text}"))
                }
            }
            (Operator::IsNull | Operator::IsNotNull, [operand]) => {
                Ok(format!("{} {op}", self.operand(operand, op, false)?))
            }
            (Operator::In | Operator::NotIn, [subject, rest @ ..]) => {
                let subject = self.operand(subject, op, false)?;
                let list = match rest {
                    [Expr::Select(query)] => self.query(query)?,
                    rest => self.list(rest)?,
                };
                Ok(format!("{subject} {op} ({list})"))
            }
            (Operator::Between, [subject, low, high]) => {
                let subject = self.operand(subject, op, false)?;
                // Bounds bind tighter than the AND between them
                let low = self.operand(low, op, true)?;
                let high = self.operand(high, op, true)?;
                Ok(format!("{subject} BETWEEN {low} AND {high}"))
            }
            (_, [first, rest @ ..]) if !rest.is_empty() => {
                let mut sql = self.operand(first, op, false)?;
                for operand in rest {
                    sql.push_str(&format!(" {op} "));
                    sql.push_str(&self.operand(operand, op, true)?);
                }
                Ok(sql)
            }
            _ => Err(SqlError::Render(format!(
                "operator {op} cannot take {} operands",
                operands.len()
            ))),
        }
    }

    fn param(&mut self, param: &ParamRef) -> Result<String> {
        let name = param.key.to_string();
        trace!(param = %name, "rendering parameter");
        if param.null_bound {
            self.params_used.push(name);
            return Ok(String::from("NULL"));
        }

        let statement = self.statement;
        let spec = statement.params.get(&param.key);
        let sql = match self.options.param_style {
            ParamStyle::Inline => {
                let value = self.resolve(param, &name)?;
                value.to_sql_inline(self.dialect, self.options.gmt)
            }
            ParamStyle::Short => {
                let mut sql = format!("##{name}");
                if let Some(type_name) = spec.and_then(|s| s.type_name.as_deref()) {
                    sql.push_str("::");
                    sql.push_str(type_name);
                }
                if spec.is_some_and(|s| s.nullok) {
                    if spec.and_then(|s| s.type_name.as_deref()).is_none() {
                        sql.push_str("::");
                    }
                    sql.push_str("::NULL");
                }
                sql
            }
            ParamStyle::Long => {
                let mut sql = format!("## /* name:{}", legacy_quote(&name));
                if let Some(type_name) = spec.and_then(|s| s.type_name.as_deref()) {
                    sql.push_str(&format!(" type:{type_name}"));
                }
                if let Some(descr) = spec.and_then(|s| s.descr.as_deref()) {
                    sql.push_str(&format!(" descr:{}", legacy_quote(descr)));
                }
                if spec.is_some_and(|s| s.nullok) {
                    sql.push_str(" nullok:true");
                }
                sql.push_str(" */");
                sql
            }
            ParamStyle::Colon => format!(":{name}"),
            ParamStyle::Dollar => format!("${}", self.ordinal(&name)),
            ParamStyle::QMark => format!("?{}", self.ordinal(&name)),
            ParamStyle::UQMark => String::from("?"),
        };
        self.params_used.push(name);
        Ok(sql)
    }

    /// 1-based position of `name` among the distinct parameters rendered so far.
    fn ordinal(&self, name: &str) -> usize {
        let mut seen: Vec<&str> = Vec::new();
        for used in &self.params_used {
            if !seen.contains(&used.as_str()) {
                seen.push(used);
            }
        }
        seen.iter()
            .position(|used| *used == name)
            .map_or(seen.len() + 1, |n| n + 1)
    }

    /// Bound value, else the node's default, else NULL when nullable.
    fn resolve(&self, param: &ParamRef, name: &str) -> Result<SqlValue> {
        let spec = self.statement.params.get(&param.key);
        let nullok = spec.is_some_and(|s| s.nullok);

        let Some(value) = self.values.get(name) else {
            return match &param.default {
                Some(default) => Ok(default.to_value()),
                None if nullok => Ok(SqlValue::Null),
                None => Err(SqlError::bind(name, "no value bound")),
            };
        };
        if value.is_null() && !nullok {
            return Err(SqlError::bind(name, "NULL bound to a parameter declared NOT NULL"));
        }
        if let Some(spec) = spec {
            if !spec.value_type.accepts(value) {
                return Err(SqlError::bind(
                    name,
                    format!("expected {}, got {}", spec.value_type, value.value_type()),
                ));
            }
        }
        if let SqlValue::Float(f) = value {
            if !f.is_finite() {
                return Err(SqlError::bind(name, format!("{f} has no SQL literal")));
            }
        }
        Ok(value.clone())
    }
}

/// Quotes a legacy comment attribute value, doubling embedded quotes.
fn legacy_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_statement;
    use crate::render::render;

    fn parse(sql: &str, dialect: DialectKind) -> Statement {
        parse_statement(sql, dialect).unwrap().0
    }

    fn round_trip(sql: &str) -> String {
        let stmt = parse(sql, DialectKind::Standard);
        render(
            &stmt,
            &ParamValues::new(),
            &RenderOptions::default(),
            DialectKind::Standard,
        )
        .unwrap()
    }

    fn styled(sql: &str, style: ParamStyle) -> (String, Vec<String>) {
        let stmt = parse(sql, DialectKind::Standard);
        let options = RenderOptions {
            param_style: style,
            ..RenderOptions::default()
        };
        let values = ParamValues::new();
        let mut renderer = Renderer::new(&stmt, &values, &options, DialectKind::Standard);
        let sql = renderer.render().unwrap();
        (sql, renderer.params_used().to_vec())
    }

    #[test]
    fn test_keywords_uppercased() {
        assert_eq!(
            round_trip("select a, b as c from t where a > 1 order by b desc limit 5 offset 2"),
            "SELECT a, b AS c FROM t WHERE a > 1 ORDER BY b DESC LIMIT 5 OFFSET 2"
        );
    }

    #[test]
    fn test_precedence_parentheses() {
        assert_eq!(round_trip("SELECT (a + b) * c"), "SELECT (a + b) * c");
        assert_eq!(round_trip("SELECT a + (b * c)"), "SELECT a + b * c");
        assert_eq!(round_trip("SELECT a - (b - c)"), "SELECT a - (b - c)");
        assert_eq!(
            round_trip("SELECT * FROM t WHERE (a = 1 OR b = 2) AND c = 3"),
            "SELECT * FROM t WHERE (a = 1 OR b = 2) AND c = 3"
        );
        assert_eq!(round_trip("SELECT - -a"), "SELECT -(-a)");
    }

    #[test]
    fn test_special_operators() {
        assert_eq!(
            round_trip("SELECT * FROM t WHERE a NOT BETWEEN 1 AND 2 AND b IN (1, 2) AND c IS NOT NULL"),
            "SELECT * FROM t WHERE NOT a BETWEEN 1 AND 2 AND b IN (1, 2) AND c IS NOT NULL"
        );
        assert_eq!(
            round_trip("SELECT * FROM t WHERE id IN (SELECT id FROM u)"),
            "SELECT * FROM t WHERE id IN (SELECT id FROM u)"
        );
        assert_eq!(
            round_trip("SELECT * FROM t WHERE EXISTS (SELECT 1 FROM u)"),
            "SELECT * FROM t WHERE EXISTS (SELECT 1 FROM u)"
        );
    }

    #[test]
    fn test_joins_and_compound() {
        assert_eq!(
            round_trip("SELECT * FROM a LEFT JOIN b ON a.id = b.id JOIN c USING (k)"),
            "SELECT * FROM a LEFT JOIN b ON a.id = b.id INNER JOIN c USING (k)"
        );
        assert_eq!(
            round_trip("SELECT a FROM t UNION SELECT a FROM u"),
            "SELECT a FROM t UNION SELECT a FROM u"
        );
    }

    #[test]
    fn test_dml() {
        assert_eq!(
            round_trip("insert into t (a, b) values (1, 'x'), (2, DEFAULT)"),
            "INSERT INTO t (a, b) VALUES (1, 'x'), (2, DEFAULT)"
        );
        assert_eq!(
            round_trip("update t set a = a + 1 where b = 2"),
            "UPDATE t SET a = a + 1 WHERE b = 2"
        );
        assert_eq!(round_trip("delete from t"), "DELETE FROM t");
    }

    #[test]
    fn test_reserved_identifier_quoted() {
        assert_eq!(round_trip("SELECT \"order\" FROM t"), "SELECT \"order\" FROM t");
        let stmt = parse("SELECT `select` FROM t", DialectKind::Mysql);
        let sql = render(&stmt, &ParamValues::new(), &RenderOptions::default(), DialectKind::Mysql)
            .unwrap();
        assert_eq!(sql, "SELECT `select` FROM t");
    }

    #[test]
    fn test_null_parameter_scenario() {
        let stmt = parse(
            "select * from mytable where id = ##id::int::null AND name = ##name::string",
            DialectKind::Standard,
        );
        let values = ParamValues::new()
            .with("id", SqlValue::Null)
            .with("name", "zzz");
        let sql = render(&stmt, &values, &RenderOptions::default(), DialectKind::Standard).unwrap();
        assert_eq!(sql, "SELECT * FROM mytable WHERE id IS NULL AND name = 'zzz'");
    }

    #[test]
    fn test_bind_errors() {
        let stmt = parse("SELECT * FROM t WHERE id = ##id::int", DialectKind::Standard);
        let options = RenderOptions::default();
        let missing = render(&stmt, &ParamValues::new(), &options, DialectKind::Standard);
        assert!(matches!(missing, Err(SqlError::Bind { ref param_name, .. }) if param_name == "id"));

        let wrong = ParamValues::new().with("id", "abc");
        assert!(render(&stmt, &wrong, &options, DialectKind::Standard).is_err());

        let null = ParamValues::new().with("id", SqlValue::Null);
        assert!(render(&stmt, &null, &options, DialectKind::Standard).is_err());
    }

    #[test]
    fn test_nullable_and_default() {
        let stmt = parse("SELECT ##a::int::null", DialectKind::Standard);
        let sql = render(
            &stmt,
            &ParamValues::new(),
            &RenderOptions::default(),
            DialectKind::Standard,
        )
        .unwrap();
        assert_eq!(sql, "SELECT NULL");

        let stmt = parse(
            "SELECT * FROM t WHERE a = 5 /* name:a type:int */",
            DialectKind::Standard,
        );
        let sql = render(
            &stmt,
            &ParamValues::new(),
            &RenderOptions::default(),
            DialectKind::Standard,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 5");
    }

    #[test]
    fn test_param_styles() {
        let sql = "SELECT * FROM t WHERE a = ##a::int AND b = ##b::string::null AND c = ##a::int";
        assert_eq!(
            styled(sql, ParamStyle::Dollar).0,
            "SELECT * FROM t WHERE a = $1 AND b = $2 AND c = $1"
        );
        assert_eq!(
            styled(sql, ParamStyle::QMark).0,
            "SELECT * FROM t WHERE a = ?1 AND b = ?2 AND c = ?1"
        );
        let (text, used) = styled(sql, ParamStyle::UQMark);
        assert_eq!(text, "SELECT * FROM t WHERE a = ? AND b = ? AND c = ?");
        assert_eq!(used, vec!["a", "b", "a"]);
        assert_eq!(
            styled(sql, ParamStyle::Colon).0,
            "SELECT * FROM t WHERE a = :a AND b = :b AND c = :a"
        );
        assert_eq!(
            styled(sql, ParamStyle::Short).0,
            "SELECT * FROM t WHERE a = ##a::int AND b = ##b::string::NULL AND c = ##a::int"
        );
        assert!(styled(sql, ParamStyle::Long)
            .0
            .contains(r#"b = ## /* name:"b" type:string nullok:true */"#));
    }

    #[test]
    fn test_short_style_reparses() {
        let (text, _) = styled("SELECT ##x::int::null", ParamStyle::Short);
        let stmt = parse(&text, DialectKind::Standard);
        assert_eq!(stmt.params.len(), 1);
        assert!(stmt.params.get_by_name("x").is_some_and(|s| s.nullok));
    }

    #[test]
    fn test_dialect_restrictions() {
        let options = RenderOptions::default();
        let values = ParamValues::new();
        let stmt = parse("SELECT * FROM t WHERE a ILIKE 'x%'", DialectKind::Postgresql);
        assert!(render(&stmt, &values, &options, DialectKind::Postgresql).is_ok());
        assert!(matches!(
            render(&stmt, &values, &options, DialectKind::Sqlite),
            Err(SqlError::Render(_))
        ));

        let stmt = parse("SELECT * FROM a FULL JOIN b ON a.x = b.x", DialectKind::Standard);
        assert!(render(&stmt, &values, &options, DialectKind::Mysql).is_err());
    }

    #[test]
    fn test_dialect_spellings() {
        let stmt = parse("SELECT * FROM t WHERE f = TRUE LIMIT 10 OFFSET 5", DialectKind::Standard);
        let values = ParamValues::new();
        let options = RenderOptions::default();
        assert_eq!(
            render(&stmt, &values, &options, DialectKind::Sqlite).unwrap(),
            "SELECT * FROM t WHERE f = 1 LIMIT 10 OFFSET 5"
        );
        assert_eq!(
            render(&stmt, &values, &options, DialectKind::Oracle).unwrap(),
            "SELECT * FROM t WHERE f = 1 OFFSET 5 ROWS FETCH NEXT 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_pretty() {
        let stmt = parse("SELECT a FROM t WHERE b = 1 ORDER BY a", DialectKind::Standard);
        let options = RenderOptions {
            pretty: true,
            ..RenderOptions::default()
        };
        let sql = render(&stmt, &ParamValues::new(), &options, DialectKind::Standard).unwrap();
        assert_eq!(sql, "SELECT a\nFROM t\nWHERE b = 1\nORDER BY a");
    }

    #[test]
    fn test_transactions() {
        assert_eq!(
            round_trip("begin transaction isolation level serializable"),
            "BEGIN TRANSACTION ISOLATION LEVEL SERIALIZABLE"
        );
        assert_eq!(round_trip("rollback to savepoint sp"), "ROLLBACK TO SAVEPOINT sp");
        assert_eq!(round_trip("release sp"), "RELEASE SAVEPOINT sp");
    }

    #[test]
    fn test_unknown_passthrough() {
        let stmt = parse("DROP TABLE t WHERE x = ##x::int", DialectKind::Standard);
        let values = ParamValues::new().with("x", 4_i64);
        let sql = render(&stmt, &values, &RenderOptions::default(), DialectKind::Standard).unwrap();
        assert_eq!(sql, "DROP TABLE t WHERE x = 4");
    }
}
