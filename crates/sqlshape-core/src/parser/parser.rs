//! SQL Parser implementation.

use super::error::ParseError;
use super::pratt::{infix_binding_power, token_to_operator, NOT_BP, UNARY_BP};
use crate::ast::{
    CaseExpr, CompoundOp, CompoundStatement, DataType, DeleteStatement, Expr, FromClause,
    FunctionCall, Identifier, InsertSource, InsertStatement, IsolationLevel, Join, JoinCondition,
    JoinType, Literal, Operator, OrderBy, OrderDirection, ParamRef, SelectColumn, SelectQuery,
    SelectStatement, SelectTarget, StatementBody, TableSource, TransactionKind,
    TransactionMode, TransactionStatement, UpdateAssignment, UpdateStatement,
};
use crate::lexer::{Keyword, Lexer, ParamToken, Token, TokenKind};
use crate::params::{ParamKey, ParamSet, ParamSpec};

static EOF: TokenKind = TokenKind::Eof;

/// Records a `##` placeholder in `params` and returns the node referring to it.
pub(crate) fn register_param(params: &mut ParamSet, param: &ParamToken) -> ParamRef {
    let mut spec = ParamSpec::new(param.key.clone(), param.type_name.clone(), param.nullok);
    if let Some(descr) = &param.descr {
        spec = spec.with_descr(descr.clone());
    }
    let _ = params.insert_or_merge(spec);
    ParamRef::new(param.key.clone())
}

/// Records a driver placeholder (`?`, `$1`, `:name`, `@name`) in `params`.
pub(crate) fn register_host_param(params: &mut ParamSet, name: &str) -> ParamRef {
    let key = ParamKey::Named(String::from(name));
    let _ = params.insert_or_merge(ParamSpec::new(key.clone(), None, false));
    ParamRef::new(key)
}

/// Appends `rhs` to `lhs` when both use an associative operator, else nests.
fn combine(op: Operator, lhs: Expr, rhs: Expr) -> Expr {
    match lhs {
        Expr::Operation(mut operation) if op.flattens() && operation.op == op => {
            operation.operands.push(rhs);
            Expr::Operation(operation)
        }
        lhs => Expr::operation(op, vec![lhs, rhs]),
    }
}

/// ORDER BY, LIMIT and OFFSET closing a query.
struct QueryTail {
    order_by: Vec<OrderBy>,
    limit: Option<Expr>,
    offset: Option<Expr>,
}

/// SQL Parser.
///
/// Parses exactly one statement from the lexer's range, collecting every
/// placeholder it meets into a [`ParamSet`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    /// One token of lookahead, filled on demand.
    peeked: Option<Token>,
    params: ParamSet,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a parser reading from `lexer`, refusing nesting deeper than `max_depth`.
    #[must_use]
    pub fn new(mut lexer: Lexer<'a>, max_depth: usize) -> Self {
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            peeked: None,
            params: ParamSet::new(),
            depth: 0,
            max_depth,
        }
    }

    /// Returns the placeholders seen so far.
    #[must_use]
    pub const fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Consumes the parser, returning the placeholders it collected.
    #[must_use]
    pub fn into_params(self) -> ParamSet {
        self.params
    }

    /// Parses a single SQL statement, which must fill the whole input.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid SQL statement.
    pub fn parse_statement(&mut self) -> Result<StatementBody, ParseError> {
        let body = match &self.current.kind {
            TokenKind::Keyword(Keyword::Select) | TokenKind::LeftParen => {
                StatementBody::from_query(self.parse_query()?)
            }
            TokenKind::Keyword(Keyword::Insert | Keyword::Replace) => {
                StatementBody::Insert(self.parse_insert_statement()?)
            }
            TokenKind::Keyword(Keyword::Update) => {
                StatementBody::Update(self.parse_update_statement()?)
            }
            TokenKind::Keyword(Keyword::Delete) => {
                StatementBody::Delete(self.parse_delete_statement()?)
            }
            TokenKind::Keyword(
                Keyword::Begin
                | Keyword::Start
                | Keyword::Commit
                | Keyword::End
                | Keyword::Rollback
                | Keyword::Savepoint
                | Keyword::Release,
            ) => StatementBody::Transaction(self.parse_transaction_statement()?),
            _ => return Err(self.error_expected("statement")),
        };

        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
        if !self.current.is_eof() {
            return Err(self.error_expected("end of statement"));
        }
        Ok(body)
    }

    /// Parses a SELECT or a chain of compound operators.
    ///
    /// The chain is left-associative: a change of operator wraps everything
    /// parsed so far as the first branch of a new compound. A trailing
    /// ORDER BY / LIMIT / OFFSET belongs to the whole chain.
    fn parse_query(&mut self) -> Result<SelectQuery, ParseError> {
        self.enter()?;
        let first = self.parse_query_term()?;
        let mut compound = CompoundStatement::new(CompoundOp::Union, vec![first]);
        while let Some(op) = self.parse_compound_operator() {
            let rhs = self.parse_query_term()?;
            if compound.branches.len() > 1 && compound.op != op {
                compound = CompoundStatement::new(op, vec![SelectQuery::Compound(compound)]);
            }
            compound.op = op;
            compound.branches.push(rhs);
        }

        let mut query = compound.reduce();
        // `(SELECT ... LIMIT 1) LIMIT 2` is left for the caller to reject
        if !query.is_bounded() {
            let tail = self.parse_query_tail()?;
            match &mut query {
                SelectQuery::Select(select) => {
                    select.order_by = tail.order_by;
                    select.limit = tail.limit;
                    select.offset = tail.offset;
                }
                SelectQuery::Compound(compound) => {
                    compound.order_by = tail.order_by;
                    compound.limit = tail.limit;
                    compound.offset = tail.offset;
                }
            }
        }
        self.leave();
        Ok(query)
    }

    /// Parses `[ORDER BY ...] [LIMIT n [OFFSET m] | LIMIT m, n] [OFFSET m]`.
    fn parse_query_tail(&mut self) -> Result<QueryTail, ParseError> {
        let order_by = if self.check_keyword(Keyword::Order) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_order_by_list()?
        } else {
            vec![]
        };

        let mut limit = None;
        let mut offset = None;
        if self.check_keyword(Keyword::Limit) {
            self.advance();
            let first = self.parse_expression(0)?;
            if self.check(&TokenKind::Comma) {
                self.advance();
                offset = Some(first);
                limit = Some(self.parse_expression(0)?);
            } else {
                limit = Some(first);
            }
        }
        if offset.is_none() && self.check_keyword(Keyword::Offset) {
            self.advance();
            offset = Some(self.parse_expression(0)?);
        }

        Ok(QueryTail {
            order_by,
            limit,
            offset,
        })
    }

    fn parse_query_term(&mut self) -> Result<SelectQuery, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            Ok(query)
        } else {
            Ok(SelectQuery::Select(Box::new(self.parse_select_statement()?)))
        }
    }

    fn parse_compound_operator(&mut self) -> Option<CompoundOp> {
        let (plain, all) = match &self.current.kind {
            TokenKind::Keyword(Keyword::Union) => (CompoundOp::Union, CompoundOp::UnionAll),
            TokenKind::Keyword(Keyword::Intersect) => {
                (CompoundOp::Intersect, CompoundOp::IntersectAll)
            }
            TokenKind::Keyword(Keyword::Except) => (CompoundOp::Except, CompoundOp::ExceptAll),
            _ => return None,
        };
        self.advance();
        if self.check_keyword(Keyword::All) {
            self.advance();
            return Some(all);
        }
        if self.check_keyword(Keyword::Distinct) {
            self.advance();
        }
        Some(plain)
    }

    /// Parses a SELECT statement up to, not including, its ORDER BY.
    fn parse_select_statement(&mut self) -> Result<SelectStatement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        // DISTINCT [ON (expr)] or ALL
        let mut distinct = false;
        let mut distinct_on = None;
        if self.check_keyword(Keyword::Distinct) {
            self.advance();
            distinct = true;
            if self.check_keyword(Keyword::On) {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                distinct_on = Some(self.parse_expression(0)?);
                self.expect(&TokenKind::RightParen)?;
            }
        } else if self.check_keyword(Keyword::All) {
            self.advance();
        }

        let columns = self.parse_select_columns()?;

        // FROM clause (optional for expressions like SELECT 1+1)
        let from = if self.check_keyword(Keyword::From) {
            self.advance();
            Some(self.parse_from_clause()?)
        } else {
            None
        };

        let where_clause = self.parse_optional_where()?;

        let group_by = if self.check_keyword(Keyword::Group) {
            self.advance();
            self.expect_keyword(Keyword::By)?;
            self.parse_expression_list()?
        } else {
            vec![]
        };

        let having = if self.check_keyword(Keyword::Having) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        Ok(SelectStatement {
            distinct,
            distinct_on,
            columns,
            from,
            where_clause,
            group_by,
            having,
            ..SelectStatement::default()
        })
    }

    fn parse_select_columns(&mut self) -> Result<Vec<SelectColumn>, ParseError> {
        let mut columns = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let alias = if matches!(expr, Expr::Wildcard { .. }) {
                None
            } else {
                self.parse_optional_alias()?
            };
            columns.push(SelectColumn { expr, alias });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(columns)
    }

    /// Parses the FROM list: comma-separated targets and explicit joins.
    fn parse_from_clause(&mut self) -> Result<FromClause, ParseError> {
        let mut from = FromClause::default();
        from.targets.push(self.parse_select_target()?);

        loop {
            let join_type = if self.check(&TokenKind::Comma) {
                self.advance();
                JoinType::Cross
            } else if let Some(join_type) = self.parse_join_type()? {
                join_type
            } else {
                break;
            };
            from.targets.push(self.parse_select_target()?);
            let position = from.targets.len() - 1;

            let condition = match join_type {
                JoinType::Cross | JoinType::Natural => JoinCondition::None,
                _ if self.check_keyword(Keyword::On) => {
                    self.advance();
                    JoinCondition::On(self.parse_expression(0)?)
                }
                _ if self.check_keyword(Keyword::Using) => {
                    self.advance();
                    self.expect(&TokenKind::LeftParen)?;
                    let columns = self.parse_identifier_list()?;
                    self.expect(&TokenKind::RightParen)?;
                    JoinCondition::Using(columns)
                }
                _ => JoinCondition::None,
            };

            from.joins.push(Join {
                join_type,
                position,
                condition,
            });
        }

        Ok(from)
    }

    fn parse_select_target(&mut self) -> Result<SelectTarget, ParseError> {
        let source = if self.check(&TokenKind::LeftParen) {
            self.advance();
            let query = self.parse_query()?;
            self.expect(&TokenKind::RightParen)?;
            TableSource::Subquery(Box::new(query))
        } else {
            TableSource::Table(self.parse_qualified_name("table name")?)
        };
        let alias = self.parse_optional_alias()?;
        Ok(SelectTarget { source, alias })
    }

    /// Parses the join keywords, if any, up to and including JOIN.
    fn parse_join_type(&mut self) -> Result<Option<JoinType>, ParseError> {
        let join_type = match &self.current.kind {
            TokenKind::Keyword(Keyword::Join) => {
                self.advance();
                return Ok(Some(JoinType::Inner));
            }
            TokenKind::Keyword(Keyword::Natural) => {
                self.advance();
                if matches!(
                    self.current.kind,
                    TokenKind::Keyword(Keyword::Inner | Keyword::Left | Keyword::Right | Keyword::Full)
                ) {
                    self.advance();
                }
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                JoinType::Natural
            }
            TokenKind::Keyword(Keyword::Cross) => {
                self.advance();
                JoinType::Cross
            }
            TokenKind::Keyword(Keyword::Inner) => {
                self.advance();
                JoinType::Inner
            }
            TokenKind::Keyword(kw @ (Keyword::Left | Keyword::Right | Keyword::Full)) => {
                let join_type = match kw {
                    Keyword::Left => JoinType::Left,
                    Keyword::Right => JoinType::Right,
                    _ => JoinType::Full,
                };
                self.advance();
                if self.check_keyword(Keyword::Outer) {
                    self.advance();
                }
                join_type
            }
            _ => return Ok(None),
        };
        self.expect_keyword(Keyword::Join)?;
        Ok(Some(join_type))
    }

    /// Parses `[AS] alias`; a bare alias must not be a reserved word.
    fn parse_optional_alias(&mut self) -> Result<Option<String>, ParseError> {
        if self.check_keyword(Keyword::As) {
            self.advance();
            if let TokenKind::String(alias) = &self.current.kind {
                let alias = alias.clone();
                self.advance();
                return Ok(Some(alias));
            }
            return self.expect_name("alias").map(Some);
        }
        match &self.current.kind {
            TokenKind::Identifier(_) => self.expect_name("alias").map(Some),
            TokenKind::Keyword(kw) if !kw.is_reserved() => self.expect_name("alias").map(Some),
            _ => Ok(None),
        }
    }

    fn parse_optional_where(&mut self) -> Result<Option<Expr>, ParseError> {
        if self.check_keyword(Keyword::Where) {
            self.advance();
            Ok(Some(self.parse_expression(0)?))
        } else {
            Ok(None)
        }
    }

    /// Parses `OR ROLLBACK|ABORT|REPLACE|FAIL|IGNORE` after INSERT or UPDATE.
    fn parse_conflict_clause(&mut self) -> Result<Option<String>, ParseError> {
        if !self.check_keyword(Keyword::Or) {
            return Ok(None);
        }
        self.advance();
        match &self.current.kind {
            TokenKind::Keyword(
                kw @ (Keyword::Rollback
                | Keyword::Abort
                | Keyword::Replace
                | Keyword::Fail
                | Keyword::Ignore),
            ) => {
                let action = String::from(kw.as_str());
                self.advance();
                Ok(Some(action))
            }
            _ => Err(self.error_expected("ROLLBACK, ABORT, REPLACE, FAIL or IGNORE")),
        }
    }

    /// Parses an INSERT (or REPLACE) statement.
    fn parse_insert_statement(&mut self) -> Result<InsertStatement, ParseError> {
        let on_conflict = if self.check_keyword(Keyword::Replace) {
            self.advance();
            Some(String::from("REPLACE"))
        } else {
            self.expect_keyword(Keyword::Insert)?;
            self.parse_conflict_clause()?
        };
        self.expect_keyword(Keyword::Into)?;

        let table = self.parse_qualified_name("table name")?;

        // A parenthesis here opens either a column list or a sub-select
        let columns = if self.check(&TokenKind::LeftParen)
            && !matches!(self.peek_kind(), TokenKind::Keyword(Keyword::Select))
        {
            self.advance();
            let columns = self.parse_identifier_list()?;
            self.expect(&TokenKind::RightParen)?;
            columns
        } else {
            vec![]
        };

        let source = match &self.current.kind {
            TokenKind::Keyword(Keyword::Values) => {
                self.advance();
                let mut rows = vec![];
                loop {
                    self.expect(&TokenKind::LeftParen)?;
                    rows.push(self.parse_expression_list()?);
                    self.expect(&TokenKind::RightParen)?;
                    if !self.check(&TokenKind::Comma) {
                        break;
                    }
                    self.advance();
                }
                InsertSource::Values(rows)
            }
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                self.expect_keyword(Keyword::Values)?;
                InsertSource::DefaultValues
            }
            TokenKind::Keyword(Keyword::Select) | TokenKind::LeftParen => {
                InsertSource::Select(Box::new(self.parse_query()?))
            }
            _ => return Err(self.error_expected("VALUES, SELECT or DEFAULT VALUES")),
        };

        Ok(InsertStatement {
            table,
            columns,
            source,
            on_conflict,
        })
    }

    /// Parses an UPDATE statement.
    fn parse_update_statement(&mut self) -> Result<UpdateStatement, ParseError> {
        self.expect_keyword(Keyword::Update)?;
        let on_conflict = self.parse_conflict_clause()?;
        let table = self.parse_qualified_name("table name")?;
        self.expect_keyword(Keyword::Set)?;

        let mut assignments = vec![];
        loop {
            let column = self.parse_qualified_name("column name")?.to_string();
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression(0)?;
            assignments.push(UpdateAssignment { column, value });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_optional_where()?;

        Ok(UpdateStatement {
            table,
            on_conflict,
            assignments,
            where_clause,
        })
    }

    /// Parses a DELETE statement.
    fn parse_delete_statement(&mut self) -> Result<DeleteStatement, ParseError> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;
        let table = self.parse_qualified_name("table name")?;
        let where_clause = self.parse_optional_where()?;
        Ok(DeleteStatement {
            table,
            where_clause,
        })
    }

    fn parse_transaction_statement(&mut self) -> Result<TransactionStatement, ParseError> {
        let keyword = self.current.as_keyword();
        self.advance();
        match keyword {
            Some(Keyword::Begin) => {
                let mode = match &self.current.kind {
                    TokenKind::Keyword(Keyword::Deferred) => Some(TransactionMode::Deferred),
                    TokenKind::Keyword(Keyword::Immediate) => Some(TransactionMode::Immediate),
                    TokenKind::Keyword(Keyword::Exclusive) => Some(TransactionMode::Exclusive),
                    _ => None,
                };
                if mode.is_some() {
                    self.advance();
                }
                self.skip_transaction_word();
                let mut stmt = TransactionStatement::new(TransactionKind::Begin);
                stmt.mode = mode;
                stmt.name = self.parse_optional_name();
                self.parse_transaction_modes(&mut stmt)?;
                Ok(stmt)
            }
            Some(Keyword::Start) => {
                self.expect_keyword(Keyword::Transaction)?;
                let mut stmt = TransactionStatement::new(TransactionKind::Begin);
                self.parse_transaction_modes(&mut stmt)?;
                Ok(stmt)
            }
            Some(Keyword::Commit | Keyword::End) => {
                self.skip_transaction_word();
                let mut stmt = TransactionStatement::new(TransactionKind::Commit);
                stmt.name = self.parse_optional_name();
                Ok(stmt)
            }
            Some(Keyword::Rollback) => {
                self.skip_transaction_word();
                if self.check_keyword(Keyword::To) {
                    self.advance();
                    if self.check_keyword(Keyword::Savepoint) {
                        self.advance();
                    }
                    let name = self.expect_name("savepoint name")?;
                    return Ok(
                        TransactionStatement::new(TransactionKind::RollbackSavepoint).named(name)
                    );
                }
                let mut stmt = TransactionStatement::new(TransactionKind::Rollback);
                stmt.name = self.parse_optional_name();
                Ok(stmt)
            }
            Some(Keyword::Savepoint) => {
                let name = self.expect_name("savepoint name")?;
                Ok(TransactionStatement::new(TransactionKind::Savepoint).named(name))
            }
            Some(Keyword::Release) => {
                if self.check_keyword(Keyword::Savepoint) {
                    self.advance();
                }
                let name = self.expect_name("savepoint name")?;
                Ok(TransactionStatement::new(TransactionKind::ReleaseSavepoint).named(name))
            }
            _ => Err(self.error_expected("transaction command")),
        }
    }

    fn skip_transaction_word(&mut self) {
        if matches!(
            self.current.kind,
            TokenKind::Keyword(Keyword::Transaction | Keyword::Work)
        ) {
            self.advance();
        }
    }

    /// Reads a transaction name, if one follows.
    fn parse_optional_name(&mut self) -> Option<String> {
        let is_name = match &self.current.kind {
            TokenKind::Identifier(_) => true,
            TokenKind::Keyword(Keyword::Isolation | Keyword::Read) => false,
            TokenKind::Keyword(kw) => !kw.is_reserved(),
            _ => false,
        };
        if is_name {
            self.expect_name("name").ok()
        } else {
            None
        }
    }

    /// Parses `ISOLATION LEVEL ...` and `READ ONLY|WRITE`, comma separated.
    fn parse_transaction_modes(
        &mut self,
        stmt: &mut TransactionStatement,
    ) -> Result<(), ParseError> {
        loop {
            if self.check_keyword(Keyword::Isolation) {
                self.advance();
                self.expect_keyword(Keyword::Level)?;
                stmt.isolation_level = Some(self.parse_isolation_level()?);
            } else if self.check_keyword(Keyword::Read) {
                self.advance();
                let mode = match &self.current.kind {
                    TokenKind::Keyword(Keyword::Only) => TransactionMode::ReadOnly,
                    TokenKind::Keyword(Keyword::Write) => TransactionMode::ReadWrite,
                    _ => return Err(self.error_expected("ONLY or WRITE")),
                };
                self.advance();
                stmt.mode = Some(mode);
            } else {
                return Ok(());
            }
            if self.check(&TokenKind::Comma) {
                self.advance();
            }
        }
    }

    fn parse_isolation_level(&mut self) -> Result<IsolationLevel, ParseError> {
        let level = match &self.current.kind {
            TokenKind::Keyword(Keyword::Serializable) => IsolationLevel::Serializable,
            TokenKind::Keyword(Keyword::Repeatable) => {
                self.advance();
                self.expect_keyword(Keyword::Read)?;
                return Ok(IsolationLevel::RepeatableRead);
            }
            TokenKind::Keyword(Keyword::Read) => {
                self.advance();
                match &self.current.kind {
                    TokenKind::Keyword(Keyword::Committed) => IsolationLevel::ReadCommitted,
                    TokenKind::Keyword(Keyword::Uncommitted) => IsolationLevel::ReadUncommitted,
                    _ => return Err(self.error_expected("COMMITTED or UNCOMMITTED")),
                }
            }
            _ => return Err(self.error_expected("isolation level")),
        };
        self.advance();
        Ok(level)
    }

    /// Parses ORDER BY list.
    fn parse_order_by_list(&mut self) -> Result<Vec<OrderBy>, ParseError> {
        let mut items = vec![];
        loop {
            let expr = self.parse_expression(0)?;
            let collation = if self.check_keyword(Keyword::Collate) {
                self.advance();
                if let TokenKind::String(name) = &self.current.kind {
                    let name = name.clone();
                    self.advance();
                    Some(name)
                } else {
                    Some(self.expect_name("collation name")?)
                }
            } else {
                None
            };
            let direction = if self.check_keyword(Keyword::Desc) {
                self.advance();
                OrderDirection::Desc
            } else {
                if self.check_keyword(Keyword::Asc) {
                    self.advance();
                }
                OrderDirection::Asc
            };
            items.push(OrderBy {
                expr,
                direction,
                collation,
            });

            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        Ok(items)
    }

    /// Parses an expression using Pratt parsing.
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_expression_bp(min_bp);
        self.leave();
        result
    }

    fn parse_expression_bp(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;

        while let Some((l_bp, r_bp)) = infix_binding_power(&self.current.kind) {
            if l_bp < min_bp {
                break;
            }

            // Handle special infix operators
            lhs = match &self.current.kind {
                TokenKind::DoubleColon => {
                    self.advance();
                    let data_type = self.parse_data_type()?;
                    Expr::Cast {
                        expr: Box::new(lhs),
                        data_type,
                    }
                }
                TokenKind::Keyword(Keyword::Isnull) => {
                    self.advance();
                    Expr::operation(Operator::IsNull, vec![lhs])
                }
                TokenKind::Keyword(Keyword::Notnull) => {
                    self.advance();
                    Expr::operation(Operator::IsNotNull, vec![lhs])
                }
                TokenKind::Keyword(Keyword::Is) => {
                    self.advance();
                    let negated = if self.check_keyword(Keyword::Not) {
                        self.advance();
                        true
                    } else {
                        false
                    };
                    if self.check_keyword(Keyword::Null) {
                        self.advance();
                        let op = if negated {
                            Operator::IsNotNull
                        } else {
                            Operator::IsNull
                        };
                        Expr::operation(op, vec![lhs])
                    } else {
                        let rhs = self.parse_expression(r_bp)?;
                        let is = Expr::operation(Operator::Is, vec![lhs, rhs]);
                        if negated {
                            Expr::operation(Operator::Not, vec![is])
                        } else {
                            is
                        }
                    }
                }
                TokenKind::Keyword(Keyword::Not) => {
                    self.advance();
                    self.parse_negated_infix(lhs, r_bp)?
                }
                TokenKind::Keyword(Keyword::In) => {
                    self.advance();
                    self.parse_in_list(Operator::In, lhs)?
                }
                TokenKind::Keyword(Keyword::Between) => {
                    self.advance();
                    self.parse_between(lhs, r_bp)?
                }
                TokenKind::Keyword(Keyword::Similar) => {
                    self.advance();
                    self.expect_keyword(Keyword::To)?;
                    let rhs = self.parse_expression(r_bp)?;
                    Expr::operation(Operator::Similar, vec![lhs, rhs])
                }
                kind => {
                    // Standard binary operator
                    let Some(op) = token_to_operator(kind) else {
                        break;
                    };
                    self.advance();
                    let rhs = self.parse_expression(r_bp)?;
                    combine(op, lhs, rhs)
                }
            };
        }

        Ok(lhs)
    }

    /// Parses what follows an infix NOT: IN, LIKE, ILIKE, BETWEEN, SIMILAR TO or NULL.
    fn parse_negated_infix(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, ParseError> {
        let keyword = self.current.as_keyword();
        match keyword {
            Some(Keyword::In) => {
                self.advance();
                self.parse_in_list(Operator::NotIn, lhs)
            }
            Some(kw @ (Keyword::Like | Keyword::Ilike)) => {
                self.advance();
                let rhs = self.parse_expression(r_bp)?;
                let op = if kw == Keyword::Like {
                    Operator::NotLike
                } else {
                    Operator::NotIlike
                };
                Ok(Expr::operation(op, vec![lhs, rhs]))
            }
            Some(Keyword::Between) => {
                self.advance();
                let between = self.parse_between(lhs, r_bp)?;
                Ok(Expr::operation(Operator::Not, vec![between]))
            }
            Some(Keyword::Similar) => {
                self.advance();
                self.expect_keyword(Keyword::To)?;
                let rhs = self.parse_expression(r_bp)?;
                let similar = Expr::operation(Operator::Similar, vec![lhs, rhs]);
                Ok(Expr::operation(Operator::Not, vec![similar]))
            }
            Some(Keyword::Null) => {
                self.advance();
                Ok(Expr::operation(Operator::IsNotNull, vec![lhs]))
            }
            _ => Err(self.error_expected("IN, LIKE, ILIKE, BETWEEN or SIMILAR after NOT")),
        }
    }

    /// Parses `(expr, ...)` or `(SELECT ...)` after IN; operands are `[lhs, items...]`.
    fn parse_in_list(&mut self, op: Operator, lhs: Expr) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut operands = vec![lhs];
        if self.check_keyword(Keyword::Select) {
            operands.push(Expr::Select(Box::new(self.parse_query()?)));
        } else {
            operands.extend(self.parse_expression_list()?);
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::operation(op, operands))
    }

    fn parse_between(&mut self, lhs: Expr, r_bp: u8) -> Result<Expr, ParseError> {
        let low = self.parse_expression(r_bp)?;
        self.expect_keyword(Keyword::And)?;
        let high = self.parse_expression(r_bp)?;
        Ok(Expr::operation(Operator::Between, vec![lhs, low, high]))
    }

    /// Parses a prefix expression.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let (op, bp) = match &self.current.kind {
            TokenKind::Keyword(Keyword::Not) => (Operator::Not, NOT_BP),
            TokenKind::Minus => (Operator::Minus, UNARY_BP),
            TokenKind::BitNot => (Operator::BitNot, UNARY_BP),
            TokenKind::Plus => {
                self.advance();
                return self.parse_expression(UNARY_BP);
            }
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_expression(bp)?;
        Ok(Expr::operation(op, vec![operand]))
    }

    /// Parses a primary expression.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let literal = match &self.current.kind {
            TokenKind::Integer(i) => Some(Literal::Integer(*i)),
            TokenKind::Float(f) => Some(Literal::Float(*f)),
            TokenKind::String(s) => Some(Literal::String(s.clone())),
            TokenKind::Blob(b) => Some(Literal::Blob(b.clone())),
            TokenKind::Keyword(Keyword::Null) => Some(Literal::Null),
            TokenKind::Keyword(Keyword::True) => Some(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => Some(Literal::Boolean(false)),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            return Ok(self.attach_default(literal));
        }

        match self.current.as_keyword() {
            // LEFT(s, n) and RIGHT(s, n) are functions despite the reserved words
            Some(Keyword::Left | Keyword::Right)
                if matches!(self.peek_kind(), TokenKind::LeftParen) =>
            {
                let name = self.source_text(&self.current);
                self.advance();
                return self.parse_function_call(name);
            }
            // DATE '2024-01-01' and friends
            Some(kw @ (Keyword::Date | Keyword::Time | Keyword::Timestamp))
                if matches!(self.peek_kind(), TokenKind::String(_)) =>
            {
                let data_type = DataType::from_parts(kw.as_str(), &[]);
                self.advance();
                let value = self.parse_primary()?;
                return Ok(Expr::Cast {
                    expr: Box::new(value),
                    data_type,
                });
            }
            _ => {}
        }

        match &self.current.kind {
            TokenKind::Keyword(Keyword::Default) => {
                self.advance();
                Ok(Expr::Value(Literal::Default))
            }
            TokenKind::Param(param) => {
                let param = register_param(&mut self.params, param);
                self.advance();
                Ok(Expr::Parameter(param))
            }
            TokenKind::HostParam(name) => {
                let param = register_host_param(&mut self.params, name);
                self.advance();
                Ok(Expr::Parameter(param))
            }
            TokenKind::Star => {
                self.advance();
                Ok(Expr::Wildcard { table: None })
            }
            TokenKind::LeftParen => {
                self.advance();
                if self.check_keyword(Keyword::Select) {
                    let query = self.parse_query()?;
                    self.expect(&TokenKind::RightParen)?;
                    return Ok(Expr::Select(Box::new(query)));
                }
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::Keyword(Keyword::Case) => self.parse_case_expression(),
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast_expression(),
            TokenKind::Keyword(Keyword::Exists) => {
                self.advance();
                self.expect(&TokenKind::LeftParen)?;
                let query = self.parse_query()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expr::Function(FunctionCall {
                    name: String::from("EXISTS"),
                    args: vec![Expr::Select(Box::new(query))],
                    distinct: false,
                }))
            }
            TokenKind::Identifier(_) => self.parse_name_expression(),
            TokenKind::Keyword(kw) if !kw.is_reserved() => self.parse_name_expression(),
            _ => Err(self.error_expected("expression")),
        }
    }

    /// Binds a `/* name:... */` comment to the literal just read, as its default.
    fn attach_default(&mut self, literal: Literal) -> Expr {
        let attached = match &self.current.kind {
            TokenKind::Param(param) if param.attached => {
                Some(register_param(&mut self.params, param))
            }
            _ => None,
        };
        match attached {
            Some(mut param) => {
                self.advance();
                param.default = Some(literal);
                Expr::Parameter(param)
            }
            None => Expr::Value(literal),
        }
    }

    /// Parses a column reference, `table.*` or a function call.
    fn parse_name_expression(&mut self) -> Result<Expr, ParseError> {
        let mut parts = vec![self.expect_name("identifier")?];
        while self.check(&TokenKind::Dot) {
            self.advance();
            if self.check(&TokenKind::Star) {
                self.advance();
                return Ok(Expr::Wildcard {
                    table: Some(parts.join(".")),
                });
            }
            parts.push(self.expect_member_name()?);
        }
        if self.check(&TokenKind::LeftParen) {
            return self.parse_function_call(parts.join("."));
        }
        Ok(Expr::Identifier(Identifier::qualified(parts)))
    }

    /// Parses a function call.
    fn parse_function_call(&mut self, name: String) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;

        let distinct = if self.check_keyword(Keyword::Distinct) {
            self.advance();
            true
        } else {
            if self.check_keyword(Keyword::All) {
                self.advance();
            }
            false
        };

        let args = if self.check(&TokenKind::RightParen) {
            vec![]
        } else {
            self.parse_expression_list()?
        };

        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Function(FunctionCall {
            name,
            args,
            distinct,
        }))
    }

    /// Parses a CAST expression.
    fn parse_cast_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Cast)?;
        self.expect(&TokenKind::LeftParen)?;
        let expr = self.parse_expression(0)?;
        self.expect_keyword(Keyword::As)?;
        let data_type = self.parse_data_type()?;
        self.expect(&TokenKind::RightParen)?;

        Ok(Expr::Cast {
            expr: Box::new(expr),
            data_type,
        })
    }

    /// Parses a CASE expression.
    fn parse_case_expression(&mut self) -> Result<Expr, ParseError> {
        self.expect_keyword(Keyword::Case)?;

        // Simple CASE has a base expression
        let base = if self.check_keyword(Keyword::When) {
            None
        } else {
            Some(Box::new(self.parse_expression(0)?))
        };

        let mut when_then = vec![];
        while self.check_keyword(Keyword::When) {
            self.advance();
            let when = self.parse_expression(0)?;
            self.expect_keyword(Keyword::Then)?;
            let then = self.parse_expression(0)?;
            when_then.push((when, then));
        }
        if when_then.is_empty() {
            return Err(self.error_expected("WHEN"));
        }

        let else_expr = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(Box::new(self.parse_expression(0)?))
        } else {
            None
        };

        self.expect_keyword(Keyword::End)?;

        Ok(Expr::Case(CaseExpr {
            base,
            when_then,
            else_expr,
        }))
    }

    /// Parses a type name with optional `(n[, m])` arguments.
    fn parse_data_type(&mut self) -> Result<DataType, ParseError> {
        let mut name = match &self.current.kind {
            TokenKind::Identifier(_) | TokenKind::Keyword(_) => self.source_text(&self.current),
            _ => return Err(self.error_expected("data type")),
        };
        self.advance();

        // DOUBLE PRECISION, CHARACTER VARYING and other two-word names
        if let TokenKind::Identifier(second) = &self.current.kind {
            if matches!(
                second.to_ascii_uppercase().as_str(),
                "PRECISION" | "VARYING"
            ) {
                name = format!("{name} {second}");
                self.advance();
            }
        }

        let mut args = vec![];
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            loop {
                match &self.current.kind {
                    TokenKind::Integer(n) => {
                        let n = u32::try_from(*n).map_err(|_| {
                            ParseError::new(
                                "type argument out of range",
                                self.current.span,
                                self.current.pos,
                            )
                        })?;
                        args.push(n);
                        self.advance();
                    }
                    _ => return Err(self.error_expected("type length")),
                }
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            self.expect(&TokenKind::RightParen)?;
        }

        Ok(DataType::from_parts(&name, &args))
    }

    /// Parses a comma-separated list of expressions.
    fn parse_expression_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expression(0)?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            exprs.push(self.parse_expression(0)?);
        }
        Ok(exprs)
    }

    /// Parses a comma-separated list of names.
    fn parse_identifier_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = vec![self.expect_name("column name")?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_name("column name")?);
        }
        Ok(names)
    }

    /// Parses `name[.name...]`.
    fn parse_qualified_name(&mut self, what: &str) -> Result<Identifier, ParseError> {
        let mut parts = vec![self.expect_name(what)?];
        while self.check(&TokenKind::Dot) {
            self.advance();
            parts.push(self.expect_member_name()?);
        }
        Ok(Identifier::qualified(parts))
    }

    // --- Helper methods ---

    /// Advances to the next token.
    fn advance(&mut self) {
        let next = self
            .peeked
            .take()
            .unwrap_or_else(|| self.lexer.next_token());
        self.current = next;
    }

    /// Returns the kind of the token after the current one.
    fn peek_kind(&mut self) -> &TokenKind {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token());
        }
        self.peeked.as_ref().map_or(&EOF, |token| &token.kind)
    }

    /// Returns the token as written in the input.
    fn source_text(&self, token: &Token) -> String {
        self.lexer
            .input()
            .get(token.span.start..token.span.end)
            .map_or_else(String::new, String::from)
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::too_deep(
                self.max_depth,
                self.current.span,
                self.current.pos,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(
            expected,
            self.current.kind.clone(),
            self.current.span,
            self.current.pos,
        )
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected(&super::error::describe(kind)))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_expected(keyword.as_str()))
        }
    }

    /// Expects an identifier or a non-reserved keyword, returned as written.
    fn expect_name(&mut self, what: &str) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(kw) if !kw.is_reserved() => {
                let name = self.source_text(&self.current);
                self.advance();
                Ok(name)
            }
            _ => Err(self.error_expected(what)),
        }
    }

    /// Expects the name after a dot, where reserved words are allowed.
    fn expect_member_name(&mut self) -> Result<String, ParseError> {
        if matches!(self.current.kind, TokenKind::Keyword(_)) {
            let name = self.source_text(&self.current);
            self.advance();
            return Ok(name);
        }
        self.expect_name("identifier")
    }
}
