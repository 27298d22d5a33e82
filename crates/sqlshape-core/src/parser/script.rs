//! Statement-level entry points: splitting a script and parsing each piece.

use tracing::{debug, trace};

use super::parser::{register_host_param, register_param, Parser};
use crate::ast::{Batch, Literal, Statement, StatementBody, UnknownStatement};
use crate::config::ParserConfig;
use crate::dialect::DialectKind;
use crate::error::{Result, SqlError};
use crate::lexer::{Keyword, LexMode, Lexer, Position, Token, TokenKind};
use crate::params::ParamSet;
use crate::validate::check_structure;

/// Parses SQL scripts one statement at a time.
///
/// The parser keeps state between calls: a MySQL `DELIMITER` command changes
/// the statement delimiter for every later statement.
///
/// ```rust
/// use sqlshape_core::{DialectKind, SqlParser};
///
/// let mut parser = SqlParser::for_dialect(DialectKind::Sqlite);
/// let (first, rest) = parser.parse_statement("SELECT 1; DELETE FROM t").unwrap();
/// assert_eq!(first.stmt_type(), "SELECT");
/// assert_eq!(rest, "DELETE FROM t");
/// ```
#[derive(Debug, Clone)]
pub struct SqlParser {
    config: ParserConfig,
    delimiter: Option<String>,
}

impl SqlParser {
    /// Creates a parser with `config`.
    #[must_use]
    pub const fn new(config: ParserConfig) -> Self {
        Self {
            config,
            delimiter: None,
        }
    }

    /// Creates a parser with default settings for `dialect`.
    #[must_use]
    pub const fn for_dialect(dialect: DialectKind) -> Self {
        Self::new(ParserConfig::for_dialect(dialect))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns the current statement delimiter.
    #[must_use]
    pub fn delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or(";")
    }

    /// Parses the first statement of `text`.
    ///
    /// Returns the statement and the text after its terminator, with leading
    /// whitespace removed. Empty statements before the first real one are
    /// skipped.
    ///
    /// # Errors
    ///
    /// [`SqlError::EmptySql`] if `text` holds no statement, or the error of
    /// the first statement.
    pub fn parse_statement<'t>(&mut self, text: &'t str) -> Result<(Statement, &'t str)> {
        match self.next_statement(text, Position::default())? {
            Some((statement, next)) => {
                let rest = text.get(next.offset..).unwrap_or_default().trim_start();
                Ok((statement, rest))
            }
            None => Err(SqlError::EmptySql),
        }
    }

    /// Parses every statement of `text`, in order.
    ///
    /// # Errors
    ///
    /// [`SqlError::EmptySql`] if `text` holds no statement, or the error of
    /// the first statement that fails. Error positions are relative to the
    /// whole script.
    pub fn parse_batch(&mut self, text: &str) -> Result<Batch> {
        let mut statements = vec![];
        let mut pos = Position::default();
        while let Some((statement, next)) = self.next_statement(text, pos)? {
            statements.push(statement);
            pos = next;
        }
        if statements.is_empty() {
            return Err(SqlError::EmptySql);
        }
        debug!(count = statements.len(), "parsed batch");
        Ok(Batch { statements })
    }

    /// Finds and parses the next statement at or after `pos`.
    ///
    /// Returns `None` when only blanks, comments and separators remain.
    fn next_statement(
        &mut self,
        text: &str,
        mut pos: Position,
    ) -> Result<Option<(Statement, Position)>> {
        let dialect = self.config.dialect.dialect();
        loop {
            if dialect.supports_delimiter_command() {
                while let Some(next) = self.skip_delimiter_command(text, pos) {
                    pos = next;
                }
            }

            let delimiter = self.delimiter.clone();
            let mut lexer = Lexer::new(text, dialect)
                .mode(LexMode::Delimit)
                .starting_at(pos);
            if let Some(delimiter) = delimiter.as_deref() {
                lexer = lexer.delimiter(delimiter);
            }

            let mut first: Option<Token> = None;
            let end = loop {
                let token = lexer.next_token();
                match &token.kind {
                    TokenKind::Error(message) => {
                        return Err(SqlError::syntax(token.pos, message.clone()));
                    }
                    TokenKind::Semicolon | TokenKind::Eof => break token,
                    _ => {}
                }
                let start = first.as_ref().map_or(token.span.start, |f| f.span.start);
                if token.span.end - start > self.config.max_statement_len {
                    return Err(SqlError::overflow(
                        token.pos,
                        format!(
                            "statement exceeds {} bytes",
                            self.config.max_statement_len
                        ),
                    ));
                }
                if first.is_none() {
                    first = Some(token);
                }
            };
            let next = lexer.position();

            match first {
                Some(first) => {
                    trace!(
                        line = first.pos.line,
                        start = first.span.start,
                        end = end.span.start,
                        "statement boundary"
                    );
                    let statement = self.build_statement(text, &first, end.span.start)?;
                    return Ok(Some((statement, next)));
                }
                None if end.is_eof() => return Ok(None),
                None => pos = next,
            }
        }
    }

    /// Parses the statement spanning `first` to `end`.
    fn build_statement(&self, text: &str, first: &Token, end: usize) -> Result<Statement> {
        let dialect = self.config.dialect.dialect();
        let sql = text.get(first.span.start..end).unwrap_or_default().trim_end();

        let decomposable = match &first.kind {
            TokenKind::LeftParen => true,
            TokenKind::Keyword(kw) => matches!(
                kw,
                Keyword::Select
                    | Keyword::Insert
                    | Keyword::Replace
                    | Keyword::Update
                    | Keyword::Delete
                    | Keyword::Begin
                    | Keyword::Start
                    | Keyword::Commit
                    | Keyword::End
                    | Keyword::Rollback
                    | Keyword::Savepoint
                    | Keyword::Release
            ),
            _ => false,
        };

        let mut parsed = None;
        if decomposable {
            let lexer = Lexer::new(text, dialect).starting_at(first.pos).until(end);
            let mut parser = Parser::new(lexer, self.config.max_depth);
            match parser.parse_statement() {
                Ok(body) => parsed = Some((body, parser.into_params())),
                // BEGIN and START also open procedural blocks and replication commands
                Err(err)
                    if !err.overflow
                        && matches!(first.as_keyword(), Some(Keyword::Begin | Keyword::Start)) =>
                {
                    debug!(error = %err, "falling back to UNKNOWN statement");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let (body, params) = match parsed {
            Some(parsed) => parsed,
            None => {
                let (unknown, params) = self.parse_unknown(text, first.pos, end)?;
                debug!(line = first.pos.line, "kept statement as UNKNOWN");
                (StatementBody::Unknown(unknown), params)
            }
        };

        check_structure(&body)?;
        if self.config.strict_param_types {
            if let Some(conflict) = params.conflicts().first() {
                return Err(SqlError::Structure(format!(
                    "parameter '{}' declared as both {} and {}",
                    conflict.key,
                    conflict.kept_type.as_deref().unwrap_or("untyped"),
                    conflict.other_type.as_deref().unwrap_or("untyped"),
                )));
            }
        }

        let statement = Statement::new(sql, body, params);
        debug!(
            stmt_type = statement.stmt_type(),
            params = statement.params.len(),
            line = first.pos.line,
            "parsed statement"
        );
        Ok(statement)
    }

    /// Keeps a statement as text, cut around its placeholders.
    fn parse_unknown(
        &self,
        text: &str,
        start: Position,
        end: usize,
    ) -> Result<(UnknownStatement, ParamSet)> {
        let dialect = self.config.dialect.dialect();
        let mut lexer = Lexer::new(text, dialect).starting_at(start).until(end);
        let mut unknown = UnknownStatement::default();
        let mut params = ParamSet::new();
        let mut copied = start.offset;
        let mut last_literal: Option<(usize, Literal)> = None;

        loop {
            let token = lexer.next_token();
            let literal = match token.kind {
                TokenKind::Eof => break,
                TokenKind::Error(message) => return Err(SqlError::syntax(token.pos, message)),
                TokenKind::Param(param) => {
                    let mut node = register_param(&mut params, &param);
                    let cut = match last_literal.take() {
                        Some((literal_start, literal)) if param.attached => {
                            node.default = Some(literal);
                            literal_start
                        }
                        _ => token.span.start,
                    };
                    unknown.push_text(text.get(copied..cut).unwrap_or_default());
                    unknown.push_param(node);
                    copied = token.span.end;
                    None
                }
                TokenKind::HostParam(name) => {
                    let node = register_host_param(&mut params, &name);
                    unknown.push_text(text.get(copied..token.span.start).unwrap_or_default());
                    unknown.push_param(node);
                    copied = token.span.end;
                    None
                }
                TokenKind::Integer(i) => Some(Literal::Integer(i)),
                TokenKind::Float(f) => Some(Literal::Float(f)),
                TokenKind::String(s) => Some(Literal::String(s)),
                TokenKind::Blob(b) => Some(Literal::Blob(b)),
                _ => None,
            };
            last_literal = literal.map(|literal| (token.span.start, literal));
        }

        unknown.push_text(text.get(copied..end).unwrap_or_default().trim_end());
        Ok((unknown, params))
    }

    /// Consumes a `DELIMITER x` line at `pos`, returning the position after it.
    fn skip_delimiter_command(&mut self, text: &str, mut pos: Position) -> Option<Position> {
        let rest = text.get(pos.offset..)?;
        for c in rest.chars().take_while(|c| c.is_whitespace()) {
            pos.bump(c);
        }
        let rest = text.get(pos.offset..)?;
        if !rest.get(..9)?.eq_ignore_ascii_case("DELIMITER") {
            return None;
        }
        let line = rest.lines().next()?;
        let mut words = line.split_whitespace();
        if words.next()?.len() != 9 {
            return None;
        }
        let delimiter = words.next()?;

        let consumed = rest.get(..line.len())?;
        for c in consumed.chars() {
            pos.bump(c);
        }
        if let Some(newline) = text.get(pos.offset..).and_then(|r| r.chars().next()) {
            pos.bump(newline);
        }

        debug!(delimiter, "statement delimiter changed");
        self.delimiter = (delimiter != ";").then(|| String::from(delimiter));
        Some(pos)
    }
}

impl Default for SqlParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

/// Parses the first statement of `text` with default settings for `dialect`.
///
/// Returns the statement and the unconsumed remainder. A `DELIMITER` command
/// only lasts for the call; use [`SqlParser`] to keep it across statements.
///
/// # Errors
///
/// See [`SqlParser::parse_statement`].
pub fn parse_statement(text: &str, dialect: DialectKind) -> Result<(Statement, &str)> {
    SqlParser::for_dialect(dialect).parse_statement(text)
}

/// Parses every statement of `text` with default settings for `dialect`.
///
/// # Errors
///
/// See [`SqlParser::parse_batch`].
pub fn parse_batch(text: &str, dialect: DialectKind) -> Result<Batch> {
    SqlParser::for_dialect(dialect).parse_batch(text)
}
