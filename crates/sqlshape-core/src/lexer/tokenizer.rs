//! SQL Tokenizer implementation.

use super::token::ParamToken;
use super::{Keyword, Position, Span, Token, TokenKind};
use crate::dialect::Dialect;
use crate::params::ParamKey;

/// What the tokens are used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LexMode {
    /// Full grammar: every `;` is a [`TokenKind::Semicolon`].
    #[default]
    Parse,
    /// Statement splitting: a `;` nested in a procedural block is a
    /// [`TokenKind::BlockSemicolon`].
    Delimit,
}

/// Progress through `CREATE [OR REPLACE] PROCEDURE|FUNCTION|... AS|IS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CreateState {
    None,
    Create,
    Routine,
}

/// A lexer that tokenizes SQL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// Byte offset where scanning stops.
    end: usize,
    /// The current position.
    pos: Position,
    /// The position of the start of the current token.
    start: Position,
    dialect: &'a dyn Dialect,
    mode: LexMode,
    /// Statement delimiter set by `DELIMITER`, if not `;`.
    delimiter: Option<&'a str>,
    /// Count of bare `?` host parameters seen.
    host_ordinal: u32,
    block_level: u32,
    /// A DECLARE or CREATE ... AS opened the current block; its BEGIN does not nest.
    block_opened: bool,
    pending_end: bool,
    at_statement_start: bool,
    create: CreateState,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over the whole of `input`, in [`LexMode::Parse`].
    #[must_use]
    pub fn new(input: &'a str, dialect: &'a dyn Dialect) -> Self {
        Self {
            input,
            end: input.len(),
            pos: Position::default(),
            start: Position::default(),
            dialect,
            mode: LexMode::Parse,
            delimiter: None,
            host_ordinal: 0,
            block_level: 0,
            block_opened: false,
            pending_end: false,
            at_statement_start: true,
            create: CreateState::None,
        }
    }

    /// Sets the mode.
    #[must_use]
    pub const fn mode(mut self, mode: LexMode) -> Self {
        self.mode = mode;
        self
    }

    /// Starts scanning at `pos` instead of the beginning of the input.
    #[must_use]
    pub fn starting_at(mut self, pos: Position) -> Self {
        self.pos = pos;
        self.start = pos;
        self
    }

    /// Stops scanning at byte offset `end`.
    #[must_use]
    pub fn until(mut self, end: usize) -> Self {
        self.end = end.min(self.input.len());
        self
    }

    /// Uses `delimiter` as the statement delimiter; a plain `;` then no longer ends statements.
    #[must_use]
    pub fn delimiter(mut self, delimiter: &'a str) -> Self {
        if !delimiter.is_empty() && delimiter != ";" {
            self.delimiter = Some(delimiter);
        }
        self
    }

    /// Returns the whole input text.
    #[must_use]
    pub const fn input(&self) -> &'a str {
        self.input
    }

    /// Returns the current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.pos
    }

    /// Returns the current block nesting level (always 0 in [`LexMode::Parse`]).
    #[must_use]
    pub const fn block_level(&self) -> u32 {
        self.block_level
    }

    fn rest(&self) -> &'a str {
        self.input.get(self.pos.offset..self.end).unwrap_or_default()
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.rest().chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos.bump(c);
        Some(c)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn text(&self) -> &'a str {
        self.input
            .get(self.start.offset..self.pos.offset)
            .unwrap_or_default()
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start.offset, self.pos.offset), self.start)
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    /// Skips whitespace and comments.
    ///
    /// Returns a token when a comment is significant: an unterminated block
    /// comment, or a bare legacy parameter comment.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            self.advance_while(char::is_whitespace);
            self.start = self.pos;

            match (self.peek(), self.peek_next()) {
                (Some('-'), Some('-')) => self.advance_while(|c| c != '\n'),
                (Some('#'), next) if self.dialect.hash_comments() && next != Some('#') => {
                    self.advance_while(|c| c != '\n');
                }
                (Some('/'), Some('*')) => {
                    let Some(content) = self.scan_block_comment() else {
                        return Some(self.error("Unterminated comment"));
                    };
                    if is_legacy_param_comment(content) {
                        return Some(self.legacy_param(content, true));
                    }
                }
                _ => return None,
            }
        }
    }

    /// Consumes a possibly nested `/* ... */` comment and returns its content.
    fn scan_block_comment(&mut self) -> Option<&'a str> {
        self.advance(); // /
        self.advance(); // *
        let content_start = self.pos.offset;
        let mut depth = 1_u32;
        loop {
            match (self.advance()?, self.peek()) {
                ('*', Some('/')) => {
                    let content_end = self.pos.offset - 1;
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        return self.input.get(content_start..content_end);
                    }
                }
                ('/', Some('*')) => {
                    self.advance();
                    depth += 1;
                }
                _ => {}
            }
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            // `END$$` ends at a `$$` delimiter
            if self.delimiter.is_some_and(|d| self.rest().starts_with(d)) {
                break;
            }
            self.advance();
        }
        let text = self.text();

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a delimited identifier, keeping its quotes (e.g., `"column name"`).
    fn scan_quoted_identifier(&mut self, quote: char) -> Token {
        self.advance(); // opening quote
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {}
                None => return self.error("Unterminated quoted identifier"),
            }
        }
        self.make_token(TokenKind::Identifier(String::from(self.text())))
    }

    /// Scans a number (integer or float).
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        self.advance_while(|c| c.is_ascii_digit());

        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            is_float = true;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        let text = self.text();
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return self.make_token(TokenKind::Integer(i));
            }
        }
        match text.parse::<f64>() {
            Ok(f) => self.make_token(TokenKind::Float(f)),
            Err(e) => self.error(format!("Invalid number {text}: {e}")),
        }
    }

    /// Scans a string literal.
    fn scan_string(&mut self, quote: char) -> Token {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some('\\') if self.dialect.backslash_escapes() => match self.advance() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some('r') => value.push('\r'),
                    Some('0') => value.push('\0'),
                    Some(c) => value.push(c),
                    None => return self.error("Unterminated string literal"),
                },
                Some(c) => value.push(c),
                None => return self.error("Unterminated string literal"),
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Scans a PostgreSQL dollar-quoted string, or returns `None` when `$` does
    /// not open one.
    fn scan_dollar_string(&mut self) -> Option<Token> {
        let rest = self.rest();
        let tag_len = rest[1..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map_or(rest.len() - 1, |n| n);
        let tag = rest.get(..tag_len + 2)?;
        if !tag.ends_with('$') || tag[1..].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        let body = &rest[tag.len()..];
        let Some(close) = body.find(tag) else {
            let end = self.end;
            while self.pos.offset < end {
                self.advance();
            }
            return Some(self.error("Unterminated dollar-quoted string"));
        };
        let value = String::from(&body[..close]);
        for c in rest[..tag.len() * 2 + close].chars() {
            self.pos.bump(c);
        }
        Some(self.make_token(TokenKind::String(value)))
    }

    /// Scans a blob literal (X'...' or x'...').
    fn scan_blob(&mut self) -> Token {
        self.advance(); // X/x
        self.advance(); // opening quote

        let mut bytes = Vec::new();
        let mut hex_chars = String::new();

        loop {
            match self.advance() {
                Some('\'') => break,
                Some(c) if c.is_ascii_hexdigit() => {
                    hex_chars.push(c);
                    if hex_chars.len() == 2 {
                        if let Ok(byte) = u8::from_str_radix(&hex_chars, 16) {
                            bytes.push(byte);
                        }
                        hex_chars.clear();
                    }
                }
                Some(c) if c.is_whitespace() => {}
                Some(_) => return self.error("Invalid character in blob literal"),
                None => return self.error("Unterminated blob literal"),
            }
        }

        if !hex_chars.is_empty() {
            return self.error("Odd number of hex digits in blob literal");
        }
        self.make_token(TokenKind::Blob(bytes))
    }

    /// Scans a `##` placeholder; the leading `##` has not been consumed yet.
    fn scan_param(&mut self) -> Token {
        self.advance();
        self.advance();

        let after_marker = self.pos;
        self.advance_while(|c| c == ' ' || c == '\t');
        if self.peek() == Some('/') && self.peek_next() == Some('*') {
            return match self.scan_block_comment() {
                Some(content) => self.legacy_param(content, false),
                None => self.error("Unterminated comment"),
            };
        }
        self.pos = after_marker;

        if self.peek().is_some_and(|c| c == '+' || c == '-') {
            self.advance();
        }
        self.advance_while(|c| {
            c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '|' | '@' | '?')
        });
        let body = self.text().get(2..).unwrap_or_default();
        if body.is_empty() {
            return self.error("Missing parameter name after ##");
        }

        let mut parts = body.split("::");
        let name = parts.next().unwrap_or_default();
        let type_name = parts.next().filter(|t| !t.is_empty()).map(String::from);
        let nullok = match parts.next() {
            None => false,
            Some(modifier) if modifier.eq_ignore_ascii_case("null") => true,
            Some(modifier) => {
                return self.error(format!("Invalid parameter modifier '{modifier}'"));
            }
        };
        if parts.next().is_some() {
            return self.error(format!("Too many '::' sections in parameter '{body}'"));
        }
        if name.is_empty() {
            return self.error("Missing parameter name after ##");
        }
        let key = ParamKey::parse(name);
        if matches!(&key, ParamKey::Named(n) if n.starts_with(['+', '-'])) {
            return self.error(format!("Invalid parameter offset '{name}'"));
        }

        self.make_token(TokenKind::Param(Box::new(ParamToken {
            key,
            type_name,
            descr: None,
            nullok,
            attached: false,
        })))
    }

    /// Builds a parameter token from the content of a legacy `/* name:... */` comment.
    fn legacy_param(&self, content: &str, attached: bool) -> Token {
        match parse_legacy_spec(content) {
            Ok(mut param) => {
                param.attached = attached;
                self.make_token(TokenKind::Param(Box::new(param)))
            }
            Err(message) => self.error(message),
        }
    }

    /// Scans a host parameter after its sigil has been consumed.
    fn scan_host_param(&mut self, sigil: char) -> Token {
        let numeric = self.peek().is_some_and(|c| c.is_ascii_digit());
        if numeric {
            self.advance_while(|c| c.is_ascii_digit());
        } else if sigil != '?' {
            self.advance_while(|c| c.is_alphanumeric() || c == '_');
        }
        let name = self.text().get(sigil.len_utf8()..).unwrap_or_default();
        if !name.is_empty() {
            return self.make_token(TokenKind::HostParam(String::from(name)));
        }
        if sigil == '?' {
            self.host_ordinal += 1;
            // `?N` keeps bare placeholders apart from `$N` and `:N`
            return self.make_token(TokenKind::HostParam(format!("?{}", self.host_ordinal)));
        }
        self.make_token(TokenKind::Symbol(sigil))
    }

    fn scan_custom_delimiter(&mut self) -> Option<Token> {
        let delimiter = self.delimiter?;
        if !self.rest().starts_with(delimiter) {
            return None;
        }
        for c in delimiter.chars() {
            self.pos.bump(c);
        }
        Some(self.make_token(TokenKind::Semicolon))
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        let mut token = self.scan_token();
        if self.mode == LexMode::Delimit {
            self.track_block(&mut token);
        }
        token
    }

    fn scan_token(&mut self) -> Token {
        if let Some(token) = self.skip_whitespace_and_comments() {
            return token;
        }
        self.start = self.pos;
        if let Some(token) = self.scan_custom_delimiter() {
            return token;
        }

        let Some(c) = self.peek() else {
            return self.make_token(TokenKind::Eof);
        };
        let next = self.peek_next();

        match c {
            '#' if next == Some('#') => return self.scan_param(),
            '\'' => return self.scan_string('\''),
            '"' if self.dialect.double_quoted_strings() => return self.scan_string('"'),
            '"' => return self.scan_quoted_identifier('"'),
            '`' if self.dialect.backtick_identifiers() => {
                return self.scan_quoted_identifier('`');
            }
            'X' | 'x' if next == Some('\'') => return self.scan_blob(),
            '$' if self.dialect.dollar_quoted_strings() => {
                if let Some(token) = self.scan_dollar_string() {
                    return token;
                }
            }
            '.' if next.is_some_and(|n| n.is_ascii_digit()) => return self.scan_number(),
            c if c.is_ascii_digit() => return self.scan_number(),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(),
            _ => {}
        }

        self.advance();
        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            '[' => self.make_token(TokenKind::LeftBracket),
            ']' => self.make_token(TokenKind::RightBracket),
            ',' => self.make_token(TokenKind::Comma),
            ';' if self.delimiter.is_some() => self.make_token(TokenKind::BlockSemicolon),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '&' => self.make_token(TokenKind::BitAnd),
            '.' => self.make_token(TokenKind::Dot),
            '?' | '$' => self.scan_host_param(c),
            '@' if self.peek() == Some('@') => {
                self.advance();
                self.advance_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
                self.make_token(TokenKind::Identifier(String::from(self.text())))
            }
            '@' => self.scan_host_param(c),
            ':' => match self.peek() {
                Some(':') => {
                    self.advance();
                    self.make_token(TokenKind::DoubleColon)
                }
                Some(n) if n.is_alphabetic() || n == '_' => self.scan_host_param(c),
                _ => self.make_token(TokenKind::Colon),
            },
            '~' if self.dialect.supports_regexp_operators() => {
                if self.peek() == Some('*') {
                    self.advance();
                    self.make_token(TokenKind::RegexpCi)
                } else {
                    self.make_token(TokenKind::Regexp)
                }
            }
            '~' => self.make_token(TokenKind::BitNot),
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                }
                self.make_token(TokenKind::Eq)
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                Some('<') => {
                    self.advance();
                    self.make_token(TokenKind::LeftShift)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::RightShift)
                }
                _ => self.make_token(TokenKind::Gt),
            },
            '!' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                Some('~') if self.dialect.supports_regexp_operators() => {
                    self.advance();
                    if self.peek() == Some('*') {
                        self.advance();
                        self.make_token(TokenKind::NotRegexpCi)
                    } else {
                        self.make_token(TokenKind::NotRegexp)
                    }
                }
                _ => self.make_token(TokenKind::Symbol('!')),
            },
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    self.make_token(TokenKind::Concat)
                } else {
                    self.make_token(TokenKind::BitOr)
                }
            }
            other => self.make_token(TokenKind::Symbol(other)),
        }
    }

    /// Updates the block nesting level after `token` in [`LexMode::Delimit`].
    fn track_block(&mut self, token: &mut Token) {
        let first = self.at_statement_start;
        if self.pending_end {
            self.pending_end = false;
            if token.as_keyword() != Some(Keyword::If) {
                self.block_level = self.block_level.saturating_sub(1);
            }
        }

        match &token.kind {
            TokenKind::Keyword(Keyword::Begin) if !first => {
                if self.block_opened {
                    self.block_opened = false;
                } else {
                    self.block_level += 1;
                }
            }
            TokenKind::Keyword(Keyword::Case | Keyword::Loop) if !first => self.block_level += 1,
            TokenKind::Keyword(Keyword::End) if self.block_level > 0 => self.pending_end = true,
            TokenKind::Keyword(Keyword::Declare) if first => {
                self.block_level += 1;
                self.block_opened = true;
            }
            TokenKind::Keyword(Keyword::Create) if first && self.dialect.create_opens_block() => {
                self.create = CreateState::Create;
            }
            TokenKind::Identifier(word)
                if self.create == CreateState::Create && is_routine_word(word) =>
            {
                self.create = CreateState::Routine;
            }
            TokenKind::Keyword(Keyword::As | Keyword::Is)
                if self.create == CreateState::Routine =>
            {
                self.create = CreateState::None;
                self.block_level += 1;
                self.block_opened = true;
            }
            TokenKind::Semicolon if self.block_level > 0 => token.kind = TokenKind::BlockSemicolon,
            _ => {}
        }

        if token.kind == TokenKind::Semicolon {
            self.at_statement_start = true;
            self.block_opened = false;
            self.create = CreateState::None;
        } else {
            self.at_statement_start = false;
        }
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

fn is_routine_word(word: &str) -> bool {
    ["PROCEDURE", "FUNCTION", "PACKAGE", "TRIGGER", "TYPE"]
        .iter()
        .any(|w| w.eq_ignore_ascii_case(word))
}

fn is_legacy_param_comment(content: &str) -> bool {
    content.trim_start().starts_with("name:")
}

/// Parses `name:"x" type:gint descr:"..." nullok:true`.
fn parse_legacy_spec(content: &str) -> Result<ParamToken, String> {
    let mut name = None;
    let mut type_name = None;
    let mut descr = None;
    let mut nullok = false;

    let mut rest = content.trim();
    while !rest.is_empty() {
        let Some(colon) = rest.find(':') else {
            return Err(format!("Invalid parameter attribute '{rest}'"));
        };
        let key = rest[..colon].trim();
        let (value, remainder) = legacy_value(&rest[colon + 1..])?;
        match key {
            "name" => name = Some(value),
            "type" => type_name = Some(value),
            "descr" => descr = Some(value),
            "nullok" => nullok = value.eq_ignore_ascii_case("true"),
            _ => {}
        }
        rest = remainder.trim_start();
    }

    let name = name.filter(|n| !n.is_empty()).ok_or("Missing parameter name")?;
    Ok(ParamToken {
        key: ParamKey::parse(&name),
        type_name: type_name.filter(|t| !t.is_empty()),
        descr,
        nullok,
        attached: false,
    })
}

/// Reads one attribute value, double-quoted (with `""` escapes) or bare.
fn legacy_value(text: &str) -> Result<(String, &str), String> {
    let Some(quoted) = text.strip_prefix('"') else {
        let end = text.find(char::is_whitespace).unwrap_or(text.len());
        return Ok((String::from(&text[..end]), &text[end..]));
    };
    let mut value = String::new();
    let mut chars = quoted.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            value.push(c);
            continue;
        }
        if chars.peek().is_some_and(|&(_, n)| n == '"') {
            value.push('"');
            chars.next();
        } else {
            return Ok((value, &quoted[i + 1..]));
        }
    }
    Err(String::from("Unterminated quoted parameter attribute"))
}
