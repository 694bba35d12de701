//! Recursive-descent grammar over the [`crate::lexer`] token stream.
//!
//! The parser is stateless and pure: [`parse_string`] takes `&str` and
//! returns an owned [`crate::model::Schema`] or a [`ParseError`] with
//! source position; calling it twice on the same text yields an equal
//! schema (spec.md §4.1).

mod expr;
mod select;
mod statements;
mod types;

use crate::ast::Statement;
use crate::error::{ParseError, Position};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::model::Schema;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn position(&self) -> Position {
        self.peek().position
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Case-insensitive keyword match against the current token without
    /// consuming it.
    fn at_keyword(&self, word: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }

    fn at_any_keyword(&self, words: &[&str]) -> bool {
        words.iter().any(|w| self.at_keyword(w))
    }

    /// Matches a sequence of keywords (e.g. `ON CLUSTER`) without
    /// consuming anything unless the whole sequence matches.
    fn at_keyword_seq(&self, words: &[&str]) -> bool {
        words.iter().enumerate().all(|(i, w)| {
            matches!(&self.peek_at(i).kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(w))
        })
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword_seq(&mut self, words: &[&str]) -> bool {
        if self.at_keyword_seq(words) {
            for _ in words {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<(), ParseError> {
        if self.eat_keyword(word) {
            Ok(())
        } else {
            Err(self.unexpected(word))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        let got = match &self.peek().kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.peek().text),
        };
        ParseError::new(self.position(), expected, got)
    }

    fn eat_kind(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, label: &str) -> Result<Token, ParseError> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(label))
        }
    }

    /// Parses a (possibly backtick-quoted) identifier.
    fn parse_ident(&mut self) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::Ident(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            TokenKind::QuotedIdent(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    /// Parses `[db.]name` into (database, name).
    fn parse_qualified_name(&mut self) -> Result<(Option<String>, String), ParseError> {
        let first = self.parse_ident()?;
        if self.eat_kind(&TokenKind::Dot) {
            let second = self.parse_ident()?;
            Ok((Some(first), second))
        } else {
            Ok((None, first))
        }
    }

    fn parse_dotted_path(&mut self) -> Result<Vec<String>, ParseError> {
        let mut parts = vec![self.parse_ident()?];
        while self.eat_kind(&TokenKind::Dot) {
            parts.push(self.parse_ident()?);
        }
        Ok(parts)
    }

    fn parse_string_literal(&mut self) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::StringLiteral(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("a string literal")),
        }
    }

    fn eat_on_cluster(&mut self) -> Result<Option<String>, ParseError> {
        if self.eat_keyword_seq(&["ON", "CLUSTER"]) {
            Ok(Some(self.parse_cluster_name()?))
        } else {
            Ok(None)
        }
    }

    fn parse_cluster_name(&mut self) -> Result<String, ParseError> {
        match &self.peek().kind {
            TokenKind::StringLiteral(s) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => self.parse_ident(),
        }
    }

    fn eat_if_not_exists(&mut self) -> bool {
        self.eat_keyword_seq(&["IF", "NOT", "EXISTS"])
    }

    fn eat_if_exists(&mut self) -> bool {
        self.eat_keyword_seq(&["IF", "EXISTS"])
    }
}

/// Parses a full SQL text containing zero or more `;`-separated
/// statements into a [`Schema`].
pub fn parse_string(text: &str) -> Result<Schema, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();

    while !parser.is_eof() {
        while parser.eat_kind(&TokenKind::Semicolon) {}
        if parser.is_eof() {
            break;
        }
        let stmt = statements::parse_statement(&mut parser)?;
        statements.push(stmt);
        while parser.eat_kind(&TokenKind::Semicolon) {}
    }

    Ok(Schema::from_statements(statements))
}

/// Parses a single statement, discarding any schema-level indexing; used
/// by the differ and migration loader where only the `Statement` value
/// is needed (e.g. to hash or render one statement at a time).
pub fn parse_single_statement(text: &str) -> Result<Statement, ParseError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser::new(tokens);
    while parser.eat_kind(&TokenKind::Semicolon) {}
    let stmt = statements::parse_statement(&mut parser)?;
    while parser.eat_kind(&TokenKind::Semicolon) {}
    if !parser.is_eof() {
        return Err(parser.unexpected("end of input"));
    }
    Ok(stmt)
}
