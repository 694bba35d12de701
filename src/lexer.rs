//! Tokenizer for the ClickHouse DDL/SELECT dialect.
//!
//! Recognises bare/backticked identifiers, numeric literals, single-quoted
//! strings with standard escapes, operators, case-insensitive keywords,
//! `--` line comments (including the `-- housekeeper:<name>` directive
//! form), and `/* ... */` block comments.

use crate::error::{ParseError, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    QuotedIdent(String),
    Number(String),
    StringLiteral(String),
    /// `-- housekeeper:<name> <rest>`, captured whole so the parser can
    /// split it into a [`crate::ast::Directive`].
    Directive(String),
    // Punctuation / operators
    Comma,
    Dot,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,
    Arrow,
    Colon,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
    /// Original source slice, used by keyword matching (case-insensitive)
    /// and by error messages.
    pub text: String,
}

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) -> Result<Option<Token>, ParseError> {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.advance();
                }
                Some(b'-') if self.peek_at(1) == Some(b'-') => {
                    let start = self.position();
                    self.advance();
                    self.advance();
                    while self.peek_byte() == Some(b' ') {
                        self.advance();
                    }
                    let directive_start = self.pos;
                    let line_start = self.pos;
                    while !matches!(self.peek_byte(), None | Some(b'\n')) {
                        self.advance();
                    }
                    let line_text =
                        String::from_utf8_lossy(&self.src[line_start..self.pos]).to_string();
                    if let Some(rest) = line_text.strip_prefix("housekeeper:") {
                        let _ = directive_start;
                        return Ok(Some(Token {
                            kind: TokenKind::Directive(rest.trim().to_string()),
                            position: start,
                            text: format!("-- housekeeper:{rest}"),
                        }));
                    }
                    // ordinary comment: discard and keep scanning trivia
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.peek_byte() {
                            None => {
                                return Err(ParseError::new(
                                    self.position(),
                                    "*/",
                                    "end of input",
                                ))
                            }
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            _ => {
                                self.advance();
                            }
                        }
                    }
                }
                _ => return Ok(None),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        if let Some(directive) = self.skip_trivia()? {
            return Ok(directive);
        }

        let start = self.position();
        let Some(b) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position: start,
                text: String::new(),
            });
        };

        match b {
            b'`' => self.lex_backtick_ident(start),
            b'\'' => self.lex_string(start),
            b'"' => self.lex_double_quoted_ident(start),
            b'0'..=b'9' => self.lex_number(start),
            b'.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.lex_number(start),
            c if is_ident_start(c) => self.lex_ident(start),
            b',' => self.single(start, TokenKind::Comma),
            b'.' => self.single(start, TokenKind::Dot),
            b';' => self.single(start, TokenKind::Semicolon),
            b'(' => self.single(start, TokenKind::LParen),
            b')' => self.single(start, TokenKind::RParen),
            b'[' => self.single(start, TokenKind::LBracket),
            b']' => self.single(start, TokenKind::RBracket),
            b'{' => self.single(start, TokenKind::LBrace),
            b'}' => self.single(start, TokenKind::RBrace),
            b'+' => self.single(start, TokenKind::Plus),
            b'-' => self.single(start, TokenKind::Minus),
            b'*' => self.single(start, TokenKind::Star),
            b'/' => self.single(start, TokenKind::Slash),
            b'%' => self.single(start, TokenKind::Percent),
            b':' => self.single(start, TokenKind::Colon),
            b'=' => self.single(start, TokenKind::Eq),
            b'<' => {
                self.advance();
                match self.peek_byte() {
                    Some(b'=') => {
                        self.advance();
                        Ok(Token {
                            kind: TokenKind::LtEq,
                            position: start,
                            text: "<=".into(),
                        })
                    }
                    Some(b'>') => {
                        self.advance();
                        Ok(Token {
                            kind: TokenKind::NotEq,
                            position: start,
                            text: "<>".into(),
                        })
                    }
                    _ => Ok(Token {
                        kind: TokenKind::Lt,
                        position: start,
                        text: "<".into(),
                    }),
                }
            }
            b'>' => {
                self.advance();
                if self.peek_byte() == Some(b'=') {
                    self.advance();
                    Ok(Token {
                        kind: TokenKind::GtEq,
                        position: start,
                        text: ">=".into(),
                    })
                } else {
                    Ok(Token {
                        kind: TokenKind::Gt,
                        position: start,
                        text: ">".into(),
                    })
                }
            }
            b'!' if self.peek_at(1) == Some(b'=') => {
                self.advance();
                self.advance();
                Ok(Token {
                    kind: TokenKind::NotEq,
                    position: start,
                    text: "!=".into(),
                })
            }
            b'|' if self.peek_at(1) == Some(b'|') => {
                self.advance();
                self.advance();
                Ok(Token {
                    kind: TokenKind::Concat,
                    position: start,
                    text: "||".into(),
                })
            }
            _ => Err(ParseError::new(
                start,
                "a valid token",
                format!("'{}'", b as char),
            )),
        }
    }

    fn single(&mut self, start: Position, kind: TokenKind) -> Result<Token, ParseError> {
        let b = self.advance().unwrap();
        Ok(Token {
            kind,
            position: start,
            text: (b as char).to_string(),
        })
    }

    fn lex_backtick_ident(&mut self, start: Position) -> Result<Token, ParseError> {
        self.advance(); // opening backtick
        let content_start = self.pos;
        loop {
            match self.peek_byte() {
                None => return Err(ParseError::new(self.position(), "`", "end of input")),
                Some(b'`') => break,
                _ => {
                    self.advance();
                }
            }
        }
        let text = String::from_utf8_lossy(&self.src[content_start..self.pos]).to_string();
        self.advance(); // closing backtick
        Ok(Token {
            kind: TokenKind::QuotedIdent(text.clone()),
            position: start,
            text,
        })
    }

    fn lex_double_quoted_ident(&mut self, start: Position) -> Result<Token, ParseError> {
        self.advance();
        let content_start = self.pos;
        loop {
            match self.peek_byte() {
                None => return Err(ParseError::new(self.position(), "\"", "end of input")),
                Some(b'"') => break,
                _ => {
                    self.advance();
                }
            }
        }
        let text = String::from_utf8_lossy(&self.src[content_start..self.pos]).to_string();
        self.advance();
        Ok(Token {
            kind: TokenKind::QuotedIdent(text.clone()),
            position: start,
            text,
        })
    }

    fn lex_string(&mut self, start: Position) -> Result<Token, ParseError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.advance() {
                None => return Err(ParseError::new(self.position(), "'", "end of input")),
                Some(b'\'') => {
                    if self.peek_byte() == Some(b'\'') {
                        // doubled single-quote escape
                        self.advance();
                        value.push('\'');
                        continue;
                    }
                    break;
                }
                Some(b'\\') => match self.advance() {
                    Some(b'n') => value.push('\n'),
                    Some(b't') => value.push('\t'),
                    Some(b'r') => value.push('\r'),
                    Some(b'0') => value.push('\0'),
                    Some(b'\\') => value.push('\\'),
                    Some(b'\'') => value.push('\''),
                    Some(c) => value.push(c as char),
                    None => return Err(ParseError::new(self.position(), "escape", "end of input")),
                },
                Some(b) => value.push(b as char),
            }
        }
        Ok(Token {
            kind: TokenKind::StringLiteral(value.clone()),
            position: start,
            text: value,
        })
    }

    fn lex_number(&mut self, start: Position) -> Result<Token, ParseError> {
        let content_start = self.pos;
        let mut seen_dot = false;
        let mut seen_exp = false;
        loop {
            match self.peek_byte() {
                Some(c) if c.is_ascii_digit() => {
                    self.advance();
                }
                Some(b'.') if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    self.advance();
                }
                Some(c @ (b'e' | b'E')) if !seen_exp => {
                    seen_exp = true;
                    self.advance();
                    let _ = c;
                    if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        let text = String::from_utf8_lossy(&self.src[content_start..self.pos]).to_string();
        Ok(Token {
            kind: TokenKind::Number(text.clone()),
            position: start,
            text,
        })
    }

    fn lex_ident(&mut self, start: Position) -> Result<Token, ParseError> {
        let content_start = self.pos;
        while self.peek_byte().is_some_and(is_ident_continue) {
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[content_start..self.pos]).to_string();
        Ok(Token {
            kind: TokenKind::Ident(text.clone()),
            position: start,
            text,
        })
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'@'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'@' || b == b'$'
}

/// Tokenizes the full input, including a trailing `Eof`.
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let is_eof = tok.kind == TokenKind::Eof;
        tokens.push(tok);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
