use std::fmt;

use crate::{
    ast::{Token, TokenKind},
    error::LexError,
};

/// Location of a token in the source text.
///
/// `offset` counts characters from the start of the input; `line` and
/// `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Position {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{}", self.line, self.column)
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenizes the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            self.position += 1;
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn here(&self) -> Position {
        Position::new(self.position, self.line, self.column)
    }

    fn lexeme_from(&self, start: Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if matches!(ch, ' ' | '\t' | '\r' | '\n' | '\x0C') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_digits(&mut self) {
        while self.current_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('\'') => result.push('\''),
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('u') => {
                            result.push(self.read_unicode_escape(escape_at)?);
                            continue;
                        }
                        Some(other) => {
                            return Err(LexError::InvalidEscape {
                                sequence: other.to_string(),
                                position: escape_at,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Reads `uXXXX` after a backslash; leaves the cursor past the last digit.
    fn read_unicode_escape(&mut self, escape_at: Position) -> Result<char, LexError> {
        self.advance(); // 'u'
        let mut hex = String::new();
        for _ in 0..4 {
            match self.current_char() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.advance();
                }
                _ => break,
            }
        }

        let decoded = if hex.len() == 4 {
            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
        } else {
            None
        };

        decoded.ok_or(LexError::InvalidEscape {
            sequence: format!("u{}", hex),
            position: escape_at,
        })
    }

    /// Reads everything up to `close`, consuming both delimiters.
    fn read_delimited(&mut self, close: char) -> Option<String> {
        self.advance(); // opening delimiter
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == close {
                return Some(result);
            }
            result.push(ch);
        }
        None
    }

    fn read_number(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let mut is_float = false;

        self.read_digits();

        if self.current_char() == Some('.') && self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            self.read_digits();
        }

        if matches!(self.current_char(), Some('e' | 'E')) {
            let has_exponent = match self.peek_char(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => self.peek_char(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                is_float = true;
                self.advance(); // e
                if matches!(self.current_char(), Some('+' | '-')) {
                    self.advance();
                }
                self.read_digits();
            }
        }

        let text = self.lexeme_from(start);
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|_| LexError::UnexpectedChar {
                    found: text.chars().next().unwrap_or('.'),
                    position: start,
                })
        } else {
            text.parse::<i64>()
                .map(TokenKind::Integer)
                .map_err(|_| LexError::IntegerOverflow {
                    literal: text,
                    position: start,
                })
        }
    }

    /// Consumes one character and yields `kind`.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes two characters and yields `kind`.
    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        self.advance();
        kind
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let start = self.here();

        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('?') => self.single(TokenKind::Question),
            Some(':') => self.single(TokenKind::Colon),
            Some('|') => {
                if self.peek_char(1) == Some('|') {
                    self.double(TokenKind::Or)
                } else {
                    self.single(TokenKind::Pipe)
                }
            }
            Some('&') => {
                if self.peek_char(1) == Some('&') {
                    self.double(TokenKind::And)
                } else {
                    self.single(TokenKind::Ampersand)
                }
            }
            Some('^') => self.single(TokenKind::Caret),
            Some('=') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::Equal)
                } else {
                    self.single(TokenKind::Equal)
                }
            }
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.double(TokenKind::NotEqual)
                } else {
                    self.single(TokenKind::Not)
                }
            }
            Some('<') => match self.peek_char(1) {
                Some('=') => self.double(TokenKind::LtEq),
                Some('<') => self.double(TokenKind::ShiftLeft),
                Some('>') => self.double(TokenKind::NotEqual),
                _ => self.single(TokenKind::Lt),
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.double(TokenKind::GtEq),
                Some('>') => self.double(TokenKind::ShiftRight),
                _ => self.single(TokenKind::Gt),
            },
            Some('+') => self.single(TokenKind::Plus),
            Some('-') => self.single(TokenKind::Minus),
            Some('*') => self.single(TokenKind::Star),
            Some('/') => self.single(TokenKind::Slash),
            Some('%') => self.single(TokenKind::Percent),
            Some('~') => self.single(TokenKind::Tilde),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some(',') => self.single(TokenKind::Comma),
            Some(quote @ ('\'' | '"')) => TokenKind::String(self.read_string(quote)?),
            Some('#') => match self.read_delimited('#') {
                Some(content) => TokenKind::DateTime(content),
                None => return Err(LexError::UnterminatedDate { position: start }),
            },
            Some('[') => match self.read_delimited(']') {
                Some(content) => TokenKind::Name(content),
                None => return Err(LexError::UnterminatedName { position: start }),
            },
            Some(ch) if ch.is_ascii_digit() => self.read_number(start)?,
            Some('.') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number(start)?
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "true" => TokenKind::Boolean(true),
                    "false" => TokenKind::Boolean(false),
                    "and" => TokenKind::And,
                    "or" => TokenKind::Or,
                    "not" => TokenKind::Not,
                    "in" => TokenKind::In,
                    _ => TokenKind::Identifier(ident),
                }
            }
            Some(ch) => {
                return Err(LexError::UnexpectedChar {
                    found: ch,
                    position: start,
                });
            }
        };

        Ok(Token::new(kind, self.lexeme_from(start), start))
    }
}
