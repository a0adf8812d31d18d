use std::fmt;

use crate::lexer::Position;

/// The kind of a lexical token, with the decoded payload for literals.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Decimal integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// Floating-point number, with a fraction, an exponent, or both
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// .5
    /// 1e-3
    /// ```
    Float(f64),

    /// Quoted string with escapes already decoded
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// 'it\'s'
    /// "double quotes work too"
    /// ```
    String(String),

    /// `true` or `false`
    Boolean(bool),

    /// Raw content between `#` delimiters; parsed later into a date
    ///
    /// # Examples
    /// ```text
    /// #2024-01-31#
    /// #12/31/1999 23:59#
    /// ```
    DateTime(String),

    // Identifiers
    /// Bare identifier: `[A-Za-z_][A-Za-z0-9_]*`
    Identifier(String),

    /// Bracketed name with the brackets stripped
    ///
    /// # Examples
    /// ```text
    /// [total price]
    /// [x-axis]
    /// ```
    Name(String),

    // Operators
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `||` or `or`
    Or,
    /// `&&` or `and`
    And,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `&`
    Ampersand,
    /// `==` or `=`
    Equal,
    /// `!=` or `<>`
    NotEqual,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `!` or `not`
    Not,
    /// `~`
    Tilde,
    /// `in`, membership test
    In,

    // Delimiters
    LParen,
    RParen,
    Comma,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Short description used in parse error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Integer(n) => format!("integer {}", n),
            TokenKind::Float(n) => format!("float {}", n),
            TokenKind::String(s) => format!("string '{}'", s),
            TokenKind::Boolean(b) => format!("'{}'", b),
            TokenKind::DateTime(s) => format!("date #{}#", s),
            TokenKind::Identifier(name) => format!("identifier '{}'", name),
            TokenKind::Name(name) => format!("name [{}]", name),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Or => "||",
            TokenKind::And => "&&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Ampersand => "&",
            TokenKind::Equal => "==",
            TokenKind::NotEqual => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::ShiftLeft => "<<",
            TokenKind::ShiftRight => ">>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Not => "!",
            TokenKind::Tilde => "~",
            TokenKind::In => "in",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            _ => "",
        }
    }
}

/// A token together with the exact source text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lexeme)
    }
}
