use std::fmt;

use crate::lexer::Position;

/// Failure to tokenize the source text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character '{found}' at {position}")]
    UnexpectedChar { found: char, position: Position },

    #[error("unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{sequence}' at {position}")]
    InvalidEscape { sequence: String, position: Position },

    #[error("unterminated date literal starting at {position}")]
    UnterminatedDate { position: Position },

    #[error("unterminated bracketed name starting at {position}")]
    UnterminatedName { position: Position },

    #[error("integer literal '{literal}' is out of range at {position}")]
    IntegerOverflow { literal: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidEscape { position, .. }
            | LexError::UnterminatedDate { position }
            | LexError::UnterminatedName { position }
            | LexError::IntegerOverflow { position, .. } => *position,
        }
    }
}

/// A single syntax error recorded while parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        let position = e.position();
        ParseError {
            message: e.to_string(),
            position,
        }
    }
}

/// Every error recorded while compiling one source text.
///
/// Displays as the individual messages joined by newlines.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    errors: Vec<ParseError>,
}

impl CompileError {
    pub fn new(errors: Vec<ParseError>) -> Self {
        CompileError { errors }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::new(vec![e.into()])
    }
}

/// Failure inside the conversion service: no viable coercion, or an
/// operator applied to operands it does not support.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot convert {from} to {to}")]
    InvalidCast { from: &'static str, to: &'static str },

    #[error("operator '{op}' cannot be applied to {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("operator '{op}' cannot be applied to {operand}")]
    InvalidOperand { op: &'static str, operand: &'static str },

    #[error("attempted to divide by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in '{op}'")]
    Overflow { op: &'static str },

    #[error("invalid date literal '{0}'")]
    InvalidDateTime(String),
}

/// Errors raised while evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// The source text did not compile; carries every recorded message.
    #[error("{0}")]
    Compile(#[from] CompileError),

    #[error("parameter was not defined: {0}")]
    ParameterNotDefined(String),

    #[error("function not found: '{name}'{}", suggestion_suffix(.suggestion))]
    FunctionNotFound {
        name: String,
        suggestion: Option<&'static str>,
    },

    #[error("{function}() takes {} {expected} arguments. {provided} provided.", bound_word(.at_least))]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        provided: usize,
        at_least: bool,
    },

    #[error("when iterating parameters, every sequence must have the same number of items (expected {expected}, found {found} in '{parameter}')")]
    InconsistentIterableLength {
        parameter: String,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Failure raised by a host-supplied hook.
    #[error("{0}")]
    Host(String),
}

fn suggestion_suffix(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(s) => format!(". Try '{}' instead.", s),
        None => String::new(),
    }
}

fn bound_word(at_least: &bool) -> &'static str {
    if *at_least { "at least" } else { "exactly" }
}

impl EvalError {
    pub fn host(msg: impl Into<String>) -> Self {
        EvalError::Host(msg.into())
    }

    pub fn function_not_found(name: impl Into<String>) -> Self {
        EvalError::FunctionNotFound {
            name: name.into(),
            suggestion: None,
        }
    }
}
