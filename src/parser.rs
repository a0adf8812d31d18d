use crate::{
    ast::{BinOp, Expr, Token, TokenKind, UnaryOp},
    datetime::DateTime,
    error::{CompileError, LexError, ParseError},
    lexer::{Lexer, Position},
    value::Value,
};

/// Recursive-descent parser, one method per precedence level.
///
/// Syntax errors do not abort the parse. Each one is recorded with its
/// position and the parser recovers by pretending a missing token was
/// present, or by skipping an unexpected one, so a single pass reports
/// every problem it can find.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<ParseError>,
}

/// Parses `source` into a syntax tree.
///
/// # Examples
///
/// ```
/// use formula_lang::{ast::{BinOp, Expr}, parser};
///
/// let expr = parser::parse("1 + 2").unwrap();
/// assert_eq!(expr, Expr::binary(BinOp::Add, Expr::value(1), Expr::value(2)));
///
/// let err = parser::parse("1 +").unwrap_err();
/// assert_eq!(err.len(), 1);
/// ```
pub fn parse(source: &str) -> Result<Expr, CompileError> {
    if source.trim().is_empty() {
        return Err(CompileError::new(vec![ParseError::new(
            "expression can't be empty",
            Position::new(0, 1, 1),
        )]));
    }

    let mut parser = Parser::new(Lexer::new(source))?;
    parser.parse()
}

impl Parser {
    pub fn new(lexer: Lexer) -> Result<Self, LexError> {
        let tokens = lexer.tokenize()?;
        Ok(Parser {
            tokens,
            position: 0,
            errors: Vec::new(),
        })
    }

    /// Parses one complete expression followed by end of input.
    pub fn parse(&mut self) -> Result<Expr, CompileError> {
        let expr = self.parse_ternary();

        if !self.check(&TokenKind::Eof) {
            let token = self.current().clone();
            self.error_at(
                format!("extraneous input {} expecting end of input", token.kind.describe()),
                token.position,
            );
        }

        if self.errors.is_empty() {
            Ok(expr)
        } else {
            Err(CompileError::new(std::mem::take(&mut self.errors)))
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    fn current(&self) -> &Token {
        // `tokenize` always ends with Eof, and `advance` never moves past it.
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(kind)
    }

    fn error_at(&mut self, message: impl Into<String>, position: Position) {
        self.errors.push(ParseError::new(message, position));
    }

    /// Consumes `expected`, or records an error and carries on as if it
    /// had been present.
    fn expect(&mut self, expected: TokenKind) {
        if self.check(&expected) {
            self.advance();
        } else {
            let token = self.current().clone();
            self.error_at(
                format!(
                    "missing {} at {}",
                    expected.describe(),
                    token.kind.describe()
                ),
                token.position,
            );
        }
    }

    /// ternary → conditional ('?' conditional ':' conditional)?
    fn parse_ternary(&mut self) -> Expr {
        let condition = self.parse_conditional();

        if self.check(&TokenKind::Question) {
            self.advance();
            let when_true = self.parse_conditional();
            self.expect(TokenKind::Colon);
            let when_false = self.parse_conditional();
            return Expr::ternary(condition, when_true, when_false);
        }
        condition
    }

    /// conditional → booleanAnd (('||'|'or') conditional)*
    ///
    /// Each repetition recurses into `conditional`, so `a || b || c`
    /// groups as `a || (b || c)`.
    fn parse_conditional(&mut self) -> Expr {
        let mut left = self.parse_boolean_and();

        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_conditional();
            left = Expr::binary(BinOp::Or, left, right);
        }
        left
    }

    /// booleanAnd → bitwiseOr (('&&'|'and') bitwiseOr)*, right-associative
    fn parse_boolean_and(&mut self) -> Expr {
        let mut left = self.parse_bitwise_or();

        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_boolean_and();
            left = Expr::binary(BinOp::And, left, right);
        }
        left
    }

    fn parse_bitwise_or(&mut self) -> Expr {
        let mut left = self.parse_bitwise_xor();

        while self.check(&TokenKind::Pipe) {
            self.advance();
            let right = self.parse_bitwise_xor();
            left = Expr::binary(BinOp::BitwiseOr, left, right);
        }
        left
    }

    fn parse_bitwise_xor(&mut self) -> Expr {
        let mut left = self.parse_bitwise_and();

        while self.check(&TokenKind::Caret) {
            self.advance();
            let right = self.parse_bitwise_and();
            left = Expr::binary(BinOp::BitwiseXor, left, right);
        }
        left
    }

    fn parse_bitwise_and(&mut self) -> Expr {
        let mut left = self.parse_equality();

        while self.check(&TokenKind::Ampersand) {
            self.advance();
            let right = self.parse_equality();
            left = Expr::binary(BinOp::BitwiseAnd, left, right);
        }
        left
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_relational();

        loop {
            let op = match &self.current().kind {
                TokenKind::Equal => BinOp::Equal,
                TokenKind::NotEqual => BinOp::NotEqual,
                _ => break,
            };

            self.advance();
            let right = self.parse_relational();
            left = Expr::binary(op, left, right);
        }
        left
    }

    /// relational → shift (('<'|'<='|'>'|'>=') shift | 'in' callArgs)*
    fn parse_relational(&mut self) -> Expr {
        let mut left = self.parse_shift();

        loop {
            let op = match &self.current().kind {
                TokenKind::Lt => BinOp::Less,
                TokenKind::LtEq => BinOp::LessOrEqual,
                TokenKind::Gt => BinOp::Greater,
                TokenKind::GtEq => BinOp::GreaterOrEqual,
                TokenKind::In => {
                    // `x in (a, b)` is sugar for `In(x, a, b)`
                    self.advance();
                    let mut args = vec![left];
                    args.extend(self.parse_call_args());
                    left = Expr::call("In", args);
                    continue;
                }
                _ => break,
            };

            self.advance();
            let right = self.parse_shift();
            left = Expr::binary(op, left, right);
        }
        left
    }

    fn parse_shift(&mut self) -> Expr {
        let mut left = self.parse_additive();

        loop {
            let op = match &self.current().kind {
                TokenKind::ShiftLeft => BinOp::LeftShift,
                TokenKind::ShiftRight => BinOp::RightShift,
                _ => break,
            };

            self.advance();
            let right = self.parse_additive();
            left = Expr::binary(op, left, right);
        }
        left
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();

        loop {
            let op = match &self.current().kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative();
            left = Expr::binary(op, left, right);
        }
        left
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_unary();

        loop {
            let op = match &self.current().kind {
                TokenKind::Star => BinOp::Multiply,
                TokenKind::Slash => BinOp::Divide,
                TokenKind::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance();
            let right = self.parse_unary();
            left = Expr::binary(op, left, right);
        }
        left
    }

    /// unary → ('!'|'not') primary | '~' primary | '-' primary | primary
    ///
    /// The operand is a primary, so prefix operators do not stack without
    /// parentheses: `-(-1)` parses, `--1` does not.
    fn parse_unary(&mut self) -> Expr {
        let op = match &self.current().kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitwiseNot,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.parse_primary(),
        };

        self.advance();
        let operand = self.parse_primary();
        Expr::unary(op, operand)
    }

    /// primary → '(' ternary ')' | literal | identifier callArgs? | 'in' callArgs
    fn parse_primary(&mut self) -> Expr {
        let token = self.current().clone();

        match token.kind {
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_ternary();
                self.expect(TokenKind::RParen);
                expr
            }

            // Literals
            TokenKind::Integer(n) => {
                self.advance();
                Expr::Value(Value::Integer(n))
            }
            TokenKind::Float(n) => {
                self.advance();
                Expr::Value(Value::Float(n))
            }
            TokenKind::String(s) => {
                self.advance();
                Expr::Value(Value::String(s))
            }
            TokenKind::Boolean(b) => {
                self.advance();
                Expr::Value(Value::Boolean(b))
            }
            TokenKind::DateTime(text) => {
                self.advance();
                match DateTime::parse(&text) {
                    Ok(dt) => Expr::Value(Value::DateTime(dt)),
                    Err(e) => {
                        self.error_at(e.to_string(), token.position);
                        Expr::Value(Value::Null)
                    }
                }
            }

            // Identifiers, optionally called
            TokenKind::Identifier(name) | TokenKind::Name(name) => {
                self.advance();
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_call_args();
                    Expr::call(name, args)
                } else {
                    Expr::Identifier(name)
                }
            }
            TokenKind::In if self.peek_is(&TokenKind::LParen) => {
                self.advance();
                let args = self.parse_call_args();
                Expr::call("In", args)
            }

            _ => {
                self.error_at(
                    format!("unexpected {}", token.kind.describe()),
                    token.position,
                );
                // Skip the offending token so the parse keeps moving.
                if token.kind != TokenKind::Eof {
                    self.advance();
                }
                Expr::Value(Value::Null)
            }
        }
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.position + 1)
            .is_some_and(|t| std::mem::discriminant(&t.kind) == std::mem::discriminant(kind))
    }

    /// callArgs → '(' (ternary (',' ternary)*)? ')'
    fn parse_call_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();

        self.expect(TokenKind::LParen);

        if self.check(&TokenKind::RParen) {
            self.advance();
            return args;
        }

        loop {
            args.push(self.parse_ternary());

            if self.check(&TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }

        self.expect(TokenKind::RParen);
        args
    }
}

#[test]
fn test_boolean_and_is_right_associative() {
    let expr = parse("a and b and c").unwrap();
    assert_eq!(
        expr,
        Expr::binary(
            BinOp::And,
            Expr::identifier("a"),
            Expr::binary(BinOp::And, Expr::identifier("b"), Expr::identifier("c")),
        )
    );
}

#[test]
fn test_empty_source_is_an_error() {
    let err = parse("   ").unwrap_err();
    assert_eq!(err.errors()[0].message, "expression can't be empty");
}
