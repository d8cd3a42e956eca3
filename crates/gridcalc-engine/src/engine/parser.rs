//! Formula parser
//!
//! A recursive descent parser over the token list produced by
//! [`tokenize`](super::lexer::tokenize). Precedence, low to high:
//!
//! ```text
//! expression := term (('+'|'-') term)*
//! term       := unary (('*'|'/') unary)*
//! unary      := ('+'|'-') unary | primary
//! primary    := number | cellRef | identifier '(' [argument (',' argument)*] ')' | '(' expression ')'
//! argument   := cellRef ':' cellRef | expression
//! ```

use super::ast::{BinaryOp, Expr, Reference, UnaryOp};
use super::lexer::{Token, tokenize};
use crate::error::{FormulaError, FormulaResult};

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parse formula text (without the leading `=`) into an AST.
///
/// # Example
/// ```
/// use gridcalc_engine::engine::{parse_formula, DEFAULT_MAX_DEPTH};
///
/// assert!(parse_formula("SUM(A1:A10) / 2", DEFAULT_MAX_DEPTH).is_ok());
/// assert!(parse_formula("1+", DEFAULT_MAX_DEPTH).is_err());
/// ```
pub fn parse_formula(text: &str, max_depth: usize) -> FormulaResult<Expr> {
    let tokens = tokenize(text);
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
    };

    if parser.current() == &Token::Eof {
        return Err(FormulaError::Empty);
    }

    let expr = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current() != &Token::Eof {
        return Err(FormulaError::TrailingInput(parser.current().text().to_string()));
    }

    Ok(expr)
}

/// Check whether cell text is a well-formed formula.
///
/// Accepts the text with or without its leading `=`.
pub fn validate_formula(text: &str) -> FormulaResult<Expr> {
    let body = text.strip_prefix('=').unwrap_or(text);
    parse_formula(body, DEFAULT_MAX_DEPTH)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        // The list always ends with Eof; clamp so lookahead past it stays on Eof.
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &'static str) -> FormulaError {
        match self.current() {
            Token::Eof => FormulaError::UnexpectedEnd { expected },
            tok => FormulaError::UnexpectedToken {
                found: tok.text().to_string(),
                expected,
            },
        }
    }

    fn expect(&mut self, want: &Token, expected: &'static str) -> FormulaResult<()> {
        if self.current() == want {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(FormulaError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_expression(&mut self) -> FormulaResult<Expr> {
        self.enter()?;
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current() {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.leave();
        Ok(left)
    }

    fn parse_term(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        let op = match self.current() {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Negate,
            _ => return self.parse_primary(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> FormulaResult<Expr> {
        match self.advance() {
            // "." or an out-of-range literal still parses; it evaluates as non-numeric.
            Token::Number(text) => Ok(Expr::Number(text.parse().unwrap_or(f64::NAN))),
            Token::CellRef(text) => Ok(Expr::CellRef(Reference::new(&text))),
            Token::Ident(name) => self.parse_function_call(name),
            Token::LParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Eof => Err(FormulaError::UnexpectedEnd {
                expected: "a value",
            }),
            tok => Err(FormulaError::UnexpectedToken {
                found: tok.text().to_string(),
                expected: "a value",
            }),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<Expr> {
        self.expect(&Token::LParen, "'(' after function name")?;

        let mut args = Vec::new();

        if self.current() != &Token::RParen {
            args.push(self.parse_argument()?);

            while self.current() == &Token::Comma {
                self.advance();
                args.push(self.parse_argument()?);
            }
        }

        self.expect(&Token::RParen, "',' or ')'")?;

        Ok(Expr::Function { name, args })
    }

    fn parse_argument(&mut self) -> FormulaResult<Expr> {
        let range = match (self.peek(0), self.peek(1), self.peek(2)) {
            (Token::CellRef(start), Token::Colon, Token::CellRef(end)) => Some(Expr::Range {
                start: Reference::new(start),
                end: Reference::new(end),
            }),
            _ => None,
        };
        match range {
            Some(range) => {
                self.pos += 3;
                Ok(range)
            }
            None => self.parse_expression(),
        }
    }
}
