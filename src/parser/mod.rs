pub mod ast;
pub mod visitor;

use crate::{
    lexer::{Token, TokenKind, Tokenizer},
    parser::ast::{BinaryOperator, Expr, Function, Ident, Program, Prototype},
};
use std::{fmt, fmt::Display, mem};
use thiserror::Error;
use tracing::debug;

/// Name of the zero-argument function hosting a bare top-level expression.
pub const ENTRY_FUNCTION_NAME: &str = "__main__";

/// The lowest binding power an operator can have.
const MIN_BINDING_POWER: u8 = 0;

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;

/// What the parser was looking for when it gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Identifier,
    OpenParen,
    CloseParen,
    /// `,` to continue a list or `)` to close it.
    ListSeparator,
    /// A number, an identifier or a parenthesized expression.
    Primary,
}

impl Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Identifier => write!(f, "identifier"),
            Construct::OpenParen => write!(f, "'('"),
            Construct::CloseParen => write!(f, "')'"),
            Construct::ListSeparator => write!(f, "',' or ')'"),
            Construct::Primary => write!(f, "number, identifier or '('"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("syntax error: expected {expected}, found {found}")]
    Syntax { expected: Construct, found: Token },

    #[error("expression nests deeper than {limit} levels at {found}")]
    TooDeep { limit: usize, found: Token },
}

impl ParseError {
    pub fn expected(&self) -> Option<Construct> {
        match self {
            ParseError::Syntax { expected, .. } => Some(*expected),
            ParseError::TooDeep { .. } => None,
        }
    }

    /// The token the parser stopped on. An `EndOfInput` token means the source ended too early.
    pub fn token(&self) -> &Token {
        match self {
            ParseError::Syntax { found, .. } | ParseError::TooDeep { found, .. } => found,
        }
    }
}

/// Wraps a bare top-level expression into the entry function.
pub fn synthesize_entry(body: Expr) -> Function {
    Function {
        prototype: Prototype::new(ENTRY_FUNCTION_NAME, vec![]),
        body,
    }
}

/// Recursive descent parser with one token of lookahead.
pub struct Parser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.next_token();

        Self {
            tokenizer,
            current,
            depth: 0,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Caps how deep an expression tree may grow before parsing fails with
    /// `ParseError::TooDeep`.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse_program(mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();

        loop {
            match self.current.kind {
                TokenKind::EndOfInput => break,
                TokenKind::Extern => {
                    let prototype = self.parse_extern()?;
                    debug!(%prototype, "parsed extern");
                    program.prototypes.push(prototype);
                }
                TokenKind::Def => {
                    let function = self.parse_definition()?;
                    debug!(prototype = %function.prototype, "parsed definition");
                    program.functions.push(function);
                }
                // Top-level semicolons only separate items.
                TokenKind::Symbol if self.current.is_symbol(';') => {
                    self.advance();
                }
                _ => {
                    let body = self.parse_expression()?;
                    debug!(%body, "parsed top-level expression");
                    program.functions.push(synthesize_entry(body));
                }
            }
        }

        Ok(program)
    }

    /// prototypeDecl := 'extern' IDENT '(' paramList? ')'
    fn parse_extern(&mut self) -> Result<Prototype, ParseError> {
        self.advance();
        self.parse_prototype()
    }

    /// functionDecl := 'def' IDENT '(' paramList? ')' expr
    fn parse_definition(&mut self) -> Result<Function, ParseError> {
        self.advance();
        let prototype = self.parse_prototype()?;
        let body = self.parse_expression()?;

        Ok(Function { prototype, body })
    }

    fn parse_prototype(&mut self) -> Result<Prototype, ParseError> {
        let function_name = self.expect_identifier()?;
        self.expect_symbol('(', Construct::OpenParen)?;
        let params = self.parse_list(Self::expect_identifier)?;

        Ok(Prototype {
            function_name,
            params,
        })
    }

    /// Parses `item (',' item)* ')'` or a lone `)`, the opening paren being already consumed.
    fn parse_list<T, F>(&mut self, mut item: F) -> Result<Vec<T>, ParseError>
    where
        F: FnMut(&mut Self) -> Result<T, ParseError>,
    {
        let mut items = vec![];

        if self.current.is_symbol(')') {
            self.advance();
            return Ok(items);
        }

        loop {
            items.push(item(self)?);

            match self.current.symbol() {
                Some(',') => {
                    self.advance();
                }
                Some(')') => {
                    self.advance();
                    return Ok(items);
                }
                _ => return Err(self.unexpected(Construct::ListSeparator)),
            }
        }
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary(MIN_BINDING_POWER)
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<Expr, ParseError> {
        let entry_depth = self.depth;
        let result = self.fold_binary(min_power);
        self.depth = entry_depth;

        result
    }

    /// Precedence climbing: operators binding at least `min_power` are folded
    /// into the left operand, and the right operand is parsed with a threshold
    /// one above the operator's own so equal powers group to the left.
    fn fold_binary(&mut self, min_power: u8) -> Result<Expr, ParseError> {
        self.descend()?;
        let mut lhs = self.parse_primary()?;

        while let Some(op) = self.peek_operator(min_power) {
            self.descend()?;
            self.advance();
            let rhs = self.parse_binary(op.binding_power() + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }

        Ok(lhs)
    }

    fn peek_operator(&self, min_power: u8) -> Option<BinaryOperator> {
        self.current
            .symbol()
            .and_then(BinaryOperator::from_symbol)
            .filter(|op| op.binding_power() >= min_power)
    }

    /// primary := NUMBER | IDENT ( '(' argList? ')' )? | '(' expr ')'
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind {
            TokenKind::Number => Ok(Expr::NumberLiteral(self.advance().value)),
            TokenKind::Identifier => self.parse_identifier_expression(),
            TokenKind::Symbol if self.current.is_symbol('(') => self.parse_paren(),
            _ => Err(self.unexpected(Construct::Primary)),
        }
    }

    fn parse_identifier_expression(&mut self) -> Result<Expr, ParseError> {
        let name = self.advance().value;

        if !self.current.is_symbol('(') {
            return Ok(Expr::VariableRef(name));
        }

        self.advance();
        let args = self.parse_list(Self::parse_expression)?;

        Ok(Expr::Call {
            function_name: name,
            args,
        })
    }

    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        self.advance();
        let expr = self.parse_expression()?;
        self.expect_symbol(')', Construct::CloseParen)?;

        Ok(expr)
    }

    fn expect_identifier(&mut self) -> Result<Ident, ParseError> {
        match self.current.kind {
            TokenKind::Identifier => Ok(self.advance().value),
            _ => Err(self.unexpected(Construct::Identifier)),
        }
    }

    fn expect_symbol(&mut self, symbol: char, expected: Construct) -> Result<(), ParseError> {
        if !self.current.is_symbol(symbol) {
            return Err(self.unexpected(expected));
        }
        self.advance();
        Ok(())
    }

    /// Each nested expression and each folded operator adds a level.
    fn descend(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
                found: self.current.clone(),
            });
        }
        Ok(())
    }

    /// Moves the lookahead forward and hands back the token it held.
    fn advance(&mut self) -> Token {
        let next = self.tokenizer.next_token();
        mem::replace(&mut self.current, next)
    }

    fn unexpected(&self, expected: Construct) -> ParseError {
        ParseError::Syntax {
            expected,
            found: self.current.clone(),
        }
    }
}

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    Parser::new(source).parse_program()
}
