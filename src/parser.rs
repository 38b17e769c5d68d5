use crate::ast::{
    BlockStatement, Expression, FunctionLiteral, Identifier, InfixOperator, PrefixOperator,
    Program, Statement,
};
use crate::lexer::{LexerError, Token, TokenKind};
use std::iter::Peekable;
use std::vec::IntoIter; // To iterate over Vec<Token>
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token '{found}' at {}, expected {expected}", .found.span)]
    UnexpectedToken { found: Token, expected: String },
    #[error("Unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    #[error("{0}")]
    LexerError(#[from] LexerError),
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, ParseError>;

/// Binding power of infix operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(kind: &TokenKind) -> Precedence {
        match kind {
            TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
            TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
            TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
            TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
            TokenKind::LParen => Precedence::Call,
            TokenKind::LBracket => Precedence::Index,
            _ => Precedence::Lowest,
        }
    }
}

fn infix_operator(kind: &TokenKind) -> Option<InfixOperator> {
    Some(match kind {
        TokenKind::Plus => InfixOperator::Plus,
        TokenKind::Minus => InfixOperator::Minus,
        TokenKind::Asterisk => InfixOperator::Asterisk,
        TokenKind::Slash => InfixOperator::Slash,
        TokenKind::Lt => InfixOperator::Lt,
        TokenKind::Gt => InfixOperator::Gt,
        TokenKind::Eq => InfixOperator::Eq,
        TokenKind::NotEq => InfixOperator::NotEq,
        _ => return None,
    })
}

pub struct Parser {
    // We iterate over owned Tokens, consuming them.
    tokens: Peekable<IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
        }
    }

    // Consumes the next token if available.
    fn next_token(&mut self) -> Option<Token> {
        self.tokens.next()
    }

    fn peek_kind(&mut self) -> Option<&TokenKind> {
        self.tokens.peek().map(|token| &token.kind)
    }

    fn peek_precedence(&mut self) -> Precedence {
        self.peek_kind().map_or(Precedence::Lowest, Precedence::of)
    }

    // Consumes the next token only if it is `kind`.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.tokens.next_if(|token| &token.kind == kind).is_some()
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        match self.next_token() {
            Some(token) if token.kind == kind => Ok(token),
            Some(found) => Err(ParseError::UnexpectedToken {
                found,
                expected: expected.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof(expected.to_string())),
        }
    }

    /// Parses every statement up to the end of input.
    pub fn parse(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        while self.tokens.peek().is_some() {
            statements.push(self.parse_statement()?);
        }
        Ok(Program { statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let statement = match self.peek_kind() {
            Some(TokenKind::Let) => {
                self.next_token();
                let name = self.parse_identifier()?;
                self.expect(TokenKind::Assign, "'='")?;
                let value = self.parse_expression(Precedence::Lowest)?;
                Statement::Let { name, value }
            }
            Some(TokenKind::Return) => {
                self.next_token();
                Statement::Return(self.parse_expression(Precedence::Lowest)?)
            }
            _ => Statement::Expression(self.parse_expression(Precedence::Lowest)?),
        };
        // Semicolons are optional
        self.eat(&TokenKind::Semicolon);
        Ok(statement)
    }

    fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                Some(TokenKind::RBrace) => {
                    self.next_token();
                    return Ok(BlockStatement { statements });
                }
                Some(_) => statements.push(self.parse_statement()?),
                None => return Err(ParseError::UnexpectedEof("'}'".to_string())),
            }
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<Identifier> {
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Ident(name),
                ..
            }) => Ok(Identifier(name)),
            Some(found) => Err(ParseError::UnexpectedToken {
                found,
                expected: "an identifier".to_string(),
            }),
            None => Err(ParseError::UnexpectedEof("an identifier".to_string())),
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expression> {
        let token = self
            .next_token()
            .ok_or_else(|| ParseError::UnexpectedEof("an expression".to_string()))?;
        let mut left = self.parse_prefix(token)?;
        while precedence < self.peek_precedence() {
            match self.next_token() {
                Some(token) => left = self.parse_infix(left, token)?,
                None => break,
            }
        }
        Ok(left)
    }

    fn parse_prefix(&mut self, token: Token) -> ParseResult<Expression> {
        Ok(match token.kind {
            TokenKind::Ident(name) => Expression::Identifier(Identifier(name)),
            TokenKind::Int(value) => Expression::Integer(value),
            TokenKind::String(value) => Expression::String(value),
            TokenKind::Boolean(value) => Expression::Boolean(value),
            TokenKind::Bang => {
                Expression::prefix(PrefixOperator::Bang, self.parse_expression(Precedence::Prefix)?)
            }
            TokenKind::Minus => Expression::prefix(
                PrefixOperator::Minus,
                self.parse_expression(Precedence::Prefix)?,
            ),
            TokenKind::LParen => {
                let expression = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RParen, "')'")?;
                expression
            }
            TokenKind::If => self.parse_if_expression()?,
            TokenKind::Function => Expression::Function(self.parse_function_literal()?),
            TokenKind::Macro => Expression::Macro(self.parse_function_literal()?),
            TokenKind::LBracket => {
                Expression::Array(self.parse_expression_list(TokenKind::RBracket)?)
            }
            TokenKind::LBrace => self.parse_hash_literal()?,
            kind => {
                return Err(ParseError::UnexpectedToken {
                    found: Token {
                        kind,
                        span: token.span,
                    },
                    expected: "an expression".to_string(),
                });
            }
        })
    }

    fn parse_infix(&mut self, left: Expression, token: Token) -> ParseResult<Expression> {
        match token.kind {
            TokenKind::LParen => Ok(Expression::call(
                left,
                self.parse_expression_list(TokenKind::RParen)?,
            )),
            TokenKind::LBracket => {
                let index = self.parse_expression(Precedence::Lowest)?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expression::index(left, index))
            }
            ref kind => match infix_operator(kind) {
                Some(operator) => {
                    let right = self.parse_expression(Precedence::of(kind))?;
                    Ok(Expression::infix(left, operator, right))
                }
                None => Err(ParseError::UnexpectedToken {
                    found: token,
                    expected: "an operator".to_string(),
                }),
            },
        }
    }

    // After a list item: `true` on a comma, `false` on the closing token.
    fn list_separator(&mut self, end: &TokenKind) -> ParseResult<bool> {
        let expected = format!("',' or '{}'", end);
        match self.next_token() {
            Some(Token {
                kind: TokenKind::Comma,
                ..
            }) => Ok(true),
            Some(token) if &token.kind == end => Ok(false),
            Some(found) => Err(ParseError::UnexpectedToken { found, expected }),
            None => Err(ParseError::UnexpectedEof(expected)),
        }
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> ParseResult<Vec<Expression>> {
        let mut expressions = Vec::new();
        if self.eat(&end) {
            return Ok(expressions);
        }
        loop {
            expressions.push(self.parse_expression(Precedence::Lowest)?);
            if !self.list_separator(&end)? {
                return Ok(expressions);
            }
        }
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expression> {
        let mut pairs = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(Expression::Hash(pairs));
        }
        loop {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.list_separator(&TokenKind::RBrace)? {
                return Ok(Expression::Hash(pairs));
            }
        }
    }

    fn parse_if_expression(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen, "'(' after 'if'")?;
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::RParen, "')'")?;
        let consequence = self.parse_block()?;
        let alternative = if self.eat(&TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Expression::If {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    /// Parameters and body, shared by `fn` and `macro`.
    fn parse_function_literal(&mut self) -> ParseResult<FunctionLiteral> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut parameters = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                parameters.push(self.parse_identifier()?);
                if !self.list_separator(&TokenKind::RParen)? {
                    break;
                }
            }
        }
        let body = self.parse_block()?;
        Ok(FunctionLiteral { parameters, body })
    }
}

// Helper function to lex and parse a string directly (useful for tests and REPL)
pub fn parse_str(input: &str) -> ParseResult<Program> {
    let tokens = crate::lexer::tokenize(input)?;
    Parser::new(tokens).parse()
}
