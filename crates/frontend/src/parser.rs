use std::collections::VecDeque;

mod class_parser;
mod errors_parser;
mod flow_parser;
mod fn_parser;
mod var_parser;

pub use crate::ast::{
    ASTNode, BinaryOperator, ExpressionKind, LogicalOperator, Program, StatementKind,
    UnaryOperator,
};
pub use crate::lexer::{Token, TokenKind};
pub use self::errors_parser::ParserError;

use tools::errors::{CodeErr, ReportCodeErr};

// Returned by `at` once the stream is exhausted
static EOF_TOKEN: Token = Token {
    kind: TokenKind::EOF,
    value: String::new(),
    line: 0,
};

#[derive(Default)]
pub struct Parser {
    tokens: VecDeque<Token>,
}

impl Parser {
    pub fn build_ast(&mut self, tokens: VecDeque<Token>) -> Result<Program, CodeErr> {
        self.tokens = tokens;
        let mut nodes: Vec<ASTNode> = Vec::new();

        while !self.is_eof() {
            // A statement is reported on the line it starts
            let line = self.at().line;

            let stmt = self.parse_statement().map_err(|e| e.to_glob_err(line))?;

            nodes.push(ASTNode::new(stmt, line));
        }

        Ok(Program::new(nodes))
    }

    // Entry point of parsing
    pub(crate) fn parse_statement(&mut self) -> Result<StatementKind, ParserError> {
        match self.at().kind {
            TokenKind::Func => self.parse_fn_declaration(),
            TokenKind::Class => self.parse_class_declaration(),
            TokenKind::Return => self.parse_return(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::OpenBrace => self.parse_block(),
            // Any expression may turn out to be the target of '=', ':=' or '++'
            _ => self.parse_var_statement(),
        }
    }

    pub(crate) fn parse_expression(&mut self) -> Result<ExpressionKind, ParserError> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        let mut left = self.parse_and_expr()?;

        while self.at().kind == TokenKind::LogicalOperator && self.at().value == "||" {
            self.eat()?;
            let right = self.parse_and_expr()?;

            left = ExpressionKind::Logical {
                left: Box::new(left),
                right: Box::new(right),
                operator: LogicalOperator::Or,
            };
        }

        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        let mut left = self.parse_equality_expr()?;

        while self.at().kind == TokenKind::LogicalOperator && self.at().value == "&&" {
            self.eat()?;
            let right = self.parse_equality_expr()?;

            left = ExpressionKind::Logical {
                left: Box::new(left),
                right: Box::new(right),
                operator: LogicalOperator::And,
            };
        }

        Ok(left)
    }

    fn parse_equality_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        self.parse_binary_level(&["==", "!="], Self::parse_relational_expr)
    }

    fn parse_relational_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        self.parse_binary_level(&["<", ">", "<=", ">="], Self::parse_additive_expr)
    }

    fn parse_additive_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative_expr)
    }

    fn parse_multiplicative_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        self.parse_binary_level(&["*", "/", "%", "**"], Self::parse_unary_expr)
    }

    // Left associative loop shared by every binary precedence level
    fn parse_binary_level(
        &mut self,
        symbols: &[&str],
        next: fn(&mut Self) -> Result<ExpressionKind, ParserError>,
    ) -> Result<ExpressionKind, ParserError> {
        let mut left = next(self)?;

        while self.at().kind == TokenKind::BinaryOperator
            && symbols.contains(&self.at().value.as_str())
        {
            let symbol = self.eat()?.value;
            let operator = BinaryOperator::from_symbol(&symbol)
                .ok_or(ParserError::UnexpectedToken(symbol))?;
            let right = next(self)?;

            left = ExpressionKind::binary(left, operator, right);
        }

        Ok(left)
    }

    fn parse_unary_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        let operator = match self.at().kind {
            TokenKind::Bang => UnaryOperator::Not,
            TokenKind::BinaryOperator if self.at().value == "-" => UnaryOperator::Negate,
            _ => return self.parse_call_member_expr(),
        };

        // We eat the operator
        self.eat()?;
        let operand = self.parse_unary_expr()?;

        Ok(ExpressionKind::Unary {
            operator,
            operand: Box::new(operand),
        })
    }

    // Parse recursivly expressions like: space.planet(2).position.x
    fn parse_call_member_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        let mut expr = self.parse_primary_expr()?;

        loop {
            match self.at().kind {
                TokenKind::Dot => {
                    // We eat the dot
                    self.eat()?;

                    let property = self
                        .expect_token(TokenKind::Identifier)
                        .map_err(|_| ParserError::MissingIdentifierAfterDot)?;

                    expr = ExpressionKind::member(expr, property.value);
                }
                TokenKind::OpenParen => {
                    let args = self.parse_call_args()?;
                    expr = ExpressionKind::call(expr, args);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    // (arg1, arg2, ...)
    fn parse_call_args(&mut self) -> Result<Vec<ExpressionKind>, ParserError> {
        self.expect_token(TokenKind::OpenParen)?;
        let mut args: Vec<ExpressionKind> = Vec::new();

        if self.at().kind != TokenKind::CloseParen {
            args.push(self.parse_expression()?);

            while self.at().kind == TokenKind::Comma {
                self.eat()?;
                args.push(self.parse_expression()?);
            }
        }

        self.expect_token(TokenKind::CloseParen)
            .map_err(|_| ParserError::MissingCloseParen)?;

        Ok(args)
    }

    fn parse_primary_expr(&mut self) -> Result<ExpressionKind, ParserError> {
        match self.at().kind {
            TokenKind::Number => {
                let number = self.eat()?.value;
                let value = number
                    .parse::<i64>()
                    .map_err(|_| ParserError::InvalidNumber(number))?;

                Ok(ExpressionKind::number(value))
            }
            TokenKind::String => Ok(ExpressionKind::string(self.eat()?.value)),
            TokenKind::True => {
                self.eat()?;
                Ok(ExpressionKind::boolean(true))
            }
            TokenKind::False => {
                self.eat()?;
                Ok(ExpressionKind::boolean(false))
            }
            TokenKind::Identifier => Ok(ExpressionKind::identifier(self.eat()?.value)),
            TokenKind::This => {
                self.eat()?;
                Ok(ExpressionKind::this())
            }
            TokenKind::OpenParen => {
                // Either an arrow function or a parenthesized expression
                if self.is_arrow_function() {
                    return self.parse_arrow_function();
                }

                self.eat()?;
                let expr = self.parse_expression()?;
                self.expect_token(TokenKind::CloseParen)
                    .map_err(|_| ParserError::MissingCloseParen)?;

                Ok(expr)
            }
            TokenKind::EOF => Err(ParserError::UnexpectedEof),
            _ => Err(ParserError::UnexpectedToken(self.at().value.clone())),
        }
    }

    // Looks ahead from a '(' to its matching ')' and checks for '=>', which
    // may follow a single return type: (a, b) number => ...
    fn is_arrow_function(&self) -> bool {
        let mut depth = 0usize;

        for (idx, tk) in self.tokens.iter().enumerate() {
            match tk.kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;

                    if depth == 0 {
                        let next = self.tokens.get(idx + 1).map(|t| t.kind);
                        let after = self.tokens.get(idx + 2).map(|t| t.kind);

                        return match (next, after) {
                            (Some(TokenKind::FatArrow), _) => true,
                            (Some(TokenKind::Identifier), Some(TokenKind::FatArrow)) => true,
                            _ => false,
                        };
                    }
                }
                TokenKind::EOF => return false,
                _ => {}
            }
        }

        false
    }

    pub(crate) fn at(&self) -> &Token {
        self.tokens.front().unwrap_or(&EOF_TOKEN)
    }

    // The final EOF token is never consumed
    pub(crate) fn eat(&mut self) -> Result<Token, ParserError> {
        if self.is_eof() {
            return Ok(self.at().clone());
        }

        match self.tokens.pop_front() {
            Some(tk) => Ok(tk),
            None => Err(ParserError::EmptyTokenBufferUsed),
        }
    }

    pub(crate) fn expect_token(&mut self, token_kind: TokenKind) -> Result<Token, ParserError> {
        if self.at().kind != token_kind {
            return Err(ParserError::FoundWrongToken(token_kind, self.at().kind));
        }

        self.eat()
    }

    // Is end of file
    pub(crate) fn is_eof(&self) -> bool {
        self.at().kind == TokenKind::EOF
    }
}
