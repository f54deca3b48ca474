use super::errors_parser::ParserError;
use super::{Parser, StatementKind, TokenKind};

impl Parser {
    // { stmt stmt ... }
    pub(super) fn parse_block(&mut self) -> Result<StatementKind, ParserError> {
        self.parse_block_owned_by("block")
    }

    // Statements between braces. Shared by blocks and function bodies, only
    // the caller decides if it becomes a scope of its own
    pub(super) fn parse_braced_body(&mut self, owner: &str) -> Result<Vec<StatementKind>, ParserError> {
        self.expect_token(TokenKind::OpenBrace)
            .map_err(|_| ParserError::MissingOpenBrace(owner.into()))?;

        let mut body: Vec<StatementKind> = Vec::new();

        while self.at().kind != TokenKind::CloseBrace {
            if self.is_eof() {
                return Err(ParserError::UnclosedBlock);
            }

            body.push(self.parse_statement()?);
        }

        // We eat the '}'
        self.eat()?;

        Ok(body)
    }

    // if cond { ... } else if cond { ... } else { ... }
    pub(super) fn parse_if(&mut self) -> Result<StatementKind, ParserError> {
        self.expect_token(TokenKind::If)?;

        let test = self.parse_expression()?;
        let consequent = self.parse_block_owned_by("if")?;

        let alternate = if self.at().kind == TokenKind::Else {
            self.eat()?;

            // 'else if' chains the next condition without opening a scope
            if self.at().kind == TokenKind::If {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block_owned_by("else")?))
            }
        } else {
            None
        };

        Ok(StatementKind::If {
            test,
            consequent: Box::new(consequent),
            alternate,
        })
    }

    // while cond { ... }
    pub(super) fn parse_while(&mut self) -> Result<StatementKind, ParserError> {
        self.expect_token(TokenKind::While)?;

        let test = self.parse_expression()?;
        let body = self.parse_block_owned_by("while")?;

        Ok(StatementKind::While {
            test,
            body: Box::new(body),
        })
    }

    fn parse_block_owned_by(&mut self, owner: &str) -> Result<StatementKind, ParserError> {
        Ok(StatementKind::Block(self.parse_braced_body(owner)?))
    }
}
