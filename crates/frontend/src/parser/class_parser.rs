use std::rc::Rc;

use super::errors_parser::ParserError;
use super::Parser;

use super::{StatementKind, TokenKind};

impl Parser {
    // Class declarations are:
    // class Planet {
    //    init(mass) {
    //      this.mass = mass
    //    }
    //
    //    weight(g number) number {
    //      return this.mass * g
    //    }
    // }
    // Only methods live in the body, fields are created on assignment
    pub(super) fn parse_class_declaration(&mut self) -> Result<StatementKind, ParserError> {
        // We eat class keyword
        self.expect_token(TokenKind::Class)?;

        let identifier = self
            .expect_token(TokenKind::Identifier)
            .map_err(|_| ParserError::MissingClassName)?;

        self.expect_token(TokenKind::OpenBrace)
            .map_err(|_| ParserError::MissingOpenBrace(format!("class {}", identifier.value)))?;

        let mut methods = Vec::new();

        while self.at().kind != TokenKind::CloseBrace {
            match self.at().kind {
                // 'func' keyword is tolerated before a method name
                TokenKind::Func => {
                    self.eat()?;
                }
                TokenKind::Identifier => {
                    let name = self.eat()?.value;
                    methods.push(Rc::new(self.parse_fn_rest(Some(name))?));
                }
                TokenKind::EOF => return Err(ParserError::UnclosedBlock),
                _ => return Err(ParserError::ExpectedMethod(self.at().value.clone())),
            }
        }

        // We eat the '}'
        self.eat()?;

        Ok(StatementKind::ClassDeclaration {
            name: identifier.value,
            methods,
        })
    }
}
