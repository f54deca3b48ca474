use super::errors_parser::ParserError;
use super::Parser;

use super::TokenKind;
use super::{ExpressionKind, StatementKind};
use crate::ast::{UpdateOperator, Variable};

impl Parser {
    // Statements starting with an expression. Different possibilities:
    //  x := 5          declaration
    //  x = 5           assignment
    //  planet.mass = 5 member assignment
    //  x++  x--        update
    //  print(x)        plain expression
    pub(crate) fn parse_var_statement(&mut self) -> Result<StatementKind, ParserError> {
        let left = self.parse_expression()?;

        match self.at().kind {
            TokenKind::Declare => {
                self.eat()?;

                let ExpressionKind::Identifier { symbol, .. } = left else {
                    return Err(ParserError::InvalidDeclarationTarget);
                };

                Ok(StatementKind::VarDeclaration {
                    name: symbol,
                    value: self.parse_expression()?,
                })
            }
            TokenKind::Equals => {
                self.eat()?;
                let value = self.parse_expression()?;

                match left {
                    // The reference node keeps its id, the resolver annotates the target
                    ExpressionKind::Identifier { symbol, id } => Ok(StatementKind::VarAssignment {
                        target: Variable { name: symbol, id },
                        value,
                    }),
                    ExpressionKind::MemberCall { member, property } => Ok(StatementKind::SetMember {
                        object: *member,
                        property,
                        value,
                    }),
                    _ => Err(ParserError::InvalidAssignmentTarget),
                }
            }
            TokenKind::Increment | TokenKind::Decrement => {
                let operator = match self.eat()?.kind {
                    TokenKind::Increment => UpdateOperator::Increment,
                    _ => UpdateOperator::Decrement,
                };

                let ExpressionKind::Identifier { symbol, id } = left else {
                    return Err(ParserError::InvalidUpdateTarget);
                };

                Ok(StatementKind::Update {
                    target: Variable { name: symbol, id },
                    operator,
                })
            }
            _ => Ok(StatementKind::Expression(left)),
        }
    }
}
