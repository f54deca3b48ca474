use std::rc::Rc;

use super::errors_parser::ParserError;
use super::Parser;

use super::TokenKind;
use super::{ExpressionKind, StatementKind};
use crate::ast::{FunctionDecl, Param};

impl Parser {
    // Function declaration. The syntax is:
    // func add(x, y) {
    //    z := x + y
    //    return z * 2
    // }
    //
    // Typed version, types are only kept for the checker
    // func add(x number, y number) number { ... }
    pub(super) fn parse_fn_declaration(&mut self) -> Result<StatementKind, ParserError> {
        // We eat the 'func' keyword
        self.expect_token(TokenKind::Func)?;

        let identifier = self
            .expect_token(TokenKind::Identifier)
            .map_err(|_| ParserError::MissingFnName)?;

        let decl = self.parse_fn_rest(Some(identifier.value))?;

        Ok(StatementKind::FnDeclaration(Rc::new(decl)))
    }

    // Parameters, optional return type and body of a named function or a method
    pub(super) fn parse_fn_rest(&mut self, name: Option<String>) -> Result<FunctionDecl, ParserError> {
        let params = self.parse_params()?;
        let return_type = self.parse_optional_type();

        let owner = name.clone().unwrap_or_else(|| "function".into());
        let body = self.parse_braced_body(&owner)?;

        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
        })
    }

    // Arrow function: (a, b) => { ... } or (a number) number => { ... }
    pub(super) fn parse_arrow_function(&mut self) -> Result<ExpressionKind, ParserError> {
        let params = self.parse_params()?;
        let return_type = self.parse_optional_type();

        self.expect_token(TokenKind::FatArrow)
            .map_err(|_| ParserError::MissingFatArrow)?;

        let body = self.parse_braced_body("arrow function")?;

        Ok(ExpressionKind::Lambda(Rc::new(FunctionDecl {
            name: None,
            params,
            return_type,
            body,
        })))
    }

    // return
    // return expr
    pub(super) fn parse_return(&mut self) -> Result<StatementKind, ParserError> {
        self.expect_token(TokenKind::Return)?;

        // Nothing is returned when the block or the file ends right after
        let value = match self.at().kind {
            TokenKind::CloseBrace | TokenKind::EOF => None,
            _ => Some(self.parse_expression()?),
        };

        Ok(StatementKind::Return { value })
    }

    // Parse parameters in prototype like:
    //  (x, y number, z: Planet)
    fn parse_params(&mut self) -> Result<Vec<Param>, ParserError> {
        // We eat the open paren
        self.expect_token(TokenKind::OpenParen)?;
        let mut params: Vec<Param> = vec![];

        while self.at().kind != TokenKind::CloseParen {
            let name = self
                .expect_token(TokenKind::Identifier)
                .map_err(|_| ParserError::ExpectedParamName(self.at().value.clone()))?;

            // The colon before the type is optional
            if self.at().kind == TokenKind::Colon {
                self.eat()?;
            }

            params.push(Param {
                name: name.value,
                annotation: self.parse_optional_type(),
            });

            // Can't do func a(x y z) or func a(x, )
            match self.at().kind {
                TokenKind::Comma => {
                    self.eat()?;

                    if self.at().kind != TokenKind::Identifier {
                        return Err(ParserError::ExpectedParamName(self.at().value.clone()));
                    }
                }
                TokenKind::CloseParen => {}
                _ => return Err(ParserError::MissingCloseParen),
            }
        }

        // We eat the close paren
        self.eat()?;

        Ok(params)
    }

    fn parse_optional_type(&mut self) -> Option<String> {
        match self.at().kind {
            TokenKind::Identifier => self.eat().ok().map(|tk| tk.value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExpressionKind, Param, StatementKind};
    use crate::parser::tests::{parse, parse_stmts};
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_fn_declaration() {
        let stmts = parse_stmts("func add(a, b) { return a + b }");

        let StatementKind::FnDeclaration(decl) = &stmts[0] else {
            panic!("Expected function declaration");
        };
        assert_eq!(decl.name.as_deref(), Some("add"));
        assert_eq!(decl.params, vec![Param::new("a"), Param::new("b")]);
        assert_eq!(decl.return_type, None);
        assert!(matches!(decl.body[0], StatementKind::Return { value: Some(_) }));
    }

    #[test]
    fn parse_typed_fn_declaration() {
        let stmts = parse_stmts("func add(a number, b: number) number { return a + b }");

        let StatementKind::FnDeclaration(decl) = &stmts[0] else {
            panic!("Expected function declaration");
        };
        assert_eq!(decl.params[0].annotation.as_deref(), Some("number"));
        assert_eq!(decl.params[1].annotation.as_deref(), Some("number"));
        assert_eq!(decl.return_type.as_deref(), Some("number"));
    }

    #[test]
    fn parse_arrow_functions() {
        let stmts = parse_stmts("f := () => { return } g := (a number) number => { return a }");

        let StatementKind::VarDeclaration { value: ExpressionKind::Lambda(f), .. } = &stmts[0] else {
            panic!("Expected lambda");
        };
        assert!(f.params.is_empty());
        assert_eq!(f.body, vec![StatementKind::Return { value: None }]);
        assert_eq!(f.display_name(), "anonymous");

        let StatementKind::VarDeclaration { value: ExpressionKind::Lambda(g), .. } = &stmts[1] else {
            panic!("Expected lambda");
        };
        assert_eq!(g.params[0].name, "a");
        assert_eq!(g.return_type.as_deref(), Some("number"));
    }

    #[test]
    fn immediately_called_arrow() {
        let stmts = parse_stmts("((x) => { return x })(1)");

        assert!(matches!(
            &stmts[0],
            StatementKind::Expression(ExpressionKind::FunctionCall { caller, .. })
                if matches!(**caller, ExpressionKind::Lambda(_))
        ));
    }

    #[test]
    fn parse_fn_errors() {
        assert!(parse("func (a) {}").is_err());
        assert!(parse("func a(x, ) {}").is_err());
        assert!(parse("func a(x y z) {}").is_err());
        assert!(parse("func a(x) { return x").is_err());
        assert!(parse("f := (a) number =>").is_err());
    }
}
