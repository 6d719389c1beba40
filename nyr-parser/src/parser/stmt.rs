use super::*;
use crate::ast::{Block, Identifier, Stmt, VariableDeclaration};

impl Parser {
    /// Parses statements until `EOF`.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.check(TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        Ok(Program { body })
    }

    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current_token.kind() {
            TokenKind::Semi => {
                self.next();
                Ok(Stmt::Empty)
            }
            TokenKind::OpenBrace => Ok(Stmt::Block {
                body: self.parse_block()?.body,
            }),
            TokenKind::Let => self.parse_variable_stmt(),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::Do => self.parse_do_while_stmt(),
            TokenKind::For => self.parse_for_stmt(),
            TokenKind::Def => self.parse_fn_declaration(),
            TokenKind::Return => self.parse_return_stmt(),
            TokenKind::Class => self.parse_class_declaration(),
            _ => {
                // expression statement
                let expression = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Expression { expression })
            }
        }
    }

    pub fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::OpenBrace)?;

        let mut body = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(Block { body })
    }

    fn parse_variable_stmt(&mut self) -> ParseResult<Stmt> {
        let stmt = self.parse_variable_declarations()?;
        self.expect(TokenKind::Semi)?;
        Ok(stmt)
    }

    /// Parses `let a = 1, b` without the trailing `;`. Also used by `for` initializers.
    fn parse_variable_declarations(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Let)?;

        let mut declarations = vec![self.parse_variable_declaration()?];
        while self.eat(TokenKind::Comma) {
            declarations.push(self.parse_variable_declaration()?);
        }

        Ok(Stmt::Variable { declarations })
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<VariableDeclaration> {
        let id = self.parse_identifier()?;
        let init = if self.check(TokenKind::Semi) || self.check(TokenKind::Comma) {
            None
        } else {
            self.expect(TokenKind::Equals)?;
            Some(self.parse_assignment_expr()?)
        };
        Ok(VariableDeclaration { id, init })
    }

    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::OpenParen)?;
        let test = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;

        let consequent = Box::new(self.parse_stmt()?);
        let alternative = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If {
            test,
            consequent,
            alternative,
        })
    }

    fn parse_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::OpenParen)?;
        let test = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::While { test, body })
    }

    fn parse_do_while_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Do)?;
        let body = Box::new(self.parse_stmt()?);
        self.expect(TokenKind::While)?;
        self.expect(TokenKind::OpenParen)?;
        let test = self.parse_expr()?;
        self.expect(TokenKind::CloseParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::DoWhile { body, test })
    }

    fn parse_for_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::For)?;
        self.expect(TokenKind::OpenParen)?;

        let init = match self.current_token.kind() {
            TokenKind::Semi => None,
            TokenKind::Let => Some(Box::new(self.parse_variable_declarations()?)),
            _ => Some(Box::new(Stmt::Expression {
                expression: self.parse_expr()?,
            })),
        };
        self.expect(TokenKind::Semi)?;

        let test = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi)?;

        let update = if self.check(TokenKind::CloseParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::CloseParen)?;

        let body = Box::new(self.parse_stmt()?);

        Ok(Stmt::For {
            init,
            test,
            update,
            body,
        })
    }

    fn parse_fn_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Def)?;
        let name = self.parse_identifier()?;

        self.expect(TokenKind::OpenParen)?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::CloseParen) {
            loop {
                params.push(self.parse_identifier()?);

                if self.eat(TokenKind::CloseParen) {
                    break;
                }
                self.expect(TokenKind::Comma)?;
            }
        }

        // Register before parsing the body so recursive calls resolve.
        log::trace!("registering function {}/{}", name.name, params.len());
        self.functions.insert(
            name.name.clone(),
            FunctionSignature {
                name: name.name.clone(),
                params: params.clone(),
            },
        );

        let body = self.parse_block()?;

        Ok(Stmt::Function { name, params, body })
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Return)?;
        let argument = if self.check(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi)?;
        Ok(Stmt::Return { argument })
    }

    fn parse_class_declaration(&mut self) -> ParseResult<Stmt> {
        self.expect(TokenKind::Class)?;
        let id = self.parse_identifier()?;
        let super_class: Option<Identifier> = if self.eat(TokenKind::Colon) {
            Some(self.parse_identifier()?)
        } else {
            None
        };
        let body = self.parse_block()?;
        Ok(Stmt::Class {
            id,
            super_class,
            body,
        })
    }
}
