//! Recursive-descent parser over a streaming [`Lexer`].
//!
//! Statements dispatch on the current token; expressions use one level of
//! precedence climbing per operator tier, assignment lowest and postfix
//! chains (call / index / property) highest. The parser keeps a single
//! token of lookahead and fails fast on the first mismatch.

use idzey_lexer::Lexer;
use idzey_syntax::ast::{BinaryOp, Block, Expr, Literal, Stmt, UnaryOp};
use idzey_syntax::error::{error_at, Result};
use idzey_syntax::token::{Token, TokenKind};

pub struct Parser {
    lexer: Lexer,
    current: Token,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let current = lexer.next_token();
        Self { lexer, current }
    }

    /// Parse the whole program into its top-level block.
    pub fn parse(&mut self) -> Result<Block> {
        let mut statements = Vec::new();
        while self.current.kind != TokenKind::Eof {
            statements.push(self.parse_statement()?);
        }
        Ok(Block { statements })
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<()> {
        self.bail_on_lex_error()?;
        if self.current.kind == kind {
            self.advance();
            Ok(())
        } else {
            error_at(
                self.current.line,
                self.current.col,
                format!("{}. Found: {}", message, self.current.kind.name()),
            )
        }
    }

    fn expect_identifier(&mut self, message: &str) -> Result<String> {
        self.bail_on_lex_error()?;
        if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            error_at(
                self.current.line,
                self.current.col,
                format!("{}. Found: {}", message, self.current.kind.name()),
            )
        }
    }

    /// Surface the first lexical error token as a parse error.
    fn bail_on_lex_error(&self) -> Result<()> {
        if let TokenKind::Error(message) = &self.current.kind {
            return error_at(self.current.line, self.current.col, message.clone());
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> Result<Stmt> {
        self.bail_on_lex_error()?;
        match self.current.kind {
            TokenKind::LBrace => Ok(Stmt::Block(self.parse_block()?)),
            TokenKind::Var => self.parse_var_declaration(),
            TokenKind::Func => self.parse_function_declaration(),
            TokenKind::Loop => self.parse_loop(),
            TokenKind::If => self.parse_if(),
            TokenKind::Print | TokenKind::Println => self.parse_print(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => self.parse_break(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> Result<Block> {
        self.consume(TokenKind::LBrace, "Expected '{' to start block")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RBrace, "Expected '}' to end block")?;
        Ok(Block { statements })
    }

    fn parse_var_declaration(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Var, "Expected 'var' keyword")?;
        let name = self.expect_identifier("Expected variable name")?;

        let is_array = if self.eat(&TokenKind::LBracket) {
            self.consume(TokenKind::RBracket, "Expected ']' after '['")?;
            true
        } else {
            false
        };

        let initializer = if self.eat(&TokenKind::Assign) {
            if is_array && self.eat(&TokenKind::LBracket) {
                Some(self.parse_array_elements()?)
            } else {
                Some(self.parse_expression()?)
            }
        } else if is_array {
            Some(Expr::Array(Vec::new()))
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Ok(Stmt::VarDecl {
            name,
            initializer,
            is_array,
        })
    }

    fn parse_function_declaration(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Func, "Expected 'func' keyword")?;
        let name = self.expect_identifier("Expected function name")?;

        self.consume(TokenKind::LParen, "Expected '(' after function name")?;
        let params = self.parse_parameters()?;
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        let body = if self.check(&TokenKind::LBrace) {
            self.parse_block()?
        } else {
            // forward declaration: empty body
            self.consume(
                TokenKind::Semicolon,
                "Expected ';' or block after function declaration",
            )?;
            Block::default()
        };

        Ok(Stmt::FuncDecl { name, params, body })
    }

    fn parse_parameters(&mut self) -> Result<Vec<String>> {
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.expect_identifier("Expected parameter name")?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        Ok(params)
    }

    /// `loop { ... }`, `loop (cond) { ... }`, or
    /// `loop (init?; cond?; incr?) { ... }`. A header opening with `var`
    /// or `;` selects the three-part form.
    fn parse_loop(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Loop, "Expected 'loop' keyword")?;

        let mut init = None;
        let mut condition = None;
        let mut increment = None;

        if self.eat(&TokenKind::LParen) {
            if !self.check(&TokenKind::RParen) {
                if self.check(&TokenKind::Var) || self.check(&TokenKind::Semicolon) {
                    if self.check(&TokenKind::Var) {
                        // consumes the terminating ';' itself
                        init = Some(Box::new(self.parse_var_declaration()?));
                    } else {
                        self.advance();
                    }

                    if !self.check(&TokenKind::Semicolon) && !self.check(&TokenKind::RParen) {
                        condition = Some(self.parse_expression()?);
                    }

                    if self.eat(&TokenKind::Semicolon) && !self.check(&TokenKind::RParen) {
                        increment = Some(self.parse_expression()?);
                    }
                } else {
                    condition = Some(self.parse_expression()?);
                }
            }
            self.consume(TokenKind::RParen, "Expected ')' after loop header")?;
        }

        let body = self.parse_block()?;
        Ok(Stmt::Loop {
            init,
            condition,
            increment,
            body,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::If, "Expected 'if' keyword")?;
        self.consume(TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RParen, "Expected ')' after condition")?;

        let then_branch = self.parse_block()?;

        let else_branch = if self.eat(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(Block {
                    statements: vec![self.parse_if()?],
                })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Both surface forms: `print "text" + expr ;` and
    /// `print(expr, expr, ...);`, likewise for `println`.
    fn parse_print(&mut self) -> Result<Stmt> {
        let newline = self.current.kind == TokenKind::Println;
        self.advance();

        if let TokenKind::Str(text) = &self.current.kind {
            let mut expr = Expr::Literal(Literal::Str(text.clone()));
            self.advance();

            while self.eat(&TokenKind::Plus) {
                expr = Expr::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(expr),
                    right: Box::new(self.parse_expression()?),
                };
            }

            self.consume(TokenKind::Semicolon, "Expected ';' after print statement")?;
            return Ok(Stmt::Print {
                newline,
                args: vec![expr],
            });
        }

        self.consume(TokenKind::LParen, "Expected '(' or string after print")?;
        let args = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(TokenKind::RParen, "Expected ')' after print arguments")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after print statement")?;

        Ok(Stmt::Print { newline, args })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Return, "Expected 'return' keyword")?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after return statement")?;
        Ok(Stmt::Return(value))
    }

    fn parse_break(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::Break, "Expected 'break' keyword")?;
        self.consume(TokenKind::Semicolon, "Expected ';' after 'break'")?;
        Ok(Stmt::Break)
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt> {
        let expr = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
        Ok(Stmt::ExprStmt(expr))
    }

    /// Parse a single expression (entry point shared with tests).
    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Expr> {
        let expr = self.parse_logical_or()?;

        if self.eat(&TokenKind::Assign) {
            let right = self.parse_assignment()?;
            return Ok(Expr::Binary {
                op: BinaryOp::Assign,
                left: Box::new(expr),
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_logical_or(&mut self) -> Result<Expr> {
        let mut expr = self.parse_logical_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_logical_and()?;
            expr = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_logical_and(&mut self) -> Result<Expr> {
        let mut expr = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            expr = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Less => BinaryOp::Lt,
                TokenKind::LessEq => BinaryOp::Le,
                TokenKind::Greater => BinaryOp::Gt,
                TokenKind::GreaterEq => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current.kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_primary(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.bail_on_lex_error()?;
        let expr = match &self.current.kind {
            TokenKind::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Expr::Literal(Literal::Null)
            }
            TokenKind::Number(n) => {
                let n = *n;
                self.advance();
                Expr::Literal(Literal::Number(n))
            }
            TokenKind::Str(s) => {
                let s = s.clone();
                self.advance();
                Expr::Literal(Literal::Str(s))
            }
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Expr::Identifier(name)
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RParen, "Expected ')' after expression")?;
                expr
            }
            TokenKind::LBracket => {
                self.advance();
                self.parse_array_elements()?
            }
            _ => {
                return error_at(
                    self.current.line,
                    self.current.col,
                    format!("Expected expression. Found: {}", self.current.kind.name()),
                );
            }
        };

        self.parse_postfix(expr)
    }

    /// Calls, indexing, and property access chain freely in any order.
    fn parse_postfix(&mut self, mut expr: Expr) -> Result<Expr> {
        loop {
            if self.eat(&TokenKind::LParen) {
                let args = if self.check(&TokenKind::RParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else if self.eat(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.consume(TokenKind::RBracket, "Expected ']' after array index")?;
                expr = Expr::Index {
                    array: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat(&TokenKind::Dot) {
                let name = self.expect_identifier("Expected property name after '.'")?;
                expr = Expr::Property {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expr>> {
        let mut args = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    /// Elements of an array literal; the opening '[' is already consumed.
    fn parse_array_elements(&mut self) -> Result<Expr> {
        if self.eat(&TokenKind::RBracket) {
            return Ok(Expr::Array(Vec::new()));
        }
        let mut elements = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            elements.push(self.parse_expression()?);
        }
        self.consume(TokenKind::RBracket, "Expected ']' after array elements")?;
        Ok(Expr::Array(elements))
    }
}
