use super::ast::*;
use super::{Parser, Precedence};
use crate::lexer::TokenType;

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur().token_type {
            TokenType::Let => self.parse_let_statement(),
            TokenType::Const => self.parse_const_statement(),
            TokenType::Return => self.parse_return_statement(),
            TokenType::While => self.parse_while_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Statement> {
        let line = self.cur().line;
        let column = self.cur().column;

        let mutable = if self.peek_is(&TokenType::Mut) {
            self.next_token();
            true
        } else {
            false
        };

        let name = self.expect_ident_peek()?;

        let ty = if self.peek_is(&TokenType::Colon) {
            self.next_token();
            self.next_token();
            Some(self.parse_type()?)
        } else {
            None
        };

        let value = if self.peek_is(&TokenType::Equal) {
            self.next_token();
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        if self.peek_is(&TokenType::Semicolon) {
            self.next_token();
        }

        Some(Statement {
            kind: StatementKind::Let { name, mutable, ty, value },
            line,
            column,
        })
    }

    fn parse_const_statement(&mut self) -> Option<Statement> {
        let line = self.cur().line;
        let column = self.cur().column;

        if self.peek_is(&TokenType::Mut) {
            self.add_error("Cannot use 'mut' with 'const'. Constants are always immutable.");
            return None;
        }

        let name = self.expect_ident_peek()?;

        let ty = if self.peek_is(&TokenType::Colon) {
            self.next_token();
            self.next_token();
            Some(self.parse_type()?)
        } else {
            None
        };

        if !self.expect_peek(TokenType::Equal) {
            return None;
        }

        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(&TokenType::Semicolon) {
            self.next_token();
        }

        Some(Statement {
            kind: StatementKind::Const { name, ty, value },
            line,
            column,
        })
    }

    fn parse_return_statement(&mut self) -> Option<Statement> {
        let line = self.cur().line;
        let column = self.cur().column;

        let value = if self.peek_is(&TokenType::Semicolon)
            || self.peek_is(&TokenType::Newline)
            || self.peek_is(&TokenType::RightBrace)
            || self.peek_is(&TokenType::Eof)
        {
            None
        } else {
            self.next_token();
            Some(self.parse_expression(Precedence::Lowest)?)
        };

        if self.peek_is(&TokenType::Semicolon) {
            self.next_token();
        }

        Some(Statement {
            kind: StatementKind::Return(value),
            line,
            column,
        })
    }

    fn parse_while_statement(&mut self) -> Option<Statement> {
        let line = self.cur().line;
        let column = self.cur().column;

        if !self.expect_peek(TokenType::LeftParen) {
            return None;
        }

        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }

        self.next_token();
        while self.cur_is(&TokenType::Newline) {
            self.next_token();
        }
        let body = self.parse_statement()?;

        Some(Statement {
            kind: StatementKind::While {
                condition,
                body: Box::new(body),
            },
            line,
            column,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let line = self.cur().line;
        let column = self.cur().column;

        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(&TokenType::Semicolon) {
            self.next_token();
        }

        // A bare `{ ... }` at statement level is a block statement; in any
        // larger expression it stays a block expression.
        let kind = match expr.kind {
            ExpressionKind::Block(statements) => StatementKind::Block(statements),
            kind => StatementKind::Expression(Expression {
                kind,
                line: expr.line,
                column: expr.column,
            }),
        };

        Some(Statement { kind, line, column })
    }

    /// Parses the statements of a `{ ... }` body. On entry the current
    /// token is the opening brace; on exit it is the closing brace.
    pub(crate) fn parse_block_statements(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        self.next_token();

        while !self.cur_is(&TokenType::RightBrace) && !self.cur_is(&TokenType::Eof) {
            if self.cur_is(&TokenType::Newline) {
                self.next_token();
                continue;
            }

            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
            self.next_token();
        }

        if self.cur_is(&TokenType::Eof) {
            self.add_error("expected '}' before end of file");
        }

        statements
    }
}
