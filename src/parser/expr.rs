use super::ast::*;
use super::{Parser, Precedence};
use crate::lexer::TokenType;

impl Parser {
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(&TokenType::Semicolon) && precedence < self.peek_precedence() {
            left = match self.peek().token_type {
                TokenType::Plus
                | TokenType::Minus
                | TokenType::Star
                | TokenType::Slash
                | TokenType::Percent
                | TokenType::EqualEqual
                | TokenType::BangEqual
                | TokenType::Less
                | TokenType::Greater
                | TokenType::LessEqual
                | TokenType::GreaterEqual
                | TokenType::And
                | TokenType::Or
                | TokenType::Equal => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenType::PipeGreater => {
                    let line = self.peek().line;
                    let column = self.peek().column;
                    self.next_token();
                    self.next_token();
                    let right = self.parse_expression(Precedence::Pipe)?;
                    Expression {
                        kind: ExpressionKind::Pipe {
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                        line,
                        column,
                    }
                }
                TokenType::LeftParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<Expression> {
        let line = self.cur().line;
        let column = self.cur().column;

        let kind = match &self.cur().token_type {
            TokenType::Ident(name) => ExpressionKind::Identifier(name.clone()),
            TokenType::IntLit(value) => ExpressionKind::IntegerLiteral(*value),
            TokenType::FloatLit(value) => ExpressionKind::FloatLiteral(*value),
            TokenType::StringLit(value) => ExpressionKind::StringLiteral(value.clone()),
            TokenType::True => ExpressionKind::BooleanLiteral(true),
            TokenType::False => ExpressionKind::BooleanLiteral(false),

            TokenType::Bang | TokenType::Minus | TokenType::Star | TokenType::Ampersand => {
                let operator = match self.cur().token_type {
                    TokenType::Bang => PrefixOperator::Not,
                    TokenType::Minus => PrefixOperator::Minus,
                    TokenType::Star => PrefixOperator::Deref,
                    TokenType::Ampersand => {
                        if self.peek_is(&TokenType::Mut) {
                            self.next_token();
                            PrefixOperator::MutRef
                        } else {
                            PrefixOperator::Ref
                        }
                    }
                    _ => unreachable!(),
                };
                self.next_token();
                let operand = self.parse_expression(Precedence::Prefix)?;
                ExpressionKind::Prefix {
                    operator,
                    operand: Box::new(operand),
                }
            }

            TokenType::LeftParen => {
                self.next_token();
                let expr = self.parse_expression(Precedence::Lowest)?;
                if !self.expect_peek(TokenType::RightParen) {
                    return None;
                }
                return Some(expr);
            }

            TokenType::If => return self.parse_if_expression(),
            TokenType::Func => return self.parse_function_literal(),
            TokenType::LeftBrace => ExpressionKind::Block(self.parse_block_statements()),

            TokenType::Match => {
                self.add_error("match expressions not yet implemented");
                return None;
            }

            other => {
                let message =
                    format!("no prefix parse function for {} found", other.describe());
                self.add_error(message);
                return None;
            }
        };

        Some(Expression { kind, line, column })
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let line = self.cur().line;
        let column = self.cur().column;
        let operator = match self.cur().token_type {
            TokenType::Plus => InfixOperator::Add,
            TokenType::Minus => InfixOperator::Subtract,
            TokenType::Star => InfixOperator::Multiply,
            TokenType::Slash => InfixOperator::Divide,
            TokenType::Percent => InfixOperator::Modulo,
            TokenType::EqualEqual => InfixOperator::Equal,
            TokenType::BangEqual => InfixOperator::NotEqual,
            TokenType::Less => InfixOperator::Less,
            TokenType::Greater => InfixOperator::Greater,
            TokenType::LessEqual => InfixOperator::LessEqual,
            TokenType::GreaterEqual => InfixOperator::GreaterEqual,
            TokenType::And => InfixOperator::And,
            TokenType::Or => InfixOperator::Or,
            TokenType::Equal => InfixOperator::Assign,
            _ => unreachable!(),
        };

        let precedence = super::precedence_of(&self.cur().token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;

        Some(Expression {
            kind: ExpressionKind::Infix {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            line,
            column,
        })
    }

    fn parse_if_expression(&mut self) -> Option<Expression> {
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

        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }

        let then_branch = self.parse_block_statements();

        let else_branch = if self.peek_is(&TokenType::Else) {
            self.next_token();
            if !self.expect_peek(TokenType::LeftBrace) {
                return None;
            }
            Some(self.parse_block_statements())
        } else {
            None
        };

        Some(Expression {
            kind: ExpressionKind::If {
                condition: Box::new(condition),
                then_branch,
                else_branch,
            },
            line,
            column,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expression> {
        let line = self.cur().line;
        let column = self.cur().column;

        if !self.expect_peek(TokenType::LeftParen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        let return_type = if self.peek_is(&TokenType::Arrow) {
            self.next_token();
            self.next_token();
            Some(self.parse_type()?)
        } else {
            None
        };

        if !self.expect_peek(TokenType::LeftBrace) {
            return None;
        }

        let body = self.parse_block_statements();

        Some(Expression {
            kind: ExpressionKind::FunctionLiteral {
                parameters,
                return_type,
                body,
            },
            line,
            column,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();

        if self.peek_is(&TokenType::RightParen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();

        let name = match &self.cur().token_type {
            TokenType::Ident(name) => name.clone(),
            _ => {
                self.add_error("expected parameter name");
                return None;
            }
        };

        if !self.expect_peek(TokenType::Colon) {
            return None;
        }

        self.next_token();
        let ty = self.parse_type()?;
        parameters.push(Parameter { name, ty });

        while self.peek_is(&TokenType::Comma) {
            self.next_token();
            self.next_token();

            let name = match &self.cur().token_type {
                TokenType::Ident(name) => name.clone(),
                _ => {
                    self.add_error("expected parameter name after comma");
                    return None;
                }
            };

            if !self.expect_peek(TokenType::Colon) {
                return None;
            }

            self.next_token();
            let ty = self.parse_type()?;
            parameters.push(Parameter { name, ty });
        }

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let line = self.cur().line;
        let column = self.cur().column;
        let arguments = self.parse_call_arguments()?;

        Some(Expression {
            kind: ExpressionKind::Call {
                function: Box::new(function),
                arguments,
            },
            line,
            column,
        })
    }

    fn parse_call_arguments(&mut self) -> Option<Vec<Expression>> {
        let mut arguments = Vec::new();

        if self.peek_is(&TokenType::RightParen) {
            self.next_token();
            return Some(arguments);
        }

        self.next_token();
        arguments.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_is(&TokenType::Comma) {
            self.next_token();
            self.next_token();
            arguments.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }

        Some(arguments)
    }
}
