use super::ast::{Type, TypeKind};
use super::Parser;
use crate::lexer::TokenType;

impl Parser {
    /// Parses a type annotation starting at the current token: a named
    /// type or `func(T, ...) -> T`.
    pub(crate) fn parse_type(&mut self) -> Option<Type> {
        let line = self.cur().line;
        let column = self.cur().column;

        let kind = match &self.cur().token_type {
            TokenType::Func => {
                if !self.expect_peek(TokenType::LeftParen) {
                    return None;
                }

                let parameters = self.parse_type_list()?;

                if !self.expect_peek(TokenType::Arrow) {
                    return None;
                }

                self.next_token();
                let return_type = self.parse_type()?;

                TypeKind::Function {
                    parameters,
                    return_type: Box::new(return_type),
                }
            }
            TokenType::IntType => TypeKind::Named("int".to_string()),
            TokenType::FloatType => TypeKind::Named("float".to_string()),
            TokenType::StringType => TypeKind::Named("string".to_string()),
            TokenType::BoolType => TypeKind::Named("bool".to_string()),
            TokenType::Ident(name) => TypeKind::Named(name.clone()),
            other => {
                let message = format!("expected type, got {} instead", other.describe());
                self.add_error(message);
                return None;
            }
        };

        Some(Type { kind, line, column })
    }

    fn parse_type_list(&mut self) -> Option<Vec<Type>> {
        let mut types = Vec::new();

        if self.peek_is(&TokenType::RightParen) {
            self.next_token();
            return Some(types);
        }

        self.next_token();
        types.push(self.parse_type()?);

        while self.peek_is(&TokenType::Comma) {
            self.next_token();
            self.next_token();
            types.push(self.parse_type()?);
        }

        if !self.expect_peek(TokenType::RightParen) {
            return None;
        }

        Some(types)
    }
}
