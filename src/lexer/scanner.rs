use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::token::{Token, TokenType};
use crate::error::{CompileError, Result};

static KEYWORDS: Lazy<HashMap<&'static str, TokenType>> = Lazy::new(|| {
    let mut keywords = HashMap::new();
    keywords.insert("let", TokenType::Let);
    keywords.insert("const", TokenType::Const);
    keywords.insert("func", TokenType::Func);
    keywords.insert("if", TokenType::If);
    keywords.insert("else", TokenType::Else);
    keywords.insert("match", TokenType::Match);
    keywords.insert("type", TokenType::Type);
    keywords.insert("return", TokenType::Return);
    keywords.insert("while", TokenType::While);
    keywords.insert("mut", TokenType::Mut);
    keywords.insert("true", TokenType::True);
    keywords.insert("false", TokenType::False);
    keywords.insert("int", TokenType::IntType);
    keywords.insert("float", TokenType::FloatType);
    keywords.insert("string", TokenType::StringType);
    keywords.insert("bool", TokenType::BoolType);
    keywords
});

pub struct Scanner {
    source: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Scanner {
            source: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }

            let token = self.scan_token()?;
            tokens.push(token);
        }

        tokens.push(Token::new(TokenType::Eof, self.line, self.column));
        Ok(tokens)
    }

    fn scan_token(&mut self) -> Result<Token> {
        let line = self.line;
        let column = self.column;
        let ch = self.advance();

        let token_type = match ch {
            '\n' => TokenType::Newline,
            '+' => TokenType::Plus,
            '-' => {
                if self.match_char('>') {
                    TokenType::Arrow
                } else {
                    TokenType::Minus
                }
            }
            '*' => TokenType::Star,
            '/' => TokenType::Slash,
            '%' => TokenType::Percent,
            '=' => {
                if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                }
            }
            '!' => {
                if self.match_char('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                }
            }
            '<' => {
                if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                }
            }
            '>' => {
                if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                }
            }
            '&' => {
                if self.match_char('&') {
                    TokenType::And
                } else {
                    TokenType::Ampersand
                }
            }
            '|' => {
                if self.match_char('|') {
                    TokenType::Or
                } else if self.match_char('>') {
                    TokenType::PipeGreater
                } else {
                    return Err(CompileError::Lex {
                        message: "Unexpected character: '|'".to_string(),
                        line,
                        column,
                    });
                }
            }
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            ';' => TokenType::Semicolon,
            ':' => TokenType::Colon,
            ',' => TokenType::Comma,
            '"' => self.scan_string()?,
            _ if ch.is_ascii_digit() => self.scan_number()?,
            _ if ch.is_alphabetic() || ch == '_' => self.scan_identifier(),
            _ => {
                return Err(CompileError::Lex {
                    message: format!("Unexpected character: '{}'", ch),
                    line,
                    column,
                })
            }
        };

        Ok(Token::new(token_type, line, column))
    }

    fn scan_string(&mut self) -> Result<TokenType> {
        let start_line = self.line;
        let start_column = self.column;
        let mut value = String::new();

        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
                let escaped = self.advance();
                value.push(match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    _ => escaped,
                });
            } else {
                value.push(self.advance());
            }
        }

        if self.is_at_end() {
            return Err(CompileError::Lex {
                message: "Unterminated string".to_string(),
                line: start_line,
                column: start_column,
            });
        }

        self.advance();
        Ok(TokenType::StringLit(value))
    }

    fn scan_number(&mut self) -> Result<TokenType> {
        let start_line = self.line;
        let start_column = self.column;
        let mut value = String::new();
        value.push(self.source[self.current - 1]);

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            value.push(self.advance());
        }

        if !self.is_at_end()
            && self.peek() == '.'
            && self.current + 1 < self.source.len()
            && self.source[self.current + 1].is_ascii_digit()
        {
            value.push(self.advance());

            while !self.is_at_end() && self.peek().is_ascii_digit() {
                value.push(self.advance());
            }

            let parsed = value.parse().map_err(|_| CompileError::Lex {
                message: format!("Invalid float literal: {}", value),
                line: start_line,
                column: start_column,
            })?;
            Ok(TokenType::FloatLit(parsed))
        } else {
            let parsed = value.parse().map_err(|_| CompileError::Lex {
                message: format!("Integer literal out of range: {}", value),
                line: start_line,
                column: start_column,
            })?;
            Ok(TokenType::IntLit(parsed))
        }
    }

    fn scan_identifier(&mut self) -> TokenType {
        let mut value = String::new();
        value.push(self.source[self.current - 1]);

        while !self.is_at_end() && (self.peek().is_alphanumeric() || self.peek() == '_') {
            value.push(self.advance());
        }

        match KEYWORDS.get(value.as_str()) {
            Some(token_type) => token_type.clone(),
            None => TokenType::Ident(value),
        }
    }

    // Newlines are tokens; only spaces, tabs, carriage returns, and line
    // comments are skipped here.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.is_at_end() {
                break;
            }

            match self.peek() {
                ' ' | '\r' | '\t' => {
                    self.advance();
                }
                '/' if self.current + 1 < self.source.len()
                    && self.source[self.current + 1] == '/' =>
                {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.source[self.current];
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        ch
    }

    fn peek(&self) -> char {
        self.source[self.current]
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            false
        } else {
            self.advance();
            true
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}
