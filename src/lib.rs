//! # Rill
//!
//! A tree-walking interpreter for a small statically-typed,
//! expression-oriented language with first-class functions, pipe
//! composition, and a compile-time ownership/borrow discipline.
//!
//! ## Overview
//!
//! Rill programs are sequences of statements over int, float, string,
//! bool, function, and reference types. Before anything runs, a
//! single-pass semantic analyzer resolves names through a lexically
//! scoped symbol table, checks every expression's type, and enforces the
//! "shared XOR mutable" borrow rule with scope-keyed lifetimes. Accepted
//! programs are evaluated directly over the AST.
//!
//! ## Pipeline
//!
//! 1. **Lexing** ([`lexer`]) - source text to positioned tokens
//! 2. **Parsing** ([`parser`]) - tokens to a positioned AST
//! 3. **Semantic analysis** ([`semantic`]) - type checking, borrow
//!    checking, lifetime checking; accumulates [`diagnostics`]
//! 4. **Evaluation** ([`evaluator`]) - tree-walking execution
//!
//! ## Quick start
//!
//! ```
//! use rill_interpreter::interpret;
//!
//! let value = interpret("let x = 5; x + 3").expect("interpretation failed");
//! assert_eq!(value.to_string(), "8");
//! ```
//!
//! Checking without running:
//!
//! ```
//! use rill_interpreter::check;
//!
//! let diagnostics = check("let x = 5; let r = &mut x; r").expect("valid syntax");
//! assert_eq!(diagnostics.len(), 1);
//! ```

/// Error types and result alias for pipeline stages
pub mod error;

/// Semantic diagnostics and their taxonomy
pub mod diagnostics;

/// Lexical analysis - tokenization of source code
pub mod lexer;

/// Syntax analysis - AST construction from tokens
pub mod parser;

/// Semantic analysis - type checking, borrow checking, lifetime checking
pub mod semantic;

/// Tree-walking evaluation - values and environments
pub mod evaluator;

/// Command-line interface definition
pub mod cli;

pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{CompileError, Result};
pub use evaluator::{eval_program, Environment, Value};
pub use lexer::{lex, Token, TokenType};
pub use parser::{Parser, Program};
pub use semantic::SemanticAnalyzer;

use tracing::debug;

/// Lexes and parses source code into a [`Program`].
///
/// Returns [`CompileError::Parse`] with every collected message when the
/// source has syntax errors.
///
/// # Examples
///
/// ```
/// use rill_interpreter::compile;
///
/// let program = compile("let x = 1; x").expect("parse failed");
/// assert_eq!(program.statements.len(), 2);
/// ```
pub fn compile(source: &str) -> Result<Program> {
    let tokens = lex(source)?;
    debug!(tokens = tokens.len(), "lexed source");

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    let errors = parser.take_errors();

    if errors.is_empty() {
        debug!(statements = program.statements.len(), "parsed program");
        Ok(program)
    } else {
        Err(CompileError::Parse { errors })
    }
}

/// Runs semantic analysis and returns the accumulated diagnostics, empty
/// for an accepted program.
///
/// Lex and parse failures are errors; semantic findings are data.
///
/// # Examples
///
/// ```
/// use rill_interpreter::{check, DiagnosticKind};
///
/// let diagnostics = check("let y; y + 1").expect("valid syntax");
/// assert_eq!(diagnostics[0].kind, DiagnosticKind::UninitializedVariable);
/// ```
pub fn check(source: &str) -> Result<Vec<Diagnostic>> {
    let program = compile(source)?;
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze(&program);
    Ok(analyzer.take_diagnostics())
}

/// Runs the whole pipeline and returns the program's final value.
///
/// # Errors
///
/// Fails on syntax errors, on any semantic diagnostic
/// ([`CompileError::Semantic`]), or on a runtime fault such as division
/// by zero.
///
/// # Examples
///
/// ```
/// use rill_interpreter::interpret;
///
/// let value = interpret("let f = func(x: int) -> int { x + 1 }; 5 |> f")
///     .expect("interpretation failed");
/// assert_eq!(value.to_string(), "6");
/// ```
pub fn interpret(source: &str) -> anyhow::Result<Value> {
    let program = compile(source)?;

    let mut analyzer = SemanticAnalyzer::new();
    if !analyzer.analyze(&program) {
        return Err(CompileError::Semantic {
            diagnostics: analyzer.take_diagnostics(),
        }
        .into());
    }

    let env = Environment::new();
    eval_program(&program, &env)
}
