//! Error types for the interpreter pipeline.
//!
//! Stage failures that abort the pipeline (I/O, lexing, parsing, the
//! accumulated semantic diagnostics) are carried by [`CompileError`].
//! Individual semantic findings live in [`crate::diagnostics`].

use std::fmt;

use crate::diagnostics::Diagnostic;

/// A pipeline-stage failure.
///
/// The `Display` impl produces exactly the blocks the command line prints,
/// so callers can hand any variant straight to the terminal.
#[derive(Debug, Clone)]
pub enum CompileError {
    /// The source file could not be read.
    Io {
        message: String,
    },

    /// The scanner hit a character it cannot tokenize.
    Lex {
        message: String,
        line: usize,
        column: usize,
    },

    /// One or more syntax errors; parsing continued past each to collect
    /// the full list.
    Parse {
        errors: Vec<String>,
    },

    /// Semantic analysis finished with a non-empty diagnostic list.
    Semantic {
        diagnostics: Vec<Diagnostic>,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Io { message } => write!(f, "{}", message),

            CompileError::Lex { message, line, column } => {
                write!(f, "Lex error at {}:{} - {}", line, column, message)
            }

            CompileError::Parse { errors } => {
                write!(f, "Parser errors:")?;
                for error in errors {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }

            CompileError::Semantic { diagnostics } => {
                write!(f, "Semantic errors ({}):", diagnostics.len())?;
                for diagnostic in diagnostics {
                    write!(f, "\n  {}", diagnostic)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CompileError>;
