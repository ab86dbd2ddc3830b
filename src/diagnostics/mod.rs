//! Semantic diagnostics.
//!
//! The analyzer never stops at the first problem; it accumulates
//! [`Diagnostic`] values in insertion order and lets the caller decide
//! whether the program is acceptable (`error_count == 0`).

use std::fmt;

/// Classification of a semantic finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    TypeMismatch,
    UndefinedVariable,
    UndefinedFunction,
    UndefinedType,
    Redefinition,
    ImmutableAssignment,
    UninitializedVariable,
    InvalidOperation,
    WrongArgumentCount,
    ReturnTypeMismatch,
    MemorySafety,
    LifetimeViolation,
}

/// One semantic finding, anchored to a source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}:{} - {}", self.line, self.column, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_message() {
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UndefinedVariable,
            "Undefined variable: x",
            3,
            7,
        );
        assert_eq!(diagnostic.to_string(), "Line 3:7 - Undefined variable: x");
    }
}
