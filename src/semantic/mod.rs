//! Semantic analysis.
//!
//! A single pass over the AST that resolves identifiers through a
//! lexically scoped symbol table, infers and checks types, and enforces
//! the borrow and lifetime rules. The pass never rewrites the tree and
//! never stops early: each failure records a [`Diagnostic`] and yields
//! the unknown type sentinel so one run surfaces as many problems as
//! possible. A program is accepted iff the diagnostic list ends empty.

pub mod borrow_checker;
pub mod symbol_table;
pub mod type_checker;
pub mod types;

pub use symbol_table::{BorrowState, Scope, ScopeStack, Symbol, SymbolKind};
pub use types::{BuiltinType, TypeInfo};

use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::parser::{Expression, Program, Statement, StatementKind, Type, TypeKind};

/// The semantic analyzer: scope stack, diagnostic accumulator, and the
/// expected return type of the function literal currently being checked.
pub struct SemanticAnalyzer {
    pub(crate) scopes: ScopeStack,
    diagnostics: Vec<Diagnostic>,
    pub(crate) expected_return_type: Option<TypeInfo>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        SemanticAnalyzer {
            scopes: ScopeStack::new(),
            diagnostics: Vec::new(),
            expected_return_type: None,
        }
    }

    /// Analyzes a whole program. Returns `true` when the program is
    /// accepted (no diagnostics).
    ///
    /// Analysis ends with a release sweep for the global scope, so an
    /// accepted program leaves every surviving symbol unborrowed.
    pub fn analyze(&mut self, program: &Program) -> bool {
        debug!(statements = program.statements.len(), "semantic analysis started");

        for stmt in &program.statements {
            self.check_statement(stmt);
        }

        let global_lifetime_id = self.scopes.global_lifetime_id();
        self.scopes.release_borrows(global_lifetime_id);

        debug!(errors = self.diagnostics.len(), "semantic analysis finished");
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Looks up a symbol reachable from the current scope. After
    /// [`SemanticAnalyzer::analyze`] only the global scope survives, so
    /// this exposes the end-of-run state of global symbols.
    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.scopes.lookup(name)
    }

    pub(crate) fn report(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) {
        self.diagnostics.push(Diagnostic::new(kind, message, line, column));
    }

    /// Checks one statement and returns its value type: the expression's
    /// type for expression statements, unit for everything else. Branch
    /// typing relies on this so the final expression of a block is never
    /// analyzed twice.
    pub(crate) fn check_statement(&mut self, stmt: &Statement) -> TypeInfo {
        match &stmt.kind {
            StatementKind::Let { name, mutable, ty, value } => {
                self.check_binding(name, *mutable, false, ty.as_ref(), value.as_ref(), stmt);
                TypeInfo::unit()
            }

            StatementKind::Const { name, ty, value } => {
                self.check_binding(name, false, true, ty.as_ref(), Some(value), stmt);
                TypeInfo::unit()
            }

            StatementKind::Return(value) => {
                let return_type = match value {
                    Some(expr) => self.check_expression(expr),
                    None => TypeInfo::unit(),
                };

                if let Some(expected) = self.expected_return_type.clone() {
                    if !return_type.is_unknown()
                        && !expected.is_unknown()
                        && !return_type.is_assignable_to(&expected)
                    {
                        let message = format!(
                            "Return type {} does not match expected type {}",
                            return_type, expected
                        );
                        self.report(
                            DiagnosticKind::ReturnTypeMismatch,
                            message,
                            stmt.line,
                            stmt.column,
                        );
                    }
                }
                TypeInfo::unit()
            }

            StatementKind::Expression(expr) => self.check_expression(expr),

            StatementKind::Block(statements) => {
                self.scopes.push_scope();
                for inner in statements {
                    self.check_statement(inner);
                }
                self.scopes.pop_scope();
                TypeInfo::unit()
            }

            StatementKind::While { condition, body } => {
                let condition_type = self.check_expression(condition);
                if !condition_type.is_unknown() && !condition_type.is_bool() {
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        "While condition must be boolean",
                        condition.line,
                        condition.column,
                    );
                }

                self.scopes.push_scope();
                self.check_statement(body);
                self.scopes.pop_scope();
                TypeInfo::unit()
            }
        }
    }

    fn check_binding(
        &mut self,
        name: &str,
        mutable: bool,
        is_const: bool,
        ty: Option<&Type>,
        value: Option<&Expression>,
        stmt: &Statement,
    ) {
        let value_type = value.map(|expr| self.check_expression(expr));
        let declared_type = ty.map(|annotation| self.convert_type(annotation));

        let final_type = match (declared_type, value_type) {
            (Some(declared), Some(value_type)) => {
                if !declared.is_unknown()
                    && !value_type.is_unknown()
                    && !value_type.is_assignable_to(&declared)
                {
                    let message = format!(
                        "Cannot assign value of type {} to variable of type {}",
                        value_type, declared
                    );
                    self.report(DiagnosticKind::TypeMismatch, message, stmt.line, stmt.column);
                }
                declared
            }
            (Some(declared), None) => declared,
            (None, Some(value_type)) => value_type,
            (None, None) => TypeInfo::unknown(),
        };

        let mut symbol = Symbol::new(
            name,
            SymbolKind::Variable,
            final_type,
            stmt.line,
            stmt.column,
        );
        symbol.is_const = is_const;
        symbol.is_mutable = mutable && !is_const;
        symbol.is_initialized = value.is_some();

        self.define(symbol);
    }

    /// Inserts a symbol into the current scope, reporting a redefinition
    /// when the name is already taken there. Shadowing an outer scope is
    /// always allowed.
    pub(crate) fn define(&mut self, symbol: Symbol) {
        let line = symbol.declaration_line;
        let column = symbol.declaration_column;

        if !self.scopes.add(symbol) {
            self.report(
                DiagnosticKind::Redefinition,
                "Symbol already defined in current scope",
                line,
                column,
            );
        }
    }

    /// Resolves a parsed type annotation to a semantic type, reporting
    /// names that denote no known type.
    pub(crate) fn convert_type(&mut self, annotation: &Type) -> TypeInfo {
        match &annotation.kind {
            TypeKind::Named(name) => match name.as_str() {
                "int" => TypeInfo::Builtin(BuiltinType::Int),
                "float" => TypeInfo::Builtin(BuiltinType::Float),
                "string" => TypeInfo::Builtin(BuiltinType::String),
                "bool" => TypeInfo::Builtin(BuiltinType::Bool),
                other => {
                    let message = format!("Undefined type: {}", other);
                    self.report(
                        DiagnosticKind::UndefinedType,
                        message,
                        annotation.line,
                        annotation.column,
                    );
                    TypeInfo::unknown()
                }
            },

            TypeKind::Function { parameters, return_type } => {
                let parameter_types = parameters
                    .iter()
                    .map(|param| self.convert_type(param))
                    .collect();
                let return_type = self.convert_type(return_type);
                TypeInfo::Function {
                    parameters: parameter_types,
                    return_type: Box::new(return_type),
                }
            }

            // Reserved; the parser never produces struct annotations.
            TypeKind::Struct { .. } => TypeInfo::unknown(),
        }
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
