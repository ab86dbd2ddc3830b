//! Expression type checking.
//!
//! Every expression is assigned a [`TypeInfo`]. A failing subtree reports
//! a diagnostic and yields the unknown sentinel; callers treat unknown
//! transparently and never raise secondary errors for it.

use crate::diagnostics::DiagnosticKind;
use crate::parser::{Expression, ExpressionKind, InfixOperator, PrefixOperator, Statement};

use super::symbol_table::{Symbol, SymbolKind};
use super::types::{BuiltinType, TypeInfo};
use super::SemanticAnalyzer;

impl SemanticAnalyzer {
    pub(crate) fn check_expression(&mut self, expr: &Expression) -> TypeInfo {
        match &expr.kind {
            ExpressionKind::IntegerLiteral(_) => TypeInfo::Builtin(BuiltinType::Int),
            ExpressionKind::FloatLiteral(_) => TypeInfo::Builtin(BuiltinType::Float),
            ExpressionKind::StringLiteral(_) => TypeInfo::Builtin(BuiltinType::String),
            ExpressionKind::BooleanLiteral(_) => TypeInfo::Builtin(BuiltinType::Bool),

            ExpressionKind::Identifier(name) => self.check_identifier(name, expr),

            ExpressionKind::Prefix { operator, operand } => {
                self.check_prefix(*operator, operand, expr)
            }

            ExpressionKind::Infix { left, operator, right } => {
                self.check_infix(left, *operator, right, expr)
            }

            ExpressionKind::If { condition, then_branch, else_branch } => {
                self.check_if(condition, then_branch, else_branch.as_deref(), expr)
            }

            ExpressionKind::Block(statements) => self.check_branch(statements),

            ExpressionKind::FunctionLiteral { parameters, return_type, body } => {
                self.check_function_literal(parameters, return_type.as_ref(), body)
            }

            ExpressionKind::Call { function, arguments } => {
                self.check_call(function, arguments, expr)
            }

            ExpressionKind::Pipe { left, right } => self.check_pipe(left, right, expr),

            ExpressionKind::Match { .. } => {
                self.report(
                    DiagnosticKind::InvalidOperation,
                    "Match expressions not yet implemented",
                    expr.line,
                    expr.column,
                );
                TypeInfo::unknown()
            }
        }
    }

    fn check_identifier(&mut self, name: &str, expr: &Expression) -> TypeInfo {
        let Some(symbol) = self.scopes.lookup(name) else {
            self.report(
                DiagnosticKind::UndefinedVariable,
                format!("Undefined variable: {}", name),
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        };

        if !symbol.is_initialized {
            let message = format!("use of uninitialized variable '{}'", symbol.name);
            self.report(
                DiagnosticKind::UninitializedVariable,
                message,
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        }

        let ty = symbol.ty.clone();
        if let Some(symbol) = self.scopes.lookup_mut(name) {
            symbol.is_used = true;
        }
        ty
    }

    fn check_prefix(
        &mut self,
        operator: PrefixOperator,
        operand: &Expression,
        expr: &Expression,
    ) -> TypeInfo {
        // The reference operators act on the operand's symbol, not its
        // value, and go through the borrow checker.
        if matches!(operator, PrefixOperator::Ref | PrefixOperator::MutRef) {
            let ExpressionKind::Identifier(name) = &operand.kind else {
                self.report(
                    DiagnosticKind::InvalidOperation,
                    "reference operator can only be used on variables",
                    expr.line,
                    expr.column,
                );
                return TypeInfo::unknown();
            };
            let name = name.clone();
            let mutable = operator == PrefixOperator::MutRef;
            return self.check_borrow(&name, mutable, expr.line, expr.column);
        }

        let operand_type = self.check_expression(operand);
        if operand_type.is_unknown() {
            return TypeInfo::unknown();
        }

        match operator {
            PrefixOperator::Minus => {
                if !operand_type.is_numeric() {
                    self.report(
                        DiagnosticKind::InvalidOperation,
                        "Unary minus can only be applied to numeric types",
                        expr.line,
                        expr.column,
                    );
                    return TypeInfo::unknown();
                }
                operand_type
            }
            PrefixOperator::Not => {
                if !operand_type.is_bool() {
                    self.report(
                        DiagnosticKind::InvalidOperation,
                        "Logical not can only be applied to boolean types",
                        expr.line,
                        expr.column,
                    );
                    return TypeInfo::unknown();
                }
                TypeInfo::Builtin(BuiltinType::Bool)
            }
            PrefixOperator::Deref => match operand_type {
                TypeInfo::Reference { pointed_to, .. } => *pointed_to,
                other => {
                    let message =
                        format!("Cannot dereference non-reference type '{}'", other);
                    self.report(
                        DiagnosticKind::TypeMismatch,
                        message,
                        expr.line,
                        expr.column,
                    );
                    TypeInfo::unknown()
                }
            },
            PrefixOperator::Ref | PrefixOperator::MutRef => unreachable!(),
        }
    }

    fn check_infix(
        &mut self,
        left: &Expression,
        operator: InfixOperator,
        right: &Expression,
        expr: &Expression,
    ) -> TypeInfo {
        let left_type = self.check_expression(left);
        let right_type = self.check_expression(right);

        if left_type.is_unknown() || right_type.is_unknown() {
            return TypeInfo::unknown();
        }

        match binary_result_type(&left_type, operator, &right_type) {
            Some(result) => result,
            None => {
                let message = format!(
                    "Invalid binary operation: {} {} {}",
                    left_type, operator, right_type
                );
                self.report(
                    DiagnosticKind::InvalidOperation,
                    message,
                    expr.line,
                    expr.column,
                );
                TypeInfo::unknown()
            }
        }
    }

    fn check_if(
        &mut self,
        condition: &Expression,
        then_branch: &[Statement],
        else_branch: Option<&[Statement]>,
        expr: &Expression,
    ) -> TypeInfo {
        let condition_type = self.check_expression(condition);
        if !condition_type.is_unknown() && !condition_type.is_bool() {
            self.report(
                DiagnosticKind::TypeMismatch,
                "If condition must be boolean",
                condition.line,
                condition.column,
            );
        }

        let then_type = self.check_branch(then_branch);
        let else_type = match else_branch {
            Some(statements) => self.check_branch(statements),
            None => TypeInfo::unit(),
        };

        if then_type.is_unknown() || else_type.is_unknown() {
            return TypeInfo::unknown();
        }

        if then_type != else_type {
            let message = format!(
                "If branches have different types: {} vs {}",
                then_type, else_type
            );
            self.report(DiagnosticKind::TypeMismatch, message, expr.line, expr.column);
            return TypeInfo::unknown();
        }

        then_type
    }

    /// Analyzes a `{ ... }` body in its own scope. The body's type is the
    /// type of its final expression statement, unit otherwise.
    pub(crate) fn check_branch(&mut self, statements: &[Statement]) -> TypeInfo {
        self.scopes.push_scope();
        let mut branch_type = TypeInfo::unit();
        for stmt in statements {
            branch_type = self.check_statement(stmt);
        }
        self.scopes.pop_scope();
        branch_type
    }

    fn check_function_literal(
        &mut self,
        parameters: &[crate::parser::Parameter],
        return_type: Option<&crate::parser::Type>,
        body: &[Statement],
    ) -> TypeInfo {
        let mut parameter_types = Vec::with_capacity(parameters.len());

        self.scopes.push_scope();

        for param in parameters {
            let param_type = self.convert_type(&param.ty);
            parameter_types.push(param_type.clone());

            let mut symbol = Symbol::new(
                param.name.clone(),
                SymbolKind::Parameter,
                param_type,
                param.ty.line,
                param.ty.column,
            );
            symbol.is_initialized = true;
            symbol.is_mutable = true;
            self.define(symbol);
        }

        let declared_return = match return_type {
            Some(ty) => self.convert_type(ty),
            None => TypeInfo::unit(),
        };

        let previous_expected = self
            .expected_return_type
            .replace(declared_return.clone());

        for stmt in body {
            self.check_statement(stmt);
        }

        self.expected_return_type = previous_expected;
        self.scopes.pop_scope();

        TypeInfo::Function {
            parameters: parameter_types,
            return_type: Box::new(declared_return),
        }
    }

    fn check_call(
        &mut self,
        function: &Expression,
        arguments: &[Expression],
        expr: &Expression,
    ) -> TypeInfo {
        let function_type = self.check_expression(function);
        if function_type.is_unknown() {
            return TypeInfo::unknown();
        }

        let TypeInfo::Function { parameters, return_type } = function_type else {
            self.report(
                DiagnosticKind::InvalidOperation,
                "Cannot call non-function",
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        };

        if arguments.len() != parameters.len() {
            let message = format!(
                "Wrong number of arguments: expected {}, got {}",
                parameters.len(),
                arguments.len()
            );
            self.report(
                DiagnosticKind::WrongArgumentCount,
                message,
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        }

        let mut failed = false;
        for (i, (argument, expected)) in arguments.iter().zip(&parameters).enumerate() {
            let argument_type = self.check_expression(argument);
            if argument_type.is_unknown() || expected.is_unknown() {
                continue;
            }
            if !argument_type.is_assignable_to(expected) {
                let message = format!(
                    "Argument {} type mismatch: expected {}, got {}",
                    i + 1,
                    expected,
                    argument_type
                );
                self.report(
                    DiagnosticKind::TypeMismatch,
                    message,
                    argument.line,
                    argument.column,
                );
                failed = true;
            }
        }

        if failed {
            return TypeInfo::unknown();
        }

        *return_type
    }

    fn check_pipe(&mut self, left: &Expression, right: &Expression, expr: &Expression) -> TypeInfo {
        let left_type = self.check_expression(left);
        if left_type.is_unknown() {
            return TypeInfo::unknown();
        }

        let right_type = self.check_expression(right);
        if right_type.is_unknown() {
            return TypeInfo::unknown();
        }

        let TypeInfo::Function { parameters, return_type } = right_type else {
            self.report(
                DiagnosticKind::InvalidOperation,
                "Right side of pipe must be a function",
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        };

        if parameters.len() != 1 {
            self.report(
                DiagnosticKind::InvalidOperation,
                "Piped function must take exactly one argument",
                expr.line,
                expr.column,
            );
            return TypeInfo::unknown();
        }

        if !left_type.is_assignable_to(&parameters[0]) {
            let message = format!(
                "Cannot pipe {} to function expecting {}",
                left_type, parameters[0]
            );
            self.report(DiagnosticKind::TypeMismatch, message, expr.line, expr.column);
            return TypeInfo::unknown();
        }

        *return_type
    }
}

/// Result type of a binary operation, or `None` when the operand types do
/// not admit the operator.
fn binary_result_type(
    left: &TypeInfo,
    operator: InfixOperator,
    right: &TypeInfo,
) -> Option<TypeInfo> {
    match operator {
        InfixOperator::Add
        | InfixOperator::Subtract
        | InfixOperator::Multiply
        | InfixOperator::Divide
        | InfixOperator::Modulo => {
            if !left.is_numeric() || !right.is_numeric() {
                return None;
            }
            let float = TypeInfo::Builtin(BuiltinType::Float);
            if *left == float || *right == float {
                Some(float)
            } else {
                Some(TypeInfo::Builtin(BuiltinType::Int))
            }
        }

        InfixOperator::Equal
        | InfixOperator::NotEqual
        | InfixOperator::Less
        | InfixOperator::Greater
        | InfixOperator::LessEqual
        | InfixOperator::GreaterEqual => {
            if !left.is_comparable() || !right.is_comparable() {
                return None;
            }
            if left != right {
                return None;
            }
            Some(TypeInfo::Builtin(BuiltinType::Bool))
        }

        InfixOperator::And | InfixOperator::Or => {
            if left.is_bool() && right.is_bool() {
                Some(TypeInfo::Builtin(BuiltinType::Bool))
            } else {
                None
            }
        }

        // TODO: assignment expressions parse but have no typing rule yet;
        // until one exists they are rejected as invalid operations.
        InfixOperator::Assign => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_widens_to_float() {
        let int = TypeInfo::Builtin(BuiltinType::Int);
        let float = TypeInfo::Builtin(BuiltinType::Float);

        assert_eq!(
            binary_result_type(&int, InfixOperator::Add, &int),
            Some(int.clone())
        );
        assert_eq!(
            binary_result_type(&int, InfixOperator::Multiply, &float),
            Some(float.clone())
        );
        assert_eq!(
            binary_result_type(&float, InfixOperator::Subtract, &int),
            Some(float)
        );
    }

    #[test]
    fn comparison_requires_equal_comparable_types() {
        let int = TypeInfo::Builtin(BuiltinType::Int);
        let float = TypeInfo::Builtin(BuiltinType::Float);
        let string = TypeInfo::Builtin(BuiltinType::String);
        let bool_ty = TypeInfo::Builtin(BuiltinType::Bool);

        assert_eq!(
            binary_result_type(&int, InfixOperator::Less, &int),
            Some(bool_ty.clone())
        );
        assert_eq!(
            binary_result_type(&string, InfixOperator::Equal, &string),
            Some(bool_ty)
        );
        assert_eq!(binary_result_type(&int, InfixOperator::Less, &float), None);
    }

    #[test]
    fn logical_operators_require_bools() {
        let bool_ty = TypeInfo::Builtin(BuiltinType::Bool);
        let int = TypeInfo::Builtin(BuiltinType::Int);

        assert_eq!(
            binary_result_type(&bool_ty, InfixOperator::And, &bool_ty),
            Some(bool_ty.clone())
        );
        assert_eq!(binary_result_type(&int, InfixOperator::Or, &bool_ty), None);
    }

    #[test]
    fn assignment_has_no_result_type() {
        let int = TypeInfo::Builtin(BuiltinType::Int);
        assert_eq!(binary_result_type(&int, InfixOperator::Assign, &int), None);
    }

    #[test]
    fn string_arithmetic_is_rejected() {
        let string = TypeInfo::Builtin(BuiltinType::String);
        assert_eq!(
            binary_result_type(&string, InfixOperator::Add, &string),
            None
        );
    }
}
