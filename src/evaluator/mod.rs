//! Tree-walking evaluation.
//!
//! Runs ASTs the analyzer has already accepted, so the walker assumes
//! type soundness and treats the remaining impossibilities (calling a
//! non-function value, dividing by zero) as runtime faults. `return`
//! propagates as a control signal and is unwrapped at call and program
//! boundaries.

mod environment;
mod value;

pub use environment::Environment;
pub use value::{FunctionValue, Value};

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use tracing::trace;

use crate::parser::{
    Expression, ExpressionKind, InfixOperator, PrefixOperator, Program, Statement, StatementKind,
};

/// Why evaluation of a subtree stopped early: a `return` unwinding to the
/// nearest call boundary, or a runtime fault.
enum Signal {
    Return(Value),
    Fault(anyhow::Error),
}

type Outcome = std::result::Result<Value, Signal>;

fn fault(message: String) -> Signal {
    Signal::Fault(anyhow!(message))
}

/// Evaluates a program in the given global environment. The result is the
/// value of the last statement, or the value of the first top-level
/// `return` reached.
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Result<Value> {
    let mut result = Value::Unit;
    for stmt in &program.statements {
        match eval_statement(stmt, env) {
            Ok(value) => result = value,
            Err(Signal::Return(value)) => return Ok(value),
            Err(Signal::Fault(error)) => return Err(error),
        }
    }
    Ok(result)
}

fn eval_statement(stmt: &Statement, env: &Rc<RefCell<Environment>>) -> Outcome {
    match &stmt.kind {
        StatementKind::Let { name, value, .. } => {
            if let Some(expr) = value {
                let value = eval_expression(expr, env)?;
                env.borrow_mut().set(name.clone(), value);
            }
            Ok(Value::Unit)
        }

        StatementKind::Const { name, value, .. } => {
            let value = eval_expression(value, env)?;
            env.borrow_mut().set(name.clone(), value);
            Ok(Value::Unit)
        }

        StatementKind::Return(value) => {
            let value = match value {
                Some(expr) => eval_expression(expr, env)?,
                None => Value::Unit,
            };
            Err(Signal::Return(value))
        }

        StatementKind::Expression(expr) => eval_expression(expr, env),

        StatementKind::Block(statements) => eval_block(statements, env),

        StatementKind::While { condition, body } => {
            loop {
                let condition_value = eval_expression(condition, env)?;
                if !is_truthy(&condition_value) {
                    break;
                }
                eval_statement(body, env)?;
            }
            Ok(Value::Unit)
        }
    }
}

fn eval_expression(expr: &Expression, env: &Rc<RefCell<Environment>>) -> Outcome {
    match &expr.kind {
        ExpressionKind::IntegerLiteral(value) => Ok(Value::Integer(*value)),
        ExpressionKind::FloatLiteral(value) => Ok(Value::Float(*value)),
        ExpressionKind::StringLiteral(value) => Ok(Value::Str(value.clone())),
        ExpressionKind::BooleanLiteral(value) => Ok(Value::Boolean(*value)),

        ExpressionKind::Identifier(name) => env
            .borrow()
            .get(name)
            .ok_or_else(|| fault(format!("undefined variable '{}'", name))),

        ExpressionKind::Prefix { operator, operand } => eval_prefix(*operator, operand, env),

        ExpressionKind::Infix { left, operator, right } => {
            let left_value = eval_expression(left, env)?;
            let right_value = eval_expression(right, env)?;
            eval_infix(*operator, left_value, right_value)
        }

        ExpressionKind::If { condition, then_branch, else_branch } => {
            let condition_value = eval_expression(condition, env)?;
            if is_truthy(&condition_value) {
                eval_block(then_branch, env)
            } else if let Some(else_branch) = else_branch {
                eval_block(else_branch, env)
            } else {
                Ok(Value::Unit)
            }
        }

        ExpressionKind::Block(statements) => eval_block(statements, env),

        ExpressionKind::FunctionLiteral { parameters, body, .. } => {
            Ok(Value::Function(Rc::new(FunctionValue {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })))
        }

        ExpressionKind::Call { function, arguments } => {
            let function_value = eval_expression(function, env)?;
            let mut argument_values = Vec::with_capacity(arguments.len());
            for argument in arguments {
                argument_values.push(eval_expression(argument, env)?);
            }
            apply_function(function_value, argument_values)
        }

        ExpressionKind::Pipe { left, right } => {
            let argument = eval_expression(left, env)?;
            let function_value = eval_expression(right, env)?;
            apply_function(function_value, vec![argument])
        }

        ExpressionKind::Match { .. } => {
            Err(fault("match expressions not yet implemented".to_string()))
        }
    }
}

fn eval_prefix(
    operator: PrefixOperator,
    operand: &Expression,
    env: &Rc<RefCell<Environment>>,
) -> Outcome {
    match operator {
        PrefixOperator::Ref | PrefixOperator::MutRef => match &operand.kind {
            ExpressionKind::Identifier(name) => Ok(Value::Reference {
                env: Rc::clone(env),
                name: name.clone(),
                mutable: operator == PrefixOperator::MutRef,
            }),
            _ => Err(fault(
                "reference operator can only be used on variables".to_string(),
            )),
        },

        PrefixOperator::Deref => {
            let value = eval_expression(operand, env)?;
            match value {
                Value::Reference { env, name, .. } => {
                    let pointed = env.borrow().get(&name);
                    pointed.ok_or_else(|| fault(format!("dangling reference to '{}'", name)))
                }
                other => Err(fault(format!(
                    "cannot dereference non-reference value {}",
                    other
                ))),
            }
        }

        PrefixOperator::Minus => {
            let value = eval_expression(operand, env)?;
            match value {
                Value::Integer(value) => Ok(Value::Integer(-value)),
                Value::Float(value) => Ok(Value::Float(-value)),
                other => Err(fault(format!("cannot negate {}", other))),
            }
        }

        PrefixOperator::Not => {
            let value = eval_expression(operand, env)?;
            match value {
                Value::Boolean(value) => Ok(Value::Boolean(!value)),
                other => Err(fault(format!("cannot apply '!' to {}", other))),
            }
        }
    }
}

fn eval_infix(operator: InfixOperator, left: Value, right: Value) -> Outcome {
    use InfixOperator::*;

    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => {
            let (l, r) = (*l, *r);
            match operator {
                Add => Ok(Value::Integer(l + r)),
                Subtract => Ok(Value::Integer(l - r)),
                Multiply => Ok(Value::Integer(l * r)),
                Divide => {
                    if r == 0 {
                        Err(fault("division by zero".to_string()))
                    } else {
                        Ok(Value::Integer(l / r))
                    }
                }
                Modulo => {
                    if r == 0 {
                        Err(fault("modulo by zero".to_string()))
                    } else {
                        Ok(Value::Integer(l % r))
                    }
                }
                Equal => Ok(Value::Boolean(l == r)),
                NotEqual => Ok(Value::Boolean(l != r)),
                Less => Ok(Value::Boolean(l < r)),
                Greater => Ok(Value::Boolean(l > r)),
                LessEqual => Ok(Value::Boolean(l <= r)),
                GreaterEqual => Ok(Value::Boolean(l >= r)),
                _ => Err(invalid_operands(operator, &left, &right)),
            }
        }

        // Mixed int/float arithmetic widens to float.
        (Value::Integer(_), Value::Float(_))
        | (Value::Float(_), Value::Integer(_))
        | (Value::Float(_), Value::Float(_)) => {
            let l = as_float(&left);
            let r = as_float(&right);
            match operator {
                Add => Ok(Value::Float(l + r)),
                Subtract => Ok(Value::Float(l - r)),
                Multiply => Ok(Value::Float(l * r)),
                Divide => Ok(Value::Float(l / r)),
                Modulo => Ok(Value::Float(l % r)),
                Equal => Ok(Value::Boolean(l == r)),
                NotEqual => Ok(Value::Boolean(l != r)),
                Less => Ok(Value::Boolean(l < r)),
                Greater => Ok(Value::Boolean(l > r)),
                LessEqual => Ok(Value::Boolean(l <= r)),
                GreaterEqual => Ok(Value::Boolean(l >= r)),
                _ => Err(invalid_operands(operator, &left, &right)),
            }
        }

        (Value::Str(l), Value::Str(r)) => match operator {
            Equal => Ok(Value::Boolean(l == r)),
            NotEqual => Ok(Value::Boolean(l != r)),
            Less => Ok(Value::Boolean(l < r)),
            Greater => Ok(Value::Boolean(l > r)),
            LessEqual => Ok(Value::Boolean(l <= r)),
            GreaterEqual => Ok(Value::Boolean(l >= r)),
            _ => Err(invalid_operands(operator, &left, &right)),
        },

        (Value::Boolean(l), Value::Boolean(r)) => match operator {
            And => Ok(Value::Boolean(*l && *r)),
            Or => Ok(Value::Boolean(*l || *r)),
            Equal => Ok(Value::Boolean(l == r)),
            NotEqual => Ok(Value::Boolean(l != r)),
            Less => Ok(Value::Boolean(l < r)),
            Greater => Ok(Value::Boolean(l > r)),
            LessEqual => Ok(Value::Boolean(l <= r)),
            GreaterEqual => Ok(Value::Boolean(l >= r)),
            _ => Err(invalid_operands(operator, &left, &right)),
        },

        _ => Err(invalid_operands(operator, &left, &right)),
    }
}

fn invalid_operands(operator: InfixOperator, left: &Value, right: &Value) -> Signal {
    fault(format!(
        "invalid operands for '{}': {} and {}",
        operator, left, right
    ))
}

fn as_float(value: &Value) -> f64 {
    match value {
        Value::Integer(value) => *value as f64,
        Value::Float(value) => *value,
        _ => 0.0,
    }
}

fn apply_function(function: Value, arguments: Vec<Value>) -> Outcome {
    let func = match function {
        Value::Function(func) => func,
        other => return Err(fault(format!("cannot call non-function value {}", other))),
    };

    if func.parameters.len() != arguments.len() {
        return Err(fault(format!(
            "wrong number of arguments: expected {}, got {}",
            func.parameters.len(),
            arguments.len()
        )));
    }

    trace!(params = func.parameters.len(), "applying function");

    let call_env = Environment::new_enclosed(&func.env);
    for (param, argument) in func.parameters.iter().zip(arguments) {
        call_env.borrow_mut().set(param.name.clone(), argument);
    }

    match eval_statements(&func.body, &call_env) {
        Ok(value) => Ok(value),
        Err(Signal::Return(value)) => Ok(value),
        Err(signal) => Err(signal),
    }
}

/// Evaluates a `{ ... }` body in a fresh enclosed environment; the body's
/// value is its last statement's value.
fn eval_block(statements: &[Statement], env: &Rc<RefCell<Environment>>) -> Outcome {
    let enclosed = Environment::new_enclosed(env);
    eval_statements(statements, &enclosed)
}

fn eval_statements(statements: &[Statement], env: &Rc<RefCell<Environment>>) -> Outcome {
    let mut result = Value::Unit;
    for stmt in statements {
        result = eval_statement(stmt, env)?;
    }
    Ok(result)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(value) => *value,
        Value::Unit => false,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::Parser;

    fn eval(source: &str) -> Value {
        let tokens = lex(source).expect("lex failed");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "unexpected parse errors: {:?}",
            parser.errors()
        );
        let env = Environment::new();
        eval_program(&program, &env).expect("evaluation failed")
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Value::Integer(7));
        assert_eq!(eval("10 % 3"), Value::Integer(1));
        assert_eq!(eval("-5 + 2"), Value::Integer(-3));
    }

    #[test]
    fn mixed_arithmetic_widens_to_float() {
        assert_eq!(eval("1 + 0.5"), Value::Float(1.5));
        assert_eq!(eval("2.0 * 3"), Value::Float(6.0));
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("1 < 2"), Value::Boolean(true));
        assert_eq!(eval("true && false"), Value::Boolean(false));
        assert_eq!(eval("!false || false"), Value::Boolean(true));
        assert_eq!(eval("\"a\" < \"b\""), Value::Boolean(true));
    }

    #[test]
    fn let_bindings_and_lookup() {
        assert_eq!(eval("let x = 5; x + 3"), Value::Integer(8));
        assert_eq!(eval("const k = 2; k * k"), Value::Integer(4));
    }

    #[test]
    fn if_expression_picks_a_branch() {
        assert_eq!(eval("if (1 < 2) { 10 } else { 20 }"), Value::Integer(10));
        assert_eq!(eval("if (false) { 10 } else { 20 }"), Value::Integer(20));
    }

    #[test]
    fn blocks_evaluate_in_enclosed_environments() {
        assert_eq!(eval("let x = 1; { let x = 2; x } + x"), Value::Integer(3));
    }

    #[test]
    fn function_call_and_return() {
        assert_eq!(
            eval("let add = func(a: int, b: int) -> int { return a + b }; add(2, 3)"),
            Value::Integer(5)
        );
    }

    #[test]
    fn implicit_last_expression_result() {
        assert_eq!(
            eval("let inc = func(x: int) -> int { x + 1 }; inc(41)"),
            Value::Integer(42)
        );
    }

    #[test]
    fn pipe_applies_single_argument_function() {
        assert_eq!(
            eval("let f = func(x: int) -> int { x + 1 }; 5 |> f"),
            Value::Integer(6)
        );
    }

    #[test]
    fn pipes_chain_left_to_right() {
        assert_eq!(
            eval(
                "let double = func(x: int) -> int { x * 2 };\n\
                 let inc = func(x: int) -> int { x + 1 };\n\
                 3 |> double |> inc"
            ),
            Value::Integer(7)
        );
    }

    #[test]
    fn closures_capture_their_environment() {
        assert_eq!(
            eval(
                "let make_adder = func(n: int) -> func(int) -> int {\n\
                     func(x: int) -> int { x + n }\n\
                 };\n\
                 let add3 = make_adder(3);\n\
                 add3(4)"
            ),
            Value::Integer(7)
        );
    }

    #[test]
    fn while_with_false_condition_skips_body() {
        assert_eq!(eval("while (false) { 1 } 5"), Value::Integer(5));
    }

    #[test]
    fn return_unwinds_out_of_while_body() {
        assert_eq!(
            eval(
                "let first = func(n: int) -> int {\n\
                     while (true) { return n }\n\
                     return 0\n\
                 };\n\
                 first(6)"
            ),
            Value::Integer(6)
        );
    }

    #[test]
    fn reference_and_deref_read_through() {
        assert_eq!(eval("let x = 41; let r = &x; *r + 1"), Value::Integer(42));
    }

    #[test]
    fn return_stops_program_evaluation() {
        assert_eq!(eval("return 9; 1 + 1"), Value::Integer(9));
    }

    #[test]
    fn division_by_zero_is_a_fault() {
        let tokens = lex("1 / 0").expect("lex failed");
        let mut parser = Parser::new(tokens);
        let program = parser.parse_program();
        let env = Environment::new();
        assert!(eval_program(&program, &env).is_err());
    }
}
