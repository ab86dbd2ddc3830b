use rill_interpreter::parser::{ExpressionKind, StatementKind};
use rill_interpreter::{compile, CompileError};

#[test]
fn statements_can_span_multiple_lines() {
    let program = compile(
        "let x = 1\n\
         let y = 2\n\
         x + y\n",
    )
    .expect("parse failed");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn semicolons_are_optional_at_line_ends() {
    let program = compile("let x = 1; let y = 2\nx").expect("parse failed");
    assert_eq!(program.statements.len(), 3);
}

#[test]
fn return_without_value() {
    let program = compile("return;").expect("parse failed");
    assert!(matches!(
        program.statements[0].kind,
        StatementKind::Return(None)
    ));
}

#[test]
fn return_before_closing_brace_without_value() {
    let program = compile("let f = func() -> int { return }; f").expect("parse failed");
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn function_literal_with_empty_parameter_list() {
    let program = compile("func() { 1 }").expect("parse failed");
    match &program.statements[0].kind {
        StatementKind::Expression(expr) => match &expr.kind {
            ExpressionKind::FunctionLiteral { parameters, return_type, body } => {
                assert!(parameters.is_empty());
                assert!(return_type.is_none());
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected function literal, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn call_arguments_are_full_expressions() {
    let program = compile("f(1 + 2, g(3), true)").expect("parse failed");
    match &program.statements[0].kind {
        StatementKind::Expression(expr) => match &expr.kind {
            ExpressionKind::Call { arguments, .. } => assert_eq!(arguments.len(), 3),
            other => panic!("expected call, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn nodes_carry_source_positions() {
    let program = compile("let a = 1\nlet b = 2").expect("parse failed");
    assert_eq!(program.statements[0].line, 1);
    assert_eq!(program.statements[1].line, 2);
    assert_eq!(program.statements[1].column, 1);
}

#[test]
fn grouped_expressions_override_precedence() {
    let program = compile("(1 + 2) * 3").expect("parse failed");
    match &program.statements[0].kind {
        StatementKind::Expression(expr) => match &expr.kind {
            ExpressionKind::Infix { left, .. } => {
                assert!(matches!(left.kind, ExpressionKind::Infix { .. }));
            }
            other => panic!("expected infix, got {:?}", other),
        },
        other => panic!("expected expression statement, got {:?}", other),
    }
}

#[test]
fn parse_errors_accumulate_across_statements() {
    let error = compile("let = 1\nlet = 2").expect_err("should fail");
    match error {
        CompileError::Parse { errors } => {
            // Both bad lets are reported (recovery may add trailing noise).
            assert!(errors.len() >= 2, "got {:?}", errors);
            assert!(errors[0].contains("expected next token to be identifier"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn unknown_prefix_token_is_reported() {
    let error = compile("let x = ,").expect_err("should fail");
    match error {
        CompileError::Parse { errors } => {
            assert!(errors[0].contains("no prefix parse function"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn unclosed_block_is_reported() {
    let error = compile("{ let x = 1;").expect_err("should fail");
    match error {
        CompileError::Parse { errors } => {
            assert!(errors.iter().any(|e| e.contains("expected '}'")));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}
