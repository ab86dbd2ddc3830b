use std::process;

use rill_interpreter::cli::Cli;
use rill_interpreter::error::CompileError;
use rill_interpreter::evaluator::{self, Environment};
use rill_interpreter::lexer;
use rill_interpreter::parser::Parser;
use rill_interpreter::semantic::SemanticAnalyzer;

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse_args();

    let source = match std::fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(_) => {
            let error = CompileError::Io {
                message: format!("Could not open file \"{}\".", cli.input.display()),
            };
            eprintln!("{}", error);
            process::exit(74);
        }
    };

    let tokens = match lexer::lex(&source) {
        Ok(tokens) => tokens,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(1);
        }
    };

    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        println!("Parser errors:");
        for error in parser.errors() {
            println!("  {}", error);
        }
        process::exit(1);
    }

    let mut analyzer = SemanticAnalyzer::new();
    if !analyzer.analyze(&program) {
        println!("Semantic errors ({}):", analyzer.error_count());
        for diagnostic in analyzer.diagnostics() {
            println!("  {}", diagnostic);
        }
        process::exit(1);
    }

    let env = Environment::new();
    match evaluator::eval_program(&program, &env) {
        Ok(value) => println!("=> {}", value),
        Err(error) => {
            eprintln!("Runtime error: {}", error);
            process::exit(1);
        }
    }
}
