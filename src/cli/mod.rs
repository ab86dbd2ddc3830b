use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rill")]
#[command(version = "0.1.0")]
#[command(about = "Interpreter for the Rill expression language")]
pub struct Cli {
    /// Source file to interpret
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
