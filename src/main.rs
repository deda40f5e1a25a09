// File: src/main.rs
//
// Entry point for the bytecode compiler and virtual machine. Handles
// command-line argument parsing and dispatches to `run` (compile a file and
// execute it) or `repl` (interactive read-compile-execute loop).

mod ast;
mod bytecode;
mod compiler;
mod errors;
mod lexer;
mod parser;
mod repl;
mod value;
mod vm;

use clap::{Parser as ClapParser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use compiler::Compiler;
use errors::{RuffError, SourceLocation};
use lexer::Lexer;
use parser::Parser;
use vm::Vm;

#[derive(ClapParser)]
#[command(
    name = "ruff-engine",
    about = "A bytecode compiler and virtual machine for a small scripting language",
    version = env!("CARGO_PKG_VERSION"),
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(arg_required_else_help = true)]
enum Commands {
    /// Compile and run a script file
    Run {
        /// Path to the source file
        file: PathBuf,
    },

    /// Launch the interactive REPL
    Repl,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file } => match run_file(&file) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        },

        Commands::Repl => match repl::Repl::new() {
            Ok(mut repl) => {
                if let Err(e) = repl.run() {
                    eprintln!("REPL error: {e}");
                    return ExitCode::FAILURE;
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to start REPL: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn run_file(file: &PathBuf) -> Result<(), String> {
    let code = fs::read_to_string(file).map_err(|e| format!("failed to read {}: {e}", file.display()))?;

    let program = Parser::new(Lexer::new(&code)).parse_program().map_err(|e| {
        let location = SourceLocation::new(0, 0).with_file(file.to_string_lossy().into_owned());
        RuffError::parse_error(e.to_string(), location).to_string()
    })?;

    let mut compiler = Compiler::new();
    compiler.compile(&program).map_err(|e| format!("compilation error: {e}"))?;

    let mut vm = Vm::new(compiler.bytecode());
    vm.run().map_err(|e| format!("runtime error: {e}"))?;

    Ok(())
}
