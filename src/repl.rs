// File: src/repl.rs
//
// Interactive read-compile-execute loop. Each line is lexed, parsed,
// compiled, and run against a `Vm` that's recreated every iteration but
// fed the previous iteration's symbol table and global store, so `let`
// bindings persist across lines the same way they would across statements
// in one long program.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::compiler::{Compiler, SymbolTable};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::ValueRef;
use crate::vm::Vm;

const GLOBALS_SIZE: usize = 65536;

pub struct Repl {
    editor: DefaultEditor,
    symbol_table: SymbolTable,
    globals: Vec<ValueRef>,
}

impl Repl {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let editor = DefaultEditor::new()?;
        Ok(Self {
            editor,
            symbol_table: SymbolTable::new(),
            globals: vec![std::rc::Rc::new(crate::value::Value::Null); GLOBALS_SIZE],
        })
    }

    fn show_banner(&self) {
        println!("{}", "ruff-engine REPL".bright_cyan().bold());
        println!("{}", "Ctrl+D to exit.".dimmed());
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.show_banner();

        loop {
            match self.editor.readline(&"ruff> ".bright_green().to_string()) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());
                    if !line.trim().is_empty() {
                        self.eval_line(&line);
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => {
                    eprintln!("{} {}", "Error:".bright_red(), err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn eval_line(&mut self, line: &str) {
        let program = match Parser::new(Lexer::new(line)).parse_program() {
            Ok(program) => program,
            Err(err) => {
                println!("{} {}", "parse error:".bright_red(), err);
                return;
            }
        };

        let symbol_table = std::mem::take(&mut self.symbol_table);
        let mut compiler = Compiler::with_symbol_table(symbol_table);
        if let Err(err) = compiler.compile(&program) {
            println!("{} {}", "compile error:".bright_red(), err);
            self.symbol_table = compiler.into_symbol_table();
            return;
        }

        self.symbol_table = compiler.symbol_table();
        let bytecode = compiler.bytecode();
        let globals = std::mem::take(&mut self.globals);
        let mut vm = Vm::new_with_global_store(bytecode, globals);

        match vm.run() {
            Ok(()) => {
                let result = vm.last_popped_stack_elem();
                println!("{} {}", "=>".bright_blue(), result.to_string().bright_white());
            }
            Err(err) => {
                println!("{} {}", "runtime error:".bright_red(), err);
            }
        }

        self.globals = vm.into_globals();
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new().expect("failed to create REPL")
    }
}
