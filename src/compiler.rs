// File: src/compiler.rs
//
// Bytecode compiler: walks the AST and emits a `Bytecode` artifact
// containing a flat instruction stream and an ordered constant pool.
//
// Two pieces of compile-time bookkeeping make this a single-pass compiler
// instead of a two-pass one: `last_instruction`/`previous_instruction` (so an
// if-expression's auto-emitted `OpPop` can be stripped when a block turns out
// to be used as an expression) and backpatching (`replace_instruction`,
// `change_operand`) for forward jumps whose target isn't known until the
// compiler has walked past them.

use std::collections::HashMap;
use std::convert::TryFrom;

use crate::ast::{Expr, Program, Stmt};
use crate::bytecode::{make, Instructions, Opcode};
use crate::errors::CompileError;
use crate::value::Value;

/// Maps `let`-bound names to global slot indices. Global scope only — this
/// slice has no function bodies, so there is no local/enclosing chain to
/// walk.
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    store: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str) -> usize {
        let index = self.store.len();
        self.store.insert(name.to_string(), index);
        index
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.store.get(name).copied()
    }
}

/// The `(instructions, constants)` pair produced by a compile. Immutable
/// once returned.
#[derive(Debug, Clone)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EmittedInstruction {
    opcode: Opcode,
    position: usize,
}

pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Value>,
    symbol_table: SymbolTable,
    last_instruction: Option<EmittedInstruction>,
    previous_instruction: Option<EmittedInstruction>,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            instructions: Instructions::new(),
            constants: Vec::new(),
            symbol_table: SymbolTable::new(),
            last_instruction: None,
            previous_instruction: None,
        }
    }

    /// Reuse an existing global symbol table, for REPL continuity across
    /// successive compiles (mirrors `Vm::with_global_store`).
    pub fn with_symbol_table(symbol_table: SymbolTable) -> Self {
        Self { symbol_table, ..Self::new() }
    }

    pub fn into_symbol_table(self) -> SymbolTable {
        self.symbol_table
    }

    pub fn symbol_table(&self) -> SymbolTable {
        self.symbol_table.clone()
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for stmt in &program.statements {
            self.compile_stmt(stmt)?;
        }
        Ok(())
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode { instructions: self.instructions, constants: self.constants }
    }

    fn compile_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Expression { value } => {
                self.compile_expr(value)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }

            Stmt::Let { name, value } => {
                self.compile_expr(value)?;
                let index = self.symbol_table.define(name);
                self.emit(Opcode::SetGlobal, &[index]);
                Ok(())
            }

            // No call frames exist in this slice, so a top-level `return`
            // has nowhere to return to; it's compiled like an expression
            // statement, which still exercises the expression for operator
            // validation and constant folding without inventing OpCall/
            // OpReturn machinery that's out of scope here.
            Stmt::Return { value } => {
                self.compile_expr(value)?;
                self.emit(Opcode::Pop, &[]);
                Ok(())
            }

            Stmt::Block(statements) => {
                for stmt in statements {
                    self.compile_stmt(stmt)?;
                }
                Ok(())
            }
        }
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::IntegerLiteral(n) => {
                let index = self.add_constant(Value::Integer(*n));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }

            Expr::StringLiteral(s) => {
                let index = self.add_constant(Value::String(s.clone()));
                self.emit(Opcode::Constant, &[index]);
                Ok(())
            }

            Expr::Boolean(true) => {
                self.emit(Opcode::True, &[]);
                Ok(())
            }
            Expr::Boolean(false) => {
                self.emit(Opcode::False, &[]);
                Ok(())
            }

            Expr::Identifier(name) => {
                let index = self
                    .symbol_table
                    .resolve(name)
                    .ok_or_else(|| CompileError::UndefinedName(name.clone()))?;
                self.emit(Opcode::GetGlobal, &[index]);
                Ok(())
            }

            Expr::Infix { left, operator, right } => self.compile_infix(left, operator, right),

            Expr::Prefix { operator, right } => {
                self.compile_expr(right)?;
                match operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    _ => return Err(CompileError::UnknownPrefixOperator(operator.clone())),
                };
                Ok(())
            }

            Expr::If { condition, consequence, alternative } => {
                self.compile_expr(condition)?;

                // Placeholder operand, backpatched once the consequence's
                // end (or a following alternative) is known.
                let jump_not_truthy_pos = self.emit(Opcode::JumpNotTruthy, &[9999]);

                self.compile_stmt(consequence)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }

                let jump_pos = self.emit(Opcode::Jump, &[9999]);

                let after_consequence_pos = self.instructions.len();
                self.change_operand(jump_not_truthy_pos, after_consequence_pos);

                match alternative {
                    Some(alt) => {
                        self.compile_stmt(alt)?;
                        if self.last_instruction_is(Opcode::Pop) {
                            self.remove_last_pop();
                        }
                    }
                    None => {
                        self.emit(Opcode::Null, &[]);
                    }
                }

                let after_alternative_pos = self.instructions.len();
                self.change_operand(jump_pos, after_alternative_pos);

                Ok(())
            }

            unsupported @ (Expr::FunctionLiteral { .. }
            | Expr::Call { .. }
            | Expr::ArrayLiteral(_)
            | Expr::Index { .. }
            | Expr::HashLiteral(_)) => Err(CompileError::Unsupported(unsupported.variant_name())),
        }
    }

    fn compile_infix(
        &mut self,
        left: &Expr,
        operator: &str,
        right: &Expr,
    ) -> Result<(), CompileError> {
        // `<` has no dedicated opcode: the instruction set only exposes
        // `OpGreaterThan`, so `a < b` is desugared here by swapping operand
        // order and emitting `OpGreaterThan` instead. Simpler runtime, one
        // fewer opcode.
        if operator == "<" {
            self.compile_expr(right)?;
            self.compile_expr(left)?;
            self.emit(Opcode::GreaterThan, &[]);
            return Ok(());
        }

        self.compile_expr(left)?;
        self.compile_expr(right)?;

        let op = match operator {
            "+" => Opcode::Add,
            "-" => Opcode::Sub,
            "*" => Opcode::Mul,
            "/" => Opcode::Div,
            "==" => Opcode::Equal,
            "!=" => Opcode::NotEqual,
            ">" => Opcode::GreaterThan,
            _ => return Err(CompileError::UnknownInfixOperator(operator.to_string())),
        };
        self.emit(op, &[]);
        Ok(())
    }

    fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = make(op, operands);
        let position = self.instructions.append(&instruction);

        self.previous_instruction = self.last_instruction;
        self.last_instruction = Some(EmittedInstruction { opcode: op, position });

        position
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        matches!(self.last_instruction, Some(last) if last.opcode == op)
    }

    fn remove_last_pop(&mut self) {
        if let Some(last) = self.last_instruction {
            self.instructions.0.truncate(last.position);
            self.last_instruction = self.previous_instruction;
        }
    }

    fn replace_instruction(&mut self, pos: usize, new_instruction: &[u8]) {
        self.instructions.replace(pos, new_instruction);
    }

    /// Re-`make` the instruction at `op_pos` with the same opcode and a new
    /// operand, overwriting it in place. Used to backpatch a forward jump
    /// once its target address is known.
    fn change_operand(&mut self, op_pos: usize, operand: usize) {
        let op = Opcode::try_from(self.instructions.0[op_pos])
            .expect("backpatch target must be a previously emitted, valid opcode");
        let new_instruction = make(op, &[operand]);
        log::trace!("backpatch at {op_pos}: operand -> {operand}");
        self.replace_instruction(op_pos, &new_instruction);
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile_source(input: &str) -> Bytecode {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program().expect("parser error");
        let mut compiler = Compiler::new();
        compiler.compile(&program).expect("compile error");
        compiler.bytecode()
    }

    fn concat_instructions(chunks: &[Vec<u8>]) -> Vec<u8> {
        chunks.iter().flatten().copied().collect()
    }

    #[test]
    fn integer_arithmetic() {
        let bytecode = compile_source("1 + 2");
        assert_eq!(bytecode.constants, vec![Value::Integer(1), Value::Integer(2)]);
        let expected = concat_instructions(&[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Add, &[]),
            make(Opcode::Pop, &[]),
        ]);
        assert_eq!(bytecode.instructions.0, expected);
    }

    #[test]
    fn less_than_reverses_operands_into_greater_than() {
        let bytecode = compile_source("1 < 2");
        assert_eq!(bytecode.constants, vec![Value::Integer(2), Value::Integer(1)]);
        let expected = concat_instructions(&[
            make(Opcode::Constant, &[0]),
            make(Opcode::Constant, &[1]),
            make(Opcode::GreaterThan, &[]),
            make(Opcode::Pop, &[]),
        ]);
        assert_eq!(bytecode.instructions.0, expected);
    }

    #[test]
    fn if_without_else_synthesizes_null_for_the_missing_arm() {
        let bytecode = compile_source("if (true) { 10 }; 3333;");
        let expected = concat_instructions(&[
            make(Opcode::True, &[]),               // 0000
            make(Opcode::JumpNotTruthy, &[10]),    // 0001
            make(Opcode::Constant, &[0]),          // 0004
            make(Opcode::Jump, &[11]),             // 0007
            make(Opcode::Null, &[]),               // 0010
            make(Opcode::Pop, &[]),                // 0011
            make(Opcode::Constant, &[1]),          // 0012
            make(Opcode::Pop, &[]),                // 0015
        ]);
        assert_eq!(bytecode.instructions.0, expected);
    }

    #[test]
    fn if_else_backpatches_both_jumps() {
        let bytecode = compile_source("if (false) { 10 } else { 20 }");
        let expected = concat_instructions(&[
            make(Opcode::False, &[]),
            make(Opcode::JumpNotTruthy, &[10]),
            make(Opcode::Constant, &[0]),
            make(Opcode::Jump, &[13]),
            make(Opcode::Constant, &[1]),
            make(Opcode::Pop, &[]),
        ]);
        assert_eq!(bytecode.instructions.0, expected);
    }

    #[test]
    fn let_binding_then_reference_uses_matching_global_slot() {
        let bytecode = compile_source("let one = 1; one;");
        let expected = concat_instructions(&[
            make(Opcode::Constant, &[0]),
            make(Opcode::SetGlobal, &[0]),
            make(Opcode::GetGlobal, &[0]),
            make(Opcode::Pop, &[]),
        ]);
        assert_eq!(bytecode.instructions.0, expected);
    }

    #[test]
    fn undefined_identifier_is_a_compile_error() {
        let mut parser = Parser::new(Lexer::new("foo;"));
        let program = parser.parse_program().expect("parser error");
        let mut compiler = Compiler::new();
        let err = compiler.compile(&program).unwrap_err();
        assert_eq!(err, CompileError::UndefinedName("foo".to_string()));
    }

    #[test]
    fn unknown_infix_operator_is_a_compile_error() {
        let mut compiler = Compiler::new();
        let program = Program {
            statements: vec![Stmt::Expression {
                value: Expr::Infix {
                    left: Box::new(Expr::IntegerLiteral(1)),
                    operator: "^".to_string(),
                    right: Box::new(Expr::IntegerLiteral(2)),
                },
            }],
        };
        let err = compiler.compile(&program).unwrap_err();
        assert_eq!(err, CompileError::UnknownInfixOperator("^".to_string()));
    }
}
