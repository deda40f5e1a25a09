// Integration tests for the bytecode compiler and virtual machine.
//
// These run complete small programs end-to-end through
// lexer -> parser -> compiler -> vm and check the resulting value, the way
// tests/interpreter_tests.rs checks the interpreter's behavior.

use ruff_engine::compiler::Compiler;
use ruff_engine::lexer::Lexer;
use ruff_engine::parser::Parser;
use ruff_engine::value::Value;
use ruff_engine::vm::Vm;

fn run_code(code: &str) -> Value {
    let program = Parser::new(Lexer::new(code)).parse_program().expect("parse error");
    let mut compiler = Compiler::new();
    compiler.compile(&program).expect("compile error");
    let mut vm = Vm::new(compiler.bytecode());
    vm.run().expect("vm error");
    (**vm.last_popped_stack_elem()).clone()
}

#[test]
fn arithmetic_expression_statement() {
    assert_eq!(run_code("1 + 2 * 3 - 4 / 2;"), Value::Integer(5));
}

#[test]
fn let_bindings_persist_across_statements() {
    assert_eq!(run_code("let a = 5; let b = a * 2; b - a;"), Value::Integer(5));
}

#[test]
fn if_expression_used_as_a_value() {
    let program = "\
let x = 10;
let y = if (x > 5) { 1 } else { 0 };
y;
";
    assert_eq!(run_code(program), Value::Integer(1));
}

#[test]
fn nested_if_expressions() {
    let program = "\
let grade = 72;
if (grade > 90) { 4 } else {
    if (grade > 80) { 3 } else {
        if (grade > 70) { 2 } else { 1 }
    }
};
";
    assert_eq!(run_code(program), Value::Integer(2));
}

#[test]
fn string_literals_and_concatenation() {
    assert_eq!(run_code(r#""foo" + "bar";"#), Value::String("foobar".to_string()));
}

#[test]
fn boolean_and_comparison_operators() {
    assert_eq!(run_code("1 != 2;"), Value::Boolean(true));
    assert_eq!(run_code("(1 < 2) == true;"), Value::Boolean(true));
    assert_eq!(run_code("(1 > 2) == false;"), Value::Boolean(true));
}

#[test]
fn unbound_identifier_reports_a_compile_error() {
    let program = Parser::new(Lexer::new("x;")).parse_program().expect("parse error");
    let mut compiler = Compiler::new();
    let err = compiler.compile(&program).unwrap_err();
    assert_eq!(err.to_string(), "undefined name: x");
}
