// File: src/ast.rs
//
// Abstract syntax tree produced by the parser and consumed by the compiler.
// Modeled as a tagged sum type rather than an object hierarchy so every
// `match` over `Expr`/`Stmt` is exhaustive at compile time: adding a variant
// forces every consumer to say what it does with it instead of silently
// falling through a default branch.

/// A full parsed program: an ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let <name> = <value>;`
    Let { name: String, value: Expr },

    /// `return <value>;` — no call/return opcodes exist in this slice, so
    /// the compiler treats a top-level return like an expression statement.
    Return { value: Expr },

    /// A bare expression followed by `;` — its value is computed and then
    /// discarded (`OpPop`), save for the last-popped-slot convention the VM
    /// uses to report a program's result.
    Expression { value: Expr },

    /// `{ <statements...> }` — used for if/else arms.
    Block(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(String),
    IntegerLiteral(i64),
    StringLiteral(String),
    Boolean(bool),

    Prefix {
        operator: String,
        right: Box<Expr>,
    },

    Infix {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },

    If {
        condition: Box<Expr>,
        consequence: Box<Stmt>,
        alternative: Option<Box<Stmt>>,
    },

    // --- Extension points (see external interfaces): accepted by the AST
    // contract so a future parser can produce them, but this core's
    // compiler has no opcodes for them yet and rejects them with
    // CompileError::Unsupported.
    FunctionLiteral {
        parameters: Vec<String>,
        body: Box<Stmt>,
    },
    Call {
        function: Box<Expr>,
        arguments: Vec<Expr>,
    },
    ArrayLiteral(Vec<Expr>),
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    HashLiteral(Vec<(Expr, Expr)>),
}

impl Expr {
    /// Name used in diagnostics for variants this core declines to compile.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "Identifier",
            Expr::IntegerLiteral(_) => "IntegerLiteral",
            Expr::StringLiteral(_) => "StringLiteral",
            Expr::Boolean(_) => "Boolean",
            Expr::Prefix { .. } => "PrefixExpression",
            Expr::Infix { .. } => "InfixExpression",
            Expr::If { .. } => "IfExpression",
            Expr::FunctionLiteral { .. } => "FunctionLiteral",
            Expr::Call { .. } => "CallExpression",
            Expr::ArrayLiteral(_) => "ArrayLiteral",
            Expr::Index { .. } => "IndexExpression",
            Expr::HashLiteral(_) => "HashLiteral",
        }
    }
}
