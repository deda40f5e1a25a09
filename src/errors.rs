// File: src/errors.rs
//
// Error types for the execution engine.
//
// `CompileError` and `VmError` are the core's own boundary types: their
// `Display` strings are part of the engine's contract (tests assert against
// them verbatim), so they're spelled out with `thiserror` rather than
// composed from a generic message string. `RuffError`/`SourceLocation` are
// kept from the CLI-facing side of the codebase for presenting the thin
// parser's errors at a terminal, where a human benefits from a `-->`
// location line rather than a bare string.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Compile-time failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("unknown operator: {0}")]
    UnknownInfixOperator(String),

    #[error("unknown operator: {0}")]
    UnknownPrefixOperator(String),

    #[error("undefined name: {0}")]
    UndefinedName(String),

    #[error("unsupported expression: {0}")]
    Unsupported(&'static str),
}

/// Runtime failures raised while executing bytecode.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VmError {
    #[error("stack overflow")]
    StackOverflow,

    #[error("unsupported binary types for binary operation: {left} {right}")]
    UnsupportedBinaryTypes { left: &'static str, right: &'static str },

    #[error("unknown integer operator: {0}")]
    UnknownIntegerOperator(u8),

    #[error("unsupported type for negation: {0}")]
    UnsupportedNegation(&'static str),

    #[error("unknown operator: {op} ({left} {right})")]
    UnknownComparisonOperator { op: u8, left: &'static str, right: &'static str },
}

/// Source location information for tracking where code appears in a file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub file: Option<String>,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column, file: None }
    }

    pub fn unknown() -> Self {
        Self { line: 0, column: 0, file: None }
    }

    pub fn with_file(mut self, file: String) -> Self {
        self.file = Some(file);
        self
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Types of errors the thin parser surfaces.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    ParseError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ErrorKind::ParseError => write!(f, "Parse Error"),
        }
    }
}

/// A structured, pretty-printed error with location information.
#[derive(Debug, Clone)]
pub struct RuffError {
    pub kind: ErrorKind,
    pub message: String,
    pub location: SourceLocation,
    pub source_line: Option<String>,
}

impl RuffError {
    pub fn new(kind: ErrorKind, message: String, location: SourceLocation) -> Self {
        Self { kind, message, location, source_line: None }
    }

    pub fn with_source(mut self, source_line: String) -> Self {
        self.source_line = Some(source_line);
        self
    }

    pub fn parse_error(message: String, location: SourceLocation) -> Self {
        Self::new(ErrorKind::ParseError, message, location)
    }
}

impl fmt::Display for RuffError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind_str = format!("{}", self.kind);
        writeln!(f, "{}: {}", kind_str.red().bold(), self.message.bold())?;

        let location_str = format!("  --> {}", self.location);
        writeln!(f, "{}", location_str.bright_blue())?;

        if let Some(ref source) = self.source_line {
            writeln!(f, "   {}", "|".bright_blue())?;
            writeln!(
                f,
                "{} {} {}",
                format!("{:3}", self.location.line).bright_blue(),
                "|".bright_blue(),
                source
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for RuffError {}
