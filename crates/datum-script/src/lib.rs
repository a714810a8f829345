// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # datum-script
//!
//! A shape-driven compiler from concrete syntax trees to operation nodes.
//!
//! ## Overview
//!
//! - [`lexer`] and [`parser`] turn source text into a concrete syntax tree
//!   ([`cst::CstNode`]) whose rule names and child layouts follow the
//!   JavaScript grammar
//! - [`compiler`] lowers any tree exposed through [`cst::SyntaxNode`] into a
//!   [`ast::Program`] of typed operation nodes
//! - [`vm`] and [`builtins`] run programs so the compiler can be exercised end
//!   to end
//!
//! ## Quick Start
//!
//! ```rust
//! use datum_script::{Engine, Value};
//!
//! let mut engine = Engine::new();
//! let result = engine.eval("var x = 5; x++; x;").unwrap();
//! assert_eq!(result, Value::Int(6));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod builtins;
pub mod compiler;
pub mod cst;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod vm;

#[cfg(feature = "async")]
mod async_engine;

#[cfg(feature = "async")]
pub use async_engine::AsyncEngine;
#[cfg(all(feature = "async", feature = "parallel"))]
pub use async_engine::ParallelCompiler;

use tracing::debug;

pub use ast::Program;
pub use compiler::{CompileError, Compiler};
pub use cst::CstNode;
pub use runtime::context::Context;
pub use runtime::value::Value;
pub use vm::Interpreter;

/// Parses source text into a concrete syntax tree.
pub fn parse(source: &str) -> Result<CstNode, Error> {
    let tree = parser::Parser::new(source).parse_program()?;
    debug!(tree = %tree, "parsed");
    Ok(tree)
}

/// Parses and compiles source text into a program.
pub fn compile(source: &str) -> Result<Program, Error> {
    let tree = parse(source)?;
    Ok(Compiler::new().compile(&tree)?)
}

/// The main engine instance.
///
/// Holds the global scope and the interpreter, so bindings made by one
/// [`Engine::eval`] call are visible to the next.
#[derive(Debug, Default)]
pub struct Engine {
    context: Context,
    interpreter: Interpreter,
}

impl Engine {
    /// Creates a new engine with the builtins registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles source code without running it.
    pub fn compile(&self, source: &str) -> Result<Program, Error> {
        compile(source)
    }

    /// Evaluates source code and returns the value of its last statement.
    ///
    /// # Examples
    ///
    /// ```rust
    /// let mut engine = datum_script::Engine::new();
    /// let result = engine.eval("2 + 2;").unwrap();
    /// assert_eq!(result, datum_script::Value::Int(4));
    /// ```
    pub fn eval(&mut self, source: &str) -> Result<Value, Error> {
        let program = compile(source)?;
        self.run(&program)
    }

    /// Runs an already compiled program.
    pub fn run(&mut self, program: &Program) -> Result<Value, Error> {
        self.interpreter.run(program, &self.context.globals)
    }

    /// Evaluates source code from a file.
    pub fn eval_file(&mut self, path: &std::path::Path) -> Result<Value, Error> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        self.eval(&source)
    }

    /// Binds a global, replacing any existing binding.
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.context.set_global(name, value);
    }

    /// Reads a global.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.context.get_global(name)
    }

    /// Also write `print` output to stdout.
    pub fn set_echo(&mut self, echo: bool) {
        self.interpreter.set_echo(echo);
    }

    /// Takes the lines written by `print` since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        self.interpreter.take_output()
    }
}

/// Errors that can occur while compiling or running a program.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Syntax error during parsing, or a redeclared variable
    #[error("SyntaxError: {0}")]
    SyntaxError(String),
    /// The syntax tree has a shape the compiler does not lower
    #[error("CompileError: {0}")]
    Compile(#[from] CompileError),
    /// Type error during execution
    #[error("TypeError: {0}")]
    TypeError(String),
    /// Reference error (undefined variable)
    #[error("ReferenceError: {0}")]
    ReferenceError(String),
    /// Range error (out of bounds, etc.)
    #[error("RangeError: {0}")]
    RangeError(String),
    /// Internal engine error
    #[error("InternalError: {0}")]
    InternalError(String),
    /// I/O error
    #[error("IOError: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_keeps_globals_between_evals() {
        let mut engine = Engine::new();
        engine.eval("var x = 5;").unwrap();
        assert_eq!(engine.eval("x + 1;").unwrap(), Value::Int(6));
        assert_eq!(engine.get_global("x"), Some(Value::Int(5)));
    }

    #[test]
    fn test_engine_set_global() {
        let mut engine = Engine::new();
        engine.set_global("limit", Value::Int(3));
        assert_eq!(engine.eval("limit * 2;").unwrap(), Value::Int(6));
    }

    #[test]
    fn test_engine_output() {
        let mut engine = Engine::new();
        engine.eval("print('hello', 'world');").unwrap();
        assert_eq!(engine.take_output(), vec!["hello world".to_string()]);
    }

    #[test]
    fn test_error_display() {
        let err = compile("x <<= 1;").unwrap_err();
        assert!(err.to_string().starts_with("CompileError: unsupported"));
        assert_eq!(
            Error::ReferenceError("x is not defined".into()).to_string(),
            "ReferenceError: x is not defined"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(compile("var = ;"), Err(Error::SyntaxError(_))));
    }

    #[test]
    fn test_eval_file_missing() {
        let mut engine = Engine::new();
        let err = engine
            .eval_file(std::path::Path::new("/nonexistent/script.ds"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
