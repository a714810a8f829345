//! Compiler from concrete syntax trees to operation nodes.
//!
//! Transforms a generic CST (see [`crate::cst`]) into a [`crate::ast::Program`]
//! that the interpreter in [`crate::vm`] executes.
//!
//! # Module Structure
//!
//! - `codegen`: the shape-driven `Compiler`
//!   - `codegen::destination`: statement sinks for nested bodies
//! - `error`: `CompileError`

pub mod codegen;
mod error;

pub use codegen::{Compiler, Destination, DestinationError, DestinationStack, EvalMode};
pub use error::CompileError;
