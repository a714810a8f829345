//! The reference interpreter for compiled programs.
//!
//! ## Structure
//!
//! - `interpreter` - tree-walking execution of operation nodes
//! - `operators` - arithmetic, bitwise and ordering operators
//! - `comparison` - equality and ordering of values

mod interpreter;

pub mod comparison;
pub mod operators;

pub use interpreter::{Interpreter, MAX_CALL_DEPTH};
