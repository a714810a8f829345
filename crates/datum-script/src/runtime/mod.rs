//! Runtime types and execution context.

pub mod context;
pub mod environment;
pub mod function;
pub mod object;
pub mod value;

pub use environment::Scope;
pub use function::{Callable, NativeFunction};
