//! Built-in global functions.
//!
//! - `print(...)` writes its arguments separated by spaces
//! - `len(x)` is the length of a list, string or object
//! - `object()` creates an empty object
//! - `list(...)` creates a list of its arguments

pub mod collections;
pub mod console;

use std::collections::HashMap;
use std::sync::Arc;

use crate::runtime::function::{Callable, NativeFunction};
use crate::runtime::value::Value;

/// Register all built-in functions.
pub fn register_builtins() -> HashMap<String, Value> {
    let mut globals = HashMap::new();

    globals.insert("print".to_string(), make_native("print", -1, console::print));

    globals.insert("len".to_string(), make_native("len", 1, collections::len));
    globals.insert(
        "object".to_string(),
        make_native("object", 0, collections::object),
    );
    globals.insert("list".to_string(), make_native("list", -1, collections::list));

    globals
}

/// Create a native function value.
pub fn make_native(name: &str, arity: i32, func: NativeFunction) -> Value {
    Value::Function(Arc::new(Callable::Native {
        name: name.to_string(),
        arity,
        func,
    }))
}
