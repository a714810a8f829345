//! Callable values.

use std::sync::Arc;

use super::environment::Scope;
use super::value::Value;
use crate::Error;
use crate::ast::FunctionDefinition;
use crate::vm::Interpreter;

/// A native (Rust) function.
pub type NativeFunction = fn(&mut Interpreter, &[Value]) -> Result<Value, Error>;

/// A callable value - either a compiled function or a native function.
#[derive(Clone)]
pub enum Callable {
    /// A compiled function and the scope it was defined in
    Closure {
        /// The compiled definition
        definition: Arc<FunctionDefinition>,
        /// The defining scope
        scope: Scope,
    },
    /// A native Rust function
    Native {
        /// The function name
        name: String,
        /// The arity (-1 for variadic)
        arity: i32,
        /// The native function pointer
        func: NativeFunction,
    },
}

impl Callable {
    /// The function name.
    pub fn name(&self) -> &str {
        match self {
            Callable::Closure { definition, .. } => &definition.name,
            Callable::Native { name, .. } => name,
        }
    }

    /// Returns the arity (-1 for variadic natives).
    pub fn arity(&self) -> i32 {
        match self {
            Callable::Closure { definition, .. } => {
                i32::try_from(definition.params.len()).unwrap_or(i32::MAX)
            }
            Callable::Native { arity, .. } => *arity,
        }
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Closure { definition, .. } => write!(f, "Closure({})", definition.name),
            Callable::Native { name, .. } => write!(f, "NativeFunction({})", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closure(name: &str, params: &[&str]) -> Callable {
        Callable::Closure {
            definition: Arc::new(FunctionDefinition {
                name: name.to_string(),
                params: params.iter().map(|p| p.to_string()).collect(),
                body: Vec::new(),
            }),
            scope: Scope::new(),
        }
    }

    #[test]
    fn test_closure_name_and_arity() {
        let callable = closure("add", &["a", "b"]);
        assert_eq!(callable.name(), "add");
        assert_eq!(callable.arity(), 2);
        assert!(format!("{:?}", callable).contains("add"));
    }

    #[test]
    fn test_native_function() {
        fn identity(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
            Ok(args.first().cloned().unwrap_or_default())
        }

        let callable = Callable::Native {
            name: "identity".to_string(),
            arity: 1,
            func: identity,
        };
        assert_eq!(callable.name(), "identity");
        assert_eq!(callable.arity(), 1);
        assert_eq!(format!("{:?}", callable), "NativeFunction(identity)");
    }
}
