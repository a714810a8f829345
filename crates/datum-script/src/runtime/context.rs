//! Execution context.

use super::environment::Scope;
use super::value::Value;
use crate::builtins;

/// The global state a program runs against.
///
/// Builtins live in their own outer scope, so top-level declarations shadow
/// them instead of colliding with them.
#[derive(Debug, Clone)]
pub struct Context {
    /// The global scope, a child of the builtin scope
    pub globals: Scope,
}

impl Context {
    /// Creates a context with the builtins registered.
    pub fn new() -> Self {
        let builtins = Scope::new();
        for (name, value) in builtins::register_builtins() {
            builtins.define(name, value);
        }
        Self {
            globals: builtins.child(),
        }
    }

    /// Binds a global, replacing any existing binding.
    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.define(name, value);
    }

    /// Reads a global.
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(name)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ResolutionPolicy;

    #[test]
    fn test_builtins_registered() {
        let context = Context::new();
        for name in ["print", "len", "object", "list"] {
            assert!(
                matches!(context.get_global(name), Some(Value::Function(_))),
                "missing builtin {}",
                name
            );
        }
    }

    #[test]
    fn test_declaration_shadows_builtin() {
        let context = Context::new();
        context
            .globals
            .bind("len", Value::Int(3), ResolutionPolicy::CannotExist, true)
            .unwrap();
        assert_eq!(context.get_global("len"), Some(Value::Int(3)));

        let fresh = Context::new();
        assert!(matches!(fresh.get_global("len"), Some(Value::Function(_))));
    }

    #[test]
    fn test_set_global() {
        let context = Context::new();
        context.set_global("answer", Value::Int(42));
        assert_eq!(context.get_global("answer"), Some(Value::Int(42)));
    }
}
