//! Lexical scopes for variable binding.
//!
//! A [`Scope`] is a shared handle to one environment in a chain. Closures
//! keep the scope they were defined in alive; each call runs in a fresh child
//! of that scope. This is also where [`ResolutionPolicy`] is enforced.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::value::Value;
use crate::Error;
use crate::ast::ResolutionPolicy;

/// The bindings of one scope level.
#[derive(Debug, Default)]
struct Environment {
    bindings: FxHashMap<String, Value>,
    outer: Option<Scope>,
}

/// A shared handle to a scope in the chain.
#[derive(Debug, Clone, Default)]
pub struct Scope(Arc<Mutex<Environment>>);

impl Scope {
    /// Creates a new global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new scope nested inside this one.
    pub fn child(&self) -> Self {
        Scope(Arc::new(Mutex::new(Environment {
            bindings: FxHashMap::default(),
            outer: Some(self.clone()),
        })))
    }

    /// Looks a name up through the chain.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let outer = {
                let env = current.0.lock();
                if let Some(value) = env.bindings.get(name) {
                    return Some(value.clone());
                }
                env.outer.clone()
            };
            current = outer?;
        }
    }

    /// Binds `name` in this scope, replacing any existing binding.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.lock().bindings.insert(name.into(), value);
    }

    /// Updates the nearest existing binding. Returns false if none exists.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        let mut current = self.clone();
        loop {
            let outer = {
                let mut env = current.0.lock();
                if let Some(slot) = env.bindings.get_mut(name) {
                    *slot = value;
                    return true;
                }
                env.outer.clone()
            };
            match outer {
                Some(outer) => current = outer,
                None => return false,
            }
        }
    }

    /// Stores `value` under `name` according to `policy`.
    ///
    /// - `CannotExist` binds in this scope and fails if already bound here.
    /// - `MustExist` updates the nearest binding and fails if there is none.
    /// - `Unconstrained` binds here for declarations; otherwise it updates
    ///   the nearest binding or creates one here.
    pub fn bind(
        &self,
        name: &str,
        value: Value,
        policy: ResolutionPolicy,
        declaration: bool,
    ) -> Result<(), Error> {
        match policy {
            ResolutionPolicy::CannotExist => {
                let mut env = self.0.lock();
                if env.bindings.contains_key(name) {
                    return Err(Error::SyntaxError(format!(
                        "Variable '{}' already declared in this scope",
                        name
                    )));
                }
                env.bindings.insert(name.to_string(), value);
                Ok(())
            }
            ResolutionPolicy::MustExist => {
                if self.assign(name, value) {
                    Ok(())
                } else {
                    Err(Error::ReferenceError(format!("{} is not defined", name)))
                }
            }
            ResolutionPolicy::Unconstrained => {
                if declaration {
                    self.define(name, value);
                } else if let Err(value) = self.try_assign(name, value) {
                    self.define(name, value);
                }
                Ok(())
            }
        }
    }

    fn try_assign(&self, name: &str, value: Value) -> Result<(), Value> {
        if self.resolve(name).is_some() {
            self.assign(name, value);
            Ok(())
        } else {
            Err(value)
        }
    }

    /// The scope holding the nearest binding of `name`.
    fn resolve(&self, name: &str) -> Option<Scope> {
        let mut current = self.clone();
        loop {
            let outer = {
                let env = current.0.lock();
                if env.bindings.contains_key(name) {
                    return Some(current.clone());
                }
                env.outer.clone()
            };
            current = outer?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let scope = Scope::new();
        scope.define("x", Value::Int(1));
        assert_eq!(scope.get("x"), Some(Value::Int(1)));
        assert_eq!(scope.get("y"), None);
    }

    #[test]
    fn test_child_sees_outer() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let inner = global.child();
        assert_eq!(inner.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_assign_updates_nearest() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let inner = global.child();
        assert!(inner.assign("x", Value::Int(2)));
        assert_eq!(global.get("x"), Some(Value::Int(2)));
        assert!(!inner.assign("missing", Value::Null));
    }

    #[test]
    fn test_cannot_exist_rejects_redeclaration() {
        let scope = Scope::new();
        scope
            .bind("x", Value::Int(5), ResolutionPolicy::CannotExist, true)
            .unwrap();
        let err = scope
            .bind("x", Value::Int(6), ResolutionPolicy::CannotExist, true)
            .unwrap_err();
        assert!(matches!(err, Error::SyntaxError(msg) if msg.contains("already declared")));
        assert_eq!(scope.get("x"), Some(Value::Int(5)));
    }

    #[test]
    fn test_cannot_exist_allows_shadowing() {
        let global = Scope::new();
        global.define("x", Value::Int(1));
        let inner = global.child();
        inner
            .bind("x", Value::Int(2), ResolutionPolicy::CannotExist, true)
            .unwrap();
        assert_eq!(inner.get("x"), Some(Value::Int(2)));
        assert_eq!(global.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn test_must_exist() {
        let scope = Scope::new();
        let err = scope
            .bind("x", Value::Int(1), ResolutionPolicy::MustExist, false)
            .unwrap_err();
        assert!(matches!(err, Error::ReferenceError(_)));

        scope.define("x", Value::Int(1));
        scope
            .bind("x", Value::Int(2), ResolutionPolicy::MustExist, false)
            .unwrap();
        assert_eq!(scope.get("x"), Some(Value::Int(2)));
    }

    #[test]
    fn test_unconstrained_creates_or_updates() {
        let global = Scope::new();
        let inner = global.child();

        inner
            .bind("fresh", Value::Int(1), ResolutionPolicy::Unconstrained, false)
            .unwrap();
        assert_eq!(inner.get("fresh"), Some(Value::Int(1)));
        assert_eq!(global.get("fresh"), None);

        global.define("shared", Value::Int(1));
        inner
            .bind("shared", Value::Int(2), ResolutionPolicy::Unconstrained, false)
            .unwrap();
        assert_eq!(global.get("shared"), Some(Value::Int(2)));

        inner
            .bind("shared", Value::Int(3), ResolutionPolicy::Unconstrained, true)
            .unwrap();
        assert_eq!(inner.get("shared"), Some(Value::Int(3)));
        assert_eq!(global.get("shared"), Some(Value::Int(2)));
    }
}
