//! Runtime value representation.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use super::function::Callable;
use super::object::Object;
use crate::ast::Literal;

/// Shared, mutable list storage.
pub type ListRef = Arc<Mutex<Vec<Value>>>;

/// Shared, mutable object storage.
pub type ObjectRef = Arc<Mutex<Object>>;

/// A runtime value.
///
/// Values are thread-safe and can be shared between async tasks. Lists and
/// objects have reference semantics: cloning a value aliases the same storage.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// null
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// Double precision number
    Float(f64),
    /// String
    String(String),
    /// List reference
    List(ListRef),
    /// Object reference
    Object(ObjectRef),
    /// Function reference
    Function(Arc<Callable>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Lowers a compiled literal into a runtime value.
    ///
    /// Single precision literals widen through their shortest decimal form,
    /// so `0.1` stays `0.1` rather than `0.10000000149011612`.
    pub fn from_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(n) => Value::Int(i64::from(*n)),
            Literal::Long(n) => Value::Int(*n),
            Literal::Float(f) => {
                Value::Float(f.to_string().parse::<f64>().unwrap_or(f64::from(*f)))
            }
            Literal::Double(f) => Value::Float(*f),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Null => Value::Null,
        }
    }

    /// Creates a list value.
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Arc::new(Mutex::new(items)))
    }

    /// Creates an empty object value.
    pub fn object() -> Self {
        Value::Object(Arc::new(Mutex::new(Object::new())))
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Converts the value to a boolean.
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => !f.is_nan() && *f != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::List(_) | Value::Object(_) | Value::Function(_) => true,
        }
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    fn write_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.abs() < 1e16 {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                // A list that contains itself is already locked further up
                let Some(items) = items.try_lock() else {
                    return write!(f, "[...]");
                };
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.write_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Object(object) => {
                let Some(object) = object.try_lock() else {
                    return write!(f, "{{...}}");
                };
                let mut keys: Vec<_> = object.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    if let Some(value) = object.get(key) {
                        value.write_nested(f)?;
                    }
                }
                write!(f, "}}")
            }
            Value::Function(callable) => match callable.as_ref() {
                Callable::Closure { definition, .. } => {
                    write!(f, "[Function: {}]", definition.name)
                }
                Callable::Native { name, .. } => {
                    write!(f, "[Function: {} (native)]", name)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_literal() {
        assert_eq!(Value::from_literal(&Literal::Int(5)), Value::Int(5));
        assert_eq!(Value::from_literal(&Literal::Long(1 << 40)), Value::Int(1 << 40));
        assert_eq!(Value::from_literal(&Literal::Float(0.1)), Value::Float(0.1));
        assert_eq!(Value::from_literal(&Literal::Double(1e300)), Value::Float(1e300));
        assert_eq!(Value::from_literal(&Literal::Null), Value::Null);
    }

    #[test]
    fn test_numeric_equality_across_kinds() {
        assert_eq!(Value::Int(2), Value::Float(2.0));
        assert_ne!(Value::Int(2), Value::String("2".into()));
    }

    #[test]
    fn test_list_identity() {
        let a = Value::list(vec![Value::Int(1)]);
        let b = a.clone();
        let c = Value::list(vec![Value::Int(1)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_to_boolean() {
        assert!(!Value::Null.to_boolean());
        assert!(!Value::Int(0).to_boolean());
        assert!(Value::Int(-1).to_boolean());
        assert!(!Value::String(String::new()).to_boolean());
        assert!(Value::list(vec![]).to_boolean());
    }

    #[test]
    fn test_display() {
        let list = Value::list(vec![Value::Int(1), Value::from("a"), Value::Float(2.0)]);
        assert_eq!(list.to_string(), r#"[1, "a", 2.0]"#);

        let object = Value::object();
        if let Value::Object(inner) = &object {
            inner.lock().set("b".into(), Value::Int(2));
            inner.lock().set("a".into(), Value::Null);
        }
        assert_eq!(object.to_string(), "{a: null, b: 2}");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
    }
}
