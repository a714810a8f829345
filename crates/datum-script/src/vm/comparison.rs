//! Equality and ordering of runtime values.

use std::cmp::Ordering;

use crate::runtime::value::Value;

/// Equality as used by `==` and `!=`.
///
/// Ints and floats compare numerically; lists, objects and functions compare
/// by identity. There is no coercion between strings, numbers and booleans.
pub fn equals(a: &Value, b: &Value) -> bool {
    a == b
}

/// Ordering as used by `<`, `>`, `<=` and `>=`.
///
/// Returns `None` for values that have no ordering, including NaN.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            let (a, b) = (a.as_f64()?, b.as_f64()?);
            a.partial_cmp(&b)
        }
    }
}

/// Returns true if both values are numbers or both are strings.
pub fn is_comparable(a: &Value, b: &Value) -> bool {
    matches!(
        (a, b),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_))
            | (Value::String(_), Value::String(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equals_same_type() {
        assert!(equals(&Value::Null, &Value::Null));
        assert!(equals(&Value::Bool(true), &Value::Bool(true)));
        assert!(!equals(&Value::Bool(true), &Value::Bool(false)));
        assert!(equals(&Value::from("foo"), &Value::from("foo")));
    }

    #[test]
    fn test_equals_numbers_across_kinds() {
        assert!(equals(&Value::Int(1), &Value::Float(1.0)));
        assert!(!equals(&Value::Int(1), &Value::Float(1.5)));
    }

    #[test]
    fn test_equals_does_not_coerce() {
        assert!(!equals(&Value::Int(42), &Value::from("42")));
        assert!(!equals(&Value::Bool(true), &Value::Int(1)));
        assert!(!equals(&Value::Null, &Value::Int(0)));
    }

    #[test]
    fn test_equals_nan() {
        assert!(!equals(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare(&Value::Int(1), &Value::Int(2)), Some(Ordering::Less));
        assert_eq!(compare(&Value::Float(2.5), &Value::Int(2)), Some(Ordering::Greater));
        assert_eq!(compare(&Value::from("b"), &Value::from("a")), Some(Ordering::Greater));
        assert_eq!(compare(&Value::Float(f64::NAN), &Value::Int(1)), None);
        assert_eq!(compare(&Value::from("1"), &Value::Int(1)), None);
        assert!(is_comparable(&Value::Int(1), &Value::Float(f64::NAN)));
        assert!(!is_comparable(&Value::Null, &Value::Int(1)));
    }
}
