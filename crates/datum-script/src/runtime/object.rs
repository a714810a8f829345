//! Script object representation.

use rustc_hash::FxHashMap;

use super::value::Value;

/// A string-keyed bag of properties.
#[derive(Debug, Clone, Default)]
pub struct Object {
    /// The properties
    properties: FxHashMap<String, Value>,
}

impl Object {
    /// Creates a new empty object.
    pub fn new() -> Self {
        Self {
            properties: FxHashMap::default(),
        }
    }

    /// Gets a property value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Sets a property value.
    pub fn set(&mut self, key: String, value: Value) {
        self.properties.insert(key, value);
    }

    /// Iterates over the property names in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns true if the object has no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_get_set() {
        let mut object = Object::new();
        assert!(object.is_empty());
        object.set("x".into(), Value::Int(1));
        assert_eq!(object.get("x"), Some(&Value::Int(1)));
        assert_eq!(object.get("y"), None);
        object.set("x".into(), Value::Int(2));
        assert_eq!(object.len(), 1);
        assert_eq!(object.get("x"), Some(&Value::Int(2)));
    }
}
