//! List and object built-ins.

use crate::Error;
use crate::runtime::value::Value;
use crate::vm::Interpreter;

/// len(x) - number of items in a list, characters in a string or fields in an object
pub fn len(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let count = match args.first().unwrap_or(&Value::Null) {
        Value::List(items) => items.lock().len(),
        Value::String(s) => s.chars().count(),
        Value::Object(fields) => fields.lock().len(),
        other => {
            return Err(Error::TypeError(format!(
                "object of type {} has no len()",
                other.type_of()
            )));
        }
    };
    Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
}

/// object() - a new empty object
pub fn object(_interp: &mut Interpreter, _args: &[Value]) -> Result<Value, Error> {
    Ok(Value::object())
}

/// list(...) - a new list holding the arguments
pub fn list(_interp: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    Ok(Value::list(args.to_vec()))
}
