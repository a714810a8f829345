//! Output built-ins.

use crate::Error;
use crate::runtime::value::Value;
use crate::vm::Interpreter;

/// print - writes its arguments separated by spaces
pub fn print(interp: &mut Interpreter, args: &[Value]) -> Result<Value, Error> {
    let output: Vec<String> = args.iter().map(|v| format!("{}", v)).collect();
    interp.write_line(output.join(" "));
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_joins_arguments() {
        let mut interp = Interpreter::new();
        print(&mut interp, &[Value::from("x ="), Value::Int(1)]).unwrap();
        print(&mut interp, &[]).unwrap();
        assert_eq!(interp.output(), ["x = 1".to_string(), String::new()]);
    }
}
