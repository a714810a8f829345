//! The tree-walking interpreter.

use std::sync::Arc;

use tracing::{debug, trace};

use super::operators;
use crate::Error;
use crate::ast::{BinaryOperator, Node, Program};
use crate::runtime::environment::Scope;
use crate::runtime::function::Callable;
use crate::runtime::value::Value;

/// Maximum nesting of script function calls.
pub const MAX_CALL_DEPTH: usize = 256;

/// How a statement finished.
#[derive(Debug)]
enum Completion {
    /// Fell through with a value
    Normal(Value),
    /// Hit a `return`
    Return(Value),
}

/// Executes compiled programs against a scope chain.
///
/// The interpreter owns the value stack used by `StackPush`/`StackPop` and
/// the lines written by `print`.
#[derive(Debug, Default)]
pub struct Interpreter {
    stack: Vec<Value>,
    output: Vec<String>,
    echo: bool,
    depth: usize,
}

impl Interpreter {
    /// Creates an interpreter that records output without printing it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write `print` output to stdout.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    /// Lines written by `print` so far.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Takes the recorded output, leaving it empty.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Records a line of program output.
    pub fn write_line(&mut self, line: String) {
        debug!(target: "datum_script::print", "{}", line);
        if self.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }

    /// Runs a program. Its value is the value of the last statement executed,
    /// or the value of a top-level `return`.
    pub fn run(&mut self, program: &Program, scope: &Scope) -> Result<Value, Error> {
        self.stack.clear();
        self.depth = 0;
        debug!(statements = program.body.len(), "running program");
        match self.execute_all(&program.body, scope)? {
            Completion::Normal(value) | Completion::Return(value) => Ok(value),
        }
    }

    /// Calls a function value with already evaluated arguments.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, Error> {
        let Value::Function(callable) = callee else {
            return Err(Error::TypeError(format!(
                "{} is not a function",
                callee.type_of()
            )));
        };

        match callable.as_ref() {
            Callable::Native { func, .. } => {
                check_arity(callable, &args)?;
                func(self, &args)
            }
            Callable::Closure { definition, scope } => {
                if self.depth >= MAX_CALL_DEPTH {
                    return Err(Error::RangeError("Maximum call stack size exceeded".into()));
                }
                trace!(function = %definition.name, args = args.len(), "call");

                let local = scope.child();
                let mut args = args.into_iter();
                for param in &definition.params {
                    local.define(param.clone(), args.next().unwrap_or_default());
                }

                self.depth += 1;
                let result = self.execute_all(&definition.body, &local);
                self.depth -= 1;

                match result? {
                    Completion::Return(value) => Ok(value),
                    Completion::Normal(_) => Ok(Value::Null),
                }
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn execute_all(&mut self, body: &[Node], scope: &Scope) -> Result<Completion, Error> {
        let mut last = Value::Null;
        for node in body {
            match self.execute(node, scope)? {
                Completion::Normal(value) => last = value,
                ret @ Completion::Return(_) => return Ok(ret),
            }
        }
        Ok(Completion::Normal(last))
    }

    fn execute(&mut self, node: &Node, scope: &Scope) -> Result<Completion, Error> {
        match node {
            Node::Return(value) => Ok(Completion::Return(self.evaluate(value, scope)?)),
            Node::ScopeBlock(body) => self.execute_all(body, scope),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, scope)?.to_boolean() {
                    self.execute_all(then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.execute_all(else_branch, scope)
                } else {
                    Ok(Completion::Normal(Value::Null))
                }
            }
            other => Ok(Completion::Normal(self.evaluate(other, scope)?)),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn evaluate(&mut self, node: &Node, scope: &Scope) -> Result<Value, Error> {
        match node {
            Node::Literal(literal) => Ok(Value::from_literal(literal)),

            Node::GetVariable { name } => scope
                .get(name)
                .ok_or_else(|| Error::ReferenceError(format!("{} is not defined", name))),

            Node::SetVariable {
                name,
                value,
                policy,
                declaration,
            } => {
                let value = self.evaluate(value, scope)?;
                scope.bind(name, value.clone(), *policy, *declaration)?;
                Ok(value)
            }

            Node::GetMember { object, member } => {
                let object = self.evaluate(object, scope)?;
                get_member(&object, member)
            }

            Node::SetMember {
                object,
                member,
                value,
            } => {
                let object = self.evaluate(object, scope)?;
                let value = self.evaluate(value, scope)?;
                set_member(&object, member, value.clone())?;
                Ok(value)
            }

            Node::GetIndex { object, index } => {
                let object = self.evaluate(object, scope)?;
                let index = self.evaluate(index, scope)?;
                get_index(&object, &index)
            }

            Node::SetIndex {
                object,
                index,
                value,
            } => {
                let object = self.evaluate(object, scope)?;
                let index = self.evaluate(index, scope)?;
                let value = self.evaluate(value, scope)?;
                set_index(&object, &index, value.clone())?;
                Ok(value)
            }

            Node::Call { callee, arguments } => {
                let callee = self.evaluate(callee, scope)?;
                let args = arguments
                    .iter()
                    .map(|arg| self.evaluate(arg, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call(&callee, args)
            }

            Node::CreateList { elements } => {
                let items = elements
                    .iter()
                    .map(|element| self.evaluate(element, scope))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::list(items))
            }

            Node::Binary {
                operator: BinaryOperator::And,
                left,
                right,
            } => {
                if !self.evaluate(left, scope)?.to_boolean() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(self.evaluate(right, scope)?.to_boolean()))
            }

            Node::Binary {
                operator: BinaryOperator::Or,
                left,
                right,
            } => {
                if self.evaluate(left, scope)?.to_boolean() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(self.evaluate(right, scope)?.to_boolean()))
            }

            Node::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left, scope)?;
                let right = self.evaluate(right, scope)?;
                operators::binary(*operator, &left, &right)
            }

            Node::Unary { operator, operand } => {
                let operand = self.evaluate(operand, scope)?;
                operators::unary(*operator, &operand)
            }

            Node::StackPush(inner) => {
                let value = self.evaluate(inner, scope)?;
                self.stack.push(value.clone());
                Ok(value)
            }

            Node::StackPop(inner) => {
                self.evaluate(inner, scope)?;
                self.stack
                    .pop()
                    .ok_or_else(|| Error::InternalError("value stack underflow".into()))
            }

            Node::FunctionDefinition(definition) => {
                Ok(Value::Function(Arc::new(Callable::Closure {
                    definition: Arc::clone(definition),
                    scope: scope.clone(),
                })))
            }

            Node::Return(_) | Node::If { .. } | Node::ScopeBlock(_) => Err(Error::InternalError(
                "statement node in expression position".into(),
            )),
        }
    }
}

/// Rejects a call whose argument count differs from a fixed native arity.
fn check_arity(callable: &Callable, args: &[Value]) -> Result<(), Error> {
    // negative arity is variadic
    let Ok(expected) = usize::try_from(callable.arity()) else {
        return Ok(());
    };
    if args.len() != expected {
        return Err(Error::TypeError(format!(
            "{}() takes {} argument{} but {} were given",
            callable.name(),
            expected,
            if expected == 1 { "" } else { "s" },
            args.len()
        )));
    }
    Ok(())
}

// ============================================================================
// Member and index access
// ============================================================================

fn get_member(object: &Value, member: &str) -> Result<Value, Error> {
    match object {
        Value::Object(fields) => Ok(fields.lock().get(member).cloned().unwrap_or_default()),
        Value::List(items) if member == "length" => Ok(length(items.lock().len())),
        Value::String(s) if member == "length" => Ok(length(s.chars().count())),
        Value::List(_) | Value::String(_) => Ok(Value::Null),
        other => Err(Error::TypeError(format!(
            "Cannot read property '{}' of {}",
            member,
            other.type_of()
        ))),
    }
}

fn set_member(object: &Value, member: &str, value: Value) -> Result<(), Error> {
    match object {
        Value::Object(fields) => {
            fields.lock().set(member.to_string(), value);
            Ok(())
        }
        other => Err(Error::TypeError(format!(
            "Cannot set property '{}' of {}",
            member,
            other.type_of()
        ))),
    }
}

fn get_index(object: &Value, index: &Value) -> Result<Value, Error> {
    match (object, index) {
        (Value::List(items), Value::Int(i)) => {
            let items = items.lock();
            Ok(position(*i, items.len())
                .map(|i| items[i].clone())
                .unwrap_or_default())
        }
        (Value::String(s), Value::Int(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map(|c| Value::String(c.to_string()))
            .unwrap_or_default()),
        (Value::Object(fields), Value::String(key)) => {
            Ok(fields.lock().get(key).cloned().unwrap_or_default())
        }
        (object, index) => Err(Error::TypeError(format!(
            "{} cannot be indexed by {}",
            object.type_of(),
            index.type_of()
        ))),
    }
}

fn set_index(object: &Value, index: &Value, value: Value) -> Result<(), Error> {
    match (object, index) {
        (Value::List(items), Value::Int(i)) => {
            let mut items = items.lock();
            let len = items.len();
            let slot = position(*i, len).ok_or_else(|| {
                Error::RangeError(format!("index {} out of range for list of length {}", i, len))
            })?;
            items[slot] = value;
            Ok(())
        }
        (Value::Object(fields), Value::String(key)) => {
            fields.lock().set(key.clone(), value);
            Ok(())
        }
        (object, index) => Err(Error::TypeError(format!(
            "{} does not support item assignment by {}",
            object.type_of(),
            index.type_of()
        ))),
    }
}

fn position(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|&i| i < len)
}

fn length(len: usize) -> Value {
    Value::Int(i64::try_from(len).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Compiler;
    use crate::parser::Parser;
    use crate::runtime::context::Context;

    fn eval(src: &str) -> Result<Value, Error> {
        let root = Parser::new(src).parse_program()?;
        let program = Compiler::new().compile(&root)?;
        Interpreter::new().run(&program, &Context::new().globals)
    }

    fn eval_ok(src: &str) -> Value {
        eval(src).unwrap_or_else(|e| panic!("{} failed: {}", src, e))
    }

    #[test]
    fn test_eval_empty_program() {
        assert_eq!(eval_ok(""), Value::Null);
    }

    #[test]
    fn test_eval_literals() {
        assert_eq!(eval_ok("42;"), Value::Int(42));
        assert_eq!(eval_ok("0.1;"), Value::Float(0.1));
        assert_eq!(eval_ok("'hi';"), Value::from("hi"));
        assert_eq!(eval_ok("true;"), Value::Bool(true));
        assert_eq!(eval_ok("null;"), Value::Null);
        assert_eq!(eval_ok("9999999999;"), Value::Int(9_999_999_999));
    }

    #[test]
    fn test_eval_arithmetic() {
        assert_eq!(eval_ok("1 + 2 * 3;"), Value::Int(7));
        assert_eq!(eval_ok("(1 + 2) * 3;"), Value::Int(9));
        assert_eq!(eval_ok("2 ** 3 ** 2;"), Value::Int(512));
        assert_eq!(eval_ok("'a' + 1;"), Value::from("a1"));
        assert_eq!(eval_ok("-5 + 2;"), Value::Int(-3));
    }

    #[test]
    fn test_eval_variables() {
        assert_eq!(eval_ok("var x = 5; x * 2;"), Value::Int(10));
        assert_eq!(eval_ok("var x; x;"), Value::Null);
        assert!(matches!(eval("y;"), Err(Error::ReferenceError(_))));
    }

    #[test]
    fn test_eval_redeclaration_fails() {
        assert!(matches!(eval("var x = 5; var x = 6;"), Err(Error::SyntaxError(_))));
    }

    #[test]
    fn test_eval_postfix_increment() {
        assert_eq!(eval_ok("var x = 5; x++;"), Value::Int(5));
        assert_eq!(eval_ok("var x = 5; x++; x;"), Value::Int(6));
        assert_eq!(eval_ok("var x = 5; x--; x;"), Value::Int(4));
    }

    #[test]
    fn test_eval_prefix_increment() {
        assert_eq!(eval_ok("var x = 5; ++x;"), Value::Int(6));
        assert_eq!(eval_ok("var x = 5; --x; x;"), Value::Int(4));
    }

    #[test]
    fn test_eval_increment_undeclared_fails() {
        assert!(matches!(eval("z++;"), Err(Error::ReferenceError(_))));
        assert!(matches!(eval("z += 1;"), Err(Error::ReferenceError(_))));
    }

    #[test]
    fn test_eval_compound_assignment() {
        assert_eq!(eval_ok("var x = 10; x -= 3; x;"), Value::Int(7));
        assert_eq!(eval_ok("var x = 2; x **= 3;"), Value::Int(8));
    }

    #[test]
    fn test_eval_functions() {
        let src = "function add(a, b) { return a + b; } add(2, 3);";
        assert_eq!(eval_ok(src), Value::Int(5));
    }

    #[test]
    fn test_eval_missing_arguments_are_null() {
        assert_eq!(eval_ok("function f(a, b) { return b; } f(1);"), Value::Null);
    }

    #[test]
    fn test_eval_function_without_return() {
        assert_eq!(eval_ok("function f() { 1; } f();"), Value::Null);
    }

    #[test]
    fn test_eval_recursion() {
        let src = "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); } fact(10);";
        assert_eq!(eval_ok(src), Value::Int(3_628_800));
    }

    #[test]
    fn test_eval_closures_capture_scope() {
        let src = "
            var count = 0;
            function bump() { count = count + 1; return count; }
            bump(); bump();
            count;
        ";
        assert_eq!(eval_ok(src), Value::Int(2));
    }

    #[test]
    fn test_eval_call_depth_limit() {
        // Unoptimized frames are large; give the recursion room to hit the limit
        let handle = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| eval("function f() { return f(); } f();"))
            .unwrap();
        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(err, Error::RangeError(_)));
    }

    #[test]
    fn test_eval_native_arity() {
        let err = eval("len();").unwrap_err();
        assert_eq!(
            err,
            Error::TypeError("len() takes 1 argument but 0 were given".into())
        );
        assert!(matches!(eval("object(1);"), Err(Error::TypeError(_))));
        assert_eq!(eval_ok("len(list());"), Value::Int(0));
    }

    #[test]
    fn test_eval_calling_non_function() {
        assert!(matches!(eval("var x = 1; x();"), Err(Error::TypeError(_))));
    }

    #[test]
    fn test_eval_if_else() {
        assert_eq!(eval_ok("var x = 1; if (x > 0) { 'pos'; } else { 'neg'; }"), Value::from("pos"));
        assert_eq!(eval_ok("var x = -1; if (x > 0) 'pos'; else 'neg';"), Value::from("neg"));
        assert_eq!(eval_ok("if (false) 1;"), Value::Null);
    }

    #[test]
    fn test_eval_short_circuit() {
        assert_eq!(eval_ok("false && missing;"), Value::Bool(false));
        assert_eq!(eval_ok("true || missing;"), Value::Bool(true));
        assert_eq!(eval_ok("1 && 'x';"), Value::Bool(true));
    }

    #[test]
    fn test_eval_lists() {
        assert_eq!(eval_ok("var a = [1, 2, 3]; a[1];"), Value::Int(2));
        assert_eq!(eval_ok("var a = [1, 2, 3]; a.length;"), Value::Int(3));
        assert_eq!(eval_ok("var a = [1]; a[5];"), Value::Null);
        assert_eq!(eval_ok("var a = [1, 2]; a[0] = 9; a[0];"), Value::Int(9));
        assert_eq!(eval_ok("var a = [1, 2]; a[1] += 5; a[1];"), Value::Int(7));
        assert_eq!(eval_ok("var a = [1, 2]; a[0]++; a[0];"), Value::Int(2));
        assert!(matches!(eval("var a = [1]; a[3] = 0;"), Err(Error::RangeError(_))));
    }

    #[test]
    fn test_eval_list_aliasing() {
        assert_eq!(eval_ok("var a = [1]; var b = a; b[0] = 2; a[0];"), Value::Int(2));
    }

    #[test]
    fn test_eval_objects() {
        assert_eq!(eval_ok("var o = object(); o.x = 1; o.x;"), Value::Int(1));
        assert_eq!(eval_ok("var o = object(); o.missing;"), Value::Null);
        assert_eq!(eval_ok("var o = object(); o['k'] = 2; o.k;"), Value::Int(2));
        assert_eq!(eval_ok("var o = object(); o.n = 1; o.n++; o.n;"), Value::Int(2));
    }

    #[test]
    fn test_eval_strings() {
        assert_eq!(eval_ok("'hello'.length;"), Value::Int(5));
        assert_eq!(eval_ok("'hello'[1];"), Value::from("e"));
    }

    #[test]
    fn test_eval_member_of_null() {
        assert!(matches!(eval("null.x;"), Err(Error::TypeError(_))));
    }

    #[test]
    fn test_eval_top_level_return() {
        assert_eq!(eval_ok("return 1; 2;"), Value::Int(1));
    }

    #[test]
    fn test_print_output() {
        let root = Parser::new("print('a', 1); print([1, 'b']);")
            .parse_program()
            .unwrap();
        let program = Compiler::new().compile(&root).unwrap();
        let mut interp = Interpreter::new();
        interp.run(&program, &Context::new().globals).unwrap();
        assert_eq!(interp.take_output(), vec!["a 1".to_string(), r#"[1, "b"]"#.to_string()]);
        assert!(interp.output().is_empty());
    }
}
