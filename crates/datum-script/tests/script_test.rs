//! End-to-end tests: source text through the parser, compiler and interpreter.

use datum_script::ast::{BinaryOperator, Literal, Node, ResolutionPolicy};
use datum_script::{CompileError, Engine, Error, Value, compile};

fn eval(src: &str) -> Result<Value, Error> {
    Engine::new().eval(src)
}

fn eval_ok(src: &str) -> Value {
    eval(src).unwrap_or_else(|e| panic!("{} failed: {}", src, e))
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numeric_literals_keep_their_kind() {
    assert_eq!(compile("7;").unwrap().body, vec![Node::Literal(Literal::Int(7))]);
    assert_eq!(compile("0.25;").unwrap().body, vec![Node::Literal(Literal::Float(0.25))]);
    assert_eq!(eval_ok("7;").to_string(), "7");
    assert_eq!(eval_ok("0.25;").to_string(), "0.25");
    assert_eq!(eval_ok("2.0;").to_string(), "2.0");
}

#[test]
fn test_radix_literals_are_unimplemented() {
    for src in ["0xff;", "0o17;", "0b101;"] {
        assert!(
            matches!(compile(src), Err(Error::Compile(CompileError::UnimplementedLiteral { .. }))),
            "{} should be rejected",
            src
        );
    }
}

// ============================================================================
// Increments and assignment
// ============================================================================

#[test]
fn test_postfix_increment_yields_old_value() {
    let mut engine = Engine::new();
    assert_eq!(engine.eval("x = 5; x++;").unwrap(), Value::Int(5));
    assert_eq!(engine.eval("x;").unwrap(), Value::Int(6));
}

#[test]
fn test_prefix_increment_yields_new_value() {
    let mut engine = Engine::new();
    assert_eq!(engine.eval("x = 5; ++x;").unwrap(), Value::Int(6));
    assert_eq!(engine.eval("x;").unwrap(), Value::Int(6));
}

#[test]
fn test_redeclaration_fails() {
    let err = eval("var x = 5; var x = 6;").unwrap_err();
    assert!(matches!(err, Error::SyntaxError(ref msg) if msg.contains("already declared")));
}

#[test]
fn test_declarations_shadow_builtins() {
    assert_eq!(eval_ok("var list = [1]; list[0];"), Value::Int(1));
    assert_eq!(eval_ok("var len = 3; len;"), Value::Int(3));
    assert_eq!(eval_ok("var object = 1; object + 1;"), Value::Int(2));
    assert!(matches!(eval("var len = 1; var len = 2;"), Err(Error::SyntaxError(_))));
}

#[test]
fn test_plain_assignment_needs_no_declaration() {
    assert_eq!(eval_ok("x = 5;"), Value::Int(5));
    assert_eq!(eval_ok("x = 5; x = x + 1; x;"), Value::Int(6));
}

#[test]
fn test_assignment_policies() {
    let program = compile("var a = 1; a = 2; a += 3; a++;").unwrap();
    let policies: Vec<_> = program
        .body
        .iter()
        .map(|node| match node {
            Node::SetVariable { policy, .. } => *policy,
            Node::StackPop(inner) => match inner.as_ref() {
                Node::SetVariable { policy, .. } => *policy,
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(
        policies,
        vec![
            ResolutionPolicy::CannotExist,
            ResolutionPolicy::Unconstrained,
            ResolutionPolicy::MustExist,
            ResolutionPolicy::MustExist,
        ]
    );
}

// ============================================================================
// Calls and access
// ============================================================================

#[test]
fn test_call_argument_shapes() {
    let program = compile("f(1, 2+3, g());").unwrap();
    assert_eq!(
        program.body,
        vec![Node::Call {
            callee: Box::new(Node::get_variable("f")),
            arguments: vec![
                Node::int(1),
                Node::binary(BinaryOperator::Add, Node::int(2), Node::int(3)),
                Node::Call {
                    callee: Box::new(Node::get_variable("g")),
                    arguments: vec![],
                },
            ],
        }]
    );
}

#[test]
fn test_member_and_index_shapes() {
    let member = |object: Node, member: &str| Node::GetMember {
        object: Box::new(object),
        member: member.into(),
    };

    assert_eq!(compile("a.b;").unwrap().body, vec![member(Node::get_variable("a"), "b")]);
    assert_eq!(
        compile("a.b.c;").unwrap().body,
        vec![member(member(Node::get_variable("a"), "b"), "c")]
    );
    assert_eq!(
        compile("a[0];").unwrap().body,
        vec![Node::GetIndex {
            object: Box::new(Node::get_variable("a")),
            index: Box::new(Node::int(0)),
        }]
    );
}

#[test]
fn test_nested_data() {
    let src = "
        var o = object();
        o.items = [1, 2, 3];
        o.items[2] = o.items[0] + o.items[1];
        o.items;
    ";
    assert_eq!(eval_ok(src).to_string(), "[1, 2, 3]");
    assert_eq!(eval_ok("var l = list(1, 2); len(l) + len('abc');"), Value::Int(5));
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_body_is_isolated() {
    let program = compile("function f(a) { var local = a; return local; } 1;").unwrap();
    assert_eq!(program.body.len(), 2);

    let Node::SetVariable { name, value, declaration, .. } = &program.body[0] else {
        panic!("expected a function binding, got {:?}", program.body[0]);
    };
    assert_eq!(name, "f");
    assert!(*declaration);
    let Node::FunctionDefinition(definition) = value.as_ref() else {
        panic!("expected a function definition");
    };
    assert_eq!(definition.params, vec!["a".to_string()]);
    assert_eq!(definition.body.len(), 2);
    assert_eq!(program.body[1], Node::int(1));
}

#[test]
fn test_function_locals_do_not_leak() {
    let mut engine = Engine::new();
    engine
        .eval("function f() { var hidden = 1; return hidden; } f();")
        .unwrap();
    assert!(matches!(engine.eval("hidden;"), Err(Error::ReferenceError(_))));
}

#[test]
fn test_functions_can_redeclare_locals_per_call() {
    let src = "function f(n) { var v = n * 2; return v; } f(1) + f(2);";
    assert_eq!(eval_ok(src), Value::Int(6));
}

#[test]
fn test_program_output() {
    let mut engine = Engine::new();
    let src = "
        function greet(name) { print('hello', name); }
        greet('a');
        greet('b');
    ";
    engine.eval(src).unwrap();
    assert_eq!(engine.take_output(), vec!["hello a", "hello b"]);
}

// ============================================================================
// Failure policy
// ============================================================================

#[test]
fn test_unknown_construct_is_fatal() {
    let err = compile("var a = 1; a, 2; var b = 2;").unwrap_err();
    assert!(matches!(err, Error::Compile(CompileError::UnsupportedShape { .. })));
}

#[test]
fn test_error_fragment_points_at_source() {
    let src = "var a = 1;\na <<= 2;";
    let Err(Error::Compile(err)) = compile(src) else {
        panic!("expected a compile error");
    };
    assert_eq!(err.fragment(src), "2:3: `<<=`");
}

#[test]
fn test_unsupported_statements() {
    for src in ["let x = 1;", "const x = 1;", "var a = 1, b = 2;", "while (true) {}"] {
        assert!(
            matches!(compile(src), Err(Error::Compile(_))),
            "{} should be rejected",
            src
        );
    }
}
