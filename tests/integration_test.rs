use std::{cell::RefCell, rc::Rc};

use rill::{
    ast::Program,
    interpreter::{value::Value, ExecutionError, Interpreter, RuntimeError},
};

fn parse(source: &str) -> Program {
    let tokens = rill::tokenizer::tokens(source).expect("Tokenize should work on valid program");
    rill::parser::program(&tokens).expect("Parse should work on valid program")
}

fn run_program(source: &str) -> (String, Result<(), ExecutionError>) {
    let program = parse(source);
    let output = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::new(output.clone());
    let result = interpreter.interpret(&program);
    let output = String::from_utf8(output.take()).expect("Output should be valid UTF-8");
    (output, result)
}

fn test_valid_program(source: &str, expected_output: &str) {
    let (output, result) = run_program(source);
    result.expect("Interpret should work on valid program");
    assert_eq!(output, expected_output);
}

fn run_expecting_error(source: &str) -> (String, RuntimeError) {
    let (output, result) = run_program(source);
    let ExecutionError::Execution { kind, .. } = result.expect_err("Interpret should fail");
    (output, kind)
}

#[test]
fn test_number_literals() {
    test_valid_program("print 42; print 3.5; print 0.5;", "42\n3.5\n0.5\n");
}

#[test]
fn test_shadowing() {
    let source = r#"
    let x = 1;
    {
        let x = 2;
        print x;
    }
    print x;
    "#;
    test_valid_program(source, "2\n1\n");
}

#[test]
fn test_array_aliasing() {
    let source = r#"
    let a = [1, 2, 3];
    let b = a;
    b[0] = 9;
    print a[0];
    "#;
    test_valid_program(source, "9\n");
}

#[test]
fn test_object_aliasing() {
    let source = r#"
    let o = {count: 1};
    let p = o;
    p.count = 5;
    print o.count;
    "#;
    test_valid_program(source, "5\n");
}

#[test]
fn test_arity_mismatch_skips_body() {
    let source = r#"
    fun f() {
        print "ran";
    }
    f(1);
    "#;
    let (output, kind) = run_expecting_error(source);
    assert!(matches!(
        kind,
        RuntimeError::ArityMismatch {
            got: 1,
            expected: 0,
            ..
        }
    ));
    assert_eq!(output, "");
}

#[test]
fn test_for_loop() {
    let source = r#"
    for (let i = 0; i < 3; i = i + 1) {
        print i;
    }
    "#;
    test_valid_program(source, "0\n1\n2\n");
}

#[test]
fn test_for_variable_not_visible_after_loop() {
    let source = r#"
    for (let i = 0; i < 3; i = i + 1) {
    }
    print i;
    "#;
    let (output, kind) = run_expecting_error(source);
    assert!(matches!(kind, RuntimeError::UndefinedVariable(name) if name == "i"));
    assert_eq!(output, "");
}

#[test]
fn test_division_by_zero() {
    let (output, kind) = run_expecting_error("print 1 / 0;");
    assert!(matches!(kind, RuntimeError::DivisionByZero));
    assert_eq!(output, "");
}

#[test]
fn test_interpreter_survives_failed_invocation() {
    let output = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::new(output.clone());

    interpreter
        .interpret(&parse("let x = 2; print 1 / 0;"))
        .expect_err("Division by zero should fail");
    interpreter
        .interpret(&parse("print x;"))
        .expect("Globals should survive a failed invocation");

    let output = String::from_utf8(output.take()).unwrap();
    assert_eq!(output, "2\n");
}

#[test]
fn test_return_exits_nested_loops() {
    let source = r#"
    fun first() {
        let i = 0;
        while (true) {
            while (true) {
                return i;
            }
            i = i + 1;
        }
    }
    print first();
    print "after";
    "#;
    test_valid_program(source, "0\nafter\n");
}

#[test]
fn test_fib() {
    let source = r#"
    fun fib(n) {
        if (n <= 1) {
            return n;
        }
        return fib(n - 1) + fib(n - 2);
    }

    for (let i = 0; i < 10; i = i + 1) {
        print fib(i);
    }
    "#;
    test_valid_program(source, "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn test_functions_see_globals() {
    let source = r#"
    let greeting = "hello";
    fun greet() {
        return greeting;
    }
    print greet();
    "#;
    test_valid_program(source, "hello\n");
}

#[test]
fn test_functions_do_not_see_caller_locals() {
    let source = r#"
    fun inner() {
        return x;
    }
    fun outer() {
        let x = 99;
        return inner();
    }
    outer();
    "#;
    let (_, kind) = run_expecting_error(source);
    assert!(matches!(kind, RuntimeError::UndefinedVariable(name) if name == "x"));
}

#[test]
fn test_equality_compares_renderings() {
    let source = r#"
    print 1 == "1";
    print [1, 2] == [1, 2];
    print null != false;
    "#;
    test_valid_program(source, "true\ntrue\ntrue\n");
}

#[test]
fn test_string_concatenation() {
    let source = r#"
    print "a" + 1;
    print 2 + "b";
    print "x" + true;
    "#;
    test_valid_program(source, "a1\n2b\nxtrue\n");
}

#[test]
fn test_logical_operators_require_booleans() {
    let (_, kind) = run_expecting_error("print 1 and true;");
    assert!(matches!(kind, RuntimeError::TypeMismatch(_)));
}

#[test]
fn test_logical_operators_evaluate_both_sides() {
    let source = r#"
    fun loud() {
        print "evaluated";
        return true;
    }
    print false and loud();
    "#;
    test_valid_program(source, "evaluated\nfalse\n");
}

#[test]
fn test_condition_requires_boolean() {
    let (_, kind) = run_expecting_error("if (1) { print 1; }");
    assert!(matches!(kind, RuntimeError::TypeMismatch(_)));
}

#[test]
fn test_print_builtin_call() {
    let source = r#"
    print(1, "a", true);
    let x = print(2);
    print x;
    "#;
    test_valid_program(source, "1 a true\n2\nnull\n");
}

#[test]
fn test_nested_containers() {
    let source = r#"
    let o = {name: "Ada", tags: ["x", "y"]};
    print o.tags[1];
    print o.name;
    "#;
    test_valid_program(source, "y\nAda\n");
}

#[test]
fn test_index_out_of_bounds() {
    let source = r#"
    let a = [1];
    print a[3];
    "#;
    let (_, kind) = run_expecting_error(source);
    assert!(matches!(
        kind,
        RuntimeError::IndexOutOfBounds { index: 3, len: 1 }
    ));
}

#[test]
fn test_index_truncates_toward_zero() {
    let source = r#"
    let a = [10, 20, 30];
    print a[1.9];
    "#;
    test_valid_program(source, "20\n");
}

#[test]
fn test_index_type_errors() {
    let (_, kind) = run_expecting_error("let a = [1]; print a[true];");
    assert!(matches!(kind, RuntimeError::TypeMismatch(_)));

    let (_, kind) = run_expecting_error("print 5[0];");
    assert!(matches!(kind, RuntimeError::TypeMismatch(_)));
}

#[test]
fn test_property_not_found() {
    let source = r#"
    let o = {a: 1};
    print o.b;
    "#;
    let (_, kind) = run_expecting_error(source);
    assert!(matches!(kind, RuntimeError::PropertyNotFound(name) if name == "b"));
}

#[test]
fn test_call_errors() {
    let (_, kind) = run_expecting_error("let x = 1; x();");
    assert!(matches!(kind, RuntimeError::NotAFunction(name) if name == "x"));

    let (_, kind) = run_expecting_error("nope();");
    assert!(matches!(kind, RuntimeError::UndefinedVariable(name) if name == "nope"));
}

#[test]
fn test_assignment_to_undefined_variable() {
    let (_, kind) = run_expecting_error("x = 1;");
    assert!(matches!(kind, RuntimeError::UndefinedVariable(name) if name == "x"));
}

#[test]
fn test_uninitialized_let_binds_null() {
    test_valid_program("let x; print x;", "null\n");
}

#[test]
fn test_while_body_scope_is_fresh_per_iteration() {
    let source = r#"
    let n = 0;
    while (n < 2) {
        let x = n * 10;
        print x;
        n = n + 1;
    }
    "#;
    test_valid_program(source, "0\n10\n");
}

#[test]
fn test_unary_operators() {
    test_valid_program("print -3; print not false;", "-3\ntrue\n");
}

#[test]
fn test_top_level_return_ends_run() {
    test_valid_program("print 1; return; print 2;", "1\n");
}

#[test]
fn test_set_global() {
    let output = Rc::new(RefCell::new(Vec::new()));
    let mut interpreter = Interpreter::new(output.clone());
    interpreter.set_global("answer", Value::Number(42.0));

    interpreter
        .interpret(&parse("print answer;"))
        .expect("Seeded global should be visible");

    let output = String::from_utf8(output.take()).unwrap();
    assert_eq!(output, "42\n");
}

#[test]
fn test_parse_error_is_reported() {
    let tokens = rill::tokenizer::tokens("let = 5;").unwrap();
    assert!(rill::parser::program(&tokens).is_err());
}
