use super::*;
use crate::errors::SyntaxError;
use crate::interpreter::eval;
use crate::parser::parse_str;
use crate::syntax::Ast;

#[test]
fn fixed_arity() {
    let env = default_env();
    run_in_env("(define (f a b) (+ a b))", &env).unwrap();

    assert_eq!(Value::from(3), run_in_env("(f 1 2)", &env).unwrap());
    assert_eq!(
        RuntimeErrorKind::MissingArgs {
            required: 2,
            actual: 1
        },
        runtime_kind(run_in_env("(f 1)", &env))
    );
    assert_eq!(
        RuntimeErrorKind::TooMuchArgs {
            required: 2,
            actual: 3
        },
        runtime_kind(run_in_env("(f 1 2 3)", &env))
    );
}

#[test]
fn rest_parameters() {
    assert_eq!(
        vec![2i64, 3].into_iter().map(Value::from).collect::<Value>(),
        run("((lambda (a . rest) rest) 1 2 3)").unwrap()
    );
    assert_eq!(Value::Nil, run("((lambda (a . rest) rest) 1)").unwrap());
    assert_eq!(
        vec![1i64, 2].into_iter().map(Value::from).collect::<Value>(),
        run("((lambda args args) 1 2)").unwrap()
    );
    assert_eq!(
        vec![1i64, 2].into_iter().map(Value::from).collect::<Value>(),
        run("(define (g . xs) xs) (g 1 2)").unwrap()
    );
    assert_eq!(
        RuntimeErrorKind::MissingArgsForDynamic {
            at_least: 2,
            actual: 1
        },
        runtime_kind(run("((lambda (a b . c) c) 1)"))
    );
}

#[test]
fn lambda_needs_a_body() {
    assert_eq!(
        RuntimeErrorKind::MissingArgsForDynamic {
            at_least: 2,
            actual: 1
        },
        runtime_kind(run("(lambda (x))"))
    );
}

#[test]
fn malformed_parameter_lists() {
    for src in &["(lambda (1) 1)", "(lambda (. x) 1)", "(lambda (a . b c) 1)", "(lambda (a .) 1)"] {
        match run(src) {
            Err(Error::Syntax(SyntaxError::IllegalParamList { .. })) => {}
            other => panic!("{}: expected illegal param list, got {:?}", src, other),
        }
    }
    assert!(matches!(
        run("(lambda (a . . b) 1)"),
        Err(Error::Syntax(SyntaxError::UnexpectedDot { .. }))
    ));
}

#[test]
fn lexical_scope() {
    assert_eq!(
        Value::from(1),
        run("
(define x 1)
(define (get) x)
(define (shadow x) (get))
(shadow 2)")
        .unwrap()
    );
}

#[test]
fn closures_capture_their_frame() {
    assert_eq!(
        Value::from(15),
        run("
(define (adder n) (lambda (x) (+ x n)))
(define add5 (adder 5))
(add5 10)")
        .unwrap()
    );
}

#[test]
fn recursion() {
    assert_eq!(
        Value::from(3628800),
        run("
(define (fact n)
  (if (= n 0)
      1
      (* n (fact (- n 1)))))
(fact 10)")
        .unwrap()
    );
}

#[test]
fn let_binds_in_a_new_frame() {
    let env = default_env();
    assert_eq!(Value::from(3), run_in_env("(let ((a 1) (b 2)) (+ a b))", &env).unwrap());
    assert!(env.lookup(&"a".into()).is_none());
    assert_eq!(
        Value::from(1),
        run("(define a 1) (let ((a 2) (b a)) b)").unwrap()
    );
}

#[test]
fn evaluation_never_changes_the_tree() {
    let src = "(define (sq x) (* x x)) (sq 3) (sq 4)";
    let env = default_env();
    let program = parse_str(src, None).unwrap();

    assert_eq!(Value::from(16), eval(&program, &env).unwrap());
    assert_eq!(Value::from(16), eval(&program, &env).unwrap());
    assert_eq!(parse_str(src, None).unwrap(), program);

    let fresh = parse_str("(define (sq x) (* x x))", None).unwrap();
    let expected_body = match &fresh {
        Ast::Root(items) => items[0].as_list().unwrap()[2..].to_vec(),
        _ => unreachable!(),
    };
    match env.lookup(&"sq".into()) {
        Some(Value::Closure(c)) => assert_eq!(expected_body.as_slice(), c.body()),
        other => panic!("expected closure, got {:?}", other),
    }
}
