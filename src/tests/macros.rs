use super::*;

#[test]
fn first_matching_rule_wins() {
    let env = default_env();
    run_in_env(
        "
(define-syntax pick
  (syntax-rules ()
    ((_ (a b)) (quote first))
    ((_ x) (+ x 1))))",
        &env,
    )
    .unwrap();

    assert_eq!(Value::from(6), run_in_env("(pick 5)", &env).unwrap());
    assert_eq!(sym("first"), run_in_env("(pick (1 2))", &env).unwrap());
}

#[test]
fn no_matching_rule() {
    assert_eq!(
        RuntimeErrorKind::InvalidSyntax,
        runtime_kind(run(
            "
(define-syntax two (syntax-rules () ((_ a b) a)))
(two 1)"
        ))
    );
}

#[test]
fn keywords_match_by_name() {
    let env = default_env();
    run_in_env(
        "
(define-syntax arrow
  (syntax-rules (=>)
    ((_ a => b) b)
    ((_ a b c) a)))",
        &env,
    )
    .unwrap();

    assert_eq!(Value::from(2), run_in_env("(arrow 1 => 2)", &env).unwrap());
    assert_eq!(Value::from(1), run_in_env("(arrow 1 -> 2)", &env).unwrap());
}

#[test]
fn arguments_are_not_evaluated_before_expansion() {
    assert_eq!(
        Value::from(1),
        run("
(define-syntax my-if
  (syntax-rules ()
    ((_ c a b) (if c a b))))
(my-if #t 1 (car '()))")
        .unwrap()
    );
}

#[test]
fn arguments_evaluate_in_the_callers_frame() {
    assert_eq!(
        Value::from(10),
        run("
(define-syntax twice
  (syntax-rules ()
    ((_ e) (+ e e))))
(define (f n) (twice n))
(f 5)")
        .unwrap()
    );
}

#[test]
fn bindings_live_in_the_defining_frame() {
    let env = default_env();
    run_in_env(
        "
(define-syntax capture
  (syntax-rules ()
    ((_ e) (lambda () e))))
(define f (capture 1))",
        &env,
    )
    .unwrap();

    assert_eq!(Value::from(1), run_in_env("(f)", &env).unwrap());
    assert_eq!(Value::from(1), run_in_env("e", &env).unwrap());

    // a later expansion rebinds `e` for every closure built by earlier ones
    run_in_env("(define g (capture 2))", &env).unwrap();
    assert_eq!(Value::from(2), run_in_env("(f)", &env).unwrap());
}

#[test]
fn ellipsis_splices_varargs() {
    assert_eq!(
        vec![1i64, 2, 3].into_iter().map(Value::from).collect::<Value>(),
        run("
(define-syntax my-list
  (syntax-rules ()
    ((_ x ...) (list x ...))))
(my-list 1 (+ 1 1) 3)")
        .unwrap()
    );
}

#[test]
fn recursive_macro() {
    let env = default_env();
    run_in_env(
        "
(define-syntax my-or
  (syntax-rules ()
    ((_ e r ...) (if e e (my-or r ...)))
    ((_) #f)))",
        &env,
    )
    .unwrap();

    assert_eq!(Value::from(false), run_in_env("(my-or)", &env).unwrap());
    assert_eq!(Value::from(2), run_in_env("(my-or #f 2)", &env).unwrap());
    assert_eq!(Value::from(false), run_in_env("(my-or #f #f #f)", &env).unwrap());
    assert_eq!(Value::from(1), run_in_env("(my-or 1 (car '()))", &env).unwrap());
}

#[test]
fn define_syntax_requires_a_macro() {
    assert!(matches!(
        runtime_kind(run("(define-syntax m 42)")),
        RuntimeErrorKind::TypeMismatch { .. }
    ));
}
