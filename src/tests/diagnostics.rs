use super::*;
use crate::errors::{RuntimeError, SyntaxError};
use crate::expression::Kind;
use crate::sourcecode::Position;

fn runtime_error(result: Result<Value>) -> RuntimeError {
    match result {
        Err(Error::Runtime(e)) => e,
        other => panic!("expected runtime error, got {:?}", other),
    }
}

#[test]
fn unbound_variable_reports_its_position() {
    let e = runtime_error(run("(car undefined-thing)"));
    assert_eq!(
        &RuntimeErrorKind::UnboundVariable("undefined-thing".into()),
        e.kind()
    );
    assert_eq!(Some(&Position::new(1, 6, None)), e.position());
    assert!(e.frames().is_empty());
    assert_eq!("Unbound variable 'undefined-thing', at 1:6", e.to_string());
}

#[test]
fn errors_collect_call_frames() {
    let e = runtime_error(run("(define (f x) (car x))\n(f 1)"));
    assert_eq!(
        &RuntimeErrorKind::TypeMismatch {
            kind: Kind::Int,
            procedure: "car".into()
        },
        e.kind()
    );
    assert_eq!(None, e.position());
    let frames: Vec<_> = e.frames().iter().map(|(pos, _)| pos.clone()).collect();
    assert_eq!(
        vec![Position::new(1, 15, None), Position::new(2, 1, None)],
        frames
    );
    assert_eq!(
        "Type 'Int' dismatch for 'car', at BUILT-IN\n\tat 1:15\n\tat 2:1",
        e.to_string()
    );
}

#[test]
fn frames_in_the_same_environment_collapse() {
    let e = runtime_error(run("(define (h x) (+ 1 (car x)))\n(h 5)"));
    let frames: Vec<_> = e.frames().iter().map(|(pos, _)| pos.clone()).collect();
    assert_eq!(
        vec![Position::new(1, 20, None), Position::new(2, 1, None)],
        frames
    );
}

#[test]
fn source_name_appears_in_frames() {
    let env = default_env();
    let e = runtime_error(read_and_evaluate(
        "(define (f) (car 1))\n(f)",
        Some("boot.scm"),
        &env,
    ));
    assert!(e.to_string().ends_with("\n\tat 2:1, boot.scm"));
}

#[test]
fn apply_non_procedure() {
    assert_eq!(
        RuntimeErrorKind::ApplyNonProcedure("1".into()),
        runtime_kind(run("(1 2)"))
    );
}

#[test]
fn load_is_unimplemented() {
    assert_eq!(
        RuntimeErrorKind::Unimplemented("load"),
        runtime_kind(run("(load \"lib.scm\")"))
    );
}

#[test]
fn empty_program() {
    assert_eq!(RuntimeErrorKind::EmptyProgram, runtime_kind(run("")));
    assert_eq!(
        RuntimeErrorKind::EmptyProgram,
        runtime_kind(run("  ; nothing but a comment\n"))
    );
}

#[test]
fn syntax_errors_stop_the_read() {
    let env = default_env();
    assert!(matches!(
        run_in_env("(define x 1) (+ 1", &env),
        Err(Error::Syntax(SyntaxError::MissingRightParen { .. }))
    ));
    assert!(env.lookup(&"x".into()).is_none());

    assert!(matches!(
        run(")"),
        Err(Error::Syntax(SyntaxError::TooMuchRightParen { .. }))
    ));
    assert!(matches!(
        run("'(1 . )"),
        Err(Error::Syntax(SyntaxError::UnexpectedDot { .. }))
    ));
}

#[test]
fn builtin_argument_checks() {
    assert_eq!(
        RuntimeErrorKind::MissingArgs {
            required: 2,
            actual: 1
        },
        runtime_kind(run("(cons 1)"))
    );
    assert_eq!(
        RuntimeErrorKind::TypeMismatch {
            kind: Kind::String,
            procedure: "+".into()
        },
        runtime_kind(run("(+ 1 \"a\")"))
    );
}
