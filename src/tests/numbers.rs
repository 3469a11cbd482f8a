use super::*;
use crate::number::Number;

fn number(src: &str) -> Number {
    match run(src).unwrap() {
        Value::Number(n) => n,
        other => panic!("expected number, got {}", other),
    }
}

#[test]
fn addition_folds_all_arguments() {
    assert!(number("(+)").eqv(&Number::Integer(0)));
    assert!(number("(+ 1 2 3)").eqv(&Number::Integer(6)));
    assert!(number("(+ 1/2 1/2)").eqv(&Number::Integer(1)));
    assert!(number("(+ 1/2 1/3)").eqv(&Number::fraction(5, 6)));
    assert!(number("(+ 1 0.5)").eqv(&Number::Float(1.5)));
}

#[test]
fn subtraction_and_division() {
    assert!(number("(- 5)").eqv(&Number::Integer(-5)));
    assert!(number("(- 10 1 2)").eqv(&Number::Integer(7)));
    assert!(number("(/ 4 8)").eqv(&Number::fraction(1, 2)));
    assert!(number("(/ 6 3)").eqv(&Number::Integer(2)));
    assert!(number("(/ 2)").eqv(&Number::fraction(1, 2)));
    assert!(number("(/ 1.0 4)").eqv(&Number::Float(0.25)));
    assert_eq!("1/3", run("(/ 1 3)").unwrap().to_string());
}

#[test]
fn division_by_exact_zero() {
    assert!(matches!(number("(/ 1 0)"), Number::Infinite));
    assert!(matches!(number("(/ 0 0)"), Number::NaN));
}

#[test]
fn overflow_degrades_to_float() {
    assert!(matches!(
        number("(* 9223372036854775807 2)"),
        Number::Float(_)
    ));
}

#[test]
fn comparisons() {
    assert_eq!(Value::from(true), run("(< 1 2 3)").unwrap());
    assert_eq!(Value::from(false), run("(< 1 3 2)").unwrap());
    assert_eq!(Value::from(true), run("(= 1 1.0 2/2)").unwrap());
    assert_eq!(Value::from(true), run("(>= 3 3 1/2)").unwrap());
    assert_eq!(Value::from(false), run("(> 1/3 0.5)").unwrap());
    assert_eq!(Value::from(false), run("(= (/ 0 0) (/ 0 0))").unwrap());
}

#[test]
fn literals() {
    assert!(number("#xff").eqv(&Number::Integer(255)));
    assert!(number("#b101").eqv(&Number::Integer(5)));
    assert!(number("#o17").eqv(&Number::Integer(15)));
    assert!(number("-3").eqv(&Number::Integer(-3)));
    assert!(number("4/8").eqv(&Number::fraction(1, 2)));
    assert!(matches!(number("PI"), Number::Float(x) if (x - std::f64::consts::PI).abs() < 1e-12));
}

#[test]
fn complex_arithmetic_is_unimplemented() {
    assert!(matches!(number("1+2i"), Number::Complex(_)));
    assert_eq!(
        RuntimeErrorKind::Unimplemented("complex arithmetic"),
        runtime_kind(run("(+ 1+2i 1)"))
    );
    assert!(matches!(
        runtime_kind(run("(< 1+2i 1)")),
        RuntimeErrorKind::TypeMismatch { .. }
    ));
}
