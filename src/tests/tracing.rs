use super::*;
use crate::sourcecode::Position;
use crate::tracer::{install_tracer, remove_tracer, CallLog};

#[test]
fn call_log_records_closure_applications() {
    let id = install_tracer(CallLog::new());
    run("
(define (f x) x)
(define-syntax id (syntax-rules () ((_ e) e)))
(f 1)
(id (f (car (list 2))))")
    .unwrap();

    let tracer = remove_tracer(id).unwrap();
    let log = tracer.as_any().downcast_ref::<CallLog>().unwrap();

    let positions: Vec<_> = log.calls().iter().map(|c| c.position.clone()).collect();
    assert_eq!(
        vec![Position::new(4, 1, None), Position::new(5, 5, None)],
        positions
    );
    assert!(log.calls().iter().all(|c| c.arg_count == 1));
    assert_eq!(1, log.macro_uses());
}

#[test]
fn removed_tracers_see_nothing() {
    let id = install_tracer(CallLog::new());
    let tracer = remove_tracer(id).unwrap();
    run("((lambda (x) x) 1)").unwrap();
    let log = tracer.as_any().downcast_ref::<CallLog>().unwrap();
    assert!(log.calls().is_empty());
}
