use std::time::Duration;

use futures::channel::oneshot;
use weft::future::{
    err, later, lazy, ok, wait_all, wait_all3, wait_all_iter, wait_all_successful,
    wait_all_successful5, wait_all_successful_iter,
};
use weft::reactor::{sleep, ManualClock, Reactor};

#[test]
fn wait_all_captures_every_outcome() {
    let reactor = Reactor::new();
    let (a, b) = reactor.run(wait_all(ok::<_, i32>(1), err::<i32, _>(2)));
    assert_eq!(a, Ok(1));
    assert_eq!(b, Err(2));
}

#[test]
fn wait_all_never_fails_as_an_aggregate() {
    let reactor = Reactor::new();
    let (a, b, c) = reactor.run(wait_all3(err::<i32, _>(1), err::<i32, _>(2), ok::<_, i32>(3)));
    assert_eq!(a, Err(1));
    assert_eq!(b, Err(2));
    assert_eq!(c, Ok(3));
}

#[test]
fn wait_all_accepts_callables_via_lazy() {
    let reactor = Reactor::new();
    let (a, b) = reactor.run(wait_all(lazy(|| ok::<_, ()>(1)), ok::<_, ()>(2)));
    assert_eq!(a, Ok(1));
    assert_eq!(b, Ok(2));
}

#[test]
fn wait_all_waits_for_pending_inputs() {
    let reactor = Reactor::new();
    let (tx, rx) = oneshot::channel::<i32>();
    reactor.spawn(async move {
        later().await;
        let _ = tx.send(5);
    });
    let (a, b) = reactor.run(wait_all(rx, ok::<_, ()>(1)));
    assert_eq!(a.unwrap(), 5);
    assert_eq!(b, Ok(1));
}

#[test]
fn wait_all_iter_preserves_input_order() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let futures: Vec<_> = (0..4u64)
        .map(|i| async move {
            // Later inputs complete earlier.
            sleep(Duration::from_millis(40 - i * 10)).await;
            Ok::<u64, ()>(i)
        })
        .collect();
    let outcomes = reactor.run(wait_all_iter(futures));
    assert_eq!(outcomes, vec![Ok(0), Ok(1), Ok(2), Ok(3)]);
}

#[test]
fn wait_all_successful_unwraps_values_positionally() {
    let reactor = Reactor::new();
    let res = reactor.run(wait_all_successful5(
        ok::<_, i32>(()),
        ok("hi"),
        ok(42),
        ok((84, "x")),
        ok(true),
    ));
    assert_eq!(res, Ok(((), "hi", 42, (84, "x"), true)));
}

#[test]
fn wait_all_successful_fails_with_first_error_in_input_order() {
    let reactor = Reactor::new();
    let res: Result<(i32, i32), i32> = reactor.run(wait_all_successful(err(7), err(9)));
    assert_eq!(res, Err(7));
}

#[test]
fn wait_all_successful_iter_collects_values() {
    let reactor = Reactor::new();
    let values = reactor.run(wait_all_successful_iter(vec![ok::<_, ()>(1), ok(2), ok(3)]));
    assert_eq!(values, Ok(vec![1, 2, 3]));
}

#[test]
fn wait_all_successful_iter_reports_first_error_by_position() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let futures: Vec<_> = (0..3u64)
        .map(|i| async move {
            // The positionally-first error completes last.
            sleep(Duration::from_millis(30 - i * 10)).await;
            if i < 2 {
                Err(i)
            } else {
                Ok(i)
            }
        })
        .collect();
    let res = reactor.run(wait_all_successful_iter(futures));
    assert_eq!(res, Err(0));
}
