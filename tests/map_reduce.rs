use std::cell::Cell;
use std::future::Future;
use std::pin::pin;
use std::task::Poll;
use std::time::Duration;

use futures_test::task::noop_context;
use weft::future::{err, map_reduce, map_reduce_with, ok, Adder};
use weft::reactor::{sleep, ManualClock, Reactor};

#[test]
fn sums_squares() {
    let reactor = Reactor::new();
    let sum: Result<u64, ()> =
        reactor.run(map_reduce(0..1000u64, |x| ok(x * x), 0, |acc, x| acc + x));
    assert_eq!(sum, Ok(332_833_500));
}

#[test]
fn reduces_in_input_order_despite_completion_order() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let res: Result<Vec<u64>, ()> = reactor.run(map_reduce(
        0..4u64,
        |i| async move {
            sleep(Duration::from_millis(40 - i * 10)).await;
            Ok(i)
        },
        Vec::new(),
        |mut acc, i| {
            acc.push(i);
            acc
        },
    ));
    assert_eq!(res, Ok(vec![0, 1, 2, 3]));
}

#[test]
fn empty_range_yields_initial_accumulator() {
    let mut cx = noop_context();
    let mut fut = pin!(map_reduce(
        std::iter::empty::<i32>(),
        |x| ok::<_, ()>(x),
        41,
        |acc, x| acc + x,
    ));
    assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(Ok(41)));
}

#[test]
fn map_error_is_surfaced_after_draining_the_rest() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let completed = Cell::new(0u32);
    let res = reactor.run(map_reduce(
        0..10u32,
        |i| {
            let completed = &completed;
            async move {
                sleep(Duration::from_millis(u64::from(i) + 1)).await;
                completed.set(completed.get() + 1);
                if i == 5 {
                    Err(i)
                } else {
                    Ok(i)
                }
            }
        },
        0,
        |acc, x| acc + x,
    ));
    assert_eq!(res, Err(5));
    // Every mapped future ran to completion before the error surfaced.
    assert_eq!(completed.get(), 10);
}

#[test]
fn first_error_in_input_order_wins() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let res: Result<u64, u64> = reactor.run(map_reduce(
        0..2u64,
        |i| async move {
            // Input 0 fails, but completes after input 1.
            sleep(Duration::from_millis(20 - i * 10)).await;
            Err(i)
        },
        0,
        |acc: u64, x: u64| acc + x,
    ));
    assert_eq!(res, Err(0));
}

#[test]
fn adder_accumulates_through_the_object_form() {
    let reactor = Reactor::new();
    let sum: Result<u64, ()> =
        reactor.run(map_reduce_with(0..1000u64, |x| ok(x * x), Adder::default()));
    assert_eq!(sum, Ok(332_833_500));
}

#[test]
fn object_form_surfaces_map_errors() {
    let reactor = Reactor::new();
    let res: Result<u32, u32> = reactor.run(map_reduce_with(
        0..10u32,
        |i| if i == 3 { err(i) } else { ok(i) },
        Adder::default(),
    ));
    assert_eq!(res, Err(3));
}
