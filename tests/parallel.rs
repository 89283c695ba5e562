use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::pin;
use std::task::Poll;
use std::time::Duration;

use futures_test::task::noop_context;
use weft::future::{now, parallel_for_each};
use weft::reactor::{sleep, ManualClock, Reactor};

#[test]
fn empty_range_resolves_immediately() {
    let reactor = Reactor::new();
    let mut calls = 0;
    let res: Result<(), ()> = reactor.run(parallel_for_each(std::iter::empty::<i32>(), |_| {
        calls += 1;
        now()
    }));
    assert_eq!(res, Ok(()));
    assert_eq!(calls, 0);
}

#[test]
fn all_ready_resolves_on_first_poll() {
    let mut cx = noop_context();
    let sum = Cell::new(0);
    let mut fut = pin!(parallel_for_each(1..=5, |x| {
        sum.set(sum.get() + x);
        now::<()>()
    }));
    assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(Ok(())));
    assert_eq!(sum.get(), 15);
}

#[test]
fn starts_in_order_completes_in_any_order() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let starts = RefCell::new(Vec::new());
    let ends = RefCell::new(Vec::new());
    let res: Result<(), ()> = reactor.run(parallel_for_each(0..5u64, |i| {
        let starts = &starts;
        let ends = &ends;
        async move {
            starts.borrow_mut().push(i);
            sleep(Duration::from_millis(50 - i * 10)).await;
            ends.borrow_mut().push(i);
            Ok(())
        }
    }));
    assert_eq!(res, Ok(()));
    assert_eq!(*starts.borrow(), vec![0, 1, 2, 3, 4]);
    assert_eq!(*ends.borrow(), vec![4, 3, 2, 1, 0]);
}

#[test]
fn every_action_runs_and_one_failure_is_reported() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock);
    let calls = Cell::new(0u32);
    let res = reactor.run(parallel_for_each(0..1100u32, |i| {
        let calls = &calls;
        async move {
            calls.set(calls.get() + 1);
            sleep(Duration::from_millis(u64::from(i % 31 + 1))).await;
            if i % 177 == 133 {
                Err(i)
            } else {
                Ok(())
            }
        }
    }));
    assert_eq!(calls.get(), 1100);
    let e = res.unwrap_err();
    assert_eq!(e % 177, 133);
}

#[test]
fn immediate_failures_are_folded_without_list_space() {
    let reactor = Reactor::new();
    let res = reactor.run(parallel_for_each(0..10, |i| {
        if i == 7 {
            weft::future::err(i)
        } else {
            weft::future::ok(())
        }
    }));
    assert_eq!(res, Err(7));
}
