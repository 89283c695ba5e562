use std::cell::Cell;
use std::future::Future;
use std::pin::pin;
use std::task::Poll;

use futures_test::task::noop_context;
use weft::future::{
    do_for_each, do_until, err, keep_doing, later, now, ok, repeat, repeat_until_value, Step,
};
use weft::reactor::{preempt, Reactor};

#[test]
fn do_for_each_sums_in_order() {
    let reactor = Reactor::new();
    let mut sum = 0;
    let res: Result<(), ()> = reactor.run(do_for_each(1..=5, |x| {
        sum += x;
        now()
    }));
    assert_eq!(res, Ok(()));
    assert_eq!(sum, 15);
}

#[test]
fn do_for_each_with_suspending_bodies() {
    let reactor = Reactor::new();
    let sum = Cell::new(0);
    let res: Result<(), ()> = reactor.run(do_for_each(1..=5, |x| {
        let sum = &sum;
        async move {
            later().await;
            sum.set(sum.get() + x);
            Ok(())
        }
    }));
    assert_eq!(res, Ok(()));
    assert_eq!(sum.get(), 15);
}

#[test]
fn do_for_each_empty_range_never_invokes_action() {
    let reactor = Reactor::new();
    let mut calls = 0;
    let res: Result<(), ()> = reactor.run(do_for_each(std::iter::empty::<i32>(), |_| {
        calls += 1;
        now()
    }));
    assert_eq!(res, Ok(()));
    assert_eq!(calls, 0);
}

#[test]
fn do_for_each_fails_fast() {
    let reactor = Reactor::new();
    let mut visited = Vec::new();
    let res = reactor.run(do_for_each(1..=5, |x| {
        visited.push(x);
        if x == 3 {
            err(x)
        } else {
            ok(())
        }
    }));
    assert_eq!(res, Err(3));
    assert_eq!(visited, vec![1, 2, 3]);
}

#[test]
fn repeat_runs_once_per_continue() {
    let reactor = Reactor::new();
    let mut calls = 0;
    let res: Result<(), ()> = reactor.run(repeat(|| {
        calls += 1;
        ok(if calls <= 10 { Step::Continue } else { Step::Stop })
    }));
    assert_eq!(res, Ok(()));
    // Ten continues plus the terminating call.
    assert_eq!(calls, 11);
}

#[test]
fn repeat_ready_stop_resolves_on_first_poll() {
    let mut cx = noop_context();
    let mut fut = pin!(repeat(|| ok::<_, ()>(Step::Stop)));
    assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(Ok(())));
}

#[test]
fn repeat_surfaces_synchronous_error() {
    let reactor = Reactor::new();
    let res: Result<(), &str> = reactor.run(repeat(|| err("boom")));
    assert_eq!(res, Err("boom"));
}

#[test]
fn repeat_until_value_counts_to_ten_thousand() {
    let reactor = Reactor::new();
    let mut c = 0u32;
    let res: Result<u32, ()> = reactor.run(repeat_until_value(|| {
        if c == 10_000 {
            ok(Some(c))
        } else {
            c += 1;
            ok(None)
        }
    }));
    assert_eq!(res, Ok(10_000));
}

#[test]
fn repeat_until_value_with_suspending_body() {
    let reactor = Reactor::new();
    let c = Cell::new(0u32);
    let res: Result<u32, ()> = reactor.run(repeat_until_value(|| {
        let c = &c;
        async move {
            later().await;
            if c.get() == 50 {
                Ok(Some(c.get()))
            } else {
                c.set(c.get() + 1);
                Ok(None)
            }
        }
    }));
    assert_eq!(res, Ok(50));
}

#[test]
fn do_until_checks_condition_before_each_body() {
    let reactor = Reactor::new();
    let n = Cell::new(0);
    let res: Result<(), ()> = reactor.run(do_until(
        || n.get() == 5,
        || {
            n.set(n.get() + 1);
            now()
        },
    ));
    assert_eq!(res, Ok(()));
    assert_eq!(n.get(), 5);
}

#[test]
fn do_until_with_initially_true_condition_skips_body() {
    let reactor = Reactor::new();
    let mut calls = 0;
    let res: Result<(), ()> = reactor.run(do_until(
        || true,
        || {
            calls += 1;
            now()
        },
    ));
    assert_eq!(res, Ok(()));
    assert_eq!(calls, 0);
}

#[test]
fn do_until_surfaces_body_error() {
    let reactor = Reactor::new();
    let n = Cell::new(0);
    let res = reactor.run(do_until(
        || n.get() == 10,
        || {
            n.set(n.get() + 1);
            if n.get() == 4 {
                err(n.get())
            } else {
                ok(())
            }
        },
    ));
    assert_eq!(res, Err(4));
    assert_eq!(n.get(), 4);
}

#[test]
fn keep_doing_yields_within_the_preemption_quota() {
    let mut cx = noop_context();
    let calls = Cell::new(0u32);
    let mut fut = pin!(keep_doing(|| {
        calls.set(calls.get() + 1);
        ok::<_, ()>(())
    }));

    // The body always resolves immediately, yet a single poll must stay
    // bounded by the budget instead of spinning forever.
    assert!(fut.as_mut().poll(&mut cx).is_pending());
    let first = calls.get();
    assert!(first >= 1);
    assert!(first <= preempt::TASK_QUOTA + 1);

    assert!(fut.as_mut().poll(&mut cx).is_pending());
    assert!(calls.get() > first);
}

#[test]
fn keep_doing_stops_on_error() {
    let reactor = Reactor::new();
    let mut calls = 0u32;
    let res = reactor.run(keep_doing(|| {
        calls += 1;
        if calls == 1000 {
            err("done")
        } else {
            ok(())
        }
    }));
    assert_eq!(res, Err("done"));
    assert_eq!(calls, 1000);
}

#[test]
fn later_resolves_on_a_subsequent_iteration() {
    let reactor = Reactor::new();
    let out = reactor.run(async {
        later().await;
        42
    });
    assert_eq!(out, 42);
}
