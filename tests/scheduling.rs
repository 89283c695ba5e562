use std::cell::RefCell;
use std::rc::Rc;

use weft::future::{later, wait_all};
use weft::reactor::{with_scheduling_group, Reactor};

#[test]
fn runs_inline_when_the_group_is_active() {
    let reactor = Reactor::new();
    let main_group = reactor.default_scheduling_group();
    let active = reactor.run({
        let group = main_group.clone();
        async move {
            let probe = group.clone();
            with_scheduling_group(&group, move || async move { probe.is_active() }).await
        }
    });
    assert!(active);
}

#[test]
fn dispatches_into_another_group() {
    let reactor = Reactor::new();
    let batch = reactor.create_scheduling_group("batch", 200);
    assert_eq!(batch.name(), "batch");
    assert_eq!(batch.shares(), 200);
    let (was_active, name_ok) = reactor.run({
        let batch = batch.clone();
        async move {
            let probe = batch.clone();
            with_scheduling_group(&batch, move || async move {
                (probe.is_active(), probe.name() == "batch")
            })
            .await
        }
    });
    assert!(was_active);
    assert!(name_ok);
}

#[test]
fn queued_dispatch_from_outside_the_reactor() {
    let reactor = Reactor::new();
    let batch = reactor.create_scheduling_group("batch", 100);
    // Evaluated before `run`, so the group cannot be active and the callable
    // is queued; the reactor then drives it to completion.
    let fut = with_scheduling_group(&batch, || async { 6 * 7 });
    assert_eq!(reactor.run(fut), 42);
}

#[test]
fn groups_with_equal_shares_interleave() {
    let reactor = Reactor::new();
    let a = reactor.create_scheduling_group("a", 100);
    let b = reactor.create_scheduling_group("b", 100);
    let order = Rc::new(RefCell::new(Vec::new()));

    let fut_a = {
        let order = order.clone();
        with_scheduling_group(&a, move || async move {
            for _ in 0..5 {
                order.borrow_mut().push('a');
                later().await;
            }
        })
    };
    let fut_b = {
        let order = order.clone();
        with_scheduling_group(&b, move || async move {
            for _ in 0..5 {
                order.borrow_mut().push('b');
                later().await;
            }
        })
    };
    reactor.run(wait_all(fut_a, fut_b));

    let order = order.borrow();
    assert_eq!(order.len(), 10);
    // Neither group ran to completion before the other got a turn.
    assert!(order[..4].contains(&'a'));
    assert!(order[..4].contains(&'b'));
}

#[test]
fn is_active_is_false_outside_the_reactor() {
    let reactor = Reactor::new();
    let group = reactor.default_scheduling_group();
    assert!(!group.is_active());
}
