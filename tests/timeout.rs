use std::future::Future;
use std::pin::pin;
use std::task::Poll;
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use futures_test::task::noop_context;
use weft::future::{ok, with_timeout, TimedOut};
use weft::reactor::{sleep, ManualClock, Reactor};

#[derive(Debug, PartialEq)]
enum TestError {
    Timeout,
    Lost,
}

impl From<TimedOut> for TestError {
    fn from(_: TimedOut) -> Self {
        TestError::Timeout
    }
}

#[test]
fn times_out_and_ignores_late_resolution() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock.clone());
    let (tx, rx) = oneshot::channel::<i32>();
    let deadline = clock.now() + Duration::from_secs(2);
    let mut fut = Box::pin(with_timeout(deadline, async move {
        rx.await.map_err(|_| TestError::Lost)
    }));

    clock.advance(Duration::from_secs(1));
    assert!(reactor.run_until_stalled(&mut fut).is_pending());

    clock.advance(Duration::from_secs(1));
    assert_eq!(
        reactor.run_until_stalled(&mut fut),
        Poll::Ready(Err(TestError::Timeout))
    );

    // The producer side was only abandoned, not cancelled; resolving it now
    // simply finds no reader.
    drop(fut);
    assert!(tx.send(9).is_err());
}

#[test]
fn wrapped_future_wins_when_it_completes_first() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock.clone());
    let deadline = clock.now() + Duration::from_secs(2);
    let res = reactor.run(with_timeout(deadline, async {
        sleep(Duration::from_secs(1)).await;
        Ok::<_, TestError>(7)
    }));
    assert_eq!(res, Ok(7));
}

#[test]
fn timer_error_carries_the_timed_out_kind() {
    let clock = ManualClock::new();
    let reactor = Reactor::with_clock(clock.clone());
    let deadline = clock.now() + Duration::from_millis(10);
    let res: Result<(), TestError> = reactor.run(with_timeout(
        deadline,
        std::future::pending::<Result<(), TestError>>(),
    ));
    assert_eq!(res, Err(TestError::Timeout));
}

#[test]
fn already_ready_future_needs_no_reactor() {
    let mut cx = noop_context();
    let deadline = Instant::now() + Duration::from_secs(1);
    let mut fut = pin!(with_timeout(deadline, ok::<_, TestError>(3)));
    assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(Ok(3)));
}

#[test]
fn timed_out_displays_itself() {
    assert_eq!(TimedOut.to_string(), "timed out");
}
