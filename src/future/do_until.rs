//! Definition of the `DoUntil` combinator, looping a body until a condition
//! holds.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::reactor::preempt;

pin_project! {
    /// Future for the [`do_until`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct DoUntil<C, F, Fut> {
        stop: C,
        body: F,
        #[pin]
        in_flight: Option<Fut>,
    }
}

impl<C, F, Fut> core::fmt::Debug for DoUntil<C, F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoUntil")
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Invokes the given body until it fails or the stop condition evaluates to
/// true.
///
/// The condition is evaluated before each invocation of the body, so a
/// condition that holds up front means the body never runs. The condition is
/// expected to be infallible; a panic inside it propagates.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use weft::future::{do_until, now};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let n = Cell::new(0);
/// let res: Result<(), ()> = reactor.run(do_until(
///     || n.get() == 5,
///     || {
///         n.set(n.get() + 1);
///         now()
///     },
/// ));
/// assert_eq!(res, Ok(()));
/// ```
pub fn do_until<C, F, Fut, E>(stop: C, body: F) -> DoUntil<C, F, Fut>
where
    C: FnMut() -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    DoUntil {
        stop,
        body,
        in_flight: None,
    }
}

impl<C, F, Fut, E> Future for DoUntil<C, F, Fut>
where
    C: FnMut() -> bool,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    type Output = Result<(), E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            if this.in_flight.as_mut().as_pin_mut().is_none() {
                if (this.stop)() {
                    return Poll::Ready(Ok(()));
                }
                this.in_flight.set(Some((this.body)()));
            }
            if let Err(e) = ready!(this
                .in_flight
                .as_mut()
                .as_pin_mut()
                .expect("in-flight body future set above")
                .poll(cx))
            {
                return Poll::Ready(Err(e));
            }
            this.in_flight.set(None);
            if preempt::poll_proceed(cx).is_pending() {
                return Poll::Pending;
            }
        }
    }
}
