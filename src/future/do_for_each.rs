//! Definition of the `DoForEach` combinator, applying an asynchronous action
//! to each item of a range, one at a time.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::reactor::preempt;

pin_project! {
    /// Future for the [`do_for_each`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct DoForEach<I, F, Fut> {
        iter: I,
        action: F,
        #[pin]
        in_flight: Option<Fut>,
    }
}

impl<I, F, Fut> core::fmt::Debug for DoForEach<I, F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoForEach")
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Calls an action for each item in a range, waiting for the future it
/// returns to resolve before moving to the next item.
///
/// Iteration is strictly in order and fails fast: the first error ends the
/// traversal and items after it are never visited. An empty range resolves
/// immediately and the action is never invoked. Runs of items whose action
/// futures are already ready are processed in a tight loop, bounded by the
/// preemption budget.
///
/// # Examples
///
/// ```
/// use weft::future::{do_for_each, now};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let mut sum = 0;
/// let res: Result<(), ()> = reactor.run(do_for_each(1..=5, |x| {
///     sum += x;
///     now()
/// }));
/// assert_eq!(res, Ok(()));
/// assert_eq!(sum, 15);
/// ```
pub fn do_for_each<I, F, Fut, E>(range: I, action: F) -> DoForEach<I::IntoIter, F, Fut>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    DoForEach {
        iter: range.into_iter(),
        action,
        in_flight: None,
    }
}

impl<I, F, Fut, E> Future for DoForEach<I, F, Fut>
where
    I: Iterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    type Output = Result<(), E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            if this.in_flight.as_mut().as_pin_mut().is_none() {
                match this.iter.next() {
                    Some(item) => this.in_flight.set(Some((this.action)(item))),
                    None => return Poll::Ready(Ok(())),
                }
            }
            if let Err(e) = ready!(this
                .in_flight
                .as_mut()
                .as_pin_mut()
                .expect("in-flight action future set above")
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
