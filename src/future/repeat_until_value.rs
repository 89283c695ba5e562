//! Definition of the `RepeatUntilValue` combinator, looping a body until it
//! produces a value.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::reactor::preempt;

pin_project! {
    /// Future for the [`repeat_until_value`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct RepeatUntilValue<F, Fut> {
        body: F,
        #[pin]
        in_flight: Option<Fut>,
    }
}

impl<F, Fut> core::fmt::Debug for RepeatUntilValue<F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RepeatUntilValue")
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Invokes the given body until it fails or resolves to an engaged `Option`;
/// the contained value becomes the output of the loop.
///
/// `None` means "run another iteration". The fast path, preemption behavior
/// and error handling are those of [`repeat`](crate::future::repeat).
///
/// # Examples
///
/// ```
/// use weft::future::{ok, repeat_until_value};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let mut c = 0u32;
/// let res: Result<u32, ()> = reactor.run(repeat_until_value(|| {
///     c += 1;
///     ok(if c == 10 { Some(c) } else { None })
/// }));
/// assert_eq!(res, Ok(10));
/// ```
pub fn repeat_until_value<F, Fut, T, E>(body: F) -> RepeatUntilValue<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    RepeatUntilValue {
        body,
        in_flight: None,
    }
}

impl<F, Fut, T, E> Future for RepeatUntilValue<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            if this.in_flight.as_mut().as_pin_mut().is_none() {
                this.in_flight.set(Some((this.body)()));
            }
            let outcome = ready!(this
                .in_flight
                .as_mut()
                .as_pin_mut()
                .expect("in-flight body future set above")
                .poll(cx));
            this.in_flight.set(None);
            match outcome {
                Ok(Some(value)) => return Poll::Ready(Ok(value)),
                Ok(None) => {
                    if preempt::poll_proceed(cx).is_pending() {
                        return Poll::Pending;
                    }
                }
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
    }
}
