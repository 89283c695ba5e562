//! Definition of the `Repeat` combinator, looping a fallible body until it
//! asks to stop.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::ready;
use pin_project_lite::pin_project;

use crate::reactor::preempt;

/// A two-valued tag returned by loop bodies: run another iteration, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run the body again.
    Continue,
    /// The loop is finished.
    Stop,
}

pin_project! {
    /// Future for the [`repeat`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Repeat<F, Fut> {
        body: F,
        #[pin]
        in_flight: Option<Fut>,
    }
}

impl<F, Fut> core::fmt::Debug for Repeat<F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Repeat")
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Invokes the given body until it fails or requests the iteration to stop by
/// resolving to [`Step::Stop`].
///
/// As long as each body future resolves immediately the loop stays in a tight
/// synchronous cycle, bounded by the reactor's preemption budget: when the
/// budget runs out the loop reschedules itself and other tasks get to run. A
/// pending body future suspends the loop until it resolves. The first error
/// ends the loop and is surfaced unchanged.
///
/// # Examples
///
/// ```
/// use weft::future::{ok, repeat, Step};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let mut calls = 0;
/// let res: Result<(), ()> = reactor.run(repeat(|| {
///     calls += 1;
///     ok(if calls == 3 { Step::Stop } else { Step::Continue })
/// }));
/// assert_eq!(res, Ok(()));
/// assert_eq!(calls, 3);
/// ```
pub fn repeat<F, Fut, E>(body: F) -> Repeat<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Step, E>>,
{
    Repeat {
        body,
        in_flight: None,
    }
}

impl<F, Fut, E> Future for Repeat<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Step, E>>,
{
    type Output = Result<(), E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            if this.in_flight.as_mut().as_pin_mut().is_none() {
                this.in_flight.set(Some((this.body)()));
            }
            let step = ready!(this
                .in_flight
                .as_mut()
                .as_pin_mut()
                .expect("in-flight body future set above")
                .poll(cx));
            this.in_flight.set(None);
            match step {
                Ok(Step::Stop) => return Poll::Ready(Ok(())),
                Ok(Step::Continue) => {
                    if preempt::poll_proceed(cx).is_pending() {
                        return Poll::Pending;
                    }
                }
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
    }
}

pin_project! {
    /// Future for the [`keep_doing`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct KeepDoing<F, Fut> {
        body: F,
        #[pin]
        in_flight: Option<Fut>,
    }
}

impl<F, Fut> core::fmt::Debug for KeepDoing<F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeepDoing")
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Invokes the given body over and over until it fails.
///
/// Equivalent to [`repeat`] with a body that always continues; the returned
/// future only ever resolves to the first error. The loop yields to the
/// reactor whenever the preemption budget runs out, so a body that always
/// resolves immediately still cannot monopolize the thread or overflow the
/// stack.
pub fn keep_doing<F, Fut, E>(body: F) -> KeepDoing<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    KeepDoing {
        body,
        in_flight: None,
    }
}

impl<F, Fut, E> Future for KeepDoing<F, Fut>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    type Output = Result<(), E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let mut this = self.as_mut().project();
            if this.in_flight.as_mut().as_pin_mut().is_none() {
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
