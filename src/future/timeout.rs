//! Definition of the `Timeout` combinator, racing a future against a timer.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::error::Error;
use std::time::Instant;

use pin_project_lite::pin_project;

use crate::reactor::Timer;

/// The error a timed-out [`with_timeout`] resolves with, before conversion
/// into the caller's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl Error for TimedOut {}

pin_project! {
    /// Future for the [`with_timeout`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Timeout<Fut> {
        #[pin]
        future: Fut,
        timer: Option<Timer>,
    }
}

impl<Fut> fmt::Debug for Timeout<Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeout")
            .field("armed", &self.timer.is_some())
            .finish()
    }
}

/// Wait for a future, or for a deadline, whichever comes first.
///
/// The wrapped future is polled before the timer, so a future that is already
/// complete wins without the timer ever being armed and without requiring a
/// running reactor. If the deadline passes first, the output resolves with
/// [`TimedOut`] converted into the caller's error type, and the wrapped
/// future is abandoned.
///
/// Timing out does not cancel work that runs elsewhere: for a promise-backed
/// future only the waiting side is dropped, and a producer that resolves
/// later finds no reader, without further effect. Callers that need real
/// cancellation must arrange it out of band.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use weft::future::{with_timeout, TimedOut};
/// use weft::reactor::{ManualClock, Reactor};
///
/// #[derive(Debug, PartialEq)]
/// struct Expired;
/// impl From<TimedOut> for Expired {
///     fn from(_: TimedOut) -> Expired {
///         Expired
///     }
/// }
///
/// let clock = ManualClock::new();
/// let reactor = Reactor::with_clock(clock.clone());
/// let never = std::future::pending::<Result<(), Expired>>();
/// let res = reactor.run(with_timeout(clock.now() + Duration::from_secs(1), never));
/// assert_eq!(res, Err(Expired));
/// ```
pub fn with_timeout<Fut, T, E>(deadline: Instant, future: Fut) -> Timeout<Fut>
where
    Fut: Future<Output = Result<T, E>>,
    E: From<TimedOut>,
{
    Timeout {
        future,
        timer: Some(Timer::at(deadline)),
    }
}

impl<Fut, T, E> Future for Timeout<Fut>
where
    Fut: Future<Output = Result<T, E>>,
    E: From<TimedOut>,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        if let Poll::Ready(output) = this.future.poll(cx) {
            // Disarm rather than let the timer fire into a resolved wrapper.
            this.timer.take();
            return Poll::Ready(output);
        }
        let timer = match this.timer.as_mut() {
            Some(timer) => timer,
            None => panic!("Timeout polled after completion"),
        };
        match Pin::new(timer).poll(cx) {
            Poll::Ready(()) => {
                this.timer.take();
                Poll::Ready(Err(TimedOut.into()))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
