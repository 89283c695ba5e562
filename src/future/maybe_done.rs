//! Definition of the `MaybeDone` combinator.

use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use futures_core::ready;
use pin_project_lite::pin_project;

pin_project! {
    #[project = MaybeDoneProj]
    #[project_replace = MaybeDoneProjReplace]
    /// A future that may have completed: a slot in a fan-in aggregate.
    ///
    /// Each input of [`wait_all`](crate::future::wait_all) and friends sits in
    /// one of these. While running it is polled in place; once complete its
    /// output is stored in the same slot until the aggregate takes it with
    /// [`take_output`](MaybeDone::take_output).
    pub enum MaybeDone<Fut: Future> {
        /// A not-yet-completed future.
        Future { #[pin] future: Fut },
        /// The output of the completed future.
        Done { output: Fut::Output },
        /// The empty variant after the output has been taken.
        Gone,
    }
}

/// Wraps a future into a [`MaybeDone`].
pub fn maybe_done<Fut: Future>(future: Fut) -> MaybeDone<Fut> {
    MaybeDone::Future { future }
}

impl<Fut> fmt::Debug for MaybeDone<Fut>
where
    Fut: Future + fmt::Debug,
    Fut::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaybeDone::Future { future } => f.debug_tuple("Future").field(future).finish(),
            MaybeDone::Done { output } => f.debug_tuple("Done").field(output).finish(),
            MaybeDone::Gone => f.debug_tuple("Gone").finish(),
        }
    }
}

impl<Fut: Future> MaybeDone<Fut> {
    /// Take the output of a completed future, without driving it.
    ///
    /// Returns `None` while the future is still running or after the output
    /// has already been taken.
    pub fn take_output(self: Pin<&mut Self>) -> Option<Fut::Output> {
        match &*self {
            Self::Done { .. } => {}
            Self::Future { .. } | Self::Gone => return None,
        }
        match self.project_replace(Self::Gone) {
            MaybeDoneProjReplace::Done { output } => Some(output),
            _ => unreachable!(),
        }
    }
}

impl<Fut: Future> Future for MaybeDone<Fut> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        match self.as_mut().project() {
            MaybeDoneProj::Future { future } => {
                let output = ready!(future.poll(cx));
                self.set(Self::Done { output });
            }
            MaybeDoneProj::Done { .. } => {}
            MaybeDoneProj::Gone => panic!("MaybeDone polled after output taken"),
        }
        Poll::Ready(())
    }
}

pub(crate) fn iter_pin_mut<T>(slice: Pin<&mut [T]>) -> impl Iterator<Item = Pin<&mut T>> {
    // Safety: field-style pin projection through a slice; the items are never
    // moved out of it.
    unsafe { slice.get_unchecked_mut() }
        .iter_mut()
        .map(|t| unsafe { Pin::new_unchecked(t) })
}

pub(crate) fn get_pin_mut<T>(slice: Pin<&mut [T]>, index: usize) -> Pin<&mut T> {
    // Safety: as for `iter_pin_mut`, projection to a single element.
    unsafe { Pin::new_unchecked(&mut slice.get_unchecked_mut()[index]) }
}
