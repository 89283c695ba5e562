//! Definition of the `ParallelForEach` combinator, applying an asynchronous
//! action to every item of a range without waiting in between.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::boxed::Box;
use std::vec::Vec;

use pin_project_lite::pin_project;

pin_project! {
    /// Future for the [`parallel_for_each`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct ParallelForEach<I, F, Fut, E> {
        iter: Option<I>,
        action: F,
        pending: Vec<Pin<Box<Fut>>>,
        error: Option<E>,
    }
}

impl<I, F, Fut, E> core::fmt::Debug for ParallelForEach<I, F, Fut, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParallelForEach")
            .field("started", &self.iter.is_none())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// Applies an action to each item in a range, running all of them in
/// parallel, and resolves once every one of them has completed.
///
/// The range is traversed in order and each action is started as soon as its
/// item is reached; the traversal never waits for an earlier action to
/// finish. Action futures that complete during that initial sweep are
/// consumed on the spot and occupy no list space; only genuinely pending ones
/// are retained. The retained futures are then waited for back to front, on
/// the assumption that earlier-started work finishes earlier, so the futures
/// at the back are usually found already complete and popped without
/// suspension.
///
/// If one or more actions fail, the remaining ones are still driven to
/// completion, every outcome is observed, and the aggregate then fails with
/// the first error that was seen. An empty range resolves immediately.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use weft::future::{now, parallel_for_each};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let sum = Cell::new(0);
/// let res: Result<(), ()> = reactor.run(parallel_for_each(1..=5, |x| {
///     sum.set(sum.get() + x);
///     now()
/// }));
/// assert_eq!(res, Ok(()));
/// assert_eq!(sum.get(), 15);
/// ```
pub fn parallel_for_each<I, F, Fut, E>(range: I, action: F) -> ParallelForEach<I::IntoIter, F, Fut, E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    ParallelForEach {
        iter: Some(range.into_iter()),
        action,
        pending: Vec::new(),
        error: None,
    }
}

impl<I, F, Fut, E> Future for ParallelForEach<I, F, Fut, E>
where
    I: Iterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    type Output = Result<(), E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        // Launch every action, in range order. Futures that resolve right
        // away are consumed inline; only pending ones are collected, and the
        // list is sized from the remaining range when the first one appears.
        if let Some(mut iter) = this.iter.take() {
            while let Some(item) = iter.next() {
                let mut fut = Box::pin((this.action)(item));
                match fut.as_mut().poll(cx) {
                    Poll::Ready(Ok(())) => {}
                    Poll::Ready(Err(e)) => {
                        if this.error.is_none() {
                            *this.error = Some(e);
                        }
                    }
                    Poll::Pending => {
                        if this.pending.is_empty() {
                            let (lower, _) = iter.size_hint();
                            this.pending.reserve(lower + 1);
                        }
                        this.pending.push(fut);
                    }
                }
            }
        }

        // Wait for the collected futures back to front; anything that turns
        // out complete is popped without suspending.
        while let Some(last) = this.pending.last_mut() {
            match last.as_mut().poll(cx) {
                Poll::Ready(outcome) => {
                    if let Err(e) = outcome {
                        if this.error.is_none() {
                            *this.error = Some(e);
                        }
                    }
                    this.pending.pop();
                }
                Poll::Pending => return Poll::Pending,
            }
        }

        Poll::Ready(match this.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        })
    }
}
