//! Definition of the `WaitAll` combinators, waiting for every one of a set of
//! futures to reach its terminal state.

#![allow(non_snake_case)]

use core::fmt;
use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::boxed::Box;
use std::vec::Vec;

use pin_project_lite::pin_project;

use super::maybe_done::{iter_pin_mut, maybe_done, MaybeDone};

macro_rules! generate {
    ($(
        $(#[$doc:meta])*
        ($WaitAll:ident, $wait_all:ident, <$($Fut:ident),*>),
    )*) => ($(
        pin_project! {
            $(#[$doc])*
            #[must_use = "futures do nothing unless you `.await` or poll them"]
            pub struct $WaitAll<$($Fut: Future),*> {
                $(
                    #[pin]
                    $Fut: MaybeDone<$Fut>,
                )*
            }
        }

        impl<$($Fut),*> fmt::Debug for $WaitAll<$($Fut),*>
        where
            $(
                $Fut: Future + fmt::Debug,
                $Fut::Output: fmt::Debug,
            )*
        {
            fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt.debug_struct(stringify!($WaitAll))
                    $(.field(stringify!($Fut), &self.$Fut))*
                    .finish()
            }
        }

        /// Wait for a fixed set of futures to complete, capturing every
        /// outcome.
        ///
        /// The output is a tuple of the inputs' outputs, positionally, each in
        /// its terminal state; a fallible input's own `Result` carries its
        /// error, so the aggregate itself never fails. Inputs that are
        /// already complete are consumed without suspension. To pass a
        /// callable instead of a future, lower it first with
        /// [`lazy`](crate::future::lazy).
        pub fn $wait_all<$($Fut: Future),*>($($Fut: $Fut),*) -> $WaitAll<$($Fut),*> {
            $WaitAll {
                $($Fut: maybe_done($Fut)),*
            }
        }

        impl<$($Fut: Future),*> Future for $WaitAll<$($Fut),*> {
            type Output = ($($Fut::Output,)*);

            fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
                let mut all_done = true;
                let mut this = self.project();
                $(
                    all_done &= this.$Fut.as_mut().poll(cx).is_ready();
                )*

                if all_done {
                    Poll::Ready(($(
                        this.$Fut
                            .as_mut()
                            .take_output()
                            .expect("all aggregate slots complete"),
                    )*))
                } else {
                    Poll::Pending
                }
            }
        }
    )*)
}

generate! {
    /// Future for the [`wait_all`] function.
    (WaitAll, wait_all, <A, B>),

    /// Future for the [`wait_all3`] function.
    (WaitAll3, wait_all3, <A, B, C>),

    /// Future for the [`wait_all4`] function.
    (WaitAll4, wait_all4, <A, B, C, D>),

    /// Future for the [`wait_all5`] function.
    (WaitAll5, wait_all5, <A, B, C, D, E>),
}

/// Future for the [`wait_all_iter`] function.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WaitAllIter<Fut>
where
    Fut: Future,
{
    elems: Pin<Box<[MaybeDone<Fut>]>>,
}

impl<Fut> fmt::Debug for WaitAllIter<Fut>
where
    Fut: Future + fmt::Debug,
    Fut::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitAllIter")
            .field("elems", &self.elems)
            .finish()
    }
}

/// Wait for a collection of futures to complete, capturing every outcome
/// (iterator version).
///
/// The output vector preserves input order regardless of completion order;
/// each slot holds the corresponding input's output in its terminal state,
/// so per-slot errors are delivered inside the vector and the aggregate
/// itself never fails.
///
/// # Examples
///
/// ```
/// use weft::future::{err, ok, wait_all_iter};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let outcomes = reactor.run(wait_all_iter(vec![ok::<_, i32>(1), err(7), ok(3)]));
/// assert_eq!(outcomes, vec![Ok(1), Err(7), Ok(3)]);
/// ```
pub fn wait_all_iter<I>(futures: I) -> WaitAllIter<I::Item>
where
    I: IntoIterator,
    I::Item: Future,
{
    let elems: Box<[_]> = futures.into_iter().map(maybe_done).collect();
    WaitAllIter {
        elems: elems.into(),
    }
}

impl<Fut> Future for WaitAllIter<Fut>
where
    Fut: Future,
{
    type Output = Vec<Fut::Output>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut all_done = true;

        for elem in iter_pin_mut(self.elems.as_mut()) {
            if elem.poll(cx).is_pending() {
                all_done = false;
            }
        }

        if all_done {
            let mut elems = mem::replace(&mut self.elems, Box::pin([]));
            let result = iter_pin_mut(elems.as_mut())
                .map(|e| e.take_output().expect("all aggregate slots complete"))
                .collect();
            Poll::Ready(result)
        } else {
            Poll::Pending
        }
    }
}
