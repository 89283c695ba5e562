//! Definition of the `WaitAllSuccessful` combinators, waiting for a set of
//! futures and unwrapping their values, or failing with one of their errors.

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
        ($WaitAll:ident, $wait_all:ident, <$(($Fut:ident, $T:ident)),*>),
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

        /// Wait for a fixed set of fallible futures and unwrap their values.
        ///
        /// Every input is driven to its terminal state before the aggregate
        /// resolves. If all inputs succeed the output is the tuple of their
        /// values, positionally. If any input fails, the aggregate fails with
        /// the first error in input order; the remaining outcomes have
        /// already been observed and are discarded.
        pub fn $wait_all<ERR, $($T,)* $($Fut),*>($($Fut: $Fut),*) -> $WaitAll<$($Fut),*>
        where
            $($Fut: Future<Output = Result<$T, ERR>>),*
        {
            $WaitAll {
                $($Fut: maybe_done($Fut)),*
            }
        }

        impl<ERR, $($T,)* $($Fut),*> Future for $WaitAll<$($Fut),*>
        where
            $($Fut: Future<Output = Result<$T, ERR>>),*
        {
            type Output = Result<($($T,)*), ERR>;

            fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
                let mut all_done = true;
                let mut this = self.project();
                $(
                    all_done &= this.$Fut.as_mut().poll(cx).is_ready();
                )*

                if !all_done {
                    return Poll::Pending;
                }

                let mut first_error: Option<ERR> = None;
                $(
                    let $Fut = match this
                        .$Fut
                        .as_mut()
                        .take_output()
                        .expect("all aggregate slots complete")
                    {
                        Ok(value) => Some(value),
                        Err(e) => {
                            if first_error.is_none() {
                                first_error = Some(e);
                            }
                            None
                        }
                    };
                )*

                match first_error {
                    Some(e) => Poll::Ready(Err(e)),
                    None => Poll::Ready(Ok(($(
                        $Fut.expect("no slot failed"),
                    )*))),
                }
            }
        }
    )*)
}

generate! {
    /// Future for the [`wait_all_successful`] function.
    (WaitAllSuccessful, wait_all_successful, <(A, TA), (B, TB)>),

    /// Future for the [`wait_all_successful3`] function.
    (WaitAllSuccessful3, wait_all_successful3, <(A, TA), (B, TB), (C, TC)>),

    /// Future for the [`wait_all_successful4`] function.
    (WaitAllSuccessful4, wait_all_successful4, <(A, TA), (B, TB), (C, TC), (D, TD)>),

    /// Future for the [`wait_all_successful5`] function.
    (WaitAllSuccessful5, wait_all_successful5, <(A, TA), (B, TB), (C, TC), (D, TD), (E, TE)>),
}

/// Future for the [`wait_all_successful_iter`] function.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WaitAllSuccessfulIter<Fut>
where
    Fut: Future,
{
    elems: Pin<Box<[MaybeDone<Fut>]>>,
}

impl<Fut> fmt::Debug for WaitAllSuccessfulIter<Fut>
where
    Fut: Future + fmt::Debug,
    Fut::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitAllSuccessfulIter")
            .field("elems", &self.elems)
            .finish()
    }
}

/// Wait for a collection of fallible futures and unwrap their values
/// (iterator version).
///
/// All inputs are driven to their terminal state first. On success the output
/// vector holds the unwrapped values in input order; if any input failed the
/// aggregate fails with the first error in input order and the other
/// outcomes are discarded after being observed.
///
/// # Examples
///
/// ```
/// use weft::future::{ok, wait_all_successful_iter};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let values = reactor.run(wait_all_successful_iter(vec![ok::<_, ()>(1), ok(2)]));
/// assert_eq!(values, Ok(vec![1, 2]));
/// ```
pub fn wait_all_successful_iter<I, T, E>(futures: I) -> WaitAllSuccessfulIter<I::Item>
where
    I: IntoIterator,
    I::Item: Future<Output = Result<T, E>>,
{
    let elems: Box<[_]> = futures.into_iter().map(maybe_done).collect();
    WaitAllSuccessfulIter {
        elems: elems.into(),
    }
}

impl<Fut, T, E> Future for WaitAllSuccessfulIter<Fut>
where
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Result<Vec<T>, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut all_done = true;

        for elem in iter_pin_mut(self.elems.as_mut()) {
            if elem.poll(cx).is_pending() {
                all_done = false;
            }
        }

        if !all_done {
            return Poll::Pending;
        }

        let mut elems = mem::replace(&mut self.elems, Box::pin([]));
        let mut values = Vec::with_capacity(elems.len());
        for elem in iter_pin_mut(elems.as_mut()) {
            match elem.take_output().expect("all aggregate slots complete") {
                Ok(value) => values.push(value),
                Err(e) => return Poll::Ready(Err(e)),
            }
        }
        Poll::Ready(Ok(values))
    }
}
