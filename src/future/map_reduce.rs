//! Definition of the map/reduce combinators: asynchronous transformation of a
//! range with sequential reduction of the results.

use core::future::Future;
use core::ops::AddAssign;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::boxed::Box;

use pin_project_lite::pin_project;

use super::maybe_done::{get_pin_mut, iter_pin_mut, maybe_done, MaybeDone};
use super::ready::{ok, Ready};

pin_project! {
    /// Future for the [`map_reduce`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct MapReduce<Fut, Acc, R, E>
    where
        Fut: Future,
    {
        elems: Pin<Box<[MaybeDone<Fut>]>>,
        next: usize,
        acc: Option<Acc>,
        reduce: R,
        error: Option<E>,
    }
}

impl<Fut, Acc, R, E> core::fmt::Debug for MapReduce<Fut, Acc, R, E>
where
    Fut: Future,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapReduce")
            .field("total", &self.elems.len())
            .field("reduced", &self.next)
            .finish()
    }
}

/// Transforms each item of a range through an asynchronous mapper and folds
/// the mapped values left-to-right into an accumulator.
///
/// All mapper futures are started up front and may make progress
/// concurrently; the reducer, which is synchronous, is applied strictly in
/// input order as the front of the sequence completes. If a mapper fails, the
/// remaining mapper futures are still driven to completion (their results
/// observed and discarded) and the first error in input order is surfaced.
/// An empty range resolves immediately with the initial accumulator.
///
/// # Examples
///
/// ```
/// use weft::future::{map_reduce, ok};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let sum: Result<u64, ()> =
///     reactor.run(map_reduce(0..1000u64, |x| ok(x * x), 0, |acc, x| acc + x));
/// assert_eq!(sum, Ok(332_833_500));
/// ```
pub fn map_reduce<I, Map, Fut, T, E, Acc, R>(
    range: I,
    mut map: Map,
    initial: Acc,
    reduce: R,
) -> MapReduce<Fut, Acc, R, E>
where
    I: IntoIterator,
    Map: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(Acc, T) -> Acc,
{
    let elems: Box<[_]> = range.into_iter().map(|item| maybe_done(map(item))).collect();
    MapReduce {
        elems: elems.into(),
        next: 0,
        acc: Some(initial),
        reduce,
        error: None,
    }
}

impl<Fut, T, E, Acc, R> Future for MapReduce<Fut, Acc, R, E>
where
    Fut: Future<Output = Result<T, E>>,
    R: FnMut(Acc, T) -> Acc,
{
    type Output = Result<Acc, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let mut all_done = true;
        for elem in iter_pin_mut(this.elems.as_mut()) {
            if elem.poll(cx).is_pending() {
                all_done = false;
            }
        }

        // Fold the completed prefix, in input order.
        while *this.next < this.elems.len() {
            let elem = get_pin_mut(this.elems.as_mut(), *this.next);
            match elem.take_output() {
                Some(Ok(value)) => {
                    if this.error.is_none() {
                        let acc = this.acc.take().expect("accumulator present until resolution");
                        *this.acc = Some((this.reduce)(acc, value));
                    }
                    *this.next += 1;
                }
                Some(Err(e)) => {
                    if this.error.is_none() {
                        *this.error = Some(e);
                    }
                    *this.next += 1;
                }
                None => break,
            }
        }

        if all_done && *this.next == this.elems.len() {
            Poll::Ready(match this.error.take() {
                Some(e) => Err(e),
                None => Ok(this.acc.take().expect("accumulator present until resolution")),
            })
        } else {
            Poll::Pending
        }
    }
}

/// A reducer consumed by [`map_reduce_with`]: an object that absorbs mapped
/// values one at a time and produces a final result.
///
/// `accumulate` may be asynchronous (it returns a future); at most one
/// accumulation is in flight at a time, and values are fed in input order.
pub trait Reduce<T, E> {
    /// The final result produced by [`finish`](Reduce::finish).
    type Output;
    /// The future returned by [`accumulate`](Reduce::accumulate).
    type Accumulate: Future<Output = Result<(), E>>;

    /// Absorb one mapped value.
    fn accumulate(&mut self, value: T) -> Self::Accumulate;

    /// Produce the final result once every value has been absorbed.
    fn finish(self) -> Self::Output;
}

pin_project! {
    /// Future for the [`map_reduce_with`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct MapReduceWith<Fut, R, Q, E>
    where
        Fut: Future,
    {
        elems: Pin<Box<[MaybeDone<Fut>]>>,
        next: usize,
        reducer: Option<R>,
        #[pin]
        in_flight: Option<Q>,
        error: Option<E>,
    }
}

impl<Fut, R, Q, E> core::fmt::Debug for MapReduceWith<Fut, R, Q, E>
where
    Fut: Future,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MapReduceWith")
            .field("total", &self.elems.len())
            .field("reduced", &self.next)
            .finish()
    }
}

/// Transforms each item of a range through an asynchronous mapper and feeds
/// the mapped values, in input order, into a [`Reduce`] object.
///
/// The output is whatever the reducer's [`finish`](Reduce::finish) yields. As
/// with [`map_reduce`], mapper futures run concurrently while accumulation is
/// sequential, and a failure (of a mapper or of an accumulation) is surfaced
/// after every mapper future has been driven to completion.
///
/// # Examples
///
/// ```
/// use weft::future::{map_reduce_with, ok, Adder};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let sum: Result<u32, ()> =
///     reactor.run(map_reduce_with(1..=10u32, |x| ok(x), Adder::default()));
/// assert_eq!(sum, Ok(55));
/// ```
pub fn map_reduce_with<I, Map, Fut, T, E, R>(
    range: I,
    mut map: Map,
    reducer: R,
) -> MapReduceWith<Fut, R, R::Accumulate, E>
where
    I: IntoIterator,
    Map: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Reduce<T, E>,
{
    let elems: Box<[_]> = range.into_iter().map(|item| maybe_done(map(item))).collect();
    MapReduceWith {
        elems: elems.into(),
        next: 0,
        reducer: Some(reducer),
        in_flight: None,
        error: None,
    }
}

impl<Fut, T, E, R, Q> Future for MapReduceWith<Fut, R, Q, E>
where
    Fut: Future<Output = Result<T, E>>,
    R: Reduce<T, E, Accumulate = Q>,
    Q: Future<Output = Result<(), E>>,
{
    type Output = Result<R::Output, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        let mut all_done = true;
        for elem in iter_pin_mut(this.elems.as_mut()) {
            if elem.poll(cx).is_pending() {
                all_done = false;
            }
        }

        loop {
            // Finish the accumulation in flight before touching the next slot.
            if let Some(fut) = this.in_flight.as_mut().as_pin_mut() {
                match fut.poll(cx) {
                    Poll::Ready(Ok(())) => this.in_flight.set(None),
                    Poll::Ready(Err(e)) => {
                        this.in_flight.set(None);
                        if this.error.is_none() {
                            *this.error = Some(e);
                        }
                    }
                    Poll::Pending => return Poll::Pending,
                }
            }

            if *this.next == this.elems.len() {
                break;
            }
            let elem = get_pin_mut(this.elems.as_mut(), *this.next);
            match elem.take_output() {
                Some(Ok(value)) => {
                    *this.next += 1;
                    if this.error.is_none() {
                        let reducer = this
                            .reducer
                            .as_mut()
                            .expect("reducer present until resolution");
                        this.in_flight.set(Some(reducer.accumulate(value)));
                    }
                }
                Some(Err(e)) => {
                    *this.next += 1;
                    if this.error.is_none() {
                        *this.error = Some(e);
                    }
                }
                None => break,
            }
        }

        if all_done && *this.next == this.elems.len() && this.in_flight.is_none() {
            Poll::Ready(match this.error.take() {
                Some(e) => Err(e),
                None => Ok(this
                    .reducer
                    .take()
                    .expect("reducer present until resolution")
                    .finish()),
            })
        } else {
            Poll::Pending
        }
    }
}

/// A [`Reduce`] implementation that accumulates values with `+=` and yields
/// the sum.
#[derive(Debug, Default, Clone, Copy)]
pub struct Adder<R> {
    total: R,
}

impl<R> Adder<R> {
    /// An adder starting from the given value.
    pub fn new(initial: R) -> Self {
        Adder { total: initial }
    }
}

impl<R, A, E> Reduce<A, E> for Adder<R>
where
    R: AddAssign<A>,
{
    type Output = R;
    type Accumulate = Ready<Result<(), E>>;

    fn accumulate(&mut self, value: A) -> Self::Accumulate {
        self.total += value;
        ok(())
    }

    fn finish(self) -> R {
        self.total
    }
}
