use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

/// A future that is immediately ready with a value.
///
/// Created by the [`ready()`] function and its [`ok`]/[`err`]/[`result`]
/// variants.
#[derive(Debug, Clone)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Ready<T>(Option<T>);

impl<T> Unpin for Ready<T> {}

impl<T> Future for Ready<T> {
    type Output = T;

    #[inline]
    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<T> {
        Poll::Ready(self.0.take().expect("Ready polled after completion"))
    }
}

/// Create a future that is immediately ready with a value.
///
/// # Examples
///
/// ```
/// use weft::future::ready;
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// assert_eq!(reactor.run(ready(1)), 1);
/// ```
pub fn ready<T>(t: T) -> Ready<T> {
    Ready(Some(t))
}

/// Create a future that is immediately ready with a success value.
///
/// # Examples
///
/// ```
/// use weft::future::ok;
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// assert_eq!(reactor.run(ok::<i32, i32>(1)), Ok(1));
/// ```
pub fn ok<T, E>(t: T) -> Ready<Result<T, E>> {
    Ready(Some(Ok(t)))
}

/// Create a future that is immediately ready with an error value.
///
/// This is the ready-error half of lifting a synchronous outcome into a
/// future: a body that fails before ever suspending returns `err(..)` and the
/// failure reaches the surrounding combinator exactly like an asynchronous
/// one.
///
/// # Examples
///
/// ```
/// use weft::future::err;
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// assert_eq!(reactor.run(err::<i32, i32>(1)), Err(1));
/// ```
pub fn err<T, E>(e: E) -> Ready<Result<T, E>> {
    Ready(Some(Err(e)))
}

/// Lift an already-computed `Result` into a ready future.
pub fn result<T, E>(r: Result<T, E>) -> Ready<Result<T, E>> {
    Ready(Some(r))
}

/// A ready future carrying no value, produced allocation-free.
///
/// The identity element of sequential composition; loop bodies that have
/// nothing asynchronous to do on an iteration return `now()`.
pub fn now<E>() -> Ready<Result<(), E>> {
    ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_test::task::noop_context;

    #[test]
    fn ready_resolves_on_first_poll() {
        let mut cx = noop_context();
        let mut fut = ready(7);
        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready(7));
    }

    #[test]
    fn now_is_ok_unit() {
        let mut cx = noop_context();
        let mut fut = now::<()>();
        assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready(Ok(())));
    }
}
