//! Definition of the `Lazy` combinator, deferring invocation of a callable
//! until the future is polled.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

use pin_project_lite::pin_project;

pin_project! {
    /// Future for the [`lazy`] function.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Lazy<F, Fut> {
        func: Option<F>,
        #[pin]
        future: Option<Fut>,
    }
}

impl<F, Fut> core::fmt::Debug for Lazy<F, Fut> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lazy")
            .field("started", &self.future.is_some())
            .finish()
    }
}

/// Normalize a callable into a future of its outcome.
///
/// The callable is invoked the first time the returned future is polled; the
/// future it produces is then driven in place. This is the adapter used to
/// pass a callable anywhere a future is expected, for example as an input to
/// [`wait_all`](crate::future::wait_all).
///
/// A callable that fails before suspending expresses that by returning
/// [`err`](crate::future::err) or [`result`](crate::future::result); the
/// error surfaces exactly like an asynchronous one.
///
/// # Examples
///
/// ```
/// use weft::future::{lazy, ok};
/// use weft::reactor::Reactor;
///
/// let reactor = Reactor::new();
/// let out: Result<i32, ()> = reactor.run(lazy(|| ok(3)));
/// assert_eq!(out, Ok(3));
/// ```
pub fn lazy<F, Fut>(func: F) -> Lazy<F, Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    Lazy {
        func: Some(func),
        future: None,
    }
}

impl<F, Fut> Future for Lazy<F, Fut>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    type Output = Fut::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        if this.future.as_mut().as_pin_mut().is_none() {
            let func = this.func.take().expect("Lazy polled after completion");
            this.future.set(Some(func()));
        }
        this.future
            .as_pin_mut()
            .expect("Lazy polled after completion")
            .poll(cx)
    }
}
