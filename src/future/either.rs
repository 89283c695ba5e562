use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

/// Combines two different futures with the same output into a single type.
///
/// This is used where a combinator has a fast path and a slow path producing
/// differently-typed futures, such as
/// [`with_scheduling_group`](crate::reactor::with_scheduling_group) running a
/// callable either inline or through a queue.
#[derive(Debug, Clone)]
pub enum Either<A, B> {
    /// First branch of the type.
    Left(A),
    /// Second branch of the type.
    Right(B),
}

impl<T> Either<T, T> {
    /// Extract the value of an either over two equivalent types.
    pub fn into_inner(self) -> T {
        match self {
            Either::Left(x) => x,
            Either::Right(x) => x,
        }
    }
}

impl<A, B> Future for Either<A, B>
where
    A: Future,
    B: Future<Output = A::Output>,
{
    type Output = A::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<A::Output> {
        // Safety: whichever variant is live stays pinned in place; we never
        // move out of it.
        unsafe {
            match self.get_unchecked_mut() {
                Either::Left(a) => Pin::new_unchecked(a).poll(cx),
                Either::Right(b) => Pin::new_unchecked(b).poll(cx),
            }
        }
    }
}
