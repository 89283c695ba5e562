use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

/// Future for the [`later`] function.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Later {
    yielded: bool,
}

/// Returns a future which is not ready but resolves on the next reactor
/// iteration.
///
/// The first poll wakes the current task and returns pending, sending the
/// task to the back of its run queue; the second poll completes. This forces
/// a preemption point, letting other queued tasks (and expired timers) run in
/// between. Useful in tests and in user code that wants to break up a long
/// synchronous stretch.
pub fn later() -> Later {
    Later { yielded: false }
}

impl Future for Later {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if !self.yielded {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}
