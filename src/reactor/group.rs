//! Scheduling groups: named run queues with a CPU share weight, and dispatch
//! of callables into them.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

use futures_channel::oneshot;
use futures_core::ready;
use pin_project_lite::pin_project;

use super::{current_group, try_current, Inner};
use crate::future::Either;

pub(crate) struct GroupState {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) shares: u32,
    // Accumulated runtime normalized by shares; the reactor always drains the
    // runnable group with the smallest value.
    pub(crate) vruntime: Cell<u64>,
    pub(crate) runnable: RefCell<VecDeque<usize>>,
}

/// A handle to a named scheduling group within a [`Reactor`](super::Reactor).
///
/// Each group owns a run queue and a share weight; the reactor divides
/// processing time between runnable groups in proportion to their shares.
/// Handles are cheap to clone and all refer to the same group.
#[derive(Clone)]
pub struct SchedulingGroup {
    pub(crate) state: Rc<GroupState>,
    pub(crate) reactor: Weak<Inner>,
}

impl fmt::Debug for SchedulingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulingGroup")
            .field("name", &self.state.name)
            .field("shares", &self.state.shares)
            .finish()
    }
}

impl SchedulingGroup {
    /// The group's name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// The group's share weight.
    pub fn shares(&self) -> u32 {
        self.state.shares
    }

    /// Whether the currently running task belongs to this group.
    ///
    /// When this holds, work dispatched to the group may run immediately
    /// instead of being queued.
    pub fn is_active(&self) -> bool {
        let Some(inner) = try_current() else {
            return false;
        };
        let Some(ours) = self.reactor.upgrade() else {
            return false;
        };
        Rc::ptr_eq(&inner, &ours) && current_group() == Some(self.state.id)
    }

    /// Enqueue a task in this group.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        let Some(inner) = self.reactor.upgrade() else {
            panic!("cannot spawn into a scheduling group of a dropped reactor");
        };
        inner.spawn_in(self.state.id, Box::pin(future));
    }
}

pin_project! {
    /// Future for the queued arm of [`with_scheduling_group`]: the result of
    /// a callable running in another group, forwarded through a channel.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct Enqueued<T> {
        #[pin]
        receiver: oneshot::Receiver<T>,
    }
}

impl<T> fmt::Debug for Enqueued<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enqueued").finish()
    }
}

impl<T> Future for Enqueued<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match ready!(self.project().receiver.poll(cx)) {
            Ok(value) => Poll::Ready(value),
            Err(oneshot::Canceled) => panic!("scheduling group task dropped before completing"),
        }
    }
}

/// Run a callable inside a scheduling group.
///
/// If the caller is already running in `group`, the callable is invoked on
/// the spot and its future returned directly. Otherwise a task is enqueued in
/// the group that invokes the callable and forwards its output; the returned
/// future resolves with that output.
///
/// # Examples
///
/// ```
/// use weft::reactor::{with_scheduling_group, Reactor};
///
/// let reactor = Reactor::new();
/// let batch = reactor.create_scheduling_group("batch", 100);
/// let out = reactor.run(with_scheduling_group(&batch, || async { 6 * 7 }));
/// assert_eq!(out, 42);
/// ```
pub fn with_scheduling_group<F, Fut>(
    group: &SchedulingGroup,
    func: F,
) -> Either<Fut, Enqueued<Fut::Output>>
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future + 'static,
{
    if group.is_active() {
        Either::Left(func())
    } else {
        let (tx, rx) = oneshot::channel();
        group.spawn(async move {
            let _ = tx.send(func().await);
        });
        Either::Right(Enqueued { receiver: rx })
    }
}
