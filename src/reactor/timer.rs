//! The reactor's timer queue and the `Timer` future.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

use slab::Slab;

struct TimerEntry {
    deadline: Instant,
    waker: Option<Waker>,
    elapsed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimerAt {
    deadline: Instant,
    key: usize,
}

impl Ord for TimerAt {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.key.cmp(&other.key))
    }
}

impl PartialOrd for TimerAt {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Armed timers, keyed by a slab and ordered by a deadline heap.
///
/// Cancelled timers are removed from the slab only; their heap entries are
/// skipped lazily. A slab key reused after cancellation is harmless: a stale
/// heap entry only matches an entry whose recorded deadline is identical, in
/// which case firing it is correct anyway.
pub(crate) struct TimerQueue {
    entries: RefCell<Slab<TimerEntry>>,
    heap: RefCell<BinaryHeap<Reverse<TimerAt>>>,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        TimerQueue {
            entries: RefCell::new(Slab::new()),
            heap: RefCell::new(BinaryHeap::new()),
        }
    }

    fn arm(&self, deadline: Instant, waker: Waker) -> usize {
        let key = self.entries.borrow_mut().insert(TimerEntry {
            deadline,
            waker: Some(waker),
            elapsed: false,
        });
        self.heap
            .borrow_mut()
            .push(Reverse(TimerAt { deadline, key }));
        key
    }

    fn set_waker(&self, key: usize, waker: &Waker) {
        if let Some(entry) = self.entries.borrow_mut().get_mut(key) {
            entry.waker = Some(waker.clone());
        }
    }

    fn is_elapsed(&self, key: usize) -> bool {
        self.entries
            .borrow()
            .get(key)
            .map(|e| e.elapsed)
            .unwrap_or(false)
    }

    fn remove(&self, key: usize) {
        self.entries.borrow_mut().try_remove(key);
    }

    /// Deadline of the earliest armed, unexpired timer.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        let entries = self.entries.borrow();
        let mut heap = self.heap.borrow_mut();
        while let Some(&Reverse(at)) = heap.peek() {
            match entries.get(at.key) {
                Some(entry) if entry.deadline == at.deadline && !entry.elapsed => {
                    return Some(at.deadline);
                }
                _ => {
                    heap.pop();
                }
            }
        }
        None
    }

    /// Mark every timer with a deadline at or before `now` as elapsed and
    /// wake its waiter. Returns whether anything fired.
    pub(crate) fn fire_due(&self, now: Instant) -> bool {
        let mut fired = false;
        loop {
            let due = {
                let mut heap = self.heap.borrow_mut();
                match heap.peek() {
                    Some(&Reverse(at)) if at.deadline <= now => {
                        heap.pop();
                        Some(at)
                    }
                    _ => None,
                }
            };
            let Some(at) = due else { break };
            let waker = {
                let mut entries = self.entries.borrow_mut();
                match entries.get_mut(at.key) {
                    Some(entry) if entry.deadline == at.deadline && !entry.elapsed => {
                        entry.elapsed = true;
                        fired = true;
                        entry.waker.take()
                    }
                    _ => None,
                }
            };
            if let Some(waker) = waker {
                waker.wake();
            }
        }
        fired
    }
}

#[derive(Debug, Clone, Copy)]
enum TimerState {
    After(Duration),
    At(Instant),
    Armed { key: usize, deadline: Instant },
    Done,
}

/// Future for the [`sleep`] and [`Timer::at`] functions: resolves once the
/// reactor's clock reaches a deadline.
///
/// Dropping a `Timer` disarms it. Must be polled on a thread with a running
/// reactor.
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Timer {
    state: TimerState,
}

impl Timer {
    /// A timer that resolves when the reactor's clock reaches `deadline`.
    pub fn at(deadline: Instant) -> Timer {
        Timer {
            state: TimerState::At(deadline),
        }
    }
}

/// A timer that resolves after `duration` on the reactor's clock.
///
/// The deadline is computed when the timer is first polled.
pub fn sleep(duration: Duration) -> Timer {
    Timer {
        state: TimerState::After(duration),
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        let inner = super::current();
        loop {
            match this.state {
                TimerState::Done => return Poll::Ready(()),
                TimerState::After(duration) => {
                    this.state = TimerState::At(inner.now() + duration);
                }
                TimerState::At(deadline) => {
                    if inner.now() >= deadline {
                        this.state = TimerState::Done;
                        return Poll::Ready(());
                    }
                    let key = inner.timers().arm(deadline, cx.waker().clone());
                    this.state = TimerState::Armed { key, deadline };
                    return Poll::Pending;
                }
                TimerState::Armed { key, deadline } => {
                    if inner.timers().is_elapsed(key) || inner.now() >= deadline {
                        inner.timers().remove(key);
                        this.state = TimerState::Done;
                        return Poll::Ready(());
                    }
                    inner.timers().set_waker(key, cx.waker());
                    return Poll::Pending;
                }
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let TimerState::Armed { key, .. } = self.state {
            if let Some(inner) = super::try_current() {
                inner.timers().remove(key);
            }
        }
    }
}
