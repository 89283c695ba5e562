//! The preemption probe.
//!
//! The reactor grants each task a budget of synchronous work per poll. Loop
//! combinators consult the budget at the top of every fast-path iteration and
//! voluntarily yield when it runs out, which bounds the latency any single
//! combinator can add to the cost of one body invocation.

use std::cell::Cell;
use std::task::{Context, Poll};

/// Number of fast-path loop iterations a task may run before it must yield.
pub const TASK_QUOTA: u32 = 128;

thread_local! {
    static BUDGET: Cell<u32> = Cell::new(TASK_QUOTA);
}

/// Whether the running task has exhausted its budget and should yield.
pub fn need_preempt() -> bool {
    BUDGET.with(|b| b.get() == 0)
}

/// Consume one unit of budget, or yield.
///
/// Returns `Ready` and charges the budget while there is budget left. Once it
/// is exhausted, refills the budget, wakes the task so it is rescheduled at
/// the back of its run queue, and returns `Pending`.
pub fn poll_proceed(cx: &mut Context<'_>) -> Poll<()> {
    BUDGET.with(|b| {
        let left = b.get();
        if left == 0 {
            b.set(TASK_QUOTA);
            cx.waker().wake_by_ref();
            Poll::Pending
        } else {
            b.set(left - 1);
            Poll::Ready(())
        }
    })
}

/// Refill the budget; the reactor does this before every task poll.
pub(crate) fn reset() {
    BUDGET.with(|b| b.set(TASK_QUOTA));
}
