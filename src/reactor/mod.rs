//! A single-threaded cooperative reactor.
//!
//! The reactor multiplexes any number of spawned tasks onto the thread that
//! created it. Tasks live in named [scheduling groups](SchedulingGroup), each
//! a run queue with a share weight; the reactor always drains the runnable
//! group with the least accumulated runtime per share. A [preemption
//! budget](preempt) is refilled before every poll so cooperative loops know
//! when to yield, and a timer queue on a pluggable [`Clock`] drives
//! [`sleep`]/[`Timer`] and [`with_timeout`](crate::future::with_timeout).
//!
//! Use [`Reactor::run`] to drive a main future to completion, or
//! [`Reactor::run_until_stalled`] together with a [`ManualClock`] to step
//! through time deterministically in tests.

mod clock;
mod group;
pub mod preempt;
mod timer;

pub use self::clock::{Clock, ManualClock, SystemClock};
pub use self::group::{with_scheduling_group, Enqueued, SchedulingGroup};
pub use self::timer::{sleep, Timer};

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::pin::pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use std::thread::{self, Thread};
use std::time::Instant;

use futures_task::{waker, ArcWake};
use slab::Slab;

use self::group::GroupState;
use self::timer::TimerQueue;

// Pseudo task id for the future driven by `run`/`run_until_stalled`.
const ROOT_ID: usize = usize::MAX;

// Runtime charged to a group per poll is QUANTUM / shares.
const VRUNTIME_QUANTUM: u64 = 1 << 20;

thread_local! {
    static CURRENT: RefCell<Option<Rc<Inner>>> = RefCell::new(None);
    static CURRENT_GROUP: Cell<Option<usize>> = Cell::new(None);
}

pub(crate) fn current() -> Rc<Inner> {
    match try_current() {
        Some(inner) => inner,
        None => panic!("no reactor is running on this thread"),
    }
}

pub(crate) fn try_current() -> Option<Rc<Inner>> {
    CURRENT.with(|c| c.borrow().clone())
}

pub(crate) fn current_group() -> Option<usize> {
    CURRENT_GROUP.with(|g| g.get())
}

// Wake queue shared between the reactor and its wakers. Wakers may fire from
// any thread; the reactor drains the queue and unparks on pushes.
struct WokenQueue {
    ids: Mutex<VecDeque<usize>>,
    thread: Thread,
}

impl WokenQueue {
    fn push(&self, id: usize) {
        self.ids.lock().unwrap().push_back(id);
        self.thread.unpark();
    }

    fn pop(&self) -> Option<usize> {
        self.ids.lock().unwrap().pop_front()
    }
}

struct TaskWaker {
    id: usize,
    woken: Arc<WokenQueue>,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.push(arc_self.id);
    }
}

struct Task {
    future: Option<std::pin::Pin<Box<dyn Future<Output = ()>>>>,
    group: usize,
    waker: Waker,
    queued: bool,
}

pub(crate) struct Inner {
    clock: Box<dyn Clock>,
    timers: TimerQueue,
    tasks: RefCell<Slab<Task>>,
    groups: RefCell<Vec<Rc<GroupState>>>,
    woken: Arc<WokenQueue>,
    root_woken: Cell<bool>,
}

impl Inner {
    pub(crate) fn now(&self) -> Instant {
        self.clock.now()
    }

    pub(crate) fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub(crate) fn spawn_in(
        &self,
        group: usize,
        future: std::pin::Pin<Box<dyn Future<Output = ()>>>,
    ) {
        let id = {
            let mut tasks = self.tasks.borrow_mut();
            let entry = tasks.vacant_entry();
            let id = entry.key();
            let task_waker = waker(Arc::new(TaskWaker {
                id,
                woken: self.woken.clone(),
            }));
            entry.insert(Task {
                future: Some(future),
                group,
                waker: task_waker,
                queued: true,
            });
            id
        };
        self.groups.borrow()[group].runnable.borrow_mut().push_back(id);
    }

    fn drain_woken(&self) {
        while let Some(id) = self.woken.pop() {
            if id == ROOT_ID {
                self.root_woken.set(true);
                continue;
            }
            let group = {
                let mut tasks = self.tasks.borrow_mut();
                match tasks.get_mut(id) {
                    Some(task) if !task.queued => {
                        task.queued = true;
                        Some(task.group)
                    }
                    _ => None,
                }
            };
            if let Some(group) = group {
                self.groups.borrow()[group].runnable.borrow_mut().push_back(id);
            }
        }
    }

    // The runnable group with the least accumulated runtime per share.
    fn next_task(&self) -> Option<(usize, Rc<GroupState>)> {
        let group = {
            let groups = self.groups.borrow();
            let mut best: Option<&Rc<GroupState>> = None;
            for g in groups.iter() {
                if g.runnable.borrow().is_empty() {
                    continue;
                }
                let better = match best {
                    None => true,
                    Some(b) => g.vruntime.get() < b.vruntime.get(),
                };
                if better {
                    best = Some(g);
                }
            }
            best?.clone()
        };
        let id = group.runnable.borrow_mut().pop_front()?;
        Some((id, group))
    }

    fn run_one_task(&self) -> bool {
        self.drain_woken();
        let Some((id, group)) = self.next_task() else {
            return false;
        };
        let taken = {
            let mut tasks = self.tasks.borrow_mut();
            match tasks.get_mut(id) {
                Some(task) => {
                    task.queued = false;
                    task.future.take().map(|f| (f, task.waker.clone()))
                }
                // The task completed while a stale wake was queued.
                None => None,
            }
        };
        let Some((mut future, task_waker)) = taken else {
            return true;
        };
        let prev = CURRENT_GROUP.with(|g| g.replace(Some(group.id)));
        preempt::reset();
        let mut cx = Context::from_waker(&task_waker);
        let poll = future.as_mut().poll(&mut cx);
        CURRENT_GROUP.with(|g| g.set(prev));
        group
            .vruntime
            .set(group.vruntime.get() + VRUNTIME_QUANTUM / u64::from(group.shares));
        let mut tasks = self.tasks.borrow_mut();
        match poll {
            Poll::Ready(()) => {
                tasks.remove(id);
            }
            Poll::Pending => {
                if let Some(task) = tasks.get_mut(id) {
                    task.future = Some(future);
                }
            }
        }
        true
    }
}

// Marks this reactor as current for the duration of a run, refusing nesting.
struct Enter;

impl Enter {
    fn new(inner: &Rc<Inner>) -> Enter {
        CURRENT.with(|c| {
            let mut current = c.borrow_mut();
            if current.is_some() {
                panic!("cannot nest reactor runs on a single thread");
            }
            *current = Some(inner.clone());
        });
        Enter
    }
}

impl Drop for Enter {
    fn drop(&mut self) {
        CURRENT.with(|c| c.borrow_mut().take());
    }
}

/// A single-threaded cooperative task scheduler.
///
/// Must be run on the thread that created it. Spawned tasks and the main
/// future are polled in turns; between polls the reactor fires due timers,
/// and when it goes fully idle it waits on its [`Clock`] for the next
/// deadline.
pub struct Reactor {
    inner: Rc<Inner>,
}

impl fmt::Debug for Reactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("tasks", &self.inner.tasks.borrow().len())
            .finish()
    }
}

impl Default for Reactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactor {
    /// A reactor on the system clock.
    pub fn new() -> Reactor {
        Reactor::with_clock(SystemClock)
    }

    /// A reactor on the given clock; pass a [`ManualClock`] handle to drive
    /// time by hand.
    pub fn with_clock(clock: impl Clock + 'static) -> Reactor {
        let inner = Rc::new(Inner {
            clock: Box::new(clock),
            timers: TimerQueue::new(),
            tasks: RefCell::new(Slab::new()),
            groups: RefCell::new(Vec::new()),
            woken: Arc::new(WokenQueue {
                ids: Mutex::new(VecDeque::new()),
                thread: thread::current(),
            }),
            root_woken: Cell::new(false),
        });
        let reactor = Reactor { inner };
        reactor.create_scheduling_group("main", 1000);
        reactor
    }

    /// Create a new scheduling group with the given share weight.
    pub fn create_scheduling_group(&self, name: &str, shares: u32) -> SchedulingGroup {
        let mut groups = self.inner.groups.borrow_mut();
        // Start from the current minimum so a new group neither starves nor
        // monopolizes the reactor.
        let start = groups.iter().map(|g| g.vruntime.get()).min().unwrap_or(0);
        let id = groups.len();
        let state = Rc::new(GroupState {
            id,
            name: name.to_string(),
            shares: shares.max(1),
            vruntime: Cell::new(start),
            runnable: RefCell::new(VecDeque::new()),
        });
        groups.push(state.clone());
        SchedulingGroup {
            state,
            reactor: Rc::downgrade(&self.inner),
        }
    }

    /// The group tasks are spawned into by default.
    pub fn default_scheduling_group(&self) -> SchedulingGroup {
        SchedulingGroup {
            state: self.inner.groups.borrow()[0].clone(),
            reactor: Rc::downgrade(&self.inner),
        }
    }

    /// Spawn a task into the default scheduling group.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        self.inner.spawn_in(0, Box::pin(future));
    }

    /// Drive `future` to completion, running spawned tasks and timers along
    /// the way.
    ///
    /// When everything is pending the reactor waits on its clock: the system
    /// clock parks the thread until the next timer deadline (or a cross-thread
    /// wake), a [`ManualClock`] jumps straight to the deadline. Panics if the
    /// main future is pending while no task is runnable and no timer is
    /// armed on a clock that cannot be woken externally.
    pub fn run<F: Future>(&self, future: F) -> F::Output {
        let _enter = Enter::new(&self.inner);
        let mut future = pin!(future);
        let root_waker = waker(Arc::new(TaskWaker {
            id: ROOT_ID,
            woken: self.inner.woken.clone(),
        }));
        self.inner.root_woken.set(true);
        loop {
            if self.inner.root_woken.replace(false) {
                let prev = CURRENT_GROUP.with(|g| g.replace(Some(0)));
                preempt::reset();
                let mut cx = Context::from_waker(&root_waker);
                let poll = future.as_mut().poll(&mut cx);
                CURRENT_GROUP.with(|g| g.set(prev));
                if let Poll::Ready(output) = poll {
                    return output;
                }
            }
            if self.inner.run_one_task() {
                continue;
            }
            if self.inner.timers.fire_due(self.inner.clock.now()) {
                continue;
            }
            if self.inner.root_woken.get() {
                continue;
            }
            match self.inner.timers.next_deadline() {
                Some(deadline) => self.inner.clock.wait_until(deadline),
                None => self.inner.clock.park(),
            }
        }
    }

    /// Run tasks and fire already-due timers until no further progress can be
    /// made without waiting, polling `future` along the way.
    ///
    /// Unlike [`run`](Reactor::run) this never waits on the clock, which
    /// makes it the stepping primitive for manual-clock tests: advance the
    /// clock, run until stalled, observe.
    pub fn run_until_stalled<F: Future + Unpin>(&self, future: &mut F) -> Poll<F::Output> {
        let _enter = Enter::new(&self.inner);
        let root_waker = waker(Arc::new(TaskWaker {
            id: ROOT_ID,
            woken: self.inner.woken.clone(),
        }));
        self.inner.root_woken.set(true);
        loop {
            if self.inner.root_woken.replace(false) {
                let prev = CURRENT_GROUP.with(|g| g.replace(Some(0)));
                preempt::reset();
                let mut cx = Context::from_waker(&root_waker);
                let poll = std::pin::Pin::new(&mut *future).poll(&mut cx);
                CURRENT_GROUP.with(|g| g.set(prev));
                if let Poll::Ready(output) = poll {
                    return Poll::Ready(output);
                }
            }
            if self.inner.run_one_task() {
                continue;
            }
            if self.inner.timers.fire_due(self.inner.clock.now()) {
                continue;
            }
            if self.inner.root_woken.get() {
                continue;
            }
            return Poll::Pending;
        }
    }
}
