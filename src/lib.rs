//! Loop, fan-out and fan-in combinators for futures on a cooperative
//! single-threaded reactor.
//!
//! This crate provides the connective tissue between individual futures and
//! user algorithms: sequential loops ([`repeat`](future::repeat),
//! [`do_until`](future::do_until), [`do_for_each`](future::do_for_each)),
//! parallel fan-out ([`parallel_for_each`](future::parallel_for_each)),
//! fan-in aggregation ([`wait_all`](future::wait_all),
//! [`wait_all_successful`](future::wait_all_successful)), a sequential
//! [`map_reduce`](future::map_reduce) pipeline, a deadline-bounded
//! [`with_timeout`](future::with_timeout) and scheduling-group dispatch
//! ([`with_scheduling_group`](reactor::with_scheduling_group)).
//!
//! All combinators are hand-written `poll` state machines: chains of
//! already-ready sub-futures collapse into tight loops, suspension happens
//! only when a sub-future is genuinely pending, and every loop consults the
//! reactor's preemption budget so a long run of ready futures cannot starve
//! other tasks.
//!
//! The [`reactor`] module ships the host side of the bargain: a
//! single-threaded cooperative executor with weighted scheduling groups, a
//! timer queue on a pluggable clock (including a manual clock for tests) and
//! the preemption probe the combinators poll.
//!
//! # Example
//!
//! ```
//! use weft::future::{ok, repeat, Step};
//! use weft::reactor::Reactor;
//!
//! let reactor = Reactor::new();
//! let mut remaining = 3;
//! let res: Result<(), ()> = reactor.run(repeat(|| {
//!     remaining -= 1;
//!     ok(if remaining == 0 { Step::Stop } else { Step::Continue })
//! }));
//! assert!(res.is_ok());
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod future;
pub mod reactor;
