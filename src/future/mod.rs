//! Futures
//!
//! This module contains the combinator surface of the crate: constructors for
//! ready futures, sequential loop combinators, parallel fan-out, fan-in
//! aggregation, the map/reduce pipeline and the timeout wrapper.

// Primitive futures
mod ready;
pub use self::ready::{err, now, ok, ready, result, Ready};

mod lazy;
pub use self::lazy::{lazy, Lazy};

mod either;
pub use self::either::Either;

mod later;
pub use self::later::{later, Later};

mod maybe_done;
pub use self::maybe_done::{maybe_done, MaybeDone};

// Sequential loops
mod repeat;
pub use self::repeat::{keep_doing, repeat, KeepDoing, Repeat, Step};

mod repeat_until_value;
pub use self::repeat_until_value::{repeat_until_value, RepeatUntilValue};

mod do_until;
pub use self::do_until::{do_until, DoUntil};

mod do_for_each;
pub use self::do_for_each::{do_for_each, DoForEach};

// Fan-out
mod parallel_for_each;
pub use self::parallel_for_each::{parallel_for_each, ParallelForEach};

// Fan-in
mod wait_all;
pub use self::wait_all::{
    wait_all, wait_all3, wait_all4, wait_all5, wait_all_iter, WaitAll, WaitAll3, WaitAll4,
    WaitAll5, WaitAllIter,
};

mod wait_all_successful;
pub use self::wait_all_successful::{
    wait_all_successful, wait_all_successful3, wait_all_successful4, wait_all_successful5,
    wait_all_successful_iter, WaitAllSuccessful, WaitAllSuccessful3, WaitAllSuccessful4,
    WaitAllSuccessful5, WaitAllSuccessfulIter,
};

// Map/reduce
mod map_reduce;
pub use self::map_reduce::{map_reduce, map_reduce_with, Adder, MapReduce, MapReduceWith, Reduce};

// Timeout
mod timeout;
pub use self::timeout::{with_timeout, TimedOut, Timeout};
