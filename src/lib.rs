//! # `tether` - Intrusive Circular List Toolkit
//!
//! Circular, doubly-linked lists whose link fields live *inside* the host
//! structure: threading an element onto a list costs no allocation, and one
//! structure can sit on several lists at once by embedding several links.
//!
//! Two operation families share one node layout:
//!
//! - **Serial** ([`LinkNode::insert_front`], [`LinkNode::remove_reinit`],
//!   iteration, ...): plain pointer stores, no barriers. The caller
//!   guarantees external serialization.
//! - **Locked** ([`LinkNode::locked_insert_front`],
//!   [`LinkNode::locked_pop_front`], ...): safe under concurrent mutation
//!   from many threads. Mutual exclusion is per *pointer slot*, not per list:
//!   a mutator atomically exchanges each slot it will write for a reserved
//!   claim marker, and on conflict rolls its claims back (reverse order) and
//!   retries. Release-ordered publication guarantees no thread ever observes
//!   a half-updated list.
//!
//! The families must never be mixed on one list instance; `init` is the only
//! shared call.
//!
//! ## Design points
//!
//! - **No payload, no ownership**: the list manages pointer relationships
//!   only. Hosts own their memory and recover themselves from a link through
//!   the [`Anchor`] projection (implemented by the [`anchor!`] macro).
//! - **Detached = self-linked**: a node outside any list points at itself.
//!   That single convention replaces a separate "linked" flag, at the price
//!   that only [`LinkNode::remove_reinit`]-style removal keeps
//!   [`LinkNode::is_linked`] truthful.
//! - **Claims are spins, not locks**: a contended locked operation busy-waits;
//!   it never parks the thread and never returns an error. There is no bound
//!   on spin duration under unfair scheduling. This is a documented
//!   limitation, kept rather than traded for a blocking design with
//!   different contention behavior.
//!
//! ## Example
//!
//! ```rust
//! use tether::{anchor, LinkNode};
//!
//! struct Job {
//!     link: LinkNode,
//!     priority: u32,
//! }
//! anchor!(Job { link });
//!
//! let queue = LinkNode::new();
//! queue.init();
//!
//! let a = Job { link: LinkNode::new(), priority: 1 };
//! let b = Job { link: LinkNode::new(), priority: 2 };
//! a.link.init();
//! b.link.init();
//!
//! // SAFETY: single-threaded, nodes outlive their membership and don't move.
//! unsafe {
//!     queue.insert_back(&a.link);
//!     queue.insert_back(&b.link);
//! }
//!
//! let total: u32 = unsafe { queue.iter::<Job>() }.map(|j| j.priority).sum();
//! assert_eq!(total, 3);
//!
//! unsafe {
//!     a.link.remove_reinit();
//!     b.link.remove_reinit();
//! }
//! assert!(queue.is_empty());
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod list;

pub use list::{redirect, Anchor, BackRef, Iter, IterSafe, LinkNode};

// Compile-time layout guarantees.
#[cfg(not(loom))]
const _: () = {
    use core::mem;

    // A node is exactly two pointers; embedding it costs the host nothing
    // beyond the links themselves.
    assert!(mem::size_of::<LinkNode>() == 2 * mem::size_of::<*mut ()>());

    // The claim marker is the misaligned address 1; it can never compare
    // equal to a real node address as long as nodes are align > 1.
    assert!(mem::align_of::<LinkNode>() > 1);
};
