//! Intrusive circular doubly-linked lists.
//!
//! Organized by concern:
//! - `node`: the two-pointer link embedded in host structures
//! - `anchor`: the element ↔ link projection
//! - `serial`: the externally-serialized operation family and iterators
//! - `locked`: the concurrent operation family over per-slot claims
//! - `backref`: weak cursors redirected on removal, layered on the serial
//!   core
//!
//! The `slot` module is internal: the claim protocol is an implementation
//! detail of the locked family, not an exported primitive.

pub mod anchor;
pub mod backref;
pub mod node;
pub mod serial;

mod locked;
mod slot;

pub use anchor::Anchor;
pub use backref::{redirect, BackRef};
pub use node::LinkNode;
pub use serial::{Iter, IterSafe};
