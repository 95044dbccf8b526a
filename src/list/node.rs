//! The embedded list link.

use core::fmt;
use core::marker::PhantomPinned;
use core::ptr::NonNull;

use super::slot::LinkSlot;

/// A circular doubly-linked list link, embedded by value in a host structure.
///
/// A `LinkNode` is two pointers and nothing else. It doubles as a list head:
/// an empty list is a head whose `next` and `prev` reference itself, and a
/// detached element looks exactly the same. There is no null terminator and
/// no separate empty flag.
///
/// The node stores no payload and no pointer to its host. The host embeds it
/// at a known field and recovers itself through an [`Anchor`] projection, so
/// membership costs the host no allocation.
///
/// Construction leaves both pointers null; [`init`] must run once the node
/// has its final address, before any list operation touches it.
///
/// # Address stability
///
/// While a node is linked, its neighbors hold its raw address. The host must
/// keep the node at a stable address from insertion until removal; every
/// `unsafe` operation restates this in its contract. `PhantomPinned` keeps
/// the type out of the auto-`Unpin` set as a reminder, but the discipline is
/// the host's to uphold.
///
/// # Two operation families
///
/// Serial operations ([`insert_front`], [`remove`], iteration, ...) require
/// the caller to serialize all access to the list externally. Locked
/// operations ([`locked_insert_front`], [`locked_pop_front`], ...) may be
/// called from many threads concurrently. The two families must never be
/// mixed on one list instance; `init` is the only call shared by both. This
/// is a documented contract, not a runtime check.
///
/// [`init`]: LinkNode::init
/// [`Anchor`]: crate::Anchor
/// [`insert_front`]: LinkNode::insert_front
/// [`remove`]: LinkNode::remove
/// [`locked_insert_front`]: LinkNode::locked_insert_front
/// [`locked_pop_front`]: LinkNode::locked_pop_front
pub struct LinkNode {
    pub(crate) next: LinkSlot,
    pub(crate) prev: LinkSlot,
    _pin: PhantomPinned,
}

impl LinkNode {
    /// Creates an uninitialized node. Call [`init`](LinkNode::init) once the
    /// node has its final address.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            next: LinkSlot::null(),
            prev: LinkSlot::null(),
            _pin: PhantomPinned,
        }
    }

    /// Creates an uninitialized node (loom builds lack `const` atomics).
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            next: LinkSlot::null(),
            prev: LinkSlot::null(),
            _pin: PhantomPinned,
        }
    }

    /// Resets the node to the detached state: both pointers reference the
    /// node itself.
    ///
    /// This is the one operation shared by the serial and locked families;
    /// it must not run while the node is linked into a list (the neighbors
    /// would be left pointing at a node that no longer points back).
    pub fn init(&self) {
        let me = NonNull::from(self);
        self.next.set(me);
        self.prev.set(me);
    }

    /// Returns `true` if this head's list has no elements.
    ///
    /// Meaningful only under the serial contract: a concurrent mutator can
    /// invalidate the answer before the caller acts on it.
    pub fn is_empty(&self) -> bool {
        self.next.get() == NonNull::from(self)
    }

    /// Returns `true` if this node is currently linked into some list.
    ///
    /// Only meaningful for nodes that are always detached through
    /// [`remove_reinit`](LinkNode::remove_reinit) (or [`init`](LinkNode::init)):
    /// a node unlinked via plain [`remove`](LinkNode::remove) keeps its stale
    /// pointers and will still report as linked.
    pub fn is_linked(&self) -> bool {
        self.next.get() != NonNull::from(self)
    }

    /// Returns the raw successor pointer.
    ///
    /// Serial contract. The pointer is only as durable as the caller's
    /// serialization of the list; dereferencing it is up to the caller.
    pub fn successor(&self) -> NonNull<LinkNode> {
        self.next.get()
    }

    /// Returns the raw predecessor pointer. Serial contract, as
    /// [`successor`](LinkNode::successor).
    pub fn predecessor(&self) -> NonNull<LinkNode> {
        self.prev.get()
    }
}

impl Default for LinkNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LinkNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkNode")
            .field("at", &(self as *const Self))
            .field("next", &self.next.get().as_ptr())
            .field("prev", &self.prev.get().as_ptr())
            .finish()
    }
}
