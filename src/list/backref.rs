//! Weak cursors that survive removal of their target.
//!
//! A deferred consumer walking a list in slices (the classic case: dumping a
//! table too large for one output buffer) parks a cursor on the element
//! where it stopped. If the host later unlinks that element, the parked
//! pointer would dangle. Instead, cursors register themselves on a registry
//! list, and the host calls [`redirect`] before unlinking an element; every
//! cursor parked there is advanced to the element's successor (possibly the
//! head, which the consumer reads as "end of list").
//!
//! This component is layered on top of the serial core and follows its
//! contract: the registry, the watched list, and all parked cursors must be
//! externally serialized. It does not participate in the locked family.

use core::cell::Cell;
use core::ptr::NonNull;

use super::node::LinkNode;

/// A registered weak cursor into a list.
///
/// The cursor itself is a list element: its `users` link threads it onto a
/// registry head owned by whoever owns the watched list. Construction and
/// placement follow the same rules as any node: [`init`](BackRef::init)
/// after the `BackRef` has its final address.
pub struct BackRef {
    /// Registry membership.
    users: LinkNode,
    /// The list entry this cursor is parked on, if any.
    target: Cell<Option<NonNull<LinkNode>>>,
}

crate::anchor!(BackRef { users });

impl BackRef {
    /// Creates an unregistered cursor. Call [`init`](BackRef::init) once it
    /// has its final address.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        Self {
            users: LinkNode::new(),
            target: Cell::new(None),
        }
    }

    /// Creates an unregistered cursor (loom builds lack `const` atomics).
    #[cfg(loom)]
    pub fn new() -> Self {
        Self {
            users: LinkNode::new(),
            target: Cell::new(None),
        }
    }

    /// Resets the cursor: detached from any registry, parked on nothing.
    pub fn init(&self) {
        self.users.init();
        self.target.set(None);
    }

    /// Parks this cursor on `at` and registers it on `registry`.
    ///
    /// A cursor already registered (on any registry) is only re-aimed; it is
    /// not linked twice.
    ///
    /// # Safety
    ///
    /// Serial contract across `registry`, the watched list, and this cursor;
    /// `registry`, `at`, and `self` are initialized and address-stable while
    /// the cursor stays registered.
    pub unsafe fn park(&self, registry: &LinkNode, at: &LinkNode) {
        self.target.set(Some(NonNull::from(at)));
        if !self.users.is_linked() {
            // SAFETY: serial contract per this function's contract.
            unsafe { registry.insert_back(&self.users) };
        }
    }

    /// Unregisters this cursor and clears its target.
    ///
    /// # Safety
    ///
    /// Serial contract, as [`park`](BackRef::park). Harmless on a cursor
    /// that was never parked.
    pub unsafe fn unpark(&self) {
        if self.users.is_linked() {
            // SAFETY: serial contract; the cursor is linked on a registry.
            unsafe { self.users.remove_reinit() };
        }
        self.target.set(None);
    }

    /// The list entry this cursor is parked on, if any.
    ///
    /// After a [`redirect`], this may be the list head: the element the
    /// cursor was parked on is gone and traversal should resume (or end)
    /// from there.
    pub fn target(&self) -> Option<NonNull<LinkNode>> {
        self.target.get()
    }
}

impl Default for BackRef {
    fn default() -> Self {
        Self::new()
    }
}

/// Advances every cursor on `registry` that is parked on `removed` to the
/// successor of `removed`.
///
/// Call this immediately before unlinking `removed` from its list; the
/// successor is read from the still-intact links.
///
/// # Safety
///
/// Serial contract across `registry`, the watched list, and every
/// registered cursor; `removed` is currently linked; every node on
/// `registry` is the `users` link of a live [`BackRef`].
pub unsafe fn redirect(registry: &LinkNode, removed: &LinkNode) {
    let from = NonNull::from(removed);
    let to = removed.successor();
    // SAFETY: serial contract; the registry holds only `BackRef` users
    // links, per this function's contract.
    for cursor in unsafe { registry.iter::<BackRef>() } {
        if cursor.target.get() == Some(from) {
            cursor.target.set(Some(to));
        }
    }
}
