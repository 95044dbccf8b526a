//! The unsynchronized operation family.
//!
//! Every operation here requires the caller to guarantee that nothing else
//! touches any node reachable from the list for the duration of the call:
//! single-threaded use, or external locking. In exchange the operations are
//! plain pointer stores with no barriers.
//!
//! Iteration yields host structures, not links, through the [`Anchor`]
//! projection. The delete-safe iterator reads the successor before handing
//! out an element, so the element may be unlinked inside the loop body
//! without invalidating the cursor.

use core::marker::PhantomData;
use core::ptr::NonNull;

use super::anchor::Anchor;
use super::node::LinkNode;

impl LinkNode {
    /// Links `node` immediately after `self` (the head).
    ///
    /// Postcondition: `self.successor()` is `node`.
    ///
    /// # Safety
    ///
    /// - No other thread accesses any node reachable from `self` during the
    ///   call.
    /// - `self` and `node` are initialized and address-stable, and `node` is
    ///   not currently linked into any list.
    pub unsafe fn insert_front(&self, node: &LinkNode) {
        let el = NonNull::from(node);
        let n = self.next.get();
        node.next.set(n);
        node.prev.set(NonNull::from(self));
        // SAFETY: `n` is a linked neighbor, valid under the serial contract.
        unsafe { n.as_ref() }.prev.set(el);
        self.next.set(el);
    }

    /// Links `node` immediately before `self` (the head), i.e. at the tail.
    ///
    /// Postcondition: `self.predecessor()` is `node`.
    ///
    /// # Safety
    ///
    /// As [`insert_front`](LinkNode::insert_front).
    pub unsafe fn insert_back(&self, node: &LinkNode) {
        let el = NonNull::from(node);
        let p = self.prev.get();
        node.prev.set(p);
        node.next.set(NonNull::from(self));
        // SAFETY: `p` is a linked neighbor, valid under the serial contract.
        unsafe { p.as_ref() }.next.set(el);
        self.prev.set(el);
    }

    /// Unlinks this node from whatever list contains it.
    ///
    /// The node's own pointers are left stale, still aiming at its old
    /// neighbors. Use this form only when the node will be reinitialized or
    /// discarded before anything consults it again; [`is_linked`] lies about
    /// a node removed this way.
    ///
    /// # Safety
    ///
    /// - No other thread accesses any node reachable from this node's list
    ///   during the call.
    /// - The node is initialized and currently linked (a detached node is
    ///   its own neighbor, so removing it is harmless but pointless).
    ///
    /// [`is_linked`]: LinkNode::is_linked
    pub unsafe fn remove(&self) {
        let n = self.next.get();
        let p = self.prev.get();
        // SAFETY: linked neighbors, valid under the serial contract.
        unsafe { n.as_ref() }.prev.set(p);
        unsafe { p.as_ref() }.next.set(n);
    }

    /// Unlinks this node and resets it to the detached state in one pass.
    ///
    /// Equivalent to [`remove`](LinkNode::remove) followed by
    /// [`init`](LinkNode::init), without re-reading the neighbor pointers.
    /// This is the removal form that keeps [`is_linked`](LinkNode::is_linked)
    /// truthful.
    ///
    /// # Safety
    ///
    /// As [`remove`](LinkNode::remove).
    pub unsafe fn remove_reinit(&self) {
        let n = self.next.get();
        let p = self.prev.get();
        // SAFETY: linked neighbors, valid under the serial contract.
        unsafe { n.as_ref() }.prev.set(p);
        unsafe { p.as_ref() }.next.set(n);
        let me = NonNull::from(self);
        self.next.set(me);
        self.prev.set(me);
    }

    /// Returns the first element of this head's list, or `None` when empty.
    ///
    /// # Safety
    ///
    /// Serial contract, and every element of the list is embedded in a `T`
    /// as its [`Anchor`] describes.
    pub unsafe fn first<T: Anchor>(&self) -> Option<NonNull<T>> {
        let n = self.next.get();
        if n == NonNull::from(self) {
            None
        } else {
            // SAFETY: `n` is a linked element, embedded in a `T` per the
            // caller's contract.
            Some(unsafe { T::container_of(n) })
        }
    }

    /// Returns the last element of this head's list, or `None` when empty.
    ///
    /// # Safety
    ///
    /// As [`first`](LinkNode::first).
    pub unsafe fn last<T: Anchor>(&self) -> Option<NonNull<T>> {
        let p = self.prev.get();
        if p == NonNull::from(self) {
            None
        } else {
            // SAFETY: as in `first`.
            Some(unsafe { T::container_of(p) })
        }
    }

    /// Iterates the list forward from this head, yielding host structures.
    ///
    /// # Safety
    ///
    /// - Serial contract for the lifetime of the iterator.
    /// - Every element of the list is embedded in a `T` as its [`Anchor`]
    ///   describes.
    /// - Elements must not be unlinked during iteration; use
    ///   [`iter_safe`](LinkNode::iter_safe) for that.
    pub unsafe fn iter<T: Anchor>(&self) -> Iter<'_, T> {
        Iter {
            head: NonNull::from(self),
            cur: self.next.get(),
            _marker: PhantomData,
        }
    }

    /// Iterates forward starting from `start` (inclusive), ending when the
    /// traversal reaches this head.
    ///
    /// # Safety
    ///
    /// As [`iter`](LinkNode::iter), and `start` is currently linked into
    /// this head's list.
    pub unsafe fn iter_from<'a, T: Anchor>(&'a self, start: &'a T) -> Iter<'a, T> {
        Iter {
            head: NonNull::from(self),
            cur: T::node_of(NonNull::from(start)),
            _marker: PhantomData,
        }
    }

    /// Delete-safe forward iteration from this head.
    ///
    /// The successor of each yielded element is read before the element is
    /// handed out, so the loop body may unlink the *current* element (via
    /// [`remove`] or [`remove_reinit`]) without skipping or revisiting any
    /// other element. Unlinking anything beyond the current element remains
    /// undefined.
    ///
    /// # Safety
    ///
    /// As [`iter`](LinkNode::iter), except that removal of the current
    /// element is allowed.
    ///
    /// [`remove`]: LinkNode::remove
    /// [`remove_reinit`]: LinkNode::remove_reinit
    pub unsafe fn iter_safe<T: Anchor>(&self) -> IterSafe<'_, T> {
        let cur = self.next.get();
        IterSafe {
            head: NonNull::from(self),
            cur,
            // SAFETY: `cur` is the head itself or a linked element; either
            // way it is valid under the serial contract.
            ahead: unsafe { cur.as_ref() }.next.get(),
            _marker: PhantomData,
        }
    }

    /// Delete-safe forward iteration starting from `start` (inclusive).
    ///
    /// # Safety
    ///
    /// As [`iter_safe`](LinkNode::iter_safe), and `start` is currently
    /// linked into this head's list.
    pub unsafe fn iter_safe_from<'a, T: Anchor>(&'a self, start: &'a T) -> IterSafe<'a, T> {
        let cur = T::node_of(NonNull::from(start));
        IterSafe {
            head: NonNull::from(self),
            cur,
            // SAFETY: `start` is linked, so its successor is valid.
            ahead: unsafe { cur.as_ref() }.next.get(),
            _marker: PhantomData,
        }
    }
}

/// Forward iterator over a serial list. Created by [`LinkNode::iter`] and
/// [`LinkNode::iter_from`].
pub struct Iter<'a, T> {
    head: NonNull<LinkNode>,
    cur: NonNull<LinkNode>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Anchor> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cur == self.head {
            return None;
        }
        let node = self.cur;
        // SAFETY: `node` is a linked element (not the head), valid under the
        // serial contract the constructor imposed.
        self.cur = unsafe { node.as_ref() }.next.get();
        // SAFETY: every element is embedded in a `T` per the constructor's
        // contract, and lives at least as long as the borrow of the head.
        Some(unsafe { T::container_of(node).as_ref() })
    }
}

/// Delete-safe forward iterator. Created by [`LinkNode::iter_safe`] and
/// [`LinkNode::iter_safe_from`].
pub struct IterSafe<'a, T> {
    head: NonNull<LinkNode>,
    cur: NonNull<LinkNode>,
    /// Successor of `cur`, read before `cur` is yielded.
    ahead: NonNull<LinkNode>,
    _marker: PhantomData<&'a T>,
}

impl<'a, T: Anchor> Iterator for IterSafe<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.cur == self.head {
            return None;
        }
        let node = self.cur;
        self.cur = self.ahead;
        // SAFETY: `self.cur` was read before its predecessor could have been
        // unlinked, so it is the head or a still-linked element; reading its
        // successor is valid under the serial contract.
        self.ahead = unsafe { self.cur.as_ref() }.next.get();
        // SAFETY: as in `Iter::next`.
        Some(unsafe { T::container_of(node).as_ref() })
    }
}
