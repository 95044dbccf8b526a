//! The synchronized operation family.
//!
//! Safe to call from any number of threads, provided every mutator of the
//! shared list uses only this family (mixing with the serial family on one
//! list is undefined; `init` is the sole shared call).
//!
//! Each operation is a retry loop around a claim set: it claims every slot
//! it will write *before* making any visible change, publishes the new
//! pointers with release stores, and on any claim conflict restores what it
//! already holds (reverse claim order, see [`Claims`]) and starts over. A
//! reader or writer that wins a claim therefore observes each operation
//! either fully applied or not at all.
//!
//! Contention never blocks on an OS primitive and never returns an error;
//! the losing thread spins. There is no bound on spin duration under
//! adversarial scheduling. That is an accepted liveness tradeoff inherited
//! from the design, not something these operations try to paper over with a
//! blocking fallback.

use core::ptr::NonNull;

use crossbeam_utils::Backoff;

use super::anchor::Anchor;
use super::node::LinkNode;
use super::slot::Claims;

/// Retry pause between claim attempts.
///
/// Under loom the spin must become an explicit yield so the model checker
/// can schedule the thread that holds the contended slot.
#[cfg(not(loom))]
#[inline]
fn relax(backoff: &Backoff) {
    #[cfg(feature = "tracing")]
    tracing::trace!("link slot contended; retrying");
    backoff.spin();
}

#[cfg(loom)]
fn relax(_backoff: &Backoff) {
    loom::thread::yield_now();
}

impl LinkNode {
    /// Links `node` immediately after `self` (the head), claiming the two
    /// affected slots first.
    ///
    /// Claim order: `self.next` (yielding the old first element `n`), then
    /// `n.prev`. The final release of `self.next` both publishes `node` and
    /// un-claims the slot, so no thread ever observes a half-linked node.
    ///
    /// # Safety
    ///
    /// - Every mutator of this list uses only the locked family.
    /// - `self` and `node` are initialized and address-stable while linked.
    /// - `node` is detached and no other thread touches it until this call
    ///   publishes it.
    /// - No node reachable from the list is freed or moved while linked.
    pub unsafe fn locked_insert_front(&self, node: &LinkNode) {
        let el = NonNull::from(node);
        let backoff = Backoff::new();
        loop {
            let mut claims = Claims::new();
            let Some(n) = claims.claim(&self.next) else {
                relax(&backoff);
                continue;
            };
            // SAFETY: holding the claim on `self.next` pins `n` in the list;
            // no remover can take it without that slot.
            let n_ref = unsafe { n.as_ref() };
            let Some(p) = claims.claim(&n_ref.prev) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            // `n.prev` was consistent when claimed, so it recorded this head.
            debug_assert_eq!(p, NonNull::from(self));

            node.next.publish(n);
            node.prev.publish(p);
            n_ref.prev.publish(el);
            self.next.publish(el);
            claims.commit();
            return;
        }
    }

    /// Links `node` immediately before `self` (the head), i.e. at the tail.
    ///
    /// Mirror image of [`locked_insert_front`](LinkNode::locked_insert_front):
    /// claims `self.prev` (yielding the old last element `p`), then `p.next`.
    ///
    /// # Safety
    ///
    /// As [`locked_insert_front`](LinkNode::locked_insert_front).
    pub unsafe fn locked_insert_back(&self, node: &LinkNode) {
        let el = NonNull::from(node);
        let backoff = Backoff::new();
        loop {
            let mut claims = Claims::new();
            let Some(p) = claims.claim(&self.prev) else {
                relax(&backoff);
                continue;
            };
            // SAFETY: the claim on `self.prev` pins `p` in the list.
            let p_ref = unsafe { p.as_ref() };
            let Some(n) = claims.claim(&p_ref.next) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            debug_assert_eq!(n, NonNull::from(self));

            node.next.publish(n);
            node.prev.publish(p);
            p_ref.next.publish(el);
            self.prev.publish(el);
            claims.commit();
            return;
        }
    }

    /// Unlinks this node from its list under concurrent access, leaving it
    /// detached (`next == prev == self`).
    ///
    /// Claims the node's own two slots, then the predecessor's `next` and
    /// the successor's `prev` where those are distinct slots (a sole element
    /// is its own neighbor, so the extra claims are skipped). Only with
    /// every needed slot held are the neighbors rewired.
    ///
    /// # Safety
    ///
    /// - Every mutator of this list uses only the locked family.
    /// - The node is initialized, linked, and address-stable.
    /// - No other thread will concurrently remove *this* node (each element
    ///   has one remover at a time; `locked_pop_front` counts as a remover
    ///   of whatever node is first).
    /// - No node reachable from the list is freed or moved while linked.
    pub unsafe fn locked_remove(&self) {
        let me = NonNull::from(self);
        let backoff = Backoff::new();
        loop {
            let mut claims = Claims::new();
            let Some(n) = claims.claim(&self.next) else {
                relax(&backoff);
                continue;
            };
            let Some(p) = claims.claim(&self.prev) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            if p != me {
                // SAFETY: holding `self.prev` pins the predecessor.
                let p_ref = unsafe { p.as_ref() };
                if claims.claim(&p_ref.next).is_none() {
                    claims.unwind();
                    relax(&backoff);
                    continue;
                }
            }
            if n != me {
                // SAFETY: holding `self.next` pins the successor.
                let n_ref = unsafe { n.as_ref() };
                if claims.claim(&n_ref.prev).is_none() {
                    claims.unwind();
                    relax(&backoff);
                    continue;
                }
            }

            // SAFETY: both neighbors are pinned by the claims above; for a
            // sole element they alias `self`, which the reinit below fixes
            // up last.
            unsafe { n.as_ref() }.prev.publish(p);
            unsafe { p.as_ref() }.next.publish(n);
            self.prev.publish(me);
            self.next.publish(me);
            claims.commit();
            return;
        }
    }

    /// Removes and returns the first element of this head's list, or `None`
    /// when the list is empty.
    ///
    /// The empty answer is a normal outcome, not a failure: the head slot is
    /// restored and the operation reports "nothing to do". The removed
    /// element is handed back detached, through its [`Anchor`] projection.
    ///
    /// # Safety
    ///
    /// - Every mutator of this list uses only the locked family.
    /// - Every element of the list is embedded in a `T` as its [`Anchor`]
    ///   describes, and stays live and unmoved while linked.
    /// - The returned element belongs to the caller; no other thread still
    ///   treats it as listed.
    pub unsafe fn locked_pop_front<T: Anchor>(&self) -> Option<NonNull<T>> {
        let me = NonNull::from(self);
        let backoff = Backoff::new();
        loop {
            let mut claims = Claims::new();
            let Some(n) = claims.claim(&self.next) else {
                relax(&backoff);
                continue;
            };
            if n == me {
                claims.unwind();
                return None;
            }
            // SAFETY: the claim on `self.next` pins `n`.
            let n_ref = unsafe { n.as_ref() };
            let Some(p) = claims.claim(&n_ref.prev) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            debug_assert_eq!(p, me);
            let Some(n2) = claims.claim(&n_ref.next) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            // SAFETY: `n2` is reachable only through the claimed `n.next`;
            // for a single-element list it is the head itself.
            let n2_ref = unsafe { n2.as_ref() };
            let Some(p2) = claims.claim(&n2_ref.prev) else {
                claims.unwind();
                relax(&backoff);
                continue;
            };
            debug_assert_eq!(p2, n);

            self.next.publish(n2);
            n2_ref.prev.publish(me);
            n_ref.prev.publish(n);
            n_ref.next.publish(n);
            claims.commit();
            // SAFETY: `n` is a linked element (not the head), embedded in a
            // `T` per the caller's contract.
            return Some(unsafe { T::container_of(n) });
        }
    }
}
