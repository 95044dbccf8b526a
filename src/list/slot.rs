//! Pointer-slot primitive underpinning the locked list family.
//!
//! Every `next`/`prev` field of a [`LinkNode`] is a [`LinkSlot`]: an atomic
//! pointer that a mutator can *claim* (atomically exchange for a reserved
//! marker), work around, and release by storing the slot's real new value.
//! A claim that reads back the marker means another thread is mid-mutation
//! on that slot; the caller must restore whatever it already claimed and
//! retry the whole operation.
//!
//! The unit of mutual exclusion is one slot, not a node and not the list, so
//! operations on disjoint parts of a list proceed without interfering.

#[cfg(loom)]
use loom::sync::atomic::{AtomicPtr, Ordering};
#[cfg(not(loom))]
use core::sync::atomic::{AtomicPtr, Ordering};

use core::ptr::{self, NonNull};

use super::node::LinkNode;

/// Reserved marker stored in a claimed slot.
///
/// Address 1 is misaligned for `LinkNode`, so it can never compare equal to
/// a live node address. `lib.rs` carries a compile-time assertion pinning
/// the alignment down.
const CLAIMED: *mut LinkNode = ptr::without_provenance_mut(1);

/// Decoded result of an atomic exchange on a slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum SlotState {
    /// The slot held a real link pointer; the exchanging thread now owns the
    /// slot exclusively until it stores a real value back.
    Free(NonNull<LinkNode>),
    /// Another thread holds the slot.
    Claimed,
}

/// One link pointer of a [`LinkNode`].
#[repr(transparent)]
pub(crate) struct LinkSlot {
    inner: AtomicPtr<LinkNode>,
}

impl LinkSlot {
    /// Creates a slot holding no pointer yet. `LinkNode::init` must run
    /// before any list operation reads it.
    #[cfg(not(loom))]
    pub(crate) const fn null() -> Self {
        Self {
            inner: AtomicPtr::new(ptr::null_mut()),
        }
    }

    #[cfg(loom)]
    pub(crate) fn null() -> Self {
        Self {
            inner: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// Plain read for the serial family.
    ///
    /// Relaxed: the caller guarantees external serialization, so the
    /// uncontended path stays barrier-free.
    pub(crate) fn get(&self) -> NonNull<LinkNode> {
        let raw = self.inner.load(Ordering::Relaxed);
        debug_assert!(!raw.is_null(), "list operation on an uninitialized node");
        // SAFETY: slots hold real node addresses once `init` has run, which
        // every list operation requires of its operands.
        unsafe { NonNull::new_unchecked(raw) }
    }

    /// Plain write for the serial family.
    pub(crate) fn set(&self, to: NonNull<LinkNode>) {
        self.inner.store(to.as_ptr(), Ordering::Relaxed);
    }

    /// Atomically exchanges the slot for the claim marker.
    ///
    /// On `Free`, the previous pointer is returned and the calling thread
    /// owns the slot until it publishes a real value.
    pub(crate) fn claim(&self) -> SlotState {
        let prev = self.inner.swap(CLAIMED, Ordering::AcqRel);
        if ptr::eq(prev, CLAIMED) {
            SlotState::Claimed
        } else {
            debug_assert!(!prev.is_null(), "claimed a slot of an uninitialized node");
            // SAFETY: non-marker slot contents are real node addresses.
            SlotState::Free(unsafe { NonNull::new_unchecked(prev) })
        }
    }

    /// Stores a real pointer with release ordering.
    ///
    /// Used both to un-claim a slot and for the unguarded writes to a node
    /// that is still private to this thread: the release ordering makes
    /// every earlier write visible to any thread that observes `to` through
    /// an acquiring claim.
    pub(crate) fn publish(&self, to: NonNull<LinkNode>) {
        self.inner.store(to.as_ptr(), Ordering::Release);
    }
}

/// Upper bound on slots any one locked operation touches.
///
/// `locked_remove` and `locked_pop_front` claim up to four slots; the insert
/// operations claim two.
pub(crate) const MAX_CLAIMS: usize = 4;

/// The claim set of one attempt of a locked operation.
///
/// Slots are recorded in claim order together with the pointer each held, so
/// that a failed attempt can be rolled back in reverse claim order. Reverse
/// order matters: it re-exposes slots to concurrent claimants in the same
/// order a successful operation would have released them, so no claimant can
/// observe a restored suffix with a still-claimed prefix behind it.
pub(crate) struct Claims<'a> {
    held: [Option<(&'a LinkSlot, NonNull<LinkNode>)>; MAX_CLAIMS],
    len: usize,
}

impl<'a> Claims<'a> {
    pub(crate) fn new() -> Self {
        Self {
            held: [None; MAX_CLAIMS],
            len: 0,
        }
    }

    /// Attempts to claim `slot`.
    ///
    /// On success the prior pointer is recorded for rollback and returned.
    /// On conflict, returns `None`; the caller unwinds and retries.
    pub(crate) fn claim(&mut self, slot: &'a LinkSlot) -> Option<NonNull<LinkNode>> {
        match slot.claim() {
            SlotState::Free(prev) => {
                debug_assert!(self.len < MAX_CLAIMS);
                self.held[self.len] = Some((slot, prev));
                self.len += 1;
                Some(prev)
            }
            SlotState::Claimed => None,
        }
    }

    /// Restores every claimed slot to its prior pointer, newest first.
    pub(crate) fn unwind(mut self) {
        while self.len > 0 {
            self.len -= 1;
            if let Some((slot, prev)) = self.held[self.len].take() {
                slot.publish(prev);
            }
        }
    }

    /// Discards the claim set after the operation has published real values
    /// into every claimed slot.
    pub(crate) fn commit(self) {}
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn claim_returns_prior_pointer_and_blocks_reclaim() {
        let a = LinkNode::new();
        let b = LinkNode::new();
        a.init();
        b.init();
        a.next.set(NonNull::from(&b));

        let got = a.next.claim();
        assert_eq!(got, SlotState::Free(NonNull::from(&b)));
        // The slot is now held; a second claim must observe the marker.
        assert_eq!(a.next.claim(), SlotState::Claimed);

        a.next.publish(NonNull::from(&b));
        assert_eq!(a.next.get(), NonNull::from(&b));
    }

    #[test]
    fn unwind_restores_in_reverse_claim_order() {
        let a = LinkNode::new();
        let b = LinkNode::new();
        a.init();
        b.init();

        let mut claims = Claims::new();
        let pa = claims.claim(&a.next).unwrap();
        let pb = claims.claim(&b.prev).unwrap();
        assert_eq!(pa, NonNull::from(&a));
        assert_eq!(pb, NonNull::from(&b));

        // Both slots are held.
        assert_eq!(a.next.claim(), SlotState::Claimed);
        assert_eq!(b.prev.claim(), SlotState::Claimed);

        claims.unwind();
        assert_eq!(a.next.get(), NonNull::from(&a));
        assert_eq!(b.prev.get(), NonNull::from(&b));
    }

    #[test]
    fn failed_claim_leaves_set_unchanged() {
        let a = LinkNode::new();
        let b = LinkNode::new();
        a.init();
        b.init();

        // Hold b.prev from the outside.
        assert!(matches!(b.prev.claim(), SlotState::Free(_)));

        let mut claims = Claims::new();
        assert!(claims.claim(&a.next).is_some());
        assert!(claims.claim(&b.prev).is_none());

        claims.unwind();
        // a.next was restored; b.prev is still held by the outside claim.
        assert_eq!(a.next.get(), NonNull::from(&a));
        assert_eq!(b.prev.claim(), SlotState::Claimed);
        b.prev.publish(NonNull::from(&b));
    }
}
