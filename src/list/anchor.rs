//! Projection between host structures and their embedded links.
//!
//! The list stores no payload: it recovers the host structure from a link by
//! reverse-offsetting over the embedded field. [`Anchor`] captures that
//! projection as a trait so the offset arithmetic lives in exactly one
//! place, generated by [`anchor!`] from the field name.

use core::ptr::NonNull;

use super::node::LinkNode;

/// Types that embed a [`LinkNode`] and can be recovered from it.
///
/// # Safety
///
/// `node_of` must project to a `LinkNode` embedded *by value* in `Self`, and
/// `container_of` must invert it exactly, for every live `Self`. Implement
/// through [`anchor!`] rather than by hand; the macro derives both sides
/// from one field name so they cannot drift apart.
///
/// [`anchor!`]: crate::anchor
pub unsafe trait Anchor: Sized {
    /// Projects an element to its embedded link.
    fn node_of(ptr: NonNull<Self>) -> NonNull<LinkNode>;

    /// Recovers the element owning `node`.
    ///
    /// # Safety
    ///
    /// `node` must be the link that [`node_of`](Anchor::node_of) projects
    /// out of a live `Self`.
    unsafe fn container_of(node: NonNull<LinkNode>) -> NonNull<Self>;

    /// Borrows the embedded link of this element.
    fn node(&self) -> &LinkNode {
        // SAFETY: `node_of` projects to a field of `self`, so the pointer is
        // valid for the lifetime of `&self`.
        unsafe { Self::node_of(NonNull::from(self)).as_ref() }
    }
}

/// Implements [`Anchor`] for a type from the name of its `LinkNode` field.
///
/// ```
/// use tether::{anchor, LinkNode};
///
/// struct Waiter {
///     link: LinkNode,
///     id: u32,
/// }
/// anchor!(Waiter { link });
/// ```
#[macro_export]
macro_rules! anchor {
    ($ty:ty { $field:ident }) => {
        unsafe impl $crate::Anchor for $ty {
            fn node_of(
                ptr: ::core::ptr::NonNull<Self>,
            ) -> ::core::ptr::NonNull<$crate::LinkNode> {
                // SAFETY: projecting to a field of a valid pointer; a field
                // address is never null.
                unsafe {
                    ::core::ptr::NonNull::new_unchecked(::core::ptr::addr_of_mut!(
                        (*ptr.as_ptr()).$field
                    ))
                }
            }

            unsafe fn container_of(
                node: ::core::ptr::NonNull<$crate::LinkNode>,
            ) -> ::core::ptr::NonNull<Self> {
                let offset = ::core::mem::offset_of!($ty, $field);
                // SAFETY: the caller passes a link embedded in a live `Self`,
                // so stepping back over the field offset lands on it.
                unsafe {
                    ::core::ptr::NonNull::new_unchecked(
                        node.as_ptr().byte_sub(offset).cast::<$ty>(),
                    )
                }
            }
        }
    };
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    struct Host {
        _before: u64,
        link: LinkNode,
        tag: u32,
    }
    anchor!(Host { link });

    #[test]
    fn container_of_inverts_node_of() {
        let host = Host {
            _before: 0xdead_beef,
            link: LinkNode::new(),
            tag: 7,
        };
        host.link.init();

        let ptr = NonNull::from(&host);
        let node = Host::node_of(ptr);
        assert_eq!(node, NonNull::from(&host.link));

        // SAFETY: `node` was just projected out of `host`.
        let back = unsafe { Host::container_of(node) };
        assert_eq!(back, ptr);
        // SAFETY: `back` points at `host`, still borrowed immutably.
        assert_eq!(unsafe { back.as_ref() }.tag, 7);
    }

    #[test]
    fn node_helper_borrows_the_field() {
        let host = Host {
            _before: 0,
            link: LinkNode::new(),
            tag: 0,
        };
        assert!(core::ptr::eq(host.node(), &host.link));
    }
}
