//! Model-based property test: arbitrary serial operation sequences applied
//! both to a list and to a plain `Vec` model must agree on traversal order,
//! and the ring must stay doubly consistent after every step.

use core::ptr::NonNull;

use proptest::prelude::*;
use tether::{anchor, LinkNode};

const POOL: usize = 8;

struct Entry {
    link: LinkNode,
    id: usize,
}
anchor!(Entry { link });

#[derive(Debug, Clone, Copy)]
enum Op {
    InsertFront(usize),
    InsertBack(usize),
    Remove(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POOL).prop_map(Op::InsertFront),
        (0..POOL).prop_map(Op::InsertBack),
        (0..POOL).prop_map(Op::Remove),
    ]
}

fn ids(head: &LinkNode) -> Vec<usize> {
    // SAFETY: single-threaded; only Entry nodes are linked.
    unsafe { head.iter::<Entry>() }.map(|e| e.id).collect()
}

fn assert_ring(head: &LinkNode) {
    let head_ptr = NonNull::from(head);
    let mut cur = head_ptr;
    loop {
        // SAFETY: the ring only holds live nodes from the fixed pool.
        let node = unsafe { cur.as_ref() };
        let next = node.successor();
        assert_eq!(unsafe { next.as_ref() }.predecessor(), cur);
        cur = next;
        if cur == head_ptr {
            break;
        }
    }
}

proptest! {
    #[test]
    fn list_matches_vec_model(ops in proptest::collection::vec(op_strategy(), 0..96)) {
        let head = LinkNode::new();
        head.init();
        let pool: Vec<Entry> = (0..POOL)
            .map(|id| Entry { link: LinkNode::new(), id })
            .collect();
        for e in &pool {
            e.link.init();
        }

        let mut model: Vec<usize> = Vec::new();

        for op in ops {
            match op {
                Op::InsertFront(i) => {
                    if !pool[i].link.is_linked() {
                        // SAFETY: single-threaded; node is detached.
                        unsafe { head.insert_front(&pool[i].link) };
                        model.insert(0, i);
                    }
                }
                Op::InsertBack(i) => {
                    if !pool[i].link.is_linked() {
                        // SAFETY: as above.
                        unsafe { head.insert_back(&pool[i].link) };
                        model.push(i);
                    }
                }
                Op::Remove(i) => {
                    if pool[i].link.is_linked() {
                        // SAFETY: single-threaded; node is linked. Reinit
                        // keeps `is_linked` truthful for the next ops.
                        unsafe { pool[i].link.remove_reinit() };
                        model.retain(|&x| x != i);
                    }
                }
            }
            prop_assert_eq!(ids(&head), model.clone());
            assert_ring(&head);
            prop_assert_eq!(head.is_empty(), model.is_empty());
        }

        // Drain and confirm every node ends detached.
        for e in unsafe { head.iter_safe::<Entry>() } {
            // SAFETY: delete-safe traversal permits removing the current
            // element.
            unsafe { e.link.remove_reinit() };
        }
        prop_assert!(head.is_empty());
        for e in &pool {
            prop_assert!(!e.link.is_linked());
        }
    }
}
