use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::collections::LinkedList;
use tether::{anchor, LinkNode};

struct Entry {
    link: LinkNode,
    value: u64,
}
anchor!(Entry { link });

fn pool(n: usize) -> Vec<Entry> {
    let v: Vec<Entry> = (0..n as u64)
        .map(|value| Entry {
            link: LinkNode::new(),
            value,
        })
        .collect();
    for e in &v {
        e.link.init();
    }
    v
}

fn bench_serial_fill_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("serial_fill_drain");

    group.bench_function("std_linked_list", |b| {
        b.iter(|| {
            let mut list = LinkedList::new();
            for i in 0..1000u64 {
                list.push_back(i);
            }
            while let Some(v) = list.pop_front() {
                black_box(v);
            }
        });
    });

    group.bench_function("tether_serial", |b| {
        let head = LinkNode::new();
        head.init();
        let nodes = pool(1000);
        b.iter(|| {
            for e in &nodes {
                // SAFETY: single-threaded bench loop.
                unsafe { head.insert_back(&e.link) };
            }
            while let Some(e) = unsafe { head.first::<Entry>() } {
                // SAFETY: `e` is the live first element.
                black_box(unsafe { e.as_ref() }.value);
                unsafe { e.as_ref().link.remove_reinit() };
            }
        });
    });

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iteration");

    group.bench_function("std_linked_list_iter", |b| {
        let mut list = LinkedList::new();
        for i in 0..1000u64 {
            list.push_back(i);
        }
        b.iter(|| {
            let sum: u64 = list.iter().sum();
            black_box(sum);
        });
    });

    group.bench_function("tether_iter", |b| {
        let head = LinkNode::new();
        head.init();
        let nodes = pool(1000);
        for e in &nodes {
            // SAFETY: single-threaded bench setup.
            unsafe { head.insert_back(&e.link) };
        }
        b.iter(|| {
            // SAFETY: list is quiescent during the measured iteration.
            let sum: u64 = unsafe { head.iter::<Entry>() }.map(|e| e.value).sum();
            black_box(sum);
        });
    });

    group.finish();
}

fn bench_locked_uncontended(c: &mut Criterion) {
    let mut group = c.benchmark_group("locked_uncontended");

    group.bench_function("locked_insert_pop_cycle", |b| {
        let head = LinkNode::new();
        head.init();
        let nodes = pool(64);
        b.iter(|| {
            for e in &nodes {
                // SAFETY: single thread, locked family only on this list.
                unsafe { head.locked_insert_back(&e.link) };
            }
            while let Some(e) = unsafe { head.locked_pop_front::<Entry>() } {
                black_box(unsafe { e.as_ref() }.value);
            }
        });
    });

    group.bench_function("serial_insert_remove_cycle", |b| {
        let head = LinkNode::new();
        head.init();
        let nodes = pool(64);
        b.iter(|| {
            for e in &nodes {
                // SAFETY: single-threaded bench loop.
                unsafe { head.insert_back(&e.link) };
            }
            for e in &nodes {
                unsafe { e.link.remove_reinit() };
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_serial_fill_drain,
    bench_iteration,
    bench_locked_uncontended
);
criterion_main!(benches);
