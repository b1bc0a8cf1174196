use criterion::{Criterion, black_box, criterion_group, criterion_main};
use scratch_collections::{DoublyLinkedList, SinglyLinkedList};
use std::collections::LinkedList;

fn bench_lists(c: &mut Criterion) {
    let n = 256;
    {
        let mut group = c.benchmark_group("LinkedList vs scratch lists (PushBack 256)");
        group.bench_function("std::collections::LinkedList", |b| {
            b.iter(|| {
                let mut l = LinkedList::new();
                for i in 0..n {
                    l.push_back(black_box(i as i32));
                }
                l
            })
        });

        group.bench_function("SinglyLinkedList<i32>", |b| {
            b.iter(|| {
                let mut l = SinglyLinkedList::new();
                for i in 0..n {
                    l.push_back(black_box(i as i32));
                }
                l
            })
        });

        group.bench_function("DoublyLinkedList<i32>", |b| {
            b.iter(|| {
                let mut l = DoublyLinkedList::new();
                for i in 0..n {
                    l.push_back(black_box(i as i32)).unwrap();
                }
                l
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("LinkedList vs DoublyLinkedList (Reverse Sum 256)");
        let l_std: LinkedList<i64> = (0..n as i64).collect();
        let mut l_arena = DoublyLinkedList::new();
        l_arena.try_extend(0..n as i64).unwrap();

        group.bench_function("std::collections::LinkedList", |b| {
            b.iter(|| black_box(&l_std).iter().rev().sum::<i64>())
        });

        group.bench_function("DoublyLinkedList<i64>", |b| {
            b.iter(|| black_box(&l_arena).iter().rev().sum::<i64>())
        });
        group.finish();
    }
}

criterion_group!(benches, bench_lists);
criterion_main!(benches);
