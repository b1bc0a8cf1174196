use criterion::{Criterion, black_box, criterion_group, criterion_main};
use scratch_collections::GrowableBuffer;

fn bench_buffer(c: &mut Criterion) {
    let n = 1024;
    {
        let mut group = c.benchmark_group("Vec vs GrowableBuffer (Push 1024)");
        group.bench_function("std::vec::Vec", |b| {
            b.iter(|| {
                let mut v = Vec::new();
                for i in 0..n {
                    v.push(black_box(i as i32));
                }
                v
            })
        });

        group.bench_function("GrowableBuffer<i32>", |b| {
            b.iter(|| {
                let mut v = GrowableBuffer::empty();
                for i in 0..n {
                    v.push_back(black_box(i as i32)).unwrap();
                }
                v
            })
        });
        group.finish();
    }

    {
        let mut group = c.benchmark_group("Vec vs GrowableBuffer (Checked Access 1024)");
        let v_std = vec![123i32; n];
        let v_buf = GrowableBuffer::with_fill(123i32, n).unwrap();

        group.bench_function("std::vec::Vec", |b| {
            b.iter(|| {
                for i in 0..n {
                    black_box(v_std.get(black_box(i)));
                }
            })
        });

        group.bench_function("GrowableBuffer<i32>", |b| {
            b.iter(|| {
                for i in 0..n {
                    let _ = black_box(v_buf.at(black_box(i)));
                }
            })
        });
        group.finish();
    }
}

fn bench_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("Deep Copy (String x 256)");
    let items: Vec<String> = (0..256).map(|i| format!("item-{i}")).collect();
    let buf = GrowableBuffer::from_slice(&items).unwrap();

    group.bench_function("std::vec::Vec clone", |b| b.iter(|| black_box(&items).clone()));
    group.bench_function("GrowableBuffer try_clone", |b| {
        b.iter(|| black_box(&buf).try_clone().unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_buffer, bench_copy);
criterion_main!(benches);
