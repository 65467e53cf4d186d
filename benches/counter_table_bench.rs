use counter_table::CounterTable;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Word stream with repeats: 100k draws over 5k distinct keys.
fn words() -> Vec<String> {
    lcg(17).take(100_000).map(|x| key(x % 5_000)).collect()
}

fn bench_insert_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::insert_fresh_100k", |b| {
        let keys: Vec<String> = lcg(1).take(100_000).map(key).collect();
        b.iter_batched(
            CounterTable::new,
            |mut t| {
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k, i as i64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_count_words(c: &mut Criterion) {
    let words = words();
    c.bench_function("table::inc_100k_words", |b| {
        b.iter_batched(
            CounterTable::new,
            |mut t| {
                for w in &words {
                    t.inc(w);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("hashbrown::inc_100k_words", |b| {
        b.iter_batched(
            hashbrown::HashMap::<String, i64>::new,
            |mut m| {
                for w in &words {
                    *m.entry_ref(w.as_str()).or_insert(0) += 1;
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_delete_random_10k(c: &mut Criterion) {
    c.bench_function("table::delete_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let mut t = CounterTable::new();
                let keys: Vec<String> = lcg(5).take(110_000).map(key).collect();
                for (i, k) in keys.iter().enumerate() {
                    t.insert(k, i as i64);
                }
                // Precompute 10k unique indices via LCG
                let n = keys.len();
                let mut sel = std::collections::HashSet::with_capacity(10_000);
                let mut s = 0x9e3779b97f4a7c15u64;
                while sel.len() < 10_000 {
                    s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
                    sel.insert((s as usize) % n);
                }
                let to_delete: Vec<String> = sel.into_iter().map(|i| keys[i].clone()).collect();
                (t, to_delete)
            },
            |(mut t, to_delete)| {
                for k in &to_delete {
                    black_box(t.delete(k));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_miss_10k(c: &mut Criterion) {
    let mut t = CounterTable::new();
    let keys: Vec<_> = lcg(7).take(100_000).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.insert(k, i as i64);
    }
    let n = keys.len();
    let mut s = 0x9e3779b97f4a7c15u64;
    let hits: Vec<String> = (0..10_000)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            keys[(s as usize) % n].clone()
        })
        .collect();
    let misses: Vec<String> = lcg(0xdead_beef).take(10_000).map(key).collect();

    c.bench_function("table::get_hit_10k_on_100k", |b| {
        b.iter(|| {
            for k in &hits {
                black_box(t.get(k));
            }
        })
    });
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        b.iter(|| {
            for k in &misses {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_views(c: &mut Criterion) {
    let mut t = CounterTable::new();
    for (i, x) in lcg(999).take(100_000).enumerate() {
        t.insert(&key(x), i as i64);
    }

    c.bench_function("table::flat_view_100k", |b| {
        b.iter(|| black_box(t.flat_view().len()))
    });

    c.bench_function("table::cursor_sum_100k", |b| {
        b.iter(|| {
            let mut cur = t.cursor();
            let mut sum = 0i64;
            while let Some(it) = cur.current() {
                sum = sum.wrapping_add(it.value());
                cur.advance();
            }
            black_box(sum)
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_insert;
    config = bench_config();
    targets = bench_insert_fresh_100k, bench_count_words
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_delete_random_10k,
              bench_get_hit_miss_10k,
              bench_views
}
criterion_main!(benches_insert, benches_ops);
