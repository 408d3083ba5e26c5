use criterion::{criterion_group, criterion_main, Criterion};
use lifo_channel::channel;
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn benchmark_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc_lifo");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("lifo_channel", |b| {
        b.iter_custom(|iters| {
            let (tx, rx) = channel();

            // Workload: 2 producers sending iters/2 messages. 1 consumer.
            let producer_count = 2;
            let msgs_per_producer = iters / producer_count;
            let barrier = Arc::new(Barrier::new(producer_count as usize + 1));

            let start = std::time::Instant::now();

            thread::scope(|s| {
                for _ in 0..producer_count {
                    let tx = tx.clone();
                    let b = barrier.clone();
                    s.spawn(move || {
                        b.wait();
                        for i in 0..msgs_per_producer {
                            tx.push(i as usize);
                        }
                    });
                }

                let b = barrier.clone();
                s.spawn(move || {
                    b.wait();
                    let mut count = 0;
                    let target = msgs_per_producer * producer_count;
                    while count < target {
                        if rx.pop().is_some() {
                            count += 1;
                        } else {
                            std::thread::yield_now();
                        }
                    }
                });
            });

            start.elapsed()
        })
    });

    group.bench_function("std_mpsc", |b| {
        b.iter_custom(|iters| {
            let (tx, rx) = std_mpsc::channel();

            let producer_count = 2;
            let msgs_per_producer = iters / producer_count;
            let barrier = Arc::new(Barrier::new(producer_count as usize + 1));

            let start = std::time::Instant::now();

            thread::scope(|s| {
                for _ in 0..producer_count {
                    let tx = tx.clone();
                    let b = barrier.clone();
                    s.spawn(move || {
                        b.wait();
                        for i in 0..msgs_per_producer {
                            tx.send(i as usize).unwrap();
                        }
                    });
                }

                let b = barrier.clone();
                s.spawn(move || {
                    b.wait();
                    let mut count = 0;
                    let target = msgs_per_producer * producer_count;
                    while count < target {
                        if rx.try_recv().is_ok() {
                            count += 1;
                        } else {
                            std::thread::yield_now();
                        }
                    }
                });
            });

            start.elapsed()
        })
    });

    group.finish();
}

fn benchmark_dequeue_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("mpsc_lifo_batch");
    group.measurement_time(Duration::from_secs(10));

    // Same workload, but the consumer drains in whole-chain batches
    // instead of paying one atomic operation per node.
    group.bench_function("dequeue_all", |b| {
        b.iter_custom(|iters| {
            let (tx, rx) = channel();

            let producer_count = 2;
            let msgs_per_producer = iters / producer_count;
            let barrier = Arc::new(Barrier::new(producer_count as usize + 1));

            let start = std::time::Instant::now();

            thread::scope(|s| {
                for _ in 0..producer_count {
                    let tx = tx.clone();
                    let b = barrier.clone();
                    s.spawn(move || {
                        b.wait();
                        for i in 0..msgs_per_producer {
                            tx.push(i as usize);
                        }
                    });
                }

                let b = barrier.clone();
                s.spawn(move || {
                    b.wait();
                    let mut count = 0;
                    let target = msgs_per_producer * producer_count;
                    while count < target {
                        let mut batch = 0u64;
                        rx.dequeue_all(|_| batch += 1);
                        count += batch;
                        if batch == 0 {
                            std::thread::yield_now();
                        }
                    }
                });
            });

            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_push_pop, benchmark_dequeue_all);
criterion_main!(benches);
