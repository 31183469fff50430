// ==============================================
// HITCACHE CONCURRENCY TESTS (integration)
// ==============================================
//
// Several threads hammer one cache through every mutating operation. The
// index and recency list must never be observed out of step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use hitlru::HitCache;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 2_000;

#[test]
fn mixed_operations_preserve_invariants() {
    let cache: Arc<HitCache<u32, u32>> = Arc::new(HitCache::new(16).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..OPS_PER_THREAD {
                    let key = ((t * 7 + i * 13) % 40) as u32;
                    match i % 5 {
                        0 | 1 => {
                            cache.insert(key, key);
                        }
                        2 => {
                            cache.promote(&key);
                        }
                        3 => {
                            cache.remove(&key);
                        }
                        _ => {
                            if let Some(value) = cache.get(&key) {
                                assert_eq!(value, key, "value stored under the wrong key");
                            }
                        }
                    }
                    assert!(cache.len() <= cache.capacity());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    cache.debug_validate_invariants();
    assert_eq!(cache.keys().len(), cache.len() as usize);
}

#[test]
fn readers_see_consistent_state_during_resets() {
    let cache: Arc<HitCache<String, usize>> = Arc::new(HitCache::new(8).unwrap());
    let stop = Arc::new(AtomicBool::new(false));

    let writer = {
        let cache = cache.clone();
        let stop = stop.clone();
        thread::spawn(move || {
            let mut i = 0usize;
            while !stop.load(Ordering::Relaxed) {
                cache.insert(format!("k{}", i % 20), i);
                if i % 50 == 0 {
                    cache.reset();
                }
                i += 1;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let keys = cache.keys();
                    assert!(keys.len() <= 8);
                    cache.debug_validate_invariants();
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    writer.join().unwrap();

    assert_eq!(cache.capacity(), 8);
    cache.debug_validate_invariants();
}

#[test]
fn concurrent_promotions_are_all_counted() {
    let cache: Arc<HitCache<&'static str, ()>> = Arc::new(HitCache::new(4).unwrap());
    cache.insert("hot", ());
    cache.insert("cold", ());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..50 {
                    assert!(cache.promote("hot"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Starts at 1 on insert
    assert_eq!(cache.hit_count("hot"), Some(201));
    assert_eq!(cache.stats().hits, 200);
    assert_eq!(cache.head_key(), Some("hot"));
    assert_eq!(cache.tail_key(), Some("cold"));
}

#[test]
fn reset_and_stats_stay_in_step_under_contention() {
    let cache: Arc<HitCache<u32, u32>> = Arc::new(HitCache::new(8).unwrap());
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..1_000u32 {
                    if t == 0 && i % 10 == 0 {
                        cache.reset();
                    } else {
                        cache.insert((t * 1_000 + i) % 24, i);
                    }
                    if i % 7 == 0 {
                        cache.remove(&(i % 24));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Counters are reset under the same lock as the entries, so every
    // surviving entry is still accounted for
    let stats = cache.stats();
    assert_eq!(stats.resident(), cache.len() as u64);
    cache.debug_validate_invariants();
}
