//! Tests for the lock registry
//!
//! These tests verify:
//! - At most one holder per name, with a single entry under contention
//! - Different names never block each other
//! - Forgetting an entry releases its waiters onto a fresh entry

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier};
use std::thread;
use std::time::Duration;

use fsstore::lock::LockRegistry;
use fsstore::naming::physical_name;

#[test]
fn test_first_acquire_creates_entry() {
    let registry = LockRegistry::new();
    let key = physical_name("a.txt");
    assert!(registry.is_empty());

    let guard = registry.acquire(&key);

    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&key));
    assert_eq!(guard.name(), &key);
}

#[test]
fn test_entry_survives_plain_release() {
    let registry = LockRegistry::new();
    let key = physical_name("a.txt");

    drop(registry.acquire(&key));
    assert!(registry.contains(&key));

    // Reacquiring after release must not block
    let _guard = registry.acquire(&key);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_release_and_forget_removes_entry() {
    let registry = LockRegistry::new();
    let key = physical_name("a.txt");

    let guard = registry.acquire(&key);
    registry.release_and_forget(guard);

    assert!(registry.is_empty());
    assert!(!registry.contains(&key));

    // A later acquire starts a fresh entry
    let _guard = registry.acquire(&key);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_mutual_exclusion_under_contention() {
    const THREADS: usize = 16;
    const ROUNDS: usize = 50;

    let registry = Arc::new(LockRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);

            thread::spawn(move || {
                let key = physical_name("shared");
                barrier.wait();

                for _ in 0..ROUNDS {
                    let _guard = registry.acquire(&key);
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    thread::yield_now();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_concurrent_first_acquire_single_entry() {
    const THREADS: usize = 16;

    let registry = Arc::new(LockRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = physical_name("fresh");
                barrier.wait();
                let _guard = registry.acquire(&key);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), 1);
}

#[test]
fn test_different_names_do_not_block() {
    let registry = Arc::new(LockRegistry::new());
    let _held = registry.acquire(&physical_name("a.txt"));

    let (tx, rx) = mpsc::channel();
    let worker = {
        let registry = Arc::clone(&registry);
        thread::spawn(move || {
            let _guard = registry.acquire(&physical_name("b.txt"));
            tx.send(()).unwrap();
        })
    };

    rx.recv_timeout(Duration::from_secs(5))
        .expect("acquiring an unrelated name should not block");
    worker.join().unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_waiter_blocks_until_release() {
    let registry = Arc::new(LockRegistry::new());
    let key = physical_name("a.txt");
    let acquired = Arc::new(AtomicBool::new(false));

    let guard = registry.acquire(&key);

    let worker = {
        let registry = Arc::clone(&registry);
        let acquired = Arc::clone(&acquired);
        let key = key.clone();
        thread::spawn(move || {
            let _guard = registry.acquire(&key);
            acquired.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!acquired.load(Ordering::SeqCst));

    drop(guard);
    worker.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
}

#[test]
fn test_waiter_moves_to_fresh_entry_after_forget() {
    let registry = Arc::new(LockRegistry::new());
    let key = physical_name("a.txt");

    let guard = registry.acquire(&key);

    let (tx, rx) = mpsc::channel();
    let worker = {
        let registry = Arc::clone(&registry);
        let key = key.clone();
        thread::spawn(move || {
            let guard = registry.acquire(&key);
            tx.send(()).unwrap();
            // Hold until the main thread has inspected the registry
            thread::sleep(Duration::from_millis(50));
            drop(guard);
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(rx.try_recv().is_err());

    registry.release_and_forget(guard);

    rx.recv_timeout(Duration::from_secs(5))
        .expect("waiter should proceed after forget");
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&key));

    worker.join().unwrap();
}

#[test]
fn test_forget_with_many_waiters() {
    const WAITERS: usize = 8;

    let registry = Arc::new(LockRegistry::new());
    let key = physical_name("a.txt");
    let done = Arc::new(AtomicUsize::new(0));

    let guard = registry.acquire(&key);

    let handles: Vec<_> = (0..WAITERS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            let key = key.clone();
            thread::spawn(move || {
                let _guard = registry.acquire(&key);
                done.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    registry.release_and_forget(guard);

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(done.load(Ordering::SeqCst), WAITERS);
    assert_eq!(registry.len(), 1);
}
