use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use rdfgate::execution::{BoundedDispatcher, WaitError};

/// Polls `condition` until it holds or `limit` elapses.
fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

fn gated_unit(gate: &Receiver<()>, done: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let gate = gate.clone();
    let done = Arc::clone(done);
    move || {
        let _ = gate.recv();
        done.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_submit_blocks_when_workers_and_queue_are_saturated() {
    const WORKERS: usize = 2;

    let dispatcher = Arc::new(BoundedDispatcher::new(WORKERS, WORKERS).unwrap());
    let (release, gate) = unbounded::<()>();
    let done = Arc::new(AtomicUsize::new(0));

    // N running plus N queued
    for _ in 0..2 * WORKERS {
        dispatcher.submit(gated_unit(&gate, &done));
    }
    assert_eq!(dispatcher.pending(), WORKERS);

    let admitted = Arc::new(AtomicBool::new(false));
    let submitter = {
        let dispatcher = Arc::clone(&dispatcher);
        let admitted = Arc::clone(&admitted);
        let unit = gated_unit(&gate, &done);
        thread::spawn(move || {
            dispatcher.submit(unit);
            admitted.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!admitted.load(Ordering::SeqCst), "the extra unit must wait for a free slot");

    release.send(()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || admitted.load(Ordering::SeqCst)));
    submitter.join().unwrap();

    for _ in 0..2 * WORKERS {
        release.send(()).unwrap();
    }
    assert!(wait_until(Duration::from_secs(5), || done.load(Ordering::SeqCst) == 2 * WORKERS + 1));
}

#[test]
fn test_nothing_is_dropped_under_load() {
    let dispatcher = Arc::new(BoundedDispatcher::new(4, 4).unwrap());

    let producers: Vec<_> = (0..8)
        .map(|producer| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let handles: Vec<_> = (0..25)
                    .map(|i| {
                        dispatcher.submit(move || {
                            thread::sleep(Duration::from_millis(1));
                            producer * 100 + i
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.wait().unwrap()).sum::<usize>()
            })
        })
        .collect();

    let total: usize = producers.into_iter().map(|p| p.join().unwrap()).sum();
    let expected: usize = (0..8).map(|p| (0..25).map(|i| p * 100 + i).sum::<usize>()).sum();
    assert_eq!(total, expected);
}

#[test]
fn test_abandoned_work_still_runs() {
    let dispatcher = BoundedDispatcher::new(1, 1).unwrap();
    let (release, gate) = unbounded::<()>();
    let finished = Arc::new(AtomicBool::new(false));

    let handle = {
        let finished = Arc::clone(&finished);
        dispatcher.submit(move || {
            let _ = gate.recv();
            finished.store(true, Ordering::SeqCst);
            7
        })
    };
    assert_eq!(handle.wait_timeout(Duration::from_millis(50)), Err(WaitError::TimedOut));

    release.send(()).unwrap();
    assert!(wait_until(Duration::from_secs(5), || finished.load(Ordering::SeqCst)));

    // the worker is free again
    assert_eq!(dispatcher.submit(|| 8).wait(), Ok(8));
    dispatcher.shutdown();
}

#[test]
fn test_panicking_unit_does_not_kill_worker() {
    let dispatcher = BoundedDispatcher::new(1, 1).unwrap();

    let failed = dispatcher.submit(|| -> usize { panic!("unit failure") });
    assert_eq!(failed.wait(), Err(WaitError::Disconnected));

    assert_eq!(dispatcher.submit(|| 3).wait(), Ok(3));
    assert_eq!(dispatcher.worker_count(), 1);
}
