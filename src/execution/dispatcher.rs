//! Fixed-size worker pool behind a bounded admission queue.
//!
//! `submit` never drops work and never buffers without bound: with `N` workers busy
//! and `queue_capacity` units already queued, the submitting thread blocks until a
//! worker takes the next queued unit. Queued work is served in admission order.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error};

use crate::error::Result;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Why waiting on a [`JobHandle`] produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The deadline elapsed before the unit of work finished
    TimedOut,
    /// The unit of work panicked, or the dispatcher shut down before running it
    Disconnected,
}

/// Receives the value of one submitted unit of work.
///
/// Dropping the handle abandons the work: it still runs, but its value is discarded.
pub struct JobHandle<T> {
    receiver: Receiver<T>,
}

impl<T> JobHandle<T> {
    /// Blocks until the unit of work finishes.
    pub fn wait(self) -> std::result::Result<T, WaitError> {
        self.receiver.recv().map_err(|_| WaitError::Disconnected)
    }

    /// Blocks until the unit of work finishes or `timeout` elapses.
    pub fn wait_timeout(self, timeout: Duration) -> std::result::Result<T, WaitError> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => WaitError::TimedOut,
            RecvTimeoutError::Disconnected => WaitError::Disconnected,
        })
    }
}

/// Bounded worker pool with blocking admission.
pub struct BoundedDispatcher {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl BoundedDispatcher {
    /// Spawns `workers` threads draining a queue of `queue_capacity` slots.
    ///
    /// # Arguments
    ///
    /// * `workers` - Number of worker threads, at least one is always started
    /// * `queue_capacity` - Units that may wait for a worker before `submit` blocks;
    ///   0 makes every `submit` a hand-off to an idle worker
    pub fn new(workers: usize, queue_capacity: usize) -> Result<Self> {
        let workers = workers.max(1);
        let (sender, receiver) = bounded::<Job>(queue_capacity);

        let handles = (0..workers)
            .map(|id| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("rdfgate-worker-{}", id))
                    .spawn(move || worker_loop(id, receiver))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        debug!(workers, queue_capacity, "Dispatcher started");
        Ok(Self { sender: Some(sender), workers: handles, queue_capacity })
    }

    /// Admits a unit of work, blocking while every worker is busy and the queue is full.
    pub fn submit<F, T>(&self, work: F) -> JobHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = bounded::<T>(1);
        let job: Job = Box::new(move || {
            // The waiter may have given up; its value is then discarded.
            let _ = result_tx.send(work());
        });

        if let Some(sender) = &self.sender {
            if sender.send(job).is_err() {
                error!("Dispatcher workers are gone, dropping submitted work");
            }
        }
        JobHandle { receiver: result_rx }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Units admitted but not yet picked up by a worker.
    pub fn pending(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    /// Closes admission, lets workers drain the queue, and joins them.
    pub fn shutdown(mut self) {
        self.sender.take();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("Dispatcher worker exited abnormally");
            }
        }
    }
}

impl Drop for BoundedDispatcher {
    fn drop(&mut self) {
        // Workers exit once the queue drains; abandoned work may still be running,
        // so they are detached rather than joined.
        self.sender.take();
    }
}

fn worker_loop(id: usize, receiver: Receiver<Job>) {
    for job in receiver.iter() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!(worker = id, "Unit of work panicked");
        }
    }
    debug!(worker = id, "Dispatcher worker stopped");
}
