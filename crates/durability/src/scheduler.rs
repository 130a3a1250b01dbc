//! Counter-driven background persistence
//!
//! Every committed mutation is reported through
//! [`FlushScheduler::record_mutation`]. Each Nth report captures a snapshot
//! of the document into a single pending slot and wakes the writer thread;
//! the request path never waits for disk.
//!
//! # Ordering
//!
//! Snapshots carry a sequence number and the file only ever moves forward:
//! a snapshot older than the last one written is dropped. Only the latest
//! pending snapshot is kept, so a burst of mutations collapses into one write.
//!
//! # Thread Lifecycle
//!
//! - `shutdown` flag in the shared state signals the thread to stop
//! - the pending snapshot, if any, is written before the thread exits
//! - `Drop` performs the same shutdown

use cantrip_core::{Result, Value};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

use crate::file::DocumentFile;

/// Flush counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Mutations reported since creation
    pub mutations: u64,
    /// Snapshots handed to the writer
    pub flushes_scheduled: u64,
    /// Successful file writes (background and explicit)
    pub flushes_completed: u64,
    /// Failed file writes
    pub flush_failures: u64,
}

struct FlushState {
    since_last_flush: u64,
    next_sequence: u64,
    pending: Option<(u64, Value)>,
    in_flight: bool,
    shutdown: bool,
}

struct FlushShared {
    file: DocumentFile,
    save_every: u64,
    state: Mutex<FlushState>,
    work_ready: Condvar,
    idle: Condvar,
    /// Serializes file writes; holds the sequence of the last snapshot written
    written: Mutex<u64>,
    mutations: AtomicU64,
    flushes_scheduled: AtomicU64,
    flushes_completed: AtomicU64,
    flush_failures: AtomicU64,
}

impl FlushShared {
    /// Write a snapshot unless a newer one already reached the file
    fn write_snapshot(&self, sequence: u64, snapshot: &Value) -> Result<bool> {
        let mut written = self.written.lock();
        if sequence <= *written {
            debug!(sequence, last_written = *written, "Skipping superseded snapshot");
            return Ok(false);
        }
        match self.file.write(snapshot) {
            Ok(()) => {
                *written = sequence;
                self.flushes_completed.fetch_add(1, Ordering::Relaxed);
                Ok(true)
            }
            Err(e) => {
                self.flush_failures.fetch_add(1, Ordering::Relaxed);
                Err(e)
            }
        }
    }
}

/// Background writer that persists the document every Nth mutation
///
/// `save_every == 0` disables background writes entirely: no thread is
/// spawned and [`record_mutation`](Self::record_mutation) only counts.
///
/// # Example
///
/// ```ignore
/// use cantrip_durability::{DocumentFile, FlushScheduler};
///
/// let scheduler = FlushScheduler::start(DocumentFile::new("data.json"), 10)?;
/// for _ in 0..10 {
///     scheduler.record_mutation(&document);
/// }
/// // the tenth mutation handed a snapshot to the writer thread
/// ```
pub struct FlushScheduler {
    shared: Arc<FlushShared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FlushScheduler {
    /// Create the scheduler and start its writer thread
    ///
    /// # Errors
    ///
    /// Returns [`cantrip_core::Error::Io`] if the thread cannot be spawned.
    pub fn start(file: DocumentFile, save_every: u64) -> Result<Self> {
        let shared = Arc::new(FlushShared {
            file,
            save_every,
            state: Mutex::new(FlushState {
                since_last_flush: 0,
                next_sequence: 1,
                pending: None,
                in_flight: false,
                shutdown: false,
            }),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            written: Mutex::new(0),
            mutations: AtomicU64::new(0),
            flushes_scheduled: AtomicU64::new(0),
            flushes_completed: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
        });

        let worker = if save_every > 0 {
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name("cantrip-flush".to_string())
                .spawn(move || flush_loop(&worker_shared))?;
            Some(handle)
        } else {
            None
        };

        Ok(Self {
            shared,
            worker: Mutex::new(worker),
        })
    }

    /// The backing file
    pub fn file(&self) -> &DocumentFile {
        &self.shared.file
    }

    /// Flush cadence (0 = never)
    pub fn save_every(&self) -> u64 {
        self.shared.save_every
    }

    /// Report a committed mutation
    ///
    /// Returns `true` when this mutation handed a snapshot to the writer.
    /// Never blocks on I/O.
    pub fn record_mutation(&self, document: &Value) -> bool {
        self.shared.mutations.fetch_add(1, Ordering::Relaxed);
        if self.shared.save_every == 0 {
            return false;
        }

        let mut state = self.shared.state.lock();
        if state.shutdown {
            return false;
        }
        state.since_last_flush += 1;
        if state.since_last_flush < self.shared.save_every {
            return false;
        }

        state.since_last_flush = 0;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.pending = Some((sequence, document.clone()));
        drop(state);

        self.shared.flushes_scheduled.fetch_add(1, Ordering::Relaxed);
        self.shared.work_ready.notify_one();
        debug!(sequence, "Flush scheduled");
        true
    }

    /// Write the document now, on the caller's thread
    ///
    /// Any older pending snapshot is discarded and the mutation counter
    /// restarts.
    pub fn flush_now(&self, document: &Value) -> Result<()> {
        let sequence = {
            let mut state = self.shared.state.lock();
            let sequence = state.next_sequence;
            state.next_sequence += 1;
            state.since_last_flush = 0;
            state.pending = None;
            sequence
        };
        self.shared.idle.notify_all();
        self.shared.write_snapshot(sequence, document).map(|_| ())
    }

    /// Block until no snapshot is pending or being written
    ///
    /// Returns `false` if `timeout` elapsed first.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while state.pending.is_some() || state.in_flight {
            if self
                .shared
                .idle
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.pending.is_none() && !state.in_flight;
            }
        }
        true
    }

    /// Counter snapshot
    pub fn stats(&self) -> FlushStats {
        FlushStats {
            mutations: self.shared.mutations.load(Ordering::Relaxed),
            flushes_scheduled: self.shared.flushes_scheduled.load(Ordering::Relaxed),
            flushes_completed: self.shared.flushes_completed.load(Ordering::Relaxed),
            flush_failures: self.shared.flush_failures.load(Ordering::Relaxed),
        }
    }

    /// Stop the writer thread after it writes any pending snapshot
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.work_ready.notify_all();

        if let Some(handle) = self.worker.lock().take() {
            if handle.join().is_err() {
                error!("Flush thread panicked");
            }
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn flush_loop(shared: &FlushShared) {
    loop {
        let (sequence, snapshot) = {
            let mut state = shared.state.lock();
            while state.pending.is_none() && !state.shutdown {
                shared.work_ready.wait(&mut state);
            }
            match state.pending.take() {
                Some(job) => {
                    state.in_flight = true;
                    job
                }
                None => break,
            }
        };

        match shared.write_snapshot(sequence, &snapshot) {
            Ok(true) => debug!(sequence, path = %shared.file.path().display(), "Flush completed"),
            Ok(false) => {}
            Err(e) => error!(
                sequence,
                path = %shared.file.path().display(),
                error = %e,
                "Flush failed"
            ),
        }

        let mut state = shared.state.lock();
        state.in_flight = false;
        drop(state);
        shared.idle.notify_all();
    }

    shared.idle.notify_all();
}
