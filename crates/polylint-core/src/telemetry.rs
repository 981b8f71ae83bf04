//! Fire-and-forget failure telemetry on a background thread.
//!
//! The evaluation path only ever does a non-blocking `try_send` into a
//! bounded queue. A full queue or a failed transport drops the record.
//! Shutdown waits for the queue to drain for a bounded grace period, then
//! leaves the worker behind.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::report::{FailureRecord, TelemetrySink};

/// Records buffered before new ones are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// How long shutdown waits for queued records before detaching the worker.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Errors from delivering one record.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The collector could not be reached.
    #[error("telemetry collector unreachable: {0}")]
    Unreachable(String),

    /// The collector answered with a non-success status.
    #[error("telemetry collector rejected record with status {0}")]
    Rejected(u16),

    /// The record could not be encoded.
    #[error("failed to encode telemetry record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Delivers records to an external collector.
///
/// Called on the telemetry thread only.
pub trait TelemetryTransport: Send + 'static {
    /// Sends one record, making a single attempt.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`]; the caller drops the record.
    fn send(&self, record: &FailureRecord) -> Result<(), TransportError>;
}

/// A [`TelemetrySink`] that hands records to a transport on its own thread.
#[derive(Debug)]
pub struct BackgroundTelemetry {
    sender: Option<SyncSender<FailureRecord>>,
    worker: Option<JoinHandle<()>>,
    // disconnects when the worker loop exits
    finished: Mutex<Receiver<()>>,
    dropped: AtomicUsize,
}

impl BackgroundTelemetry {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the thread cannot be spawned.
    pub fn spawn<T: TelemetryTransport>(transport: T, capacity: usize) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel::<FailureRecord>(capacity);
        let (done, finished) = mpsc::channel::<()>();
        let worker = thread::Builder::new()
            .name("polylint-telemetry".to_string())
            .spawn(move || {
                let _done = done;
                for record in receiver {
                    if let Err(e) = transport.send(&record) {
                        debug!("Dropped telemetry record for {}: {e}", record.file.display());
                    }
                }
            })?;
        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            finished: Mutex::new(finished),
            dropped: AtomicUsize::new(0),
        })
    }

    /// Records dropped because the queue was full.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Closes the queue and waits up to [`DEFAULT_SHUTDOWN_GRACE`] for
    /// queued records to be attempted.
    ///
    /// Returns false if the worker was still busy and got detached.
    pub fn shutdown(self) -> bool {
        self.shutdown_within(DEFAULT_SHUTDOWN_GRACE)
    }

    /// Closes the queue and waits up to `grace` for the worker to drain it.
    ///
    /// A worker still stuck in a slow transport after `grace` is detached;
    /// its remaining records are lost when the process exits.
    pub fn shutdown_within(mut self, grace: Duration) -> bool {
        self.stop(grace)
    }

    fn stop(&mut self, grace: Duration) -> bool {
        self.sender.take();
        let Some(worker) = self.worker.take() else {
            return true;
        };
        let waited = self
            .finished
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recv_timeout(grace);
        if matches!(waited, Err(RecvTimeoutError::Timeout)) {
            debug!("Telemetry worker still busy after {grace:?}, detaching");
            return false;
        }
        if worker.join().is_err() {
            debug!("Telemetry worker panicked");
        }
        true
    }
}

impl TelemetrySink for BackgroundTelemetry {
    fn report_failure(&self, record: FailureRecord) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.try_send(record).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl Drop for BackgroundTelemetry {
    fn drop(&mut self) {
        self.stop(DEFAULT_SHUTDOWN_GRACE);
    }
}
