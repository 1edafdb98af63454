//! The serializer handle

use crate::config::SerializerConfig;
use crate::request::{BoxedRequest, PendingRequest, ShutdownRequest};
use crate::state::WorkerState;
use crate::worker::{Shared, Worker};
use crate::SerializerResult;
use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

const CLOSED: &str = "Attempting to use a closed Serializer";

/// Runs submitted closures one at a time on a dedicated worker thread
///
/// Cloning the handle is cheap; all clones talk to the same worker. The
/// worker stops on `close()`, when every clone has been dropped, or when a
/// submitted closure panics.
///
/// Calling `submit` or `close` from inside a submitted closure deadlocks.
#[derive(Clone)]
pub struct Serializer {
    inner: Arc<Inner>,
}

struct Inner {
    /// Intake channel for operations
    intake: Sender<BoxedRequest>,
    /// Dedicated shutdown-signal channel
    shutdown: Sender<ShutdownRequest>,
    /// Liveness flag and worker state
    shared: Arc<Shared>,
    /// Worker thread handle, taken by the caller that closes
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Name given to the worker thread
    thread_name: String,
}

impl Serializer {
    /// Create a serializer with the default configuration and start its worker
    ///
    /// # Panics
    /// Panics if the worker thread cannot be spawned.
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
            .expect("Failed to spawn serializer worker thread")
    }

    /// Create a serializer with a custom configuration and start its worker
    pub fn with_config(config: SerializerConfig) -> SerializerResult<Self> {
        let (intake_tx, intake_rx) = match config.capacity {
            Some(capacity) => channel::bounded(capacity),
            None => channel::unbounded(),
        };
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);
        let shared = Arc::new(Shared::new());

        let handle = Worker::new(
            config.thread_name.clone(),
            intake_rx,
            shutdown_rx,
            shared.clone(),
        )
        .start()?;

        debug!(worker = %config.thread_name, capacity = ?config.capacity, "serializer started");

        Ok(Self {
            inner: Arc::new(Inner {
                intake: intake_tx,
                shutdown: shutdown_tx,
                shared,
                handle: Mutex::new(Some(handle)),
                thread_name: config.thread_name,
            }),
        })
    }

    /// Run `operation` on the worker and return its result
    ///
    /// Blocks until every request accepted before this one has run, then
    /// until `operation` itself has run.
    ///
    /// # Panics
    /// Panics if the serializer is closed, or if the worker terminates before
    /// replying (an earlier or this very operation panicked).
    pub fn submit<T, F>(&self, operation: F) -> T
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        self.ensure_alive();

        let (request, reply) = PendingRequest::new(operation);
        let request: BoxedRequest = Box::new(request);
        if self.inner.intake.send(request).is_err() {
            panic!("{}", CLOSED);
        }

        match reply.recv() {
            Ok(result) => result,
            Err(_) => panic!("Serializer worker terminated before replying"),
        }
    }

    /// Stop the worker after it drains the requests already queued
    ///
    /// Blocks until the worker has stopped.
    ///
    /// # Panics
    /// Panics if the serializer is already closed.
    pub fn close(&self) {
        if !self.inner.shared.alive.swap(false, Ordering::AcqRel) {
            panic!("{}", CLOSED);
        }
        debug!(worker = %self.inner.thread_name, "close requested");

        let (request, ack) = ShutdownRequest::new();
        if self.inner.shutdown.send(request).is_err() {
            panic!("{}", CLOSED);
        }
        if ack.recv().is_err() {
            panic!("Serializer worker terminated before acknowledging shutdown");
        }

        if let Some(handle) = self.inner.handle.lock().take() {
            // The worker contains its own panics, so join only fails if the
            // thread was torn down some other way.
            let _ = handle.join();
        }
    }

    /// Whether the serializer still accepts requests
    pub fn is_alive(&self) -> bool {
        self.inner.shared.alive.load(Ordering::Acquire)
    }

    /// Number of requests accepted but not yet picked up by the worker
    pub fn queued(&self) -> usize {
        self.inner.intake.len()
    }

    /// Current lifecycle state of the worker
    pub fn state(&self) -> WorkerState {
        self.inner.shared.state.load()
    }

    /// Name of the worker thread
    pub fn thread_name(&self) -> &str {
        &self.inner.thread_name
    }

    fn ensure_alive(&self) {
        if !self.is_alive() {
            panic!("{}", CLOSED);
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("thread_name", &self.inner.thread_name)
            .field("alive", &self.is_alive())
            .field("state", &self.state())
            .finish()
    }
}
