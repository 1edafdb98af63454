//! Worker thread that executes serialized operations
//!
//! The worker owns the receiving ends of both channels. It runs one request at
//! a time until it receives a shutdown request, every handle is dropped, or an
//! operation panics.

use crate::request::{BoxedRequest, ShutdownRequest};
use crate::state::WorkerState;
use crossbeam::atomic::AtomicCell;
use crossbeam::channel::Receiver;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// State shared between the handle and its worker
pub(crate) struct Shared {
    /// Liveness flag checked by `submit` and `close`
    pub(crate) alive: AtomicBool,
    /// Current lifecycle state of the worker loop
    pub(crate) state: AtomicCell<WorkerState>,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            state: AtomicCell::new(WorkerState::Running),
        }
    }

    fn mark_closed(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

/// Why the receive loop returned
enum Exit {
    /// A close() handshake; the request carries the caller's ack slot
    Shutdown(ShutdownRequest),
    /// Every handle was dropped
    Disconnected,
}

pub(crate) struct Worker {
    name: String,
    intake: Receiver<BoxedRequest>,
    shutdown: Receiver<ShutdownRequest>,
    shared: Arc<Shared>,
}

impl Worker {
    pub(crate) fn new(
        name: String,
        intake: Receiver<BoxedRequest>,
        shutdown: Receiver<ShutdownRequest>,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            name,
            intake,
            shutdown,
            shared,
        }
    }

    /// Start the worker thread
    pub(crate) fn start(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || self.run())
    }

    /// Thread body: the receive loop wrapped in the fault boundary
    fn run(self) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.receive_loop()));

        // Whatever happened, nothing else gets accepted from here on
        self.shared.mark_closed();

        match outcome {
            Ok(Exit::Shutdown(request)) => {
                let Worker {
                    name,
                    intake,
                    shutdown,
                    shared,
                } = self;
                drop(intake);
                drop(shutdown);
                shared.state.store(WorkerState::Stopped);
                debug!(worker = %name, "worker stopped");
                request.acknowledge();
            }
            Ok(Exit::Disconnected) => {
                self.shared.state.store(WorkerState::Stopped);
                debug!(worker = %self.name, "all handles dropped, worker stopped");
            }
            Err(payload) => {
                let abandoned = self.intake.try_iter().count();
                self.shared.state.store(WorkerState::Stopped);
                warn!(
                    worker = %self.name,
                    panic = panic_message(payload.as_ref()),
                    abandoned,
                    "operation panicked, worker terminated"
                );
            }
        }
    }

    /// RUNNING: service whichever channel is ready until told to stop
    fn receive_loop(&self) -> Exit {
        loop {
            crossbeam::channel::select! {
                recv(self.intake) -> msg => match msg {
                    Ok(request) => {
                        debug!(worker = %self.name, "operation received");
                        request.run();
                    }
                    Err(_) => return Exit::Disconnected,
                },
                recv(self.shutdown) -> msg => match msg {
                    Ok(request) => {
                        debug!(worker = %self.name, "shutdown received");
                        self.stopping();
                        return Exit::Shutdown(request);
                    }
                    Err(_) => return Exit::Disconnected,
                },
            }
        }
    }

    /// STOPPING: run every request accepted before the shutdown was seen
    fn stopping(&self) {
        self.shared.state.store(WorkerState::Stopping);
        self.shared.mark_closed();

        let mut drained = 0usize;
        for request in self.intake.try_iter() {
            request.run();
            drained += 1;
        }
        if drained > 0 {
            debug!(worker = %self.name, drained, "drained queued operations");
        }
    }
}

/// Render a panic payload for the log
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
