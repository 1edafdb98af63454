//! Messages carried by the intake and shutdown channels

use crossbeam::channel::{self, Receiver, Sender};

/// A queued request the worker can run without knowing its result type
///
/// Each call to `run` executes the wrapped operation and writes its result
/// into the request's reply slot.
pub trait Pending: Send {
    /// Execute the operation and deliver the result
    fn run(self: Box<Self>);
}

/// An operation paired with its single-use reply slot
pub struct PendingRequest<T, F> {
    /// The caller's operation
    operation: F,
    /// Reply slot (capacity 1, written exactly once)
    reply: Sender<T>,
}

impl<T, F> PendingRequest<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    /// Wrap `operation`, returning the request and the receiving end of its reply slot
    pub fn new(operation: F) -> (Self, Receiver<T>) {
        let (reply, rx) = channel::bounded(1);
        (Self { operation, reply }, rx)
    }
}

impl<T, F> Pending for PendingRequest<T, F>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    fn run(self: Box<Self>) {
        let PendingRequest { operation, reply } = *self;
        let result = operation();
        // The slot has room for exactly this one value; a caller that went
        // away simply never reads it.
        let _ = reply.send(result);
    }
}

/// Boxed request as it travels through the intake channel
pub type BoxedRequest = Box<dyn Pending>;

/// Shutdown request carrying the acknowledgment slot of the closing caller
pub struct ShutdownRequest {
    ack: Sender<()>,
}

impl ShutdownRequest {
    /// Create a shutdown request and the receiver its acknowledgment arrives on
    pub fn new() -> (Self, Receiver<()>) {
        let (ack, rx) = channel::bounded(1);
        (Self { ack }, rx)
    }

    /// Tell the closing caller the worker has stopped
    pub fn acknowledge(self) {
        let _ = self.ack.send(());
    }
}
