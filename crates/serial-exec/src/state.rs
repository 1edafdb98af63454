//! Worker lifecycle state

/// Lifecycle of a serializer's worker thread
///
/// Transitions only move forward: `Running` → `Stopping` → `Stopped`.
/// A faulting operation jumps straight from `Running` to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Servicing requests from the intake channel
    Running,
    /// Shutdown received; draining requests already queued
    Stopping,
    /// Worker loop has exited
    Stopped,
}

impl WorkerState {
    /// Whether the worker loop has exited
    pub fn is_stopped(self) -> bool {
        self == WorkerState::Stopped
    }
}
