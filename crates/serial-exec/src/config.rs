//! Serializer configuration

/// Default name given to the worker thread
pub const DEFAULT_THREAD_NAME: &str = "serial-exec-worker";

/// Options used when spawning a serializer's worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Name of the worker thread (shows up in panics and debuggers)
    pub thread_name: String,

    /// Maximum queued requests before submitters block (None = unbounded)
    pub capacity: Option<usize>,
}

impl SerializerConfig {
    /// Set the worker thread name
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Bound the intake channel to `capacity` queued requests
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            capacity: None,
        }
    }
}
