//! Serial Exec: single-worker execution serializer
//!
//! This crate provides a mutex expressed as a dedicated worker thread:
//! - Closures submitted from any number of threads run one at a time
//! - Requests are serviced in the order the intake channel accepted them
//! - Each caller blocks until its own closure has run and gets its result back
//! - `close()` drains already-queued work, then stops the worker
//!
//! Misuse (submitting to or closing a closed serializer) panics. A panic inside
//! a submitted closure terminates the worker and closes the handle.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod request;
pub mod serializer;
pub mod state;
mod worker;

pub use config::SerializerConfig;
pub use serializer::Serializer;
pub use state::WorkerState;

/// Errors that can occur when constructing a serializer
#[derive(Debug, thiserror::Error)]
pub enum SerializerError {
    /// The OS refused to create the worker thread
    #[error("Failed to spawn serializer worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Serializer construction result
pub type SerializerResult<T> = Result<T, SerializerError>;
