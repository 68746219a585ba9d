#![deny(missing_docs)]

//! Native image-processing engine exposed through a C ABI.
//!
//! Rust callers use [`Executor`] directly. Foreign callers load the shared
//! library and call `ProcessImage` / `FreeString`, see [`boundary`].

/// C ABI exports and the owned error-message type.
pub mod boundary;

/// Removal of partial outputs left by interrupted jobs.
pub mod cleanup;

/// Error types used by the engine.
pub mod error;

/// Synchronous job execution.
pub mod executor;

/// Job description.
pub mod job;

/// Structured logging setup.
pub mod logging;

/// Extension-based media classification.
pub mod media;

/// Executor configuration.
pub mod options;

/// Pluggable source-to-destination transformations.
pub mod processor;

pub use boundary::{ErrorMessage, Outcome};
pub use error::{ErrorKind, JobError};
pub use executor::{Executor, execute};
pub use job::Job;
pub use options::{ExecutorOptions, Transform};
