#![deny(missing_docs)]

//! Caller-side binding for the iocore engine.
//!
//! Finds the shared library, loads it and turns the engine's nullable error
//! channel into a `Result`, releasing every returned message exactly once.

/// Error types used by the client.
pub mod error;

/// Dynamic loading of the engine and the boundary call.
pub mod loader;

/// Discovery of the engine's shared library on disk.
pub mod locator;

pub use error::ClientError;
pub use loader::{Exports, IoCore};
pub use locator::LibraryLocator;
