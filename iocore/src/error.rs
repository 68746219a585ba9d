use std::path::PathBuf;

use thiserror::Error;

use crate::options::OptionsError;

/// Coarse classification of a [`JobError`].
///
/// The boundary only ever transports free text, but the engine and its Rust
/// callers can still tell the three failure families apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source could not be found, read or understood.
    Input,
    /// The destination could not be written.
    Output,
    /// Anything else that went wrong inside the engine.
    Internal,
}

/// Errors produced while executing a job.
#[derive(Error, Debug)]
pub enum JobError {
    /// Source path is empty.
    #[error("Source path is empty")]
    EmptySource,

    /// Destination path is empty.
    #[error("Destination path is empty")]
    EmptyDestination,

    /// A path argument was not valid UTF-8 or was a null pointer.
    #[error("Invalid {which} path: {reason}")]
    InvalidPath {
        /// Which argument was rejected (`source` or `destination`).
        which: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Source file does not exist.
    #[error("Source file does not exist: {0}")]
    SourceMissing(PathBuf),

    /// Source exists but could not be opened or read.
    #[error("Cannot read source {path}: {source}")]
    SourceUnreadable {
        /// Offending source path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Source or destination names a container the engine does not handle.
    #[error("Unsupported media for {path}: {kind} files are not images")]
    UnsupportedMedia {
        /// Offending path.
        path: PathBuf,
        /// Detected media kind.
        kind: &'static str,
    },

    /// Source content could not be decoded as an image.
    #[error("Cannot decode source image: {0}")]
    Decode(#[source] image::ImageError),

    /// Destination directory does not exist or is not a directory.
    #[error("Destination directory does not exist or is not a directory: {0}")]
    DestinationDirMissing(PathBuf),

    /// Destination already exists and overwriting is disabled.
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Destination could not be created or written.
    #[error("Cannot write destination {path}: {source}")]
    DestinationUnwritable {
        /// Offending destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Destination extension does not map to a known image format.
    #[error("Unsupported output format for {0}")]
    UnsupportedOutputFormat(PathBuf),

    /// Encoding the destination image failed.
    #[error("Cannot encode destination image: {0}")]
    Encode(#[source] image::ImageError),

    /// Executor options could not be loaded.
    #[error("Invalid options: {0}")]
    Options(#[from] OptionsError),

    /// I/O error while streaming between source and destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine panicked while processing the job.
    #[error("Internal error: {0}")]
    Panicked(String),
}

impl JobError {
    /// Returns the coarse family this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::EmptySource
            | JobError::EmptyDestination
            | JobError::InvalidPath { .. }
            | JobError::SourceMissing(_)
            | JobError::SourceUnreadable { .. }
            | JobError::UnsupportedMedia { .. }
            | JobError::Decode(_) => ErrorKind::Input,
            JobError::DestinationDirMissing(_)
            | JobError::DestinationExists(_)
            | JobError::DestinationUnwritable { .. }
            | JobError::UnsupportedOutputFormat(_)
            | JobError::Encode(_) => ErrorKind::Output,
            JobError::Options(_) | JobError::Io(_) | JobError::Panicked(_) => ErrorKind::Internal,
        }
    }
}
