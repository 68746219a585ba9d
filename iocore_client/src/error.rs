use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the client binding.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No candidate location held the shared library.
    #[error("Shared library not found, searched: {}", join_paths(.searched))]
    LibraryNotFound {
        /// Every candidate path that was probed, in order.
        searched: Vec<PathBuf>,
    },

    /// The shared library exists but could not be loaded or lacks a symbol.
    #[error("Library load error: {0}")]
    Load(#[from] libloading::Error),

    /// A path cannot be passed across the boundary.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath {
        /// Offending path.
        path: PathBuf,
        /// Why it cannot be encoded.
        reason: &'static str,
    },

    /// The engine reported a failure.
    #[error("Engine error: {0}")]
    Engine(String),
}

fn join_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "<no candidates>".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_candidates() {
        let err = ClientError::LibraryNotFound {
            searched: vec![PathBuf::from("/a/libiocore.so"), PathBuf::from("/b/libiocore.so")],
        };
        assert_eq!(
            err.to_string(),
            "Shared library not found, searched: /a/libiocore.so, /b/libiocore.so"
        );
    }

    #[test]
    fn not_found_without_candidates() {
        let err = ClientError::LibraryNotFound { searched: Vec::new() };
        assert!(err.to_string().ends_with("<no candidates>"));
    }
}
