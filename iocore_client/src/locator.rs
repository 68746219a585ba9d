use std::path::{Path, PathBuf};

use crate::error::ClientError;

/// Environment variable pinning the shared library path.
pub const LIB_ENV: &str = "IOCORE_LIB";

/// Base name of the engine library.
pub const LIB_NAME: &str = "iocore";

/// Platform file name of a dynamic library called `name`.
pub fn lib_filename(name: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{name}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{name}.dylib")
    } else {
        format!("lib{name}.so")
    }
}

/// Finds the engine's shared library.
///
/// Discovery order:
/// 1. an explicit path set with [`LibraryLocator::with_path`];
/// 2. the `IOCORE_LIB` variable, read by [`LibraryLocator::from_env`];
/// 3. every directory added with [`LibraryLocator::with_search_dir`], in order;
/// 4. the running executable's directory, then its sibling `../bin`.
///
/// A pinned path (1 or 2) is the only candidate when present: if it does not
/// exist, resolution fails rather than falling through to the search dirs.
#[derive(Debug, Clone)]
pub struct LibraryLocator {
    pinned: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    exe_relative: bool,
}

impl Default for LibraryLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryLocator {
    /// Locator with no pinned path that falls back to the executable's directory.
    pub fn new() -> Self {
        Self {
            pinned: None,
            search_dirs: Vec::new(),
            exe_relative: true,
        }
    }

    /// Like [`LibraryLocator::new`], pinned to `IOCORE_LIB` when it is set.
    pub fn from_env() -> Self {
        let mut locator = Self::new();
        if let Some(path) = std::env::var_os(LIB_ENV).filter(|p| !p.is_empty()) {
            locator.pinned = Some(PathBuf::from(path));
        }
        locator
    }

    /// Pins the library to `path`.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.pinned = Some(path.into());
        self
    }

    /// Appends a directory to probe.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Disables probing next to the running executable.
    pub fn without_exe_fallback(mut self) -> Self {
        self.exe_relative = false;
        self
    }

    /// Candidate paths, in probe order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        if let Some(path) = &self.pinned {
            return vec![path.clone()];
        }

        let file = lib_filename(LIB_NAME);
        let mut dirs = self.search_dirs.clone();
        if self.exe_relative {
            if let Some(exe_dir) = exe_dir() {
                let bin = exe_dir.join("..").join("bin");
                dirs.push(exe_dir);
                dirs.push(bin);
            }
        }
        dirs.into_iter().map(|dir| dir.join(&file)).collect()
    }

    /// Returns the first candidate that exists.
    pub fn resolve(&self) -> Result<PathBuf, ClientError> {
        let searched = self.candidates();
        match searched.iter().find(|path| path.is_file()) {
            Some(found) => {
                tracing::debug!(path = %found.display(), "resolved iocore library");
                Ok(found.clone())
            }
            None => Err(ClientError::LibraryNotFound { searched }),
        }
    }
}

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}
