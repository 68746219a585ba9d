use std::path::Path;

/// File name prefix of in-flight job outputs.
pub const PARTIAL_PREFIX: &str = ".iocore-out-";

/// Removes partial outputs left in `dir` by interrupted jobs.
///
/// Only regular files whose names start with [`PARTIAL_PREFIX`] are removed.
/// Returns how many files were deleted.
pub fn remove_partials(dir: &Path) -> std::io::Result<usize> {
    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_partial = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(PARTIAL_PREFIX));
        if !is_partial || !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed partial output");
                removed += 1;
            }
            // Another process may have finished or cleaned it up already.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_only_partials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".iocore-out-abc.tmp"), b"x").unwrap();
        std::fs::write(dir.path().join(".iocore-out-def.tmp"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.png"), b"x").unwrap();
        std::fs::create_dir(dir.path().join(".iocore-out-dir")).unwrap();

        assert_eq!(remove_partials(dir.path()).unwrap(), 2);
        assert!(dir.path().join("keep.png").exists());
        assert!(dir.path().join(".iocore-out-dir").is_dir());
    }

    #[test]
    fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_partials(&dir.path().join("nope")).is_err());
    }
}
