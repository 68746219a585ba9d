use std::path::{Path, PathBuf};

use crate::error::JobError;

/// A single source-to-destination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    source: PathBuf,
    destination: PathBuf,
}

impl Job {
    /// Builds a job, rejecting empty paths.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Result<Self, JobError> {
        let source = source.into();
        let destination = destination.into();

        if source.as_os_str().is_empty() {
            return Err(JobError::EmptySource);
        }
        if destination.as_os_str().is_empty() {
            return Err(JobError::EmptyDestination);
        }

        Ok(Self { source, destination })
    }

    /// Path the job reads from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Path the job writes to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Directory the destination lives in; `.` for bare file names.
    pub fn destination_dir(&self) -> &Path {
        parent_dir(&self.destination)
    }
}

/// Directory containing `path`; `.` for bare file names.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(Job::new("", "out.png"), Err(JobError::EmptySource)));
    }

    #[test]
    fn empty_destination_is_rejected() {
        assert!(matches!(Job::new("in.png", ""), Err(JobError::EmptyDestination)));
    }

    #[test]
    fn bare_destination_lives_in_current_dir() {
        let job = Job::new("photo.png", "out.png").unwrap();
        assert_eq!(job.destination_dir(), Path::new("."));
    }

    #[test]
    fn nested_destination_dir() {
        let job = Job::new("photo.png", "/tmp/out/out.png").unwrap();
        assert_eq!(job.destination_dir(), Path::new("/tmp/out"));
    }
}
